//! Rule engine mapping weather readings to garment lists.

use serde::{Deserialize, Serialize};

/// Categorized garment recommendation. Order within each list matters:
/// earlier entries take priority when the display truncates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitRecommendation {
    pub top: Vec<String>,
    pub bottom: Vec<String>,
    pub outer: Vec<String>,
    pub accessories: Vec<String>,
    pub footwear: Vec<String>,
    pub extras: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn prepend(list: &mut Vec<String>, items: &[&str]) {
    for (i, item) in items.iter().enumerate() {
        list.insert(i, (*item).to_string());
    }
}

/// Base garment set for the effective temperature. Six half-open bands with
/// boundaries at 5/12/18/24/30 degrees; a boundary value lands in the upper
/// band.
fn base_for(wind_chill_c: f64) -> OutfitRecommendation {
    if wind_chill_c < 5.0 {
        OutfitRecommendation {
            top: strings(&["Thermal base layer", "Warm fleece", "Heavy sweater"]),
            bottom: strings(&["Thermal leggings", "Insulated pants", "Warm jeans"]),
            outer: strings(&["Heavy winter coat", "Down jacket", "Parka"]),
            accessories: strings(&["Thick scarf", "Insulated gloves", "Wool beanie", "Ear muffs"]),
            footwear: strings(&["Insulated boots", "Winter boots"]),
            extras: strings(&["Hand warmers", "Lip balm"]),
        }
    } else if wind_chill_c < 12.0 {
        OutfitRecommendation {
            top: strings(&["Long sleeve thermal", "Sweater", "Turtleneck"]),
            bottom: strings(&["Jeans", "Warm trousers", "Corduroy pants"]),
            outer: strings(&["Winter jacket", "Wool coat", "Puffer jacket"]),
            accessories: strings(&["Scarf", "Gloves", "Beanie"]),
            footwear: strings(&["Boots", "Closed-toe shoes"]),
            extras: strings(&["Moisturizer for dry skin"]),
        }
    } else if wind_chill_c < 18.0 {
        OutfitRecommendation {
            top: strings(&["Long sleeve shirt", "Light sweater", "Flannel shirt"]),
            bottom: strings(&["Jeans", "Chinos", "Casual pants"]),
            outer: strings(&["Light jacket", "Denim jacket", "Cardigan"]),
            accessories: strings(&["Light scarf", "Sunglasses"]),
            footwear: strings(&["Sneakers", "Loafers", "Ankle boots"]),
            extras: Vec::new(),
        }
    } else if wind_chill_c < 24.0 {
        OutfitRecommendation {
            top: strings(&["T-shirt", "Polo shirt", "Cotton shirt"]),
            bottom: strings(&["Jeans", "Chinos", "Casual pants"]),
            outer: strings(&["Light hoodie (optional)", "Denim jacket (optional)"]),
            accessories: strings(&["Sunglasses", "Cap"]),
            footwear: strings(&["Sneakers", "Casual shoes", "Loafers"]),
            extras: Vec::new(),
        }
    } else if wind_chill_c < 30.0 {
        OutfitRecommendation {
            top: strings(&["Light T-shirt", "Tank top", "Breathable shirt"]),
            bottom: strings(&["Shorts", "Light pants", "Linen pants"]),
            outer: Vec::new(),
            accessories: strings(&["Sunglasses", "Cap", "Sunscreen SPF 30+"]),
            footwear: strings(&["Sneakers", "Sandals", "Canvas shoes"]),
            extras: strings(&["Water bottle", "Sweat towel"]),
        }
    } else {
        OutfitRecommendation {
            top: strings(&[
                "Moisture-wicking T-shirt",
                "Breathable cotton tee",
                "Sleeveless shirt",
            ]),
            bottom: strings(&["Lightweight shorts", "Linen pants"]),
            outer: Vec::new(),
            accessories: strings(&["Wide-brim hat", "Sunglasses", "Sunscreen SPF 50+"]),
            footwear: strings(&["Breathable sandals", "Light sneakers"]),
            extras: strings(&[
                "Water bottle (essential)",
                "Cooling towel",
                "Electrolyte drink",
            ]),
        }
    }
}

/// Build a recommendation for the given conditions.
///
/// Wind above 15 km/h knocks a flat 2 degrees off the temperature before
/// band selection. Modifier rules then run in a fixed order; the humidity
/// rule rewrites whatever top list the weather-code rules left behind, so
/// reordering them changes the output strings.
pub fn recommend(
    temp_c: f64,
    weather_code: i32,
    _precipitation_mm: f64,
    humidity_percent: f64,
    wind_speed_kmh: f64,
) -> OutfitRecommendation {
    let wind_chill_c = if wind_speed_kmh > 15.0 {
        temp_c - 2.0
    } else {
        temp_c
    };
    tracing::debug!(
        "Recommending outfit: temp={:.1}C chill={:.1}C code={} humidity={:.0}% wind={:.0}km/h",
        temp_c,
        wind_chill_c,
        weather_code,
        humidity_percent,
        wind_speed_kmh
    );

    let mut outfit = base_for(wind_chill_c);

    // Rain family: waterproof layers in front, footwear swapped wholesale
    if (51..=67).contains(&weather_code) {
        prepend(&mut outfit.outer, &["Waterproof rain jacket", "Raincoat"]);
        prepend(&mut outfit.accessories, &["Umbrella", "Waterproof bag"]);
        outfit.footwear = strings(&["Waterproof boots", "Rain boots", "Water-resistant shoes"]);
        outfit.extras.push("Waterproof phone case".to_string());
    }

    // Snow family
    if (71..=77).contains(&weather_code) {
        prepend(&mut outfit.outer, &["Insulated waterproof jacket"]);
        prepend(&mut outfit.accessories, &["Waterproof gloves", "Snow boots"]);
        outfit.footwear = strings(&["Insulated snow boots", "Waterproof winter boots"]);
    }

    // Thunderstorm
    if weather_code >= 95 {
        outfit
            .extras
            .push("Avoid outdoor activities if possible".to_string());
        outfit.extras.push("Stay indoors during storm".to_string());
    }

    // Runs after the weather-code rules so the prefix lands on the final tops
    if humidity_percent > 75.0 {
        for item in &mut outfit.top {
            *item = format!("Moisture-wicking {item}");
        }
        outfit.extras.push("Anti-chafing cream".to_string());
        outfit.extras.push("Extra change of clothes".to_string());
    }

    if wind_speed_kmh > 20.0 {
        outfit.outer.push("Windbreaker".to_string());
        outfit
            .accessories
            .push("Secure hat with strap".to_string());
        outfit.extras.push("Wind protection advised".to_string());
    }

    // Clear or mostly clear sky
    if weather_code == 0 || weather_code == 1 {
        outfit
            .extras
            .push("UV-protective clothing recommended".to_string());
    }

    outfit
}
