//! Formats a recommendation into display text.

use crate::engine::OutfitRecommendation;

/// Caps per category for the display list, applied in priority order.
const OUTER_CAP: usize = 2;
const TOP_CAP: usize = 2;
const BOTTOM_CAP: usize = 2;
const FOOTWEAR_CAP: usize = 1;
const ACCESSORIES_CAP: usize = 3;
const EXTRAS_CAP: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutfitPresentation {
    pub summary: String,
    pub items: Vec<String>,
}

/// Mood tags use their own temperature bands, deliberately coarser than the
/// engine's.
fn mood_tags(temp_c: f64, humidity_percent: f64, wind_speed_kmh: f64) -> Vec<&'static str> {
    let mut tags = vec![if temp_c > 30.0 {
        "🔥 Hot"
    } else if temp_c > 24.0 {
        "☀️ Warm"
    } else if temp_c > 18.0 {
        "🌤️ Mild"
    } else if temp_c > 12.0 {
        "🌥️ Cool"
    } else {
        "❄️ Cold"
    }];
    if humidity_percent > 70.0 {
        tags.push("💧 Humid");
    }
    if wind_speed_kmh > 15.0 {
        tags.push("💨 Windy");
    }
    tags
}

/// Render a recommendation alongside the conditions it was built from.
/// Categories are truncated silently; original order survives truncation.
pub fn present(
    recommendation: &OutfitRecommendation,
    temp_c: f64,
    weather_description: &str,
    humidity_percent: f64,
    wind_speed_kmh: f64,
) -> OutfitPresentation {
    let tags = mood_tags(temp_c, humidity_percent, wind_speed_kmh);
    let summary = format!(
        "Weather Analysis: {}\nConditions: {}",
        tags.join(", "),
        weather_description
    );

    let mut items = Vec::new();
    for (source, cap) in [
        (&recommendation.outer, OUTER_CAP),
        (&recommendation.top, TOP_CAP),
        (&recommendation.bottom, BOTTOM_CAP),
        (&recommendation.footwear, FOOTWEAR_CAP),
        (&recommendation.accessories, ACCESSORIES_CAP),
        (&recommendation.extras, EXTRAS_CAP),
    ] {
        items.extend(source.iter().take(cap).cloned());
    }

    OutfitPresentation { summary, items }
}

/// One-line pro tip for the day's conditions.
pub fn advice(temp_c: f64, humidity_percent: f64) -> &'static str {
    if temp_c > 30.0 {
        "Pro tip: Stay hydrated and take breaks in the shade today."
    } else if temp_c < 10.0 {
        "Pro tip: Layer up so you can adjust as the day warms."
    } else if humidity_percent > 70.0 {
        "Pro tip: Pick breathable fabrics, the humidity will make it feel warmer."
    } else {
        "Pro tip: Conditions are ideal, dress for comfort."
    }
}
