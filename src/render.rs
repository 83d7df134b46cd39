//! Terminal presentation: the conditions card, forecast and outlook tables,
//! and the toast sink that prints alert notifications inline.

use nimbus_alerts::{Toast, ToastSink};
use nimbus_assistant::LoadedCity;
use nimbus_outfit::OutfitPresentation;
use nimbus_weather::{ForecastDay, MonthOutlook};

/// Prints toasts straight to stdout. Always reports success; a terminal
/// can't reject output.
pub struct TerminalToastSink;

impl ToastSink for TerminalToastSink {
    fn push(&self, toast: Toast) -> bool {
        println!();
        println!("🔔 {}", toast.title);
        println!("   {}", toast.body);
        if !toast.actions.is_empty() {
            println!("   [{}]", toast.actions.join(" / "));
        }
        true
    }
}

pub fn print_forecast(loaded: &LoadedCity) {
    let current = &loaded.bundle.current;
    let condition = current.condition();

    println!();
    println!("📍 {}", loaded.place.label());
    println!(
        "{} {}, {:.1}°C (feels like {:.1}°C)",
        condition.symbol(),
        condition.description(),
        current.temperature_c,
        current.feels_like_c
    );
    println!(
        "   Humidity {:.0}%   Wind {:.0} km/h (gusts {:.0})   Pressure {:.0} hPa",
        current.humidity_percent, current.wind_speed_kmh, current.wind_gusts_kmh, current.pressure_hpa
    );

    if loaded.bundle.days.is_empty() {
        return;
    }

    println!();
    println!(
        "{:<11} {:<18} {:>8} {:>8} {:>15}",
        "Date", "Sky", "High", "Low", "Rain"
    );
    for day in &loaded.bundle.days {
        println!(
            "{:<11} {:<18} {:>8} {:>8} {:>15}",
            day.date.format("%a %d %b"),
            sky_label(day),
            fmt_temp(day.temperature_max_c),
            fmt_temp(day.temperature_min_c),
            rain_label(day),
        );
    }
}

pub fn print_outlook(city_label: &str, outlook: &[MonthOutlook]) {
    println!();
    println!("Seasonal outlook for {city_label}");
    println!(
        "{:<16} {:>8} {:>8} {:>10} {:>7} {:>13}",
        "Month", "High", "Low", "Rain", "Chance", "Source"
    );
    for month in outlook {
        println!(
            "{:<16} {:>7.1}° {:>7.1}° {:>7.0} mm {:>6}% {:>13}",
            month.label,
            month.high_c,
            month.low_c,
            month.precipitation_mm,
            month.precipitation_probability_percent,
            month.source_label(),
        );
    }
}

pub fn print_outfit(presentation: &OutfitPresentation, advice_line: &str) {
    println!();
    println!("{}", presentation.summary);
    println!();
    println!("What to wear:");
    for item in &presentation.items {
        println!("  • {item}");
    }
    if !advice_line.is_empty() {
        println!();
        println!("{advice_line}");
    }
}

fn sky_label(day: &ForecastDay) -> String {
    match day.condition() {
        Some(condition) => format!("{} {}", condition.symbol(), condition.description()),
        None => "NA".to_string(),
    }
}

fn fmt_temp(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}°C"),
        None => "NA".to_string(),
    }
}

fn rain_label(day: &ForecastDay) -> String {
    match (
        day.precipitation_probability_percent,
        day.precipitation_sum_mm,
    ) {
        (Some(prob), Some(sum)) => format!("{prob:.0}% ({sum:.1} mm)"),
        (Some(prob), None) => format!("{prob:.0}%"),
        (None, Some(sum)) => format!("{sum:.1} mm"),
        (None, None) => "NA".to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::NaiveDate;

    fn day(
        code: Option<i32>,
        max: Option<f64>,
        prob: Option<f64>,
        sum: Option<f64>,
    ) -> ForecastDay {
        ForecastDay {
            date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            weather_code: code,
            temperature_max_c: max,
            temperature_min_c: Some(24.0),
            precipitation_sum_mm: sum,
            precipitation_probability_percent: prob,
            wind_speed_max_kmh: None,
        }
    }

    #[test]
    fn test_rain_label_combines_probability_and_sum() {
        assert_eq!(
            rain_label(&day(Some(61), Some(33.0), Some(78.0), Some(12.4))),
            "78% (12.4 mm)"
        );
        assert_eq!(rain_label(&day(Some(61), Some(33.0), Some(78.0), None)), "78%");
        assert_eq!(rain_label(&day(Some(61), Some(33.0), None, Some(12.4))), "12.4 mm");
        assert_eq!(rain_label(&day(Some(61), Some(33.0), None, None)), "NA");
    }

    #[test]
    fn test_missing_values_render_as_na() {
        let d = day(None, None, None, None);
        assert_eq!(sky_label(&d), "NA");
        assert_eq!(fmt_temp(d.temperature_max_c), "NA");
        assert_eq!(fmt_temp(d.temperature_min_c), "24.0°C");
    }

    #[test]
    fn test_sky_label_pairs_symbol_and_description() {
        assert_eq!(sky_label(&day(Some(95), None, None, None)), "⛈️ Thunderstorm");
    }
}
