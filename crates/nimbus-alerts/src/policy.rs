//! Threshold rules turning a forecast day into alert notices.

use std::fmt;

use nimbus_weather::ForecastDay;

/// Fixed rule constants, overridable from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertThresholds {
    pub rain_probability_percent: f64,
    pub rain_sum_mm: f64,
    pub heat_max_c: f64,
    pub cold_min_c: f64,
    pub storm_code_min: i32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            rain_probability_percent: 60.0,
            rain_sum_mm: 5.0,
            heat_max_c: 38.0,
            cold_min_c: 10.0,
            storm_code_min: 95,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Rain,
    Heat,
    Cold,
    Storm,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rain => "rain",
            Self::Heat => "heat",
            Self::Cold => "cold",
            Self::Storm => "storm",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dedup bucket for a city. Lowercased name and country joined with `|`;
/// two empty strings collapse every city into one bucket, which callers
/// accept rather than special-case.
pub fn city_key(name: &str, country: &str) -> String {
    format!("{name}|{country}").to_lowercase()
}

/// One alert ready for delivery. Ephemeral, produced and consumed within a
/// single evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertNotice {
    pub kind: AlertKind,
    pub title: String,
    pub body: String,
    pub tag: String,
}

fn value_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| v.to_string())
}

/// Evaluates the four alert rules against one forecast day.
#[derive(Debug, Clone, Default)]
pub struct AlertPolicy {
    thresholds: AlertThresholds,
}

impl AlertPolicy {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    /// All rules that fire for this day, in rain/heat/cold/storm order.
    ///
    /// Rules are independent; up to four notices come back. A field the
    /// forecast left empty skips only the rule that needs it.
    pub fn evaluate(&self, city_label: &str, city_key: &str, day: &ForecastDay) -> Vec<AlertNotice> {
        let mut notices = Vec::new();
        let day_iso = day.date.format("%Y-%m-%d").to_string();

        let rain_by_probability = day
            .precipitation_probability_percent
            .is_some_and(|p| p >= self.thresholds.rain_probability_percent);
        let rain_by_sum = day
            .precipitation_sum_mm
            .is_some_and(|mm| mm >= self.thresholds.rain_sum_mm);
        if rain_by_probability || rain_by_sum {
            notices.push(self.notice(
                AlertKind::Rain,
                format!("Rain alert: {city_label}"),
                format!(
                    "Chance: {}% | Expected: {} mm. Carry an umbrella / raincoat.",
                    value_or_na(day.precipitation_probability_percent),
                    value_or_na(day.precipitation_sum_mm)
                ),
                city_key,
                &day_iso,
            ));
        }

        if let Some(t_max) = day.temperature_max_c {
            if t_max >= self.thresholds.heat_max_c {
                notices.push(self.notice(
                    AlertKind::Heat,
                    format!("Heat warning: {city_label}"),
                    format!(
                        "Day max around {}°C. Stay hydrated and avoid peak sun.",
                        t_max.round()
                    ),
                    city_key,
                    &day_iso,
                ));
            }
        }

        if let Some(t_min) = day.temperature_min_c {
            if t_min <= self.thresholds.cold_min_c {
                notices.push(self.notice(
                    AlertKind::Cold,
                    format!("Cold warning: {city_label}"),
                    format!("Night min around {}°C. Dress in layers.", t_min.round()),
                    city_key,
                    &day_iso,
                ));
            }
        }

        if day
            .weather_code
            .is_some_and(|code| code >= self.thresholds.storm_code_min)
        {
            notices.push(self.notice(
                AlertKind::Storm,
                format!("Storm alert: {city_label}"),
                "Thunderstorm conditions possible today. Prefer staying indoors if needed."
                    .to_string(),
                city_key,
                &day_iso,
            ));
        }

        if !notices.is_empty() {
            tracing::info!(
                "{} alert(s) for {} on {}",
                notices.len(),
                city_label,
                day_iso
            );
        }
        notices
    }

    fn notice(
        &self,
        kind: AlertKind,
        title: String,
        body: String,
        city_key: &str,
        day_iso: &str,
    ) -> AlertNotice {
        AlertNotice {
            kind,
            title,
            body,
            tag: format!("{}-{}-{}", kind.as_str(), city_key, day_iso),
        }
    }
}
