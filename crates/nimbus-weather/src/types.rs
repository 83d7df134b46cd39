use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::Sleet, // Freezing drizzle
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            66 | 67 => Self::Sleet, // Freezing rain
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Clear, // Unknown codes default to clear
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear sky",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Foggy",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rainy",
            Self::HeavyRain => "Heavy rain",
            Self::Snow => "Snowy",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    /// Terminal glyph for cards and tables
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::PartlyCloudy => "⛅",
            Self::Cloudy => "☁️",
            Self::Fog => "🌫️",
            Self::Drizzle => "🌦️",
            Self::Rain => "🌧️",
            Self::HeavyRain => "🌧️",
            Self::Snow => "🌨️",
            Self::Sleet => "🌨️",
            Self::Thunderstorm => "⛈️",
        }
    }
}

/// Geocoding search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country: String,
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub population: Option<u64>,
}

impl Place {
    /// Display label: "Name, Region, Country" with empty parts skipped.
    pub fn label(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(admin1) = self.admin1.as_deref() {
            if !admin1.is_empty() && admin1 != self.name {
                parts.push(admin1);
            }
        }
        if !self.country.is_empty() {
            parts.push(self.country.as_str());
        }
        parts.join(", ")
    }
}

/// Current conditions from the forecast endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_percent: f64,
    pub precipitation_mm: f64,
    pub weather_code: i32,
    pub cloud_cover_percent: f64,
    pub pressure_hpa: f64,
    pub wind_speed_kmh: f64,
    pub wind_direction_deg: f64,
    pub wind_gusts_kmh: f64,
}

impl CurrentConditions {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.weather_code)
    }
}

/// One day of the daily forecast.
///
/// Fields the API returned as null stay `None`; a missing value skips the
/// alert rule that needs it rather than counting as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub weather_code: Option<i32>,
    pub temperature_max_c: Option<f64>,
    pub temperature_min_c: Option<f64>,
    pub precipitation_sum_mm: Option<f64>,
    pub precipitation_probability_percent: Option<f64>,
    pub wind_speed_max_kmh: Option<f64>,
}

impl ForecastDay {
    pub fn condition(&self) -> Option<WeatherCondition> {
        self.weather_code.map(WeatherCondition::from_wmo_code)
    }
}

/// Complete forecast response: current conditions plus the daily outlook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub current: CurrentConditions,
    pub days: Vec<ForecastDay>,
}

/// The single current-location weather record held by the assistant.
///
/// Overwritten wholesale on each successful city load; read by the alert
/// policy and the outfit engine by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub weather_code: i32,
    pub humidity_percent: f64,
    pub wind_speed_kmh: f64,
    pub precipitation_mm: f64,
}

impl WeatherSnapshot {
    /// Build a snapshot for a named place from fetched current conditions.
    pub fn from_current(name: &str, country: &str, current: &CurrentConditions) -> Self {
        Self {
            location_name: name.to_string(),
            country: country.to_string(),
            temperature_c: current.temperature_c,
            feels_like_c: current.feels_like_c,
            weather_code: current.weather_code,
            humidity_percent: current.humidity_percent,
            wind_speed_kmh: current.wind_speed_kmh,
            precipitation_mm: current.precipitation_mm,
        }
    }

    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.weather_code)
    }

    /// "Name, Country", or just the name when the country is empty.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.location_name.clone()
        } else {
            format!("{}, {}", self.location_name, self.country)
        }
    }
}

/// One month of the historical-averages outlook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthOutlook {
    pub month_start: NaiveDate,
    /// e.g. "September 2026"
    pub label: String,
    pub high_c: f64,
    pub low_c: f64,
    pub mean_c: f64,
    /// Average monthly precipitation total across sampled years
    pub precipitation_mm: f64,
    /// Rough rain likelihood derived from the precipitation total
    pub precipitation_probability_percent: u32,
    /// Heuristic WMO code representing the typical month
    pub weather_code: i32,
    pub years_sampled: u32,
}

impl MonthOutlook {
    /// e.g. "10-year avg"
    pub fn source_label(&self) -> String {
        format!("{}-year avg", self.years_sampled)
    }
}

/// Weather data source errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Api { status, .. } => {
                format!("Weather service error ({}). Try again later.", status)
            }
            Self::Parse(_) => "Unexpected response from the weather service.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_wmo_code_clear() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::Clear);
    }

    #[test]
    fn test_wmo_code_partly_cloudy() {
        assert_eq!(WeatherCondition::from_wmo_code(1), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_wmo_code(2), WeatherCondition::PartlyCloudy);
    }

    #[test]
    fn test_wmo_code_fog() {
        assert_eq!(WeatherCondition::from_wmo_code(45), WeatherCondition::Fog);
        assert_eq!(WeatherCondition::from_wmo_code(48), WeatherCondition::Fog);
    }

    #[test]
    fn test_wmo_code_rain_family() {
        assert_eq!(WeatherCondition::from_wmo_code(51), WeatherCondition::Drizzle);
        assert_eq!(WeatherCondition::from_wmo_code(61), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_wmo_code(65), WeatherCondition::HeavyRain);
        assert_eq!(WeatherCondition::from_wmo_code(67), WeatherCondition::Sleet);
    }

    #[test]
    fn test_wmo_code_snow_family() {
        assert_eq!(WeatherCondition::from_wmo_code(71), WeatherCondition::Snow);
        assert_eq!(WeatherCondition::from_wmo_code(77), WeatherCondition::Snow);
        assert_eq!(WeatherCondition::from_wmo_code(85), WeatherCondition::Snow);
    }

    #[test]
    fn test_wmo_code_thunderstorm() {
        assert_eq!(WeatherCondition::from_wmo_code(95), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::from_wmo_code(96), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::from_wmo_code(99), WeatherCondition::Thunderstorm);
    }

    #[test]
    fn test_wmo_code_unknown_defaults_to_clear() {
        assert_eq!(WeatherCondition::from_wmo_code(999), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_wmo_code(-1), WeatherCondition::Clear);
    }

    #[test]
    fn test_condition_description() {
        assert_eq!(WeatherCondition::Clear.description(), "Clear sky");
        assert_eq!(WeatherCondition::Thunderstorm.description(), "Thunderstorm");
    }

    #[test]
    fn test_condition_symbol() {
        assert_eq!(WeatherCondition::Clear.symbol(), "☀️");
        assert_eq!(WeatherCondition::Thunderstorm.symbol(), "⛈️");
    }

    #[test]
    fn test_place_label_full() {
        let place = Place {
            name: "Tirupati".to_string(),
            country: "India".to_string(),
            admin1: Some("Andhra Pradesh".to_string()),
            latitude: 13.6288,
            longitude: 79.4192,
            population: Some(287_482),
        };
        assert_eq!(place.label(), "Tirupati, Andhra Pradesh, India");
    }

    #[test]
    fn test_place_label_skips_duplicate_region() {
        let place = Place {
            name: "Singapore".to_string(),
            country: "Singapore".to_string(),
            admin1: Some("Singapore".to_string()),
            latitude: 1.35,
            longitude: 103.82,
            population: None,
        };
        assert_eq!(place.label(), "Singapore, Singapore");
    }

    #[test]
    fn test_snapshot_from_current() {
        let current = CurrentConditions {
            temperature_c: 31.5,
            feels_like_c: 35.0,
            humidity_percent: 72.0,
            precipitation_mm: 0.0,
            weather_code: 2,
            cloud_cover_percent: 40.0,
            pressure_hpa: 1008.0,
            wind_speed_kmh: 12.0,
            wind_direction_deg: 180.0,
            wind_gusts_kmh: 20.0,
        };
        let snapshot = WeatherSnapshot::from_current("Tirupati", "India", &current);
        assert_eq!(snapshot.location_name, "Tirupati");
        assert_eq!(snapshot.weather_code, 2);
        assert_eq!(snapshot.condition(), WeatherCondition::PartlyCloudy);
        assert_eq!(snapshot.label(), "Tirupati, India");
    }

    #[test]
    fn test_outlook_source_label() {
        let outlook = MonthOutlook {
            month_start: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            label: "September 2026".to_string(),
            high_c: 33.0,
            low_c: 24.0,
            mean_c: 28.5,
            precipitation_mm: 120.0,
            precipitation_probability_percent: 100,
            weather_code: 61,
            years_sampled: 10,
        };
        assert_eq!(outlook.source_label(), "10-year avg");
    }

    #[test]
    fn test_error_user_messages() {
        let err = WeatherError::Api { status: 503, message: "unavailable".to_string() };
        assert!(err.user_message().contains("503"));

        let err = WeatherError::Parse("bad json".to_string());
        assert!(err.user_message().contains("Unexpected"));
    }
}
