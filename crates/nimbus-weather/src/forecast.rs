//! Current conditions and daily forecast from the Open-Meteo forecast API.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::retry::{with_retry, RetryConfig};
use crate::types::{CurrentConditions, ForecastBundle, ForecastDay, WeatherError};

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
precipitation,weather_code,cloud_cover,pressure_msl,wind_speed_10m,wind_direction_10m,\
wind_gusts_10m";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,\
precipitation_sum,precipitation_probability_max,wind_speed_10m_max";

#[derive(Debug, Deserialize)]
struct ApiForecastResponse {
    current: ApiCurrent,
    daily: ApiDaily,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    precipitation: f64,
    weather_code: i32,
    cloud_cover: f64,
    pressure_msl: f64,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    wind_gusts_10m: f64,
}

impl ApiCurrent {
    fn into_current(self) -> CurrentConditions {
        CurrentConditions {
            temperature_c: self.temperature_2m,
            feels_like_c: self.apparent_temperature,
            humidity_percent: self.relative_humidity_2m,
            precipitation_mm: self.precipitation,
            weather_code: self.weather_code,
            cloud_cover_percent: self.cloud_cover,
            pressure_hpa: self.pressure_msl,
            wind_speed_kmh: self.wind_speed_10m,
            wind_direction_deg: self.wind_direction_10m,
            wind_gusts_kmh: self.wind_gusts_10m,
        }
    }
}

/// Daily values arrive as parallel arrays indexed by day offset; individual
/// slots can be null.
#[derive(Debug, Deserialize)]
struct ApiDaily {
    time: Vec<chrono::NaiveDate>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
}

impl ApiDaily {
    /// Zip the parallel arrays into typed days. Null or missing slots stay
    /// `None` so downstream rules can skip them.
    fn into_days(self) -> Vec<ForecastDay> {
        self.time
            .iter()
            .enumerate()
            .map(|(i, date)| ForecastDay {
                date: *date,
                weather_code: self.weather_code.get(i).copied().flatten(),
                temperature_max_c: self.temperature_2m_max.get(i).copied().flatten(),
                temperature_min_c: self.temperature_2m_min.get(i).copied().flatten(),
                precipitation_sum_mm: self.precipitation_sum.get(i).copied().flatten(),
                precipitation_probability_percent: self
                    .precipitation_probability_max
                    .get(i)
                    .copied()
                    .flatten(),
                wind_speed_max_kmh: self.wind_speed_10m_max.get(i).copied().flatten(),
            })
            .collect()
    }
}

/// Open-Meteo forecast client
#[derive(Debug, Clone)]
pub struct ForecastClient {
    base_url: String,
    client: Client,
    forecast_days: u32,
    retry: RetryConfig,
}

impl ForecastClient {
    pub fn new(base_url: &str, timeout: Duration, forecast_days: u32) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            forecast_days,
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy (tests disable retries).
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch current conditions plus the daily outlook for a coordinate.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<ForecastBundle, WeatherError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let params = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", self.forecast_days.to_string()),
        ];

        let response = with_retry(&self.retry, || {
            self.client.get(&url).query(&params).send()
        })
        .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api { status: status.as_u16(), message });
        }

        let api: ApiForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let bundle = ForecastBundle {
            current: api.current.into_current(),
            days: api.daily.into_days(),
        };

        tracing::info!(
            "Fetched forecast: {:.1}°C now, {} days",
            bundle.current.temperature_c,
            bundle.days.len()
        );
        Ok(bundle)
    }
}
