//! Open-Meteo data sources: city search, current/daily forecasts and
//! historical climate averages.
//!
//! All clients take their base URL at construction so tests can point them at
//! a mock server. Geocoding swallows failures (empty result set); forecast and
//! climate lookups surface `WeatherError` for the caller to degrade on.

pub mod climate;
pub mod forecast;
pub mod geocode;
pub mod retry;
pub mod types;

pub use climate::ClimateClient;
pub use forecast::ForecastClient;
pub use geocode::GeocodeClient;
pub use types::{
    CurrentConditions, ForecastBundle, ForecastDay, MonthOutlook, Place, WeatherCondition,
    WeatherError, WeatherSnapshot,
};
