//! Orchestration: holds the current weather snapshot, routes forecasts
//! through the alert pipeline and answers outfit and chat requests.

pub mod assistant;
pub mod chat;

pub use assistant::{
    AssistantError, LoadedCity, OutfitReply, WeatherAssistant, NO_LOCATION_ADVISORY,
};
pub use chat::{ChatEngine, FixedRandom, Intent, RandomSource, ThreadRandom};
