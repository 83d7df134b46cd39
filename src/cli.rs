//! Command definitions and dispatch.
//!
//! Every subcommand builds its own short-lived wiring from the loaded
//! configuration; the flag store under the data directory is the only state
//! shared between runs.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use nimbus_alerts::{
    AlertPolicy, AlertSettings, AlertThresholds, DedupLedger, NotificationDispatcher,
    UnsupportedBackend,
};
use nimbus_assistant::{ChatEngine, OutfitReply, ThreadRandom, WeatherAssistant};
use nimbus_core::{AlertsConfig, Config};
use nimbus_outfit::advice;
use nimbus_store::SqliteFlagStore;
use nimbus_weather::{ClimateClient, ForecastClient, GeocodeClient};

use crate::render::{self, TerminalToastSink};

#[derive(Debug, Parser)]
#[command(name = "nimbus", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Current conditions and the daily forecast for a city
    Forecast {
        /// City to look up; defaults to the configured home city
        query: Option<String>,
    },
    /// Outfit suggestions for a city's current conditions
    Outfit {
        /// City to look up; defaults to the configured home city
        query: Option<String>,
    },
    /// Typical conditions for the upcoming months, averaged from past years
    Climate {
        /// City to look up; defaults to the configured home city
        query: Option<String>,
    },
    /// Manage weather alerts
    Alerts {
        #[command(subcommand)]
        action: AlertsAction,
    },
    /// Chat with the weather assistant
    Chat,
}

#[derive(Debug, Subcommand)]
enum AlertsAction {
    /// Turn alerts on, requesting notification permission where needed
    Enable,
    /// Turn alerts off
    Disable,
    /// Show whether alerts are on
    Status,
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let (config, _) = Config::load_validated()?;
        tracing::debug!(
            config_dir = %config.config_dir.display(),
            "Configuration loaded"
        );

        match &self.command {
            Commands::Forecast { query } => forecast_command(&config, query.as_deref()).await,
            Commands::Outfit { query } => outfit_command(&config, query.as_deref()).await,
            Commands::Climate { query } => climate_command(&config, query.as_deref()).await,
            Commands::Alerts { action } => alerts_command(&config, action).await,
            Commands::Chat => chat_command(&config).await,
        }
    }
}

/// Wire the assistant from config: flag store, alert plumbing, API clients.
///
/// The terminal has no native notification channel, so the dispatcher gets
/// `UnsupportedBackend` and every alert lands as a printed toast.
fn build_assistant(config: &Config) -> Result<WeatherAssistant> {
    let timeout = Duration::from_secs(config.weather.request_timeout_secs);

    let store: Arc<SqliteFlagStore> = Arc::new(
        SqliteFlagStore::new(config.flag_store_path()).context("Failed to open flag store")?,
    );
    let settings = AlertSettings::new(store.clone());
    let ledger = DedupLedger::new(store);
    let dispatcher = NotificationDispatcher::new(
        settings.clone(),
        Arc::new(UnsupportedBackend),
        Arc::new(TerminalToastSink),
    );

    let geocode = GeocodeClient::new(&config.weather.geocode_base_url, timeout)?;
    let forecast = ForecastClient::new(
        &config.weather.forecast_base_url,
        timeout,
        config.weather.forecast_days,
    )?;
    let policy = AlertPolicy::new(thresholds_from(&config.alerts));

    Ok(WeatherAssistant::new(
        geocode, forecast, policy, settings, ledger, dispatcher,
    ))
}

fn thresholds_from(alerts: &AlertsConfig) -> AlertThresholds {
    AlertThresholds {
        rain_probability_percent: alerts.rain_probability_percent,
        rain_sum_mm: alerts.rain_sum_mm,
        heat_max_c: alerts.heat_max_c,
        cold_min_c: alerts.cold_min_c,
        storm_code_min: alerts.storm_code_min,
    }
}

async fn forecast_command(config: &Config, query: Option<&str>) -> Result<()> {
    let mut assistant = build_assistant(config)?;
    assistant.dispatcher().prompt_first_run();

    let query = query.unwrap_or(&config.home.city);
    match assistant.load_city(query).await {
        Ok(loaded) => {
            render::print_forecast(&loaded);
            let current = &loaded.bundle.current;
            println!();
            println!(
                "{}",
                advice(current.temperature_c, current.humidity_percent)
            );
        }
        // Lookup problems degrade to an advisory; the command itself succeeds.
        Err(e) => println!("{}", e.user_message()),
    }
    Ok(())
}

async fn outfit_command(config: &Config, query: Option<&str>) -> Result<()> {
    let mut assistant = build_assistant(config)?;

    let query = query.unwrap_or(&config.home.city);
    if let Err(e) = assistant.load_city(query).await {
        println!("{}", e.user_message());
        return Ok(());
    }

    match assistant.request_outfit() {
        OutfitReply::Recommendation { presentation, .. } => {
            let advice_line = assistant
                .snapshot()
                .map(|s| advice(s.temperature_c, s.humidity_percent))
                .unwrap_or_default();
            render::print_outfit(&presentation, advice_line);
        }
        OutfitReply::NoLocation => println!("{}", nimbus_assistant::NO_LOCATION_ADVISORY),
    }
    Ok(())
}

async fn climate_command(config: &Config, query: Option<&str>) -> Result<()> {
    let timeout = Duration::from_secs(config.weather.request_timeout_secs);
    let geocode = GeocodeClient::new(&config.weather.geocode_base_url, timeout)?;
    let climate = ClimateClient::new(
        &config.weather.archive_base_url,
        timeout,
        config.climate.months_ahead,
        config.climate.years_back,
    )?;

    let (label, latitude, longitude) = match query {
        Some(q) => {
            let places = geocode.search(q).await;
            match places.into_iter().next() {
                Some(place) => (place.label(), place.latitude, place.longitude),
                None => {
                    println!("Couldn't find '{}'. Try a different spelling.", q);
                    return Ok(());
                }
            }
        }
        None => (
            format!("{}, {}", config.home.city, config.home.country),
            config.home.latitude,
            config.home.longitude,
        ),
    };

    println!("Averaging past years for {label}; this can take a moment.");
    let outlook = climate.monthly_outlook(latitude, longitude).await;
    if outlook.is_empty() {
        println!("No historical data available right now. Try again later.");
        return Ok(());
    }
    render::print_outlook(&label, &outlook);
    Ok(())
}

async fn alerts_command(config: &Config, action: &AlertsAction) -> Result<()> {
    let assistant = build_assistant(config)?;

    // Outcome feedback arrives through the toast sink, so enable/disable
    // print nothing of their own.
    match action {
        AlertsAction::Enable => {
            assistant.dispatcher().request_enable().await;
        }
        AlertsAction::Disable => {
            assistant.dispatcher().disable();
        }
        AlertsAction::Status => {
            if assistant.settings().enabled() {
                println!("Alerts: on. Rain, heat, cold and storm warnings print with forecasts.");
            } else {
                println!("Alerts: off. Run 'nimbus alerts enable' to turn them on.");
            }
        }
    }
    Ok(())
}

async fn chat_command(config: &Config) -> Result<()> {
    let mut assistant = build_assistant(config)?;
    let engine =
        ChatEngine::new(Box::new(ThreadRandom)).context("Failed to build chat patterns")?;

    println!("Nimbus chat. Ask about the weather, outfits or alerts; 'quit' to leave.");
    match assistant.load_city(&config.home.city).await {
        Ok(loaded) => println!("Watching {}.", loaded.place.label()),
        Err(e) => println!("{}", e.user_message()),
    }
    println!();

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("you> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("quit") || text.eq_ignore_ascii_case("exit") {
            break;
        }

        let reply = engine.respond(&assistant, text).await;
        println!("nimbus> {reply}");
        println!();
    }
    Ok(())
}
