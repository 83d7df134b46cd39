//! The orchestrator owning the current-location snapshot.

use tracing::instrument;

use nimbus_alerts::{
    city_key, AlertPolicy, AlertSettings, DedupKey, DedupLedger, Delivery,
    NotificationDispatcher,
};
use nimbus_outfit::{present, recommend, OutfitPresentation, OutfitRecommendation};
use nimbus_weather::{
    ForecastBundle, ForecastClient, ForecastDay, GeocodeClient, Place, WeatherError,
    WeatherSnapshot,
};

/// Advisory shown when an outfit is requested before any city was loaded.
pub const NO_LOCATION_ADVISORY: &str =
    "No location selected yet. Load a city first to get outfit advice.";

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("no matching city found for '{0}'")]
    CityNotFound(String),
    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl AssistantError {
    /// User-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::CityNotFound(query) => {
                format!("Couldn't find '{query}'. Try a different spelling.")
            }
            Self::Weather(e) => e.user_message(),
        }
    }
}

/// Result of a successful city load.
pub struct LoadedCity {
    pub place: Place,
    pub bundle: ForecastBundle,
    pub deliveries: Vec<Delivery>,
}

/// Outfit request result. `NoLocation` is an advisory, not an error.
pub enum OutfitReply {
    Recommendation {
        recommendation: OutfitRecommendation,
        presentation: OutfitPresentation,
    },
    NoLocation,
}

/// Holds the single current-location snapshot and wires the weather, alert
/// and outfit components together.
///
/// The snapshot is overwritten wholesale on each successful load; there is
/// no history and the last completed load wins.
pub struct WeatherAssistant {
    geocode: GeocodeClient,
    forecast: ForecastClient,
    policy: AlertPolicy,
    settings: AlertSettings,
    ledger: DedupLedger,
    dispatcher: NotificationDispatcher,
    snapshot: Option<WeatherSnapshot>,
}

impl WeatherAssistant {
    pub fn new(
        geocode: GeocodeClient,
        forecast: ForecastClient,
        policy: AlertPolicy,
        settings: AlertSettings,
        ledger: DedupLedger,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            geocode,
            forecast,
            policy,
            settings,
            ledger,
            dispatcher,
            snapshot: None,
        }
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn settings(&self) -> &AlertSettings {
        &self.settings
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Geocode a query, fetch its forecast and absorb the result.
    ///
    /// An empty geocode result is `CityNotFound`; geocoding itself never
    /// errors. Forecast failures propagate.
    #[instrument(skip(self), level = "info")]
    pub async fn load_city(&mut self, query: &str) -> Result<LoadedCity, AssistantError> {
        let places = self.geocode.search(query).await;
        let Some(place) = places.into_iter().next() else {
            return Err(AssistantError::CityNotFound(query.to_string()));
        };
        tracing::info!("Loading weather for {}", place.label());

        let bundle = self.forecast.fetch(place.latitude, place.longitude).await?;
        let snapshot = WeatherSnapshot::from_current(&place.name, &place.country, &bundle.current);
        let deliveries = self.on_forecast_loaded(snapshot, &bundle.days).await;

        Ok(LoadedCity { place, bundle, deliveries })
    }

    /// Store the snapshot and run today's alerts.
    ///
    /// With alerts disabled nothing is evaluated and no dedup keys are
    /// marked, so enabling later the same day can still fire that day's
    /// alerts once. Only day 0 is ever evaluated.
    pub async fn on_forecast_loaded(
        &mut self,
        snapshot: WeatherSnapshot,
        days: &[ForecastDay],
    ) -> Vec<Delivery> {
        let key = city_key(&snapshot.location_name, &snapshot.country);
        let label = snapshot.label();
        self.snapshot = Some(snapshot);

        if !self.settings.enabled() {
            tracing::debug!("Alerts disabled, skipping evaluation for {}", label);
            return Vec::new();
        }
        let Some(today) = days.first() else {
            return Vec::new();
        };

        let mut deliveries = Vec::new();
        for notice in self.policy.evaluate(&label, &key, today) {
            let dedup_key = DedupKey::new(notice.kind, key.clone(), today.date);
            match self.ledger.first_dispatch(&dedup_key) {
                Ok(true) => deliveries.push(self.dispatcher.dispatch(&notice).await),
                Ok(false) => {
                    tracing::debug!("Already sent today, suppressing: {}", notice.tag);
                }
                Err(e) => {
                    // Failing open would risk double-sends on flaky storage
                    tracing::warn!("Dedup check failed, suppressing {}: {}", notice.tag, e);
                }
            }
        }
        deliveries
    }

    /// Outfit for the current snapshot, or the no-location advisory.
    pub fn request_outfit(&self) -> OutfitReply {
        let Some(snapshot) = &self.snapshot else {
            tracing::debug!("Outfit requested with no snapshot loaded");
            return OutfitReply::NoLocation;
        };

        let recommendation = recommend(
            snapshot.temperature_c,
            snapshot.weather_code,
            snapshot.precipitation_mm,
            snapshot.humidity_percent,
            snapshot.wind_speed_kmh,
        );
        let presentation = present(
            &recommendation,
            snapshot.temperature_c,
            snapshot.condition().description(),
            snapshot.humidity_percent,
            snapshot.wind_speed_kmh,
        );
        OutfitReply::Recommendation { recommendation, presentation }
    }
}
