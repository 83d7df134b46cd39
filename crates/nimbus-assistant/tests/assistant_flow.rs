//! End-to-end flows through geocoding, forecast, alerts and outfits.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nimbus_alerts::{
    AlertKind, AlertNotice, AlertPolicy, AlertSettings, DedupLedger, Delivery, DeliveryError,
    NotificationBackend, NotificationDispatcher, Permission, Toast, ToastSink,
};
use nimbus_assistant::{AssistantError, OutfitReply, WeatherAssistant};
use nimbus_store::MemoryFlagStore;
use nimbus_weather::{ForecastClient, GeocodeClient};

/// Native backend that always succeeds and records what it sent.
#[derive(Default)]
struct GrantedBackend {
    delivered: Mutex<Vec<AlertNotice>>,
}

#[async_trait]
impl NotificationBackend for GrantedBackend {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn deliver(&self, notice: &AlertNotice) -> Result<(), DeliveryError> {
        self.delivered.lock().push(notice.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastSink for RecordingSink {
    fn push(&self, toast: Toast) -> bool {
        self.toasts.lock().push(toast);
        true
    }
}

struct Harness {
    assistant: WeatherAssistant,
    backend: Arc<GrantedBackend>,
    sink: Arc<RecordingSink>,
}

fn harness(geocode_server: &MockServer, forecast_server: &MockServer, alerts_enabled: bool) -> Harness {
    let store = Arc::new(MemoryFlagStore::new());
    let settings = AlertSettings::new(store.clone());
    settings.set_enabled(alerts_enabled);

    let backend = Arc::new(GrantedBackend::default());
    let sink = Arc::new(RecordingSink::default());
    let dispatcher =
        NotificationDispatcher::new(settings.clone(), backend.clone(), sink.clone());

    let assistant = WeatherAssistant::new(
        GeocodeClient::new(&geocode_server.uri(), Duration::from_secs(2)).unwrap(),
        ForecastClient::new(&forecast_server.uri(), Duration::from_secs(2), 7).unwrap(),
        AlertPolicy::default(),
        settings,
        DedupLedger::new(store),
        dispatcher,
    );

    Harness { assistant, backend, sink }
}

fn geocode_payload() -> serde_json::Value {
    serde_json::json!({
        "results": [{
            "name": "Tirupati",
            "country": "India",
            "admin1": "Andhra Pradesh",
            "latitude": 13.6288,
            "longitude": 79.4192,
            "population": 287_482
        }]
    })
}

fn forecast_payload(
    temp_max: f64,
    precip_prob: f64,
    precip_sum: f64,
    code: i32,
) -> serde_json::Value {
    serde_json::json!({
        "current": {
            "temperature_2m": 20.0,
            "relative_humidity_2m": 50,
            "apparent_temperature": 21.0,
            "precipitation": 0.0,
            "weather_code": 1,
            "cloud_cover": 20,
            "pressure_msl": 1010.0,
            "wind_speed_10m": 25.0,
            "wind_direction_10m": 180,
            "wind_gusts_10m": 30.0
        },
        "daily": {
            "time": ["2026-08-25"],
            "weather_code": [code],
            "temperature_2m_max": [temp_max],
            "temperature_2m_min": [24.0],
            "precipitation_sum": [precip_sum],
            "precipitation_probability_max": [precip_prob],
            "wind_speed_10m_max": [30.0]
        }
    })
}

async fn mount_city(geocode_server: &MockServer, forecast_server: &MockServer, forecast: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_payload()))
        .mount(geocode_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast))
        .mount(forecast_server)
        .await;
}

#[tokio::test]
async fn test_outfit_before_any_city_is_advisory() {
    let geocode_server = MockServer::start().await;
    let forecast_server = MockServer::start().await;
    let harness = harness(&geocode_server, &forecast_server, false);

    assert!(matches!(harness.assistant.request_outfit(), OutfitReply::NoLocation));
}

#[tokio::test]
async fn test_heat_alert_fires_once_per_day() {
    let geocode_server = MockServer::start().await;
    let forecast_server = MockServer::start().await;
    mount_city(&geocode_server, &forecast_server, forecast_payload(39.0, 10.0, 0.0, 1)).await;
    let mut harness = harness(&geocode_server, &forecast_server, true);

    let loaded = harness.assistant.load_city("Tirupati").await.unwrap();
    assert_eq!(loaded.deliveries, vec![Delivery::Native]);

    let delivered = harness.backend.delivered.lock().clone();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].kind, AlertKind::Heat);
    assert_eq!(delivered[0].title, "Heat warning: Tirupati, India");
    assert!(harness.sink.toasts.lock().is_empty());

    // Same city, same day: evaluation runs again but nothing is re-sent
    let reloaded = harness.assistant.load_city("Tirupati").await.unwrap();
    assert!(reloaded.deliveries.is_empty());
    assert_eq!(harness.backend.delivered.lock().len(), 1);
}

#[tokio::test]
async fn test_rain_fires_on_probability_even_with_low_sum() {
    let geocode_server = MockServer::start().await;
    let forecast_server = MockServer::start().await;
    mount_city(&geocode_server, &forecast_server, forecast_payload(30.0, 65.0, 2.0, 1)).await;
    let mut harness = harness(&geocode_server, &forecast_server, true);

    let loaded = harness.assistant.load_city("Tirupati").await.unwrap();
    assert_eq!(loaded.deliveries.len(), 1);

    let delivered = harness.backend.delivered.lock().clone();
    assert_eq!(delivered[0].kind, AlertKind::Rain);
    assert_eq!(
        delivered[0].body,
        "Chance: 65% | Expected: 2 mm. Carry an umbrella / raincoat."
    );
}

#[tokio::test]
async fn test_windy_day_outfit_end_to_end() {
    let geocode_server = MockServer::start().await;
    let forecast_server = MockServer::start().await;
    mount_city(&geocode_server, &forecast_server, forecast_payload(30.0, 10.0, 0.0, 1)).await;
    let mut harness = harness(&geocode_server, &forecast_server, false);

    harness.assistant.load_city("Tirupati").await.unwrap();

    // 20C current with 25 km/h wind: chill 18, mild band plus wind gear
    let OutfitReply::Recommendation { recommendation, presentation } =
        harness.assistant.request_outfit()
    else {
        panic!("expected a recommendation after a successful load");
    };
    assert_eq!(recommendation.top[0], "T-shirt");
    assert!(recommendation.outer.contains(&"Windbreaker".to_string()));
    assert!(recommendation
        .extras
        .contains(&"Wind protection advised".to_string()));
    assert!(presentation.summary.contains("Windy"));
}

#[tokio::test]
async fn test_unknown_city_is_an_advisory_not_a_crash() {
    let geocode_server = MockServer::start().await;
    let forecast_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })))
        .mount(&geocode_server)
        .await;
    let mut harness = harness(&geocode_server, &forecast_server, true);

    let result = harness.assistant.load_city("Atlantis").await;
    match result {
        Err(AssistantError::CityNotFound(query)) => {
            assert_eq!(query, "Atlantis");
        }
        _ => panic!("expected CityNotFound"),
    }
    assert!(harness.assistant.snapshot().is_none());
}

#[tokio::test]
async fn test_disabled_alerts_leave_dedup_unmarked() {
    let geocode_server = MockServer::start().await;
    let forecast_server = MockServer::start().await;
    mount_city(&geocode_server, &forecast_server, forecast_payload(39.0, 10.0, 0.0, 1)).await;
    let mut harness = harness(&geocode_server, &forecast_server, false);

    // Disabled: snapshot lands but nothing is evaluated or marked
    let loaded = harness.assistant.load_city("Tirupati").await.unwrap();
    assert!(loaded.deliveries.is_empty());
    assert!(harness.assistant.snapshot().is_some());
    assert!(harness.backend.delivered.lock().is_empty());

    // Enabling later the same day still gets that day's alert exactly once
    harness.assistant.settings().set_enabled(true);
    let loaded = harness.assistant.load_city("Tirupati").await.unwrap();
    assert_eq!(loaded.deliveries, vec![Delivery::Native]);
    assert_eq!(harness.backend.delivered.lock().len(), 1);
}
