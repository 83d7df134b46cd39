//! City search against the Open-Meteo geocoding API.
//!
//! Lookup failures are swallowed: the caller gets an empty result set and the
//! failure is only logged, so a flaky geocoder reads the same as "no match".

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::types::{Place, WeatherError};

const RESULT_LIMIT: &str = "10";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Option<Vec<ApiPlace>>,
}

#[derive(Debug, Deserialize)]
struct ApiPlace {
    name: String,
    country: Option<String>,
    admin1: Option<String>,
    latitude: f64,
    longitude: f64,
    population: Option<u64>,
}

impl ApiPlace {
    fn into_place(self) -> Place {
        Place {
            name: self.name,
            country: self.country.unwrap_or_default(),
            admin1: self.admin1,
            latitude: self.latitude,
            longitude: self.longitude,
            population: self.population,
        }
    }
}

/// Open-Meteo geocoding client
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    base_url: String,
    client: Client,
}

impl GeocodeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Search for places matching a free-text city query.
    ///
    /// Returns the API's match order (best first). Empty on no match, network
    /// failure or a bad response; failures are logged, never surfaced.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, query: &str) -> Vec<Place> {
        let url = format!("{}/v1/search", self.base_url);

        let response = match self
            .client
            .get(&url)
            .query(&[
                ("name", query),
                ("count", RESULT_LIMIT),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Geocoding request failed: {}", e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Geocoding returned status {}", response.status());
            return Vec::new();
        }

        let body: SearchResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Geocoding parse error: {}", e);
                return Vec::new();
            }
        };

        let places: Vec<Place> = body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(ApiPlace::into_place)
            .collect();

        tracing::info!("Found {} places for '{}'", places.len(), query);
        places
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> GeocodeClient {
        GeocodeClient::new(base_url, Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_search_returns_places_in_api_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "tirupati"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {
                        "name": "Tirupati",
                        "country": "India",
                        "admin1": "Andhra Pradesh",
                        "latitude": 13.6288,
                        "longitude": 79.4192,
                        "population": 287482
                    },
                    {
                        "name": "Tirupati",
                        "country": "India",
                        "latitude": 13.65,
                        "longitude": 79.42
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let places = client.search("tirupati").await;

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Tirupati");
        assert_eq!(places[0].country, "India");
        assert_eq!(places[0].admin1.as_deref(), Some("Andhra Pradesh"));
        assert_eq!(places[1].population, None);
    }

    #[tokio::test]
    async fn test_search_no_match_is_empty() {
        let mock_server = MockServer::start().await;

        // Open-Meteo omits "results" entirely when nothing matches
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "generationtime_ms": 0.5
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        assert!(client.search("xyzzy").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_server_error_is_swallowed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        assert!(client.search("oslo").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_unreachable_host_is_swallowed() {
        // Nothing listens on this port
        let client = test_client("http://127.0.0.1:9");
        assert!(client.search("oslo").await.is_empty());
    }
}
