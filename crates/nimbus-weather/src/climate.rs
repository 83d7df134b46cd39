//! Seasonal outlook built from the Open-Meteo historical archive.
//!
//! For each upcoming month the same calendar month is fetched for up to
//! `years_back` past years and averaged. A year that fails to fetch is
//! skipped; a month with no successful years is omitted from the outlook
//! entirely rather than zero-filled.

use chrono::{Datelike, Months, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::retry::{with_retry, RetryConfig};
use crate::types::{MonthOutlook, WeatherError};

const ARCHIVE_DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum";

#[derive(Debug, Deserialize)]
struct ApiArchiveResponse {
    daily: ApiArchiveDaily,
}

#[derive(Debug, Deserialize)]
struct ApiArchiveDaily {
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

/// Per-year aggregate of one calendar month
struct YearSample {
    t_max: f64,
    t_min: f64,
    precip_total: f64,
}

fn year_sample(daily: &ApiArchiveDaily) -> Option<YearSample> {
    let t_max = mean_of(&daily.temperature_2m_max)?;
    let t_min = mean_of(&daily.temperature_2m_min)?;
    Some(YearSample {
        t_max,
        t_min,
        precip_total: sum_of(&daily.precipitation_sum),
    })
}

fn mean_of(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().copied().flatten().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

fn sum_of(values: &[Option<f64>]) -> f64 {
    values.iter().copied().flatten().sum()
}

/// Rain likelihood from a month's average precipitation total, capped at 100%.
fn estimate_precip_probability(avg_precip_mm: f64) -> u32 {
    ((avg_precip_mm / 30.0 * 100.0).round() as u32).min(100)
}

/// Representative WMO code for the month: rain over wet months, some cloud
/// over damp ones, clear otherwise.
fn estimate_weather_code(avg_precip_mm: f64) -> i32 {
    if avg_precip_mm > 50.0 {
        61
    } else if avg_precip_mm > 10.0 {
        3
    } else {
        0
    }
}

/// Open-Meteo historical archive client
#[derive(Debug, Clone)]
pub struct ClimateClient {
    base_url: String,
    client: Client,
    months_ahead: u32,
    years_back: u32,
    retry: RetryConfig,
}

impl ClimateClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        months_ahead: u32,
        years_back: u32,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            months_ahead,
            years_back,
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy (tests disable retries).
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Outlook for the upcoming months, anchored at today.
    pub async fn monthly_outlook(&self, latitude: f64, longitude: f64) -> Vec<MonthOutlook> {
        self.outlook_from(latitude, longitude, Utc::now().date_naive())
            .await
    }

    /// Outlook anchored at an explicit date; the anchor's own month comes
    /// first. Fetch failures only shrink the result, they never error.
    #[instrument(skip(self), level = "info")]
    pub async fn outlook_from(
        &self,
        latitude: f64,
        longitude: f64,
        anchor: NaiveDate,
    ) -> Vec<MonthOutlook> {
        let mut outlook = Vec::new();

        for offset in 0..self.months_ahead {
            let Some(month_start) = anchor
                .with_day(1)
                .and_then(|d| d.checked_add_months(Months::new(offset)))
            else {
                continue;
            };
            let label = month_start.format("%B %Y").to_string();

            let mut t_max_sum = 0.0;
            let mut t_min_sum = 0.0;
            let mut precip_sum = 0.0;
            let mut valid_years = 0u32;

            for back in 1..=self.years_back {
                let year = month_start.year() - back as i32;
                let Some(start) = NaiveDate::from_ymd_opt(year, month_start.month(), 1) else {
                    continue;
                };
                let Some(end) = start
                    .checked_add_months(Months::new(1))
                    .and_then(|d| d.pred_opt())
                else {
                    continue;
                };

                match self.fetch_month(latitude, longitude, start, end).await {
                    Ok(daily) => {
                        if let Some(sample) = year_sample(&daily) {
                            t_max_sum += sample.t_max;
                            t_min_sum += sample.t_min;
                            precip_sum += sample.precip_total;
                            valid_years += 1;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Skipping archive year {} for {}: {}", year, label, e);
                    }
                }
            }

            if valid_years == 0 {
                tracing::warn!("No archive data for {}, omitting from outlook", label);
                continue;
            }

            let high_c = t_max_sum / f64::from(valid_years);
            let low_c = t_min_sum / f64::from(valid_years);
            let precipitation_mm = precip_sum / f64::from(valid_years);

            outlook.push(MonthOutlook {
                month_start,
                label,
                high_c,
                low_c,
                mean_c: (high_c + low_c) / 2.0,
                precipitation_mm,
                precipitation_probability_percent: estimate_precip_probability(precipitation_mm),
                weather_code: estimate_weather_code(precipitation_mm),
                years_sampled: valid_years,
            });
        }

        tracing::info!("Built outlook for {} of {} months", outlook.len(), self.months_ahead);
        outlook
    }

    async fn fetch_month(
        &self,
        latitude: f64,
        longitude: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ApiArchiveDaily, WeatherError> {
        let url = format!("{}/v1/archive", self.base_url);
        let params = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
            ("daily", ARCHIVE_DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
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

        let api: ApiArchiveResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;
        Ok(api.daily)
    }
}
