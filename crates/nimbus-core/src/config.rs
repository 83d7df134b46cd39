use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Application data directory (flag store lives here)
    pub data_dir: PathBuf,

    /// Default location loaded when no city is given
    #[serde(default)]
    pub home: HomeConfig,

    /// Weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Historical climate outlook settings
    #[serde(default)]
    pub climate: ClimateConfig,

    /// Alert thresholds
    #[serde(default)]
    pub alerts: AlertsConfig,
}

/// Default city to load on startup when no query is given
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeConfig {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            city: "Tirupati".to_string(),
            country: "India".to_string(),
            latitude: 13.6288,
            longitude: 79.4192,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Number of forecast days to request (API supports up to 16)
    pub forecast_days: u32,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// Geocoding API base URL
    pub geocode_base_url: String,

    /// Forecast API base URL
    pub forecast_base_url: String,

    /// Historical archive API base URL
    pub archive_base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_days: 7,
            request_timeout_secs: 10,
            geocode_base_url: "https://geocoding-api.open-meteo.com".to_string(),
            forecast_base_url: "https://api.open-meteo.com".to_string(),
            archive_base_url: "https://archive-api.open-meteo.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateConfig {
    /// How many upcoming months to include in the outlook
    pub months_ahead: u32,

    /// How many past years to average over
    pub years_back: u32,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            months_ahead: 6,
            years_back: 10,
        }
    }
}

/// Alert thresholds; mirrored into the alert policy at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Rain alert fires at or above this precipitation probability (%)
    pub rain_probability_percent: f64,

    /// Rain alert also fires at or above this precipitation sum (mm)
    pub rain_sum_mm: f64,

    /// Heat warning fires at or above this daily maximum (°C)
    pub heat_max_c: f64,

    /// Cold warning fires at or below this daily minimum (°C)
    pub cold_min_c: f64,

    /// Storm alert fires at or above this WMO weather code
    pub storm_code_min: i32,
}

impl Default for AlertsConfig {
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

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nimbus");
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nimbus");

        Self {
            config_dir,
            data_dir,
            home: HomeConfig::default(),
            weather: WeatherConfig::default(),
            climate: ClimateConfig::default(),
            alerts: AlertsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Validate API base URLs
        self.validate_url(
            &self.weather.geocode_base_url,
            "weather.geocode_base_url",
            &mut result,
        );
        self.validate_url(
            &self.weather.forecast_base_url,
            "weather.forecast_base_url",
            &mut result,
        );
        self.validate_url(
            &self.weather.archive_base_url,
            "weather.archive_base_url",
            &mut result,
        );

        // Validate forecast window
        if self.weather.forecast_days == 0 {
            result.add_error("weather.forecast_days", "Must request at least 1 forecast day");
        } else if self.weather.forecast_days > 16 {
            result.add_error(
                "weather.forecast_days",
                "Open-Meteo supports at most 16 forecast days",
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error("weather.request_timeout_secs", "Timeout must be greater than 0");
        } else if self.weather.request_timeout_secs > 120 {
            result.add_warning(
                "weather.request_timeout_secs",
                "Timeout is unusually long (>120s)",
            );
        }

        // Validate climate outlook window
        if self.climate.months_ahead == 0 {
            result.add_warning("climate.months_ahead", "Climate outlook disabled (0 months)");
        } else if self.climate.months_ahead > 12 {
            result.add_warning(
                "climate.months_ahead",
                "Outlook beyond 12 months repeats the calendar",
            );
        }

        if self.climate.years_back == 0 {
            result.add_error("climate.years_back", "Must average over at least 1 year");
        } else if self.climate.years_back > 30 {
            result.add_warning(
                "climate.years_back",
                "Averaging over more than 30 years of archive data",
            );
        }

        // Validate home coordinates
        if !(-90.0..=90.0).contains(&self.home.latitude) {
            result.add_error("home.latitude", "Latitude must be between -90 and 90");
        }
        if !(-180.0..=180.0).contains(&self.home.longitude) {
            result.add_error("home.longitude", "Longitude must be between -180 and 180");
        }

        // Validate alert thresholds
        if self.alerts.rain_probability_percent > 100.0 {
            result.add_warning(
                "alerts.rain_probability_percent",
                "Probability above 100% can never fire",
            );
        }
        if self.alerts.rain_probability_percent < 0.0 {
            result.add_warning(
                "alerts.rain_probability_percent",
                "Negative probability fires on every forecast",
            );
        }
        if self.alerts.rain_sum_mm < 0.0 {
            result.add_warning("alerts.rain_sum_mm", "Negative sum fires on every forecast");
        }
        if self.alerts.heat_max_c <= self.alerts.cold_min_c {
            result.add_warning(
                "alerts",
                "heat_max_c at or below cold_min_c fires both alerts on mild days",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                // Check scheme
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                // Check host
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(
                    field_name,
                    format!("Invalid URL: {}", e),
                );
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Path to the SQLite flag store
    pub fn flag_store_path(&self) -> PathBuf {
        self.data_dir.join("flags.db")
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("nimbus");

        Ok(config_dir.join("config.toml"))
    }
}
