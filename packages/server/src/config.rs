//! Server configuration from environment variables.
//!
//! Required: `GEOCODE_API_KEY`, `MAPBOX_ACCESS_TOKEN`. Everything else has
//! a default. Command-line flags are layered on top by the binary.

use std::path::PathBuf;
use std::time::Duration;

use resto_map_http::RetryPolicy;
use resto_map_inspection::{DEFAULT_TOP_N, DatasetSource};

/// Largest number of restaurants a single request may ask for.
pub const MAX_TOP_N: usize = 50;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GEOCODE_CONCURRENCY: usize = 4;
const DEFAULT_GEOCODE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_GEOCODE_MAX_RETRIES: u32 = 3;

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("Missing required environment variable {name}")]
    Missing {
        /// Variable name.
        name: &'static str,
    },

    /// A variable is set but cannot be used.
    #[error("Invalid value {value:?} for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// The offending value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Runtime configuration for the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Google Geocoding API key.
    pub geocode_api_key: String,
    /// Map tile provider access token, passed through to the frontend.
    pub mapbox_access_token: String,
    /// Where the inspection CSV comes from. `DATASET_PATH` wins over
    /// `DATASET_URL`.
    pub dataset: DatasetSource,
    /// Address to bind the HTTP server to.
    pub bind_addr: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Default number of restaurants per selection.
    pub top_n: usize,
    /// Geocoding lookups in flight per request.
    pub geocode_concurrency: usize,
    /// Timeout for each geocoding attempt.
    pub geocode_timeout: Duration,
    /// Retries per geocoding lookup after the first attempt.
    pub geocode_max_retries: u32,
    /// Alternate geocoding endpoint.
    pub geocode_base_url: Option<String>,
    /// Directory of static frontend files served at `/`.
    pub static_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Reads configuration through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing { name });

        let dataset = if let Some(path) = get("DATASET_PATH") {
            DatasetSource::File(PathBuf::from(path))
        } else if let Some(url) = get("DATASET_URL") {
            DatasetSource::Url(url)
        } else {
            DatasetSource::default()
        };

        let top_n = parse_or(get("TOP_N"), "TOP_N", DEFAULT_TOP_N)?;
        if top_n > MAX_TOP_N {
            return Err(ConfigError::Invalid {
                name: "TOP_N",
                value: top_n.to_string(),
                reason: format!("must be at most {MAX_TOP_N}"),
            });
        }

        let geocode_concurrency = parse_or(
            get("GEOCODE_CONCURRENCY"),
            "GEOCODE_CONCURRENCY",
            DEFAULT_GEOCODE_CONCURRENCY,
        )?;
        if geocode_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "GEOCODE_CONCURRENCY",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let timeout_secs: u64 = parse_or(
            get("GEOCODE_TIMEOUT_SECS"),
            "GEOCODE_TIMEOUT_SECS",
            DEFAULT_GEOCODE_TIMEOUT_SECS,
        )?;

        Ok(Self {
            geocode_api_key: require("GEOCODE_API_KEY")?,
            mapbox_access_token: require("MAPBOX_ACCESS_TOKEN")?,
            dataset,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
            top_n,
            geocode_concurrency,
            geocode_timeout: Duration::from_secs(timeout_secs),
            geocode_max_retries: parse_or(
                get("GEOCODE_MAX_RETRIES"),
                "GEOCODE_MAX_RETRIES",
                DEFAULT_GEOCODE_MAX_RETRIES,
            )?,
            geocode_base_url: get("GEOCODE_BASE_URL"),
            static_dir: get("STATIC_DIR").map(PathBuf::from),
        })
    }

    /// Retry policy for geocoding lookups.
    #[must_use]
    pub fn geocode_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.geocode_max_retries,
            timeout: Some(self.geocode_timeout),
            ..RetryPolicy::default()
        }
    }

    /// Clamps a requested selection size, falling back to [`Self::top_n`].
    #[must_use]
    pub fn limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.top_n).min(MAX_TOP_N)
    }
}

fn parse_or<T>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |v| {
        v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: v.clone(),
            reason: e.to_string(),
        })
    })
}
