//! Google Geocoding API client.
//!
//! Sends the free-text address as the `address` query parameter and reads
//! `results[*].geometry.location`. The API reports failures through the
//! `status` field of an HTTP 200 body, so `OVER_QUERY_LIMIT` is retried
//! here in addition to the transport-level retries of [`resto_map_http`].
//!
//! See <https://developers.google.com/maps/documentation/geocoding/requests-geocoding>

use async_trait::async_trait;
use resto_map_http::RetryPolicy;
use resto_map_inspection_models::LatLng;

use crate::{GeocodeError, GeocodeMatch, Geocoder};

/// Public Google Geocoding API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Geocoder backed by the Google Geocoding API.
pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    policy: RetryPolicy,
}

impl GoogleGeocoder {
    /// Creates a geocoder for the public endpoint with the default retry
    /// policy.
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            policy: RetryPolicy::default(),
        }
    }

    /// Points the geocoder at a different endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the retry policy (timeout, retry count, backoff).
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn lookup(&self, address: &str) -> Result<Vec<GeocodeMatch>, GeocodeError> {
        let mut attempt = 0;

        loop {
            let body: serde_json::Value = resto_map_http::send_json(&self.policy, || {
                self.client
                    .get(&self.base_url)
                    .query(&[("address", address), ("key", self.api_key.as_str())])
            })
            .await?;

            match parse_response(&body) {
                Err(GeocodeError::RateLimited) if attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.backoff(attempt);
                    log::warn!(
                        "Google geocoder over query limit (retry {attempt}/{} in {delay:?})",
                        self.policy.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}

/// Parses a Google Geocoding API JSON response into ranked matches.
///
/// Results without coordinates are dropped.
fn parse_response(body: &serde_json::Value) -> Result<Vec<GeocodeMatch>, GeocodeError> {
    let status = body["status"].as_str().ok_or_else(|| GeocodeError::Parse {
        message: "Missing status in Google response".to_string(),
    })?;

    match status {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(Vec::new()),
        "OVER_QUERY_LIMIT" => return Err(GeocodeError::RateLimited),
        other => {
            return Err(GeocodeError::Provider {
                status: other.to_string(),
                message: body["error_message"].as_str().map(String::from),
            });
        }
    }

    let results = body["results"]
        .as_array()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing results array in Google response".to_string(),
        })?;

    Ok(results
        .iter()
        .filter_map(|result| {
            let location = &result["geometry"]["location"];
            let lat = location["lat"].as_f64();
            let lng = location["lng"].as_f64();
            let (Some(lat), Some(lng)) = (lat, lng) else {
                log::debug!("Dropping Google result without coordinates: {result}");
                return None;
            };
            Some(GeocodeMatch {
                location: LatLng { lat, lng },
                formatted_address: result["formatted_address"].as_str().map(String::from),
                partial_match: result["partial_match"].as_bool().unwrap_or(false),
            })
        })
        .collect())
}
