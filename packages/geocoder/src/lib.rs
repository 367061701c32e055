#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Restaurant address geocoding.
//!
//! Converts the address columns of an inspection record into a
//! [`GeoPoint`] through an injected [`Geocoder`] provider:
//!
//! - an empty match list yields a point without coordinates, not an error;
//! - with several matches the first (highest ranked) one is used;
//! - [`geocode_restaurants`] runs lookups for a whole selection with a
//!   bounded number in flight, turning individual failures into
//!   [`LookupOutcome::Failed`] entries instead of failing the batch.
//!
//! [`google::GoogleGeocoder`] is the production provider.

pub mod address;
pub mod google;

use async_trait::async_trait;
use futures::stream::{self, StreamExt as _};
use resto_map_http::RetryError;
use resto_map_inspection_models::{AddressFields, GeoPoint, InspectionRecord, LatLng};
use thiserror::Error;

/// A single candidate returned by a geocoding provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    /// Resolved coordinates.
    pub location: LatLng,
    /// The canonical address the provider matched, if reported.
    pub formatted_address: Option<String>,
    /// Whether the provider flagged this as a partial match.
    pub partial_match: bool,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed after all retries.
    #[error("HTTP error: {0}")]
    Http(#[from] RetryError),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider rejected the request.
    #[error("Provider returned {status}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Provider {
        /// Provider status code (e.g., `"REQUEST_DENIED"`).
        status: String,
        /// Provider supplied detail, if any.
        message: Option<String>,
    },
}

/// A geocoding provider.
///
/// Implementations return the provider's ranked match list for a
/// free-text address. An empty list is a valid answer.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Short provider identifier for log messages.
    fn name(&self) -> &str;

    /// Looks up `address`, returning matches best first.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider cannot be reached or
    /// answers with an error.
    async fn lookup(&self, address: &str) -> Result<Vec<GeocodeMatch>, GeocodeError>;
}

/// How a single restaurant lookup ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The address resolved to coordinates.
    Matched {
        /// The canonical address the provider matched, if reported.
        formatted_address: Option<String>,
        /// Whether the provider flagged the match as partial.
        partial_match: bool,
    },
    /// The provider returned no matches.
    NoMatch,
    /// The lookup failed; carries the error message.
    Failed(String),
}

/// A geocoded restaurant together with how its lookup ended.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLookup {
    /// The point; coordinates are absent unless the outcome is `Matched`.
    pub point: GeoPoint,
    /// Lookup outcome.
    pub outcome: LookupOutcome,
}

impl PointLookup {
    /// Whether the lookup failed (as opposed to finding nothing).
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.outcome, LookupOutcome::Failed(_))
    }
}

/// Geocodes one restaurant address.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the provider lookup fails. A lookup that
/// finds nothing is not an error.
pub async fn geocode(
    geocoder: &dyn Geocoder,
    name: &str,
    address: &AddressFields,
) -> Result<GeoPoint, GeocodeError> {
    Ok(first_match(geocoder, name, address)
        .await?
        .map_or_else(|| GeoPoint::unresolved(name), |m| GeoPoint::located(name, m.location)))
}

/// Looks up `address` and keeps the provider's highest ranked match.
async fn first_match(
    geocoder: &dyn Geocoder,
    name: &str,
    address: &AddressFields,
) -> Result<Option<GeocodeMatch>, GeocodeError> {
    let query = address::full_address(address);
    log::info!("[{}] querying for address {query}", geocoder.name());

    let first = geocoder.lookup(&query).await?.into_iter().next();

    match &first {
        Some(m) => log::info!(
            "[{}] lat, lng = {}, {}",
            geocoder.name(),
            m.location.lat,
            m.location.lng
        ),
        None => log::info!("[{}] no results returned for {name}", geocoder.name()),
    }

    Ok(first)
}

/// Geocodes every restaurant in `records`, keeping at most `concurrency`
/// lookups in flight.
///
/// The output has one entry per input record, in input order.
pub async fn geocode_restaurants(
    geocoder: &dyn Geocoder,
    records: &[&InspectionRecord],
    concurrency: usize,
) -> Vec<PointLookup> {
    stream::iter(records.iter().map(|record| async move {
        let name = record.name.as_str();
        match first_match(geocoder, name, &record.address).await {
            Ok(Some(m)) => PointLookup {
                point: GeoPoint::located(name, m.location),
                outcome: LookupOutcome::Matched {
                    formatted_address: m.formatted_address,
                    partial_match: m.partial_match,
                },
            },
            Ok(None) => PointLookup {
                point: GeoPoint::unresolved(name),
                outcome: LookupOutcome::NoMatch,
            },
            Err(e) => {
                log::error!("Failed to geocode {name}: {e}");
                PointLookup {
                    point: GeoPoint::unresolved(name),
                    outcome: LookupOutcome::Failed(e.to_string()),
                }
            }
        }
    }))
    .buffered(concurrency.max(1))
    .collect()
    .await
}
