#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the restaurant map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the inspection record types to allow independent evolution of the
//! API contract.

use chrono::NaiveDate;
use resto_map_inspection_models::{Grade, InspectionRecord};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Number of inspection records loaded.
    pub record_count: usize,
    /// Number of distinct cuisines loaded.
    pub cuisine_count: usize,
}

/// A cuisine choice for the selection dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCuisineOption {
    /// Text shown to the user.
    pub label: String,
    /// Value sent back as the `cuisine` query parameter.
    pub value: String,
}

impl From<&str> for ApiCuisineOption {
    fn from(cuisine: &str) -> Self {
        Self {
            label: cuisine.to_string(),
            value: cuisine.to_string(),
        }
    }
}

/// Query parameters shared by the selection endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionQueryParams {
    /// Cuisine category, matched exactly.
    pub cuisine: Option<String>,
    /// Number of restaurants to return.
    pub limit: Option<usize>,
}

/// A selected restaurant as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRestaurant {
    /// Stable restaurant identifier.
    pub restaurant_id: String,
    /// Doing-business-as name.
    pub name: String,
    /// Cuisine category.
    pub cuisine: String,
    /// Building number.
    pub building: String,
    /// Street name.
    pub street: String,
    /// Borough name.
    pub borough: String,
    /// ZIP code, normalized to an integer.
    pub zip_code: Option<u32>,
    /// Letter grade.
    pub grade: Option<Grade>,
    /// Inspection score (lower is cleaner).
    pub score: Option<f64>,
    /// Date the grade was issued.
    pub grade_date: Option<NaiveDate>,
    /// Phone number.
    pub phone: Option<String>,
    /// Date of the inspection the grade comes from.
    pub inspection_date: Option<NaiveDate>,
    /// Inspection program and type.
    pub inspection_type: Option<String>,
}

impl From<&InspectionRecord> for ApiRestaurant {
    fn from(record: &InspectionRecord) -> Self {
        Self {
            restaurant_id: record.restaurant_id.clone(),
            name: record.name.clone(),
            cuisine: record.cuisine.clone(),
            building: record.address.building.clone(),
            street: record.address.street.clone(),
            borough: record.address.borough.clone(),
            zip_code: record.address.zip_as_integer(),
            grade: record.grade,
            score: record.score,
            grade_date: record.grade_date,
            phone: record.phone.clone(),
            inspection_date: record.inspection_date,
            inspection_type: record.inspection_type.clone(),
        }
    }
}

/// A rendered table: a header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTable {
    /// Column headers.
    pub columns: Vec<String>,
    /// Rows, each with one cell per column.
    pub rows: Vec<Vec<String>>,
}

/// Response from the restaurants endpoint (no geocoding).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRestaurants {
    /// The cuisine that was selected.
    pub cuisine: String,
    /// `You have selected "{cuisine}" restaurants`.
    pub confirmation: String,
    /// Heading for the table and map.
    pub title: String,
    /// Selected restaurants, cleanest first.
    pub restaurants: Vec<ApiRestaurant>,
    /// Table rendering of the selection.
    pub table: ApiTable,
}

/// Map center coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapCenter {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

/// Initial map view settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapView {
    /// View center.
    pub center: ApiMapCenter,
    /// Zoom level.
    pub zoom: f64,
    /// Base map style name.
    pub style: String,
    /// Rotation in degrees.
    pub bearing: f64,
    /// Tilt in degrees.
    pub pitch: f64,
    /// Access token for the map tile provider.
    pub access_token: String,
    /// Figure height in pixels.
    pub height: u32,
    /// Figure width in pixels.
    pub width: u32,
    /// Overlay layers drawn on the base map.
    pub layers: Vec<ApiMapLayer>,
}

/// An overlay layer on the base map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapLayer {
    /// Source format (e.g., `"geojson"`).
    pub source_type: String,
    /// Layer kind (e.g., `"fill"`).
    #[serde(rename = "type")]
    pub layer_type: String,
    /// CSS color.
    pub color: String,
}

/// Marker appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMarkerStyle {
    /// Drawing mode (e.g., `"markers+text"` to label each marker).
    pub mode: String,
    /// Label placement relative to the marker.
    pub text_position: String,
    /// Marker symbol name.
    pub symbol: String,
    /// Marker size in pixels.
    pub size: u32,
}

/// Why a selected restaurant is missing from the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnresolvedReason {
    /// The geocoder found no match for the address.
    NoMatch,
    /// The lookup failed.
    Failed,
}

/// A selected restaurant that could not be placed on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUnresolved {
    /// Restaurant name.
    pub name: String,
    /// Why it is missing.
    pub reason: UnresolvedReason,
    /// Lookup error message, for failed lookups.
    pub error: Option<String>,
}

/// Map figure description: view settings plus a `GeoJSON` point layer.
///
/// Each point carries `name`, and `formattedAddress`/`partialMatch` as
/// reported by the geocoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapFigure {
    /// Initial view.
    pub view: ApiMapView,
    /// Marker appearance.
    pub marker: ApiMarkerStyle,
    /// One `Point` feature per located restaurant.
    pub points: geojson::FeatureCollection,
    /// Whether any lookup failed, so the map may be missing restaurants.
    pub partial: bool,
    /// Restaurants without coordinates.
    pub unresolved: Vec<ApiUnresolved>,
}

/// Response from the selection endpoint: everything the page renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSelection {
    /// Selection text, restaurants and table.
    #[serde(flatten)]
    pub listing: ApiRestaurants,
    /// Map figure.
    pub map: ApiMapFigure,
}

/// Error body returned on a rejected request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
