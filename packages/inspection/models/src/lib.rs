#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Restaurant inspection record types and geocoded point definitions.
//!
//! An [`InspectionRecord`] is one row of the DOHMH New York City Restaurant
//! Inspection Results dataset. The dataset holds one row per inspection
//! event (and violation), so several records share the same restaurant
//! identifier. A [`GeoPoint`] is the mappable form of a restaurant after
//! its address has been geocoded.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Letter grade assigned after an inspection.
///
/// Blank or unrecognized codes are treated as ungraded and are represented
/// by `None` on [`InspectionRecord::grade`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Grade {
    /// Score of 0-13.
    #[serde(rename = "A")]
    #[strum(serialize = "A")]
    A,
    /// Score of 14-27.
    #[serde(rename = "B")]
    #[strum(serialize = "B")]
    B,
    /// Score of 28 or more.
    #[serde(rename = "C")]
    #[strum(serialize = "C")]
    C,
    /// Not yet graded.
    #[serde(rename = "N")]
    #[strum(serialize = "N")]
    NotYetGraded,
    /// Grade pending.
    #[serde(rename = "Z")]
    #[strum(serialize = "Z")]
    Pending,
    /// Grade pending, issued on re-opening following a closure.
    #[serde(rename = "P")]
    #[strum(serialize = "P")]
    PendingReopening,
}

impl Grade {
    /// Parses a raw grade code, returning `None` for blank or unknown codes.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        code.parse().ok()
    }

    /// Whether a restaurant with this grade is a candidate for the
    /// "cleanest" listing. Only `A` and `B` qualify.
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::A | Self::B)
    }
}

/// The address columns of an inspection record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
    /// Building number (e.g., `"1007"`).
    pub building: String,
    /// Street name (e.g., `"MORRIS PARK AVE"`).
    pub street: String,
    /// Borough name (e.g., `"Bronx"`).
    pub borough: String,
    /// ZIP code as it appears in the source, which may carry float
    /// artifacts such as `"10462.0"`.
    pub zip_code: Option<String>,
}

impl AddressFields {
    /// Returns the ZIP code as an integer, discarding any fractional or
    /// formatting artifacts. Returns `None` if missing or not numeric.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn zip_as_integer(&self) -> Option<u32> {
        let raw = self.zip_code.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(zip) = raw.parse::<u32>() {
            return Some(zip);
        }
        let value = raw.parse::<f64>().ok()?;
        if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
            return None;
        }
        Some(value.trunc() as u32)
    }
}

/// One row of the restaurant inspection dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    /// Stable restaurant identifier (`CAMIS`).
    pub restaurant_id: String,
    /// Doing-business-as name (`DBA`).
    pub name: String,
    /// Cuisine category, matched exactly as stored.
    pub cuisine: String,
    /// Address columns.
    pub address: AddressFields,
    /// Phone number, if present.
    pub phone: Option<String>,
    /// Letter grade. `None` when ungraded.
    pub grade: Option<Grade>,
    /// Inspection score (lower is cleaner). `None` when blank.
    pub score: Option<f64>,
    /// Date the grade was issued.
    pub grade_date: Option<NaiveDate>,
    /// Date of the inspection event.
    pub inspection_date: Option<NaiveDate>,
    /// Inspection program and type (e.g., `"Cycle Inspection / Initial Inspection"`).
    pub inspection_type: Option<String>,
}

impl InspectionRecord {
    /// Whether this record carries an `A` or `B` grade.
    #[must_use]
    pub fn has_eligible_grade(&self) -> bool {
        self.grade.is_some_and(Grade::is_eligible)
    }
}

/// WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// A restaurant name with the coordinates its address resolved to.
///
/// `location` is `None` when the lookup found nothing or failed, which is
/// distinct from a real point at `(0, 0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Restaurant name.
    pub name: String,
    /// Resolved coordinates, if any.
    pub location: Option<LatLng>,
}

impl GeoPoint {
    /// Creates a point with resolved coordinates.
    #[must_use]
    pub fn located(name: impl Into<String>, location: LatLng) -> Self {
        Self {
            name: name.into(),
            location: Some(location),
        }
    }

    /// Creates a point whose address could not be resolved.
    #[must_use]
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
        }
    }
}
