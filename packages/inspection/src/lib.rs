#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Inspection dataset loading and top-N cleanest restaurant selection.
//!
//! The DOHMH New York City Restaurant Inspection Results feed is loaded once
//! into an immutable [`Dataset`], which is then shared read-only by every
//! request. [`selector::select_top_n`] picks the cleanest currently graded
//! restaurants of a cuisine from it.

pub mod csv_rows;
pub mod parsing;
pub mod selector;

use std::collections::BTreeSet;
use std::path::PathBuf;

use resto_map_http::{RetryError, RetryPolicy};
use resto_map_inspection_models::InspectionRecord;

pub use selector::{DEFAULT_TOP_N, select_top_n};

/// CSV export of the DOHMH New York City Restaurant Inspection Results.
pub const DEFAULT_DATASET_URL: &str =
    "https://data.cityofnewyork.us/api/views/43nn-pn8j/rows.csv?accessType=DOWNLOAD";

/// Errors that can occur while loading the dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The download failed after all retries.
    #[error("Dataset download failed: {0}")]
    Download(#[from] RetryError),

    /// The local file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV was malformed or missing a required column.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Where the inspection CSV is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// Download over HTTP.
    Url(String),
    /// Read a previously downloaded copy from disk.
    File(PathBuf),
}

impl Default for DatasetSource {
    fn default() -> Self {
        Self::Url(DEFAULT_DATASET_URL.to_string())
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// An immutable snapshot of the inspection table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<InspectionRecord>,
    cuisines: Vec<String>,
}

impl Dataset {
    /// Builds a dataset from decoded records, extracting the distinct
    /// cuisines in order of first appearance.
    #[must_use]
    pub fn from_records(records: Vec<InspectionRecord>) -> Self {
        let mut seen = BTreeSet::new();
        let mut cuisines = Vec::new();
        for record in &records {
            if !record.cuisine.is_empty() && seen.insert(record.cuisine.as_str()) {
                cuisines.push(record.cuisine.clone());
            }
        }
        drop(seen);

        Self { records, cuisines }
    }

    /// All inspection records, in feed order.
    #[must_use]
    pub fn records(&self) -> &[InspectionRecord] {
        &self.records
    }

    /// Distinct cuisine categories, in order of first appearance.
    #[must_use]
    pub fn cuisines(&self) -> &[String] {
        &self.cuisines
    }

    /// Number of inspection records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The `n` cleanest currently graded restaurants for `cuisine`.
    #[must_use]
    pub fn top_n(&self, cuisine: &str, n: usize) -> Vec<&InspectionRecord> {
        select_top_n(&self.records, cuisine, n)
    }
}

/// Loads the inspection dataset from `source`.
///
/// # Errors
///
/// Returns [`LoadError`] if the download fails after all retries, the file
/// cannot be read, or the CSV cannot be decoded.
pub async fn load_dataset(
    client: &reqwest::Client,
    source: &DatasetSource,
    policy: &RetryPolicy,
) -> Result<Dataset, LoadError> {
    log::info!("Loading inspection dataset from {source}");

    let bytes = match source {
        DatasetSource::Url(url) => resto_map_http::send_bytes(policy, || client.get(url)).await?,
        DatasetSource::File(path) => tokio::fs::read(path).await?,
    };

    log::debug!("Read {} bytes of inspection CSV", bytes.len());

    let records = csv_rows::parse_records(bytes.as_slice())?;
    let dataset = Dataset::from_records(records);

    log::info!(
        "Loaded {} inspection records across {} cuisines",
        dataset.len(),
        dataset.cuisines().len()
    );

    Ok(dataset)
}
