//! CSV row decoding for the DOHMH restaurant inspection feed.
//!
//! Columns are matched by header name, so column order and unrelated extra
//! columns (violation codes, community board, BIN, ...) do not matter. The
//! columns the selector and geocoder depend on are required; their absence
//! is a load error.

use std::io::Read;

use resto_map_inspection_models::{AddressFields, Grade, InspectionRecord};
use serde::Deserialize;

use crate::LoadError;
use crate::parsing::{non_empty, parse_date, parse_score};

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "CAMIS")]
    camis: String,
    #[serde(rename = "DBA")]
    dba: String,
    #[serde(rename = "BORO")]
    boro: String,
    #[serde(rename = "BUILDING")]
    building: String,
    #[serde(rename = "STREET")]
    street: String,
    #[serde(rename = "ZIPCODE")]
    zipcode: String,
    #[serde(rename = "PHONE", default)]
    phone: String,
    #[serde(rename = "CUISINE DESCRIPTION")]
    cuisine_description: String,
    #[serde(rename = "INSPECTION DATE", default)]
    inspection_date: String,
    #[serde(rename = "SCORE")]
    score: String,
    #[serde(rename = "GRADE")]
    grade: String,
    #[serde(rename = "GRADE DATE")]
    grade_date: String,
    #[serde(rename = "INSPECTION TYPE", default)]
    inspection_type: String,
}

impl RawRow {
    fn into_record(self) -> InspectionRecord {
        InspectionRecord {
            restaurant_id: self.camis,
            name: self.dba,
            cuisine: self.cuisine_description,
            address: AddressFields {
                building: self.building,
                street: self.street,
                borough: self.boro,
                zip_code: non_empty(&self.zipcode),
            },
            phone: non_empty(&self.phone),
            grade: Grade::from_code(&self.grade),
            score: parse_score(&self.score),
            grade_date: parse_date(&self.grade_date),
            inspection_date: parse_date(&self.inspection_date),
            inspection_type: non_empty(&self.inspection_type),
        }
    }
}

/// Decodes every row of an inspection CSV into [`InspectionRecord`]s.
///
/// Rows without a restaurant identifier are skipped.
///
/// # Errors
///
/// Returns [`LoadError::Csv`] if the header row is missing a required
/// column or any row is structurally malformed.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<InspectionRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0u64;

    for row in reader.deserialize::<RawRow>() {
        let row = row?;
        if row.camis.is_empty() {
            skipped += 1;
            continue;
        }
        records.push(row.into_record());
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} inspection rows without a CAMIS identifier");
    }
    log::debug!("Decoded {} inspection rows", records.len());

    Ok(records)
}
