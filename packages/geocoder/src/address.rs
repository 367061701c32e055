//! Free-text address construction from inspection address columns.
//!
//! The geocoding service takes a single line such as
//! `"1007 MORRIS PARK AVE, Bronx 10462"`. Blank columns are left out
//! rather than producing stray spaces or commas.

use resto_map_inspection_models::AddressFields;

/// Builds `"{building} {street}, {borough} {zip}"` from address columns.
///
/// The ZIP code is rendered as an integer (`"10462.0"` becomes `10462`) and
/// omitted when missing or non-numeric.
#[must_use]
pub fn full_address(address: &AddressFields) -> String {
    let zip = address.zip_as_integer().map(|z| z.to_string());

    let street_line = join_non_empty(&[address.building.trim(), address.street.trim()], " ");
    let locality = join_non_empty(
        &[address.borough.trim(), zip.as_deref().unwrap_or("")],
        " ",
    );

    join_non_empty(&[street_line.as_str(), locality.as_str()], ", ")
}

fn join_non_empty(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
}
