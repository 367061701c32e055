//! Turns a selection and its geocoded points into API responses.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use resto_map_geocoder::{LookupOutcome, PointLookup};
use resto_map_inspection::Dataset;
use resto_map_inspection_models::InspectionRecord;
use resto_map_server_models::{
    ApiCuisineOption, ApiMapCenter, ApiMapFigure, ApiMapLayer, ApiMapView, ApiMarkerStyle,
    ApiRestaurant, ApiRestaurants, ApiTable, ApiUnresolved, UnresolvedReason,
};

/// New York City.
pub const MAP_CENTER: ApiMapCenter = ApiMapCenter {
    lat: 40.7128,
    lon: -73.9,
};
/// Initial zoom level.
pub const MAP_ZOOM: f64 = 10.0;
/// Base map style.
pub const MAP_STYLE: &str = "light";
/// Figure height in pixels.
pub const MAP_HEIGHT: u32 = 800;
/// Figure width in pixels.
pub const MAP_WIDTH: u32 = 600;
/// Color of the `GeoJSON` fill overlay.
pub const FILL_LAYER_COLOR: &str = "rgba(163,22,19,0.8)";
/// Markers are drawn with their restaurant name above them.
pub const MARKER_MODE: &str = "markers+text";
/// Label placement relative to the marker.
pub const MARKER_TEXT_POSITION: &str = "top center";
/// Marker symbol.
pub const MARKER_SYMBOL: &str = "star";
/// Marker size in pixels.
pub const MARKER_SIZE: u32 = 10;
/// Table header, in the dataset's column naming.
pub const TABLE_COLUMNS: [&str; 5] = ["DBA", "BUILDING", "STREET", "BORO", "ZIPCODE"];
/// Row limit for the table.
pub const DEFAULT_MAX_ROWS: usize = 10;

/// Dropdown options for every cuisine in the dataset, in order of first
/// appearance.
#[must_use]
pub fn cuisine_options(dataset: &Dataset) -> Vec<ApiCuisineOption> {
    dataset
        .cuisines()
        .iter()
        .map(|c| ApiCuisineOption::from(c.as_str()))
        .collect()
}

/// `You have selected "{cuisine}" restaurants`
#[must_use]
pub fn confirmation(cuisine: &str) -> String {
    format!("You have selected \"{cuisine}\" restaurants")
}

/// `Top {n} cleanest {cuisine} restaurants`
#[must_use]
pub fn title(cuisine: &str, n: usize) -> String {
    format!("Top {n} cleanest {cuisine} restaurants")
}

/// Renders the address columns of `records` as a table of at most
/// `max_rows` rows.
#[must_use]
pub fn restaurant_table(records: &[&InspectionRecord], max_rows: usize) -> ApiTable {
    ApiTable {
        columns: TABLE_COLUMNS.iter().map(ToString::to_string).collect(),
        rows: records
            .iter()
            .take(max_rows)
            .map(|r| {
                vec![
                    r.name.clone(),
                    r.address.building.clone(),
                    r.address.street.clone(),
                    r.address.borough.clone(),
                    r.address
                        .zip_as_integer()
                        .map(|z| z.to_string())
                        .unwrap_or_default(),
                ]
            })
            .collect(),
    }
}

/// Builds the restaurants response for a selection.
#[must_use]
pub fn restaurants(cuisine: &str, limit: usize, records: &[&InspectionRecord]) -> ApiRestaurants {
    ApiRestaurants {
        cuisine: cuisine.to_string(),
        confirmation: confirmation(cuisine),
        title: title(cuisine, limit),
        restaurants: records.iter().map(|r| ApiRestaurant::from(*r)).collect(),
        table: restaurant_table(records, DEFAULT_MAX_ROWS.max(limit)),
    }
}

/// Builds the map figure. Points without coordinates are left off the map
/// and listed in [`ApiMapFigure::unresolved`].
#[must_use]
pub fn map_figure(lookups: &[PointLookup], access_token: &str) -> ApiMapFigure {
    let mut features = Vec::new();
    let mut unresolved = Vec::new();

    for lookup in lookups {
        if let Some(location) = lookup.point.location {
            let mut properties = JsonObject::new();
            properties.insert(
                "name".to_string(),
                serde_json::Value::from(lookup.point.name.clone()),
            );
            if let LookupOutcome::Matched {
                formatted_address,
                partial_match,
            } = &lookup.outcome
            {
                properties.insert(
                    "formattedAddress".to_string(),
                    serde_json::Value::from(formatted_address.clone()),
                );
                properties.insert(
                    "partialMatch".to_string(),
                    serde_json::Value::from(*partial_match),
                );
            }
            features.push(Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::Point(vec![
                    location.lng,
                    location.lat,
                ]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            });
            continue;
        }

        let (reason, error) = match &lookup.outcome {
            LookupOutcome::Failed(message) => (UnresolvedReason::Failed, Some(message.clone())),
            LookupOutcome::Matched { .. } | LookupOutcome::NoMatch => {
                (UnresolvedReason::NoMatch, None)
            }
        };
        unresolved.push(ApiUnresolved {
            name: lookup.point.name.clone(),
            reason,
            error,
        });
    }

    ApiMapFigure {
        view: ApiMapView {
            center: MAP_CENTER,
            zoom: MAP_ZOOM,
            style: MAP_STYLE.to_string(),
            bearing: 0.0,
            pitch: 0.0,
            access_token: access_token.to_string(),
            height: MAP_HEIGHT,
            width: MAP_WIDTH,
            layers: vec![ApiMapLayer {
                source_type: "geojson".to_string(),
                layer_type: "fill".to_string(),
                color: FILL_LAYER_COLOR.to_string(),
            }],
        },
        marker: ApiMarkerStyle {
            mode: MARKER_MODE.to_string(),
            text_position: MARKER_TEXT_POSITION.to_string(),
            symbol: MARKER_SYMBOL.to_string(),
            size: MARKER_SIZE,
        },
        points: FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        },
        partial: lookups.iter().any(PointLookup::is_failed),
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use resto_map_inspection_models::{AddressFields, GeoPoint, LatLng};

    use super::*;

    fn record(name: &str, zip: Option<&str>) -> InspectionRecord {
        InspectionRecord {
            restaurant_id: name.to_string(),
            name: name.to_string(),
            cuisine: "Thai".to_string(),
            address: AddressFields {
                building: "1".to_string(),
                street: "MAIN ST".to_string(),
                borough: "Queens".to_string(),
                zip_code: zip.map(String::from),
            },
            phone: None,
            grade: None,
            score: None,
            grade_date: None,
            inspection_date: None,
            inspection_type: None,
        }
    }

    fn lookup(name: &str, location: Option<LatLng>, outcome: LookupOutcome) -> PointLookup {
        PointLookup {
            point: GeoPoint {
                name: name.to_string(),
                location,
            },
            outcome,
        }
    }

    #[test]
    fn texts() {
        assert_eq!(confirmation("Thai"), "You have selected \"Thai\" restaurants");
        assert_eq!(title("Thai", 10), "Top 10 cleanest Thai restaurants");
    }

    #[test]
    fn table_has_address_columns() {
        let a = record("SIAM", Some("11101.0"));
        let b = record("BANGKOK", None);

        let table = restaurant_table(&[&a, &b], 10);

        assert_eq!(table.columns, ["DBA", "BUILDING", "STREET", "BORO", "ZIPCODE"]);
        assert_eq!(table.rows[0], ["SIAM", "1", "MAIN ST", "Queens", "11101"]);
        assert_eq!(table.rows[1][4], "");
    }

    #[test]
    fn table_is_limited_to_max_rows() {
        let records: Vec<InspectionRecord> =
            (0..12).map(|i| record(&i.to_string(), None)).collect();
        let refs: Vec<&InspectionRecord> = records.iter().collect();

        assert_eq!(restaurant_table(&refs, DEFAULT_MAX_ROWS).rows.len(), 10);
        assert!(restaurant_table(&[], DEFAULT_MAX_ROWS).rows.is_empty());
    }

    #[test]
    fn map_omits_points_without_coordinates() {
        let lookups = [
            lookup(
                "SIAM",
                Some(LatLng {
                    lat: 40.74,
                    lng: -73.94,
                }),
                LookupOutcome::Matched {
                    formatted_address: Some("1 Main St, Queens, NY 11101, USA".to_string()),
                    partial_match: true,
                },
            ),
            lookup("NOWHERE", None, LookupOutcome::NoMatch),
        ];

        let figure = map_figure(&lookups, "tok");

        assert_eq!(figure.points.features.len(), 1);
        assert!(!figure.partial);
        assert_eq!(figure.unresolved.len(), 1);
        assert_eq!(figure.unresolved[0].name, "NOWHERE");
        assert_eq!(figure.unresolved[0].reason, UnresolvedReason::NoMatch);

        let json = serde_json::to_value(&figure).unwrap();
        assert_eq!(json["points"]["type"], "FeatureCollection");
        let feature = &json["points"]["features"][0];
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"][0], -73.94);
        assert_eq!(feature["geometry"]["coordinates"][1], 40.74);
        assert_eq!(feature["properties"]["name"], "SIAM");
        assert_eq!(
            feature["properties"]["formattedAddress"],
            "1 Main St, Queens, NY 11101, USA"
        );
        assert_eq!(feature["properties"]["partialMatch"], true);
    }

    #[test]
    fn failed_lookup_marks_figure_partial() {
        let lookups = [lookup(
            "SIAM",
            None,
            LookupOutcome::Failed("HTTP error".to_string()),
        )];

        let figure = map_figure(&lookups, "tok");

        assert!(figure.partial);
        assert!(figure.points.features.is_empty());
        assert_eq!(figure.unresolved[0].reason, UnresolvedReason::Failed);
        assert_eq!(figure.unresolved[0].error.as_deref(), Some("HTTP error"));
    }

    #[test]
    fn map_view_settings() {
        let figure = map_figure(&[], "tok");

        assert_eq!(figure.view.center, MAP_CENTER);
        assert!((figure.view.zoom - 10.0).abs() < f64::EPSILON);
        assert_eq!(figure.view.style, "light");
        assert_eq!(figure.view.access_token, "tok");
        assert_eq!((figure.view.height, figure.view.width), (800, 600));
        assert_eq!(figure.view.layers.len(), 1);
        assert_eq!(figure.view.layers[0].layer_type, "fill");
        assert_eq!(figure.view.layers[0].color, "rgba(163,22,19,0.8)");
        assert_eq!(figure.marker.mode, "markers+text");
        assert_eq!(figure.marker.text_position, "top center");
        assert_eq!(figure.marker.symbol, "star");
        assert_eq!(figure.marker.size, 10);

        let json = serde_json::to_value(&figure).unwrap();
        assert_eq!(json["view"]["layers"][0]["type"], "fill");
        assert_eq!(json["view"]["layers"][0]["sourceType"], "geojson");
        assert_eq!(json["marker"]["textPosition"], "top center");
    }

    #[test]
    fn cuisine_options_follow_dataset_order() {
        let mut italian = record("PASTA", None);
        italian.cuisine = "Italian".to_string();
        let dataset = Dataset::from_records(vec![record("SIAM", None), italian]);

        let options = cuisine_options(&dataset);

        assert_eq!(
            options,
            [ApiCuisineOption::from("Thai"), ApiCuisineOption::from("Italian")]
        );
        assert_eq!(options[0].label, "Thai");
        assert_eq!(options[0].value, "Thai");
    }
}
