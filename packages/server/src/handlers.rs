//! HTTP handler functions for the restaurant map API.

use actix_web::{HttpResponse, web};
use resto_map_geocoder::geocode_restaurants;
use resto_map_inspection_models::InspectionRecord;
use resto_map_server_models::{ApiHealth, ApiMapFigure, ApiSelection, SelectionQueryParams};

use crate::{AppState, presenter};

/// Cuisine used when the request does not name one.
pub const DEFAULT_CUISINE: &str = "Thai";

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        record_count: state.dataset.len(),
        cuisine_count: state.dataset.cuisines().len(),
    })
}

/// `GET /api/cuisines`
///
/// Returns the cuisine options in order of first appearance in the dataset.
pub async fn cuisines(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(presenter::cuisine_options(&state.dataset))
}

/// `GET /api/restaurants`
///
/// Selection text and table for a cuisine, without geocoding.
pub async fn restaurants(
    state: web::Data<AppState>,
    params: web::Query<SelectionQueryParams>,
) -> HttpResponse {
    let (cuisine, limit) = selection_params(&state, &params);
    let selected = state.dataset.top_n(cuisine, limit);

    HttpResponse::Ok().json(presenter::restaurants(cuisine, limit, &selected))
}

/// `GET /api/map`
///
/// Geocodes the selection and returns the map figure. Failed lookups leave
/// the figure flagged `partial` rather than failing the request.
pub async fn map(
    state: web::Data<AppState>,
    params: web::Query<SelectionQueryParams>,
) -> HttpResponse {
    let (cuisine, limit) = selection_params(&state, &params);
    let selected = state.dataset.top_n(cuisine, limit);

    HttpResponse::Ok().json(map_figure(&state, &selected).await)
}

/// `GET /api/selection`
///
/// Confirmation, title, table and map for a cuisine in one response.
pub async fn selection(
    state: web::Data<AppState>,
    params: web::Query<SelectionQueryParams>,
) -> HttpResponse {
    let (cuisine, limit) = selection_params(&state, &params);
    let selected = state.dataset.top_n(cuisine, limit);
    let map = map_figure(&state, &selected).await;
    let listing = presenter::restaurants(cuisine, limit, &selected);

    HttpResponse::Ok().json(ApiSelection { listing, map })
}

/// Resolves the cuisine and clamped limit for a request. Only an absent
/// `cuisine` falls back to [`DEFAULT_CUISINE`]; an empty one matches nothing.
fn selection_params<'a>(state: &AppState, params: &'a SelectionQueryParams) -> (&'a str, usize) {
    let cuisine = params.cuisine.as_deref().unwrap_or(DEFAULT_CUISINE);
    (cuisine, state.config.limit(params.limit))
}

async fn map_figure(state: &AppState, selected: &[&InspectionRecord]) -> ApiMapFigure {
    let lookups = geocode_restaurants(
        state.geocoder.as_ref(),
        selected,
        state.config.geocode_concurrency,
    )
    .await;

    let failed = lookups.iter().filter(|l| l.is_failed()).count();
    if failed > 0 {
        log::error!(
            "{failed} of {} geocoding lookups failed; returning partial map",
            lookups.len()
        );
    }

    log::debug!("Geocoded {} restaurants", lookups.len());

    presenter::map_figure(&lookups, &state.config.mapbox_access_token)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use resto_map_geocoder::{GeocodeError, GeocodeMatch, Geocoder};
    use resto_map_inspection::Dataset;
    use resto_map_inspection_models::{AddressFields, Grade, LatLng};
    use resto_map_server_models::{ApiCuisineOption, ApiError};

    use super::*;
    use crate::AppConfig;

    /// Resolves every address except those on `FAIL ST` (error) and
    /// `NOWHERE ST` (no match).
    struct StubGeocoder;

    #[async_trait]
    impl Geocoder for StubGeocoder {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn lookup(&self, address: &str) -> Result<Vec<GeocodeMatch>, GeocodeError> {
            if address.contains("FAIL ST") {
                return Err(GeocodeError::RateLimited);
            }
            if address.contains("NOWHERE ST") {
                return Ok(Vec::new());
            }
            Ok(vec![GeocodeMatch {
                location: LatLng {
                    lat: 40.75,
                    lng: -73.95,
                },
                formatted_address: None,
                partial_match: false,
            }])
        }
    }

    fn record(id: &str, cuisine: &str, street: &str, score: f64) -> InspectionRecord {
        InspectionRecord {
            restaurant_id: id.to_string(),
            name: format!("R{id}"),
            cuisine: cuisine.to_string(),
            address: AddressFields {
                building: id.to_string(),
                street: street.to_string(),
                borough: "Queens".to_string(),
                zip_code: Some("11101".to_string()),
            },
            phone: None,
            grade: Some(Grade::A),
            score: Some(score),
            grade_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            inspection_date: None,
            inspection_type: None,
        }
    }

    fn state() -> web::Data<AppState> {
        let dataset = Dataset::from_records(vec![
            record("1", "Thai", "MAIN ST", 5.0),
            record("2", "Thai", "NOWHERE ST", 2.0),
            record("3", "Thai", "FAIL ST", 9.0),
            record("4", "Italian", "MAIN ST", 1.0),
        ]);
        let config = AppConfig::from_lookup(|name| match name {
            "GEOCODE_API_KEY" => Some("key".to_string()),
            "MAPBOX_ACCESS_TOKEN" => Some("tok".to_string()),
            _ => None,
        })
        .unwrap();

        web::Data::new(AppState {
            dataset: Arc::new(dataset),
            geocoder: Arc::new(StubGeocoder),
            config: Arc::new(config),
        })
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(state())
                    .service(crate::api_scope()),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn health_reports_counts() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["healthy"], true);
        assert_eq!(body["recordCount"], 4);
        assert_eq!(body["cuisineCount"], 2);
    }

    #[actix_web::test]
    async fn cuisines_in_first_seen_order() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/cuisines").to_request();
        let body: Vec<ApiCuisineOption> = test::call_and_read_body_json(&app, req).await;

        let values: Vec<&str> = body.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, ["Thai", "Italian"]);
    }

    #[actix_web::test]
    async fn restaurants_default_to_thai_ranked_by_score() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/restaurants").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["cuisine"], "Thai");
        assert_eq!(body["confirmation"], "You have selected \"Thai\" restaurants");
        assert_eq!(body["title"], "Top 10 cleanest Thai restaurants");
        let names: Vec<&str> = body["restaurants"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["R2", "R1", "R3"]);
        assert_eq!(body["table"]["rows"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn restaurants_respect_limit() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/restaurants?cuisine=Thai&limit=1")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["restaurants"].as_array().unwrap().len(), 1);
        assert_eq!(body["restaurants"][0]["name"], "R2");
    }

    #[actix_web::test]
    async fn empty_cuisine_matches_nothing() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/restaurants?cuisine=")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["cuisine"], "");
        assert!(body["restaurants"].as_array().unwrap().is_empty());
        assert!(body["table"]["rows"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn invalid_limit_is_a_json_bad_request() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/selection?cuisine=Thai&limit=-1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let body: ApiError = test::read_body_json(resp).await;
        assert!(body.error.starts_with("Query deserialize error"), "{}", body.error);
    }

    #[actix_web::test]
    async fn unknown_cuisine_is_empty_ok() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/selection?cuisine=Martian")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["restaurants"].as_array().unwrap().is_empty());
        assert!(body["map"]["points"]["features"].as_array().unwrap().is_empty());
        assert_eq!(body["map"]["partial"], false);
    }

    #[actix_web::test]
    async fn map_is_partial_when_a_lookup_fails() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/map?cuisine=Thai").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["points"]["features"].as_array().unwrap().len(), 1);
        assert_eq!(body["points"]["features"][0]["properties"]["name"], "R1");
        assert_eq!(body["partial"], true);

        let unresolved = body["unresolved"].as_array().unwrap();
        assert_eq!(unresolved.len(), 2);
        assert_eq!(unresolved[0]["name"], "R2");
        assert_eq!(unresolved[0]["reason"], "noMatch");
        assert_eq!(unresolved[1]["name"], "R3");
        assert_eq!(unresolved[1]["reason"], "failed");
    }

    #[actix_web::test]
    async fn selection_combines_table_and_map() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/selection?cuisine=Italian")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["cuisine"], "Italian");
        assert_eq!(body["confirmation"], "You have selected \"Italian\" restaurants");
        assert_eq!(body["title"], "Top 10 cleanest Italian restaurants");
        assert!(body.get("listing").is_none());
        assert_eq!(body["table"]["rows"][0][0], "R4");
        assert_eq!(body["map"]["view"]["style"], "light");
        assert_eq!(body["map"]["view"]["accessToken"], "tok");
        assert_eq!(body["map"]["points"]["features"].as_array().unwrap().len(), 1);
    }
}
