#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the restaurant map application.
//!
//! Loads the NYC restaurant inspection dataset once at startup, then serves
//! the cleanest restaurants of a cuisine as a table and as geocoded map
//! points. A static frontend can be served from `STATIC_DIR`.

pub mod config;
mod handlers;
pub mod interactive;
pub mod presenter;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, Scope, middleware, web};
use resto_map_geocoder::Geocoder;
use resto_map_geocoder::google::GoogleGeocoder;
use resto_map_http::RetryPolicy;
use resto_map_inspection::{Dataset, LoadError, load_dataset};
use resto_map_server_models::ApiError;

pub use config::{AppConfig, ConfigError, MAX_TOP_N};
pub use handlers::DEFAULT_CUISINE;

/// Timeout for the dataset download, which is a large file.
const DATASET_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors that stop the server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The inspection dataset could not be loaded.
    #[error("Failed to load dataset: {0}")]
    Load(#[from] LoadError),

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// An interactive prompt failed.
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// The HTTP server failed to bind or run.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Inspection records, read-only after startup.
    pub dataset: Arc<Dataset>,
    /// Address geocoder.
    pub geocoder: Arc<dyn Geocoder>,
    /// Runtime configuration.
    pub config: Arc<AppConfig>,
}

/// The `/api` routes.
#[must_use]
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .route("/health", web::get().to(handlers::health))
        .route("/cuisines", web::get().to(handlers::cuisines))
        .route("/restaurants", web::get().to(handlers::restaurants))
        .route("/map", web::get().to(handlers::map))
        .route("/selection", web::get().to(handlers::selection))
}

/// Rejects a malformed query string with a JSON [`ApiError`] body.
fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::error!("Rejected query string: {err}");
    let response = HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
    InternalError::from_response(err, response).into()
}

/// Starts the restaurant map API server.
///
/// Loads the dataset before binding; a load failure is returned without
/// serving anything. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the dataset cannot be loaded or the HTTP
/// server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: AppConfig) -> Result<(), ServerError> {
    let client = reqwest::Client::builder().build()?;

    let dataset_policy = RetryPolicy {
        timeout: Some(DATASET_TIMEOUT),
        ..RetryPolicy::default()
    };
    let dataset = load_dataset(&client, &config.dataset, &dataset_policy).await?;

    let mut geocoder = GoogleGeocoder::new(client, config.geocode_api_key.clone())
        .with_retry_policy(config.geocode_retry_policy());
    if let Some(base_url) = &config.geocode_base_url {
        geocoder = geocoder.with_base_url(base_url.clone());
    }

    let bind_addr = config.bind_addr.clone();
    let port = config.port;
    let static_dir = config.static_dir.clone();

    let state = web::Data::new(AppState {
        dataset: Arc::new(dataset),
        geocoder: Arc::new(geocoder),
        config: Arc::new(config),
    });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let app = App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(api_scope());

        // Serve frontend static files
        match &static_dir {
            Some(dir) => app.service(Files::new("/", dir.clone()).index_file("index.html")),
            None => app,
        }
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
