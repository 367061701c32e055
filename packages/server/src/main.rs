#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Restaurant map server binary.
//!
//! ```text
//! resto_map_server [--port 8080] [--dataset-path rows.csv] [--static-dir app/dist]
//! resto_map_server --interactive
//! ```
//!
//! Flags override the corresponding environment variables.

use std::path::PathBuf;

use clap::Parser;
use resto_map_server::{AppConfig, ServerError, interactive, run_server};

#[derive(Parser)]
#[command(
    name = "resto_map_server",
    about = "Serve a map of the cleanest NYC restaurants by cuisine"
)]
struct Cli {
    /// Prompt for configuration before starting
    #[arg(long, short)]
    interactive: bool,

    /// Address to bind to [env: BIND_ADDR]
    #[arg(long)]
    bind_addr: Option<String>,

    /// Port to listen on [env: PORT]
    #[arg(long)]
    port: Option<u16>,

    /// Read the inspection CSV from a local file [env: DATASET_PATH]
    #[arg(long)]
    dataset_path: Option<PathBuf>,

    /// Download the inspection CSV from this URL [env: DATASET_URL]
    #[arg(long)]
    dataset_url: Option<String>,

    /// Default number of restaurants per selection [env: TOP_N]
    #[arg(long)]
    top_n: Option<usize>,

    /// Geocoding lookups in flight per request [env: GEOCODE_CONCURRENCY]
    #[arg(long)]
    geocode_concurrency: Option<usize>,

    /// Directory of frontend files to serve at `/` [env: STATIC_DIR]
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl Cli {
    /// Looks up a configuration value, preferring the flag over the
    /// environment variable.
    fn lookup(&self, name: &str) -> Option<String> {
        let flag = match name {
            "BIND_ADDR" => self.bind_addr.clone(),
            "PORT" => self.port.map(|p| p.to_string()),
            "DATASET_PATH" => self.dataset_path.as_ref().map(|p| p.display().to_string()),
            "DATASET_URL" => self.dataset_url.clone(),
            "TOP_N" => self.top_n.map(|n| n.to_string()),
            "GEOCODE_CONCURRENCY" => self.geocode_concurrency.map(|n| n.to_string()),
            "STATIC_DIR" => self.static_dir.as_ref().map(|p| p.display().to_string()),
            _ => None,
        };

        flag.or_else(|| std::env::var(name).ok())
    }
}

#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let result = if cli.interactive {
        interactive::run(|name| cli.lookup(name)).await
    } else {
        match AppConfig::from_lookup(|name| cli.lookup(name)) {
            Ok(config) => run_server(config).await,
            Err(e) => Err(e.into()),
        }
    };

    if let Err(e) = &result {
        log::error!("{e}");
    }

    result
}
