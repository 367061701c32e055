//! Interactive mode for the server.
//!
//! Prompts for any missing secrets, then for bind address, port and
//! default selection size before starting the server.

use dialoguer::{Confirm, Input, Password};

use crate::{AppConfig, ServerError};

/// Runs the server in interactive mode, prompting for configuration.
///
/// `lookup` supplies configuration values (flags layered over the
/// environment); secrets it does not provide are asked for with a hidden
/// prompt.
///
/// # Errors
///
/// Returns [`ServerError`] if a prompt fails, the resulting configuration
/// is invalid, or the server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(lookup: impl Fn(&str) -> Option<String>) -> Result<(), ServerError> {
    println!("Restaurant Map Server");
    println!();

    let api_key = secret(&lookup, "GEOCODE_API_KEY", "Google Geocoding API key")?;
    let access_token = secret(&lookup, "MAPBOX_ACCESS_TOKEN", "Mapbox access token")?;

    let defaults = AppConfig::from_lookup(|name| match name {
        "GEOCODE_API_KEY" => Some(api_key.clone()),
        "MAPBOX_ACCESS_TOKEN" => Some(access_token.clone()),
        _ => lookup(name),
    })?;

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()?;

    let top_n: usize = Input::new()
        .with_prompt(format!(
            "Restaurants per selection (max {})",
            crate::MAX_TOP_N
        ))
        .default(defaults.top_n)
        .validate_with(|n: &usize| {
            if *n <= crate::MAX_TOP_N {
                Ok(())
            } else {
                Err(format!("must be at most {}", crate::MAX_TOP_N))
            }
        })
        .interact_text()?;

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()?
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(AppConfig {
        bind_addr,
        port,
        top_n,
        ..defaults
    })
    .await
}

fn secret(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    prompt: &str,
) -> Result<String, dialoguer::Error> {
    if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
        return Ok(value);
    }

    Password::new().with_prompt(prompt).interact()
}
