use std::sync::Arc;

use anyhow::{Context, Result};
use sarview::{
    config::{env_var, timeout_from_env},
    earthengine::{EarthEngineClient, EarthEngineConfig},
    Mode, Polarization, QueryResolver, Scene,
};
use serde::Serialize;

#[derive(Serialize)]
struct TileResponse<'a> {
    mode: Mode,
    polarization: Polarization,
    tile_url: Option<&'a str>,
}

pub fn run(
    project: String,
    token: Option<String>,
    mode: Mode,
    polarization: Polarization,
    json: bool,
) -> Result<()> {
    let scene = Scene::from_env().context("Invalid scene configuration")?;

    let mut config = EarthEngineConfig::new(project)
        .with_timeout(timeout_from_env().context("Invalid SARVIEW_TIMEOUT_SECS")?);
    if let Some(token) = token {
        config = config.with_access_token(token);
    }
    if let Some(url) = env_var("SARVIEW_EE_URL") {
        config = config.with_api_url(url);
    }

    let client = EarthEngineClient::new(config).context("Failed to create Earth Engine client")?;
    let resolver = QueryResolver::new(Arc::new(client), scene);

    let outcome = resolver.resolve(mode, polarization);

    // Output result
    if json {
        let response = TileResponse {
            mode,
            polarization,
            tile_url: outcome.tile_url(),
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        match outcome.tile_url() {
            Some(url) => println!("{}", url),
            None => println!("no image"),
        }
    }

    Ok(())
}
