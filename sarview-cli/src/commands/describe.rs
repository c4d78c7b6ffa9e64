use std::sync::Arc;

use anyhow::{Context, Result};
use sarview::{
    config::{env_var, timeout_from_env},
    gemini::{GeminiClient, GeminiConfig},
    Mode, Polarization, PromptBuilder,
};
use serde::Serialize;

#[derive(Serialize)]
struct DescribeResponse<'a> {
    mode: Mode,
    polarization: Polarization,
    model: &'a str,
    description: &'a str,
    generated: bool,
}

pub fn run(
    api_key: String,
    model: String,
    mode: Mode,
    polarization: Polarization,
    json: bool,
) -> Result<()> {
    let mut config = GeminiConfig::new(api_key)
        .with_model(model.clone())
        .with_timeout(timeout_from_env().context("Invalid SARVIEW_TIMEOUT_SECS")?);
    if let Some(url) = env_var("SARVIEW_GEMINI_URL") {
        config = config.with_api_url(url);
    }

    let client = GeminiClient::new(config).context("Failed to create Gemini client")?;
    let describer = PromptBuilder::new(Arc::new(client), model);

    let description = describer.describe(mode, polarization);

    if json {
        let response = DescribeResponse {
            mode,
            polarization,
            model: describer.model(),
            description: description.text(),
            generated: description.is_generated(),
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{}", description.text());
    }

    Ok(())
}
