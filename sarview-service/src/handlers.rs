//! HTTP request handlers for the SAR viewer.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use sarview::{Mode, Polarization, TileOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Message shown on the map page when no tile URL could be produced.
pub const NO_IMAGE_MESSAGE: &str = "No image found for the selected parameters.";

/// Query parameters shared by the map page and the description endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageryQuery {
    /// Acquisition mode: IW (default), EW, SM or WV.
    #[serde(default)]
    #[param(value_type = String, example = "IW")]
    pub mode: Mode,
    /// Polarization: VV (default), VH, HH or HV.
    #[serde(default)]
    #[param(value_type = String, example = "VV")]
    pub polarization: Polarization,
}

/// Description response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DescribeResponse {
    /// Generated text, or a message explaining why none is available.
    pub description: String,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Values rendered into `index.html`.
#[derive(Debug, Serialize)]
pub struct IndexPage {
    /// Tile URL template, or empty when no image was found.
    pub tile_url: String,
    /// Empty on success, [`NO_IMAGE_MESSAGE`] otherwise.
    pub message: String,
    pub mode: &'static str,
    pub polarization: &'static str,
    pub modes: Vec<&'static str>,
    pub polarizations: Vec<&'static str>,
    pub lon: f64,
    pub lat: f64,
}

impl IndexPage {
    pub fn new(query: ImageryQuery, outcome: TileOutcome, center: sarview::GeoPoint) -> Self {
        let (tile_url, message) = match outcome {
            TileOutcome::Tile(url) => (url, String::new()),
            TileOutcome::NoImage => (String::new(), NO_IMAGE_MESSAGE.to_string()),
        };

        Self {
            tile_url,
            message,
            mode: query.mode.as_str(),
            polarization: query.polarization.as_str(),
            modes: Mode::ALL.iter().map(Mode::as_str).collect(),
            polarizations: Polarization::ALL.iter().map(Polarization::as_str).collect(),
            lon: center.lon,
            lat: center.lat,
        }
    }
}

/// Render the map page for the selected mode and polarization.
///
/// # Query Parameters
///
/// - `mode`: Acquisition mode (default: IW)
/// - `polarization`: Polarization (default: VV)
///
/// # Returns
///
/// - `200 OK` with the HTML page; the tile URL is empty and a message is shown
///   when no image could be found
/// - `400 Bad Request` if a parameter has an unknown value
/// - `500 Internal Server Error` if the page cannot be rendered
#[utoipa::path(
    get,
    path = "/",
    tag = "imagery",
    params(ImageryQuery),
    responses(
        (status = 200, description = "Map page", content_type = "text/html", body = String),
        (status = 400, description = "Unknown mode or polarization"),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageryQuery>,
) -> axum::response::Response {
    tracing::debug!(
        mode = %query.mode,
        polarization = %query.polarization,
        "Map page request"
    );

    let worker = Arc::clone(&state);
    let outcome = match tokio::task::spawn_blocking(move || {
        worker.resolver.resolve(query.mode, query.polarization)
    })
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => return internal_error("Tile lookup task failed", e),
    };

    let page = IndexPage::new(query, outcome, state.resolver.scene().point);
    match state.render_index(&page) {
        Ok(html) => Html(html).into_response(),
        Err(e) => internal_error("Failed to render map page", e),
    }
}

/// Describe imagery with the selected mode and polarization.
///
/// Always answers `200 OK` with a `description`; when the text-generation
/// service fails, the description explains that instead.
#[utoipa::path(
    get,
    path = "/describe",
    tag = "imagery",
    params(ImageryQuery),
    responses(
        (status = 200, description = "Generated description", body = DescribeResponse),
        (status = 400, description = "Unknown mode or polarization"),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn describe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageryQuery>,
) -> axum::response::Response {
    tracing::debug!(
        mode = %query.mode,
        polarization = %query.polarization,
        "Description request"
    );

    let worker = Arc::clone(&state);
    match tokio::task::spawn_blocking(move || {
        worker.describer.describe(query.mode, query.polarization)
    })
    .await
    {
        Ok(description) => (
            StatusCode::OK,
            Json(DescribeResponse {
                description: description.into_text(),
            }),
        )
            .into_response(),
        Err(e) => internal_error("Description task failed", e),
    }
}

/// Log an internal failure and answer with a generic 500.
fn internal_error(context: &str, e: impl std::fmt::Display) -> axum::response::Response {
    tracing::error!(error = %e, "{}", context);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
