//! sarview service - HTTP front end for Sentinel-1 SAR imagery.
//!
//! Serves a map page overlaying the first Sentinel-1 image that matches the
//! configured point and date range, plus a text description endpoint backed
//! by Gemini.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SARVIEW_EE_PROJECT` | Earth Engine cloud project | Required |
//! | `SARVIEW_EE_TOKEN` | OAuth2 access token for Earth Engine | None |
//! | `SARVIEW_EE_URL` | Earth Engine API base URL | `https://earthengine.googleapis.com` |
//! | `GEMINI_API_KEY` | Gemini API key; `/describe` reports it missing when unset | None |
//! | `SARVIEW_GEMINI_MODEL` | Gemini model | `gemini-2.0-flash` |
//! | `SARVIEW_GEMINI_URL` | Gemini API base URL | `https://generativelanguage.googleapis.com` |
//! | `SARVIEW_COLLECTION` | Image collection | `COPERNICUS/S1_GRD` |
//! | `SARVIEW_POINT` | Point of interest as `lon,lat` | `-90.0715,29.9511` |
//! | `SARVIEW_START_DATE` | Start of the date range | `2023-06-01` |
//! | `SARVIEW_END_DATE` | End of the date range (exclusive) | `2023-06-30` |
//! | `SARVIEW_TIMEOUT_SECS` | Outbound HTTP timeout | 60 |
//! | `SARVIEW_PORT` | HTTP server port | 8080 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /?mode=IW&polarization=VV` - Map page
//! - `GET /describe?mode=IW&polarization=VV` - Text description
//! - `GET /health` - Health check
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use sarview::{
    earthengine::EarthEngineClient,
    gemini::{GeminiClient, GeminiConfig},
    PromptBuilder, QueryResolver, SarviewError, Scene, TextGenerator,
};
use sarview_service::{app, handlers, AppState, UnconfiguredGenerator};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the sarview service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "sarview",
        version = "0.1.0",
        description = "Sentinel-1 SAR tile selection and description.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(handlers::index, handlers::describe, handlers::health_check),
    components(schemas(
        handlers::DescribeResponse,
        handlers::ErrorResponse,
        handlers::HealthResponse,
    )),
    tags(
        (name = "imagery", description = "SAR imagery endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sarview_service=info,sarview=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("SARVIEW_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let scene = Scene::from_env()?;

    // The blocking reqwest clients own a runtime of their own and must not
    // be created on an async worker thread.
    let (imagery, generator, model) = tokio::task::spawn_blocking(build_clients).await??;

    tracing::info!(
        project = %imagery.config().project,
        collection = %scene.collection,
        lon = scene.point.lon,
        lat = scene.point.lat,
        start = %scene.date_range.start,
        end = %scene.date_range.end,
        model = %model,
        port = port,
        "Starting sarview service"
    );

    let resolver = QueryResolver::new(Arc::new(imagery), scene);
    let describer = PromptBuilder::new(generator, model);
    let state = Arc::new(AppState::new(resolver, describer)?);

    // Build router
    let app = app(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Earth Engine client, text generator and model name from the environment.
///
/// A missing `GEMINI_API_KEY` is not fatal: descriptions are answered with a
/// message naming the variable instead.
fn build_clients() -> Result<(EarthEngineClient, Arc<dyn TextGenerator>, String), SarviewError> {
    let imagery = EarthEngineClient::from_env()?;

    match GeminiConfig::from_env() {
        Ok(config) => {
            let model = config.model.clone();
            let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(config)?);
            Ok((imagery, generator, model))
        }
        Err(SarviewError::MissingConfig { var }) => {
            tracing::warn!(var = var, "Gemini not configured, descriptions are disabled");
            let generator: Arc<dyn TextGenerator> = Arc::new(UnconfiguredGenerator { var });
            Ok((imagery, generator, sarview::DEFAULT_MODEL.to_string()))
        }
        Err(e) => Err(e),
    }
}
