//! sarview service library
//!
//! HTTP handlers, templates and shared state for the SAR viewer.
//! This library is used by both the sarview-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use minijinja::Environment;
use sarview::{PromptBuilder, QueryResolver, SarviewError, TextGenerator};

use crate::handlers::IndexPage;

const INDEX_TEMPLATE: &str = "index.html";

/// Application state shared across handlers.
pub struct AppState {
    /// Turns mode/polarization into a tile URL template.
    pub resolver: QueryResolver,
    /// Turns mode/polarization into a text description.
    pub describer: PromptBuilder,
    templates: Environment<'static>,
}

impl AppState {
    /// Create the state and load the page templates.
    pub fn new(
        resolver: QueryResolver,
        describer: PromptBuilder,
    ) -> Result<Self, minijinja::Error> {
        let mut templates = Environment::new();
        templates.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;

        Ok(Self {
            resolver,
            describer,
            templates,
        })
    }

    /// Render the map page.
    pub fn render_index(&self, page: &IndexPage) -> Result<String, minijinja::Error> {
        self.templates.get_template(INDEX_TEMPLATE)?.render(page)
    }
}

/// Routes served by the application, without documentation or middleware.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/describe", get(handlers::describe))
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

/// Stand-in generator used when no API key is configured: every call fails
/// with [`SarviewError::MissingConfig`], so `/describe` explains what is
/// missing while the map keeps working.
#[derive(Debug, Clone, Copy)]
pub struct UnconfiguredGenerator {
    pub var: &'static str,
}

impl TextGenerator for UnconfiguredGenerator {
    fn generate(&self, _model: &str, _prompt: &str) -> sarview::Result<String> {
        Err(SarviewError::MissingConfig { var: self.var })
    }
}

// Re-export commonly used types for convenience
pub use handlers::{
    DescribeResponse, ErrorResponse, HealthResponse, ImageryQuery, NO_IMAGE_MESSAGE,
};
