//! Client seams for the two remote services.
//!
//! [`QueryResolver`](crate::QueryResolver) and
//! [`PromptBuilder`](crate::PromptBuilder) receive these as trait objects so
//! that the HTTP implementations (feature `remote`) and test doubles are
//! interchangeable. Calls are blocking.

use crate::criteria::{SelectionCriteria, VisParams};
use crate::error::Result;

/// Reference to a single image held by the imagery service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Asset id, e.g. `COPERNICUS/S1_GRD/S1A_IW_GRDH_1SDV_...`.
    pub id: String,
}

impl ImageRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A rendered map for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMapping {
    /// Resource name of the map, e.g. `projects/p/maps/abc`.
    pub map_name: String,
    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub url_format: String,
}

/// Satellite image search and tile rendering.
pub trait ImageryClient: Send + Sync {
    /// Filter the collection by the criteria and return the first match, in
    /// whatever order the service yields it. `Ok(None)` means no image
    /// matched.
    fn first_image(&self, criteria: &SelectionCriteria) -> Result<Option<ImageRef>>;

    /// Render `image` with `vis` and return its tile URL template.
    fn tile_mapping(&self, image: &ImageRef, vis: &VisParams) -> Result<TileMapping>;
}

/// Hosted text generation.
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt` with `model`.
    fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}
