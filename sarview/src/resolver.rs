//! Image selection: criteria in, tile URL template out.

use std::sync::Arc;

use crate::client::ImageryClient;
use crate::config::Scene;
use crate::criteria::{Mode, Polarization, SelectionCriteria, VisParams};

/// Result of resolving a tile URL for a mode/polarization pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileOutcome {
    /// Tile URL template of the first matching image.
    Tile(String),
    /// No image could be rendered, either because none matched or because
    /// the imagery service failed. The two cases are only told apart in the
    /// logs.
    NoImage,
}

impl TileOutcome {
    /// The tile URL template, if an image was found.
    pub fn tile_url(&self) -> Option<&str> {
        match self {
            TileOutcome::Tile(url) => Some(url),
            TileOutcome::NoImage => None,
        }
    }
}

/// Builds image queries for the configured scene and maps the imagery
/// service's answer to a [`TileOutcome`].
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use sarview::{earthengine::EarthEngineClient, Mode, Polarization, QueryResolver, Scene};
///
/// let client = Arc::new(EarthEngineClient::from_env()?);
/// let resolver = QueryResolver::new(client, Scene::from_env()?);
///
/// if let Some(url) = resolver.resolve(Mode::Iw, Polarization::Vv).tile_url() {
///     println!("{}", url);
/// }
/// ```
pub struct QueryResolver {
    client: Arc<dyn ImageryClient>,
    scene: Scene,
    vis: VisParams,
}

impl QueryResolver {
    /// Create a resolver with the default `VV` visualization.
    pub fn new(client: Arc<dyn ImageryClient>, scene: Scene) -> Self {
        Self {
            client,
            scene,
            vis: VisParams::default(),
        }
    }

    /// The scene every query is restricted to.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Criteria submitted for a mode/polarization pair.
    pub fn criteria(&self, mode: Mode, polarization: Polarization) -> SelectionCriteria {
        self.scene.criteria(mode, polarization)
    }

    /// Find the first image matching the scene, `mode` and `polarization`
    /// and return its tile URL template.
    ///
    /// Makes one call to the imagery service when nothing matches and two
    /// otherwise. Errors are logged and reported as
    /// [`TileOutcome::NoImage`].
    pub fn resolve(&self, mode: Mode, polarization: Polarization) -> TileOutcome {
        let criteria = self.criteria(mode, polarization);

        let image = match self.client.first_image(&criteria) {
            Ok(Some(image)) => image,
            Ok(None) => {
                tracing::info!(
                    mode = %mode,
                    polarization = %polarization,
                    collection = %criteria.collection,
                    start = %criteria.date_range.start,
                    end = %criteria.date_range.end,
                    "No image matches the selection"
                );
                return TileOutcome::NoImage;
            }
            Err(e) => {
                tracing::warn!(
                    mode = %mode,
                    polarization = %polarization,
                    error = %e,
                    detail = e.detail(),
                    "Image search failed"
                );
                return TileOutcome::NoImage;
            }
        };

        match self.client.tile_mapping(&image, &self.vis) {
            Ok(mapping) => {
                tracing::info!(
                    image = %image.id,
                    map = %mapping.map_name,
                    "Tile mapping created"
                );
                TileOutcome::Tile(mapping.url_format)
            }
            Err(e) => {
                tracing::warn!(
                    image = %image.id,
                    error = %e,
                    detail = e.detail(),
                    "Tile mapping failed"
                );
                TileOutcome::NoImage
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ImageRef, TileMapping};
    use crate::error::{Result, SarviewError};
    use std::sync::Mutex;

    /// What the fake imagery service should answer.
    enum Behavior {
        Empty,
        SearchFails,
        Found { url: &'static str },
        MappingFails,
    }

    struct FakeImagery {
        behavior: Behavior,
        searches: Mutex<Vec<SelectionCriteria>>,
        mappings: Mutex<Vec<(ImageRef, VisParams)>>,
    }

    impl FakeImagery {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                searches: Mutex::new(Vec::new()),
                mappings: Mutex::new(Vec::new()),
            })
        }
    }

    fn service_error() -> SarviewError {
        SarviewError::Status {
            service: "imagery service",
            status: 500,
            detail: "internal".to_string(),
        }
    }

    impl ImageryClient for FakeImagery {
        fn first_image(&self, criteria: &SelectionCriteria) -> Result<Option<ImageRef>> {
            self.searches.lock().unwrap().push(criteria.clone());
            match self.behavior {
                Behavior::Empty => Ok(None),
                Behavior::SearchFails => Err(service_error()),
                Behavior::Found { .. } | Behavior::MappingFails => {
                    Ok(Some(ImageRef::new("COPERNICUS/S1_GRD/S1A_TEST")))
                }
            }
        }

        fn tile_mapping(&self, image: &ImageRef, vis: &VisParams) -> Result<TileMapping> {
            self.mappings
                .lock()
                .unwrap()
                .push((image.clone(), vis.clone()));
            match self.behavior {
                Behavior::Found { url } => Ok(TileMapping {
                    map_name: "projects/p/maps/m".to_string(),
                    url_format: url.to_string(),
                }),
                _ => Err(service_error()),
            }
        }
    }

    #[test]
    fn test_submits_exact_filter_values() {
        let fake = FakeImagery::new(Behavior::Empty);
        let scene = Scene::default();
        let resolver = QueryResolver::new(fake.clone(), scene.clone());

        for mode in Mode::ALL {
            for polarization in Polarization::ALL {
                resolver.resolve(mode, polarization);
            }
        }

        let searches = fake.searches.lock().unwrap();
        assert_eq!(searches.len(), 16);
        let mut i = 0;
        for mode in Mode::ALL {
            for polarization in Polarization::ALL {
                let criteria = &searches[i];
                assert_eq!(criteria.mode, mode);
                assert_eq!(criteria.polarization, polarization);
                assert_eq!(criteria.point, scene.point);
                assert_eq!(criteria.date_range, scene.date_range);
                assert_eq!(criteria.collection, scene.collection);
                i += 1;
            }
        }
    }

    #[test]
    fn test_empty_collection_is_no_image() {
        let fake = FakeImagery::new(Behavior::Empty);
        let resolver = QueryResolver::new(fake.clone(), Scene::default());

        let outcome = resolver.resolve(Mode::Iw, Polarization::Vh);
        assert_eq!(outcome, TileOutcome::NoImage);
        assert_eq!(outcome.tile_url(), None);
        // No image, so no mapping request.
        assert!(fake.mappings.lock().unwrap().is_empty());
    }

    #[test]
    fn test_found_returns_exact_url() {
        let fake = FakeImagery::new(Behavior::Found {
            url: "https://tile.example/{z}/{x}/{y}",
        });
        let resolver = QueryResolver::new(fake.clone(), Scene::default());

        let outcome = resolver.resolve(Mode::Iw, Polarization::Vv);
        assert_eq!(
            outcome,
            TileOutcome::Tile("https://tile.example/{z}/{x}/{y}".to_string())
        );

        let mappings = fake.mappings.lock().unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].0.id, "COPERNICUS/S1_GRD/S1A_TEST");
        assert_eq!(mappings[0].1, VisParams::default());
    }

    #[test]
    fn test_mapping_failure_equals_no_image() {
        let failing = QueryResolver::new(
            FakeImagery::new(Behavior::MappingFails),
            Scene::default(),
        );
        let empty = QueryResolver::new(FakeImagery::new(Behavior::Empty), Scene::default());

        assert_eq!(
            failing.resolve(Mode::Iw, Polarization::Vv),
            empty.resolve(Mode::Iw, Polarization::Vv)
        );
    }

    #[test]
    fn test_search_failure_is_no_image() {
        let fake = FakeImagery::new(Behavior::SearchFails);
        let resolver = QueryResolver::new(fake.clone(), Scene::default());

        assert_eq!(
            resolver.resolve(Mode::Ew, Polarization::Hh),
            TileOutcome::NoImage
        );
        assert!(fake.mappings.lock().unwrap().is_empty());
    }
}
