//! # sarview - Sentinel-1 SAR scene viewer core
//!
//! Selects a Sentinel-1 SAR image for a point, date range, acquisition mode
//! and polarization, and turns it into a map tile URL template. Can also ask
//! a hosted language model to describe the selected parameters.
//!
//! All imagery and language work happens in remote services. This crate
//! builds the requests, talks to the services through the traits in
//! [`client`], and maps their answers to [`TileOutcome`] and
//! [`Description`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use sarview::{
//!     earthengine::EarthEngineClient, gemini::GeminiClient, Mode, Polarization,
//!     PromptBuilder, QueryResolver, Scene,
//! };
//!
//! let resolver = QueryResolver::new(Arc::new(EarthEngineClient::from_env()?), Scene::from_env()?);
//! match resolver.resolve(Mode::Iw, Polarization::Vv).tile_url() {
//!     Some(url) => println!("tiles: {}", url),
//!     None => println!("no image"),
//! }
//!
//! let gemini = GeminiClient::from_env()?;
//! let model = gemini.config().model.clone();
//! let describer = PromptBuilder::new(Arc::new(gemini), model);
//! println!("{}", describer.describe(Mode::Iw, Polarization::Vv).text());
//! ```
//!
//! ## Features
//!
//! - `remote`: HTTP clients for Earth Engine ([`earthengine`]) and Gemini
//!   ([`gemini`]) built on blocking `reqwest`.

pub mod client;
pub mod config;
pub mod criteria;
pub mod error;
pub mod prompt;
pub mod resolver;

#[cfg(feature = "remote")]
pub mod earthengine;
#[cfg(feature = "remote")]
pub mod gemini;

// Re-export main types at crate root for convenience
pub use client::{ImageRef, ImageryClient, TextGenerator, TileMapping};
pub use config::Scene;
pub use criteria::{DateRange, GeoPoint, Mode, Polarization, SelectionCriteria, VisParams};
pub use error::{Result, SarviewError};
pub use prompt::{Description, PromptBuilder, DEFAULT_MODEL};
pub use resolver::{QueryResolver, TileOutcome};
