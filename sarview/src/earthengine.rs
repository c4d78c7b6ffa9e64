//! Earth Engine REST client.
//!
//! This module is only available when the `remote` feature is enabled.
//!
//! Queries are sent as Earth Engine expression graphs: a JSON tree of
//! `functionInvocationValue` / `constantValue` nodes evaluated server-side.
//! Two endpoints are used:
//!
//! - `projects/{project}/value:compute` to read the ids of at most one image
//!   of the filtered collection (an empty list when nothing matches)
//! - `projects/{project}/maps` to render that image and obtain a map name,
//!   from which the tile URL template is derived

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{ImageRef, ImageryClient, TileMapping};
use crate::config::{env_var, required_env_var, timeout_from_env, DEFAULT_TIMEOUT_SECS};
use crate::criteria::{SelectionCriteria, VisParams};
use crate::error::{Result, SarviewError};

/// Public Earth Engine REST endpoint.
pub const DEFAULT_API_URL: &str = "https://earthengine.googleapis.com";

const SERVICE: &str = "imagery service";
const USER_PROJECT_HEADER: &str = "x-goog-user-project";

/// Configuration for [`EarthEngineClient`].
#[derive(Clone)]
pub struct EarthEngineConfig {
    /// Cloud project the requests are billed to.
    pub project: String,
    /// OAuth2 access token sent as a bearer token, if any.
    pub access_token: Option<String>,
    /// API base URL, without trailing path.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for EarthEngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EarthEngineConfig")
            .field("project", &self.project)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl EarthEngineConfig {
    /// Configuration for `project` against the public endpoint.
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            access_token: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read the configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SARVIEW_EE_PROJECT` | Cloud project id | Required |
    /// | `SARVIEW_EE_TOKEN` | OAuth2 access token | None |
    /// | `SARVIEW_EE_URL` | API base URL | `https://earthengine.googleapis.com` |
    /// | `SARVIEW_TIMEOUT_SECS` | Request timeout | 60 |
    ///
    /// # Errors
    ///
    /// Returns an error if `SARVIEW_EE_PROJECT` is not set or the timeout is
    /// not a positive integer.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            project: required_env_var("SARVIEW_EE_PROJECT")?,
            access_token: env_var("SARVIEW_EE_TOKEN"),
            api_url: env_var("SARVIEW_EE_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout_secs: timeout_from_env()?,
        })
    }

    /// Set the bearer token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// [`ImageryClient`] backed by the Earth Engine REST API.
///
/// Each method performs exactly one HTTP request; there is no retry.
pub struct EarthEngineClient {
    client: Client,
    config: EarthEngineConfig,
}

impl std::fmt::Debug for EarthEngineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EarthEngineClient")
            .field("config", &self.config)
            .finish()
    }
}

impl EarthEngineClient {
    /// Create a client with the given configuration.
    pub fn new(config: EarthEngineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SarviewError::Transport {
                service: SERVICE,
                source: Box::new(e),
            })?;

        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    ///
    /// See [`EarthEngineConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(EarthEngineConfig::from_env()?)
    }

    pub fn config(&self) -> &EarthEngineConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.api_url.trim_end_matches('/')
    }

    /// POST `body` to `projects/{project}/{method}` and parse the JSON reply.
    fn post<T: for<'de> Deserialize<'de>>(&self, method: &str, body: &Value) -> Result<T> {
        let url = format!(
            "{}/v1/projects/{}/{}",
            self.base_url(),
            self.config.project,
            method
        );

        let mut request = self
            .client
            .post(url)
            .header(USER_PROJECT_HEADER, &self.config.project)
            .json(body);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| SarviewError::Transport {
            service: SERVICE,
            source: Box::new(e),
        })?;

        let status = response.status();
        let body_text = response.text().unwrap_or_default();

        if !status.is_success() {
            return Err(SarviewError::Status {
                service: SERVICE,
                status: status.as_u16(),
                detail: extract_error_message(&body_text).unwrap_or(body_text),
            });
        }

        serde_json::from_str(&body_text).map_err(|e| SarviewError::InvalidResponse {
            service: SERVICE,
            reason: e.to_string(),
        })
    }

    /// Tile URL template for a map resource name.
    fn tile_url(&self, map_name: &str) -> String {
        format!("{}/v1/{}/tiles/{{z}}/{{x}}/{{y}}", self.base_url(), map_name)
    }
}

#[derive(Debug, Deserialize)]
struct ComputeResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    name: String,
}

impl ImageryClient for EarthEngineClient {
    fn first_image(&self, criteria: &SelectionCriteria) -> Result<Option<ImageRef>> {
        let body = json!({ "expression": expression(first_image_ids(criteria)) });
        let response: ComputeResponse = self.post("value:compute", &body)?;

        match response.result {
            Value::Array(ids) => match ids.into_iter().next() {
                None => Ok(None),
                Some(Value::String(id)) => Ok(Some(ImageRef { id })),
                Some(other) => Err(unexpected_result(&other)),
            },
            other => Err(unexpected_result(&other)),
        }
    }

    fn tile_mapping(&self, image: &ImageRef, vis: &VisParams) -> Result<TileMapping> {
        let body = json!({
            "expression": expression(invoke("Image.load", json!({ "id": constant(&image.id) }))),
            "fileFormat": "AUTO_JPEG_PNG",
            "bandIds": vis.bands,
            "visualizationOptions": {
                "ranges": [{ "min": vis.min, "max": vis.max }],
            },
        });
        let response: MapResponse = self.post("maps", &body)?;

        Ok(TileMapping {
            url_format: self.tile_url(&response.name),
            map_name: response.name,
        })
    }
}

/// Wrap a value node as a single-node expression.
fn expression(node: Value) -> Value {
    json!({ "result": "0", "values": { "0": node } })
}

fn invoke(function: &str, arguments: Value) -> Value {
    json!({
        "functionInvocationValue": {
            "functionName": function,
            "arguments": arguments,
        }
    })
}

fn constant(value: impl serde::Serialize) -> Value {
    json!({ "constantValue": value })
}

/// `collection.filter(f1).filter(f2)...` for the four selection filters.
fn filtered_collection(criteria: &SelectionCriteria) -> Value {
    let point = invoke(
        "GeometryConstructors.Point",
        json!({ "coordinates": constant([criteria.point.lon, criteria.point.lat]) }),
    );
    let date = |iso: String| invoke("Date", json!({ "value": constant(iso) }));
    let date_range = invoke(
        "DateRange",
        json!({
            "start": date(criteria.date_range.start_iso()),
            "end": date(criteria.date_range.end_iso()),
        }),
    );

    let filters = [
        invoke(
            "Filter.intersects",
            json!({ "leftField": constant(".all"), "rightValue": point }),
        ),
        invoke(
            "Filter.dateRangeContains",
            json!({ "leftValue": date_range, "rightField": constant("system:time_start") }),
        ),
        invoke(
            "Filter.equals",
            json!({
                "leftField": constant("instrumentMode"),
                "rightValue": constant(criteria.mode.as_str()),
            }),
        ),
        invoke(
            "Filter.listContains",
            json!({
                "leftField": constant("transmitterReceiverPolarisation"),
                "rightValue": constant(criteria.polarization.as_str()),
            }),
        ),
    ];

    filters.into_iter().fold(
        invoke(
            "ImageCollection.load",
            json!({ "id": constant(&criteria.collection) }),
        ),
        |collection, filter| {
            invoke(
                "Collection.filter",
                json!({ "collection": collection, "filter": filter }),
            )
        },
    )
}

/// `filtered.limit(1).aggregate_array("system:id")`: a list holding the id of
/// the first image, empty when nothing matches.
fn first_image_ids(criteria: &SelectionCriteria) -> Value {
    let limited = invoke(
        "Collection.limit",
        json!({ "collection": filtered_collection(criteria), "limit": constant(1) }),
    );
    invoke(
        "AggregateFeatureCollection.array",
        json!({ "collection": limited, "property": constant("system:id") }),
    )
}

fn unexpected_result(value: &Value) -> SarviewError {
    tracing::debug!(result = %value, "Unexpected value:compute result");
    SarviewError::InvalidResponse {
        service: SERVICE,
        reason: "expected a list of image ids".to_string(),
    }
}

/// Pull `error.message` (Google API error shape) or `message` out of a body.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<Value>(body).ok()?;

    if let Some(msg) = parsed
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
    {
        return Some(msg.to_string());
    }

    parsed
        .get("message")
        .and_then(|message| message.as_str())
        .map(ToOwned::to_owned)
}
