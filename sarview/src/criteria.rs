//! Image selection criteria.
//!
//! A [`SelectionCriteria`] is built per request from the configured scene
//! (collection, point, date range) and the user-chosen acquisition
//! [`Mode`] and [`Polarization`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SarviewError};

/// Sentinel-1 ground range detected collection.
pub const DEFAULT_COLLECTION: &str = "COPERNICUS/S1_GRD";

/// Sentinel-1 acquisition mode (`instrumentMode` property).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mode {
    /// Interferometric Wide swath.
    #[default]
    Iw,
    /// Extra Wide swath.
    Ew,
    /// Stripmap.
    Sm,
    /// Wave.
    Wv,
}

impl Mode {
    /// All modes, in display order.
    pub const ALL: [Mode; 4] = [Mode::Iw, Mode::Ew, Mode::Sm, Mode::Wv];

    /// Value of the `instrumentMode` image property.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Iw => "IW",
            Mode::Ew => "EW",
            Mode::Sm => "SM",
            Mode::Wv => "WV",
        }
    }
}

impl FromStr for Mode {
    type Err = SarviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IW" => Ok(Mode::Iw),
            "EW" => Ok(Mode::Ew),
            "SM" => Ok(Mode::Sm),
            "WV" => Ok(Mode::Wv),
            _ => Err(SarviewError::InvalidMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = SarviewError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transmit/receive polarization (`transmitterReceiverPolarisation` entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Polarization {
    #[default]
    Vv,
    Vh,
    Hh,
    Hv,
}

impl Polarization {
    /// All polarizations, in display order.
    pub const ALL: [Polarization; 4] = [
        Polarization::Vv,
        Polarization::Vh,
        Polarization::Hh,
        Polarization::Hv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Polarization::Vv => "VV",
            Polarization::Vh => "VH",
            Polarization::Hh => "HH",
            Polarization::Hv => "HV",
        }
    }
}

impl FromStr for Polarization {
    type Err = SarviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VV" => Ok(Polarization::Vv),
            "VH" => Ok(Polarization::Vh),
            "HH" => Ok(Polarization::Hh),
            "HV" => Ok(Polarization::Hv),
            _ => Err(SarviewError::InvalidPolarization(s.to_string())),
        }
    }
}

impl TryFrom<String> for Polarization {
    type Error = SarviewError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Polarization> for String {
    fn from(polarization: Polarization) -> Self {
        polarization.as_str().to_string()
    }
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A geographic point in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    /// Longitude (-180 to 180).
    pub lon: f64,
    /// Latitude (-90 to 90).
    pub lat: f64,
}

impl GeoPoint {
    /// Create a point, rejecting coordinates outside the valid range.
    pub fn new(lon: f64, lat: f64) -> Option<Self> {
        if (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat) {
            Some(Self { lon, lat })
        } else {
            None
        }
    }

    /// Parse a `lon,lat` pair.
    pub fn parse(value: &str) -> Option<Self> {
        let (lon, lat) = value.split_once(',')?;
        Self::new(lon.trim().parse().ok()?, lat.trim().parse().ok()?)
    }
}

impl Default for GeoPoint {
    /// New Orleans.
    fn default() -> Self {
        Self {
            lon: -90.0715,
            lat: 29.9511,
        }
    }
}

/// Acquisition date range. `end` is exclusive, matching the imagery
/// service's date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range; `None` unless `start` is before `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Start date as `YYYY-MM-DD`.
    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// End date as `YYYY-MM-DD`.
    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl Default for DateRange {
    /// June 2023.
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2023, 6, 30).unwrap_or_default(),
        }
    }
}

/// Filter values submitted to the imagery service for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionCriteria {
    /// Image collection id.
    pub collection: String,
    /// Images must intersect this point.
    pub point: GeoPoint,
    /// Images must have been acquired within this range.
    pub date_range: DateRange,
    /// Required `instrumentMode`.
    pub mode: Mode,
    /// Required entry of `transmitterReceiverPolarisation`.
    pub polarization: Polarization,
}

/// Visualization applied when rendering map tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisParams {
    pub bands: Vec<String>,
    pub min: f64,
    pub max: f64,
}

impl Default for VisParams {
    /// `VV` backscatter stretched over -25..0 dB.
    fn default() -> Self {
        Self {
            bands: vec!["VV".to_string()],
            min: -25.0,
            max: 0.0,
        }
    }
}
