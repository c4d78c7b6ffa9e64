//! Environment-driven configuration.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SARVIEW_COLLECTION` | Image collection id | `COPERNICUS/S1_GRD` |
//! | `SARVIEW_POINT` | Point of interest as `lon,lat` | `-90.0715,29.9511` |
//! | `SARVIEW_START_DATE` | First acquisition day (`YYYY-MM-DD`) | `2023-06-01` |
//! | `SARVIEW_END_DATE` | End of the range, exclusive (`YYYY-MM-DD`) | `2023-06-30` |
//! | `SARVIEW_TIMEOUT_SECS` | HTTP client timeout* | 60 |
//!
//! *Only used when the `remote` feature is enabled.

use chrono::NaiveDate;

use crate::criteria::{
    DateRange, GeoPoint, Mode, Polarization, SelectionCriteria, DEFAULT_COLLECTION,
};
use crate::error::{Result, SarviewError};

/// Default timeout for outbound HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// The fixed part of every image query: where, when, and which collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub collection: String,
    pub point: GeoPoint,
    pub date_range: DateRange,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            point: GeoPoint::default(),
            date_range: DateRange::default(),
        }
    }
}

impl Scene {
    /// Read the scene from environment variables, falling back to defaults
    /// for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`SarviewError::InvalidConfig`] if a variable is set but
    /// cannot be parsed, or if the start date is after the end date.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let collection = env_var("SARVIEW_COLLECTION").unwrap_or(defaults.collection);

        let point = match env_var("SARVIEW_POINT") {
            Some(value) => GeoPoint::parse(&value).ok_or_else(|| SarviewError::InvalidConfig {
                var: "SARVIEW_POINT",
                value,
                reason: "expected lon,lat within ±180/±90".to_string(),
            })?,
            None => defaults.point,
        };

        let start = parse_date_var("SARVIEW_START_DATE")?.unwrap_or(defaults.date_range.start);
        let end = parse_date_var("SARVIEW_END_DATE")?.unwrap_or(defaults.date_range.end);
        let date_range = DateRange::new(start, end).ok_or_else(|| SarviewError::InvalidConfig {
            var: "SARVIEW_START_DATE",
            value: start.to_string(),
            reason: format!("start date must be before end date {}", end),
        })?;

        Ok(Self {
            collection,
            point,
            date_range,
        })
    }

    /// Set the point of interest.
    pub fn point(mut self, point: GeoPoint) -> Self {
        self.point = point;
        self
    }

    /// Set the acquisition date range.
    pub fn date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    /// Set the image collection id.
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Combine this scene with a mode and polarization.
    pub fn criteria(&self, mode: Mode, polarization: Polarization) -> SelectionCriteria {
        SelectionCriteria {
            collection: self.collection.clone(),
            point: self.point,
            date_range: self.date_range,
            mode,
            polarization,
        }
    }
}

/// Read `SARVIEW_TIMEOUT_SECS`, defaulting to [`DEFAULT_TIMEOUT_SECS`].
pub fn timeout_from_env() -> Result<u64> {
    match env_var("SARVIEW_TIMEOUT_SECS") {
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(SarviewError::InvalidConfig {
                var: "SARVIEW_TIMEOUT_SECS",
                value,
                reason: "expected a positive number of seconds".to_string(),
            }),
        },
        None => Ok(DEFAULT_TIMEOUT_SECS),
    }
}

/// Non-empty value of an environment variable, trimmed.
///
/// Unset and blank variables both yield `None`.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Value of a required environment variable.
#[cfg_attr(not(feature = "remote"), allow(dead_code))]
pub(crate) fn required_env_var(name: &'static str) -> Result<String> {
    env_var(name).ok_or(SarviewError::MissingConfig { var: name })
}

fn parse_date_var(name: &'static str) -> Result<Option<NaiveDate>> {
    match env_var(name) {
        Some(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| SarviewError::InvalidConfig {
                var: name,
                value,
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "SARVIEW_COLLECTION",
        "SARVIEW_POINT",
        "SARVIEW_START_DATE",
        "SARVIEW_END_DATE",
        "SARVIEW_TIMEOUT_SECS",
    ];

    /// Run `f` with the given variables set and every other scene variable
    /// unset, restoring the original environment afterwards.
    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let saved: Vec<(&str, Option<String>)> =
            VARS.iter().map(|k| (*k, std::env::var(k).ok())).collect();
        for k in VARS {
            std::env::remove_var(k);
        }
        for (k, v) in vars {
            std::env::set_var(k, v);
        }

        let result = f();

        for (k, v) in saved {
            match v {
                Some(v) => std::env::set_var(k, v),
                None => std::env::remove_var(k),
            }
        }
        result
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        let scene = with_env(&[], Scene::from_env).unwrap();
        assert_eq!(scene, Scene::default());
        assert_eq!(scene.collection, "COPERNICUS/S1_GRD");
    }

    #[test]
    #[serial]
    fn test_from_env_with_values() {
        let scene = with_env(
            &[
                ("SARVIEW_COLLECTION", "COPERNICUS/S1_GRD_FLOAT"),
                ("SARVIEW_POINT", "4.35,50.85"),
                ("SARVIEW_START_DATE", "2024-01-01"),
                ("SARVIEW_END_DATE", "2024-01-31"),
            ],
            Scene::from_env,
        )
        .unwrap();

        assert_eq!(scene.collection, "COPERNICUS/S1_GRD_FLOAT");
        assert_eq!(scene.point, GeoPoint::new(4.35, 50.85).unwrap());
        assert_eq!(scene.date_range.start_iso(), "2024-01-01");
        assert_eq!(scene.date_range.end_iso(), "2024-01-31");
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_point() {
        let result = with_env(&[("SARVIEW_POINT", "north")], Scene::from_env);
        assert!(matches!(
            result,
            Err(SarviewError::InvalidConfig {
                var: "SARVIEW_POINT",
                ..
            })
        ));
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_date() {
        let result = with_env(&[("SARVIEW_START_DATE", "06/01/2023")], Scene::from_env);
        assert!(matches!(
            result,
            Err(SarviewError::InvalidConfig {
                var: "SARVIEW_START_DATE",
                ..
            })
        ));
    }

    #[test]
    #[serial]
    fn test_from_env_reversed_dates() {
        let result = with_env(
            &[
                ("SARVIEW_START_DATE", "2023-07-01"),
                ("SARVIEW_END_DATE", "2023-06-01"),
            ],
            Scene::from_env,
        );
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_timeout_from_env() {
        assert_eq!(with_env(&[], timeout_from_env).unwrap(), 60);
        assert_eq!(
            with_env(&[("SARVIEW_TIMEOUT_SECS", "5")], timeout_from_env).unwrap(),
            5
        );
        assert!(with_env(&[("SARVIEW_TIMEOUT_SECS", "0")], timeout_from_env).is_err());
        assert!(with_env(&[("SARVIEW_TIMEOUT_SECS", "soon")], timeout_from_env).is_err());
    }

    #[test]
    #[serial]
    fn test_env_var_ignores_blank_values() {
        with_env(&[("SARVIEW_COLLECTION", "  ")], || {
            assert_eq!(env_var("SARVIEW_COLLECTION"), None);
        });
        with_env(&[("SARVIEW_COLLECTION", "")], || {
            assert_eq!(env_var("SARVIEW_COLLECTION"), None);
            assert_eq!(Scene::from_env().unwrap().collection, DEFAULT_COLLECTION);
        });
        with_env(&[("SARVIEW_COLLECTION", " TEST/C \n")], || {
            assert_eq!(env_var("SARVIEW_COLLECTION").as_deref(), Some("TEST/C"));
        });
        with_env(&[], || assert_eq!(env_var("SARVIEW_COLLECTION"), None));
    }

    #[test]
    fn test_criteria_combines_scene_and_filters() {
        let scene = Scene::default().collection("TEST/COLLECTION");
        let criteria = scene.criteria(Mode::Ew, Polarization::Hh);
        assert_eq!(criteria.collection, "TEST/COLLECTION");
        assert_eq!(criteria.point, scene.point);
        assert_eq!(criteria.date_range, scene.date_range);
        assert_eq!(criteria.mode, Mode::Ew);
        assert_eq!(criteria.polarization, Polarization::Hh);
    }
}
