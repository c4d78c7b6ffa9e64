//! Error types for the sarview library.

use thiserror::Error;

/// Errors that can occur when selecting or describing SAR imagery.
///
/// The `Display` text of every variant is safe to show to end users: it names
/// the service and the kind of failure, never the upstream response body or
/// the request URL. Upstream detail is kept in separate fields for logging.
#[derive(Error, Debug)]
pub enum SarviewError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("could not reach the {service}")]
    Transport {
        service: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The service answered with a non-success HTTP status.
    #[error("the {service} returned HTTP {status}")]
    Status {
        service: &'static str,
        status: u16,
        /// Upstream error message, for server-side logs only.
        detail: String,
    },

    /// The service answered but the payload could not be understood.
    #[error("the {service} returned an unexpected response: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },

    /// A required environment variable is not set.
    #[error("{var} environment variable not set")]
    MissingConfig { var: &'static str },

    /// An environment variable holds a value that cannot be used.
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidConfig {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Unknown Sentinel-1 acquisition mode.
    #[error("unknown acquisition mode {0:?} (expected IW, EW, SM or WV)")]
    InvalidMode(String),

    /// Unknown polarization.
    #[error("unknown polarization {0:?} (expected VV, VH, HH or HV)")]
    InvalidPolarization(String),
}

impl SarviewError {
    /// Upstream detail worth logging alongside the error, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            SarviewError::Status { detail, .. } if !detail.is_empty() => Some(detail),
            _ => None,
        }
    }
}

/// Result type alias using [`SarviewError`].
pub type Result<T> = std::result::Result<T, SarviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SarviewError::Status {
            service: "text-generation service",
            status: 403,
            detail: "API key not valid. Please pass a valid API key.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "the text-generation service returned HTTP 403"
        );
        assert!(!err.to_string().contains("API key"));
        assert_eq!(
            err.detail(),
            Some("API key not valid. Please pass a valid API key.")
        );

        let err = SarviewError::MissingConfig {
            var: "SARVIEW_EE_PROJECT",
        };
        assert!(err.to_string().contains("SARVIEW_EE_PROJECT"));

        let err = SarviewError::InvalidMode("XX".to_string());
        assert!(err.to_string().contains("XX"));
    }

    #[test]
    fn test_detail_empty_is_none() {
        let err = SarviewError::Status {
            service: "imagery service",
            status: 500,
            detail: String::new(),
        };
        assert_eq!(err.detail(), None);
    }
}
