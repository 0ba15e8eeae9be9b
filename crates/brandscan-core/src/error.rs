//! Error types for the design assistant
//!
//! [`AnalysisError`] is the single taxonomy callers see. Every variant maps to
//! an explanatory message through [`AnalysisError::user_message`]; none of
//! them ends the session.

use brandscan_artifact::{RecognitionError, ValidationError};
use brandscan_report::AggregationError;
use brandscan_scan::{CatalogError, ScanError};
use std::path::PathBuf;

/// Top-level analysis error
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Upload rejected before scanning
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Link is not a usable design reference
    #[error("recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    /// Analyzer failed or returned nothing usable
    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),

    /// Findings could not be turned into a report
    #[error("aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    /// Composer refused the action
    #[error("composer error: {0}")]
    Composer(#[from] ComposerError),
}

impl AnalysisError {
    /// Check if the user can retry the same submission
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Scan(e) => e.is_retryable(),
            Self::Composer(ComposerError::Busy) => true,
            _ => false,
        }
    }

    /// Explanation suitable for showing to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Recognition(RecognitionError::NotAReference { reason }) => {
                format!("That link doesn't look like a design file ({reason}). Paste a design or file link instead.")
            }
            Self::Recognition(RecognitionError::Malformed(_)) => {
                "I couldn't read that link. Please check it and try again.".to_string()
            }
            Self::Scan(ScanError::Timeout { .. }) => {
                "The analysis took too long. Please try again.".to_string()
            }
            Self::Scan(ScanError::BackendUnavailable { .. }) => {
                "The design analyzer is unavailable right now. Please try again later.".to_string()
            }
            Self::Scan(ScanError::AlreadyInFlight { .. }) | Self::Composer(ComposerError::Busy) => {
                "I'm still analyzing your previous submission.".to_string()
            }
            Self::Scan(e) => format!("I couldn't analyze this design: {e}."),
            Self::Aggregation(_) => {
                "The analysis didn't produce any findings, so no report was created.".to_string()
            }
            Self::Composer(e) => e.to_string(),
        }
    }
}

/// Composer refusals
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposerError {
    /// A submission is still being produced
    #[error("a submission is already being analyzed")]
    Busy,

    /// Nothing to send
    #[error("nothing to send: type a message or attach a design")]
    Empty,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid TOML
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// Configured catalog could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_retryable_validation_is_not() {
        let timeout = AnalysisError::from(ScanError::Timeout { timeout_ms: 10 });
        assert!(timeout.is_retryable());
        assert!(timeout.user_message().contains("try again"));

        let invalid = AnalysisError::from(ValidationError::VectorImage);
        assert!(!invalid.is_retryable());
        assert_eq!(
            invalid.user_message(),
            "SVG files are not currently supported for security reasons."
        );
    }

    #[test]
    fn invalid_reference_message_is_descriptive() {
        let err = AnalysisError::from(RecognitionError::NotAReference {
            reason: "'example.com' is not a design host".into(),
        });
        assert!(err.user_message().contains("example.com"));
    }
}
