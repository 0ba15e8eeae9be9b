//! Assistant configuration
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! [validation]
//! max_image_bytes = 10485760
//!
//! [scan]
//! backend = "mock"
//! timeout_ms = 30000
//!
//! [store]
//! seed_demo = true
//!
//! [chat]
//! response_delay_ms = 1000
//! role = "designer"
//! ```

use crate::error::ConfigError;
use brandscan_artifact::ValidationLimits;
use brandscan_report::StoreConfig;
use brandscan_scan::{BackendKind, ScanConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Chat configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Simulated thinking time before an answer is applied
    pub response_delay_ms: u64,
    /// User's role, used to personalise the welcome message
    pub role: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: 1000,
            role: None,
        }
    }
}

impl ChatConfig {
    /// Response delay
    #[inline]
    #[must_use]
    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }
}

/// Full assistant configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub validation: ValidationLimits,
    pub scan: ScanConfig,
    pub store: StoreConfig,
    pub chat: ChatConfig,
}

impl AnalysisConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML
    ///
    /// # Errors
    /// - `ConfigError::Parse` for invalid TOML
    /// - `ConfigError::Invalid` for out-of-range values
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.check()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise see
    /// [`AnalysisConfig::from_toml_str`]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), backend = ?config.scan.backend, "config loaded");
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.validation.max_image_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "validation.max_image_bytes",
                reason: "must be greater than zero".into(),
            });
        }
        if self.validation.max_document_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "validation.max_document_bytes",
                reason: "must be greater than zero".into(),
            });
        }
        if self.scan.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "scan.timeout_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if self.scan.backend == BackendKind::Remote && self.scan.endpoint.is_none() {
            tracing::warn!("remote scan backend selected without an endpoint");
        }
        Ok(())
    }

    /// With scan backend
    #[inline]
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.scan.backend = backend;
        self
    }

    /// With simulated scan delays (uploads and references)
    #[inline]
    #[must_use]
    pub fn with_scan_delay(mut self, delay: Duration) -> Self {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.scan.mock_delay_ms = ms;
        self.scan.reference_delay_ms = ms;
        self
    }

    /// With scan timeout
    #[inline]
    #[must_use]
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With chat response delay
    #[inline]
    #[must_use]
    pub fn with_chat_delay(mut self, delay: Duration) -> Self {
        self.chat.response_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With demo reports seeded into the store
    #[inline]
    #[must_use]
    pub fn with_demo_seed(mut self, seed: bool) -> Self {
        self.store.seed_demo = seed;
        self
    }

    /// With the user's role
    #[inline]
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.chat.role = Some(role.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(AnalysisConfig::from_toml_str("").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            [scan]
            backend = "remote"
            endpoint = "https://analyzer.local"

            [chat]
            role = "marketer"
            "#,
        )
        .unwrap();
        assert_eq!(config.scan.backend, BackendKind::Remote);
        assert_eq!(config.scan.timeout_ms, ScanConfig::default().timeout_ms);
        assert_eq!(config.chat.role.as_deref(), Some("marketer"));
        assert_eq!(config.chat.response_delay_ms, 1000);
        assert_eq!(config.validation, ValidationLimits::default());
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let err = AnalysisConfig::from_toml_str("[scan]\ntimeout_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "scan.timeout_ms", .. }));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        assert!(matches!(
            AnalysisConfig::from_toml_str("[scan\nbackend="),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brandscan.toml");
        std::fs::write(&path, "[store]\nseed_demo = true\nclose_grace_ms = 50\n").unwrap();
        let config = AnalysisConfig::load(&path).unwrap();
        assert!(config.store.seed_demo);
        assert_eq!(config.store.close_grace_ms, 50);

        let missing = AnalysisConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
