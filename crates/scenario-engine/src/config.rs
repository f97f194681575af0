//! Engine configuration

use crate::error::{EngineError, EngineResult};
use scenario_validate::DEFAULT_WEIGHT_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Per-session engine settings
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// metadata_capacity = 500
/// metadata_ttl_secs = 300
/// weight_tolerance = 0.01
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum cached entries per metadata dataset
    pub metadata_capacity: u64,
    /// Seconds before a cached metadata entry expires, none for never
    pub metadata_ttl_secs: Option<u64>,
    /// Allowed distance of rollup weight sums from 1.0
    pub weight_tolerance: f64,
    /// Build both reference indices when a document is loaded
    pub rebuild_references_on_load: bool,
    /// `tracing` filter directive used by the binary
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            metadata_capacity: 10_000,
            metadata_ttl_secs: None,
            weight_tolerance: DEFAULT_WEIGHT_TOLERANCE,
            rebuild_references_on_load: true,
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With metadata cache capacity
    #[inline]
    #[must_use]
    pub fn with_metadata_capacity(mut self, capacity: u64) -> Self {
        self.metadata_capacity = capacity;
        self
    }

    /// With metadata entry time-to-live
    #[inline]
    #[must_use]
    pub fn with_metadata_ttl(mut self, ttl: Duration) -> Self {
        self.metadata_ttl_secs = Some(ttl.as_secs());
        self
    }

    /// With rollup weight tolerance
    #[inline]
    #[must_use]
    pub fn with_weight_tolerance(mut self, tolerance: f64) -> Self {
        self.weight_tolerance = tolerance;
        self
    }

    /// With reference rebuild on load
    #[inline]
    #[must_use]
    pub fn with_rebuild_references_on_load(mut self, rebuild: bool) -> Self {
        self.rebuild_references_on_load = rebuild;
        self
    }

    /// With log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Metadata time-to-live as a duration
    #[inline]
    #[must_use]
    pub fn metadata_ttl(&self) -> Option<Duration> {
        self.metadata_ttl_secs.map(Duration::from_secs)
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] if the TOML is invalid
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`EngineError::Io`] if the file cannot be read and
    /// [`EngineError::Config`] if it is not valid TOML
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::io(path, source))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("weight_tolerance = 0.01\n").unwrap();
        assert_eq!(
            config,
            EngineConfig::new().with_weight_tolerance(0.01)
        );
    }

    #[test]
    fn builders_set_fields() {
        let config = EngineConfig::new()
            .with_metadata_capacity(50)
            .with_metadata_ttl(Duration::from_secs(90))
            .with_rebuild_references_on_load(false)
            .with_log_filter("scenario_engine=debug");
        assert_eq!(config.metadata_capacity, 50);
        assert_eq!(config.metadata_ttl(), Some(Duration::from_secs(90)));
        assert!(!config.rebuild_references_on_load);
        assert_eq!(config.log_filter, "scenario_engine=debug");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "metadata_capacity = 12\nmetadata_ttl_secs = 5").unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.metadata_capacity, 12);
        assert_eq!(config.metadata_ttl(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = EngineConfig::from_toml_str("metadata_capacity = \"many\"").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::load("/nonexistent/scenario-engine.toml").unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
