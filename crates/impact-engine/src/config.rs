use serde::{Deserialize, Serialize};

use impact_diff::DiffAlgorithm;

use crate::error::{EngineError, EngineResult};
use crate::report::ReportOptions;

/// Configuration for an analysis session.
///
/// Loadable from TOML; every field is optional:
///
/// ```toml
/// algorithm = "patience"
///
/// [report]
/// collapse_duplicate_labels = false
/// removed_as_changed = true
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Line diff algorithm used when the session computes diffs itself.
    pub algorithm: DiffAlgorithm,
    /// How report rows are assembled.
    pub report: ReportOptions,
}

impl SessionConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> EngineResult<String> {
        toml::to_string(self).map_err(|e| EngineError::Config(e.to_string()))
    }
}
