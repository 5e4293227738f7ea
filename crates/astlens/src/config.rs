//! Configuration for astlens.
//!
//! Settings live in a YAML file, `.astlens.yaml` in the working directory by
//! default. Every field is optional; a missing file means defaults.
//!
//! ```yaml
//! language: lua
//! mode: collapsed
//! debounce:
//!   source-ms: 500
//!   selection-ms: 150
//! inspector:
//!   blacklist: [parent, _children]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::debounce::{SELECTION_DEBOUNCE, SOURCE_DEBOUNCE};
use crate::error::{Error, Result};
use crate::projector::{Projector, DEFAULT_BLACKLIST};
use crate::types::{Language, ViewMode};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = ".astlens.yaml";

/// Upper bound for debounce periods, in milliseconds
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Top-level configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct AstlensConfig {
    /// Language used when neither a flag nor a file extension decides
    pub language: Language,

    /// Tree granularity shown by default
    pub mode: ViewMode,

    /// Change coalescing periods
    pub debounce: DebounceConfig,

    /// Property inspector settings
    pub inspector: InspectorConfig,
}

/// Debounce section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct DebounceConfig {
    /// Quiet period after a source change
    pub source_ms: u64,

    /// Quiet period after a node selection change
    pub selection_ms: u64,
}

impl Default for DebounceConfig {
    #[allow(clippy::cast_possible_truncation)]
    fn default() -> Self {
        Self {
            source_ms: SOURCE_DEBOUNCE.as_millis() as u64,
            selection_ms: SELECTION_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl DebounceConfig {
    /// Source quiet period as a duration.
    #[must_use]
    pub fn source(&self) -> Duration {
        Duration::from_millis(self.source_ms)
    }

    /// Selection quiet period as a duration.
    #[must_use]
    pub fn selection(&self) -> Duration {
        Duration::from_millis(self.selection_ms)
    }
}

/// Inspector section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct InspectorConfig {
    /// Field names never expanded by the property projector
    pub blacklist: Vec<String>,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            blacklist: DEFAULT_BLACKLIST.iter().map(ToString::to_string).collect(),
        }
    }
}

impl AstlensConfig {
    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed YAML, unknown keys or values
    /// that fail validation.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`]
    /// if its content is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `explicit` if given, else from [`CONFIG_FILE_NAME`] in `dir`
    /// if it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be loaded,
    /// or if `explicit` names a file that cannot be read.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate: PathBuf = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            tracing::debug!(dir = %dir.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))
    }

    /// A projector using the configured blacklist.
    #[must_use]
    pub fn projector(&self) -> Projector {
        Projector::new(self.inspector.blacklist.iter().cloned())
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("debounce.source-ms", self.debounce.source_ms),
            ("debounce.selection-ms", self.debounce.selection_ms),
        ] {
            if value > MAX_DEBOUNCE_MS {
                return Err(Error::Config(format!(
                    "{name} cannot exceed {MAX_DEBOUNCE_MS} (got {value})"
                )));
            }
        }
        if self.inspector.blacklist.iter().any(|key| key.trim().is_empty()) {
            return Err(Error::Config(
                "inspector.blacklist entries must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = AstlensConfig::default();

        assert_eq!(config.language, Language::TypeScript);
        assert_eq!(config.mode, ViewMode::Extended);
        assert_eq!(config.debounce.source(), Duration::from_millis(500));
        assert_eq!(config.debounce.selection(), Duration::from_millis(150));
        assert_eq!(config.inspector.blacklist, vec!["parent", "_children"]);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AstlensConfig::from_yaml("language: lua\ndebounce:\n  source-ms: 250\n")
            .expect("valid config");

        assert_eq!(config.language, Language::Lua);
        assert_eq!(config.mode, ViewMode::Extended);
        assert_eq!(config.debounce.source_ms, 250);
        assert_eq!(config.debounce.selection_ms, 150);
    }

    #[test]
    fn empty_mapping_is_default() {
        let config = AstlensConfig::from_yaml("{}").expect("valid config");
        assert_eq!(config, AstlensConfig::default());
    }

    #[rstest]
    #[case::unknown_key("colour: red\n")]
    #[case::unknown_language("language: cobol\n")]
    #[case::unknown_mode("mode: sideways\n")]
    #[case::huge_debounce("debounce:\n  source-ms: 60000\n")]
    #[case::blank_blacklist_entry("inspector:\n  blacklist: ['']\n")]
    fn invalid_files_are_config_errors(#[case] yaml: &str) {
        let err = AstlensConfig::from_yaml(yaml).expect_err("config should be rejected");
        assert!(matches!(err, Error::Config(_)), "got {err:?}");
    }

    #[test]
    fn discover_reads_the_file_in_the_directory() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "mode: collapsed\n").expect("write");

        let config = AstlensConfig::discover(None, dir.path()).expect("config loads");

        assert_eq!(config.mode, ViewMode::Collapsed);
    }

    #[test]
    fn discover_without_a_file_uses_defaults() {
        let dir = TempDir::new().expect("temp dir");

        let config = AstlensConfig::discover(None, dir.path()).expect("defaults");

        assert_eq!(config, AstlensConfig::default());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("nope.yaml");

        let err = AstlensConfig::discover(Some(&missing), dir.path()).expect_err("missing file");

        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn load_errors_name_the_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "mode: [").expect("write");

        let err = AstlensConfig::load(&path).expect_err("malformed YAML");

        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn yaml_output_loads_back() {
        let mut config = AstlensConfig::default();
        config.language = Language::Lua;
        config.inspector.blacklist.push("loc".to_string());

        let yaml = config.to_yaml().expect("serializable");

        assert_eq!(AstlensConfig::from_yaml(&yaml).expect("valid"), config);
    }

    #[test]
    fn projector_uses_the_configured_blacklist() {
        let config = AstlensConfig::from_yaml("inspector:\n  blacklist: [parent, loc]\n")
            .expect("valid config");

        assert_eq!(config.projector().blacklist(), ["parent", "loc"]);
    }
}
