//! Synonym filter settings.
//!
//! Settings are plain JSON:
//!
//! ```json
//! {
//!   "synonyms_path": "http://example.com/synonyms.txt",
//!   "interval": 30,
//!   "ignore_case": true,
//!   "extend_filter": true,
//!   "extend_exclude_first": true
//! }
//! ```
//!
//! Only `synonyms_path` is required.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynonymError};
use crate::synonym::extend::ExtendFilter;
use crate::synonym::parser::SynonymFormat;

/// Settings of one dynamic synonym filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymFilterConfig {
    /// Local file path, or an `http://` / `https://` URL.
    #[serde(default)]
    pub synonyms_path: String,

    /// Seconds between change checks.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Match case-insensitively.
    #[serde(default)]
    pub ignore_case: bool,

    /// Make every term of an equivalence group map to every other term.
    #[serde(default = "default_true")]
    pub expand: bool,

    /// Rule grammar: `""`/`"solr"` or `"wordnet"`.
    #[serde(default)]
    pub format: String,

    /// Tokenizer for rule phrases: `whitespace`, `keyword` or `standard`.
    #[serde(default = "default_tokenizer")]
    pub tokenizer: String,

    /// Widen every rule line with bigram and first-letter forms.
    #[serde(default)]
    pub extend_filter: bool,

    /// Field separator used by the extend pass.
    #[serde(default = "default_split_symbol")]
    pub extend_split_symbol: String,

    /// Keep the first field of each line out of the extend pass.
    #[serde(default)]
    pub extend_exclude_first: bool,
}

fn default_interval() -> u64 {
    60
}
fn default_true() -> bool {
    true
}
fn default_tokenizer() -> String {
    "whitespace".to_string()
}
fn default_split_symbol() -> String {
    ", ".to_string()
}

impl Default for SynonymFilterConfig {
    fn default() -> Self {
        Self {
            synonyms_path: String::new(),
            interval: default_interval(),
            ignore_case: false,
            expand: true,
            format: String::new(),
            tokenizer: default_tokenizer(),
            extend_filter: false,
            extend_split_symbol: default_split_symbol(),
            extend_exclude_first: false,
        }
    }
}

impl SynonymFilterConfig {
    /// Settings with defaults for everything but the rule location.
    pub fn new<S: Into<String>>(synonyms_path: S) -> Self {
        Self {
            synonyms_path: synonyms_path.into(),
            ..Self::default()
        }
    }

    /// Parse and validate settings from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a JSON file.
    ///
    /// A relative local `synonyms_path` is resolved against the directory of
    /// the settings file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SynonymError::configuration(format!(
                "failed to read settings file '{}': {e}",
                path.display()
            ))
        })?;
        let mut config = Self::from_json_str(&json)?;

        if !config.is_remote()
            && Path::new(&config.synonyms_path).is_relative()
            && let Some(dir) = path.parent()
        {
            let resolved: PathBuf = dir.join(&config.synonyms_path);
            config.synonyms_path = resolved.to_string_lossy().into_owned();
        }
        Ok(config)
    }

    /// Check required and constrained settings.
    pub fn validate(&self) -> Result<()> {
        if self.synonyms_path.trim().is_empty() {
            return Err(SynonymError::configuration(
                "missing required setting [synonyms_path]",
            ));
        }
        if self.interval == 0 {
            return Err(SynonymError::configuration(
                "setting [interval] must be greater than zero",
            ));
        }
        if self.extend_filter && self.extend_split_symbol.is_empty() {
            return Err(SynonymError::configuration(
                "setting [extend_split_symbol] must not be empty",
            ));
        }
        self.synonym_format()?;
        crate::analysis::tokenizer::by_name(&self.tokenizer)?;
        Ok(())
    }

    /// Whether the rules are fetched over HTTP.
    pub fn is_remote(&self) -> bool {
        self.synonyms_path.starts_with("http://") || self.synonyms_path.starts_with("https://")
    }

    /// Polling period.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// The configured rule grammar.
    pub fn synonym_format(&self) -> Result<SynonymFormat> {
        SynonymFormat::from_name(&self.format)
    }

    /// The extend pass, when enabled.
    pub fn extend(&self) -> Option<ExtendFilter> {
        self.extend_filter.then(|| {
            ExtendFilter::new(self.extend_split_symbol.as_str(), self.extend_exclude_first)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = SynonymFilterConfig::from_json_str(r#"{"synonyms_path": "s.txt"}"#).unwrap();

        assert_eq!(config.interval, 60);
        assert!(!config.ignore_case);
        assert!(config.expand);
        assert_eq!(config.tokenizer, "whitespace");
        assert_eq!(config.extend_split_symbol, ", ");
        assert!(config.extend().is_none());
        assert_eq!(config.synonym_format().unwrap(), SynonymFormat::Solr);
        assert_eq!(config, SynonymFilterConfig::new("s.txt"));
    }

    #[test]
    fn test_missing_path() {
        let err = SynonymFilterConfig::from_json_str("{}").unwrap_err();
        assert!(matches!(err, SynonymError::Configuration(_)));
        assert!(err.to_string().contains("synonyms_path"));
    }

    #[test]
    fn test_invalid_settings() {
        let cases = [
            r#"{"synonyms_path": "s.txt", "interval": 0}"#,
            r#"{"synonyms_path": "s.txt", "format": "csv"}"#,
            r#"{"synonyms_path": "s.txt", "tokenizer": "lindera"}"#,
            r#"{"synonyms_path": "s.txt", "extend_filter": true, "extend_split_symbol": ""}"#,
        ];
        for json in cases {
            let err = SynonymFilterConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, SynonymError::Configuration(_)), "{json}");
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = SynonymFilterConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, SynonymError::Json(_)));
    }

    #[test]
    fn test_remote_detection() {
        assert!(SynonymFilterConfig::new("http://localhost/s.txt").is_remote());
        assert!(SynonymFilterConfig::new("https://localhost/s.txt").is_remote());
        assert!(!SynonymFilterConfig::new("/etc/s.txt").is_remote());
    }

    #[test]
    fn test_from_file_resolves_relative_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"synonyms_path": "synonyms.txt", "interval": 5}}"#).unwrap();

        let config = SynonymFilterConfig::from_file(file.path()).unwrap();
        let expected = file.path().parent().unwrap().join("synonyms.txt");

        assert_eq!(Path::new(&config.synonyms_path), expected);
        assert_eq!(config.interval(), Duration::from_secs(5));
    }
}
