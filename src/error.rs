//! Error types for the dynamic synonym library.
//!
//! All fallible operations return [`SynonymError`]. The variants follow the
//! lifecycle of a synonym filter: configuration problems are fatal when a
//! factory is built, while rule, fetch and build problems only abort the
//! reload cycle they happen in.
//!
//! # Examples
//!
//! ```
//! use dynamic_synonym::error::{Result, SynonymError};
//!
//! fn check_interval(secs: u64) -> Result<()> {
//!     if secs == 0 {
//!         return Err(SynonymError::configuration("interval must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_interval(0).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for dynamic synonym operations.
#[derive(Error, Debug)]
pub enum SynonymError {
    /// Missing or invalid setting. Fatal at construction time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed synonym rule text.
    #[error("Rule syntax error at line {line}: {message}")]
    RuleSyntax {
        /// 1-based line number of the offending rule.
        line: usize,
        /// What was wrong with the rule.
        message: String,
    },

    /// The rule source could not be reached or read.
    #[error("Source fetch error: {0}")]
    SourceFetch(String),

    /// The matching structure could not be built.
    #[error("Match build error: {0}")]
    MatchBuild(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with SynonymError.
pub type Result<T> = std::result::Result<T, SynonymError>;

impl SynonymError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        SynonymError::Configuration(msg.into())
    }

    /// Create a new rule syntax error for a known line.
    pub fn rule_syntax<S: Into<String>>(line: usize, msg: S) -> Self {
        SynonymError::RuleSyntax {
            line,
            message: msg.into(),
        }
    }

    /// Create a new source fetch error.
    pub fn source_fetch<S: Into<String>>(msg: S) -> Self {
        SynonymError::SourceFetch(msg.into())
    }

    /// Create a new match build error.
    pub fn match_build<S: Into<String>>(msg: S) -> Self {
        SynonymError::MatchBuild(msg.into())
    }

    /// Whether this error only aborts the current reload cycle.
    ///
    /// Configuration errors are the only kind that must reach the caller of
    /// a factory constructor; everything else is recovered by keeping the
    /// previously active synonym map.
    pub fn is_reload_recoverable(&self) -> bool {
        !matches!(self, SynonymError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SynonymError::configuration("missing synonyms_path");
        assert_eq!(
            error.to_string(),
            "Configuration error: missing synonyms_path"
        );

        let error = SynonymError::rule_syntax(3, "more than one explicit mapping");
        assert_eq!(
            error.to_string(),
            "Rule syntax error at line 3: more than one explicit mapping"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = SynonymError::from(io_error);

        match error {
            SynonymError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_reload_recoverable() {
        assert!(!SynonymError::configuration("x").is_reload_recoverable());
        assert!(SynonymError::source_fetch("x").is_reload_recoverable());
        assert!(SynonymError::match_build("x").is_reload_recoverable());
        assert!(SynonymError::rule_syntax(1, "x").is_reload_recoverable());
    }
}
