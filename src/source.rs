//! Where synonym rules come from.
//!
//! A source answers two questions: "has the rule text changed since the last
//! check?" (cheaply, without downloading it when possible) and "what is the
//! rule text now?".
//!
//! - [`local::LocalSynonymSource`] - a file, compared by modification time and size
//! - [`remote::RemoteSynonymSource`] - an HTTP resource, compared by cache validators

pub mod local;
pub mod remote;

pub use local::LocalSynonymSource;
pub use remote::RemoteSynonymSource;

use crate::config::SynonymFilterConfig;
use crate::error::Result;

/// A location synonym rule text is read from.
///
/// Sources keep validator state between calls, so change detection takes
/// `&mut self`. They are driven from the reload thread, hence `Send`.
pub trait SynonymSource: Send {
    /// Report whether the rules changed since the previous call, recording
    /// the new validators.
    fn detect_change(&mut self) -> Result<bool>;

    /// Read the full rule text, after the extend pass when configured.
    fn fetch(&self) -> Result<String>;

    /// Human readable location, for logs.
    fn location(&self) -> &str;
}

/// Pick the source matching the configured `synonyms_path`.
pub fn from_config(config: &SynonymFilterConfig) -> Result<Box<dyn SynonymSource>> {
    if config.is_remote() {
        Ok(Box::new(RemoteSynonymSource::new(
            config.synonyms_path.as_str(),
            config.extend(),
        )?))
    } else {
        Ok(Box::new(LocalSynonymSource::new(
            config.synonyms_path.as_str(),
            config.extend(),
        )))
    }
}
