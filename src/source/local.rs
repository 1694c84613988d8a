//! Synonym rules from a local file.
//!
//! Rule files are read as UTF-8. There is no setting for another encoding; a
//! file that is not valid UTF-8 fails the fetch and the active rules stay.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::debug;

use super::SynonymSource;
use crate::error::{Result, SynonymError};
use crate::synonym::extend::ExtendFilter;

/// A rule file on the local filesystem.
///
/// Changes are detected from the file's modification time and size; the
/// content is only read by [`fetch`](SynonymSource::fetch).
#[derive(Debug)]
pub struct LocalSynonymSource {
    path: PathBuf,
    location: String,
    extend: Option<ExtendFilter>,
    signature: Option<(SystemTime, u64)>,
}

impl LocalSynonymSource {
    /// Create a source reading `path`.
    pub fn new<P: AsRef<Path>>(path: P, extend: Option<ExtendFilter>) -> Self {
        let path = path.as_ref().to_path_buf();
        LocalSynonymSource {
            location: path.display().to_string(),
            path,
            extend,
            signature: None,
        }
    }

    fn signature(&self) -> Result<(SystemTime, u64)> {
        let metadata = fs::metadata(&self.path).map_err(|e| {
            SynonymError::source_fetch(format!("failed to stat '{}': {e}", self.location))
        })?;
        let modified = metadata.modified().map_err(|e| {
            SynonymError::source_fetch(format!(
                "no modification time for '{}': {e}",
                self.location
            ))
        })?;
        Ok((modified, metadata.len()))
    }
}

impl SynonymSource for LocalSynonymSource {
    fn detect_change(&mut self) -> Result<bool> {
        let signature = self.signature()?;
        let changed = self.signature != Some(signature);
        if changed {
            debug!("synonym file '{}' changed", self.location);
        }
        self.signature = Some(signature);
        Ok(changed)
    }

    fn fetch(&self) -> Result<String> {
        let bytes = fs::read(&self.path).map_err(|e| {
            SynonymError::source_fetch(format!("failed to read '{}': {e}", self.location))
        })?;
        let text = String::from_utf8(bytes).map_err(|e| {
            SynonymError::source_fetch(format!("'{}' is not valid UTF-8: {e}", self.location))
        })?;

        Ok(match &self.extend {
            Some(extend) => extend.apply_to_text(&text),
            None => text,
        })
    }

    fn location(&self) -> &str {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_detect_change() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a, b").unwrap();
        let mut source = LocalSynonymSource::new(file.path(), None);

        assert!(source.detect_change().unwrap());
        assert!(!source.detect_change().unwrap());

        write!(file, "\nc, d").unwrap();
        file.flush().unwrap();
        assert!(source.detect_change().unwrap());
        assert!(!source.detect_change().unwrap());
    }

    #[test]
    fn test_fetch() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a, b\n# note").unwrap();
        let source = LocalSynonymSource::new(file.path(), None);

        assert_eq!(source.fetch().unwrap(), "a, b\n# note");
    }

    #[test]
    fn test_fetch_with_extend() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "KEY, 中国").unwrap();
        let source = LocalSynonymSource::new(file.path(), Some(ExtendFilter::new(", ", true)));

        let text = source.fetch().unwrap();
        assert!(text.starts_with("KEY, 中国"));
        assert!(text.contains("zg"));
    }

    #[test]
    fn test_missing_file() {
        let mut source = LocalSynonymSource::new("/nonexistent/synonyms.txt", None);

        assert!(matches!(
            source.detect_change(),
            Err(SynonymError::SourceFetch(_))
        ));
        assert!(matches!(source.fetch(), Err(SynonymError::SourceFetch(_))));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00]).unwrap();
        let source = LocalSynonymSource::new(file.path(), None);

        assert!(matches!(source.fetch(), Err(SynonymError::SourceFetch(_))));
    }
}
