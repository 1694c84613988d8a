//! Per-line rule expansion with derived forms.
//!
//! When enabled, every rule line is widened before parsing: the bigrams of
//! its fields are appended, and every field is replaced by its transliterated
//! first-letter forms. With `exclude_first` the first field (typically a
//! canonical key) is kept verbatim.
//!
//! ```
//! use dynamic_synonym::synonym::ExtendFilter;
//!
//! let extend = ExtendFilter::new(", ", true);
//! let line = extend.handle_line("KEY, 同系统");
//!
//! assert!(line.starts_with("KEY, 同系统, "));
//! assert!(line.contains("txt"));
//! ```

use log::warn;

use crate::analysis::token_filter::{BigramFilter, Filter, FirstLetterFilter};
use crate::analysis::tokenizer::{KeywordTokenizer, Tokenizer};
use crate::error::Result;

/// Expands rule lines with bigram and first-letter forms.
#[derive(Clone, Debug)]
pub struct ExtendFilter {
    split_symbol: String,
    exclude_first: bool,
    tokenizer: KeywordTokenizer,
    bigram: BigramFilter,
    first_letter: FirstLetterFilter,
}

impl ExtendFilter {
    /// Create a filter splitting lines on `split_symbol`.
    pub fn new<S: Into<String>>(split_symbol: S, exclude_first: bool) -> Self {
        ExtendFilter {
            split_symbol: split_symbol.into(),
            exclude_first,
            tokenizer: KeywordTokenizer::new(),
            bigram: BigramFilter::new(),
            first_letter: FirstLetterFilter::new(),
        }
    }

    fn passes_through(line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#') || trimmed.contains("=>")
    }

    fn derive(&self, filter: &dyn Filter, field: &str) -> Result<Vec<String>> {
        let tokens = self.tokenizer.tokenize(field)?;
        Ok(filter.filter(tokens)?.map(|token| token.text).collect())
    }

    fn try_handle(&self, line: &str) -> Result<Vec<String>> {
        let mut fields: Vec<&str> = line.split(self.split_symbol.as_str()).collect();
        let first = if self.exclude_first && !fields.is_empty() {
            Some(fields.remove(0))
        } else {
            None
        };

        let mut sources: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        for field in &fields {
            sources.extend(self.derive(&self.bigram, field)?);
        }

        let mut result: Vec<String> = first.into_iter().map(str::to_string).collect();
        for source in &sources {
            for form in self.derive(&self.first_letter, source)? {
                if !result.contains(&form) {
                    result.push(form);
                }
            }
        }
        Ok(result)
    }

    /// Expand one line into its fields.
    ///
    /// Blank lines, comments and explicit mappings are returned unchanged.
    /// Failures degrade to the original line.
    pub fn handle(&self, line: &str) -> Vec<String> {
        if Self::passes_through(line) {
            return vec![line.to_string()];
        }
        match self.try_handle(line) {
            Ok(fields) if !fields.is_empty() => fields,
            Ok(_) => vec![line.to_string()],
            Err(e) => {
                warn!("failed to extend synonym line [{line}], keeping it as is: {e}");
                vec![line.to_string()]
            }
        }
    }

    /// Expand one line and join the fields back with the split symbol.
    pub fn handle_line(&self, line: &str) -> String {
        self.handle(line).join(&self.split_symbol)
    }

    /// Expand every line of a rule text.
    pub fn apply_to_text(&self, text: &str) -> String {
        text.lines()
            .map(|line| self.handle_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclude_first_keeps_key() {
        let extend = ExtendFilter::new(", ", true);
        let fields = extend.handle("KEY, 同系统");

        assert_eq!(fields[0], "KEY");
        assert_eq!(fields[1], "同系统");
        assert!(fields.contains(&"txt".to_string()));
        assert!(fields.contains(&"同系".to_string()));
        assert!(fields.contains(&"系统".to_string()));
        assert!(fields.contains(&"xt".to_string()));
        assert!(!fields.contains(&"key".to_string()));
    }

    #[test]
    fn test_first_field_is_derived_without_exclude() {
        let extend = ExtendFilter::new(", ", false);
        let fields = extend.handle("KEY, 中国");

        assert_eq!(fields[0], "key");
        assert!(fields.contains(&"zg".to_string()));
        assert!(fields.contains(&"ke".to_string()));
    }

    #[test]
    fn test_pass_through_lines() {
        let extend = ExtendFilter::new(", ", true);

        assert_eq!(extend.handle_line(""), "");
        assert_eq!(extend.handle_line("# 同系统"), "# 同系统");
        assert_eq!(extend.handle_line("a, b => c"), "a, b => c");
    }

    #[test]
    fn test_custom_split_symbol() {
        let extend = ExtendFilter::new("|", true);
        let line = extend.handle_line("K|ab");

        assert_eq!(line, "K|ab");
    }

    #[test]
    fn test_apply_to_text() {
        let extend = ExtendFilter::new(", ", true);
        let text = extend.apply_to_text("# keys\nK, ab\n\nJ, cd");

        assert_eq!(text, "# keys\nK, ab\n\nJ, cd");
    }
}
