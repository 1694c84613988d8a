//! Tokenizer implementations for text analysis.
//!
//! Tokenizers are the first step of the analysis pipeline. The synonym filter
//! uses the same tokenizer for rule phrases that produced the live stream, so
//! multi-word rules line up with incoming tokens.
//!
//! # Available Tokenizers
//!
//! - [`whitespace::WhitespaceTokenizer`] - Splits on whitespace characters
//! - [`unicode_word::UnicodeWordTokenizer`] - Uses Unicode word boundaries
//! - [`keyword::KeywordTokenizer`] - Treats entire text as single token
//!
//! # Examples
//!
//! ```
//! use dynamic_synonym::analysis::tokenizer::{self, Tokenizer};
//!
//! let tokenizer = tokenizer::by_name("whitespace").unwrap();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello world").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! ```

use std::sync::Arc;

use crate::analysis::token::TokenStream;
use crate::error::{Result, SynonymError};

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so a tokenizer can be shared between the
/// analysis threads and the background reload thread.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod keyword;
pub mod unicode_word;
pub mod whitespace;

pub use keyword::KeywordTokenizer;
pub use unicode_word::UnicodeWordTokenizer;
pub use whitespace::WhitespaceTokenizer;

/// Look up a tokenizer by its configuration name.
///
/// Recognized names are `whitespace`, `keyword` and
/// `standard` (alias `unicode_word`).
pub fn by_name(name: &str) -> Result<Arc<dyn Tokenizer>> {
    match name.to_ascii_lowercase().as_str() {
        "" | "whitespace" => Ok(Arc::new(WhitespaceTokenizer::new())),
        "keyword" => Ok(Arc::new(KeywordTokenizer::new())),
        "standard" | "unicode_word" => Ok(Arc::new(UnicodeWordTokenizer::new())),
        other => Err(SynonymError::configuration(format!(
            "failed to find tokenizer [{other}] for synonym token filter"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("whitespace").unwrap().name(), "whitespace");
        assert_eq!(by_name("").unwrap().name(), "whitespace");
        assert_eq!(by_name("keyword").unwrap().name(), "keyword");
        assert_eq!(by_name("Standard").unwrap().name(), "unicode_word");
    }

    #[test]
    fn test_unknown_tokenizer() {
        let err = by_name("lindera").err().unwrap();
        assert!(matches!(err, SynonymError::Configuration(_)));
        assert!(err.to_string().contains("lindera"));
    }
}
