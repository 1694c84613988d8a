//! Token filter implementations for token transformation.
//!
//! Filters receive a stream of tokens produced by a tokenizer and return a
//! new stream. They can modify, remove, or add tokens.
//!
//! # Available Filters
//!
//! - [`lowercase::LowercaseFilter`] - Converts tokens to lowercase
//! - [`bigram::BigramFilter`] - Emits adjacent-character bigrams
//! - [`first_letter::FirstLetterFilter`] - Emits transliterated first letters
//! - [`dynamic_synonym::DynamicSynonymFilter`] - Live-reloadable synonym expansion
//!
//! # Examples
//!
//! ```
//! use dynamic_synonym::analysis::token_filter::Filter;
//! use dynamic_synonym::analysis::token_filter::lowercase::LowercaseFilter;
//! use dynamic_synonym::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Hello", 0), Token::new("WORLD", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "hello");
//! assert_eq!(filtered[1].text, "world");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
///
/// The trait requires `Send + Sync` to allow use in concurrent contexts.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod bigram;
pub mod dynamic_synonym;
pub mod first_letter;
pub mod lowercase;

pub use bigram::BigramFilter;
pub use dynamic_synonym::DynamicSynonymFilter;
pub use first_letter::FirstLetterFilter;
pub use lowercase::LowercaseFilter;
