//! Analyzers combine a tokenizer with a chain of filters.
//!
//! ```text
//! Raw Text → Tokenizer → Filter 1 → ... → Filter N → Token Stream
//! ```
//!
//! The synonym factory uses an analyzer twice: once to tokenize rule phrases
//! while compiling a synonym map, and (optionally) as the host pipeline the
//! synonym filter is appended to.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` to allow analyzers to be shared with the
/// background reload thread.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &str;
}

pub mod pipeline;

pub use pipeline::PipelineAnalyzer;
