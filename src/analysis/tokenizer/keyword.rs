//! Keyword tokenizer implementation.

use super::Tokenizer;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A tokenizer that emits the entire input as a single token.
///
/// Useful for synonym rules over identifiers, where a phrase must match the
/// whole field value. The extend pass also runs every rule field through it
/// before deriving bigrams and transliterations.
#[derive(Clone, Debug, Default)]
pub struct KeywordTokenizer;

impl KeywordTokenizer {
    /// Create a new keyword tokenizer.
    pub fn new() -> Self {
        KeywordTokenizer
    }
}

impl Tokenizer for KeywordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        if text.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }
        let token = Token::with_offsets(text, 0, 0, text.len());
        Ok(Box::new(std::iter::once(token)))
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}
