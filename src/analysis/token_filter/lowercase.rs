//! Lowercase filter implementation.
//!
//! Appended to the rule analyzer when `ignore_case` is set, so rule phrases
//! are folded the same way the matcher folds live tokens.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that converts tokens to lowercase.
///
/// Positions, offsets and token types are preserved.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|mut token| {
            if token.text.chars().any(char::is_uppercase) {
                token.text = token.text.to_lowercase();
            }
            token
        })))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}
