//! Bigram filter implementation.
//!
//! Replaces every token by its adjacent-character bigrams. Tokens shorter
//! than two characters produce nothing.
//!
//! ```
//! use dynamic_synonym::analysis::token::Token;
//! use dynamic_synonym::analysis::token_filter::{BigramFilter, Filter};
//!
//! let tokens = vec![Token::with_offsets("同系统", 0, 0, 9)];
//! let grams: Vec<String> = BigramFilter::new()
//!     .filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(grams, vec!["同系", "系统"]);
//! ```

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that emits the character bigrams of each token.
#[derive(Clone, Debug, Default)]
pub struct BigramFilter;

impl BigramFilter {
    /// Create a new bigram filter.
    pub fn new() -> Self {
        BigramFilter
    }

    fn bigrams(token: &Token, position: &mut usize) -> Vec<Token> {
        let chars: Vec<(usize, char)> = token.text.char_indices().collect();
        chars
            .windows(2)
            .map(|pair| {
                let (start, first) = pair[0];
                let (second_start, second) = pair[1];
                let end = second_start + second.len_utf8();
                let text: String = [first, second].iter().collect();
                let gram = Token::with_offsets(
                    text,
                    *position,
                    token.start_offset + start,
                    token.start_offset + end,
                )
                .with_token_type(TokenType::Derived);
                *position += 1;
                gram
            })
            .collect()
    }
}

impl Filter for BigramFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut position = 0;
        let grams: Vec<Token> = tokens
            .flat_map(|token| Self::bigrams(&token, &mut position))
            .collect();

        Ok(Box::new(grams.into_iter()))
    }

    fn name(&self) -> &'static str {
        "bigram"
    }
}
