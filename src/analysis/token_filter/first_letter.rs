//! Transliterated first-letter filter.
//!
//! Expands every token into its lowercased original followed by every
//! combination of the first pinyin letters of its characters. Han characters
//! with several readings contribute one letter per distinct reading; any
//! other character contributes itself, lowercased.
//!
//! ```
//! use dynamic_synonym::analysis::token::Token;
//! use dynamic_synonym::analysis::token_filter::{Filter, FirstLetterFilter};
//!
//! let tokens = vec![Token::new("中国", 0)];
//! let forms: Vec<String> = FirstLetterFilter::new()
//!     .filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(forms[0], "中国");
//! assert!(forms.contains(&"zg".to_string()));
//! ```

use pinyin::ToPinyinMulti;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Upper bound on the combinations generated for one token.
const MAX_COMBINATIONS: usize = 256;

/// A filter that emits transliterated first-letter forms of each token.
#[derive(Clone, Debug, Default)]
pub struct FirstLetterFilter;

impl FirstLetterFilter {
    /// Create a new first-letter filter.
    pub fn new() -> Self {
        FirstLetterFilter
    }

    fn letters(c: char) -> Vec<String> {
        let mut letters: Vec<String> = Vec::new();
        if let Some(readings) = c.to_pinyin_multi() {
            for i in 0..readings.count() {
                let letter = readings.get(i).first_letter().to_string();
                if !letters.contains(&letter) {
                    letters.push(letter);
                }
            }
        }
        if letters.is_empty() {
            letters.push(c.to_lowercase().collect());
        }
        letters
    }

    /// All forms of one word, original first, without duplicates.
    pub fn forms(&self, word: &str) -> Vec<String> {
        let mut forms: Vec<String> = Vec::new();
        if word.is_empty() {
            return forms;
        }
        forms.push(word.to_lowercase());

        let mut combinations = vec![String::new()];
        for c in word.chars() {
            let letters = Self::letters(c);
            let mut next = Vec::with_capacity(combinations.len() * letters.len());
            'outer: for prefix in &combinations {
                for letter in &letters {
                    if next.len() == MAX_COMBINATIONS {
                        break 'outer;
                    }
                    next.push(format!("{prefix}{letter}"));
                }
            }
            combinations = next;
        }

        for combination in combinations {
            if !forms.contains(&combination) {
                forms.push(combination);
            }
        }
        forms
    }
}

impl Filter for FirstLetterFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut output = Vec::new();
        for token in tokens {
            for (i, form) in self.forms(&token.text).into_iter().enumerate() {
                output.push(
                    token
                        .with_text(form)
                        .with_position_increment(if i == 0 { token.position_increment } else { 0 })
                        .with_token_type(TokenType::Derived),
                );
            }
        }

        Ok(Box::new(output.into_iter()))
    }

    fn name(&self) -> &'static str {
        "first_letter"
    }
}
