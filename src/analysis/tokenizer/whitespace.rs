//! Whitespace tokenizer implementation.

use super::Tokenizer;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::error::Result;

/// A tokenizer that splits text on whitespace.
///
/// This is the default tokenizer for synonym rules.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    /// Create a new whitespace tokenizer.
    pub fn new() -> Self {
        WhitespaceTokenizer
    }

    /// Detect token type based on the content of the word.
    pub(crate) fn detect_token_type(word: &str) -> TokenType {
        if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) {
            return TokenType::Num;
        }

        if word.chars().any(is_cjk) {
            return TokenType::Cjk;
        }

        TokenType::Word
    }
}

/// Whether the character belongs to one of the CJK ideograph blocks.
pub(crate) fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' |  // CJK Unified Ideographs
        '\u{3400}'..='\u{4DBF}' |  // CJK Extension A
        '\u{20000}'..='\u{2A6DF}' | // CJK Extension B
        '\u{2A700}'..='\u{2B73F}' | // CJK Extension C
        '\u{2B740}'..='\u{2B81F}' | // CJK Extension D
        '\u{2B820}'..='\u{2CEAF}'   // CJK Extension E
    )
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut start: Option<usize> = None;

        for (offset, c) in text.char_indices() {
            match (c.is_whitespace(), start) {
                (true, Some(word_start)) => {
                    tokens.push((word_start, offset));
                    start = None;
                }
                (false, None) => start = Some(offset),
                _ => {}
            }
        }
        if let Some(word_start) = start {
            tokens.push((word_start, text.len()));
        }

        let tokens: Vec<Token> = tokens
            .into_iter()
            .enumerate()
            .map(|(position, (start_offset, end_offset))| {
                let word = &text[start_offset..end_offset];
                Token::with_offsets(word, position, start_offset, end_offset)
                    .with_token_type(Self::detect_token_type(word))
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}
