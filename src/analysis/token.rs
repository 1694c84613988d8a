//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows through the analysis pipeline. Synonym
//! expansion stacks alternatives on the same position, so tokens carry a
//! `position_increment` and a `position_length` in addition to their text and
//! offsets:
//!
//! ```text
//! Input: "machine learning"
//! With synonym: "ml"
//!
//!   "machine" (pos_inc=1, pos_len=1)
//!   "ml"      (pos_inc=0, pos_len=2)  ← same position, spans 2
//!   "learning"(pos_inc=1, pos_len=1)
//! ```
//!
//! # Examples
//!
//! ```
//! use dynamic_synonym::analysis::token::Token;
//!
//! let token = Token::with_offsets("world", 1, 6, 11);
//! assert_eq!(token.text, "world");
//! assert_eq!(token.start_offset, 6);
//! assert_eq!(token.position_increment, 1);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A token represents a single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the original token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Position increment from the previous token (default: 1).
    ///
    /// - 1: next position
    /// - 0: same position as the previous token (stacked synonym)
    pub position_increment: usize,

    /// How many positions this token spans (default: 1).
    ///
    /// A single-word synonym replacing "machine learning" spans 2.
    pub position_length: usize,

    /// Classification of the token content
    pub token_type: TokenType,
}

/// Token type classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Plain word produced by a tokenizer
    #[default]
    Word,
    /// Numeric values
    Num,
    /// CJK (Chinese, Japanese, Korean) characters
    Cjk,
    /// Synonym token (generated by the synonym filter)
    Synonym,
    /// Derived form (bigram or transliteration)
    Derived,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            position_increment: 1,
            position_length: 1,
            token_type: TokenType::Word,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            start_offset,
            end_offset,
            ..Token::new(text, position)
        }
    }

    /// Get the length of the token text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Set the token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    /// Clone this token with updated text.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut token = self.clone();
        token.text = text.into();
        token
    }

    /// Set the position increment.
    pub fn with_position_increment(mut self, increment: usize) -> Self {
        self.position_increment = increment;
        self
    }

    /// Set the position length.
    pub fn with_position_length(mut self, length: usize) -> Self {
        self.position_length = length;
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

/// Trait for types that can produce a token stream.
pub trait IntoTokenStream {
    /// Convert this type into a token stream.
    fn into_token_stream(self) -> TokenStream;
}

impl IntoTokenStream for Vec<Token> {
    fn into_token_stream(self) -> TokenStream {
        Box::new(self.into_iter())
    }
}
