//! Text analysis building blocks.
//!
//! Tokenizers split text into tokens, filters rewrite token streams, and
//! analyzers chain the two. The synonym filter in
//! [`token_filter::dynamic_synonym`] plugs into this pipeline.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
