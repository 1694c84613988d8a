//! Pipeline analyzer that combines tokenizers and filters.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use dynamic_synonym::analysis::analyzer::{Analyzer, PipelineAnalyzer};
//! use dynamic_synonym::analysis::token_filter::LowercaseFilter;
//! use dynamic_synonym::analysis::tokenizer::WhitespaceTokenizer;
//!
//! let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
//!     .add_filter(Arc::new(LowercaseFilter::new()));
//!
//! let tokens: Vec<_> = analyzer.analyze("Hello WORLD").unwrap().collect();
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[1].text, "world");
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{Filter, LowercaseFilter};
use crate::analysis::tokenizer::{self, Tokenizer};
use crate::error::Result;

/// A configurable analyzer that combines a tokenizer with a chain of filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            filters: Vec::new(),
        }
    }

    /// Build the analyzer used to tokenize synonym rule phrases.
    ///
    /// The tokenizer is looked up by configuration name; a lowercase filter
    /// is appended when `ignore_case` is set.
    pub fn for_rules(tokenizer_name: &str, ignore_case: bool) -> Result<Self> {
        let analyzer = PipelineAnalyzer::new(tokenizer::by_name(tokenizer_name)?);
        Ok(if ignore_case {
            analyzer.add_filter(Arc::new(LowercaseFilter::new()))
        } else {
            analyzer
        })
    }

    /// Add a filter to the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set a custom name for this analyzer.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = self.tokenizer.tokenize(text)?;

        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }

        Ok(tokens)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
