//! # dynamic-synonym
//!
//! A synonym token filter whose rules can change while the process runs.
//!
//! ## Features
//!
//! - Solr and WordNet rule grammars
//! - FST-backed longest-match lookup over multi-word phrases
//! - Local file and HTTP rule sources with cheap change detection
//! - Lock-free hot swap of the active rules into every live filter
//! - Optional rule expansion with bigram and pinyin first-letter forms
//!
//! ## Overview
//!
//! ```text
//! SynonymSource ─> parse_rules ─> SynonymMapBuilder ─> SynonymMap
//!                                                        │ store + sweep
//!                      DynamicSynonymFilterFactory ──────┤
//!                                                        ▼
//!          TokenStream ─> DynamicSynonymFilter ─> TokenStream
//! ```
//!
//! A [`factory::DynamicSynonymFilterFactory`] loads the rules once, then a
//! [`monitor::Monitor`] on a [`monitor::ReloadScheduler`] thread polls the
//! source every interval and pushes rebuilt maps to the filters it created.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod factory;
pub mod monitor;
pub mod registry;
pub mod source;
pub mod synonym;

pub mod prelude {
    pub use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
    pub use crate::analysis::token::{Token, TokenStream, TokenType};
    pub use crate::analysis::token_filter::{DynamicSynonymFilter, Filter};
    pub use crate::config::SynonymFilterConfig;
    pub use crate::error::{Result, SynonymError};
    pub use crate::factory::{DynamicSynonymFilterFactory, ReloadOutcome};
    pub use crate::monitor::ReloadScheduler;
    pub use crate::synonym::{SynonymFormat, SynonymMap, SynonymMapBuilder};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
