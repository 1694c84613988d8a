//! Synonym rules and the compiled synonym map.
//!
//! Rule text goes through three stages before it can rewrite a token stream:
//!
//! ```text
//! raw text ──extend──> rule text ──parse──> SynonymRule* ──build──> SynonymMap
//! ```
//!
//! - [`extend`] - optional per-line expansion with bigrams and transliterations
//! - [`parser`] - the Solr and WordNet rule grammars
//! - [`map`] - the immutable FST-backed map with longest-match lookup
//!
//! # Examples
//!
//! ```
//! use dynamic_synonym::analysis::analyzer::PipelineAnalyzer;
//! use dynamic_synonym::synonym::map::SynonymMapBuilder;
//! use dynamic_synonym::synonym::parser::{parse_rules, SynonymFormat};
//!
//! let analyzer = PipelineAnalyzer::for_rules("whitespace", true).unwrap();
//! let rules = parse_rules("ml, machine learning", SynonymFormat::Solr, true, &analyzer).unwrap();
//!
//! let mut builder = SynonymMapBuilder::new(true);
//! builder.add_rules(&rules);
//! let map = builder.build().unwrap();
//!
//! assert!(map.lookup(&["Machine", "Learning"]).is_some());
//! ```

pub mod extend;
pub mod map;
pub mod parser;

pub use extend::ExtendFilter;
pub use map::{SynonymEntry, SynonymMap, SynonymMapBuilder};
pub use parser::{SynonymFormat, SynonymRule, parse_rules};
