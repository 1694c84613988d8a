//! Solr synonym grammar.
//!
//! ```text
//! # comment
//! ipod, i-pod, i pod           equivalence group
//! i-pod, i pod => ipod         explicit mapping
//! a\,b => c                    escaped comma
//! ```

use log::trace;

use super::{RuleParser, SynonymRule, analyze_term, expand_group, split_escaped, unescape};
use crate::analysis::analyzer::Analyzer;
use crate::error::{Result, SynonymError};

/// Parser for the Solr synonym grammar.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolrParser;

impl SolrParser {
    fn terms(side: &str, analyzer: &dyn Analyzer, line: usize) -> Result<Vec<Vec<String>>> {
        split_escaped(side, ",")
            .iter()
            .map(|term| unescape(term).trim().to_string())
            .filter(|term| !term.is_empty())
            .map(|term| analyze_term(&term, analyzer, line))
            .collect()
    }

    fn parse_line(
        &self,
        text: &str,
        line: usize,
        expand: bool,
        analyzer: &dyn Analyzer,
    ) -> Result<Vec<SynonymRule>> {
        let sides = split_escaped(text, "=>");
        if sides.len() > 2 {
            return Err(SynonymError::rule_syntax(
                line,
                "more than one explicit mapping specified on the same line",
            ));
        }

        if sides.len() == 2 {
            let inputs = Self::terms(&sides[0], analyzer, line)?;
            let outputs = Self::terms(&sides[1], analyzer, line)?;
            if inputs.is_empty() || outputs.is_empty() {
                return Err(SynonymError::rule_syntax(
                    line,
                    "explicit mapping needs terms on both sides",
                ));
            }
            return Ok(inputs
                .into_iter()
                .map(|input| SynonymRule {
                    input,
                    outputs: outputs.clone(),
                    keep_original: false,
                })
                .collect());
        }

        // "a =>" and "=> b" leave a single side behind
        if text.contains("=>") && !text.contains("\\=") {
            return Err(SynonymError::rule_syntax(
                line,
                "explicit mapping needs terms on both sides",
            ));
        }

        let group = Self::terms(text, analyzer, line)?;
        Ok(expand_group(&group, expand))
    }
}

impl RuleParser for SolrParser {
    fn parse(
        &self,
        text: &str,
        expand: bool,
        analyzer: &dyn Analyzer,
    ) -> Result<Vec<SynonymRule>> {
        let mut rules = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_start_matches('\u{feff}');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let parsed = self.parse_line(line, index + 1, expand, analyzer)?;
            trace!("line {}: {} rules", index + 1, parsed.len());
            rules.extend(parsed);
        }

        Ok(rules)
    }

    fn name(&self) -> &'static str {
        "solr"
    }
}
