//! WordNet prolog synonym grammar.
//!
//! ```text
//! s(100000001,1,'woods',n,1,0).
//! s(100000001,2,'wood',n,1,0).
//! s(100000001,3,'forest',n,1,0).
//! ```
//!
//! Consecutive facts with the same synset id form one equivalence group.

use super::{RuleParser, SynonymRule, analyze_term, expand_group};
use crate::analysis::analyzer::Analyzer;
use crate::error::{Result, SynonymError};

/// Width of the synset id that follows `s(`.
const SYNSET_ID_LEN: usize = 9;

/// Parser for WordNet `s(...)` facts.
#[derive(Clone, Copy, Debug, Default)]
pub struct WordnetParser;

impl WordnetParser {
    fn synset_id(text: &str, line: usize) -> Result<&str> {
        let id = text
            .strip_prefix("s(")
            .and_then(|rest| rest.get(..SYNSET_ID_LEN))
            .filter(|id| id.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| SynonymError::rule_syntax(line, "expected a s(<synset id>,...) fact"))?;
        Ok(id)
    }

    fn word(text: &str, line: usize) -> Result<String> {
        match (text.find('\''), text.rfind('\'')) {
            (Some(start), Some(end)) if start < end => Ok(text[start + 1..end].replace("''", "'")),
            _ => Err(SynonymError::rule_syntax(line, "expected a quoted word")),
        }
    }
}

impl RuleParser for WordnetParser {
    fn parse(
        &self,
        text: &str,
        expand: bool,
        analyzer: &dyn Analyzer,
    ) -> Result<Vec<SynonymRule>> {
        let mut rules = Vec::new();
        let mut group: Vec<Vec<String>> = Vec::new();
        let mut last_id: Option<&str> = None;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let id = Self::synset_id(raw, line)?;
            if last_id != Some(id) {
                rules.extend(expand_group(&group, expand));
                group.clear();
                last_id = Some(id);
            }

            let word = Self::word(raw, line)?;
            group.push(analyze_term(&word, analyzer, line)?);
        }
        rules.extend(expand_group(&group, expand));

        Ok(rules)
    }

    fn name(&self) -> &'static str {
        "wordnet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::PipelineAnalyzer;

    const WOODS: &str = "s(100000001,1,'woods',n,1,0).\n\
                         s(100000001,2,'wood',n,1,0).\n\
                         s(100000001,3,'forest',n,1,0).\n\
                         s(100000002,1,'king''s evil',n,1,0).\n\
                         s(100000002,2,'scrofula',n,1,0).\n";

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn parse(text: &str, expand: bool) -> Result<Vec<SynonymRule>> {
        let analyzer = PipelineAnalyzer::for_rules("whitespace", false).unwrap();
        WordnetParser.parse(text, expand, &analyzer)
    }

    #[test]
    fn test_groups_by_synset() {
        let rules = parse(WOODS, true).unwrap();

        assert_eq!(rules.len(), 5);
        assert_eq!(rules[0].input, words("woods"));
        assert_eq!(rules[0].outputs, vec![words("wood"), words("forest")]);
        assert_eq!(rules[3].input, words("king's evil"));
        assert_eq!(rules[3].outputs, vec![words("scrofula")]);
    }

    #[test]
    fn test_no_expand_maps_to_first() {
        let rules = parse(WOODS, false).unwrap();

        assert_eq!(rules[2].input, words("forest"));
        assert_eq!(rules[2].outputs, vec![words("woods")]);
        assert_eq!(rules[4].outputs, vec![words("king's evil")]);
    }

    #[test]
    fn test_malformed_line() {
        let err = parse("s(100000001,1,'woods',n,1,0).\nwoods, wood", true).unwrap_err();
        assert!(matches!(err, SynonymError::RuleSyntax { line: 2, .. }));

        let err = parse("s(100000001,1,woods,n,1,0).", true).unwrap_err();
        assert!(matches!(err, SynonymError::RuleSyntax { line: 1, .. }));
    }

    #[test]
    fn test_parser_name() {
        assert_eq!(WordnetParser.name(), "wordnet");
    }
}
