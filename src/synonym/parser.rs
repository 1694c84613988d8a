//! Synonym rule parsing.
//!
//! Rule text comes in one of two grammars:
//!
//! - [`solr`] - comma-separated groups and `=>` explicit mappings
//! - [`wordnet`] - prolog `s(...)` facts grouped by synset id
//!
//! Both produce the same [`SynonymRule`] list. Every term is run through the
//! rule analyzer so that multi-word phrases are split (and case-folded) the
//! same way the live token stream is.

pub mod solr;
pub mod wordnet;

use crate::analysis::analyzer::Analyzer;
use crate::error::{Result, SynonymError};

pub use solr::SolrParser;
pub use wordnet::WordnetParser;

/// Grammar of a synonym rule file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SynonymFormat {
    /// `a, b, c` groups and `a => b` mappings.
    #[default]
    Solr,
    /// `s(100000001,1,'woods',n,1,0).` facts.
    Wordnet,
}

impl SynonymFormat {
    /// Resolve the configuration name of a grammar.
    ///
    /// An empty name selects the default (Solr) grammar.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "" | "solr" => Ok(SynonymFormat::Solr),
            "wordnet" => Ok(SynonymFormat::Wordnet),
            other => Err(SynonymError::configuration(format!(
                "unknown synonym format [{other}]"
            ))),
        }
    }

    fn parser(self) -> &'static dyn RuleParser {
        match self {
            SynonymFormat::Solr => &SolrParser,
            SynonymFormat::Wordnet => &WordnetParser,
        }
    }
}

/// One analyzed input and what it rewrites to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynonymRule {
    /// Input term sequence.
    pub input: Vec<String>,
    /// Replacement term sequences.
    pub outputs: Vec<Vec<String>>,
    /// Whether the input tokens stay in the stream next to the outputs.
    pub keep_original: bool,
}

/// A synonym rule grammar.
pub trait RuleParser: Send + Sync {
    /// Parse rule text into analyzed rules.
    fn parse(&self, text: &str, expand: bool, analyzer: &dyn Analyzer)
    -> Result<Vec<SynonymRule>>;

    /// Get the name of this grammar.
    fn name(&self) -> &'static str;
}

/// Parse rule text in the given grammar.
pub fn parse_rules(
    text: &str,
    format: SynonymFormat,
    expand: bool,
    analyzer: &dyn Analyzer,
) -> Result<Vec<SynonymRule>> {
    format.parser().parse(text, expand, analyzer)
}

/// Tokenize one rule term with the rule analyzer.
pub(crate) fn analyze_term(
    term: &str,
    analyzer: &dyn Analyzer,
    line: usize,
) -> Result<Vec<String>> {
    let words: Vec<String> = analyzer
        .analyze(term)
        .map_err(|e| SynonymError::rule_syntax(line, format!("term [{term}]: {e}")))?
        .map(|token| token.text)
        .filter(|text| !text.is_empty())
        .collect();

    if words.is_empty() {
        return Err(SynonymError::rule_syntax(
            line,
            format!("term [{term}] was completely eliminated by analyzer"),
        ));
    }
    Ok(words)
}

/// Turn an equivalence group into rules.
///
/// With `expand` every term maps to every other term and keeps itself;
/// otherwise every term maps to the first one.
pub(crate) fn expand_group(group: &[Vec<String>], expand: bool) -> Vec<SynonymRule> {
    let Some(canonical) = group.first() else {
        return Vec::new();
    };

    group
        .iter()
        .enumerate()
        .map(|(i, input)| {
            if expand {
                SynonymRule {
                    input: input.clone(),
                    outputs: group
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| *j != i)
                        .map(|(_, output)| output.clone())
                        .collect(),
                    keep_original: true,
                }
            } else {
                SynonymRule {
                    input: input.clone(),
                    outputs: vec![canonical.clone()],
                    keep_original: false,
                }
            }
        })
        .collect()
}

/// Split on `separator`, leaving backslash escapes in place.
///
/// Empty pieces are dropped.
pub(crate) fn split_escaped(text: &str, separator: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with(separator) {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            rest = &rest[separator.len()..];
            continue;
        }
        rest = &rest[c.len_utf8()..];
        current.push(c);
        if c == '\\'
            && let Some(escaped) = rest.chars().next()
        {
            current.push(escaped);
            rest = &rest[escaped.len_utf8()..];
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Drop backslash escapes, keeping the escaped characters.
pub(crate) fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::PipelineAnalyzer;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(SynonymFormat::from_name("").unwrap(), SynonymFormat::Solr);
        assert_eq!(SynonymFormat::from_name("Solr").unwrap(), SynonymFormat::Solr);
        assert_eq!(
            SynonymFormat::from_name("wordnet").unwrap(),
            SynonymFormat::Wordnet
        );
        assert!(matches!(
            SynonymFormat::from_name("csv"),
            Err(SynonymError::Configuration(_))
        ));
    }

    #[test]
    fn test_split_escaped() {
        assert_eq!(split_escaped("a, b,c", ","), vec!["a", " b", "c"]);
        assert_eq!(split_escaped("a\\,b, c", ","), vec!["a\\,b", " c"]);
        assert_eq!(split_escaped("a => b", "=>"), vec!["a ", " b"]);
        assert_eq!(split_escaped(",,a,,", ","), vec!["a"]);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a\\,b"), "a,b");
        assert_eq!(unescape("\\=\\>"), "=>");
        assert_eq!(unescape("plain"), "plain");
    }

    #[test]
    fn test_analyze_term() {
        let analyzer = PipelineAnalyzer::for_rules("whitespace", true).unwrap();

        assert_eq!(
            analyze_term("Machine  Learning", &analyzer, 1).unwrap(),
            words("machine learning")
        );

        let err = analyze_term("   ", &analyzer, 4).unwrap_err();
        assert!(matches!(err, SynonymError::RuleSyntax { line: 4, .. }));
    }

    #[test]
    fn test_expand_group() {
        let group = vec![words("a"), words("b"), words("c")];

        let rules = expand_group(&group, true);
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[1].input, words("b"));
        assert_eq!(rules[1].outputs, vec![words("a"), words("c")]);
        assert!(rules[1].keep_original);

        let rules = expand_group(&group, false);
        assert_eq!(rules.len(), 3);
        assert!(rules.iter().all(|r| r.outputs == vec![words("a")]));
        assert!(rules.iter().all(|r| !r.keep_original));

        assert!(expand_group(&[], true).is_empty());
    }
}
