//! Compiled synonym map.
//!
//! Uses an FST (Finite State Transducer) keyed by input term sequences. The
//! terms of a sequence are joined with a `0x00` separator byte, so the FST can
//! be walked one live token at a time: after each token the walker knows
//! whether the sequence read so far is a complete input, and it stops as soon
//! as no rule can continue. That gives longest-match lookup without bounding
//! the phrase length up front.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use fst::raw::{Node, Output};
use fst::{Map, MapBuilder};

use crate::error::{Result, SynonymError};
use crate::synonym::parser::SynonymRule;

/// Byte placed between the terms of a multi-word input.
const SEPARATOR: u8 = 0;

/// What a matched input expands to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SynonymEntry {
    /// Replacement term sequences, in rule order, without duplicates.
    pub outputs: Vec<Vec<String>>,
    /// Whether the matched tokens are emitted before the replacements.
    pub keep_original: bool,
}

/// Immutable synonym map.
///
/// A map is never mutated after [`SynonymMapBuilder::build`]; reloading
/// produces a new map. It can therefore be shared behind an `Arc` and read
/// from any number of threads without synchronization.
pub struct SynonymMap {
    /// `None` means no synonyms are active.
    fst: Option<Map<Vec<u8>>>,
    /// Entries indexed by FST values.
    entries: Vec<SynonymEntry>,
    ignore_case: bool,
    max_input_len: usize,
}

impl fmt::Debug for SynonymMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynonymMap")
            .field("entries", &self.entries.len())
            .field("ignore_case", &self.ignore_case)
            .field("max_input_len", &self.max_input_len)
            .finish()
    }
}

impl Default for SynonymMap {
    fn default() -> Self {
        Self::empty()
    }
}

impl SynonymMap {
    /// A map without synonyms. Filters pass tokens through untouched.
    pub fn empty() -> Self {
        SynonymMap {
            fst: None,
            entries: Vec::new(),
            ignore_case: false,
            max_input_len: 0,
        }
    }

    /// Whether the map holds no synonyms.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct inputs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether inputs are matched case-insensitively.
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Longest input, in terms.
    pub fn max_input_len(&self) -> usize {
        self.max_input_len
    }

    /// Start a longest-match walk from the root of the map.
    pub fn walker(&self) -> MatchWalker<'_> {
        MatchWalker {
            map: self,
            node: self.fst.as_ref().map(|fst| fst.as_fst().root()),
            output: Output::zero(),
            consumed: 0,
            longest: None,
        }
    }

    /// Exact lookup of a whole term sequence.
    pub fn lookup(&self, terms: &[&str]) -> Option<&SynonymEntry> {
        let mut walker = self.walker();
        for term in terms {
            if !walker.advance(term) {
                return None;
            }
        }
        match walker.longest_match() {
            Some((len, entry)) if len == terms.len() => Some(entry),
            _ => None,
        }
    }

    fn entry(&self, index: u64) -> Option<&SynonymEntry> {
        usize::try_from(index).ok().and_then(|i| self.entries.get(i))
    }
}

/// Incremental longest-match search over a [`SynonymMap`].
///
/// Feed terms with [`advance`](Self::advance) until it returns `false` or the
/// input runs out, then read [`longest_match`](Self::longest_match).
pub struct MatchWalker<'a> {
    map: &'a SynonymMap,
    /// `None` once the walk can no longer match anything.
    node: Option<Node<'a>>,
    output: Output,
    consumed: usize,
    longest: Option<(usize, u64)>,
}

impl<'a> MatchWalker<'a> {
    /// Feed the next term. Returns `false` when no input continues with it.
    pub fn advance(&mut self, term: &str) -> bool {
        if self.node.is_none() {
            return false;
        }
        let term: Cow<'_, str> = if self.map.ignore_case {
            Cow::Owned(term.to_lowercase())
        } else {
            Cow::Borrowed(term)
        };

        if self.consumed > 0 && !self.step(SEPARATOR) {
            return false;
        }
        for &byte in term.as_bytes() {
            if !self.step(byte) {
                return false;
            }
        }

        self.consumed += 1;
        if let Some(node) = &self.node
            && node.is_final()
        {
            let value = self.output.cat(node.final_output()).value();
            self.longest = Some((self.consumed, value));
        }
        true
    }

    fn step(&mut self, byte: u8) -> bool {
        let map: &'a SynonymMap = self.map;
        let (Some(node), Some(fst)) = (&self.node, &map.fst) else {
            return false;
        };
        match node.find_input(byte) {
            Some(i) => {
                let transition = node.transition(i);
                self.output = self.output.cat(transition.out);
                self.node = Some(fst.as_fst().node(transition.addr));
                true
            }
            None => {
                self.node = None;
                false
            }
        }
    }

    /// Number of terms fed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// The longest complete input seen so far: its length in terms and entry.
    pub fn longest_match(&self) -> Option<(usize, &'a SynonymEntry)> {
        let (len, index) = self.longest?;
        self.map.entry(index).map(|entry| (len, entry))
    }
}

/// Builder for [`SynonymMap`].
///
/// Several additions for the same input merge: outputs are deduplicated in
/// insertion order and `keep_original` is OR-ed. An output equal to its input
/// is recorded as `keep_original` instead of as a replacement.
#[derive(Debug, Default)]
pub struct SynonymMapBuilder {
    ignore_case: bool,
    pending: BTreeMap<Vec<u8>, (Vec<String>, SynonymEntry)>,
}

impl SynonymMapBuilder {
    /// Create a builder. With `ignore_case`, inputs and outputs are lowercased.
    pub fn new(ignore_case: bool) -> Self {
        SynonymMapBuilder {
            ignore_case,
            pending: BTreeMap::new(),
        }
    }

    fn fold(&self, terms: &[String]) -> Vec<String> {
        if self.ignore_case {
            terms.iter().map(|t| t.to_lowercase()).collect()
        } else {
            terms.to_vec()
        }
    }

    /// Add one input → output mapping.
    pub fn add(&mut self, input: &[String], output: &[String], keep_original: bool) {
        let input = self.fold(input);
        let output = self.fold(output);
        let key = input.join("\u{0}").into_bytes();

        let (_, entry) = self
            .pending
            .entry(key)
            .or_insert_with(|| (input.clone(), SynonymEntry::default()));
        entry.keep_original |= keep_original;
        if output == input {
            entry.keep_original = true;
        } else if !output.is_empty() && !entry.outputs.contains(&output) {
            entry.outputs.push(output);
        }
    }

    /// Add every mapping of a parsed rule.
    pub fn add_rule(&mut self, rule: &SynonymRule) {
        if rule.outputs.is_empty() {
            self.add(&rule.input, &[], rule.keep_original);
        }
        for output in &rule.outputs {
            self.add(&rule.input, output, rule.keep_original);
        }
    }

    /// Add every mapping of a list of parsed rules.
    pub fn add_rules(&mut self, rules: &[SynonymRule]) {
        for rule in rules {
            self.add_rule(rule);
        }
    }

    /// Compile the collected mappings into an immutable map.
    ///
    /// Inputs whose only mapping is to themselves are dropped.
    pub fn build(self) -> Result<SynonymMap> {
        let mut builder = MapBuilder::memory();
        let mut entries = Vec::new();
        let mut max_input_len = 0;

        for (key, (input, entry)) in self.pending {
            if entry.outputs.is_empty() {
                continue;
            }
            if input.is_empty() || input.iter().any(|t| t.is_empty() || t.contains('\u{0}')) {
                return Err(SynonymError::match_build(format!(
                    "invalid synonym input {input:?}"
                )));
            }
            max_input_len = max_input_len.max(input.len());
            builder
                .insert(&key, entries.len() as u64)
                .map_err(|e| SynonymError::match_build(format!("FST build error: {e}")))?;
            entries.push(entry);
        }

        if entries.is_empty() {
            return Ok(SynonymMap {
                ignore_case: self.ignore_case,
                ..SynonymMap::empty()
            });
        }

        let bytes = builder
            .into_inner()
            .map_err(|e| SynonymError::match_build(format!("FST finalize error: {e}")))?;
        let fst = Map::new(bytes)
            .map_err(|e| SynonymError::match_build(format!("FST creation error: {e}")))?;

        Ok(SynonymMap {
            fst: Some(fst),
            entries,
            ignore_case: self.ignore_case,
            max_input_len,
        })
    }
}
