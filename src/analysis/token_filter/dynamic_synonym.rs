//! Live-reloadable synonym filter.
//!
//! Each filter instance wraps one upstream token stream and reads the active
//! [`SynonymMap`] from a shared [`ArcSwap`] cell. The reload monitor swaps
//! the cell's contents while the stream is being consumed; a call to
//! [`Iterator::next`] loads the map once and finishes with it, so a swap never
//! tears a match in half.
//!
//! Matching is greedy longest-match. Upstream tokens are pulled only as far as
//! the map can still extend the current match:
//!
//! ```text
//! rules:  a => x        a b => y
//! input:  a b c
//! output: y c
//! ```
//!
//! A matched span is consumed and its replacements are never scanned again.
//!
//! Replacements are laid out column by column over the span, so every
//! alternative starts on the span's first position:
//!
//! ```text
//! rules:  ml, machine learning
//! input:  machine learning rocks
//! output: machine  learning  rocks
//!         ml (len 2)
//! ```
//!
//! `position` on emitted tokens is recomputed from the increments.

use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::synonym::map::{SynonymEntry, SynonymMap};

/// Streaming synonym substitution over one token stream.
pub struct DynamicSynonymFilter {
    upstream: TokenStream,
    slot: Arc<ArcSwap<SynonymMap>>,
    /// Tokens pulled from upstream but not yet emitted.
    lookahead: VecDeque<Token>,
    /// Tokens produced for a matched span, waiting to be emitted.
    pending: VecDeque<Token>,
    /// Position of the last emitted token.
    position: Option<usize>,
    /// Empty positions to add to the next emitted token's increment.
    gap: usize,
    /// Trailing empty columns of the span in `pending`.
    span_gap: usize,
}

impl DynamicSynonymFilter {
    /// Wrap `upstream` with the given map.
    pub fn new(upstream: TokenStream, map: Arc<SynonymMap>) -> Self {
        DynamicSynonymFilter {
            upstream,
            slot: Arc::new(ArcSwap::new(map)),
            lookahead: VecDeque::new(),
            pending: VecDeque::new(),
            position: None,
            gap: 0,
            span_gap: 0,
        }
    }

    /// Replace the active map. Takes effect on the next call to `next()`.
    pub fn update(&self, map: Arc<SynonymMap>) {
        self.slot.store(map);
    }

    /// The map the next call to `next()` would use.
    pub fn current(&self) -> Arc<SynonymMap> {
        self.slot.load_full()
    }

    /// Shared cell holding the active map, for registration with a
    /// [`FilterRegistry`](crate::registry::FilterRegistry).
    pub fn handle(&self) -> Arc<ArcSwap<SynonymMap>> {
        Arc::clone(&self.slot)
    }

    /// Drop buffered tokens.
    pub fn reset(&mut self) {
        self.lookahead.clear();
        self.pending.clear();
        self.gap = 0;
        self.span_gap = 0;
    }

    fn pull(&mut self) -> bool {
        match self.upstream.next() {
            Some(token) => {
                self.lookahead.push_back(token);
                true
            }
            None => false,
        }
    }

    /// Queue the replacement tokens for `span`.
    ///
    /// Column `k` holds the span's k-th original (when kept) followed by the
    /// k-th word of every output, all but the first stacked with increment 0.
    fn emit(&mut self, span: &[Token], entry: &SynonymEntry) {
        let (Some(first), Some(last)) = (span.first(), span.last()) else {
            return;
        };
        let longest = entry.outputs.iter().map(Vec::len).max().unwrap_or(0);
        let width = span.len().max(longest);
        let mut filled = 0;

        for column in 0..width {
            let mut stacked = false;
            let mut increment = match column {
                0 => first.position_increment,
                _ => 1,
            };

            if entry.keep_original
                && let Some(original) = span.get(column)
            {
                if column > 0 {
                    increment = original.position_increment;
                }
                self.pending
                    .push_back(original.clone().with_position_increment(increment));
                stacked = true;
            }

            for output in &entry.outputs {
                let Some(word) = output.get(column) else {
                    continue;
                };
                let position_length = if output.len() == 1 { span.len() } else { 1 };
                self.pending.push_back(
                    Token::with_offsets(word.as_str(), 0, first.start_offset, last.end_offset)
                        .with_position_increment(if stacked { 0 } else { increment })
                        .with_position_length(position_length)
                        .with_token_type(TokenType::Synonym),
                );
                stacked = true;
            }

            if stacked {
                filled = column + 1;
            }
        }

        self.span_gap = width - filled;
    }

    /// Pin `token` to its absolute position.
    fn place(&mut self, mut token: Token) -> Token {
        token.position_increment += mem::take(&mut self.gap);
        token.position = match self.position {
            Some(previous) => previous + token.position_increment,
            None => token.position_increment.saturating_sub(1),
        };
        self.position = Some(token.position);
        if self.pending.is_empty() {
            self.gap = mem::take(&mut self.span_gap);
        }
        token
    }

    fn advance(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.pop_front() {
            return Some(token);
        }

        let map = self.slot.load_full();
        if map.is_empty() {
            return self.lookahead.pop_front().or_else(|| self.upstream.next());
        }

        if self.lookahead.is_empty() && !self.pull() {
            return None;
        }

        let mut walker = map.walker();
        let mut scanned = 0;
        loop {
            if scanned == self.lookahead.len() && !self.pull() {
                break;
            }
            if !walker.advance(&self.lookahead[scanned].text) {
                break;
            }
            scanned += 1;
        }

        match walker.longest_match() {
            Some((len, entry)) => {
                let span: Vec<Token> = self.lookahead.drain(..len).collect();
                self.emit(&span, entry);
                self.pending.pop_front().or_else(|| self.advance())
            }
            None => self.lookahead.pop_front(),
        }
    }
}

impl Iterator for DynamicSynonymFilter {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.advance()?;
        Some(self.place(token))
    }
}
