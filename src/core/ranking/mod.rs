//! # Ranking Module
//!
//! Orders scored pairs most-similar-first for the session.

use crate::core::pairing::ComparisonPair;
use std::cmp::Ordering;

/// Scored pairs sorted by similarity, descending.
///
/// The order is fixed at construction. Ties keep generator discovery order.
/// The cursor only moves forward and only the session controller moves it.
#[derive(Debug, Clone, Default)]
pub struct RankedQueue {
    pairs: Vec<ComparisonPair>,
    cursor: usize,
}

impl RankedQueue {
    /// Sort `pairs` and position the cursor on the first one
    pub fn new(mut pairs: Vec<ComparisonPair>) -> Self {
        // stable sort: equal scores fall back to discovery order
        pairs.sort_by(|a, b| rank_order(a, b));
        Self { pairs, cursor: 0 }
    }

    /// Pair under the cursor without advancing
    pub fn peek(&self) -> Option<&ComparisonPair> {
        self.pairs.get(self.cursor)
    }

    /// Pair at an arbitrary rank
    pub fn get(&self, index: usize) -> Option<&ComparisonPair> {
        self.pairs.get(index)
    }

    /// Number of pairs in the queue
    pub fn total(&self) -> usize {
        self.pairs.len()
    }

    /// Current cursor position; equals `total()` once exhausted
    pub fn index(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All pairs in rank order
    pub fn iter(&self) -> impl Iterator<Item = &ComparisonPair> + '_ {
        self.pairs.iter()
    }

    /// Consume the current entry; saturates at `total()`
    pub(crate) fn advance(&mut self) {
        if self.cursor < self.pairs.len() {
            self.cursor += 1;
        }
    }
}

fn rank_order(a: &ComparisonPair, b: &ComparisonPair) -> Ordering {
    b.similarity_score
        .total_cmp(&a.similarity_score)
        .then(a.discovery_index.cmp(&b.discovery_index))
}
