use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::search::iter::{EmptyIterator, ScoredOccurrence, TermIterator};

/// Result window: skip `offset` ranked hits, return at most `num`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub offset: usize,
    pub num: usize,
}

/// Materialize `inner`, rank by score descending, and keep the
/// `[offset, offset + limit)` window.
///
/// The sort is stable, so ties keep their ascending-by-key stream
/// order and a ranking is reproducible. A stop-word inner stream and an
/// offset at or past the end both collapse to the empty iterator.
pub fn top_n(offset: usize, limit: usize, mut inner: Box<dyn TermIterator>) -> Box<dyn TermIterator> {
    if inner.is_stop_word() {
        return Box::new(EmptyIterator);
    }

    let mut values = Vec::new();
    while let Some(scored) = inner.next() {
        values.push(scored);
    }

    if values.len() <= offset {
        return Box::new(EmptyIterator);
    }

    values.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    Box::new(TopNIterator {
        values: values.into_iter().skip(offset).take(limit).collect(),
    })
}

struct TopNIterator {
    values: VecDeque<ScoredOccurrence>,
}

impl TermIterator for TopNIterator {
    fn next(&mut self) -> Option<ScoredOccurrence> {
        self.values.pop_front()
    }
}
