use std::cmp::Ordering;

use crate::index::posting::FieldTermOccurrence;
use crate::search::iter::{ScoredOccurrence, TermIterator};

/// Conjunction of two sorted streams.
///
/// A stop-word operand is transparent: the other operand is returned
/// unchanged.
pub fn intersect(
    left: Box<dyn TermIterator>,
    right: Box<dyn TermIterator>,
) -> Box<dyn TermIterator> {
    if left.is_stop_word() {
        return right;
    }
    if right.is_stop_word() {
        return left;
    }
    Box::new(IntersectIterator {
        left,
        right,
        left_head: None,
        right_head: None,
    })
}

/// Classic merge over two sorted streams: advance the side with the
/// smaller head, emit on equal keys, exhaust when either side does.
struct IntersectIterator {
    left: Box<dyn TermIterator>,
    right: Box<dyn TermIterator>,
    left_head: Option<ScoredOccurrence>,
    right_head: Option<ScoredOccurrence>,
}

impl TermIterator for IntersectIterator {
    fn next(&mut self) -> Option<ScoredOccurrence> {
        loop {
            if self.left_head.is_none() {
                self.left_head = self.left.next();
            }
            if self.right_head.is_none() {
                self.right_head = self.right.next();
            }
            let order = match (&self.left_head, &self.right_head) {
                (Some(lhs), Some(rhs)) => lhs.occurrence.key().cmp(rhs.occurrence.key()),
                _ => return None,
            };
            match order {
                Ordering::Equal => {
                    if let (Some(lhs), Some(rhs)) = (self.left_head.take(), self.right_head.take())
                    {
                        return Some(merge_conjunction(lhs, rhs));
                    }
                }
                Ordering::Less => self.left_head = None,
                Ordering::Greater => self.right_head = None,
            }
        }
    }
}

fn merge_conjunction(lhs: ScoredOccurrence, rhs: ScoredOccurrence) -> ScoredOccurrence {
    let penalty = distance_penalty(&lhs.occurrence.occurrences, &rhs.occurrence.occurrences);
    let score = (lhs.score + rhs.score) / penalty;
    ScoredOccurrence {
        occurrence: lhs.occurrence.merge(rhs.occurrence),
        score,
    }
}

/// Minimal position gap between two ordered occurrence lists, walked in
/// lockstep advancing the side with the smaller position. Returns 1
/// when either list is empty, and never less than 1, so adjacent terms
/// leave the combined score unchanged while far-apart terms shrink it.
fn distance_penalty(a: &[FieldTermOccurrence], b: &[FieldTermOccurrence]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 1.0;
    }
    let (mut i, mut j) = (0, 0);
    let mut min = u32::MAX;
    while i < a.len() && j < b.len() {
        min = min.min(a[i].position.abs_diff(b[j].position));
        if a[i].position < b[j].position {
            i += 1;
        } else {
            j += 1;
        }
    }
    min.max(1) as f32
}
