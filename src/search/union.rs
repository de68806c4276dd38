use std::cmp::Ordering;

use crate::search::iter::{ScoredOccurrence, TermIterator};

/// Disjunction of two sorted streams, producing each distinct key once.
///
/// A stop-word operand is transparent: the other operand is returned
/// unchanged.
pub fn union(left: Box<dyn TermIterator>, right: Box<dyn TermIterator>) -> Box<dyn TermIterator> {
    if left.is_stop_word() {
        return right;
    }
    if right.is_stop_word() {
        return left;
    }
    Box::new(UnionIterator {
        left,
        right,
        left_head: None,
        right_head: None,
    })
}

/// Sorted merge: the smaller head is emitted and the larger stays
/// buffered for the next call; equal heads merge into one posting with
/// summed scores. When one side exhausts, the other drains verbatim.
struct UnionIterator {
    left: Box<dyn TermIterator>,
    right: Box<dyn TermIterator>,
    left_head: Option<ScoredOccurrence>,
    right_head: Option<ScoredOccurrence>,
}

impl TermIterator for UnionIterator {
    fn next(&mut self) -> Option<ScoredOccurrence> {
        if self.left_head.is_none() {
            self.left_head = self.left.next();
        }
        if self.right_head.is_none() {
            self.right_head = self.right.next();
        }
        let order = match (&self.left_head, &self.right_head) {
            (None, None) => return None,
            (Some(_), None) => return self.left_head.take(),
            (None, Some(_)) => return self.right_head.take(),
            (Some(lhs), Some(rhs)) => lhs.occurrence.key().cmp(rhs.occurrence.key()),
        };
        match order {
            Ordering::Equal => match (self.left_head.take(), self.right_head.take()) {
                (Some(lhs), Some(rhs)) => Some(merge_disjunction(lhs, rhs)),
                _ => None,
            },
            Ordering::Less => self.left_head.take(),
            Ordering::Greater => self.right_head.take(),
        }
    }
}

fn merge_disjunction(lhs: ScoredOccurrence, rhs: ScoredOccurrence) -> ScoredOccurrence {
    ScoredOccurrence {
        score: lhs.score + rhs.score,
        occurrence: lhs.occurrence.merge(rhs.occurrence),
    }
}
