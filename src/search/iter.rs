use crate::index::posting::DocTermOccurrence;

/// One posting emitted by an iterator together with its score.
#[derive(Debug, Clone)]
pub struct ScoredOccurrence {
    pub occurrence: DocTermOccurrence,
    pub score: f32,
}

/// Stream of scored postings in ascending document-key order.
///
/// Every implementation yields non-tombstoned postings with strictly
/// ascending keys; the set operators rely on that invariant. Iterators
/// are fused: once `next` returns `None` it keeps returning `None`.
pub trait TermIterator: Send {
    fn next(&mut self) -> Option<ScoredOccurrence>;

    /// Structural marker for query-side stop words. Operators treat a
    /// stop-word operand as transparent instead of pulling from it.
    fn is_stop_word(&self) -> bool {
        false
    }
}

/// Yields nothing.
pub struct EmptyIterator;

impl TermIterator for EmptyIterator {
    fn next(&mut self) -> Option<ScoredOccurrence> {
        None
    }
}

/// Yields nothing, but short-circuits the set operators: intersection
/// and union with a stop word return the other operand, and Top-N over
/// a stop word is empty.
pub struct StopWordIterator;

impl TermIterator for StopWordIterator {
    fn next(&mut self) -> Option<ScoredOccurrence> {
        None
    }

    fn is_stop_word(&self) -> bool {
        true
    }
}

/// Iterator over one term's posting list snapshot.
///
/// Postings of tombstoned documents are skipped. The idf is fixed at
/// construction; each emitted score is `tf * idf`.
pub struct ReadIterator {
    postings: Vec<DocTermOccurrence>,
    cursor: usize,
    idf: f32,
}

impl ReadIterator {
    pub fn new(postings: Vec<DocTermOccurrence>, idf: f32) -> Self {
        ReadIterator {
            postings,
            cursor: 0,
            idf,
        }
    }

    pub fn boxed(postings: Vec<DocTermOccurrence>, idf: f32) -> Box<dyn TermIterator> {
        Box::new(ReadIterator::new(postings, idf))
    }
}

impl TermIterator for ReadIterator {
    fn next(&mut self) -> Option<ScoredOccurrence> {
        while self.cursor < self.postings.len() {
            let occurrence = &self.postings[self.cursor];
            self.cursor += 1;
            if occurrence.doc.is_deleted() {
                continue;
            }
            return Some(ScoredOccurrence {
                score: occurrence.tf * self.idf,
                occurrence: occurrence.clone(),
            });
        }
        None
    }
}
