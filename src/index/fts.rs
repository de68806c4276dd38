use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::queue::SegQueue;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenKind;
use crate::core::error::{Error, Result};
use crate::index::posting::{DocTermOccurrence, FieldTermOccurrence};
use crate::index::trie::RuneTrie;
use crate::search::iter::{EmptyIterator, ReadIterator, StopWordIterator, TermIterator};
use crate::storage::{matches_prefix, Document};

/// State guarded by the index latch. All three members are updated
/// inside one exclusive section, so a reader observing a posting also
/// observes the matching df and docs_count contributions.
struct IndexState {
    trie: RuneTrie,
    df: HashMap<String, u64>,
    docs_count: u64,
}

impl IndexState {
    fn idf(&self, term: &str) -> f32 {
        let df = self.df.get(term).copied().unwrap_or(0);
        if df == 0 {
            return 0.0;
        }
        (1.0 + self.docs_count as f64 / df as f64).log2() as f32
    }
}

/// One user-declared full-text index.
///
/// Constructed in the creating phase: documents observed while the
/// initial bulk load runs are parked in `pending` and drained by
/// `load`. After the load flips `creating`, adds are processed inline
/// on the caller's thread.
pub struct FtsIndex {
    name: String,
    prefixes: Vec<String>,
    /// Sorted unique field names; a field's index is its position here.
    fields: Vec<String>,
    analyzer: Analyzer,
    state: RwLock<IndexState>,
    creating: AtomicBool,
    pending: SegQueue<Arc<Document>>,
    deleted: AtomicBool,
}

impl FtsIndex {
    pub fn new(name: impl Into<String>, prefixes: Vec<String>, mut fields: Vec<String>) -> Self {
        fields.sort();
        fields.dedup();
        FtsIndex {
            name: name.into(),
            prefixes,
            fields,
            analyzer: Analyzer::english(),
            state: RwLock::new(IndexState {
                trie: RuneTrie::new(),
                df: HashMap::new(),
                docs_count: 0,
            }),
            creating: AtomicBool::new(true),
            pending: SegQueue::new(),
            deleted: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_creating(&self) -> bool {
        self.creating.load(Ordering::Acquire)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    /// Halt all work on this index. In-flight loads observe the flag at
    /// the next document boundary and exit.
    pub fn mark_deleted(&self) {
        self.deleted.store(true, Ordering::Release);
    }

    pub fn docs_count(&self) -> u64 {
        self.state.read().docs_count
    }

    pub fn df(&self, term: &str) -> u64 {
        self.state.read().df.get(term).copied().unwrap_or(0)
    }

    /// Route one observed document into the index: dropped when the
    /// index is deleted or the key misses every prefix, parked while
    /// the bulk load runs, processed inline otherwise.
    pub fn add(&self, doc: &Arc<Document>) {
        if self.is_deleted() {
            return;
        }
        if !matches_prefix(&self.prefixes, &doc.key) {
            return;
        }
        if self.is_creating() {
            self.pending.push(Arc::clone(doc));
            return;
        }
        self.index_document(doc);
    }

    /// Bulk-load the store snapshot, then hand over to inline adds.
    ///
    /// The pending queue is drained twice, with the creating flag
    /// flipped in between: a document observed during the snapshot loop
    /// may be enqueued after the first drain finished but before the
    /// flip, and only the second drain picks it up.
    ///
    /// Deletion is observed at every document boundary; a halted load
    /// reports `AlreadyDeleted` so the caller can log and move on.
    ///
    /// A document saved after the index is registered but before the
    /// snapshot is taken arrives twice: once in the snapshot, once
    /// through the pending queue. The load cycle tracks the instances
    /// it has processed, so df and docs_count count each instance once.
    /// Distinct instances under the same key (an overwrite mid-load)
    /// are both counted, like any other overwrite.
    pub fn load(&self, snapshot: Vec<Arc<Document>>) -> Result<()> {
        // Keyed by instance identity; the map retains each Arc so a
        // processed instance cannot be freed and its address reused
        // within the cycle.
        let mut seen: HashMap<*const Document, Arc<Document>> = HashMap::new();
        for doc in snapshot {
            self.checkpoint()?;
            if matches_prefix(&self.prefixes, &doc.key) && first_sighting(&mut seen, &doc) {
                self.index_document(&doc);
            }
        }
        self.drain_pending(&mut seen)?;
        self.creating.store(false, Ordering::Release);
        self.drain_pending(&mut seen)
    }

    fn drain_pending(&self, seen: &mut HashMap<*const Document, Arc<Document>>) -> Result<()> {
        loop {
            self.checkpoint()?;
            match self.pending.pop() {
                Some(doc) => {
                    if first_sighting(seen, &doc) {
                        self.index_document(&doc);
                    }
                }
                None => return Ok(()),
            }
        }
    }

    fn checkpoint(&self) -> Result<()> {
        if self.is_deleted() {
            return Err(Error::AlreadyDeleted(self.name.clone()));
        }
        Ok(())
    }

    /// Look up the canonical form of `word`. Query-side stop words
    /// become the transparent StopWord iterator; unknown terms are
    /// empty. The posting list and idf are snapshotted under the read
    /// latch, so the returned iterator never observes later writes.
    pub fn read(&self, word: &str) -> Box<dyn TermIterator> {
        let Some(term) = self.analyzer.normalize(word) else {
            return Box::new(StopWordIterator);
        };
        let state = self.state.read();
        let postings = match state.trie.get(&term) {
            Some(postings) if !postings.is_empty() => postings.to_vec(),
            _ => return Box::new(EmptyIterator),
        };
        let idf = state.idf(&term);
        drop(state);
        ReadIterator::boxed(postings, idf)
    }

    /// Visit every (term, posting list) pair under the read latch.
    pub fn walk_terms(&self, visit: &mut impl FnMut(&str, &[DocTermOccurrence])) {
        self.state.read().trie.walk(visit);
    }

    fn index_document(&self, doc: &Arc<Document>) {
        if let Err(err) = self.process(doc) {
            warn!(key = %doc.key, error = %err, "skipping document");
        }
    }

    fn process(&self, doc: &Arc<Document>) -> Result<()> {
        debug!(index = %self.name, key = %doc.key, "adding document to index");

        let mut occurrences: HashMap<String, DocTermOccurrence> = HashMap::new();
        // Token ordinal across all fields; not reset per field.
        let mut position = 0u32;

        for (field, value) in &doc.hash {
            let Ok(field_index) = self.fields.binary_search(field) else {
                continue;
            };
            let text = std::str::from_utf8(value).map_err(|err| {
                Error::indexing(&doc.key, format!("field {field} is not valid utf-8: {err}"))
            })?;

            for token in self.analyzer.tokenize(text) {
                if token.kind != TokenKind::Word {
                    continue;
                }
                if let Some(term) = self.analyzer.normalize(&token.text) {
                    let occurrence = occurrences
                        .entry(term)
                        .or_insert_with(|| DocTermOccurrence::new(doc));
                    occurrence.fields.insert(field_index as u32);
                    occurrence.occurrences.push(FieldTermOccurrence {
                        field_index,
                        byte_offset: token.offset,
                        byte_length: token.length,
                        position,
                    });
                }
                // Stop words produce no term but still advance the
                // ordinal, preserving proximity gaps around them.
                position += 1;
            }
        }

        let term_count = position;

        let mut state = self.state.write();
        state.docs_count += 1;
        for (term, mut occurrence) in occurrences {
            occurrence.tf = occurrence.occurrences.len() as f32 / term_count as f32;
            state.trie.add(&term, occurrence);
            *state.df.entry(term).or_insert(0) += 1;
        }
        Ok(())
    }
}

fn first_sighting(
    seen: &mut HashMap<*const Document, Arc<Document>>,
    doc: &Arc<Document>,
) -> bool {
    seen.insert(Arc::as_ptr(doc), Arc::clone(doc)).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Hash;

    fn doc(key: &str, pairs: &[(&str, &str)]) -> Arc<Document> {
        let hash: Hash = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect();
        Arc::new(Document::new(key, hash))
    }

    fn ready_index(prefixes: &[&str], fields: &[&str]) -> FtsIndex {
        let index = FtsIndex::new(
            "idx",
            prefixes.iter().map(|p| p.to_string()).collect(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        index.load(Vec::new()).unwrap();
        index
    }

    fn postings(index: &FtsIndex, term: &str) -> Vec<DocTermOccurrence> {
        let state = index.state.read();
        state.trie.get(term).map(|p| p.to_vec()).unwrap_or_default()
    }

    #[test]
    fn test_fields_are_sorted_and_deduped() {
        let index = ready_index(&["*"], &["title", "body", "title"]);
        assert_eq!(index.fields(), ["body", "title"]);
    }

    #[test]
    fn test_term_frequency_over_all_fields() {
        let index = ready_index(&["*"], &["title", "body"]);
        index.add(&doc(
            "a",
            &[("title", "spider man returns"), ("body", "peter")],
        ));

        let spider = postings(&index, "spider");
        assert_eq!(spider.len(), 1);
        assert_eq!(spider[0].tf, 0.25);

        assert_eq!(index.docs_count(), 1);
        assert_eq!(index.df("spider"), 1);
        assert_eq!(index.df("peter"), 1);
    }

    #[test]
    fn test_stop_words_advance_positions_but_produce_no_term() {
        let index = ready_index(&["*"], &["title"]);
        index.add(&doc("y", &[("title", "spider and man")]));

        assert_eq!(index.df("and"), 0);

        let spider = postings(&index, "spider");
        let man = postings(&index, "man");
        assert_eq!(spider[0].occurrences[0].position, 0);
        assert_eq!(man[0].occurrences[0].position, 2);
        // The dropped stop word still counts toward the term total.
        assert_eq!(spider[0].tf, 1.0 / 3.0);
    }

    #[test]
    fn test_stemmed_terms_share_a_posting() {
        let index = ready_index(&["*"], &["body"]);
        index.add(&doc("a", &[("body", "bite bites biting")]));

        let bite = postings(&index, "bite");
        assert_eq!(bite.len(), 1);
        assert_eq!(bite[0].occurrences.len(), 3);
        assert_eq!(bite[0].tf, 1.0);
    }

    #[test]
    fn test_field_bitmap_and_offsets() {
        let index = ready_index(&["*"], &["title", "body"]);
        index.add(&doc("a", &[("title", "web spider"), ("body", "spider")]));

        let spider = postings(&index, "spider");
        // Sorted field list is [body, title].
        assert!(spider[0].fields.contains(0));
        assert!(spider[0].fields.contains(1));

        let title_occ = spider[0]
            .occurrences
            .iter()
            .find(|o| o.field_index == 1)
            .unwrap();
        assert_eq!(title_occ.byte_offset, 4);
        assert_eq!(title_occ.byte_length, 6);
    }

    #[test]
    fn test_prefix_mismatch_and_unknown_fields_are_skipped() {
        let index = ready_index(&["article:"], &["title"]);

        index.add(&doc("user:1", &[("title", "spider")]));
        assert_eq!(index.docs_count(), 0);

        index.add(&doc("article:1", &[("title", "spider"), ("author", "peter")]));
        assert_eq!(index.docs_count(), 1);
        assert_eq!(index.df("spider"), 1);
        assert_eq!(index.df("peter"), 0);
    }

    #[test]
    fn test_invalid_utf8_skips_the_document() {
        let index = ready_index(&["*"], &["title"]);
        let mut hash = Hash::new();
        hash.insert("title".to_string(), vec![0xff, 0xfe]);
        index.add(&Arc::new(Document::new("bad", hash)));

        assert_eq!(index.docs_count(), 0);
    }

    #[test]
    fn test_overwrite_replaces_posting_for_same_key() {
        let index = ready_index(&["*"], &["title"]);
        index.add(&doc("k", &[("title", "spider")]));
        index.add(&doc("k", &[("title", "spider spider")]));

        let spider = postings(&index, "spider");
        assert_eq!(spider.len(), 1);
        assert_eq!(spider[0].occurrences.len(), 2);
        // df drifts upward on overwrite; it never decrements.
        assert_eq!(index.df("spider"), 2);
    }

    #[test]
    fn test_adds_are_parked_while_creating() {
        let index = FtsIndex::new("idx", vec!["*".to_string()], vec!["title".to_string()]);
        index.add(&doc("a", &[("title", "spider")]));

        assert!(index.is_creating());
        assert_eq!(index.docs_count(), 0);
        assert_eq!(index.pending.len(), 1);

        index.load(vec![doc("b", &[("title", "web")])]).unwrap();

        assert!(!index.is_creating());
        assert_eq!(index.docs_count(), 2);
        assert_eq!(index.df("spider"), 1);
        assert_eq!(index.df("web"), 1);
    }

    #[test]
    fn test_load_drains_documents_enqueued_mid_load() {
        let index = FtsIndex::new("idx", vec!["*".to_string()], vec!["title".to_string()]);
        // Simulates an observer racing the flag flip: the document sits
        // in the queue when the first drain is already past.
        index.pending.push(doc("late", &[("title", "spider")]));
        index.load(Vec::new()).unwrap();

        assert_eq!(index.df("spider"), 1);
    }

    #[test]
    fn test_instance_in_both_snapshot_and_pending_counts_once() {
        let index = FtsIndex::new("idx", vec!["*".to_string()], vec!["title".to_string()]);
        // A document saved between index registration and the snapshot
        // shows up in both: the observer parked it, and the store hands
        // it back in the snapshot.
        let racer = doc("racer", &[("title", "spider")]);
        index.pending.push(Arc::clone(&racer));
        index.load(vec![racer]).unwrap();

        assert_eq!(index.docs_count(), 1);
        assert_eq!(index.df("spider"), 1);
        assert_eq!(postings(&index, "spider").len(), 1);
    }

    #[test]
    fn test_overwrite_mid_load_counts_both_instances() {
        let index = FtsIndex::new("idx", vec!["*".to_string()], vec!["title".to_string()]);
        // Same key, distinct instances: a real overwrite during the
        // load, not a snapshot/pending duplicate.
        let old = doc("k", &[("title", "spider")]);
        index.pending.push(doc("k", &[("title", "spider spider")]));
        index.load(vec![old]).unwrap();

        let spider = postings(&index, "spider");
        assert_eq!(spider.len(), 1);
        assert_eq!(spider[0].occurrences.len(), 2);
        // Usual overwrite drift: both instances counted.
        assert_eq!(index.docs_count(), 2);
        assert_eq!(index.df("spider"), 2);
    }

    #[test]
    fn test_deleted_index_drops_adds_and_halts_load() {
        let index = FtsIndex::new("idx", vec!["*".to_string()], vec!["title".to_string()]);
        index.mark_deleted();

        index.add(&doc("a", &[("title", "spider")]));
        assert_eq!(index.pending.len(), 0);

        let halted = index.load(vec![doc("b", &[("title", "web")])]);
        assert!(matches!(halted, Err(Error::AlreadyDeleted(_))));
        assert_eq!(index.docs_count(), 0);
        // Load exited before the flip.
        assert!(index.is_creating());
    }

    #[test]
    fn test_read_classifies_terms() {
        let index = ready_index(&["*"], &["title"]);
        index.add(&doc("a", &[("title", "spider")]));

        assert!(index.read("the").is_stop_word());

        let mut missing = index.read("unknown");
        assert!(!missing.is_stop_word());
        assert!(missing.next().is_none());

        let mut hit = index.read("Spider");
        let scored = hit.next().unwrap();
        assert_eq!(scored.occurrence.key(), "a");
        assert!(scored.score > 0.0);
        assert!(hit.next().is_none());
    }

    #[test]
    fn test_read_snapshots_postings_and_idf() {
        let index = ready_index(&["*"], &["title"]);
        index.add(&doc("a", &[("title", "spider")]));

        let mut iter = index.read("spider");
        // Writes after Read() are not visible to the snapshot.
        index.add(&doc("b", &[("title", "spider")]));

        assert_eq!(iter.next().unwrap().occurrence.key(), "a");
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_walk_terms() {
        let index = ready_index(&["*"], &["title"]);
        index.add(&doc("a", &[("title", "spider web")]));

        let mut terms = Vec::new();
        index.walk_terms(&mut |term, _| terms.push(term.to_string()));
        terms.sort();
        assert_eq!(terms, vec!["spider", "web"]);
    }
}
