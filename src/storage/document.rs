use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Field name to field value mapping of one hash record.
pub type Hash = HashMap<String, Vec<u8>>;

/// One mirrored record.
///
/// A document instance is immutable once stored: overwriting a key
/// tombstones the old instance and creates a new one. Postings keep
/// `Arc` references to the instance they were built from, so a
/// tombstoned document stays alive until the last posting referencing
/// it is dropped, and read iterators skip it in the meantime.
#[derive(Debug)]
pub struct Document {
    pub key: String,
    pub hash: Hash,
    deleted: AtomicBool,
}

impl Document {
    pub fn new(key: impl Into<String>, hash: Hash) -> Self {
        Document {
            key: key.into(),
            hash,
            deleted: AtomicBool::new(false),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    /// Tombstone the instance. Never reverts.
    pub fn mark_deleted(&self) {
        self.deleted.store(true, Ordering::Release);
    }
}

/// A key is eligible iff it equals or begins with some prefix, or the
/// set contains the wildcard `*`.
pub fn matches_prefix(prefixes: &[String], key: &str) -> bool {
    prefixes
        .iter()
        .any(|prefix| prefix == "*" || key.starts_with(prefix.as_str()))
}
