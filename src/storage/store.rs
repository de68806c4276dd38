use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::storage::document::{matches_prefix, Document, Hash};

/// Abstract mutation applied by the replication pipeline.
#[derive(Debug, Clone)]
pub enum MutationEvent {
    Put { key: String, hash: Hash },
    Delete { keys: Vec<String> },
    Rename { from: String, to: String },
}

type Observer = Box<dyn Fn(&Arc<Document>) + Send + Sync>;

/// Current hash per key, shared between the replication pipeline and
/// the search engine.
///
/// Save and Delete are serialized with respect to each other and with
/// respect to `get_all` (the snapshot used by index bulk loads).
/// Observers fire synchronously inside that critical section, so the
/// indexer sees mutations in replication order.
#[derive(Default)]
pub struct DocumentStore {
    docs: RwLock<HashMap<String, Arc<Document>>>,
    save_observers: RwLock<Vec<Observer>>,
    delete_observers: RwLock<Vec<Observer>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        DocumentStore::default()
    }

    pub fn on_save(&self, observer: impl Fn(&Arc<Document>) + Send + Sync + 'static) {
        self.save_observers.write().push(Box::new(observer));
    }

    pub fn on_delete(&self, observer: impl Fn(&Arc<Document>) + Send + Sync + 'static) {
        self.delete_observers.write().push(Box::new(observer));
    }

    pub fn apply(&self, event: MutationEvent) {
        match event {
            MutationEvent::Put { key, hash } => self.save(key, hash),
            MutationEvent::Delete { keys } => self.delete(&keys),
            MutationEvent::Rename { from, to } => self.rename(&from, to),
        }
    }

    /// Store a new document instance under `key`, tombstoning any
    /// previous instance.
    pub fn save(&self, key: String, hash: Hash) {
        let doc = Arc::new(Document::new(key.clone(), hash));
        let mut docs = self.docs.write();
        if let Some(old) = docs.insert(key, Arc::clone(&doc)) {
            old.mark_deleted();
        }
        self.notify(&self.save_observers, &doc);
    }

    pub fn delete(&self, keys: &[String]) {
        let mut docs = self.docs.write();
        for key in keys {
            if let Some(old) = docs.remove(key) {
                old.mark_deleted();
                self.notify(&self.delete_observers, &old);
            }
        }
    }

    /// Rename re-keys the record as a fresh document instance: the old
    /// instance is tombstoned (postings referencing it go dark) and the
    /// new instance is announced to save observers for re-indexing.
    pub fn rename(&self, from: &str, to: String) {
        let mut docs = self.docs.write();
        let Some(old) = docs.remove(from) else {
            debug!(key = from, "rename of a missing key ignored");
            return;
        };
        old.mark_deleted();
        let doc = Arc::new(Document::new(to.clone(), old.hash.clone()));
        if let Some(displaced) = docs.insert(to, Arc::clone(&doc)) {
            displaced.mark_deleted();
        }
        self.notify(&self.delete_observers, &old);
        self.notify(&self.save_observers, &doc);
    }

    pub fn get(&self, key: &str) -> Option<Arc<Document>> {
        self.docs.read().get(key).cloned()
    }

    /// Snapshot of all live documents matching any of `prefixes`.
    pub fn get_all(&self, prefixes: &[String]) -> Vec<Arc<Document>> {
        self.docs
            .read()
            .values()
            .filter(|doc| matches_prefix(prefixes, &doc.key))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn notify(&self, observers: &RwLock<Vec<Observer>>, doc: &Arc<Document>) {
        for observer in observers.read().iter() {
            observer(doc);
        }
    }
}
