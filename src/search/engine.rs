use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use crate::core::error::{Error, Result};
use crate::index::definition::{FieldKind, IndexDefinition};
use crate::index::fts::FtsIndex;
use crate::query::ast::QueryAst;
use crate::query::compiler::compile;
use crate::search::iter::TermIterator;
use crate::search::topn::{top_n, Limit};
use crate::storage::{Document, DocumentStore};

/// One ranked search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub doc: Arc<Document>,
    pub score: f32,
}

/// Ranked results of one query. Yields distinct documents; the caller
/// may stop early.
pub struct SearchResults {
    iter: Box<dyn TermIterator>,
}

impl Iterator for SearchResults {
    type Item = SearchHit;

    fn next(&mut self) -> Option<SearchHit> {
        self.iter.next().map(|scored| SearchHit {
            doc: Arc::clone(&scored.occurrence.doc),
            score: scored.score,
        })
    }
}

/// Registry of full-text indexes over one document store.
///
/// The engine subscribes to the store's save stream and fans every
/// saved document out to all registered indexes, in the order the store
/// applied the mutations. Deletions are not routed anywhere: the
/// tombstone on the document instance is what hides its postings, and a
/// future compaction pass is the only consumer a delete stream would
/// have.
pub struct Engine {
    store: Arc<DocumentStore>,
    indexes: Arc<RwLock<HashMap<String, Arc<FtsIndex>>>>,
}

impl Engine {
    pub fn new(store: Arc<DocumentStore>) -> Engine {
        let indexes: Arc<RwLock<HashMap<String, Arc<FtsIndex>>>> =
            Arc::new(RwLock::new(HashMap::new()));

        let registry = Arc::clone(&indexes);
        store.on_save(move |doc| {
            for index in registry.read().values() {
                index.add(doc);
            }
        });
        store.on_delete(|doc| {
            trace!(key = %doc.key, "tombstoned; postings are filtered at read time");
        });

        Engine { store, indexes }
    }

    /// Register an index and start filling it in the background from a
    /// snapshot of the store. Creation is synchronous, the fill is not;
    /// queries are answerable immediately and grow complete as the load
    /// drains.
    pub fn create_index(&self, definition: IndexDefinition) {
        let IndexDefinition {
            name,
            prefixes,
            schema,
        } = definition;

        let mut fields = Vec::new();
        for spec in schema {
            if spec.kind == FieldKind::Text {
                fields.push(spec.name);
            } else {
                warn!(field = %spec.name, kind = ?spec.kind, "skipping non-text schema field");
            }
        }

        let index = Arc::new(FtsIndex::new(name.clone(), prefixes, fields));
        if let Some(displaced) = self
            .indexes
            .write()
            .insert(name.clone(), Arc::clone(&index))
        {
            displaced.mark_deleted();
        }
        info!(index = %name, "created index");

        let store = Arc::clone(&self.store);
        thread::spawn(move || {
            let snapshot = store.get_all(index.prefixes());
            match index.load(snapshot) {
                Ok(()) => info!(index = %name, "index creation finished"),
                Err(err) => debug!(index = %name, error = %err, "bulk load halted"),
            }
        });
    }

    /// Unregister the index and halt its in-flight work.
    pub fn delete_index(&self, name: &str) -> Result<()> {
        match self.indexes.write().remove(name) {
            Some(index) => {
                index.mark_deleted();
                info!(index = %name, "deleted index");
                Ok(())
            }
            None => Err(Error::NoSuchIndex(name.to_string())),
        }
    }

    pub fn get_index(&self, name: &str) -> Option<Arc<FtsIndex>> {
        self.indexes.read().get(name).cloned()
    }

    /// Execute a query tree against a named index. Without a limit the
    /// whole ranking is returned.
    pub fn search(
        &self,
        index_name: &str,
        query: &QueryAst,
        limit: Option<Limit>,
    ) -> Result<SearchResults> {
        let index = self
            .get_index(index_name)
            .ok_or_else(|| Error::NoSuchIndex(index_name.to_string()))?;

        let iter = compile(&index, query)?;
        let iter = match limit {
            Some(limit) => top_n(limit.offset, limit.num, iter),
            None => top_n(0, usize::MAX, iter),
        };
        Ok(SearchResults { iter })
    }
}
