use std::sync::Arc;

use roaring::RoaringBitmap;

use crate::storage::Document;

/// One occurrence of a term inside one field of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTermOccurrence {
    /// Position of the field in the index's sorted field list.
    pub field_index: usize,
    /// Start offset of the original token within the field value.
    pub byte_offset: usize,
    /// Byte length of the original token.
    pub byte_length: usize,
    /// Token ordinal counted across all fields of the document.
    pub position: u32,
}

/// One posting: a (term, document) record.
///
/// The document is owned by the document store; the posting holds a
/// shared reference that keeps tombstoned instances alive until the
/// last posting referencing them is dropped.
#[derive(Debug, Clone)]
pub struct DocTermOccurrence {
    pub doc: Arc<Document>,
    /// Term frequency: occurrences of this term / total terms in doc.
    pub tf: f32,
    /// Bitmap of field indexes in which the term appears.
    pub fields: RoaringBitmap,
    /// Ordered by position: strictly increasing for a single-term
    /// posting, non-decreasing after operator merges.
    pub occurrences: Vec<FieldTermOccurrence>,
}

impl DocTermOccurrence {
    pub fn new(doc: &Arc<Document>) -> Self {
        DocTermOccurrence {
            doc: Arc::clone(doc),
            tf: 0.0,
            fields: RoaringBitmap::new(),
            occurrences: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.doc.key
    }

    /// Merge two postings for the same document key, as produced by the
    /// set operators: field bitmaps are OR-ed and the occurrence lists
    /// are combined in position order, so a merged posting feeds the
    /// proximity walk of an enclosing intersection sorted input. The
    /// stable sort keeps left-operand occurrences ahead of the right's
    /// on equal positions. The merged posting carries no term frequency
    /// of its own.
    pub fn merge(mut self, other: DocTermOccurrence) -> DocTermOccurrence {
        self.fields |= &other.fields;
        self.occurrences.extend(other.occurrences);
        self.occurrences.sort_by_key(|o| o.position);
        self.tf = 0.0;
        self
    }
}
