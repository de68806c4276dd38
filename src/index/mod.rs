pub mod definition;
pub mod fts;
pub mod posting;
pub mod trie;

pub use definition::{FieldKind, FieldSpec, IndexDefinition};
pub use fts::FtsIndex;
pub use posting::{DocTermOccurrence, FieldTermOccurrence};
