//! Full-text search core for a read-only replica of a primary
//! key-value store.
//!
//! The replication pipeline applies mutations to a [`DocumentStore`];
//! an [`Engine`] observes the save stream and maintains any number of
//! user-declared full-text indexes over hash records whose keys match
//! configured prefixes. Queries arrive as a small algebraic AST (or as
//! query text via [`query::parser::parse`]), compile into a tree of
//! sorted posting iterators, and come back ranked by tf-idf with a
//! proximity penalty on conjunctions.

pub mod analysis;
pub mod core;
pub mod index;
pub mod query;
pub mod search;
pub mod storage;

pub use crate::core::error::{Error, Result};
pub use crate::index::{FieldKind, FieldSpec, FtsIndex, IndexDefinition};
pub use crate::query::QueryAst;
pub use crate::search::{Engine, Limit, SearchHit, SearchResults};
pub use crate::storage::{Document, DocumentStore, Hash, MutationEvent};
