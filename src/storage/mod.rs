pub mod document;
pub mod store;

pub use document::{matches_prefix, Document, Hash};
pub use store::{DocumentStore, MutationEvent};
