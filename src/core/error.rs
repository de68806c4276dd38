use thiserror::Error;

/// Errors surfaced by the search core.
///
/// Background indexing never propagates errors into the write pipeline:
/// `Indexing` is logged at the point of failure and the offending
/// document is skipped. The remaining variants are returned to callers
/// of the engine API.
#[derive(Debug, Error)]
pub enum Error {
    #[error("index {0} not found")]
    NoSuchIndex(String),

    #[error("failed to parse query: {0}")]
    QueryParse(String),

    #[error("failed to index document {key}: {reason}")]
    Indexing { key: String, reason: String },

    #[error("index {0} has been deleted")]
    AlreadyDeleted(String),
}

impl Error {
    pub fn query_parse(context: impl Into<String>) -> Self {
        Error::QueryParse(context.into())
    }

    pub fn indexing(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Indexing {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
