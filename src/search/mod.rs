pub mod engine;
pub mod intersect;
pub mod iter;
pub mod topn;
pub mod union;

pub use engine::{Engine, SearchHit, SearchResults};
pub use intersect::intersect;
pub use iter::{EmptyIterator, ReadIterator, ScoredOccurrence, StopWordIterator, TermIterator};
pub use topn::{top_n, Limit};
pub use union::union;
