//! Batch-built inverted index with Boolean and tf-idf vector retrieval.
//!
//! An [`InvertedIndex`] is populated once per corpus snapshot, sorted, and
//! persisted. A [`QueryProcessor`] loads the snapshot once and answers any
//! number of queries against it; [`QuerySession`] wraps a processor with the
//! "current query" state for callers that want it.

pub mod boolean;
pub mod document;
pub mod error;
pub mod index;
pub mod normalize;
pub mod persist;
pub mod query;
pub mod session;
pub mod spelling;
pub mod vector;

pub use document::{Collection, DocId, Document};
pub use error::{Result, SiftError};
pub use index::{IndexConfig, IndexItem, InvertedIndex, Posting};
pub use normalize::{Normalizer, NormalizerConfig};
pub use query::{ProcessedQuery, QueryProcessor};
pub use session::QuerySession;
pub use vector::{ScoredDoc, VectorOptions};

/// Round to four decimal places, the precision used for idf and query weights.
pub(crate) fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
