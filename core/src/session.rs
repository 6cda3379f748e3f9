use crate::document::{Collection, DocId};
use crate::error::{Result, SiftError};
use crate::normalize::NormalizerConfig;
use crate::query::{ProcessedQuery, QueryProcessor};
use crate::vector::ScoredDoc;
use std::path::Path;
use std::sync::Arc;

/// A processor plus a "current query": unloaded until `load_query`, the only mutator.
///
/// Each session owns its query state; sessions built from clones of one
/// processor share only the read-only index.
#[derive(Clone)]
pub struct QuerySession {
    processor: QueryProcessor,
    current: Option<ProcessedQuery>,
}

impl QuerySession {
    /// An empty or absent `query` leaves the session unloaded.
    pub fn new(processor: QueryProcessor, query: Option<&str>) -> Self {
        let mut session = Self { processor, current: None };
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            session.load_query(q);
        }
        session
    }

    pub fn open<P: AsRef<Path>>(
        query: Option<&str>,
        index_path: P,
        collection: Arc<Collection>,
        config: &NormalizerConfig,
    ) -> Result<Self> {
        let processor = QueryProcessor::open(index_path, collection, config)?;
        Ok(Self::new(processor, query))
    }

    pub fn load_query(&mut self, text: &str) -> &ProcessedQuery {
        let query = self.processor.process(text);
        self.current.insert(query)
    }

    pub fn is_loaded(&self) -> bool { self.current.is_some() }

    pub fn current(&self) -> Option<&ProcessedQuery> { self.current.as_ref() }

    pub fn processor(&self) -> &QueryProcessor { &self.processor }

    pub fn boolean_query(&self) -> Result<Vec<DocId>> {
        let q = self.current().ok_or(SiftError::QueryNotLoaded)?;
        Ok(self.processor.boolean(q))
    }

    pub fn vector_query(&self, k: usize) -> Result<Vec<ScoredDoc>> {
        let q = self.current().ok_or(SiftError::QueryNotLoaded)?;
        self.processor.vector(q, k)
    }
}
