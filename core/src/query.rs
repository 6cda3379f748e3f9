use crate::boolean;
use crate::document::{Collection, DocId};
use crate::error::Result;
use crate::index::InvertedIndex;
use crate::normalize::{Normalizer, NormalizerConfig};
use crate::vector::{self, ScoredDoc, VectorOptions};
use std::path::Path;
use std::sync::Arc;

/// A raw query and the term sequence it normalized to. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedQuery {
    raw: String,
    terms: Vec<String>,
}

impl ProcessedQuery {
    pub fn raw(&self) -> &str { &self.raw }

    /// Normalized terms in query order, duplicates kept.
    pub fn terms(&self) -> &[String] { &self.terms }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
}

/// Answers Boolean and vector queries against a loaded index.
///
/// Loading the snapshot dominates the cost of a query run; open one processor
/// per process and reuse it. Clones share the index, so a clone per thread is
/// the intended way to query concurrently.
#[derive(Clone)]
pub struct QueryProcessor {
    index: Arc<InvertedIndex>,
    docs: Arc<Collection>,
    normalizer: Arc<Normalizer>,
    options: VectorOptions,
}

impl QueryProcessor {
    /// Load the snapshot at `index_path` and build a vocabulary-aware query normalizer.
    pub fn open<P: AsRef<Path>>(index_path: P, collection: Arc<Collection>, config: &NormalizerConfig) -> Result<Self> {
        let index = InvertedIndex::load_snapshot(index_path)?;
        Ok(Self::new(Arc::new(index), collection, config))
    }

    pub fn new(index: Arc<InvertedIndex>, collection: Arc<Collection>, config: &NormalizerConfig) -> Self {
        let normalizer = Normalizer::for_queries(config, index.known_terms());
        Self { index, docs: collection, normalizer: Arc::new(normalizer), options: VectorOptions::default() }
    }

    pub fn with_vector_options(mut self, options: VectorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn collection(&self) -> &Collection { &self.docs }

    /// Normalize `raw` the way documents were normalized, plus spelling correction if configured.
    pub fn process(&self, raw: &str) -> ProcessedQuery {
        let terms = self.normalizer.normalize(raw);
        tracing::debug!(query = raw, ?terms, "processed query");
        ProcessedQuery { raw: raw.to_string(), terms }
    }

    /// Documents containing every query term, ascending by ID.
    pub fn boolean(&self, query: &ProcessedQuery) -> Vec<DocId> {
        boolean::conjunctive(&self.index, &query.terms)
    }

    /// Exactly `k` documents ranked by cosine similarity; fails if `k` exceeds the corpus size.
    pub fn vector(&self, query: &ProcessedQuery, k: usize) -> Result<Vec<ScoredDoc>> {
        vector::rank(&self.index, &query.terms, k, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    fn processor(config: &NormalizerConfig) -> QueryProcessor {
        let docs: Collection = [
            Document::new(1, "Bifurcation of flows", "", "a study of bifurcation"),
            Document::new(2, "Wing flutter", "", "flutter of swept wings"),
            Document::new(3, "Shock waves", "", "shock wave interaction with wings"),
        ]
        .into_iter()
        .collect();
        let n = Normalizer::new();
        let mut idx = InvertedIndex::new();
        for d in docs.iter() {
            idx.index_document(d, &n);
        }
        idx.sort();
        QueryProcessor::new(Arc::new(idx), Arc::new(docs), config)
    }

    #[test]
    fn process_keeps_duplicates_and_drops_stopwords() {
        let qp = processor(&NormalizerConfig::default());
        let q = qp.process("the wings of the wing");
        assert_eq!(q.terms(), &["wing".to_string(), "wing".to_string()]);
        assert_eq!(q.raw(), "the wings of the wing");
        assert!(qp.process("the of").is_empty());
    }

    #[test]
    fn boolean_and_vector_share_processing() {
        let qp = processor(&NormalizerConfig::default());
        let q = qp.process("wing shock");
        assert_eq!(qp.boolean(&q), vec![3]);
        let ranked = qp.vector(&q, 3).unwrap();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].doc_id, 3);
        assert_eq!(qp.collection().find(ranked[0].doc_id).unwrap().title, "Shock waves");
    }

    #[test]
    fn spelling_correction_rescues_typos() {
        let plain = processor(&NormalizerConfig::default());
        assert!(plain.boolean(&plain.process("fluttr")).is_empty());

        let spelled = processor(&NormalizerConfig::query());
        assert_eq!(spelled.boolean(&spelled.process("fluttr")), vec![2]);
    }
}
