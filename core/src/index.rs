use crate::document::{DocId, Document};
use crate::error::{Result, SiftError};
use crate::normalize::Normalizer;
use crate::round4;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Where a term occurs within one document. Term frequency is the number of positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    positions: Vec<u32>,
}

impl Posting {
    pub fn new(doc_id: DocId) -> Self {
        Self { doc_id, positions: Vec::new() }
    }

    pub fn append(&mut self, pos: u32) { self.positions.push(pos); }

    pub fn sort(&mut self) { self.positions.sort_unstable(); }

    pub fn positions(&self) -> &[u32] { &self.positions }

    pub fn term_freq(&self) -> usize { self.positions.len() }
}

/// A term and its postings, keyed by document ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexItem {
    term: String,
    postings: HashMap<DocId, Posting>,
    // doc IDs ascending; valid while `sorted` holds
    order: Vec<DocId>,
    sorted: bool,
}

impl IndexItem {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into(), postings: HashMap::new(), order: Vec::new(), sorted: true }
    }

    pub fn term(&self) -> &str { &self.term }

    /// Record an occurrence of the term at `pos` in `doc_id`, creating the posting on first sight.
    pub fn add(&mut self, doc_id: DocId, pos: u32) {
        match self.postings.get_mut(&doc_id) {
            Some(posting) => {
                if posting.positions.last().is_some_and(|&last| last > pos) {
                    self.sorted = false;
                }
                posting.append(pos);
            }
            None => {
                let mut posting = Posting::new(doc_id);
                posting.append(pos);
                self.postings.insert(doc_id, posting);
                if self.sorted && self.order.last().map_or(true, |&last| last < doc_id) {
                    self.order.push(doc_id);
                } else {
                    self.sorted = false;
                }
            }
        }
    }

    /// Sort every posting's positions and rebuild the doc-ID order. Idempotent.
    pub fn sort(&mut self) {
        for posting in self.postings.values_mut() {
            posting.sort();
        }
        self.order = self.postings.keys().copied().collect();
        self.order.sort_unstable();
        self.sorted = true;
    }

    pub fn is_sorted(&self) -> bool { self.sorted }

    /// Document IDs in ascending order. Borrowed when the item is sorted.
    pub fn doc_ids(&self) -> Cow<'_, [DocId]> {
        if self.sorted {
            Cow::Borrowed(&self.order)
        } else {
            let mut ids: Vec<DocId> = self.postings.keys().copied().collect();
            ids.sort_unstable();
            Cow::Owned(ids)
        }
    }

    /// Postings in ascending doc-ID order.
    pub fn sorted_postings(&self) -> Vec<&Posting> {
        self.doc_ids().iter().filter_map(|id| self.postings.get(id)).collect()
    }

    pub fn posting(&self, doc_id: DocId) -> Option<&Posting> { self.postings.get(&doc_id) }

    pub fn document_frequency(&self) -> usize { self.postings.len() }

    pub(crate) fn postings_map(&self) -> &HashMap<DocId, Posting> { &self.postings }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Append the author field to title and body before normalizing.
    pub include_author: bool,
}

/// Term -> postings mapping plus corpus statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    items: HashMap<String, IndexItem>,
    n_docs: u32,
    doc_ids: BTreeSet<DocId>,
    config: IndexConfig,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(config: IndexConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn config(&self) -> &IndexConfig { &self.config }

    /// Index one document. Call once per distinct document: indexing the same
    /// document twice duplicates its postings and counts it twice.
    pub fn index_document(&mut self, doc: &Document, normalizer: &Normalizer) {
        let text = doc.indexable_text(self.config.include_author);
        for (position, term) in normalizer.normalize(&text).into_iter().enumerate() {
            match self.items.get_mut(&term) {
                Some(item) => item.add(doc.id, position as u32),
                None => {
                    let mut item = IndexItem::new(term.clone());
                    item.add(doc.id, position as u32);
                    self.items.insert(term, item);
                }
            }
        }
        self.n_docs += 1;
        self.doc_ids.insert(doc.id);
    }

    /// Sort all postings lists by document ID and all positions ascending.
    pub fn sort(&mut self) {
        for item in self.items.values_mut() {
            item.sort();
        }
    }

    pub fn find(&self, term: &str) -> Result<&IndexItem> {
        self.items.get(term).ok_or_else(|| SiftError::TermNotFound(term.to_string()))
    }

    pub fn get(&self, term: &str) -> Option<&IndexItem> { self.items.get(term) }

    pub fn contains(&self, term: &str) -> bool { self.items.contains_key(term) }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.items.get(term).map_or(0, IndexItem::document_frequency)
    }

    /// `round(log10(N / df), 4)`; 0 for terms not in the index.
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.document_frequency(term);
        if df == 0 || self.n_docs == 0 {
            return 0.0;
        }
        round4((self.n_docs as f64 / df as f64).log10())
    }

    pub fn total_documents(&self) -> usize { self.n_docs as usize }

    pub fn term_count(&self) -> usize { self.items.len() }

    /// Distinct indexed document IDs, ascending.
    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ { self.doc_ids.iter().copied() }

    pub fn known_terms(&self) -> impl Iterator<Item = &str> + '_ { self.items.keys().map(String::as_str) }

    pub fn sorted_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.known_terms().collect();
        terms.sort_unstable();
        terms
    }

    pub fn is_sorted(&self) -> bool { self.items.values().all(IndexItem::is_sorted) }

    /// Write the human-readable inspection JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::persist::save_inspection(path.as_ref(), self)
    }

    /// Write the binary snapshot used for fast reload.
    pub fn store<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::persist::store_snapshot(path.as_ref(), self)
    }

    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::persist::load_snapshot(path.as_ref())
    }

    /// Structural checks run on every loaded snapshot.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if (self.doc_ids.len() as u64) > u64::from(self.n_docs) {
            return Err(format!("{} distinct documents but n_docs = {}", self.doc_ids.len(), self.n_docs));
        }
        for (term, item) in &self.items {
            if item.term != *term {
                return Err(format!("entry for {term:?} carries term {:?}", item.term));
            }
            if item.postings.is_empty() {
                return Err(format!("term {term:?} has no postings"));
            }
            for (doc_id, posting) in &item.postings {
                if posting.doc_id != *doc_id || posting.positions.is_empty() {
                    return Err(format!("malformed posting for {term:?} in document {doc_id}"));
                }
                if !self.doc_ids.contains(doc_id) {
                    return Err(format!("term {term:?} references unknown document {doc_id}"));
                }
            }
            if item.sorted && item.order.len() != item.postings.len() {
                return Err(format!("term {term:?} has a stale document order"));
            }
        }
        Ok(())
    }
}
