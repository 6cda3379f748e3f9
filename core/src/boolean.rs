//! Conjunctive retrieval over sorted postings lists.

use crate::document::DocId;
use crate::index::InvertedIndex;
use std::cmp::Ordering;

/// Two-pointer merge of two ascending ID lists.
pub fn intersect(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Implicit AND across `terms`. Empty when the query is empty or any term is unknown.
/// The result is ascending by document ID.
pub fn conjunctive(index: &InvertedIndex, terms: &[String]) -> Vec<DocId> {
    let mut lists = Vec::with_capacity(terms.len());
    for term in terms {
        match index.get(term) {
            Some(item) => lists.push(item.doc_ids()),
            None => {
                tracing::debug!(term = term.as_str(), "boolean query term not indexed");
                return Vec::new();
            }
        }
    }
    if lists.len() <= 1 {
        return lists.pop().map(|ids| ids.into_owned()).unwrap_or_default();
    }

    // Start from the rarest term so intermediate results stay small.
    lists.sort_by_key(|ids| ids.len());
    let mut result = lists[0].to_vec();
    for ids in &lists[1..] {
        result = intersect(&result, ids);
        if result.is_empty() {
            break;
        }
    }
    result
}
