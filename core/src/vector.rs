//! tf-idf vector space ranking with cosine similarity.

use crate::document::DocId;
use crate::error::{Result, SiftError};
use crate::index::InvertedIndex;
use crate::round4;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VectorOptions {
    /// Round document tf weights to four decimals like query weights.
    /// Off by default: query weights are rounded, document weights are not.
    pub round_document_weights: bool,
}

/// Log-dampened term frequency, `log10(tf + 1)`.
pub fn tf_weight(tf: usize) -> f64 {
    ((tf + 1) as f64).log10()
}

/// `a·b / (|a| |b|)`, with zero-norm vectors scoring 0 instead of NaN.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (mut ab, mut aa, mut bb) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        ab += x * y;
        aa += x * x;
        bb += y * y;
    }
    let score = ab / (aa * bb).sqrt();
    if score.is_nan() { 0.0 } else { score }
}

/// Top-`k` documents for `terms` by cosine similarity, always exactly `k` long
/// when `k` does not exceed the number of indexed documents.
///
/// Ties are broken by ascending document ID. Slots not filled by matching
/// documents are padded with the lowest remaining document IDs at score 0.
pub fn rank(index: &InvertedIndex, terms: &[String], k: usize, options: VectorOptions) -> Result<Vec<ScoredDoc>> {
    let total = index.total_documents();
    if k > total {
        return Err(SiftError::KTooLarge { k, total });
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for term in terms {
        *counts.entry(term.as_str()).or_insert(0) += 1;
    }
    let weighted: Vec<(&str, usize, f64)> = counts
        .into_iter()
        .map(|(term, count)| (term, count, index.idf(term)))
        .filter(|&(_, _, idf)| idf != 0.0)
        .collect();
    if weighted.is_empty() {
        tracing::warn!(terms = terms.len(), "no weighted query terms, falling back to document order");
        return Ok(pad(index, Vec::new(), k));
    }

    let idfs: Vec<f64> = weighted.iter().map(|&(_, _, idf)| idf).collect();
    let query: Vec<f64> = weighted
        .iter()
        .map(|&(_, count, idf)| round4(tf_weight(count)) * idf)
        .collect();

    let mut doc_tfs: BTreeMap<DocId, Vec<f64>> = BTreeMap::new();
    for (i, &(term, _, _)) in weighted.iter().enumerate() {
        let Some(item) = index.get(term) else { continue };
        for posting in item.sorted_postings() {
            let mut w = tf_weight(posting.term_freq());
            if options.round_document_weights {
                w = round4(w);
            }
            doc_tfs.entry(posting.doc_id).or_insert_with(|| vec![0.0; weighted.len()])[i] = w;
        }
    }
    tracing::debug!(terms = weighted.len(), candidates = doc_tfs.len(), "scoring candidates");

    let mut scored: Vec<ScoredDoc> = doc_tfs
        .into_iter()
        .map(|(doc_id, tfs)| {
            let doc: Vec<f64> = tfs.iter().zip(&idfs).map(|(tf, idf)| tf * idf).collect();
            ScoredDoc { doc_id, score: cosine_similarity(&query, &doc) }
        })
        .filter(|s| s.score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
    scored.truncate(k);
    Ok(pad(index, scored, k))
}

fn pad(index: &InvertedIndex, mut ranked: Vec<ScoredDoc>, k: usize) -> Vec<ScoredDoc> {
    if ranked.len() >= k {
        return ranked;
    }
    let taken: HashSet<DocId> = ranked.iter().map(|s| s.doc_id).collect();
    let fill: Vec<ScoredDoc> = index
        .doc_ids()
        .filter(|id| !taken.contains(id))
        .take(k - ranked.len())
        .map(|doc_id| ScoredDoc { doc_id, score: 0.0 })
        .collect();
    ranked.extend(fill);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, Normalizer};

    fn index(docs: &[(DocId, &str)]) -> InvertedIndex {
        let n = Normalizer::new();
        let mut idx = InvertedIndex::new();
        for (id, body) in docs {
            idx.index_document(&Document::new(*id, "", "", *body), &n);
        }
        idx.sort();
        idx
    }

    fn terms(ts: &[&str]) -> Vec<String> {
        ts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn tf_weight_is_log_dampened() {
        assert_eq!(tf_weight(0), 0.0);
        assert!((tf_weight(9) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_term_pads_with_lowest_ids() {
        let idx = index(&[(1, "wing"), (2, "shock"), (3, "flutter"), (4, "flutter"), (5, "wave")]);
        let got = rank(&idx, &terms(&["flutter"]), 4, VectorOptions::default()).unwrap();
        let ids: Vec<DocId> = got.iter().map(|s| s.doc_id).collect();
        assert_eq!(ids, vec![3, 4, 1, 2]);
        assert!((got[0].score - 1.0).abs() < 1e-12);
        assert!((got[1].score - 1.0).abs() < 1e-12);
        assert_eq!(got[2].score, 0.0);
        assert_eq!(got[3].score, 0.0);
    }

    #[test]
    fn higher_overlap_ranks_first() {
        let idx = index(&[
            (1, "wing flutter"),
            (2, "wing"),
            (3, "shock"),
            (4, "flutter"),
        ]);
        let got = rank(&idx, &terms(&["wing", "flutter"]), 3, VectorOptions::default()).unwrap();
        assert_eq!(got[0].doc_id, 1);
        assert!(got[0].score > got[1].score);
        // 2 and 4 each match one of two equally weighted terms: tie, broken by ID
        assert_eq!(got[1].doc_id, 2);
        assert_eq!(got[2].doc_id, 4);
        assert_eq!(got[1].score, got[2].score);
    }

    #[test]
    fn degenerate_queries_fall_back() {
        let idx = index(&[(7, "wing"), (3, "shock"), (5, "wave")]);
        for q in [terms(&[]), terms(&["dog", "cat"])] {
            let got = rank(&idx, &q, 2, VectorOptions::default()).unwrap();
            assert_eq!(got, vec![ScoredDoc { doc_id: 3, score: 0.0 }, ScoredDoc { doc_id: 5, score: 0.0 }]);
        }
    }

    #[test]
    fn terms_in_every_document_carry_no_weight() {
        let idx = index(&[(1, "wing"), (2, "wing shock")]);
        let got = rank(&idx, &terms(&["wing"]), 2, VectorOptions::default()).unwrap();
        assert_eq!(got.iter().map(|s| s.doc_id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(got.iter().all(|s| s.score == 0.0));
    }

    #[test]
    fn k_too_large_is_an_error() {
        let idx = index(&[(1, "wing"), (2, "shock")]);
        let err = rank(&idx, &terms(&["wing"]), 3, VectorOptions::default()).unwrap_err();
        assert!(matches!(err, SiftError::KTooLarge { k: 3, total: 2 }));
        assert!(rank(&idx, &terms(&["wing"]), 0, VectorOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn document_weight_rounding_option() {
        let idx = index(&[(1, "wing flutter flutter"), (2, "shock"), (3, "wave")]);
        let q = terms(&["wing", "flutter"]);
        let raw = rank(&idx, &q, 1, VectorOptions::default()).unwrap();
        let rounded = rank(&idx, &q, 1, VectorOptions { round_document_weights: true }).unwrap();
        assert_eq!(raw[0].doc_id, 1);
        assert_eq!(rounded[0].doc_id, 1);
        assert!((raw[0].score - rounded[0].score).abs() < 1e-3);
    }
}
