//! Vocabulary-aware spelling correction for query terms.

use std::cmp::min;
use std::collections::{BTreeMap, HashSet};

/// Corrects a token to the closest term of a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct SpellingCorrector {
    known: HashSet<String>,
    // char length -> terms of that length, sorted
    by_len: BTreeMap<usize, Vec<String>>,
    max_distance: usize,
}

impl SpellingCorrector {
    pub fn new<I, S>(vocabulary: I, max_distance: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let known: HashSet<String> = vocabulary.into_iter().map(Into::into).collect();
        let mut by_len: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for term in &known {
            by_len.entry(term.chars().count()).or_default().push(term.clone());
        }
        for terms in by_len.values_mut() {
            terms.sort();
        }
        Self { known, by_len, max_distance }
    }

    pub fn is_known(&self, term: &str) -> bool { self.known.contains(term) }

    /// Closest known term within the edit-distance bound. Ties go to the
    /// lexicographically smallest term. Known words are returned unchanged.
    pub fn suggest(&self, word: &str) -> Option<String> {
        if self.is_known(word) {
            return Some(word.to_string());
        }
        let len = word.chars().count();
        let lo = len.saturating_sub(self.max_distance);
        let hi = len + self.max_distance;

        let mut best: Option<(usize, &String)> = None;
        for terms in self.by_len.range(lo..=hi).map(|(_, v)| v) {
            for term in terms {
                let Some(d) = levenshtein_within(word, term, self.max_distance) else { continue };
                best = match best {
                    Some((bd, bt)) if bd < d || (bd == d && bt <= term) => Some((bd, bt)),
                    _ => Some((d, term)),
                };
            }
        }
        best.map(|(_, t)| t.clone())
    }
}

/// Levenshtein distance, or `None` once it is certain to exceed `threshold`.
#[allow(clippy::needless_range_loop)]
pub fn levenshtein_within(s1: &str, s2: &str, threshold: usize) -> Option<usize> {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    if a.len().abs_diff(b.len()) > threshold {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        let d = a.len().max(b.len());
        return (d <= threshold).then_some(d);
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        let mut row_min = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = min(min(prev[j] + 1, curr[j - 1] + 1), prev[j - 1] + cost);
            row_min = min(row_min, curr[j]);
        }
        if row_min > threshold {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let d = prev[b.len()];
    (d <= threshold).then_some(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein_within("kitten", "sitting", 3), Some(3));
        assert_eq!(levenshtein_within("kitten", "sitting", 2), None);
        assert_eq!(levenshtein_within("", "ab", 2), Some(2));
        assert_eq!(levenshtein_within("same", "same", 0), Some(0));
    }

    #[test]
    fn suggest_prefers_smaller_distance_then_lexicographic() {
        let c = SpellingCorrector::new(["wing", "wind", "wink", "winged"], 2);
        assert_eq!(c.suggest("wing").as_deref(), Some("wing"));
        // "winf" is one edit from wind, wing and wink
        assert_eq!(c.suggest("winf").as_deref(), Some("wind"));
        assert_eq!(c.suggest("wingedd").as_deref(), Some("winged"));
        assert_eq!(c.suggest("zzzzzz"), None);
    }
}
