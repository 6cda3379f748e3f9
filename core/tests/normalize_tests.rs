use sift_core::{Normalizer, NormalizerConfig};

#[test]
fn it_normalizes_and_stems() {
    let words = Normalizer::new().normalize("Running Runners RUN! The café's menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // Unicode normalization keeps the accent but folds case
    assert!(words.iter().any(|w| w.starts_with("caf")));
    assert!(words.iter().all(|w| w.chars().all(|c| !c.is_uppercase())));
}

#[test]
fn it_filters_stopwords() {
    let words = Normalizer::new().normalize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words.len(), 5);
}

#[test]
fn query_and_document_sides_agree_without_typos() {
    let docs = Normalizer::new();
    let vocab = docs.normalize("experimental investigation of slipstream downwash");
    let queries = Normalizer::for_queries(&NormalizerConfig::query(), vocab.clone());
    assert_eq!(queries.normalize("Experimental investigation of the slipstream downwash"), vocab);
}

#[test]
fn short_tokens_are_never_corrected() {
    let config = NormalizerConfig { min_correction_len: 5, ..NormalizerConfig::query() };
    let q = Normalizer::for_queries(&config, ["wing"]);
    assert_eq!(q.normalize("wimg"), vec!["wimg".to_string()]);
}
