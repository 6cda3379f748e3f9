use crate::spelling::SpellingCorrector;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Spell-correct tokens against the index vocabulary (query side only).
    pub spelling: bool,
    pub max_edit_distance: usize,
    /// Tokens shorter than this are never corrected.
    pub min_correction_len: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self { spelling: false, max_edit_distance: 2, min_correction_len: 4 }
    }
}

impl NormalizerConfig {
    /// Defaults for query processing: spelling correction on.
    pub fn query() -> Self {
        Self { spelling: true, ..Self::default() }
    }
}

/// Text to term-sequence pipeline: NFKC, lowercase, tokenize, (spell-correct), drop stopwords, stem.
///
/// Built once per process and shared by reference; indexing and querying must
/// use the same stopword list and stemmer or lookups will miss.
pub struct Normalizer {
    stemmer: Stemmer,
    stopwords: HashSet<String>,
    corrector: Option<SpellingCorrector>,
    min_correction_len: usize,
}

impl Default for Normalizer {
    fn default() -> Self { Self::new() }
}

impl Normalizer {
    /// Document-side normalizer with the built-in English stopword list.
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            stopwords: STOPWORDS.iter().map(|s| s.to_string()).collect(),
            corrector: None,
            min_correction_len: NormalizerConfig::default().min_correction_len,
        }
    }

    /// Query-side normalizer. With `config.spelling` set, unknown tokens are
    /// corrected against `vocabulary` before stopword removal and stemming.
    pub fn for_queries<I, S>(config: &NormalizerConfig, vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut n = Self::new();
        n.min_correction_len = config.min_correction_len;
        if config.spelling {
            n.corrector = Some(SpellingCorrector::new(vocabulary, config.max_edit_distance));
        }
        n
    }

    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn spelling_enabled(&self) -> bool { self.corrector.is_some() }

    pub fn is_stopword(&self, token: &str) -> bool { self.stopwords.contains(token) }

    pub fn stem(&self, token: &str) -> String { self.stemmer.stem(token).into_owned() }

    /// Normalize `text` into an ordered term sequence. A term's position is its
    /// index in the returned vector.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut terms = Vec::new();
        for mat in RE.find_iter(&normalized) {
            let token = mat.as_str();
            if let Some(fixed) = self.correct(token) {
                terms.push(fixed);
                continue;
            }
            if self.is_stopword(token) { continue; }
            terms.push(self.stem(token));
        }
        terms
    }

    // Corrections come from the (already stemmed) vocabulary and skip the stemmer.
    fn correct(&self, token: &str) -> Option<String> {
        let corrector = self.corrector.as_ref()?;
        if token.chars().count() < self.min_correction_len || self.is_stopword(token) {
            return None;
        }
        let stem = self.stem(token);
        if corrector.is_known(&stem) {
            return None;
        }
        let fixed = corrector.suggest(token).or_else(|| corrector.suggest(&stem))?;
        tracing::debug!(token, correction = fixed.as_str(), "spelling correction");
        Some(fixed)
    }
}
