use crate::vectorizer::{stats::TermStats, token::TermFrequency};

/// Weighting strategy plugged into [`TfIdfVectorizer`](crate::TfIdfVectorizer).
///
/// The engine only weights; column normalization is done by the vectorizer.
pub trait TfIdfEngine {
    /// Stable tag, part of the cache fingerprint
    const NAME: &'static str;

    /// Term-frequency part of the weight of `term` in one document
    ///
    /// # Arguments
    /// * `freq` - term counts of the document
    /// * `term` - vocabulary term
    fn tf(freq: &TermFrequency, term: &str) -> f64;

    /// Inverse document frequency of `term`
    ///
    /// # Arguments
    /// * `stats` - corpus-wide statistics
    /// * `term` - vocabulary term
    fn idf(stats: &TermStats, term: &str) -> f64;

    /// IDF for every vocabulary term, in vocabulary order
    fn idf_vec(stats: &TermStats, vocabulary: &[String]) -> Vec<f64> {
        vocabulary.iter().map(|t| Self::idf(stats, t)).collect()
    }
}

/// Default engine: raw counts and smoothed IDF
/// `ln((1 + D) / (1 + df)) + 1`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTfIdfEngine;

impl TfIdfEngine for DefaultTfIdfEngine {
    const NAME: &'static str = "default";

    #[inline]
    fn tf(freq: &TermFrequency, term: &str) -> f64 {
        freq.term_count(term) as f64
    }

    #[inline]
    fn idf(stats: &TermStats, term: &str) -> f64 {
        let doc_num = stats.doc_num() as f64;
        let doc_freq = stats.doc_freq(term) as f64;
        ((1.0 + doc_num) / (1.0 + doc_freq)).ln() + 1.0
    }
}

/// Same IDF as the default engine, with a damped term frequency `1 + ln(tf)`
#[derive(Debug, Clone, Copy, Default)]
pub struct SublinearTfIdfEngine;

impl TfIdfEngine for SublinearTfIdfEngine {
    const NAME: &'static str = "sublinear";

    #[inline]
    fn tf(freq: &TermFrequency, term: &str) -> f64 {
        match freq.term_count(term) {
            0 => 0.0,
            count => 1.0 + (count as f64).ln(),
        }
    }

    #[inline]
    fn idf(stats: &TermStats, term: &str) -> f64 {
        DefaultTfIdfEngine::idf(stats, term)
    }
}
