pub mod stats;
pub mod tfidf;
pub mod token;
pub mod vocab;

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::corpus::Corpus;
use crate::error::{Result, TopicError};
use crate::utils::math::{vector::normalize_l2, SparseMatrix};
use crate::vectorizer::{
    stats::TermStats,
    tfidf::{DefaultTfIdfEngine, TfIdfEngine},
    token::TermFrequency,
    vocab::Vocabulary,
};

/// Output of the vectorizer: the V × D word-document matrix and the
/// vocabulary labelling its rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedMatrix {
    pub matrix: SparseMatrix,
    pub vocabulary: Vocabulary,
}

impl WeightedMatrix {
    /// (vocabulary size, document count)
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }
}

/// TF-IDF vectorizer
///
/// Turns a [`Corpus`] into a sparse word-by-document matrix. The vocabulary is
/// the `vocab_size` most frequent terms of the corpus (stop words excluded);
/// rows follow the lexicographic order of the vocabulary, columns follow corpus
/// order, and every non-empty column has unit L2 norm.
///
/// `TfIdfVectorizer<E>` is generic over its weighting engine `E`;
/// [`DefaultTfIdfEngine`] uses raw counts and smoothed IDF.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer<E = DefaultTfIdfEngine>
where
    E: TfIdfEngine,
{
    vocab_size: usize,
    stop_words: HashSet<String>,
    _marker: PhantomData<E>,
}

impl<E> TfIdfVectorizer<E>
where
    E: TfIdfEngine,
{
    /// Create a vectorizer keeping at most `vocab_size` terms
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            stop_words: HashSet::new(),
            _marker: PhantomData,
        }
    }

    /// Exclude these words from the vocabulary (compared in lowercase)
    pub fn with_stop_words<I, S>(mut self, stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words
            .extend(stop_words.into_iter().map(|s| s.as_ref().to_lowercase()));
        self
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn stop_words(&self) -> &HashSet<String> {
        &self.stop_words
    }

    /// Build the vocabulary from `corpus` and weight every document.
    ///
    /// # Errors
    /// `InvalidInput` for an empty corpus, a zero `vocab_size`, or a corpus in
    /// which no token survives tokenization and stop-word removal.
    pub fn fit_transform(&self, corpus: &Corpus) -> Result<WeightedMatrix> {
        if corpus.is_empty() {
            return Err(TopicError::InvalidInput("corpus is empty".into()));
        }
        if self.vocab_size == 0 {
            return Err(TopicError::InvalidInput("vocabulary size must be at least 1".into()));
        }
        let start = Instant::now();
        info!(documents = corpus.len(), vocab_size = self.vocab_size, "computing TF-IDF");

        let freqs: Vec<TermFrequency> = corpus
            .texts()
            .map(|text| TermFrequency::from_text(text, &self.stop_words))
            .collect();

        let mut stats = TermStats::new();
        for freq in &freqs {
            stats.add_doc(freq);
        }

        let terms = stats.top_terms(self.vocab_size);
        if terms.is_empty() {
            return Err(TopicError::InvalidInput(
                "empty vocabulary: no document contains a qualifying term".into(),
            ));
        }
        debug!(distinct_terms = stats.term_num(), kept = terms.len(), "vocabulary selected");

        let idf = E::idf_vec(&stats, &terms);
        let row_of: HashMap<&str, usize> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let mut empty_docs = 0usize;
        let columns: Vec<Vec<(usize, f64)>> = freqs
            .iter()
            .map(|freq| {
                let mut column: Vec<(usize, f64)> = freq
                    .term_set()
                    .filter_map(|term| {
                        row_of
                            .get(term)
                            .map(|&row| (row, E::tf(freq, term) * idf[row]))
                    })
                    .collect();
                let mut weights: Vec<f64> = column.iter().map(|&(_, w)| w).collect();
                if normalize_l2(&mut weights) == 0.0 {
                    empty_docs += 1;
                }
                column
                    .iter_mut()
                    .zip(weights)
                    .for_each(|(entry, w)| entry.1 = w);
                column
            })
            .collect();

        let matrix = SparseMatrix::from_columns(terms.len(), columns);
        info!(
            rows = matrix.rows(),
            cols = matrix.cols(),
            nnz = matrix.nnz(),
            empty_docs,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "TF-IDF done"
        );
        Ok(WeightedMatrix {
            matrix,
            vocabulary: Vocabulary::new(terms),
        })
    }
}

/// Weighted word-document matrix of `corpus` with the default engine.
///
/// # Arguments
/// * `corpus` - documents, one matrix column each
/// * `vocab_size` - maximum number of vocabulary terms
/// * `stop_words` - optional set of words to exclude
pub fn compute_weighted_matrix(
    corpus: &Corpus,
    vocab_size: usize,
    stop_words: Option<&HashSet<String>>,
) -> Result<WeightedMatrix> {
    compute_weighted_matrix_with::<DefaultTfIdfEngine>(corpus, vocab_size, stop_words)
}

/// [`compute_weighted_matrix`] with an explicit weighting engine
pub fn compute_weighted_matrix_with<E: TfIdfEngine>(
    corpus: &Corpus,
    vocab_size: usize,
    stop_words: Option<&HashSet<String>>,
) -> Result<WeightedMatrix> {
    let vectorizer = TfIdfVectorizer::<E>::new(vocab_size);
    let vectorizer = match stop_words {
        Some(words) => vectorizer.with_stop_words(words),
        None => vectorizer,
    };
    vectorizer.fit_transform(corpus)
}
