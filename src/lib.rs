//! Topic modeling engine for patent text corpora:
//! TF-IDF vectorization, SVD / NMF factorization and a load-or-compute cache.

pub mod analyze;
pub mod cache;
pub mod clean;
pub mod config;
pub mod corpus;
pub mod error;
pub mod factorize;
pub mod pipeline;
pub mod utils;
pub mod vectorizer;

/// Crate error type and result alias
pub use error::{Result, TopicError};

/// Ordered collection of (id, text) documents.
/// The position of a document is its column in every derived matrix.
pub use corpus::Corpus;

/// TF-IDF Vectorizer
/// Builds the sparse V × D word-document matrix and its vocabulary.
///
/// `TfIdfVectorizer<E>` is generic over its weighting engine:
/// - `E`: TF-IDF calculation engine type (e.g., `DefaultTfIdfEngine`)
///
/// # Serialization
/// The output [`WeightedMatrix`] is serializable and is what the cache stores.
pub use vectorizer::{compute_weighted_matrix, compute_weighted_matrix_with, TfIdfVectorizer, WeightedMatrix};

/// TF-IDF Engine trait and its implementations
/// - `DefaultTfIdfEngine`: raw counts, smoothed IDF
/// - `SublinearTfIdfEngine`: `1 + ln(tf)`, smoothed IDF
pub use vectorizer::tfidf::{DefaultTfIdfEngine, SublinearTfIdfEngine, TfIdfEngine};

/// Per-document term counts
pub use vectorizer::token::TermFrequency;

/// Row labels of the word-document and word-topic matrices
pub use vectorizer::vocab::Vocabulary;

/// Sparse column-compressed matrix
pub use utils::math::SparseMatrix;

/// Topic factorization
/// - `factorize`: one-shot SVD / NMF reduction to K topics
/// - `FactorizeParams`: builder-style parameters
/// - `Method`: closed set of methods, parsed from `"SVD"` / `"NMF"`
pub use factorize::{factorize, Factorization, FactorizeParams, Method};

/// Load-or-compute cache
pub use cache::{factorize_cached, vectorize_cached, vectorize_cached_with, with_cache, KeyPolicy};

/// Topic analysis and rendering
pub use analyze::{
    document_counts_per_topic, rank_topics,
    render::{rank_and_render, TextBarChart, TopicRenderer},
    top_terms_per_topic, RankedTopic,
};

/// Batch text cleaning
pub use clean::{batch_clean, CleanContext};

/// TOML pipeline configuration
pub use config::PipelineConfig;
