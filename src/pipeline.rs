//! End-to-end runs: corpus → cached TF-IDF → cached factorization → reports.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::analyze::{
    document_counts_per_topic, keywords::keyword_topic_counts, rank_topics, top_terms_per_topic,
    trend::topic_counts_by_period, RankedTopic,
};
use crate::cache::{factorize_cached, vectorize_cached, vectorize_cached_with};
use crate::config::{PipelineConfig, ReportConfig};
use crate::corpus::{
    loader::load_corpus_cached,
    metadata::{Granularity, Metadata},
    Corpus,
};
use crate::error::Result;
use crate::factorize::{Factorization, Method};
use crate::vectorizer::tfidf::SublinearTfIdfEngine;
use crate::vectorizer::WeightedMatrix;

/// TF-IDF matrix and its factorization
#[derive(Debug, Clone, PartialEq)]
pub struct TopicModel {
    pub method: Method,
    pub tfidf: WeightedMatrix,
    pub factorization: Factorization,
}

/// Machine-readable summary of a topic model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicReport {
    pub method: Method,
    pub n_topics: usize,
    pub documents: usize,
    pub vocabulary_size: usize,
    /// most populated topics first
    pub topics: Vec<RankedTopic>,
}

/// Topic counts per period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub granularity: Granularity,
    pub topic_terms: Vec<Vec<String>>,
    pub periods: BTreeMap<String, Vec<usize>>,
    /// documents without a known period
    pub undated: usize,
}

/// Corpus of `paths.txt_dir`, cached as `dataset.csv` under the cache root
pub fn load_corpus(config: &PipelineConfig) -> Result<Corpus> {
    load_corpus_cached(&config.paths.txt_dir, &config.cache.root)
}

/// Vectorize and factorize `corpus`, reusing cache entries when present
pub fn run_lsa(corpus: &Corpus, config: &PipelineConfig) -> Result<TopicModel> {
    let stop_words = config.tfidf.stop_word_set();
    let (vocab_size, stop_words) = (config.tfidf.vocab_size, stop_words.as_ref());
    let (root, policy) = (&config.cache.root, config.cache.key_policy);
    let tfidf = if config.tfidf.sublinear_tf {
        vectorize_cached_with::<SublinearTfIdfEngine>(corpus, vocab_size, stop_words, root, policy)?
    } else {
        vectorize_cached(corpus, vocab_size, stop_words, root, policy)?
    };
    let params = config.lsa.params();
    let factorization = factorize_cached(&tfidf.matrix, &params, root, policy)?;
    info!(
        method = %params.method,
        n_topics = factorization.n_topics(),
        documents = tfidf.matrix.cols(),
        "topic model ready"
    );
    Ok(TopicModel {
        method: params.method,
        tfidf,
        factorization,
    })
}

impl TopicModel {
    pub fn topic_terms(&self, n: usize) -> Result<Vec<Vec<String>>> {
        top_terms_per_topic(&self.factorization.word_topic, &self.tfidf.vocabulary, n)
    }

    pub fn report(&self, config: &ReportConfig) -> Result<TopicReport> {
        let terms = self.topic_terms(config.top_terms)?;
        let counts = document_counts_per_topic(&self.factorization.topic_document);
        Ok(TopicReport {
            method: self.method,
            n_topics: self.factorization.n_topics(),
            documents: self.tfidf.matrix.cols(),
            vocabulary_size: self.tfidf.vocabulary.len(),
            topics: rank_topics(&terms, &counts, config.top_topics)?,
        })
    }

    /// Topic prevalence per period; `corpus` must be the one the model was built from
    pub fn trend(&self, corpus: &Corpus, metadata: &Metadata, config: &ReportConfig) -> Result<TrendReport> {
        let labels = metadata.periods(corpus, config.granularity);
        let undated = labels.iter().filter(|p| p.is_none()).count();
        Ok(TrendReport {
            granularity: config.granularity,
            topic_terms: self.topic_terms(config.top_terms)?,
            periods: topic_counts_by_period(&self.factorization.topic_document, &labels)?,
            undated,
        })
    }
}

/// Keyword topic frequencies of `corpus` as configured in `[keywords]`
pub fn keyword_counts(corpus: &Corpus, config: &PipelineConfig) -> Result<indexmap::IndexMap<String, f64>> {
    keyword_topic_counts(corpus.texts(), &config.keywords.topics, config.keywords.max_count)
}
