pub mod keywords;
pub mod render;
pub mod trend;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TopicError};
use crate::utils::sort::{first_argmax, order_by_count_desc, top_n_ascending};
use crate::vectorizer::vocab::Vocabulary;

/// One topic in a count ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTopic {
    /// column of the word-topic matrix
    pub topic: usize,
    /// documents assigned to the topic
    pub count: usize,
    /// representative terms, lowest weight first
    pub terms: Vec<String>,
}

fn check_vocabulary(word_topic: &Array2<f64>, vocabulary: &Vocabulary) -> Result<()> {
    if word_topic.nrows() != vocabulary.len() {
        return Err(TopicError::InvalidInput(format!(
            "word-topic matrix has {} rows for {} vocabulary terms",
            word_topic.nrows(),
            vocabulary.len()
        )));
    }
    Ok(())
}

/// Top `n` terms of every topic with their weights.
///
/// Per topic column, the `n` highest-weighted rows in ascending weight order,
/// i.e. the tail of a stable ascending argsort. Fewer than `n` when V < n.
pub fn top_weighted_terms(
    word_topic: &Array2<f64>,
    vocabulary: &Vocabulary,
    n: usize,
) -> Result<Vec<Vec<(String, f64)>>> {
    check_vocabulary(word_topic, vocabulary)?;
    Ok(word_topic
        .columns()
        .into_iter()
        .map(|column| {
            let weights = column.to_vec();
            top_n_ascending(&weights, n)
                .into_iter()
                .map(|row| (vocabulary[row].to_string(), weights[row]))
                .collect()
        })
        .collect())
}

/// Top `n` terms of every topic, lowest weight of the top first.
///
/// # Errors
/// `InvalidInput` when the matrix rows do not match the vocabulary.
pub fn top_terms_per_topic(
    word_topic: &Array2<f64>,
    vocabulary: &Vocabulary,
    n: usize,
) -> Result<Vec<Vec<String>>> {
    Ok(top_weighted_terms(word_topic, vocabulary, n)?
        .into_iter()
        .map(|terms| terms.into_iter().map(|(term, _)| term).collect())
        .collect())
}

/// Topic of every document: the first maximal entry of its column.
pub fn document_topics(topic_document: &Array2<f64>) -> Vec<usize> {
    topic_document
        .columns()
        .into_iter()
        .filter_map(|column| first_argmax(column.iter().copied()))
        .collect()
}

/// Number of documents assigned to each topic. Sums to D.
pub fn document_counts_per_topic(topic_document: &Array2<f64>) -> Vec<usize> {
    let mut counts = vec![0; topic_document.nrows()];
    for topic in document_topics(topic_document) {
        counts[topic] += 1;
    }
    counts
}

/// Topics by descending document count, ties in topic order.
///
/// `top_n` keeps only the first topics when set and positive.
pub fn rank_topics(
    topic_terms: &[Vec<String>],
    topic_counts: &[usize],
    top_n: Option<usize>,
) -> Result<Vec<RankedTopic>> {
    if topic_terms.len() != topic_counts.len() {
        return Err(TopicError::InvalidInput(format!(
            "{} term lists for {} topic counts",
            topic_terms.len(),
            topic_counts.len()
        )));
    }
    let mut order = order_by_count_desc(topic_counts);
    if let Some(n) = top_n.filter(|&n| n > 0) {
        order.truncate(n);
    }
    Ok(order
        .into_iter()
        .map(|topic| RankedTopic {
            topic,
            count: topic_counts[topic],
            terms: topic_terms[topic].clone(),
        })
        .collect())
}
