use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{Result, TopicError};
use crate::vectorizer::token::tokenize;

/// Corpus frequency of keyword-defined topics.
///
/// Every keyword is counted per text with the vectorizer's tokenization,
/// capped at `max_count` per text when set, and summed over the corpus. A
/// topic's frequency is the mean of its keywords' totals.
///
/// # Arguments
/// * `texts` - the corpus
/// * `topics` - topic name to keyword list; output keeps this order
/// * `max_count` - per-text cap on each keyword's count
///
/// # Errors
/// `InvalidInput` for a topic without keywords.
pub fn keyword_topic_counts<'a, I>(
    texts: I,
    topics: &IndexMap<String, Vec<String>>,
    max_count: Option<u64>,
) -> Result<IndexMap<String, f64>>
where
    I: IntoIterator<Item = &'a str>,
{
    if let Some((name, _)) = topics.iter().find(|(_, words)| words.is_empty()) {
        return Err(TopicError::InvalidInput(format!("topic {name:?} has no keywords")));
    }

    let mut totals: HashMap<String, u64> = topics
        .values()
        .flatten()
        .map(|w| (w.to_lowercase(), 0))
        .collect();

    for text in texts {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut per_text: HashMap<&str, u64> = HashMap::new();
        for token in &tokens {
            if totals.contains_key(token) {
                *per_text.entry(token.as_str()).or_insert(0) += 1;
            }
        }
        for (word, &count) in &per_text {
            let capped = max_count.map_or(count, |cap| count.min(cap));
            if let Some(total) = totals.get_mut(*word) {
                *total += capped;
            }
        }
    }

    Ok(topics
        .iter()
        .map(|(name, words)| {
            let sum: u64 = words
                .iter()
                .map(|w| totals.get(&w.to_lowercase()).copied().unwrap_or(0))
                .sum();
            (name.clone(), sum as f64 / words.len() as f64)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics() -> IndexMap<String, Vec<String>> {
        let mut topics = IndexMap::new();
        topics.insert("energy".to_string(), vec!["solar".to_string(), "battery".to_string()]);
        topics.insert("cloud".to_string(), vec!["Server".to_string()]);
        topics
    }

    const TEXTS: [&str; 3] = [
        "solar solar solar battery",
        "server farm with a solar roof",
        "nothing relevant",
    ];

    #[test]
    fn averages_keyword_totals() {
        let counts = keyword_topic_counts(TEXTS, &topics(), None).unwrap();
        // solar 4, battery 1 -> 2.5; server 1
        assert_eq!(counts.get_index(0), Some((&"energy".to_string(), &2.5)));
        assert_eq!(counts["cloud"], 1.0);
    }

    #[test]
    fn caps_counts_per_text() {
        let counts = keyword_topic_counts(TEXTS, &topics(), Some(1)).unwrap();
        // solar min(3,1) + 1 = 2, battery 1 -> 1.5
        assert_eq!(counts["energy"], 1.5);
    }

    #[test]
    fn topic_without_keywords_is_rejected() {
        let mut topics = topics();
        topics.insert("empty".to_string(), Vec::new());
        assert!(keyword_topic_counts(TEXTS, &topics, None).is_err());
    }
}
