use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Shortest token the tokenizer keeps, in characters
pub const MIN_TOKEN_CHARS: usize = 2;

/// Split `text` into lowercase word tokens.
///
/// A token is a maximal run of alphanumeric characters or `_` that is at least
/// [`MIN_TOKEN_CHARS`] characters long.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|tok| tok.chars().nth(MIN_TOKEN_CHARS - 1).is_some())
        .map(str::to_lowercase)
}

/// TermFrequency struct
/// Counts how often each term occurs in one document.
///
/// # Examples
/// ```
/// use patent_topics::TermFrequency;
/// let mut term_freq = TermFrequency::new();
/// term_freq.add_term("term1");
/// term_freq.add_term("term2");
/// term_freq.add_term("term1");
///
/// assert_eq!(term_freq.term_count("term1"), 2);
/// assert_eq!(term_freq.term_sum(), 3);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TermFrequency {
    term_count: IndexMap<String, u64>,
    total_term_count: u64,
}

/// Implementation for adding terms
impl TermFrequency {
    /// Create a new TermFrequency
    pub fn new() -> Self {
        TermFrequency {
            term_count: IndexMap::new(),
            total_term_count: 0,
        }
    }

    /// Count the tokens of `text`, skipping stop words
    ///
    /// # Arguments
    /// * `text` - raw document text
    /// * `stop_words` - lowercase terms to drop
    pub fn from_text(text: &str, stop_words: &HashSet<String>) -> Self {
        let mut freq = TermFrequency::new();
        for token in tokenize(text) {
            if !stop_words.contains(&token) {
                freq.add_owned(token);
            }
        }
        freq
    }

    #[inline]
    fn add_owned(&mut self, term: String) {
        *self.term_count.entry(term).or_insert(0) += 1;
        self.total_term_count += 1;
    }

    /// Add a term
    ///
    /// # Arguments
    /// * `term` - term to add
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        let count = self.term_count.entry(term.to_string()).or_insert(0);
        *count += 1;
        self.total_term_count += 1;
        self
    }

    /// Add multiple terms
    ///
    /// # Arguments
    /// * `terms` - Slice of terms to add
    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }
}

/// Accessors
impl TermFrequency {
    /// Occurrence count of `term`, 0 when absent
    #[inline]
    pub fn term_count(&self, term: &str) -> u64 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    /// Total number of counted tokens
    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    /// Number of distinct terms
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }

    /// `(term, count)` in first-seen order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.term_count.iter().map(|(t, &c)| (t.as_str(), c))
    }

    /// Distinct terms in first-seen order
    #[inline]
    pub fn term_set(&self) -> impl Iterator<Item = &str> {
        self.term_count.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_lowercases_and_drops_short_tokens() {
        let toks: Vec<String> = tokenize("A Neural-Network, 2 layers; x_y! Ünïcode").collect();
        assert_eq!(toks, vec!["neural", "network", "layers", "x_y", "ünïcode"]);
    }

    #[test]
    fn tokenizer_keeps_digits() {
        let toks: Vec<String> = tokenize("claim 12 of US2011").collect();
        assert_eq!(toks, vec!["claim", "12", "of", "us2011"]);
    }

    #[test]
    fn from_text_skips_stop_words() {
        let stop: HashSet<String> = ["the", "of"].iter().map(|s| s.to_string()).collect();
        let freq = TermFrequency::from_text("The method of the claim; the METHOD", &stop);
        assert_eq!(freq.term_count("method"), 2);
        assert_eq!(freq.term_count("the"), 0);
        assert_eq!(freq.term_sum(), 3);
        assert_eq!(freq.term_set().collect::<Vec<_>>(), vec!["method", "claim"]);
    }

    #[test]
    fn add_terms_accumulates() {
        let mut freq = TermFrequency::new();
        freq.add_terms(&["rust", "fast", "rust"]).add_term("safe");
        assert_eq!(freq.term_num(), 3);
        assert_eq!(freq.term_sum(), 4);
        assert_eq!(freq.iter().collect::<Vec<_>>(), vec![("rust", 2), ("fast", 1), ("safe", 1)]);
    }
}
