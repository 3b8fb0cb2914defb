use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::vectorizer::token::TermFrequency;

/// Corpus-wide term statistics, the base data for IDF and vocabulary selection.
/// It does not keep document text, only:
/// - the number of documents
/// - per term, the number of documents containing it
/// - per term, its total number of occurrences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermStats {
    doc_num: u64,
    doc_freq: IndexMap<String, u64>,
    total_count: IndexMap<String, u64>,
}

impl TermStats {
    /// Create a new instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document's term counts
    pub fn add_doc(&mut self, freq: &TermFrequency) {
        self.doc_num += 1;
        for (term, count) in freq.iter() {
            *self.doc_freq.entry(term.to_string()).or_insert(0) += 1;
            *self.total_count.entry(term.to_string()).or_insert(0) += count;
        }
    }

    /// Get the number of documents
    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Number of documents containing `term`
    #[inline]
    pub fn doc_freq(&self, term: &str) -> u64 {
        self.doc_freq.get(term).copied().unwrap_or(0)
    }

    /// Occurrences of `term` across all documents
    #[inline]
    pub fn total_count(&self, term: &str) -> u64 {
        self.total_count.get(term).copied().unwrap_or(0)
    }

    /// Number of distinct terms seen
    #[inline]
    pub fn term_num(&self) -> usize {
        self.doc_freq.len()
    }

    /// The `limit` most frequent terms across the corpus, in lexicographic order.
    ///
    /// Terms are ranked by total occurrence count; equal counts are ranked by
    /// the term itself so the selection does not depend on input order.
    pub fn top_terms(&self, limit: usize) -> Vec<String> {
        let mut ranked: Vec<(&str, u64)> = self
            .total_count
            .iter()
            .map(|(t, &c)| (t.as_str(), c))
            .collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(limit);
        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        terms.sort_unstable();
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq(terms: &[&str]) -> TermFrequency {
        let mut f = TermFrequency::new();
        f.add_terms(terms);
        f
    }

    #[test]
    fn counts_documents_and_occurrences() {
        let mut stats = TermStats::new();
        stats.add_doc(&freq(&["rust", "rust", "safe"]));
        stats.add_doc(&freq(&["rust", "fast"]));

        assert_eq!(stats.doc_num(), 2);
        assert_eq!(stats.doc_freq("rust"), 2);
        assert_eq!(stats.total_count("rust"), 3);
        assert_eq!(stats.doc_freq("fast"), 1);
        assert_eq!(stats.doc_freq("missing"), 0);
        assert_eq!(stats.term_num(), 3);
    }

    #[test]
    fn top_terms_ranks_by_count_then_term() {
        let mut stats = TermStats::new();
        stats.add_doc(&freq(&["b", "b", "b", "a", "c", "d", "d"]));
        // counts: b=3, d=2, a=1, c=1 -> keep b, d, a
        assert_eq!(stats.top_terms(3), vec!["a", "b", "d"]);
        assert_eq!(stats.top_terms(10), vec!["a", "b", "c", "d"]);
        assert!(stats.top_terms(0).is_empty());
    }
}
