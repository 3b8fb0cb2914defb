use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Ordered, immutable sequence of distinct terms.
/// Entry `i` labels row `i` of the word-document and word-topic matrices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary(Vec<String>);

impl Vocabulary {
    /// Wrap a list of terms; the caller guarantees they are distinct
    pub fn new(terms: Vec<String>) -> Self {
        Self(terms)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).map(String::as_str)
    }

    /// Row index of `term`
    pub fn position(&self, term: &str) -> Option<usize> {
        self.0.iter().position(|t| t == term)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// true when no term appears twice
    pub fn is_distinct(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.0.len());
        self.0.iter().all(|t| seen.insert(t.as_str()))
    }
}

impl Index<usize> for Vocabulary {
    type Output = str;

    fn index(&self, idx: usize) -> &str {
        &self.0[idx]
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        Self(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        let vocab = Vocabulary::from(vec!["alpha".to_string(), "beta".to_string()]);
        assert_eq!(vocab.len(), 2);
        assert_eq!(&vocab[1], "beta");
        assert_eq!(vocab.get(2), None);
        assert_eq!(vocab.position("alpha"), Some(0));
        assert!(vocab.is_distinct());
    }

    #[test]
    fn detects_duplicates() {
        let vocab = Vocabulary::new(vec!["a".into(), "b".into(), "a".into()]);
        assert!(!vocab.is_distinct());
    }

    #[test]
    fn serializes_as_plain_sequence() {
        let vocab = Vocabulary::new(vec!["a".into()]);
        assert_eq!(serde_json::to_string(&vocab).unwrap(), r#"["a"]"#);
    }
}
