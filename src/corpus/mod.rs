pub mod loader;
pub mod metadata;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered collection of documents keyed by a unique id.
///
/// The position of a document is its column in every matrix derived from the
/// corpus, so the order is kept stable: re-inserting an existing id replaces
/// its text in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    documents: IndexMap<String, String>,
}

/// Borrowed view of a single document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document<'a> {
    pub id: &'a str,
    pub text: &'a str,
}

impl Corpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self { documents: IndexMap::new() }
    }

    /// Add a document, or replace the text of an existing id.
    /// Returns the previous text when the id was already present.
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.documents.insert(id.into(), text.into())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document at column `idx`
    pub fn get(&self, idx: usize) -> Option<Document<'_>> {
        self.documents
            .get_index(idx)
            .map(|(id, text)| Document { id, text })
    }

    /// Text of the document with the given id
    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.documents.get(id).map(String::as_str)
    }

    /// Column index of the document with the given id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.documents.get_index_of(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = Document<'_>> {
        self.documents.iter().map(|(id, text)| Document { id, text })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.documents.values().map(String::as_str)
    }
}

impl<I, T> FromIterator<(I, T)> for Corpus
where
    I: Into<String>,
    T: Into<String>,
{
    fn from_iter<It: IntoIterator<Item = (I, T)>>(iter: It) -> Self {
        let mut corpus = Corpus::new();
        for (id, text) in iter {
            corpus.insert(id, text);
        }
        corpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let corpus: Corpus = [("b", "second"), ("a", "first")].into_iter().collect();
        assert_eq!(corpus.ids().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(corpus.get(1), Some(Document { id: "a", text: "first" }));
        assert_eq!(corpus.position("b"), Some(0));
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut corpus = Corpus::new();
        corpus.insert("x", "old");
        corpus.insert("y", "other");
        assert_eq!(corpus.insert("x", "new"), Some("old".to_string()));
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get(0).map(|d| d.text), Some("new"));
        assert_eq!(corpus.text_of("y"), Some("other"));
    }

    #[test]
    fn empty() {
        let corpus = Corpus::new();
        assert!(corpus.is_empty());
        assert_eq!(corpus.get(0), None);
    }
}
