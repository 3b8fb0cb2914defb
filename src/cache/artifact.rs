//! On-disk artifacts of a cache entry, one CBOR blob per matrix or
//! vocabulary.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::Array2;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Result, TopicError};
use crate::factorize::Factorization;
use crate::utils::math::SparseMatrix;
use crate::vectorizer::{vocab::Vocabulary, WeightedMatrix};

pub const TFIDF_MATRIX_FILE: &str = "tfidf_matrix.cbor";
pub const TFIDF_WORDS_FILE: &str = "tfidf_words.cbor";
pub const WORD_TOPIC_FILE: &str = "word_topic_matrix.cbor";
pub const TOPIC_DOC_FILE: &str = "topic_doc_matrix.cbor";

/// A value that can be stored as the artifacts of one cache entry.
pub trait Persist: Sized {
    /// File names written by [`Persist::save`]
    const ARTIFACTS: &'static [&'static str];

    /// Write every artifact into `dir`
    fn save(&self, dir: &Path) -> Result<()>;

    /// Read every artifact from `dir`.
    ///
    /// # Errors
    /// `CacheCorruption` when an artifact is missing, unreadable or
    /// inconsistent with the others.
    fn load(dir: &Path) -> Result<Self>;
}

/// Serialize `value` as CBOR into `path`
pub fn write_cbor<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_cbor::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Deserialize a CBOR artifact; every failure is cache corruption
pub fn read_cbor<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| TopicError::corruption(path, e))?;
    serde_cbor::from_reader(BufReader::new(file)).map_err(|e| TopicError::corruption(path, e))
}

fn ensure(ok: bool, dir: &Path, reason: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(TopicError::corruption(dir, reason()))
    }
}

impl Persist for WeightedMatrix {
    const ARTIFACTS: &'static [&'static str] = &[TFIDF_MATRIX_FILE, TFIDF_WORDS_FILE];

    fn save(&self, dir: &Path) -> Result<()> {
        write_cbor(&dir.join(TFIDF_MATRIX_FILE), &self.matrix)?;
        write_cbor(&dir.join(TFIDF_WORDS_FILE), &self.vocabulary)
    }

    fn load(dir: &Path) -> Result<Self> {
        let matrix_path = dir.join(TFIDF_MATRIX_FILE);
        let matrix: SparseMatrix = read_cbor(&matrix_path)?;
        matrix
            .validate()
            .map_err(|reason| TopicError::corruption(&matrix_path, reason))?;
        let vocabulary: Vocabulary = read_cbor(&dir.join(TFIDF_WORDS_FILE))?;

        ensure(matrix.rows() == vocabulary.len(), dir, || {
            format!(
                "matrix has {} rows but the vocabulary has {} terms",
                matrix.rows(),
                vocabulary.len()
            )
        })?;
        ensure(vocabulary.is_distinct(), dir, || "vocabulary has duplicate terms".into())?;
        Ok(WeightedMatrix { matrix, vocabulary })
    }
}

impl Persist for Factorization {
    const ARTIFACTS: &'static [&'static str] = &[WORD_TOPIC_FILE, TOPIC_DOC_FILE];

    fn save(&self, dir: &Path) -> Result<()> {
        write_cbor(&dir.join(WORD_TOPIC_FILE), &self.word_topic)?;
        write_cbor(&dir.join(TOPIC_DOC_FILE), &self.topic_document)
    }

    fn load(dir: &Path) -> Result<Self> {
        let word_topic: Array2<f64> = read_cbor(&dir.join(WORD_TOPIC_FILE))?;
        let topic_document: Array2<f64> = read_cbor(&dir.join(TOPIC_DOC_FILE))?;
        let out = Factorization { word_topic, topic_document };
        ensure(out.is_consistent(), dir, || {
            format!(
                "word-topic is {:?} but topic-document is {:?}",
                out.word_topic.dim(),
                out.topic_document.dim()
            )
        })?;
        Ok(out)
    }
}
