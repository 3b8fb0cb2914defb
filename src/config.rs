//! Pipeline configuration, loadable from TOML.
//!
//! Every field has a default, so a file only needs the values it changes:
//!
//! ```toml
//! [tfidf]
//! vocab_size = 500
//! stop_words = ["said", "may"]
//!
//! [lsa]
//! n_topics = 8
//! method = "NMF"
//!
//! [cache]
//! root = "cache"
//! key_policy = "legacy"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cache::KeyPolicy;
use crate::corpus::metadata::Granularity;
use crate::error::{Result, TopicError};
use crate::factorize::{FactorizeParams, Method, DEFAULT_MAX_ITERATIONS};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub tfidf: TfIdfConfig,
    pub lsa: LsaConfig,
    pub cache: CacheConfig,
    pub report: ReportConfig,
    pub keywords: KeywordsConfig,
}

/// Input locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// extracted, uncleaned text files
    pub raw_txt_dir: PathBuf,
    /// cleaned text files: the corpus
    pub txt_dir: PathBuf,
    /// csv with `Name` and `Date_Priority` columns, or a directory of them
    pub metadata_csv: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_txt_dir: PathBuf::from("patents_txts"),
            txt_dir: PathBuf::from("cleaned_txt"),
            metadata_csv: PathBuf::from("metadata/metadata.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TfIdfConfig {
    pub vocab_size: usize,
    pub stop_words: Vec<String>,
    /// weight by `1 + ln(tf)` instead of raw counts
    pub sublinear_tf: bool,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            vocab_size: 1000,
            stop_words: Vec::new(),
            sublinear_tf: false,
        }
    }
}

impl TfIdfConfig {
    /// `None` when no stop words are configured
    pub fn stop_word_set(&self) -> Option<HashSet<String>> {
        if self.stop_words.is_empty() {
            None
        } else {
            Some(self.stop_words.iter().map(|w| w.to_lowercase()).collect())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LsaConfig {
    pub n_topics: usize,
    pub method: Method,
    pub max_iterations: usize,
    pub scale_topic_document: bool,
}

impl Default for LsaConfig {
    fn default() -> Self {
        Self {
            n_topics: 10,
            method: Method::Svd,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            scale_topic_document: false,
        }
    }
}

impl LsaConfig {
    pub fn params(&self) -> FactorizeParams {
        FactorizeParams::new(self.n_topics, self.method)
            .max_iterations(self.max_iterations)
            .scale_topic_document(self.scale_topic_document)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub root: PathBuf,
    pub key_policy: KeyPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("cache"),
            key_policy: KeyPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// representative terms shown per topic
    pub top_terms: usize,
    /// only the most populated topics; all when unset
    pub top_topics: Option<usize>,
    pub granularity: Granularity,
    pub bar_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_terms: 3,
            top_topics: None,
            granularity: Granularity::Year,
            bar_width: 40,
        }
    }
}

/// Keyword-defined topics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordsConfig {
    /// per-text cap on a keyword's count
    pub max_count: Option<u64>,
    pub topics: IndexMap<String, Vec<String>>,
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| TopicError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tfidf.vocab_size == 0 {
            return Err(TopicError::Config("tfidf.vocab_size must be at least 1".into()));
        }
        if self.lsa.n_topics == 0 {
            return Err(TopicError::Config("lsa.n_topics must be at least 1".into()));
        }
        if self.report.top_terms == 0 {
            return Err(TopicError::Config("report.top_terms must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.tfidf.vocab_size, 1000);
        assert_eq!(config.lsa.method, Method::Svd);
        assert_eq!(config.cache.key_policy, KeyPolicy::Fingerprinted);
        assert!(config.tfidf.stop_word_set().is_none());
        assert!(!config.tfidf.sublinear_tf);
    }

    #[test]
    fn partial_sections_override_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [tfidf]
            stop_words = ["Said", "may"]
            sublinear_tf = true

            [lsa]
            n_topics = 4
            method = "nmf"
            max_iterations = 50

            [cache]
            key_policy = "legacy"

            [report]
            granularity = "month"
            top_topics = 2

            [keywords]
            max_count = 3
            [keywords.topics]
            energy = ["solar", "battery"]
            "#,
        )
        .unwrap();

        assert_eq!(config.tfidf.vocab_size, 1000);
        assert!(config.tfidf.stop_word_set().unwrap().contains("said"));
        assert!(config.tfidf.sublinear_tf);
        assert_eq!(config.lsa.params(), FactorizeParams::new(4, Method::Nmf).max_iterations(50));
        assert_eq!(config.cache.key_policy, KeyPolicy::Legacy);
        assert_eq!(config.cache.root, PathBuf::from("cache"));
        assert_eq!(config.report.granularity, Granularity::Month);
        assert_eq!(config.report.top_topics, Some(2));
        assert_eq!(config.keywords.topics["energy"], vec!["solar", "battery"]);
    }

    #[test]
    fn rejects_bad_values() {
        let err = PipelineConfig::from_toml_str("[lsa]\nmethod = \"KMEANS\"").unwrap_err();
        assert!(matches!(err, TopicError::Config(ref m) if m.contains("KMEANS")));

        let err = PipelineConfig::from_toml_str("[tfidf]\nvocab_size = 0").unwrap_err();
        assert!(matches!(err, TopicError::Config(_)));

        let err = PipelineConfig::from_toml_str("[lsa]\ntopics = 3").unwrap_err();
        assert!(matches!(err, TopicError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topics.toml");
        fs::write(&path, "[lsa]\nn_topics = 2\n").unwrap();
        assert_eq!(PipelineConfig::from_file(&path).unwrap().lsa.n_topics, 2);
        assert!(matches!(
            PipelineConfig::from_file(dir.path().join("missing.toml")),
            Err(TopicError::Config(_))
        ));
    }
}
