pub mod nmf;
pub mod svd;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TopicError};
use crate::utils::math::SparseMatrix;

/// Default number of NMF update rounds
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Latent topic factorization method.
///
/// Parsed from its tag (`"SVD"` / `"NMF"`, case-insensitive); any other tag is
/// rejected with [`TopicError::UnsupportedMethod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    /// randomized truncated singular value decomposition
    Svd,
    /// non-negative matrix factorization
    Nmf,
}

impl Method {
    pub const ALL: [Method; 2] = [Method::Svd, Method::Nmf];

    /// Canonical tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Svd => "SVD",
            Method::Nmf => "NMF",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SVD" => Ok(Method::Svd),
            "NMF" => Ok(Method::Nmf),
            _ => Err(TopicError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = TopicError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Method> for String {
    fn from(m: Method) -> Self {
        m.as_str().to_string()
    }
}

/// Output of a factorization: V × K word-topic and K × D topic-document matrices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factorization {
    pub word_topic: Array2<f64>,
    pub topic_document: Array2<f64>,
}

impl Factorization {
    /// number of topics K
    #[inline]
    pub fn n_topics(&self) -> usize {
        self.word_topic.ncols()
    }

    /// true when the inner dimensions agree
    pub fn is_consistent(&self) -> bool {
        self.word_topic.ncols() == self.topic_document.nrows()
    }
}

/// Parameters of one factorization run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactorizeParams {
    pub n_topics: usize,
    pub method: Method,
    /// upper bound on NMF update rounds; unused by SVD
    pub max_iterations: usize,
    /// SVD only: return Σ·Vᵀ instead of Vᵀ as the topic-document matrix
    pub scale_topic_document: bool,
}

impl FactorizeParams {
    pub fn new(n_topics: usize, method: Method) -> Self {
        Self {
            n_topics,
            method,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            scale_topic_document: false,
        }
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn scale_topic_document(mut self, scale: bool) -> Self {
        self.scale_topic_document = scale;
        self
    }

    /// Check the parameters against a matrix of `shape`
    pub fn validate(&self, shape: (usize, usize)) -> Result<()> {
        let limit = shape.0.min(shape.1);
        if self.n_topics == 0 || self.n_topics > limit {
            return Err(TopicError::InvalidInput(format!(
                "n_topics must be in 1..={limit} for a {}x{} matrix, got {}",
                shape.0, shape.1, self.n_topics
            )));
        }
        Ok(())
    }

    /// Factorize `matrix` with these parameters
    pub fn run(&self, matrix: &SparseMatrix) -> Result<Factorization> {
        self.validate(matrix.shape())?;
        if !matrix.all_finite() {
            return Err(TopicError::Factorization("input matrix has non-finite values".into()));
        }
        if matrix.nnz() == 0 {
            return Err(TopicError::Factorization("input matrix has no non-zero entry".into()));
        }

        let start = Instant::now();
        info!(
            method = %self.method,
            n_topics = self.n_topics,
            rows = matrix.rows(),
            cols = matrix.cols(),
            "computing LSA"
        );
        let out = match self.method {
            Method::Svd => svd::svd_topics(matrix, self.n_topics, self.scale_topic_document)?,
            Method::Nmf => nmf::nmf_topics(matrix, self.n_topics, self.max_iterations)?,
        };

        if !out.word_topic.iter().chain(out.topic_document.iter()).all(|x| x.is_finite()) {
            return Err(TopicError::Factorization(format!(
                "{} produced non-finite values",
                self.method
            )));
        }
        debug_assert_eq!(out.word_topic.dim(), (matrix.rows(), self.n_topics));
        debug_assert_eq!(out.topic_document.dim(), (self.n_topics, matrix.cols()));
        info!(
            method = %self.method,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "LSA done"
        );
        Ok(out)
    }
}

/// Reduce the V × D `matrix` to `n_topics` latent topics.
///
/// # Arguments
/// * `matrix` - word-document matrix
/// * `n_topics` - K, in `1..=min(V, D)`
/// * `method` - SVD or NMF
/// * `max_iterations` - NMF update rounds (see [`DEFAULT_MAX_ITERATIONS`])
///
/// # Returns
/// Word-topic (V × K) and topic-document (K × D) matrices.
pub fn factorize(
    matrix: &SparseMatrix,
    n_topics: usize,
    method: Method,
    max_iterations: usize,
) -> Result<Factorization> {
    FactorizeParams::new(n_topics, method)
        .max_iterations(max_iterations)
        .run(matrix)
}
