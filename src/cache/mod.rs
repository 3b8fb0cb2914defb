//! Load-or-compute caching of pipeline stages.
//!
//! Every stage result lives in its own directory under a cache root. A
//! present directory is a hit and is loaded as is; an absent one is computed,
//! written into a staging directory and renamed into place.
pub mod artifact;
pub mod fingerprint;
pub mod publish;

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::{
    artifact::Persist,
    fingerprint::{lsa_fingerprint, tfidf_fingerprint},
    publish::{sweep_stale_staging, Published, StagingDir},
};
use crate::corpus::Corpus;
use crate::error::{Result, TopicError};
use crate::factorize::{FactorizeParams, Factorization};
use crate::utils::math::SparseMatrix;
use crate::vectorizer::{
    compute_weighted_matrix_with,
    tfidf::{DefaultTfIdfEngine, TfIdfEngine},
    WeightedMatrix,
};

/// Directory stem of the vectorizer stage
pub const TFIDF_STAGE: &str = "TFIDF";
/// Directory stem prefix of the factorizer stage (`LSA_SVD`, `LSA_NMF`)
pub const LSA_STAGE: &str = "LSA";

/// Staging directories untouched this long belong to a dead writer
pub const STALE_STAGING_AGE: Duration = Duration::from_secs(60 * 60);

/// How cache directory names are derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    /// `<stage>_<fingerprint>`: any change of parameters or input selects a
    /// new entry
    #[default]
    Fingerprinted,
    /// plain `<stage>` names; an existing entry is reused whatever produced it
    Legacy,
}

impl KeyPolicy {
    /// Directory name for `stage`; `fingerprint` is only evaluated when needed
    pub fn key<F>(self, stage: &str, fingerprint: F) -> String
    where
        F: FnOnce() -> String,
    {
        match self {
            KeyPolicy::Fingerprinted => format!("{stage}_{}", fingerprint()),
            KeyPolicy::Legacy => stage.to_string(),
        }
    }
}

/// Return the value cached under `cache_root/cache_key`, computing and
/// persisting it on a miss.
///
/// - hit: every artifact is loaded, `compute` is not called
/// - miss: staging directories abandoned by earlier writers are swept,
///   `compute` runs, the artifacts are written to a staging directory which is
///   then renamed to the entry; a failure leaves no entry
///
/// # Errors
/// Whatever `compute` returns, I/O failures while writing, and
/// `CacheCorruption` when an existing entry cannot be loaded. A corrupted
/// entry is never recomputed.
pub fn with_cache<T, F>(compute: F, cache_key: &str, cache_root: &Path) -> Result<T>
where
    T: Persist,
    F: FnOnce() -> Result<T>,
{
    let entry = cache_root.join(cache_key);
    if entry.exists() {
        if !entry.is_dir() {
            return Err(TopicError::corruption(&entry, "cache entry is not a directory"));
        }
        if let Some(missing) = T::ARTIFACTS.iter().find(|name| !entry.join(name).is_file()) {
            return Err(TopicError::corruption(&entry, format!("missing {missing}")));
        }
        let start = Instant::now();
        let value = T::load(&entry)?;
        info!(
            key = cache_key,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "cache hit"
        );
        return Ok(value);
    }

    info!(key = cache_key, "cache miss");
    fs::create_dir_all(cache_root)?;
    sweep_stale_staging(&entry, STALE_STAGING_AGE)?;
    let value = compute()?;

    let staging = StagingDir::new(&entry)?;
    value.save(staging.path())?;
    match staging.publish()? {
        Published::Renamed => info!(key = cache_key, path = %entry.display(), "cache entry written"),
        Published::LostRace => warn!(key = cache_key, "cache entry published concurrently, keeping ours in memory"),
    }
    Ok(value)
}

/// Cached [`compute_weighted_matrix`](crate::compute_weighted_matrix).
pub fn vectorize_cached(
    corpus: &Corpus,
    vocab_size: usize,
    stop_words: Option<&HashSet<String>>,
    cache_root: &Path,
    policy: KeyPolicy,
) -> Result<WeightedMatrix> {
    vectorize_cached_with::<DefaultTfIdfEngine>(corpus, vocab_size, stop_words, cache_root, policy)
}

/// [`vectorize_cached`] with an explicit weighting engine; the engine is part
/// of the fingerprint.
pub fn vectorize_cached_with<E: TfIdfEngine>(
    corpus: &Corpus,
    vocab_size: usize,
    stop_words: Option<&HashSet<String>>,
    cache_root: &Path,
    policy: KeyPolicy,
) -> Result<WeightedMatrix> {
    let key = policy.key(TFIDF_STAGE, || tfidf_fingerprint(E::NAME, corpus, vocab_size, stop_words));
    with_cache(
        || compute_weighted_matrix_with::<E>(corpus, vocab_size, stop_words),
        &key,
        cache_root,
    )
}

/// Cached factorization; the entry name carries the method
/// (`LSA_SVD`, `LSA_NMF`).
pub fn factorize_cached(
    matrix: &SparseMatrix,
    params: &FactorizeParams,
    cache_root: &Path,
    policy: KeyPolicy,
) -> Result<Factorization> {
    let stage = format!("{LSA_STAGE}_{}", params.method);
    let key = policy.key(&stage, || lsa_fingerprint(matrix, params));
    with_cache(|| params.run(matrix), &key, cache_root)
}
