use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::corpus::Corpus;
use crate::factorize::{FactorizeParams, Method};
use crate::utils::math::SparseMatrix;

/// Number of digest bytes kept in a cache directory name
const FINGERPRINT_BYTES: usize = 8;

/// Incremental SHA-256 over the inputs of one computation.
///
/// Every field is length- or tag-prefixed so that different inputs cannot
/// collide by concatenation.
#[derive(Debug, Clone, Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new(domain: &str) -> Self {
        let mut fp = Self { hasher: Sha256::new() };
        fp.str(domain);
        fp
    }

    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.hasher.update(v.to_le_bytes());
        self
    }

    pub fn usize(&mut self, v: usize) -> &mut Self {
        self.u64(v as u64)
    }

    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.u64(v.to_bits())
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.hasher.update([v as u8]);
        self
    }

    pub fn str(&mut self, s: &str) -> &mut Self {
        self.usize(s.len());
        self.hasher.update(s.as_bytes());
        self
    }

    /// Lowercase hex of the leading digest bytes
    pub fn finish(&self) -> String {
        let digest = self.hasher.clone().finalize();
        hex::encode(&digest[..FINGERPRINT_BYTES])
    }
}

/// Fingerprint of a TF-IDF computation: weighting engine, corpus content,
/// vocabulary size and the stop-word set (order independent).
pub fn tfidf_fingerprint(
    engine: &str,
    corpus: &Corpus,
    vocab_size: usize,
    stop_words: Option<&HashSet<String>>,
) -> String {
    let mut fp = Fingerprint::new("tfidf");
    fp.str(engine).usize(vocab_size);

    let mut words: Vec<String> = stop_words
        .map(|set| set.iter().map(|w| w.to_lowercase()).collect())
        .unwrap_or_default();
    words.sort_unstable();
    words.dedup();
    fp.usize(words.len());
    for word in &words {
        fp.str(word);
    }

    fp.usize(corpus.len());
    for doc in corpus.iter() {
        fp.str(doc.id).str(doc.text);
    }
    fp.finish()
}

/// Fingerprint of a factorization: the parameters that influence the result
/// and the exact content of the input matrix.
pub fn lsa_fingerprint(matrix: &SparseMatrix, params: &FactorizeParams) -> String {
    let mut fp = Fingerprint::new("lsa");
    fp.str(params.method.as_str()).usize(params.n_topics);
    match params.method {
        Method::Svd => fp.bool(params.scale_topic_document),
        Method::Nmf => fp.usize(params.max_iterations),
    };

    fp.usize(matrix.rows()).usize(matrix.cols());
    for (i, j, v) in matrix.iter() {
        fp.usize(i).usize(j).f64(v);
    }
    fp.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(text: &str) -> Corpus {
        [("a", "alpha beta"), ("b", text)].into_iter().collect()
    }

    #[test]
    fn stable_hex_of_fixed_width() {
        let a = tfidf_fingerprint("default", &corpus("gamma"), 10, None);
        let b = tfidf_fingerprint("default", &corpus("gamma"), 10, None);
        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tfidf_inputs_change_the_fingerprint() {
        let base = tfidf_fingerprint("default", &corpus("gamma"), 10, None);
        assert_ne!(base, tfidf_fingerprint("default", &corpus("delta"), 10, None));
        assert_ne!(base, tfidf_fingerprint("default", &corpus("gamma"), 11, None));

        let stop: HashSet<String> = ["alpha".to_string()].into_iter().collect();
        assert_ne!(base, tfidf_fingerprint("default", &corpus("gamma"), 10, Some(&stop)));
        // an empty stop set is the same as none
        assert_eq!(base, tfidf_fingerprint("default", &corpus("gamma"), 10, Some(&HashSet::new())));
        assert_ne!(base, tfidf_fingerprint("sublinear", &corpus("gamma"), 10, None));
    }

    #[test]
    fn field_boundaries_matter() {
        let ab: Corpus = [("ab", "c")].into_iter().collect();
        let a_bc: Corpus = [("a", "bc")].into_iter().collect();
        assert_ne!(tfidf_fingerprint("default", &ab, 5, None), tfidf_fingerprint("default", &a_bc, 5, None));
    }

    #[test]
    fn lsa_parameters_change_the_fingerprint() {
        let m = SparseMatrix::from_columns(2, vec![vec![(0, 1.0)], vec![(1, 0.5)]]);
        let svd = FactorizeParams::new(1, Method::Svd);
        let base = lsa_fingerprint(&m, &svd);

        assert_ne!(base, lsa_fingerprint(&m, &FactorizeParams::new(2, Method::Svd)));
        assert_ne!(base, lsa_fingerprint(&m, &FactorizeParams::new(1, Method::Nmf)));
        assert_ne!(base, lsa_fingerprint(&m, &svd.clone().scale_topic_document(true)));
        // SVD ignores the iteration budget
        assert_eq!(base, lsa_fingerprint(&m, &svd.clone().max_iterations(99)));

        let nmf = FactorizeParams::new(1, Method::Nmf);
        assert_ne!(
            lsa_fingerprint(&m, &nmf),
            lsa_fingerprint(&m, &nmf.clone().max_iterations(99))
        );

        let other = SparseMatrix::from_columns(2, vec![vec![(0, 1.0)], vec![(1, 0.25)]]);
        assert_ne!(base, lsa_fingerprint(&other, &svd));
    }
}
