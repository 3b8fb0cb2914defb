//! Randomized truncated SVD (Halko, Martinsson & Tropp).
//!
//! A seeded Gaussian test matrix sketches the range of A, a few power
//! iterations sharpen the sketch, and the small projected problem is solved
//! exactly through the eigen-decomposition of B·Bᵀ.

use std::f64::consts::PI;

use ndarray::{s, Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::{Result, TopicError};
use crate::factorize::Factorization;
use crate::utils::math::{
    dense::{flip_signs, orthonormalize_columns, symmetric_eigen},
    SparseMatrix,
};

/// extra sketch columns beyond the requested rank
const OVERSAMPLES: usize = 10;
/// fixed seed so repeated runs are bit-identical
const SEED: u64 = 0;
/// singular values below `RANK_TOL * σ₀` count as zero
const RANK_TOL: f64 = 1e-10;

/// Truncated SVD `A ≈ U · diag(s) · Vᵀ`
#[derive(Debug, Clone)]
pub struct Svd {
    /// m × k, orthonormal columns
    pub u: Array2<f64>,
    /// k singular values, descending
    pub s: Array1<f64>,
    /// k × n, orthonormal rows (zero rows for zero singular values)
    pub vt: Array2<f64>,
}

impl Svd {
    /// Number of singular values above the rank tolerance
    pub fn numerical_rank(&self) -> usize {
        let top = self.s.first().copied().unwrap_or(0.0);
        if top <= 0.0 {
            return 0;
        }
        self.s.iter().filter(|&&x| x > RANK_TOL * top).count()
    }
}

#[inline]
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // Box-Muller; 1 - u keeps the log argument in (0, 1]
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Power iteration count used by the range finder
fn power_iterations(k: usize, min_dim: usize) -> usize {
    if (k as f64) < 0.1 * min_dim as f64 {
        7
    } else {
        4
    }
}

/// Rank-`k` randomized SVD of `a`.
///
/// Never fails on rank deficiency: missing directions come back with a zero
/// singular value and a zero row in `vt`. Signs are normalized so the
/// largest-magnitude entry of every column of `u` is positive.
pub fn randomized_svd(a: &SparseMatrix, k: usize) -> Svd {
    let (m, n) = a.shape();
    let min_dim = m.min(n);
    let k = k.min(min_dim);
    let l = (k + OVERSAMPLES).min(min_dim);
    let n_iter = power_iterations(k, min_dim);

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let omega = Array2::from_shape_simple_fn((n, l), || standard_normal(&mut rng));

    let mut q = a.mul_dense(&omega);
    orthonormalize_columns(&mut q);
    for _ in 0..n_iter {
        let mut z = a.t_mul_dense(&q);
        orthonormalize_columns(&mut z);
        q = a.mul_dense(&z);
        orthonormalize_columns(&mut q);
    }

    // B = Qᵀ A (l × n); solve the small problem through B Bᵀ = W Λ Wᵀ
    let b = a.t_mul_dense(&q).reversed_axes();
    let gram = b.dot(&b.t());
    let (eigvals, eigvecs) = symmetric_eigen(&gram);

    let s_full = eigvals.mapv(|x| x.max(0.0).sqrt());
    let top = s_full.first().copied().unwrap_or(0.0);

    let mut u = q.dot(&eigvecs).slice(s![.., ..k]).to_owned();
    let mut vt = Array2::zeros((k, n));
    for i in 0..k {
        let sigma = s_full[i];
        if sigma > RANK_TOL * top && sigma > 0.0 {
            let row = eigvecs.column(i).dot(&b) / sigma;
            vt.row_mut(i).assign(&row);
        }
    }
    flip_signs(&mut u, &mut vt);

    let s = s_full.slice(s![..k]).to_owned();
    debug!(k, sketch = l, power_iterations = n_iter, top_singular_value = top, "randomized SVD");
    Svd { u, s, vt }
}

/// SVD topic model: U as word-topic, Vᵀ (or Σ·Vᵀ) as topic-document.
///
/// # Errors
/// `Factorization` when the numerical rank of `a` is below `k`, since the
/// trailing topics would be arbitrary.
pub fn svd_topics(a: &SparseMatrix, k: usize, scale_topic_document: bool) -> Result<Factorization> {
    let svd = randomized_svd(a, k);
    let rank = svd.numerical_rank();
    if rank < k {
        return Err(TopicError::Factorization(format!(
            "numerical rank {rank} is below the requested {k} topics"
        )));
    }

    let mut topic_document = svd.vt;
    if scale_topic_document {
        for (mut row, sigma) in topic_document.rows_mut().into_iter().zip(svd.s.iter()) {
            row.mapv_inplace(|x| x * sigma);
        }
    }
    Ok(Factorization {
        word_topic: svd.u,
        topic_document,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factorize::tests::block_matrix;
    use ndarray::array;

    fn max_abs_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
    }

    #[test]
    fn full_rank_svd_reconstructs() {
        let a = block_matrix();
        let svd = randomized_svd(&a, 5);
        let rebuilt = svd.u.dot(&Array2::from_diag(&svd.s)).dot(&svd.vt);
        assert!(max_abs_diff(&rebuilt, &a.to_dense()) < 1e-8);

        // orthonormal factors
        let utu = svd.u.t().dot(&svd.u);
        assert!(max_abs_diff(&utu, &Array2::eye(5)) < 1e-8);
        let vvt = svd.vt.dot(&svd.vt.t());
        assert!(max_abs_diff(&vvt, &Array2::eye(5)) < 1e-8);
    }

    #[test]
    fn singular_values_are_descending_and_match_known_values() {
        // diag(3, 2, 1) has singular values 3, 2, 1
        let a = SparseMatrix::from_dense(&array![[0.0, 2.0, 0.0], [3.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        let svd = randomized_svd(&a, 2);
        assert!((svd.s[0] - 3.0).abs() < 1e-10);
        assert!((svd.s[1] - 2.0).abs() < 1e-10);
        // the dominant direction is row 1 / column 0, sign normalized positive
        assert!((svd.u[[1, 0]] - 1.0).abs() < 1e-10);
        assert!((svd.vt[[0, 0]] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let a = block_matrix();
        let first = svd_topics(&a, 2, false).unwrap();
        let second = svd_topics(&a, 2, false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn scaled_topic_document_multiplies_by_singular_values() {
        let a = block_matrix();
        let plain = svd_topics(&a, 2, false).unwrap();
        let scaled = svd_topics(&a, 2, true).unwrap();
        let s = randomized_svd(&a, 2).s;
        for i in 0..2 {
            for j in 0..5 {
                let expected = plain.topic_document[[i, j]] * s[i];
                assert!((scaled.topic_document[[i, j]] - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn rank_deficient_matrix_fails_instead_of_degenerate_topics() {
        // two identical documents: rank 1
        let a = SparseMatrix::from_columns(2, vec![vec![(0, 0.6), (1, 0.8)], vec![(0, 0.6), (1, 0.8)]]);
        assert_eq!(randomized_svd(&a, 2).numerical_rank(), 1);
        let err = svd_topics(&a, 2, false).unwrap_err();
        assert!(matches!(err, TopicError::Factorization(_)));
        assert!(svd_topics(&a, 1, false).is_ok());
    }
}
