//! Non-negative matrix factorization `A ≈ W · H` with Frobenius-norm
//! multiplicative updates, started from an NNDSVDa initialization.

use ndarray::{Array1, Array2, Zip};
use tracing::debug;

use crate::error::{Result, TopicError};
use crate::factorize::{svd::randomized_svd, Factorization};
use crate::utils::math::SparseMatrix;

/// NNDSVD entries below this are treated as zero and refilled with the mean
const INIT_EPS: f64 = 1e-6;

fn positive_part(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(|v| v.max(0.0))
}

fn negative_part(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(|v| (-v).max(0.0))
}

fn norm(x: &Array1<f64>) -> f64 {
    x.dot(x).sqrt()
}

/// NNDSVDa initialization (Boutsidis & Gallopoulos) of a rank-`k` model.
///
/// Each singular triplet is split into its positive and negative parts and the
/// part with the larger norm product is kept. Zeros are replaced by the mean of
/// `a` so multiplicative updates can move every entry.
pub fn nndsvda(a: &SparseMatrix, k: usize) -> (Array2<f64>, Array2<f64>) {
    let (m, n) = a.shape();
    let svd = randomized_svd(a, k);
    let mut w = Array2::zeros((m, k));
    let mut h = Array2::zeros((k, n));

    let s0 = svd.s[0].sqrt();
    w.column_mut(0).assign(&svd.u.column(0).mapv(|x| s0 * x.abs()));
    h.row_mut(0).assign(&svd.vt.row(0).mapv(|x| s0 * x.abs()));

    for j in 1..k {
        let x = svd.u.column(j).to_owned();
        let y = svd.vt.row(j).to_owned();
        let (xp, yp) = (positive_part(&x), positive_part(&y));
        let (xn, yn) = (negative_part(&x), negative_part(&y));
        let (xp_norm, yp_norm) = (norm(&xp), norm(&yp));
        let (xn_norm, yn_norm) = (norm(&xn), norm(&yn));
        let (mp, mn) = (xp_norm * yp_norm, xn_norm * yn_norm);

        let (u, v, sigma) = if mp > mn {
            (xp / xp_norm, yp / yp_norm, mp)
        } else if mn > 0.0 {
            (xn / xn_norm, yn / yn_norm, mn)
        } else {
            // zero singular direction; left for the mean fill
            continue;
        };
        let lambda = (svd.s[j] * sigma).sqrt();
        w.column_mut(j).assign(&(u * lambda));
        h.row_mut(j).assign(&(v * lambda));
    }

    let avg = a.mean();
    let fill = |x: &mut f64| {
        if *x < INIT_EPS {
            *x = avg;
        }
    };
    w.iter_mut().for_each(fill);
    h.iter_mut().for_each(fill);
    (w, h)
}

/// Frobenius reconstruction error `‖A − W·H‖_F` without densifying `A`.
pub fn frobenius_loss(a: &SparseMatrix, w: &Array2<f64>, h: &Array2<f64>) -> f64 {
    let a_norm = a.frobenius_norm();
    let aht = a.mul_dense(&h.t().to_owned());
    let cross: f64 = (w * &aht).sum();
    let quad: f64 = (&w.t().dot(w) * &h.dot(&h.t())).sum();
    (a_norm * a_norm - 2.0 * cross + quad).max(0.0).sqrt()
}

#[inline]
fn multiplicative_step(target: &mut Array2<f64>, numerator: &Array2<f64>, denominator: &Array2<f64>) {
    Zip::from(target)
        .and(numerator)
        .and(denominator)
        .for_each(|x, &num, &den| *x *= num / den.max(f64::EPSILON));
}

/// NMF topic model: W as word-topic, H as topic-document.
///
/// Runs exactly `max_iterations` update rounds; `0` returns the
/// initialization.
///
/// # Errors
/// `InvalidInput` when `a` has a negative entry.
pub fn nmf_topics(a: &SparseMatrix, k: usize, max_iterations: usize) -> Result<Factorization> {
    if a.min_value() < 0.0 {
        return Err(TopicError::InvalidInput(
            "NMF requires a non-negative input matrix".into(),
        ));
    }

    let (mut w, mut h) = nndsvda(a, k);
    debug!(iteration = 0, loss = frobenius_loss(a, &w, &h), "NMF init");

    for iteration in 1..=max_iterations {
        // W <- W ⊙ (A Hᵀ) / (W H Hᵀ)
        let numerator = a.mul_dense(&h.t().to_owned());
        let denominator = w.dot(&h.dot(&h.t()));
        multiplicative_step(&mut w, &numerator, &denominator);

        // H <- H ⊙ (Wᵀ A) / (Wᵀ W H)
        let numerator = a.t_mul_dense(&w).reversed_axes();
        let denominator = w.t().dot(&w).dot(&h);
        multiplicative_step(&mut h, &numerator, &denominator);

        debug!(iteration, loss = frobenius_loss(a, &w, &h), "NMF update");
    }

    Ok(Factorization {
        word_topic: w,
        topic_document: h,
    })
}
