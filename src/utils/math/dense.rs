use ndarray::{Array1, Array2};

/// Columns with a norm below this (relative to the largest input column)
/// are treated as linearly dependent and zeroed.
const RANK_EPS: f64 = 1e-12;

/// Orthonormalize the columns of `m` in place (modified Gram-Schmidt).
///
/// This is the Q of a thin QR decomposition. Columns that turn out to be
/// linearly dependent on earlier ones are set to zero instead of being
/// blown up by a tiny norm.
pub fn orthonormalize_columns(m: &mut Array2<f64>) {
    let cols = m.ncols();
    let scale = (0..cols)
        .map(|j| m.column(j).dot(&m.column(j)).sqrt())
        .fold(0.0, f64::max);
    for j in 0..cols {
        for p in 0..j {
            let proj = m.column(p).dot(&m.column(j));
            if proj != 0.0 {
                let prev = m.column(p).to_owned();
                m.column_mut(j).scaled_add(-proj, &prev);
            }
        }
        let norm = m.column(j).dot(&m.column(j)).sqrt();
        if norm <= RANK_EPS * scale.max(f64::MIN_POSITIVE) {
            m.column_mut(j).fill(0.0);
        } else {
            m.column_mut(j).mapv_inplace(|x| x / norm);
        }
    }
}

/// Eigen-decomposition of a symmetric matrix with the cyclic Jacobi method.
///
/// Returns eigenvalues in descending order and the matching unit eigenvectors
/// as columns.
pub fn symmetric_eigen(a: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "matrix must be square");
    let mut a = a.clone();
    let mut v = Array2::<f64>::eye(n);

    const MAX_SWEEPS: usize = 100;
    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        let mut total = 0.0;
        for p in 0..n {
            for q in 0..n {
                let x = a[[p, q]] * a[[p, q]];
                total += x;
                if p != q {
                    off += x;
                }
            }
        }
        if off <= 1e-30 * total.max(f64::MIN_POSITIVE) {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                // signum(0.0) == 1.0, so theta == 0 gives t == 1
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let values = Array1::from_iter(order.iter().map(|&i| a[[i, i]]));
    let mut vectors = Array2::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        vectors.column_mut(dst).assign(&v.column(src));
    }
    (values, vectors)
}

/// Flip signs so that the largest-magnitude entry of every column of `u` is
/// positive, applying the same flip to the matching row of `vt`.
pub fn flip_signs(u: &mut Array2<f64>, vt: &mut Array2<f64>) {
    for j in 0..u.ncols() {
        let pivot = u
            .column(j)
            .iter()
            .copied()
            .fold(0.0f64, |best, x| if x.abs() > best.abs() { x } else { best });
        if pivot < 0.0 {
            u.column_mut(j).mapv_inplace(|x| -x);
            vt.row_mut(j).mapv_inplace(|x| -x);
        }
    }
}
