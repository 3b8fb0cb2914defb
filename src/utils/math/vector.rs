use num::Float;

/// Dot product of two equally sized slices
#[inline]
pub fn dot<N: Float>(a: &[N], b: &[N]) -> N {
    debug_assert_eq!(a.len(), b.len(), "Vectors must be of the same length to compute dot product.");
    a.iter()
        .zip(b.iter())
        .fold(N::zero(), |acc, (&x, &y)| acc + x * y)
}

/// Euclidean norm
#[inline]
pub fn l2_norm<N: Float>(a: &[N]) -> N {
    dot(a, a).sqrt()
}

/// Scale `a` to unit length in place.
/// Returns the norm before scaling; a zero vector is left untouched.
#[inline]
pub fn normalize_l2<N: Float>(a: &mut [N]) -> N {
    let norm = l2_norm(a);
    if norm > N::zero() {
        a.iter_mut().for_each(|x| *x = *x / norm);
    }
    norm
}

/// true when every element is finite
#[inline]
pub fn all_finite<N: Float>(a: &[N]) -> bool {
    a.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_and_norm() {
        let a = [3.0f64, 4.0];
        assert_eq!(dot(&a, &[1.0, 1.0]), 7.0);
        assert_eq!(l2_norm(&a), 5.0);
    }

    #[test]
    fn normalize_keeps_zero_vector() {
        let mut z = [0.0f32; 3];
        assert_eq!(normalize_l2(&mut z), 0.0);
        assert_eq!(z, [0.0; 3]);

        let mut v = [0.0f64, 2.0, 0.0];
        normalize_l2(&mut v);
        assert_eq!(v, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn finite_check() {
        assert!(all_finite(&[1.0f64, -2.0]));
        assert!(!all_finite(&[1.0f64, f64::NAN]));
        assert!(!all_finite(&[f64::INFINITY]));
    }
}
