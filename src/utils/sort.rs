/// Stable ascending argsort of `vals`.
/// - Equal values keep their original relative order
/// - NaN sorts after every other value (`total_cmp`)
///
/// Complexity: O(n log n)
#[inline]
pub fn argsort_stable(vals: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..vals.len()).collect();
    // slice::sort_by is a stable merge sort
    order.sort_by(|&a, &b| vals[a].total_cmp(&vals[b]));
    order
}

/// Indices of the `n` largest values, lowest of them first.
///
/// This is the tail of [`argsort_stable`]: among equal values the one with the
/// higher index ranks higher.
#[inline]
pub fn top_n_ascending(vals: &[f64], n: usize) -> Vec<usize> {
    let order = argsort_stable(vals);
    let start = order.len().saturating_sub(n);
    order[start..].to_vec()
}

/// Index of the first maximum, `None` for an empty iterator.
/// NaN never wins against a number.
#[inline]
pub fn first_argmax<I>(vals: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, v) in vals.into_iter().enumerate() {
        match best {
            None => best = Some((idx, v)),
            Some((_, b)) if v > b || (b.is_nan() && !v.is_nan()) => best = Some((idx, v)),
            _ => {}
        }
    }
    best.map(|(idx, _)| idx)
}

/// Stable descending order of `counts`; equal counts keep index order.
#[inline]
pub fn order_by_count_desc(counts: &[usize]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));
    order
}
