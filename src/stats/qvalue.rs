//! Multiple testing correction
use std::cmp::Ordering;

use super::f64_from_usize;

/// Orders p-values ascending, with `NaN` after every number
pub(crate) fn cmp_pvalue(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(&b),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}

/// Calculates Benjamini-Hochberg q-values
///
/// The q-value of every p-value is returned at the same position as the
/// p-value. The p-values don't need to be sorted. The q-values are
/// monotone: a larger p-value never receives a smaller q-value.
/// q-values are capped at `1.0`.
///
/// `NaN` p-values don't count as a test and receive a `NaN` q-value.
///
/// # Examples
///
/// ```
/// use groupcomp::stats::q_values;
///
/// let qvalues = q_values(&[0.01, 0.04, 0.03, 0.5]);
/// let expected = [0.04, 0.04 * 4.0 / 3.0, 0.04 * 4.0 / 3.0, 0.5];
/// for (q, e) in qvalues.iter().zip(expected) {
///     assert!((q - e).abs() < 1e-12);
/// }
/// ```
pub fn q_values(pvalues: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..pvalues.len()).collect();
    order.sort_by(|a, b| cmp_pvalue(pvalues[*a], pvalues[*b]));

    let tests = pvalues.iter().filter(|p| !p.is_nan()).count();
    let total = f64_from_usize(tests);

    let mut qvalues = vec![f64::NAN; pvalues.len()];
    let mut previous = 1.0f64;
    for (rank, idx) in order.iter().enumerate().take(tests).rev() {
        // the factor is exactly 1.0 for the largest p-value, so q >= p holds
        let qvalue = (pvalues[*idx] * (total / f64_from_usize(rank + 1))).min(previous);
        qvalues[*idx] = qvalue;
        previous = qvalue;
    }
    qvalues
}
