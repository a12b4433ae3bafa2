//! Fisher's exact test on 2x2 contingency tables
//!
//! The table is laid out as
//!
//! ```text
//!              | altered | unaltered
//! -------------+---------+----------
//!      group A |    a    |     b
//!      group B |    c    |     d
//! ```
//!
//! With fixed row and column sums, the count `a` follows a hypergeometric
//! distribution. The two-tailed p-value is the total probability of all
//! tables that are at most as likely as the observed one.
use std::cmp;

use statrs::function::factorial::ln_binomial;

use crate::FISHER_RELATIVE_ERROR;

/// The hypergeometric distribution of `a` given the margins of the table
#[derive(Debug, Copy, Clone, PartialEq)]
struct Hypergeometric {
    /// All cases in the table (N)
    population: u64,
    /// All altered cases (K)
    successes: u64,
    /// All cases in group A (n)
    draws: u64,
}

impl Hypergeometric {
    fn new(a: u64, b: u64, c: u64, d: u64) -> Self {
        Self {
            population: a + b + c + d,
            successes: a + c,
            draws: a + b,
        }
    }

    /// Returns the minimum value in the domain of the distribution
    ///
    /// # Formula
    ///
    /// ```text
    /// max(0, n + K - N)
    /// ```
    fn min(&self) -> u64 {
        (self.draws + self.successes).saturating_sub(self.population)
    }

    /// Returns the maximum value in the domain of the distribution
    ///
    /// # Formula
    ///
    /// ```text
    /// min(K, n)
    /// ```
    fn max(&self) -> u64 {
        cmp::min(self.successes, self.draws)
    }

    /// Calculates the probability mass function at `x`
    ///
    /// # Formula
    ///
    /// ```text
    /// (K choose x) * (N-K choose n-x) / (N choose n)
    /// ```
    fn pmf(&self, x: u64) -> f64 {
        if x < self.min() || x > self.max() {
            return 0.0;
        }
        (ln_binomial(self.successes, x)
            + ln_binomial(self.population - self.successes, self.draws - x)
            - ln_binomial(self.population, self.draws))
        .exp()
    }
}

/// Calculates the two-tailed p-value of Fisher's exact test
///
/// `a` and `b` are the altered and unaltered cases of the first group,
/// `c` and `d` those of the second group.
///
/// # Examples
///
/// ```
/// use groupcomp::stats::two_tailed_p_value;
///
/// let pvalue = two_tailed_p_value(1, 9, 11, 3);
/// assert!((pvalue - 0.002_759_456).abs() < 1e-8);
///
/// // identical groups are not different at all
/// assert!((two_tailed_p_value(5, 5, 5, 5) - 1.0).abs() < 1e-12);
/// ```
pub fn two_tailed_p_value(a: u64, b: u64, c: u64, d: u64) -> f64 {
    let hyper = Hypergeometric::new(a, b, c, d);
    if hyper.population == 0 {
        return 1.0;
    }
    let observed = hyper.pmf(a) * (1.0 + FISHER_RELATIVE_ERROR);
    let mut pvalue = 0.0;
    let mut all_tables = true;
    for x in hyper.min()..=hyper.max() {
        let p = hyper.pmf(x);
        if p <= observed {
            pvalue += p;
        } else {
            all_tables = false;
        }
    }
    // every table is at least as extreme, e.g. if the observed one is the mode
    if all_tables {
        return 1.0;
    }
    pvalue.min(1.0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn domain() {
        let hyper = Hypergeometric::new(10, 15, 15, 10);
        assert_eq!(hyper.population, 50);
        assert_eq!(hyper.successes, 25);
        assert_eq!(hyper.draws, 25);
        assert_eq!(hyper.min(), 0);
        assert_eq!(hyper.max(), 25);

        let hyper = Hypergeometric::new(30, 0, 10, 10);
        assert_eq!(hyper.min(), 20);
        assert_eq!(hyper.max(), 30);
    }

    #[test]
    fn pmf_sums_to_one() {
        let hyper = Hypergeometric::new(3, 17, 8, 12);
        let total: f64 = (hyper.min()..=hyper.max()).map(|x| hyper.pmf(x)).sum();
        assert!((total - 1.0).abs() < 1e-10);
        assert!(hyper.pmf(hyper.max() + 1) < f64::EPSILON);
    }

    #[test]
    fn tea_tasting() {
        // Fisher's lady tasting tea
        assert!((two_tailed_p_value(3, 1, 1, 3) - 0.485_714_285_714_285_7).abs() < 1e-12);
        assert!((two_tailed_p_value(4, 0, 0, 4) - 0.028_571_428_571_428_5).abs() < 1e-12);
    }

    #[test]
    fn symmetric() {
        let p1 = two_tailed_p_value(5, 45, 10, 40);
        let p2 = two_tailed_p_value(10, 40, 5, 45);
        assert!((p1 - p2).abs() < 1e-12);
        assert!(p1 > 0.0 && p1 < 1.0);
    }

    #[test]
    fn equal_proportions() {
        assert!((two_tailed_p_value(3, 37, 3, 37) - 1.0).abs() < f64::EPSILON);
        assert!((two_tailed_p_value(2, 18, 2, 18) - 1.0).abs() < f64::EPSILON);
        assert!(two_tailed_p_value(3, 37, 4, 36) <= 1.0);
    }

    #[test]
    fn degenerate_tables() {
        assert!((two_tailed_p_value(0, 0, 0, 0) - 1.0).abs() < f64::EPSILON);
        assert!((two_tailed_p_value(0, 10, 0, 10) - 1.0).abs() < 1e-12);
        assert!((two_tailed_p_value(3, 0, 0, 0) - 1.0).abs() < 1e-12);
    }
}
