//! Statistical comparison of two groups
//!
//! This module calculates which protein changes are mutated significantly
//! more often in one of two groups. For every protein change the mutated
//! patients of both groups are compared with Fisher's exact test and the
//! p-values are corrected for multiple testing with the Benjamini-Hochberg
//! procedure.
//!
//! At the moment, `groupcomp` provides only mutation enrichment on the
//! protein change level.
use std::cmp::Ordering;
use std::collections::HashMap;

mod fisher;
mod mutation;
mod qvalue;

pub use fisher::two_tailed_p_value;
pub use mutation::{
    compute_enrichment, group_by_protein_change, GroupedMutations, MutationEnrichmentGroup,
    MutationRecord,
};
pub use qvalue::q_values;

use crate::SIGNIFICANT_QVALUE_THRESHOLD;

/// The comparison of one protein change between two groups
///
/// The row is created by [`compute_enrichment`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentRow {
    protein_change: String,
    group_a_mutated_count: u64,
    group_b_mutated_count: u64,
    group_a_mutated_percentage: f64,
    group_b_mutated_percentage: f64,
    log_ratio: f64,
    p_value: f64,
    q_value: f64,
    enriched_group: String,
}

impl EnrichmentRow {
    pub fn protein_change(&self) -> &str {
        &self.protein_change
    }

    /// The number of distinct mutated patients in the first group
    pub fn group_a_mutated_count(&self) -> u64 {
        self.group_a_mutated_count
    }

    /// The number of distinct mutated patients in the second group
    pub fn group_b_mutated_count(&self) -> u64 {
        self.group_b_mutated_count
    }

    /// Percentage of profiled patients of the first group that are mutated
    pub fn group_a_mutated_percentage(&self) -> f64 {
        self.group_a_mutated_percentage
    }

    /// Percentage of profiled patients of the second group that are mutated
    pub fn group_b_mutated_percentage(&self) -> f64 {
        self.group_b_mutated_percentage
    }

    /// `log2` of the ratio of both mutated percentages
    ///
    /// The value is `inf` if only the first group is mutated, `-inf` if only
    /// the second group is mutated and `NaN` if neither percentage is defined
    /// or both are `0`.
    pub fn log_ratio(&self) -> f64 {
        self.log_ratio
    }

    /// The two-tailed p-value of Fisher's exact test
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// The Benjamini-Hochberg corrected p-value
    pub fn q_value(&self) -> f64 {
        self.q_value
    }

    /// The label of the group the protein change is enriched in
    ///
    /// This is the first group if the log ratio is positive. In every
    /// other case, including a ratio of exactly `0` and `NaN`, it is the
    /// second group.
    pub fn enriched_group(&self) -> &str {
        &self.enriched_group
    }

    /// Returns `true` if the q-value is below [`SIGNIFICANT_QVALUE_THRESHOLD`]
    pub fn is_significant(&self) -> bool {
        self.q_value < SIGNIFICANT_QVALUE_THRESHOLD
    }

    /// Orders rows by descending log ratio, rows with a `NaN` ratio last
    ///
    /// Use it with `sort_by`:
    ///
    /// ```ignore
    /// rows.sort_by(EnrichmentRow::cmp_log_ratio);
    /// ```
    pub fn cmp_log_ratio(&self, other: &Self) -> Ordering {
        match (self.log_ratio.is_nan(), other.log_ratio.is_nan()) {
            (false, false) => other.log_ratio.total_cmp(&self.log_ratio),
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (true, true) => Ordering::Equal,
        }
    }
}

/// The enrichment of all protein changes
///
/// Rows are kept in ascending order of their p-value, rows with equal
/// p-values in alphabetical order of the protein change.
#[derive(Debug, Clone, Default)]
pub struct MutationEnrichment {
    rows: Vec<EnrichmentRow>,
    index: HashMap<String, usize>,
}

impl MutationEnrichment {
    fn new(rows: Vec<EnrichmentRow>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.protein_change.clone(), idx))
            .collect();
        Self { rows, index }
    }

    /// Returns the row of the protein change
    pub fn get(&self, protein_change: &str) -> Option<&EnrichmentRow> {
        self.index.get(protein_change).map(|idx| &self.rows[*idx])
    }

    /// Iterates all rows, most significant first
    pub fn iter(&self) -> std::slice::Iter<'_, EnrichmentRow> {
        self.rows.iter()
    }

    /// Iterates the rows with a significant q-value
    pub fn significant(&self) -> impl Iterator<Item = &EnrichmentRow> {
        self.rows.iter().filter(|row| row.is_significant())
    }

    /// Returns the number of protein changes
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no protein changes
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the rows, most significant first
    pub fn into_rows(self) -> Vec<EnrichmentRow> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a MutationEnrichment {
    type Item = &'a EnrichmentRow;
    type IntoIter = std::slice::Iter<'a, EnrichmentRow>;
    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Counts are far below `2^52`, so the conversion is exact
#[allow(clippy::cast_precision_loss)]
fn f64_from_u64(n: u64) -> f64 {
    n as f64
}

#[allow(clippy::cast_precision_loss)]
fn f64_from_usize(n: usize) -> f64 {
    n as f64
}
