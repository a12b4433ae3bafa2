//! Mutation enrichment between two groups
use std::collections::{BTreeSet, HashSet};

use tracing::{debug, trace, warn};

use super::qvalue::cmp_pvalue;
use super::{f64_from_u64, q_values, two_tailed_p_value, EnrichmentRow, MutationEnrichment};
use crate::keyed::{KeyedCounter, KeyedGroups};
use crate::{ComparisonError, ComparisonResult, PatientIdentifier};

/// One mutation of one sample
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MutationRecord {
    protein_change: String,
    study_id: String,
    sample_id: String,
    patient_id: String,
}

impl MutationRecord {
    pub fn new<P, S, T, U>(protein_change: P, study_id: S, sample_id: T, patient_id: U) -> Self
    where
        P: Into<String>,
        S: Into<String>,
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            protein_change: protein_change.into(),
            study_id: study_id.into(),
            sample_id: sample_id.into(),
            patient_id: patient_id.into(),
        }
    }

    /// The protein change, e.g. `V600E`
    pub fn protein_change(&self) -> &str {
        &self.protein_change
    }

    pub fn study_id(&self) -> &str {
        &self.study_id
    }

    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// The patient that carries the mutation
    pub fn patient(&self) -> PatientIdentifier {
        PatientIdentifier::new(self.study_id.as_str(), self.patient_id.as_str())
    }
}

/// Mutation records grouped by their protein change
///
/// Records of the same protein change are merged into one list,
/// independent of the order in which they were added.
#[derive(Debug, Clone, Default)]
pub struct GroupedMutations {
    groups: KeyedGroups<String, MutationRecord>,
}

impl GroupedMutations {
    /// Constructs a new, empty [`GroupedMutations`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record to the list of its protein change
    pub fn add(&mut self, record: MutationRecord) {
        self.groups.add(record.protein_change.clone(), record);
    }

    /// Returns all records of the protein change
    pub fn get(&self, protein_change: &str) -> &[MutationRecord] {
        self.groups
            .get(&protein_change.to_string())
            .unwrap_or_default()
    }

    /// Iterates the distinct protein changes, in no particular order
    pub fn protein_changes(&self) -> impl Iterator<Item = &str> {
        self.groups.entries().map(|(key, _)| key.as_str())
    }

    /// Returns the number of distinct protein changes
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if there are no mutations
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Counts the distinct mutated patients of every protein change
    ///
    /// A patient with several records of the same protein change,
    /// e.g. from multiple samples, is counted once.
    pub fn mutated_counts(&self) -> KeyedCounter<String> {
        let mut counter = KeyedCounter::new();
        for (protein_change, records) in self.groups.entries() {
            let patients: HashSet<PatientIdentifier> =
                records.iter().map(MutationRecord::patient).collect();
            counter.add(protein_change.clone(), patients.len() as u64);
        }
        counter
    }

    /// Counts the records of every protein change
    pub fn mutation_counts(&self) -> KeyedCounter<String> {
        let mut counter = KeyedCounter::new();
        for (protein_change, records) in self.groups.entries() {
            counter.add(protein_change.clone(), records.len() as u64);
        }
        counter
    }
}

impl FromIterator<MutationRecord> for GroupedMutations {
    fn from_iter<I: IntoIterator<Item = MutationRecord>>(iter: I) -> Self {
        let mut grouped = Self::new();
        for record in iter {
            grouped.add(record);
        }
        grouped
    }
}

/// Groups mutation records by their protein change
///
/// # Examples
///
/// ```
/// use groupcomp::stats::{group_by_protein_change, MutationRecord};
///
/// let grouped = group_by_protein_change(vec![
///     MutationRecord::new("V600E", "S1", "s1", "p1"),
///     MutationRecord::new("V600E", "S1", "s2", "p1"),
///     MutationRecord::new("G12D", "S1", "s3", "p2"),
/// ]);
///
/// assert_eq!(grouped.len(), 2);
/// assert_eq!(grouped.get("V600E").len(), 2);
/// assert_eq!(grouped.mutated_counts().get(&"V600E".to_string()), 1);
/// assert_eq!(grouped.mutation_counts().get(&"V600E".to_string()), 2);
/// ```
pub fn group_by_protein_change<I: IntoIterator<Item = MutationRecord>>(
    records: I,
) -> GroupedMutations {
    records.into_iter().collect()
}

/// The mutations of one group and the number of its profiled patients
///
/// `profiled_patients` is the number of patients that were assayed,
/// not only those that carry a mutation.
#[derive(Debug, Clone)]
pub struct MutationEnrichmentGroup {
    label: String,
    profiled_patients: u64,
    mutations: GroupedMutations,
}

impl MutationEnrichmentGroup {
    pub fn new<S: Into<String>>(
        label: S,
        profiled_patients: u64,
        mutations: GroupedMutations,
    ) -> Self {
        Self {
            label: label.into(),
            profiled_patients,
            mutations,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn profiled_patients(&self) -> u64 {
        self.profiled_patients
    }

    pub fn mutations(&self) -> &GroupedMutations {
        &self.mutations
    }
}

/// Returns the mutated patients and the non-mutated profiled patients
fn contingency(mutated: u64, profiled: u64, label: &str, protein_change: &str) -> (u64, u64) {
    if mutated > profiled {
        warn!(
            "{} has {} patients mutated in {}, but only {} profiled patients",
            label, mutated, protein_change, profiled
        );
    }
    (mutated, profiled.saturating_sub(mutated))
}

fn mutated_percentage(mutated: u64, profiled: u64) -> f64 {
    f64_from_u64(mutated) * 100.0 / f64_from_u64(profiled)
}

/// Calculates the enrichment of every protein change between two groups
///
/// Every protein change that is mutated in at least one of the groups is
/// compared with a two-tailed Fisher's exact test on the distinct mutated
/// and non-mutated patients of both groups. The p-values are corrected with
/// [`q_values`](super::q_values).
///
/// A protein change is enriched in the first group if its log ratio is
/// positive and in the second group otherwise. Non-finite log ratios are
/// kept as they are.
///
/// # Errors
///
/// [`ComparisonError::InvalidGroupCount`] unless exactly two groups are given
///
/// # Examples
///
/// ```
/// use groupcomp::stats::{compute_enrichment, GroupedMutations, MutationEnrichmentGroup, MutationRecord};
///
/// let mutations = |n: usize| -> GroupedMutations {
///     (0..n).map(|i| MutationRecord::new("V600E", "S1", format!("s{i}"), format!("p{i}"))).collect()
/// };
///
/// let enrichment = compute_enrichment(&[
///     MutationEnrichmentGroup::new("Group A", 50, mutations(5)),
///     MutationEnrichmentGroup::new("Group B", 50, mutations(10)),
/// ]).unwrap();
///
/// let row = enrichment.get("V600E").unwrap();
/// assert!((row.log_ratio() + 1.0).abs() < f64::EPSILON);
/// assert_eq!(row.enriched_group(), "Group B");
/// ```
pub fn compute_enrichment(
    groups: &[MutationEnrichmentGroup],
) -> ComparisonResult<MutationEnrichment> {
    let [group_a, group_b] = groups else {
        return Err(ComparisonError::InvalidGroupCount(groups.len()));
    };

    let counts_a = group_a.mutations.mutated_counts();
    let counts_b = group_b.mutations.mutated_counts();

    let protein_changes: BTreeSet<&String> = counts_a
        .entries()
        .chain(counts_b.entries())
        .map(|(protein_change, _)| protein_change)
        .collect();

    let mut rows: Vec<EnrichmentRow> = Vec::with_capacity(protein_changes.len());
    for protein_change in protein_changes {
        let mutated_a = counts_a.get(protein_change);
        let mutated_b = counts_b.get(protein_change);

        let (a, b) = contingency(
            mutated_a,
            group_a.profiled_patients,
            &group_a.label,
            protein_change,
        );
        let (c, d) = contingency(
            mutated_b,
            group_b.profiled_patients,
            &group_b.label,
            protein_change,
        );

        let percentage_a = mutated_percentage(mutated_a, group_a.profiled_patients);
        let percentage_b = mutated_percentage(mutated_b, group_b.profiled_patients);
        let log_ratio = (percentage_a / percentage_b).log2();
        let p_value = two_tailed_p_value(a, b, c, d);

        trace!(
            "{}\t{}: {}/{}\t{}: {}/{}\tlog ratio: {}\tp: {}",
            protein_change,
            group_a.label,
            mutated_a,
            group_a.profiled_patients,
            group_b.label,
            mutated_b,
            group_b.profiled_patients,
            log_ratio,
            p_value
        );

        let enriched_group = if log_ratio > 0.0 {
            group_a.label.clone()
        } else {
            group_b.label.clone()
        };

        rows.push(EnrichmentRow {
            protein_change: protein_change.clone(),
            group_a_mutated_count: mutated_a,
            group_b_mutated_count: mutated_b,
            group_a_mutated_percentage: percentage_a,
            group_b_mutated_percentage: percentage_b,
            log_ratio,
            p_value,
            q_value: f64::NAN,
            enriched_group,
        });
    }

    // protein changes are sorted alphabetically, so ties keep that order
    rows.sort_by(|a, b| cmp_pvalue(a.p_value, b.p_value));

    let pvalues: Vec<f64> = rows.iter().map(|row| row.p_value).collect();
    for (row, q_value) in rows.iter_mut().zip(q_values(&pvalues)) {
        row.q_value = q_value;
    }
    debug!(
        "Corrected {} p-values of {} vs {} for multiple testing",
        pvalues.len(),
        group_a.label,
        group_b.label
    );

    Ok(MutationEnrichment::new(rows))
}
