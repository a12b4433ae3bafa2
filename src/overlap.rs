//! Cases that belong to more than one group
//!
//! A sample or patient that is a member of two or more selected groups
//! would be counted on both sides of a comparison. Those cases are
//! removed from every group before any statistics are calculated.
//!
//! Removing the overlap can leave a group without any cases. Such a group
//! does not take part in the comparison at all, so the cases it shares
//! with other groups are no longer overlapping. [`resolve_overlap`]
//! therefore removes empty groups one at a time and re-evaluates the
//! overlap until no group is left empty.
use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::case::{CaseKind, PatientLevel, SampleLevel};
use crate::group::CaseGroup;
use crate::keyed::{KeyedCounter, KeyedSet};
use crate::study::{self, overlap_filtered_studies};
use crate::{PatientIdentifier, SampleIdentifier};

/// Returns the cases that appear in at least two of the groups
///
/// A case listed repeatedly within one group counts once for that group.
fn overlapping<K: CaseKind, G: CaseGroup>(groups: &[G]) -> Vec<K::Identifier> {
    let mut counter = KeyedCounter::new();
    for group in groups {
        let cases: KeyedSet<K::Identifier> = K::identifiers(group.studies()).into_iter().collect();
        for case in &cases {
            counter.increment(case.clone());
        }
    }
    let overlap: Vec<K::Identifier> = counter.at_least(2).cloned().collect();
    trace!("{} of {} {}s are overlapping", overlap.len(), counter.len(), K::NAME);
    overlap
}

/// Returns the samples that are part of at least two groups
///
/// The order of the returned samples is not defined.
///
/// # Examples
///
/// ```
/// use groupcomp::overlap::overlapping_samples;
/// use groupcomp::group::{ComparisonGroup, SessionGroup};
/// use groupcomp::study::SessionStudy;
/// use groupcomp::{Sample, SampleIdentifier, SampleIndex};
///
/// let index = SampleIndex::new(
///     (1..=4).map(|i| Sample::new("S1", format!("s{i}"), format!("p{i}")))
/// );
/// let group = |uid: &str, samples: &[&str]| {
///     let study = SessionStudy::new("S1", samples.iter().map(|s| s.to_string()).collect());
///     ComparisonGroup::from_session(uid, uid, "black", &SessionGroup::new(uid, vec![study]), &index)
/// };
///
/// let groups = vec![group("A", &["s1", "s2", "s3"]), group("B", &["s2", "s3", "s4"])];
/// let mut overlap = overlapping_samples(&groups);
/// overlap.sort();
/// assert_eq!(overlap, vec![SampleIdentifier::new("S1", "s2"), SampleIdentifier::new("S1", "s3")]);
/// ```
pub fn overlapping_samples<G: CaseGroup>(groups: &[G]) -> Vec<SampleIdentifier> {
    overlapping::<SampleLevel, G>(groups)
}

/// Returns the patients that are part of at least two groups
///
/// The order of the returned patients is not defined.
pub fn overlapping_patients<G: CaseGroup>(groups: &[G]) -> Vec<PatientIdentifier> {
    overlapping::<PatientLevel, G>(groups)
}

/// Returns copies of the groups with all overlapping cases removed
pub fn overlap_filtered_groups<G: CaseGroup>(
    groups: &[G],
    samples: &KeyedSet<SampleIdentifier>,
    patients: &KeyedSet<PatientIdentifier>,
) -> Vec<G> {
    groups
        .iter()
        .map(|group| group.with_studies(overlap_filtered_studies(group.studies(), samples, patients)))
        .collect()
}

/// The overlap between one set of candidate groups
#[derive(Debug, Default)]
struct Overlap {
    samples: Vec<SampleIdentifier>,
    patients: Vec<PatientIdentifier>,
    samples_set: KeyedSet<SampleIdentifier>,
    patients_set: KeyedSet<PatientIdentifier>,
}

impl Overlap {
    fn new<G: CaseGroup>(groups: &[G]) -> Self {
        let samples = overlapping_samples(groups);
        let patients = overlapping_patients(groups);
        Self {
            samples_set: samples.iter().cloned().collect(),
            patients_set: patients.iter().cloned().collect(),
            samples,
            patients,
        }
    }

    /// Returns `true` if the group has no cases outside of the overlap
    fn empties<G: CaseGroup>(&self, group: &G) -> bool {
        study::is_empty(&overlap_filtered_studies(
            group.studies(),
            &self.samples_set,
            &self.patients_set,
        ))
    }
}

/// All cases that were overlapping in any iteration
///
/// A case stays in here even after the group that caused the
/// overlap was removed.
#[derive(Debug, Default)]
struct TotalOverlap {
    samples: KeyedSet<SampleIdentifier>,
    patients: KeyedSet<PatientIdentifier>,
}

impl TotalOverlap {
    fn record(&mut self, overlap: &Overlap) {
        self.samples.extend(overlap.samples.iter().cloned());
        self.patients.extend(overlap.patients.iter().cloned());
    }
}

/// Calculates the overlap for one set of candidates
///
/// Returns the overlap and, if removing it empties any candidate,
/// the index of the last emptied candidate.
fn iterate<G: CaseGroup>(candidates: &[G], total: &mut TotalOverlap) -> (Overlap, Option<usize>) {
    let overlap = Overlap::new(candidates);
    total.record(&overlap);
    let emptied = candidates.iter().rposition(|group| overlap.empties(group));
    (overlap, emptied)
}

/// The result of [`resolve_overlap`]
#[derive(Debug)]
pub struct OverlapResult<G> {
    groups: Vec<G>,
    overlapping_samples: Vec<SampleIdentifier>,
    overlapping_patients: Vec<PatientIdentifier>,
    overlapping_samples_set: KeyedSet<SampleIdentifier>,
    overlapping_patients_set: KeyedSet<PatientIdentifier>,
    total_overlapping_samples: KeyedSet<SampleIdentifier>,
    total_overlapping_patients: KeyedSet<PatientIdentifier>,
    excluded_from_analysis: HashSet<String>,
    iterations: usize,
}

impl<G: CaseGroup> OverlapResult<G> {
    /// All selected groups in their input order
    ///
    /// Every group has its overlapping cases removed. Groups that were
    /// excluded from the analysis are filtered by the overlap of the
    /// iteration that emptied them, so they are empty.
    pub fn groups(&self) -> &[G] {
        &self.groups
    }

    /// The groups that take part in the analysis, without overlapping cases
    pub fn active_groups(&self) -> impl Iterator<Item = &G> {
        self.groups
            .iter()
            .filter(move |group| !self.excluded_from_analysis.contains(group.uid()))
    }

    /// Samples shared by the remaining groups
    pub fn overlapping_samples(&self) -> &[SampleIdentifier] {
        &self.overlapping_samples
    }

    /// Patients shared by the remaining groups
    pub fn overlapping_patients(&self) -> &[PatientIdentifier] {
        &self.overlapping_patients
    }

    pub fn overlapping_samples_set(&self) -> &KeyedSet<SampleIdentifier> {
        &self.overlapping_samples_set
    }

    pub fn overlapping_patients_set(&self) -> &KeyedSet<PatientIdentifier> {
        &self.overlapping_patients_set
    }

    /// Samples that were overlapping in any iteration
    pub fn total_overlapping_samples(&self) -> &KeyedSet<SampleIdentifier> {
        &self.total_overlapping_samples
    }

    /// Patients that were overlapping in any iteration
    pub fn total_overlapping_patients(&self) -> &KeyedSet<PatientIdentifier> {
        &self.total_overlapping_patients
    }

    /// Number of distinct samples that were overlapping in any iteration
    pub fn total_sample_overlap(&self) -> usize {
        self.total_overlapping_samples.len()
    }

    /// Number of distinct patients that were overlapping in any iteration
    pub fn total_patient_overlap(&self) -> usize {
        self.total_overlapping_patients.len()
    }

    /// The uids of groups that were emptied by the overlap
    pub fn excluded_from_analysis(&self) -> &HashSet<String> {
        &self.excluded_from_analysis
    }

    /// Returns `true` if the group with `uid` was excluded from the analysis
    pub fn is_excluded(&self, uid: &str) -> bool {
        self.excluded_from_analysis.contains(uid)
    }

    /// The number of times the overlap was calculated
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

/// Removes the overlap between the selected groups
///
/// Only groups whose name passes `is_selected` are considered. The
/// overlap of the candidates is calculated and removed from each group.
/// If that leaves any group empty, the last of those groups is excluded
/// from the analysis and the overlap is calculated again, until
/// no candidate is emptied anymore.
///
/// ```mermaid
/// graph TD
///     A[Selected groups] --> B[Count cases across candidates]
///     B --> C[Overlap: cases in 2+ groups]
///     C --> D{Any candidate empty<br/>without overlap?}
///     D -->|yes| E[Exclude last empty candidate]
///     E --> B
///     D -->|no| F[Remove overlap from remaining groups]
/// ```
///
/// Every iteration except the last one excludes a group, so the overlap
/// is calculated at most once per selected group.
///
/// # Examples
///
/// ```
/// use groupcomp::overlap::resolve_overlap;
/// use groupcomp::group::{CaseGroup, ComparisonGroup, SessionGroup};
/// use groupcomp::study::SessionStudy;
/// use groupcomp::{Sample, SampleIndex};
///
/// let index = SampleIndex::new(
///     (1..=4).map(|i| Sample::new("S1", format!("s{i}"), format!("p{i}")))
/// );
/// let group = |uid: &str, samples: &[&str]| {
///     let study = SessionStudy::new("S1", samples.iter().map(|s| s.to_string()).collect());
///     ComparisonGroup::from_session(uid, uid, "black", &SessionGroup::new(uid, vec![study]), &index)
/// };
///
/// let groups = vec![
///     group("A", &["s1", "s2", "s3"]),
///     group("B", &["s2", "s3", "s4"]),
///     group("C", &["s2", "s3"]),
/// ];
///
/// let result = resolve_overlap(&groups, |_| true);
/// assert_eq!(result.total_sample_overlap(), 2);
/// assert!(result.is_excluded("C"));
/// assert_eq!(result.groups()[0].studies()[0].samples(), &["s1"]);
/// assert_eq!(result.groups()[1].studies()[0].samples(), &["s4"]);
/// ```
#[cfg_attr(doc, aquamarine::aquamarine)]
pub fn resolve_overlap<G, F>(groups: &[G], is_selected: F) -> OverlapResult<G>
where
    G: CaseGroup,
    F: Fn(&str) -> bool,
{
    let mut candidates: Vec<G> = groups
        .iter()
        .filter(|group| is_selected(group.name()))
        .cloned()
        .collect();

    let mut total = TotalOverlap::default();
    let mut overlap = Overlap::default();
    let mut removed: Vec<G> = Vec::new();
    let mut iterations = 0usize;

    while !candidates.is_empty() {
        iterations += 1;
        let (current, emptied) = iterate(&candidates, &mut total);
        debug!(
            "Overlap iteration {}: {} candidates, {} samples and {} patients overlapping",
            iterations,
            candidates.len(),
            current.samples.len(),
            current.patients.len()
        );
        if let Some(idx) = emptied {
            let group = candidates.remove(idx);
            trace!("Excluding empty group {}", group.uid());
            removed.push(group.with_studies(overlap_filtered_studies(
                group.studies(),
                &current.samples_set,
                &current.patients_set,
            )));
        }
        overlap = current;
        if emptied.is_none() {
            break;
        }
    }

    let excluded_from_analysis: HashSet<String> =
        removed.iter().map(|group| group.uid().to_string()).collect();

    let mut sort_order: HashMap<&str, usize> = HashMap::with_capacity(groups.len());
    for (idx, group) in groups.iter().enumerate() {
        sort_order.entry(group.uid()).or_insert(idx);
    }

    let mut result_groups =
        overlap_filtered_groups(&candidates, &overlap.samples_set, &overlap.patients_set);
    result_groups.append(&mut removed);
    result_groups.sort_by_key(|group| sort_order.get(group.uid()).copied());

    OverlapResult {
        groups: result_groups,
        overlapping_samples: overlap.samples,
        overlapping_patients: overlap.patients,
        overlapping_samples_set: overlap.samples_set,
        overlapping_patients_set: overlap.patients_set,
        total_overlapping_samples: total.samples,
        total_overlapping_patients: total.patients,
        excluded_from_analysis,
        iterations,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::group::{group, SessionGroup, StudyViewComparisonGroup};
    use crate::study::{study, SessionStudy};
    use crate::{Sample, SampleIndex};

    fn session_group(
        uid: &str,
        studies: Vec<SessionStudy>,
        index: &SampleIndex,
    ) -> StudyViewComparisonGroup {
        StudyViewComparisonGroup::from_session(uid, &SessionGroup::new(uid, studies), index, false)
    }

    fn samples_of(result: &OverlapResult<StudyViewComparisonGroup>, idx: usize) -> Vec<String> {
        result.groups()[idx]
            .studies()
            .iter()
            .flat_map(|s| s.samples().iter().cloned())
            .collect()
    }

    #[test]
    fn overlapping_cases() {
        let groups = vec![
            group("A", vec![study("S1", &["s1", "s2", "s3"], &["p1", "p2"])]),
            group("B", vec![study("S1", &["s2", "s3", "s4"], &["p2"])]),
        ];
        let mut samples = overlapping_samples(&groups);
        samples.sort();
        assert_eq!(
            samples,
            vec![SampleIdentifier::new("S1", "s2"), SampleIdentifier::new("S1", "s3")]
        );
        assert_eq!(
            overlapping_patients(&groups),
            vec![PatientIdentifier::new("S1", "p2")]
        );
    }

    #[test]
    fn same_case_id_in_different_studies() {
        let groups = vec![
            group("A", vec![study("S1", &["s1"], &[])]),
            group("B", vec![study("S2", &["s1"], &[])]),
        ];
        assert!(overlapping_samples(&groups).is_empty());
    }

    #[test]
    fn no_groups() {
        let groups: Vec<StudyViewComparisonGroup> = Vec::new();
        let result = resolve_overlap(&groups, |_| true);
        assert!(result.groups().is_empty());
        assert_eq!(result.iterations(), 0);
        assert_eq!(result.total_sample_overlap(), 0);
    }

    #[test]
    fn two_groups() {
        let groups = vec![
            group("A", vec![study("S1", &["s1", "s2", "s3"], &[])]),
            group("B", vec![study("S1", &["s2", "s3", "s4"], &[])]),
        ];
        let result = resolve_overlap(&groups, |_| true);
        assert_eq!(samples_of(&result, 0), vec!["s1"]);
        assert_eq!(samples_of(&result, 1), vec!["s4"]);
        assert_eq!(result.total_sample_overlap(), 2);
        assert!(result.excluded_from_analysis().is_empty());
        assert_eq!(result.iterations(), 1);
    }

    #[test]
    fn contained_group_is_excluded() {
        let groups = vec![
            group("A", vec![study("S1", &["s1", "s2", "s3"], &[])]),
            group("B", vec![study("S1", &["s2", "s3", "s4"], &[])]),
            group("C", vec![study("S1", &["s2", "s3"], &[])]),
        ];
        let result = resolve_overlap(&groups, |_| true);

        let uids: Vec<&str> = result.groups().iter().map(|g| g.uid()).collect();
        assert_eq!(uids, vec!["A", "B", "C"]);
        assert_eq!(samples_of(&result, 0), vec!["s1"]);
        assert_eq!(samples_of(&result, 1), vec!["s4"]);
        // excluded groups are returned without the overlap that emptied them
        assert!(result.groups()[2].is_empty());
        assert!(samples_of(&result, 2).is_empty());

        assert_eq!(result.excluded_from_analysis().len(), 1);
        assert!(result.is_excluded("C"));
        let active: Vec<&str> = result.active_groups().map(|g| g.uid()).collect();
        assert_eq!(active, vec!["A", "B"]);
        assert_eq!(result.iterations(), 2);
    }

    #[test]
    fn overlap_with_excluded_group_is_released() {
        let groups = vec![
            group("A", vec![study("S1", &["s1", "s2"], &[])]),
            group("C", vec![study("S1", &["s2"], &[])]),
        ];
        let result = resolve_overlap(&groups, |_| true);
        assert!(result.is_excluded("C"));
        // once C is gone, s2 is not shared anymore
        assert_eq!(samples_of(&result, 0), vec!["s1", "s2"]);
        assert!(result.overlapping_samples().is_empty());
        assert_eq!(result.total_sample_overlap(), 1);
        assert!(result
            .total_overlapping_samples()
            .has(&SampleIdentifier::new("S1", "s2")));
    }

    #[test]
    fn repeated_sample_within_one_group() {
        let index = SampleIndex::new(vec![Sample::new("S1", "s1", "p1"), Sample::new("S1", "s2", "p2")]);
        let groups = vec![
            session_group("A", vec![SessionStudy::new("S1", vec!["s1".into(), "s1".into()])], &index),
            session_group("B", vec![SessionStudy::new("S1", vec!["s2".into()])], &index),
        ];
        assert!(overlapping_samples(&groups).is_empty());

        let result = resolve_overlap(&groups, |_| true);
        assert_eq!(result.total_sample_overlap(), 0);
        assert_eq!(result.groups()[0].studies()[0].samples(), &["s1"]);
    }

    #[test]
    fn study_listed_twice_within_one_group() {
        let index = SampleIndex::new(vec![
            Sample::new("S1", "s1", "p1"),
            Sample::new("S1", "s2", "p1"),
            Sample::new("S1", "s3", "p3"),
        ]);
        let groups = vec![
            session_group(
                "A",
                vec![
                    SessionStudy::new("S1", vec!["s1".into()]),
                    SessionStudy::new("S1", vec!["s2".into()]),
                ],
                &index,
            ),
            session_group("B", vec![SessionStudy::new("S1", vec!["s3".into()])], &index),
        ];
        assert!(overlapping_patients(&groups).is_empty());

        let result = resolve_overlap(&groups, |_| true);
        assert_eq!(result.total_patient_overlap(), 0);
        assert_eq!(result.groups()[0].studies()[0].patients(), &["p1"]);
    }

    #[test]
    fn repeated_case_in_hand_built_group() {
        let groups = vec![
            group("A", vec![study("S1", &["s1"], &["p1"]), study("S1", &["s1"], &["p1"])]),
            group("B", vec![study("S1", &["s2"], &["p2"])]),
        ];
        assert!(overlapping_samples(&groups).is_empty());
        assert!(overlapping_patients(&groups).is_empty());
    }

    #[test]
    fn identical_groups_remove_the_last_one() {
        let groups = vec![
            group("A", vec![study("S1", &["s1"], &["p1"])]),
            group("B", vec![study("S1", &["s1"], &["p1"])]),
        ];
        let result = resolve_overlap(&groups, |_| true);
        assert!(result.is_excluded("B"));
        assert!(!result.is_excluded("A"));
        assert_eq!(samples_of(&result, 0), vec!["s1"]);
        assert_eq!(result.total_patient_overlap(), 1);
    }

    #[test]
    fn group_without_studies_is_removed_first() {
        let groups = vec![
            group("A", vec![study("S1", &["s1"], &[])]),
            group("E", vec![]),
            group("B", vec![study("S1", &["s2"], &[])]),
        ];
        let result = resolve_overlap(&groups, |_| true);
        assert_eq!(result.iterations(), 2);
        assert!(result.is_excluded("E"));
        assert_eq!(result.active_groups().count(), 2);
    }

    #[test]
    fn unselected_groups_are_ignored() {
        let groups = vec![
            group("A", vec![study("S1", &["s1", "s2"], &[])]),
            group("B", vec![study("S1", &["s2", "s3"], &[])]),
            group("C", vec![study("S1", &["s1", "s3"], &[])]),
        ];
        let result = resolve_overlap(&groups, |name| name != "C");
        let uids: Vec<&str> = result.groups().iter().map(|g| g.uid()).collect();
        assert_eq!(uids, vec!["A", "B"]);
        assert_eq!(samples_of(&result, 0), vec!["s1"]);
        assert_eq!(samples_of(&result, 1), vec!["s3"]);
    }

    #[test]
    fn every_selected_group_is_accounted_for() {
        let groups: Vec<StudyViewComparisonGroup> = (0..8)
            .map(|i| {
                let samples: Vec<String> = (i..i + 3).map(|s| format!("s{}", s % 6)).collect();
                let samples: Vec<&str> = samples.iter().map(String::as_str).collect();
                group(&format!("g{i}"), vec![study("S1", &samples, &[])])
            })
            .collect();
        let result = resolve_overlap(&groups, |_| true);
        assert!(result.iterations() <= groups.len());
        assert_eq!(
            result.active_groups().count() + result.excluded_from_analysis().len(),
            groups.len()
        );
        assert_eq!(result.groups().len(), groups.len());
    }
}
