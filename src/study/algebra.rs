//! Union, intersection and exclusion of study lists
//!
//! All operations match studies by their id and work on one [`CaseKind`]
//! at a time. The result only holds cases of that kind, lists each case
//! once and never contains a study without cases.
//!
//! Studies keep the order in which they first appear in the inputs,
//! cases keep the order of the left hand side followed by cases that are
//! only present on the right hand side.
use std::collections::{HashMap, HashSet};

use crate::case::{CaseKind, PatientLevel, SampleLevel};
use crate::study::StudyCases;

/// Case ids per study, in order of first appearance
///
/// Studies that appear multiple times are merged.
struct CasesByStudy<'a> {
    order: Vec<&'a str>,
    cases: HashMap<&'a str, Vec<&'a String>>,
}

impl<'a> CasesByStudy<'a> {
    fn new<K: CaseKind>(studies: &'a [StudyCases]) -> Self {
        let mut order = Vec::new();
        let mut cases: HashMap<&'a str, Vec<&'a String>> = HashMap::new();
        for study in studies {
            let entry = cases.entry(study.id()).or_insert_with(|| {
                order.push(study.id());
                Vec::new()
            });
            entry.extend(K::cases(study));
        }
        Self { order, cases }
    }

    fn get(&self, study_id: &str) -> Option<&[&'a String]> {
        self.cases.get(study_id).map(Vec::as_slice)
    }
}

/// Builds a study from `cases`, skipping duplicates
///
/// Returns `None` if no case is left
fn build<'a, K, I>(study_id: &str, cases: I) -> Option<StudyCases>
where
    K: CaseKind,
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();
    let unique: Vec<String> = cases
        .into_iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect();
    if unique.is_empty() {
        None
    } else {
        Some(K::study(study_id.to_string(), unique))
    }
}

/// Returns all cases that are in `lhs` or in `rhs`
///
/// Studies present on one side only are rebuilt as well, so they lose
/// their cases of the other kind: `union::<SampleLevel>` drops patients.
///
/// # Examples
///
/// ```
/// use groupcomp::case::SampleLevel;
/// use groupcomp::study::{union, StudyCases};
///
/// let lhs = vec![StudyCases::new("a".into(), vec!["s1".into()], vec![])];
/// let rhs = vec![
///     StudyCases::new("a".into(), vec!["s2".into()], vec![]),
///     StudyCases::new("b".into(), vec!["s1".into()], vec![]),
/// ];
///
/// let result = union::<SampleLevel>(&lhs, &rhs);
/// assert_eq!(result[0].samples(), &["s1", "s2"]);
/// assert_eq!(result[1].id(), "b");
/// assert!(result[1].patients().is_empty());
/// ```
pub fn union<K: CaseKind>(lhs: &[StudyCases], rhs: &[StudyCases]) -> Vec<StudyCases> {
    let left = CasesByStudy::new::<K>(lhs);
    let right = CasesByStudy::new::<K>(rhs);

    let mut study_ids = left.order.clone();
    study_ids.extend(
        right
            .order
            .iter()
            .filter(|id| left.get(id).is_none())
            .copied(),
    );

    study_ids
        .into_iter()
        .filter_map(|study_id| {
            let cases = left
                .get(study_id)
                .unwrap_or_default()
                .iter()
                .chain(right.get(study_id).unwrap_or_default().iter())
                .copied();
            build::<K, _>(study_id, cases)
        })
        .collect()
}

/// Returns all cases that are in `lhs` and in `rhs`
///
/// Studies present in only one of the inputs are not part of the result.
pub fn intersect<K: CaseKind>(lhs: &[StudyCases], rhs: &[StudyCases]) -> Vec<StudyCases> {
    let left = CasesByStudy::new::<K>(lhs);
    let right = CasesByStudy::new::<K>(rhs);

    left.order
        .iter()
        .filter_map(|study_id| {
            let other: HashSet<&String> = right.get(study_id)?.iter().copied().collect();
            let cases = left
                .get(study_id)
                .unwrap_or_default()
                .iter()
                .filter(|id| other.contains(*id))
                .copied();
            build::<K, _>(study_id, cases)
        })
        .collect()
}

/// Returns all cases of `lhs` that are not in `rhs`
pub fn exclude<K: CaseKind>(lhs: &[StudyCases], rhs: &[StudyCases]) -> Vec<StudyCases> {
    let left = CasesByStudy::new::<K>(lhs);
    let right = CasesByStudy::new::<K>(rhs);

    left.order
        .iter()
        .filter_map(|study_id| {
            let excluded: HashSet<&String> = right
                .get(study_id)
                .unwrap_or_default()
                .iter()
                .copied()
                .collect();
            let cases = left
                .get(study_id)
                .unwrap_or_default()
                .iter()
                .filter(|id| !excluded.contains(*id))
                .copied();
            build::<K, _>(study_id, cases)
        })
        .collect()
}

/// [`union`] of samples
pub fn union_samples(lhs: &[StudyCases], rhs: &[StudyCases]) -> Vec<StudyCases> {
    union::<SampleLevel>(lhs, rhs)
}

/// [`intersect`] of samples
pub fn intersect_samples(lhs: &[StudyCases], rhs: &[StudyCases]) -> Vec<StudyCases> {
    intersect::<SampleLevel>(lhs, rhs)
}

/// [`exclude`] of samples
pub fn exclude_samples(lhs: &[StudyCases], rhs: &[StudyCases]) -> Vec<StudyCases> {
    exclude::<SampleLevel>(lhs, rhs)
}

/// [`union`] of patients
pub fn union_patients(lhs: &[StudyCases], rhs: &[StudyCases]) -> Vec<StudyCases> {
    union::<PatientLevel>(lhs, rhs)
}

/// [`intersect`] of patients
pub fn intersect_patients(lhs: &[StudyCases], rhs: &[StudyCases]) -> Vec<StudyCases> {
    intersect::<PatientLevel>(lhs, rhs)
}

/// [`exclude`] of patients
pub fn exclude_patients(lhs: &[StudyCases], rhs: &[StudyCases]) -> Vec<StudyCases> {
    exclude::<PatientLevel>(lhs, rhs)
}
