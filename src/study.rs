//! Per-study lists of samples and patients
//!
//! A group is scoped to one or more studies. For each study it lists the
//! ids of its samples and patients in a [`StudyCases`]. Study lists never
//! contain a study without any cases.
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::case::{CaseKind, SampleLevel};
use crate::index::SampleIndex;
use crate::keyed::{KeyedGroups, KeyedSet};
use crate::{PatientIdentifier, SampleIdentifier};

mod algebra;
pub use algebra::{
    exclude, exclude_patients, exclude_samples, intersect, intersect_patients,
    intersect_samples, union, union_patients, union_samples,
};

/// The samples and patients of one study that belong to a group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyCases {
    id: String,
    samples: Vec<String>,
    patients: Vec<String>,
}

impl StudyCases {
    /// Constructs a new [`StudyCases`]
    pub fn new(id: String, samples: Vec<String>, patients: Vec<String>) -> Self {
        Self {
            id,
            samples,
            patients,
        }
    }

    /// The study id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The sample ids of the study
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// The patient ids of the study
    pub fn patients(&self) -> &[String] {
        &self.patients
    }

    /// Returns `true` if the study has neither samples nor patients
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.patients.is_empty()
    }
}

/// A study as stored in a persisted group definition
///
/// Only samples are persisted, patients are derived from the [`SampleIndex`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStudy {
    id: String,
    samples: Vec<String>,
}

impl SessionStudy {
    /// Constructs a new [`SessionStudy`]
    pub fn new<S: Into<String>>(id: S, samples: Vec<String>) -> Self {
        Self {
            id: id.into(),
            samples,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }
}

/// Returns `true` if none of the studies has a sample or a patient
pub fn is_empty(studies: &[StudyCases]) -> bool {
    studies.iter().all(StudyCases::is_empty)
}

/// Returns the number of samples in all studies
pub fn num_samples(studies: &[StudyCases]) -> usize {
    studies.iter().map(|study| study.samples.len()).sum()
}

/// Returns the number of samples in all studies that pass `filter`
///
/// `filter` receives the study id and the sample id.
pub fn num_samples_where<F>(studies: &[StudyCases], filter: F) -> usize
where
    F: Fn(&str, &str) -> bool,
{
    studies
        .iter()
        .map(|study| {
            study
                .samples
                .iter()
                .filter(|sample_id| filter(study.id.as_str(), sample_id.as_str()))
                .count()
        })
        .sum()
}

/// Returns the number of patients in all studies
pub fn num_patients(studies: &[StudyCases]) -> usize {
    studies.iter().map(|study| study.patients.len()).sum()
}

/// Keeps only the samples that pass `filter`
///
/// The result is a sample-level study list, studies without any
/// remaining samples are removed.
pub fn filter_studies<F>(studies: &[StudyCases], filter: F) -> Vec<StudyCases>
where
    F: Fn(&SampleIdentifier) -> bool,
{
    studies
        .iter()
        .filter_map(|study| {
            let samples: Vec<String> = study
                .samples
                .iter()
                .filter(|sample_id| filter(&SampleIdentifier::new(study.id(), sample_id.as_str())))
                .cloned()
                .collect();
            if samples.is_empty() {
                None
            } else {
                Some(SampleLevel::study(study.id.clone(), samples))
            }
        })
        .collect()
}

/// Removes all samples and patients that are part of the overlap
///
/// Studies that end up without any samples or patients are removed.
pub fn overlap_filtered_studies(
    studies: &[StudyCases],
    overlapping_samples: &KeyedSet<SampleIdentifier>,
    overlapping_patients: &KeyedSet<PatientIdentifier>,
) -> Vec<StudyCases> {
    studies
        .iter()
        .filter_map(|study| {
            let samples: Vec<String> = study
                .samples
                .iter()
                .filter(|id| {
                    !overlapping_samples.has(&SampleIdentifier::new(study.id(), id.as_str()))
                })
                .cloned()
                .collect();
            let patients: Vec<String> = study
                .patients
                .iter()
                .filter(|id| {
                    !overlapping_patients.has(&PatientIdentifier::new(study.id(), id.as_str()))
                })
                .cloned()
                .collect();
            let filtered = StudyCases::new(study.id.clone(), samples, patients);
            if filtered.is_empty() {
                None
            } else {
                Some(filtered)
            }
        })
        .collect()
}

/// Resolves persisted studies against the live [`SampleIndex`]
///
/// - Entries of the same study are merged and repeated samples are listed once
/// - Samples that no longer exist are dropped and returned separately
/// - The distinct patients of the remaining samples are added
/// - Studies without any remaining cases are removed
///
/// # Examples
///
/// ```
/// use groupcomp::study::{finalize_studies, SessionStudy};
/// use groupcomp::{Sample, SampleIdentifier, SampleIndex};
///
/// let index = SampleIndex::new(vec![
///     Sample::new("brca", "S1", "P1"),
///     Sample::new("brca", "S2", "P1"),
/// ]);
/// let persisted = vec![SessionStudy::new(
///     "brca",
///     vec!["S1".to_string(), "S2".to_string(), "S9".to_string()],
/// )];
///
/// let (studies, missing) = finalize_studies(&persisted, &index);
/// assert_eq!(studies[0].samples(), &["S1", "S2"]);
/// assert_eq!(studies[0].patients(), &["P1"]);
/// assert_eq!(missing, vec![SampleIdentifier::new("brca", "S9")]);
/// ```
pub fn finalize_studies(
    studies: &[SessionStudy],
    index: &SampleIndex,
) -> (Vec<StudyCases>, Vec<SampleIdentifier>) {
    let mut non_existent = Vec::new();
    let mut missing_seen = HashSet::new();
    let mut finalized: Vec<StudyCases> = Vec::with_capacity(studies.len());
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(studies.len());
    let mut seen_samples: HashSet<SampleIdentifier> = HashSet::new();
    let mut seen_patients: HashSet<PatientIdentifier> = HashSet::new();

    for study in studies {
        let position = *positions.entry(study.id()).or_insert_with(|| {
            finalized.push(StudyCases::new(study.id.clone(), Vec::new(), Vec::new()));
            finalized.len() - 1
        });
        let cases = &mut finalized[position];
        for sample_id in &study.samples {
            let id = SampleIdentifier::new(study.id(), sample_id.as_str());
            match index.get(&id) {
                Some(sample) => {
                    if !seen_samples.insert(id) {
                        continue;
                    }
                    cases.samples.push(sample_id.clone());
                    if seen_patients.insert(sample.patient()) {
                        cases.patients.push(sample.patient_id().to_string());
                    }
                }
                None => {
                    if missing_seen.insert(id.clone()) {
                        debug!("Sample {} does not exist", id);
                        non_existent.push(id);
                    }
                }
            }
        }
    }
    finalized.retain(|cases| !cases.is_empty());
    (finalized, non_existent)
}

/// Converts a patient-level study list into the samples of those patients
///
/// Patients without known samples contribute nothing, and studies
/// without any resulting sample are removed.
pub fn patients_to_samples(
    studies: &[StudyCases],
    patient_to_samples: &KeyedGroups<PatientIdentifier, String>,
) -> Vec<StudyCases> {
    studies
        .iter()
        .filter_map(|study| {
            let samples: Vec<String> = study
                .patients
                .iter()
                .filter_map(|patient_id| {
                    patient_to_samples.get(&PatientIdentifier::new(study.id(), patient_id.as_str()))
                })
                .flatten()
                .cloned()
                .collect();
            if samples.is_empty() {
                None
            } else {
                Some(SampleLevel::study(study.id.clone(), samples))
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn study(id: &str, samples: &[&str], patients: &[&str]) -> StudyCases {
    StudyCases::new(
        id.to_string(),
        samples.iter().map(|s| s.to_string()).collect(),
        patients.iter().map(|s| s.to_string()).collect(),
    )
}
