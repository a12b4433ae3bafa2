//! The live index of existing samples
//!
//! Group definitions are persisted and may reference samples that were
//! removed from the database after the group was created. The
//! [`SampleIndex`] is the source of truth for which samples exist and
//! which patient each sample belongs to.
use std::collections::HashSet;

use crate::keyed::{KeyedGroups, KeyedMap};
use crate::{ComparisonError, ComparisonResult, PatientIdentifier, SampleIdentifier};

/// A sample that exists in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    study_id: String,
    sample_id: String,
    patient_id: String,
}

impl Sample {
    /// Constructs a new [`Sample`]
    pub fn new<S, T, U>(study_id: S, sample_id: T, patient_id: U) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            study_id: study_id.into(),
            sample_id: sample_id.into(),
            patient_id: patient_id.into(),
        }
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

    /// The [`SampleIdentifier`] of the sample
    pub fn identifier(&self) -> SampleIdentifier {
        SampleIdentifier::new(self.study_id.as_str(), self.sample_id.as_str())
    }

    /// The [`PatientIdentifier`] of the patient the sample was taken from
    pub fn patient(&self) -> PatientIdentifier {
        PatientIdentifier::new(self.study_id.as_str(), self.patient_id.as_str())
    }
}

/// Lookup of existing samples by [`SampleIdentifier`]
///
/// # Examples
///
/// ```
/// use groupcomp::{Sample, SampleIdentifier, SampleIndex};
///
/// let index = SampleIndex::new(vec![
///     Sample::new("brca", "S1", "P1"),
///     Sample::new("brca", "S2", "P1"),
/// ]);
///
/// assert!(index.contains(&SampleIdentifier::new("brca", "S1")));
/// assert!(!index.contains(&SampleIdentifier::new("brca", "S3")));
///
/// let patients = index.patient_identifiers(&[
///     SampleIdentifier::new("brca", "S1"),
///     SampleIdentifier::new("brca", "S2"),
/// ]);
/// assert_eq!(patients.len(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct SampleIndex {
    samples: KeyedMap<SampleIdentifier, Sample>,
}

impl SampleIndex {
    /// Builds the index from all existing samples
    ///
    /// If the same sample is listed twice, the last entry wins.
    pub fn new<I: IntoIterator<Item = Sample>>(samples: I) -> Self {
        Self {
            samples: samples
                .into_iter()
                .map(|sample| (sample.identifier(), sample))
                .collect(),
        }
    }

    /// Returns the number of samples in the index
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if the index contains no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the [`Sample`] with the given identifier, if it exists
    pub fn get(&self, id: &SampleIdentifier) -> Option<&Sample> {
        self.samples.get(id)
    }

    /// Returns `true` if the sample exists
    pub fn contains(&self, id: &SampleIdentifier) -> bool {
        self.samples.has(id)
    }

    /// Returns the patient of an existing sample
    ///
    /// # Errors
    ///
    /// [`ComparisonError::DoesNotExist`] if the sample is not in the index
    pub fn patient_of(&self, id: &SampleIdentifier) -> ComparisonResult<PatientIdentifier> {
        self.get(id)
            .map(Sample::patient)
            .ok_or(ComparisonError::DoesNotExist)
    }

    /// Returns the distinct patients of the given samples
    ///
    /// Patients are listed in the order they are first encountered.
    /// Samples that don't exist are skipped.
    pub fn patient_identifiers(&self, samples: &[SampleIdentifier]) -> Vec<PatientIdentifier> {
        let mut seen = HashSet::new();
        samples
            .iter()
            .filter_map(|id| self.get(id))
            .map(Sample::patient)
            .filter(|patient| seen.insert(patient.clone()))
            .collect()
    }

    /// Groups the sample ids of every patient
    pub fn patient_to_samples(&self) -> KeyedGroups<PatientIdentifier, String> {
        let mut groups = KeyedGroups::new();
        for (_, sample) in self.samples.entries() {
            groups.add(sample.patient(), sample.sample_id.clone());
        }
        groups
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn index() -> SampleIndex {
        SampleIndex::new(vec![
            Sample::new("a", "s1", "p1"),
            Sample::new("a", "s2", "p1"),
            Sample::new("a", "s3", "p2"),
            Sample::new("b", "s1", "p1"),
        ])
    }

    #[test]
    fn lookup() {
        let index = index();
        assert_eq!(index.len(), 4);
        assert_eq!(
            index
                .get(&SampleIdentifier::new("a", "s3"))
                .map(Sample::patient_id),
            Some("p2")
        );
        assert!(index.get(&SampleIdentifier::new("b", "s2")).is_none());
    }

    #[test]
    fn patient_of_missing_sample() {
        let index = index();
        assert!(index.patient_of(&SampleIdentifier::new("c", "s1")).is_err());
        assert_eq!(
            index.patient_of(&SampleIdentifier::new("b", "s1")).unwrap(),
            PatientIdentifier::new("b", "p1")
        );
    }

    #[test]
    fn distinct_patients_in_order() {
        let index = index();
        let patients = index.patient_identifiers(&[
            SampleIdentifier::new("a", "s3"),
            SampleIdentifier::new("a", "s1"),
            SampleIdentifier::new("a", "s2"),
            SampleIdentifier::new("x", "s2"),
            SampleIdentifier::new("b", "s1"),
        ]);
        assert_eq!(
            patients,
            vec![
                PatientIdentifier::new("a", "p2"),
                PatientIdentifier::new("a", "p1"),
                PatientIdentifier::new("b", "p1"),
            ]
        );
    }

    #[test]
    fn samples_per_patient() {
        let groups = index().patient_to_samples();
        let mut samples = groups
            .get(&PatientIdentifier::new("a", "p1"))
            .unwrap()
            .to_vec();
        samples.sort();
        assert_eq!(samples, vec!["s1", "s2"]);
        assert_eq!(groups.len(), 3);
    }
}
