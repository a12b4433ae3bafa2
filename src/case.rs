//! Identifiers of samples and patients
//!
//! A sample or patient id is only unique within its study, so every
//! case is identified by the pair of study id and case id.
//!
//! Most operations on groups exist on the sample level as well as the
//! patient level. They are implemented once, generic over a [`CaseKind`],
//! and the two marker types [`SampleLevel`] and [`PatientLevel`] select
//! the level.
use core::fmt::Debug;
use std::fmt::Display;
use std::hash::Hash;

use crate::study::StudyCases;

/// Identifies a sample by its study and sample id
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SampleIdentifier {
    study_id: String,
    sample_id: String,
}

impl SampleIdentifier {
    /// Constructs a new [`SampleIdentifier`]
    pub fn new<S: Into<String>, T: Into<String>>(study_id: S, sample_id: T) -> Self {
        Self {
            study_id: study_id.into(),
            sample_id: sample_id.into(),
        }
    }

    /// The id of the study
    pub fn study_id(&self) -> &str {
        &self.study_id
    }

    /// The id of the sample, unique within the study
    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    /// A string that identifies the sample across all studies
    ///
    /// ```
    /// use groupcomp::SampleIdentifier;
    ///
    /// let id = SampleIdentifier::new("brca", "S-01");
    /// assert_eq!(id.unique_key(), "brca\nS-01");
    /// ```
    pub fn unique_key(&self) -> String {
        unique_key(&self.study_id, &self.sample_id)
    }
}

impl Display for SampleIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.study_id, self.sample_id)
    }
}

/// Identifies a patient by its study and patient id
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PatientIdentifier {
    study_id: String,
    patient_id: String,
}

impl PatientIdentifier {
    /// Constructs a new [`PatientIdentifier`]
    pub fn new<S: Into<String>, T: Into<String>>(study_id: S, patient_id: T) -> Self {
        Self {
            study_id: study_id.into(),
            patient_id: patient_id.into(),
        }
    }

    /// The id of the study
    pub fn study_id(&self) -> &str {
        &self.study_id
    }

    /// The id of the patient, unique within the study
    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// A string that identifies the patient across all studies
    pub fn unique_key(&self) -> String {
        unique_key(&self.study_id, &self.patient_id)
    }
}

impl Display for PatientIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.study_id, self.patient_id)
    }
}

/// Newlines are not allowed in study or case ids
fn unique_key(study_id: &str, case_id: &str) -> String {
    format!("{study_id}\n{case_id}")
}

/// Selects whether an operation works on samples or on patients
///
/// [`StudyCases`] holds both the samples and the patients of a study.
/// A `CaseKind` picks one of the two lists and knows how to build
/// the matching identifier.
pub trait CaseKind {
    /// The composite identifier of one case
    type Identifier: Clone + Debug + Display + Hash + Eq;

    /// Human readable name of the case level, used in logs
    const NAME: &'static str;

    /// Returns the case ids of the study on this level
    fn cases(study: &StudyCases) -> &[String];

    /// Builds a [`StudyCases`] holding only `cases` on this level
    fn study(id: String, cases: Vec<String>) -> StudyCases;

    /// Builds the identifier of a case in a study
    fn identifier(study_id: &str, case_id: &str) -> Self::Identifier;

    /// Returns the identifiers of all cases of the given studies
    fn identifiers(studies: &[StudyCases]) -> Vec<Self::Identifier> {
        studies
            .iter()
            .flat_map(|study| {
                Self::cases(study)
                    .iter()
                    .map(|case_id| Self::identifier(study.id(), case_id))
            })
            .collect()
    }
}

/// Marker for sample-level operations
#[derive(Debug, Clone, Copy)]
pub struct SampleLevel;

/// Marker for patient-level operations
#[derive(Debug, Clone, Copy)]
pub struct PatientLevel;

impl CaseKind for SampleLevel {
    type Identifier = SampleIdentifier;
    const NAME: &'static str = "sample";

    fn cases(study: &StudyCases) -> &[String] {
        study.samples()
    }

    fn study(id: String, cases: Vec<String>) -> StudyCases {
        StudyCases::new(id, cases, Vec::new())
    }

    fn identifier(study_id: &str, case_id: &str) -> SampleIdentifier {
        SampleIdentifier::new(study_id, case_id)
    }
}

impl CaseKind for PatientLevel {
    type Identifier = PatientIdentifier;
    const NAME: &'static str = "patient";

    fn cases(study: &StudyCases) -> &[String] {
        study.patients()
    }

    fn study(id: String, cases: Vec<String>) -> StudyCases {
        StudyCases::new(id, Vec::new(), cases)
    }

    fn identifier(study_id: &str, case_id: &str) -> PatientIdentifier {
        PatientIdentifier::new(study_id, case_id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identifiers_compare_by_value() {
        let a = SampleIdentifier::new("s1", "x");
        let b = SampleIdentifier::new(String::from("s1"), String::from("x"));
        assert_eq!(a, b);
        assert_ne!(a, SampleIdentifier::new("x", "s1"));
    }

    #[test]
    fn display() {
        assert_eq!(SampleIdentifier::new("brca", "S1").to_string(), "brca:S1");
        assert_eq!(PatientIdentifier::new("brca", "P1").to_string(), "brca:P1");
    }

    #[test]
    fn identifiers_of_studies() {
        let studies = vec![
            StudyCases::new("a".into(), vec!["s1".into(), "s2".into()], vec!["p1".into()]),
            StudyCases::new("b".into(), vec!["s1".into()], vec![]),
        ];
        assert_eq!(
            SampleLevel::identifiers(&studies),
            vec![
                SampleIdentifier::new("a", "s1"),
                SampleIdentifier::new("a", "s2"),
                SampleIdentifier::new("b", "s1"),
            ]
        );
        assert_eq!(
            PatientLevel::identifiers(&studies),
            vec![PatientIdentifier::new("a", "p1")]
        );
    }
}
