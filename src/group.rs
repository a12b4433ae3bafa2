//! User defined groups of samples and patients
//!
//! Groups come in two flavours: [`ComparisonGroup`]s are used on the
//! group comparison page, [`StudyViewComparisonGroup`]s are the groups
//! listed while browsing a study. Both are resolved against the live
//! [`SampleIndex`] and implement [`CaseGroup`], which is all the
//! overlap and partition logic needs.
use std::collections::HashSet;

use tracing::warn;

use crate::index::SampleIndex;
use crate::study::{self, finalize_studies, SessionStudy, StudyCases};
use crate::{SampleIdentifier, MAX_GROUPS_IN_SESSION};

const ORDINAL_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A named group of cases spread across one or more studies
pub trait CaseGroup: Clone {
    /// Identifier of the group, unique within a session
    fn uid(&self) -> &str;

    /// Display name of the group
    fn name(&self) -> &str;

    /// The cases of the group, per study
    fn studies(&self) -> &[StudyCases];

    /// Returns a copy of the group with different cases
    #[must_use]
    fn with_studies(&self, studies: Vec<StudyCases>) -> Self;

    /// Returns `true` if the group has neither samples nor patients
    fn is_empty(&self) -> bool {
        study::is_empty(self.studies())
    }

    /// Returns the number of samples in the group
    fn num_samples(&self) -> usize {
        study::num_samples(self.studies())
    }

    /// Returns the number of patients in the group
    fn num_patients(&self) -> usize {
        study::num_patients(self.studies())
    }
}

/// A persisted group definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionGroup {
    name: String,
    description: String,
    color: Option<String>,
    studies: Vec<SessionStudy>,
}

impl SessionGroup {
    /// Constructs a new [`SessionGroup`] without description and color
    pub fn new<S: Into<String>>(name: S, studies: Vec<SessionStudy>) -> Self {
        Self {
            name: name.into(),
            studies,
            ..Default::default()
        }
    }

    /// Sets the description of the group
    #[must_use]
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the color of the group
    #[must_use]
    pub fn with_color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn studies(&self) -> &[SessionStudy] {
        &self.studies
    }
}

/// A group on the comparison page
///
/// # Examples
///
/// ```
/// use groupcomp::group::{CaseGroup, ComparisonGroup, SessionGroup};
/// use groupcomp::study::SessionStudy;
/// use groupcomp::{Sample, SampleIndex};
///
/// let index = SampleIndex::new(vec![Sample::new("brca", "S1", "P1")]);
/// let session = SessionGroup::new(
///     "Responders",
///     vec![SessionStudy::new("brca", vec!["S1".into(), "S2".into()])],
/// );
///
/// let group = ComparisonGroup::from_session("g1", "A", "#dc3912", &session, &index);
/// assert_eq!(group.name_with_ordinal(), "(A) Responders");
/// assert_eq!(group.num_samples(), 1);
/// assert_eq!(group.non_existent_samples().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonGroup {
    uid: String,
    name: String,
    description: String,
    color: String,
    ordinal: String,
    name_with_ordinal: String,
    studies: Vec<StudyCases>,
    non_existent_samples: Vec<SampleIdentifier>,
    name_of_enrichment_direction: Option<String>,
}

impl ComparisonGroup {
    /// Resolves a persisted group against the [`SampleIndex`]
    ///
    /// `default_color` is used if the persisted group has no color.
    pub fn from_session(
        uid: &str,
        ordinal: &str,
        default_color: &str,
        session: &SessionGroup,
        index: &SampleIndex,
    ) -> Self {
        let (studies, non_existent_samples) = finalize_studies(&session.studies, index);
        if !non_existent_samples.is_empty() {
            warn!(
                "Group {} references {} samples that no longer exist",
                session.name,
                non_existent_samples.len()
            );
        }
        Self {
            uid: uid.to_string(),
            name: session.name.clone(),
            description: session.description.clone(),
            color: session
                .color
                .clone()
                .unwrap_or_else(|| default_color.to_string()),
            ordinal: ordinal.to_string(),
            name_with_ordinal: format!("({}) {}", ordinal, session.name),
            studies,
            non_existent_samples,
            name_of_enrichment_direction: None,
        }
    }

    /// Sets the label used when a result is enriched in this group
    #[must_use]
    pub fn with_enrichment_direction<S: Into<String>>(mut self, name: S) -> Self {
        self.name_of_enrichment_direction = Some(name.into());
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// The short label of the group, e.g. `A` or `AB`
    pub fn ordinal(&self) -> &str {
        &self.ordinal
    }

    /// The name prefixed by the ordinal, e.g. `(A) Responders`
    pub fn name_with_ordinal(&self) -> &str {
        &self.name_with_ordinal
    }

    /// Samples that are part of the persisted group but don't exist anymore
    pub fn non_existent_samples(&self) -> &[SampleIdentifier] {
        &self.non_existent_samples
    }

    pub fn name_of_enrichment_direction(&self) -> Option<&str> {
        self.name_of_enrichment_direction.as_deref()
    }
}

impl CaseGroup for ComparisonGroup {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn studies(&self) -> &[StudyCases] {
        &self.studies
    }

    fn with_studies(&self, studies: Vec<StudyCases>) -> Self {
        Self {
            studies,
            ..self.clone()
        }
    }
}

/// A group listed in the study view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyViewComparisonGroup {
    uid: String,
    name: String,
    description: String,
    color: Option<String>,
    studies: Vec<StudyCases>,
    non_existent_samples: Vec<SampleIdentifier>,
    is_shared_group: bool,
    has_warning_sign: bool,
}

impl StudyViewComparisonGroup {
    /// Resolves a persisted group against the [`SampleIndex`]
    ///
    /// Groups with samples that no longer exist carry a warning sign.
    pub fn from_session(
        uid: &str,
        session: &SessionGroup,
        index: &SampleIndex,
        is_shared_group: bool,
    ) -> Self {
        let (studies, non_existent_samples) = finalize_studies(&session.studies, index);
        Self {
            uid: uid.to_string(),
            name: session.name.clone(),
            description: session.description.clone(),
            color: session.color.clone(),
            has_warning_sign: !non_existent_samples.is_empty(),
            studies,
            non_existent_samples,
            is_shared_group,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn non_existent_samples(&self) -> &[SampleIdentifier] {
        &self.non_existent_samples
    }

    /// `true` if the group was shared by another user
    pub fn is_shared_group(&self) -> bool {
        self.is_shared_group
    }

    pub fn has_warning_sign(&self) -> bool {
        self.has_warning_sign
    }
}

impl CaseGroup for StudyViewComparisonGroup {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn studies(&self) -> &[StudyCases] {
        &self.studies
    }

    fn with_studies(&self, studies: Vec<StudyCases>) -> Self {
        Self {
            studies,
            ..self.clone()
        }
    }
}

/// Returns `num` short labels to tell groups apart
///
/// The labels count in bijective base `base` using letters as digits:
/// `A`, `B`, ..., `Z`, `AA`, `AB`, ... for base 26.
/// `base` is limited to the 26 letters of the alphabet.
///
/// ```
/// use groupcomp::group::ordinals;
///
/// assert_eq!(ordinals(3, 26), vec!["A", "B", "C"]);
/// assert_eq!(ordinals(28, 26)[26..], ["AA", "AB"]);
/// assert_eq!(ordinals(4, 2), vec!["A", "B", "AA", "AB"]);
/// ```
pub fn ordinals(num: usize, base: usize) -> Vec<String> {
    let base = base.min(ORDINAL_ALPHABET.len());
    if base == 0 {
        return Vec::new();
    }
    (1..=num)
        .map(|mut n| {
            let mut digits = Vec::new();
            while n > 0 {
                n -= 1;
                digits.push(char::from(ORDINAL_ALPHABET[n % base]));
                n /= base;
            }
            digits.iter().rev().collect()
        })
        .collect()
}

/// Returns the groups sorted alphabetically, but with groups named `NA` last
///
/// Names are compared case-insensitive.
pub fn default_group_order<G: CaseGroup>(groups: &[G]) -> Vec<G> {
    let (mut na, mut named): (Vec<G>, Vec<G>) = groups
        .iter()
        .cloned()
        .partition(|group| group.name().to_lowercase() == "na");
    named.sort_by_cached_key(|group| group.name().to_lowercase());
    named.append(&mut na);
    named
}

/// Returns the ids of all studies of the groups, without duplicates
pub fn study_ids<G: CaseGroup>(groups: &[G]) -> Vec<String> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .flat_map(|group| group.studies())
        .filter(|study| seen.insert(study.id()))
        .map(|study| study.id().to_string())
        .collect()
}

/// Returns all samples of the groups, without duplicates
pub fn sample_identifiers<G: CaseGroup>(groups: &[G]) -> Vec<SampleIdentifier> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .flat_map(|group| group.studies())
        .flat_map(|study| {
            study
                .samples()
                .iter()
                .map(|sample_id| SampleIdentifier::new(study.id(), sample_id.as_str()))
        })
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Returns `true` if another group can be added to a session that holds `num_groups`
pub fn can_add_group(num_groups: usize) -> bool {
    num_groups < MAX_GROUPS_IN_SESSION
}

#[cfg(test)]
pub(crate) fn group(uid: &str, studies: Vec<StudyCases>) -> StudyViewComparisonGroup {
    StudyViewComparisonGroup {
        uid: uid.to_string(),
        name: uid.to_string(),
        description: String::new(),
        color: None,
        studies,
        non_existent_samples: Vec::new(),
        is_shared_group: false,
        has_warning_sign: false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::study::study;
    use crate::Sample;

    #[test]
    fn ordinal_labels() {
        assert!(ordinals(0, 26).is_empty());
        assert!(ordinals(3, 0).is_empty());
        let labels = ordinals(703, 26);
        assert_eq!(labels[0], "A");
        assert_eq!(labels[25], "Z");
        assert_eq!(labels[26], "AA");
        assert_eq!(labels[51], "AZ");
        assert_eq!(labels[52], "BA");
        assert_eq!(labels[701], "ZZ");
        assert_eq!(labels[702], "AAA");
    }

    #[test]
    fn na_goes_last() {
        let groups = vec![
            group("na", vec![]),
            group("beta", vec![]),
            group("Alpha", vec![]),
            group("NA", vec![]),
        ];
        let names: Vec<String> = default_group_order(&groups)
            .iter()
            .map(|g| g.name().to_string())
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "na", "NA"]);
    }

    #[test]
    fn from_session_assigns_color() {
        let index = SampleIndex::new(vec![Sample::new("a", "s1", "p1")]);
        let session = SessionGroup::new("g", vec![SessionStudy::new("a", vec!["s1".into()])]);
        let group = ComparisonGroup::from_session("1", "B", "red", &session, &index);
        assert_eq!(group.color(), "red");
        assert_eq!(group.studies(), &[study("a", &["s1"], &["p1"])]);
        assert!(group.non_existent_samples().is_empty());

        let colored = session.clone().with_color("blue");
        let group = ComparisonGroup::from_session("1", "B", "red", &colored, &index);
        assert_eq!(group.color(), "blue");
    }

    #[test]
    fn study_view_group_warns_about_missing_samples() {
        let index = SampleIndex::new(vec![Sample::new("a", "s1", "p1")]);
        let session = SessionGroup::new(
            "g",
            vec![SessionStudy::new("a", vec!["s1".into(), "s2".into()])],
        );
        let group = StudyViewComparisonGroup::from_session("1", &session, &index, true);
        assert!(group.has_warning_sign());
        assert!(group.is_shared_group());
        assert_eq!(group.non_existent_samples(), &[SampleIdentifier::new("a", "s2")]);
    }

    #[test]
    fn with_studies_keeps_identity() {
        let original = group("g1", vec![study("a", &["s1"], &[])]);
        let emptied = original.with_studies(Vec::new());
        assert_eq!(emptied.uid(), "g1");
        assert!(emptied.is_empty());
        assert!(!original.is_empty());
    }

    #[test]
    fn distinct_ids() {
        let groups = vec![
            group("1", vec![study("a", &["s1", "s2"], &[]), study("b", &["s1"], &[])]),
            group("2", vec![study("b", &["s1", "s3"], &[])]),
        ];
        assert_eq!(study_ids(&groups), vec!["a", "b"]);
        assert_eq!(
            sample_identifiers(&groups),
            vec![
                SampleIdentifier::new("a", "s1"),
                SampleIdentifier::new("a", "s2"),
                SampleIdentifier::new("b", "s1"),
                SampleIdentifier::new("b", "s3"),
            ]
        );
    }

    #[test]
    fn session_limit() {
        assert!(can_add_group(MAX_GROUPS_IN_SESSION - 1));
        assert!(!can_add_group(MAX_GROUPS_IN_SESSION));
    }
}
