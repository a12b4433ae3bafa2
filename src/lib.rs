//! Compare user defined groups of cancer samples and patients
//!
//! `groupcomp` contains the computational core of a group comparison:
//! set algebra over the cases of groups, removal of overlapping cases,
//! partitioning of cases into the regions of a Venn diagram and the
//! statistical enrichment of mutations between two groups.
//!
//! # Data flow
//!
//! 1. Persisted [`group::SessionGroup`]s are resolved against the live
//!    [`SampleIndex`]. Samples that no longer exist are dropped and
//!    reported, the patients of the remaining samples are derived.
//! 2. [`overlap::resolve_overlap`] removes all cases that are shared
//!    between the selected groups. Groups that are left without any case
//!    are excluded from the analysis, one at a time, until no further
//!    group becomes empty.
//! 3. [`partition::partition_by_membership`] classifies every case by
//!    the exact combination of groups it belongs to.
//! 4. [`stats::compute_enrichment`] compares the mutated patients of two
//!    groups with Fisher's exact test and Benjamini-Hochberg correction.
//!
//! Every operation is a pure function of its arguments. Inputs are never
//! modified and nothing is cached between calls.
//!
//! # Examples
//!
//! ```
//! use groupcomp::group::{CaseGroup, ComparisonGroup, SessionGroup};
//! use groupcomp::overlap::resolve_overlap;
//! use groupcomp::study::SessionStudy;
//! use groupcomp::{Sample, SampleIndex};
//!
//! let index = SampleIndex::new(
//!     ["s1", "s2", "s3", "s4"].iter().map(|s| Sample::new("S1", *s, format!("p_{s}")))
//! );
//!
//! let session = |name: &str, samples: &[&str]| {
//!     SessionGroup::new(name, vec![
//!         SessionStudy::new("S1", samples.iter().map(|s| s.to_string()).collect())
//!     ])
//! };
//! let groups = vec![
//!     ComparisonGroup::from_session("a", "A", "red", &session("Group A", &["s1", "s2", "s3"]), &index),
//!     ComparisonGroup::from_session("b", "B", "blue", &session("Group B", &["s2", "s3", "s4"]), &index),
//! ];
//!
//! let result = resolve_overlap(&groups, |_| true);
//! assert_eq!(result.total_sample_overlap(), 2);
//! assert_eq!(result.groups()[0].studies()[0].samples(), &["s1".to_string()]);
//! assert_eq!(result.groups()[1].studies()[0].samples(), &["s4".to_string()]);
//! ```
use thiserror::Error;

pub mod case;
pub mod group;
mod index;
pub mod keyed;
pub mod overlap;
pub mod partition;
pub mod stats;
pub mod study;

pub use case::{PatientIdentifier, SampleIdentifier};
pub use index::{Sample, SampleIndex};

/// The maximum number of groups that can be compared in one session
pub const MAX_GROUPS_IN_SESSION: usize = 20;

/// Results with a q-value below the threshold are significant
pub const SIGNIFICANT_QVALUE_THRESHOLD: f64 = 0.05;

/// Relative tolerance when comparing table probabilities in Fisher's exact test
///
/// Tables whose probability is within this tolerance of the observed
/// table count as "at least as extreme".
pub const FISHER_RELATIVE_ERROR: f64 = 1e-7;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("enrichment requires exactly 2 groups, got {0}")]
    InvalidGroupCount(usize),
    #[error("unable to partition cases without groups")]
    NoGroups,
    #[error("case does not exist")]
    DoesNotExist,
}

pub type ComparisonResult<T> = Result<T, ComparisonError>;
