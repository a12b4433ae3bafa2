//! Partition cases by the groups they belong to
//!
//! Every case is a member of some combination of groups. Cases with the
//! same combination form one region of a Venn diagram. This module
//! calculates those regions for any number of groups.
use std::collections::HashSet;

use smallvec::SmallVec;

use crate::group::CaseGroup;
use crate::index::Sample;
use crate::keyed::KeyedMap;
use crate::{ComparisonError, ComparisonResult, SampleIdentifier};

/// The groups a case is, or is not, a member of
///
/// The signature holds one entry per group, in the order of the groups
/// that were partitioned. Two signatures are equal if they agree on every group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MembershipSignature {
    memberships: SmallVec<[(String, bool); 4]>,
}

impl MembershipSignature {
    /// Returns whether the case is a member of the group with `uid`
    ///
    /// Returns `None` if the group was not part of the partition.
    pub fn is_member(&self, uid: &str) -> Option<bool> {
        self.memberships
            .iter()
            .find(|(group, _)| group == uid)
            .map(|(_, member)| *member)
    }

    /// Iterates the uid of every group with the membership of the case
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.memberships
            .iter()
            .map(|(uid, member)| (uid.as_str(), *member))
    }

    /// Iterates the uids of the groups that contain the case
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter_map(|(uid, member)| if member { Some(uid) } else { None })
    }

    /// Returns the number of groups in the signature
    pub fn len(&self) -> usize {
        self.memberships.len()
    }

    /// Returns `true` if the signature has no groups
    pub fn is_empty(&self) -> bool {
        self.memberships.is_empty()
    }
}

/// All cases that share one [`MembershipSignature`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionEntry {
    signature: MembershipSignature,
    case_keys: Vec<String>,
}

impl PartitionEntry {
    pub fn signature(&self) -> &MembershipSignature {
        &self.signature
    }

    /// The unique keys of the cases in this part
    pub fn case_keys(&self) -> &[String] {
        &self.case_keys
    }
}

/// Partitions cases by the exact combination of groups they belong to
///
/// - `case_identifiers` returns the cases of a group
/// - `unique_key` turns one of those cases into a unique string key
/// - `case_keys` are the keys of all cases to partition
///
/// Only combinations that contain at least one case are returned,
/// in the order in which they first occur in `case_keys`.
///
/// # Errors
///
/// [`ComparisonError::NoGroups`] if `groups` is empty but `case_keys` is not
///
/// # Examples
///
/// ```
/// use groupcomp::case::{CaseKind, SampleLevel};
/// use groupcomp::group::{CaseGroup, ComparisonGroup, SessionGroup};
/// use groupcomp::partition::partition_by_membership;
/// use groupcomp::study::SessionStudy;
/// use groupcomp::{Sample, SampleIdentifier, SampleIndex};
///
/// let index = SampleIndex::new(
///     (1..=3).map(|i| Sample::new("S1", i.to_string(), i.to_string()))
/// );
/// let group = |uid: &str, samples: &[&str]| {
///     let study = SessionStudy::new("S1", samples.iter().map(|s| s.to_string()).collect());
///     ComparisonGroup::from_session(uid, uid, "black", &SessionGroup::new(uid, vec![study]), &index)
/// };
/// let groups = vec![group("A", &["1", "2"]), group("B", &["2", "3"])];
/// let keys: Vec<String> = (1..=3)
///     .map(|i| SampleIdentifier::new("S1", i.to_string()).unique_key())
///     .collect();
///
/// let partition = partition_by_membership(
///     &groups,
///     |group| SampleLevel::identifiers(group.studies()),
///     SampleIdentifier::unique_key,
///     &keys,
/// ).unwrap();
///
/// assert_eq!(partition.len(), 3);
/// assert_eq!(partition[1].signature().is_member("A"), Some(true));
/// assert_eq!(partition[1].signature().is_member("B"), Some(true));
/// assert_eq!(partition[1].case_keys(), &[keys[1].clone()]);
/// ```
pub fn partition_by_membership<G, I, C, U>(
    groups: &[G],
    case_identifiers: C,
    unique_key: U,
    case_keys: &[String],
) -> ComparisonResult<Vec<PartitionEntry>>
where
    G: CaseGroup,
    C: Fn(&G) -> Vec<I>,
    U: Fn(&I) -> String,
{
    if groups.is_empty() && !case_keys.is_empty() {
        return Err(ComparisonError::NoGroups);
    }

    let members: Vec<(&str, HashSet<String>)> = groups
        .iter()
        .map(|group| {
            let keys: HashSet<String> = case_identifiers(group).iter().map(&unique_key).collect();
            (group.uid(), keys)
        })
        .collect();

    // cases are matched on their membership flags, uids are only copied per entry
    let mut positions: KeyedMap<SmallVec<[bool; 8]>, usize> = KeyedMap::new();
    let mut entries: Vec<PartitionEntry> = Vec::new();

    for case_key in case_keys {
        let flags: SmallVec<[bool; 8]> = members
            .iter()
            .map(|(_, keys)| keys.contains(case_key))
            .collect();
        match positions.get(&flags) {
            Some(idx) => entries[*idx].case_keys.push(case_key.clone()),
            None => {
                let signature = MembershipSignature {
                    memberships: members
                        .iter()
                        .zip(&flags)
                        .map(|((uid, _), member)| ((*uid).to_string(), *member))
                        .collect(),
                };
                positions.set(flags, entries.len());
                entries.push(PartitionEntry {
                    signature,
                    case_keys: vec![case_key.clone()],
                });
            }
        }
    }
    Ok(entries)
}

/// One region of a Venn diagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VennRegion {
    groups: Vec<String>,
    count: usize,
}

impl VennRegion {
    /// The uids of the groups the region belongs to
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// The number of cases in the region
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Converts a partition into Venn diagram regions, largest region first
///
/// Cases that are in none of the groups don't form a region.
pub fn venn_data(partition: &[PartitionEntry]) -> Vec<VennRegion> {
    let mut regions: Vec<VennRegion> = partition
        .iter()
        .map(|entry| VennRegion {
            groups: entry.signature.groups().map(str::to_string).collect(),
            count: entry.case_keys.len(),
        })
        .filter(|region| !region.groups.is_empty())
        .collect();
    regions.sort_by(|a, b| b.count.cmp(&a.count));
    regions
}

/// Builds a tab separated table of the group memberships of every sample
///
/// The table has one column per group, holding `Yes` if the sample is a
/// member of the group and `No` otherwise.
pub fn groups_download_data<G: CaseGroup>(samples: &[Sample], groups: &[G]) -> String {
    let group_samples: Vec<HashSet<SampleIdentifier>> = groups
        .iter()
        .map(|group| {
            group
                .studies()
                .iter()
                .flat_map(|study| {
                    study
                        .samples()
                        .iter()
                        .map(|sample_id| SampleIdentifier::new(study.id(), sample_id.as_str()))
                })
                .collect()
        })
        .collect();

    let mut lines: Vec<String> = Vec::with_capacity(samples.len() + 1);
    let header: Vec<&str> = ["Sample ID", "Patient ID", "Study ID"]
        .into_iter()
        .chain(groups.iter().map(|group| group.name()))
        .collect();
    lines.push(header.join("\t"));

    for sample in samples {
        let id = sample.identifier();
        let line: Vec<&str> = [sample.sample_id(), sample.patient_id(), sample.study_id()]
            .into_iter()
            .chain(group_samples.iter().map(|members| {
                if members.contains(&id) {
                    "Yes"
                } else {
                    "No"
                }
            }))
            .collect();
        lines.push(line.join("\t"));
    }
    lines.join("\n")
}
