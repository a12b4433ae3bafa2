//! Compares three groups of a small cohort
//!
//! Run with `cargo run --example compare`
use groupcomp::case::{CaseKind, SampleLevel};
use groupcomp::group::{default_group_order, ordinals, CaseGroup, ComparisonGroup, SessionGroup};
use groupcomp::overlap::resolve_overlap;
use groupcomp::partition::{groups_download_data, partition_by_membership, venn_data};
use groupcomp::stats::{compute_enrichment, GroupedMutations, MutationEnrichmentGroup, MutationRecord};
use groupcomp::study::SessionStudy;
use groupcomp::{ComparisonResult, Sample, SampleIdentifier, SampleIndex};

const COLORS: [&str; 3] = ["#dc3912", "#3366cc", "#ff9900"];

fn cohort() -> Vec<Sample> {
    (1..=30)
        .map(|i| Sample::new("brca_demo", format!("S{i:02}"), format!("P{:02}", (i + 1) / 2)))
        .collect()
}

fn session(name: &str, samples: std::ops::RangeInclusive<usize>) -> SessionGroup {
    let ids = samples.map(|i| format!("S{i:02}")).collect();
    SessionGroup::new(name, vec![SessionStudy::new("brca_demo", ids)])
}

/// Simulated mutations of the samples of a group
fn mutations(group: &ComparisonGroup, index: &SampleIndex, every: usize) -> GroupedMutations {
    let mut grouped = GroupedMutations::new();
    for (n, id) in SampleLevel::identifiers(group.studies()).iter().enumerate() {
        let Some(sample) = index.get(id) else {
            continue;
        };
        let protein_change = if n % every == 0 { "V600E" } else { "G12D" };
        grouped.add(MutationRecord::new(
            protein_change,
            sample.study_id(),
            sample.sample_id(),
            sample.patient_id(),
        ));
    }
    grouped
}

fn main() -> ComparisonResult<()> {
    simple_logger::SimpleLogger::new()
        .init()
        .expect("the logger is only initialized once");

    let samples = cohort();
    let index = SampleIndex::new(samples.clone());

    let sessions = vec![
        session("Primary", 1..=14),
        session("Metastatic", 11..=30),
        // S31 and S32 are not part of the cohort
        session("Recurrent", 12..=32),
    ];
    let labels = ordinals(sessions.len(), 26);
    let groups: Vec<ComparisonGroup> = sessions
        .iter()
        .enumerate()
        .map(|(idx, session)| {
            ComparisonGroup::from_session(&format!("group_{idx}"), &labels[idx], COLORS[idx], session, &index)
        })
        .collect();
    let groups = default_group_order(&groups);

    for group in &groups {
        println!(
            "{}\t{} samples\t{} patients\t{} missing",
            group.name_with_ordinal(),
            group.num_samples(),
            group.num_patients(),
            group.non_existent_samples().len()
        );
    }

    let result = resolve_overlap(&groups, |name| name != "Recurrent");
    println!(
        "\n{} overlapping samples, {} overlapping patients, {} iterations",
        result.total_sample_overlap(),
        result.total_patient_overlap(),
        result.iterations()
    );
    for group in result.groups() {
        let status = if result.is_excluded(group.uid()) { "excluded" } else { "active" };
        println!("{}\t{}\t{} samples", group.name(), status, group.num_samples());
    }

    let case_keys: Vec<String> = samples
        .iter()
        .map(|sample| sample.identifier().unique_key())
        .collect();
    let partition = partition_by_membership(
        &groups,
        |group| SampleLevel::identifiers(group.studies()),
        SampleIdentifier::unique_key,
        &case_keys,
    )?;
    println!("\n### VENN ###");
    for region in venn_data(&partition) {
        println!("{}\t{}", region.groups().join(" & "), region.count());
    }

    println!("\n### MEMBERSHIP ###");
    println!("{}", groups_download_data(&samples[..5], &groups));

    let active: Vec<&ComparisonGroup> = result.active_groups().collect();
    let enrichment_groups: Vec<MutationEnrichmentGroup> = active
        .iter()
        .zip([2, 5])
        .map(|(group, every)| {
            MutationEnrichmentGroup::new(
                group.name(),
                group.num_patients() as u64,
                mutations(group, &index, every),
            )
        })
        .collect();
    let enrichment = compute_enrichment(&enrichment_groups)?;

    println!("\n### ENRICHMENT ###");
    for row in &enrichment {
        println!(
            "{}\t{:.1}%\t{:.1}%\t{:.3}\t{:e}\t{:e}\t{}",
            row.protein_change(),
            row.group_a_mutated_percentage(),
            row.group_b_mutated_percentage(),
            row.log_ratio(),
            row.p_value(),
            row.q_value(),
            row.enriched_group()
        );
    }
    Ok(())
}
