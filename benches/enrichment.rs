use criterion::{black_box, criterion_group, criterion_main, Criterion};

use groupcomp::stats::{
    compute_enrichment, group_by_protein_change, q_values, two_tailed_p_value,
    MutationEnrichmentGroup, MutationRecord,
};

/// `changes` protein changes, each mutated in a varying number of patients
fn enrichment_group(label: &str, changes: usize, offset: usize) -> MutationEnrichmentGroup {
    let records = (0..changes).flat_map(|change| {
        let mutated = (change * 7 + offset) % 40 + 1;
        (0..mutated).map(move |patient| {
            MutationRecord::new(
                format!("P{change}X"),
                "study",
                format!("sample_{patient}"),
                format!("patient_{patient}"),
            )
        })
    });
    MutationEnrichmentGroup::new(label, 500, group_by_protein_change(records))
}

fn enrichment_benchmark(c: &mut Criterion) {
    let groups = [
        enrichment_group("Altered", 2_000, 0),
        enrichment_group("Unaltered", 2_000, 13),
    ];

    c.bench_function("fisher exact 250 vs 250", |b| {
        b.iter(|| two_tailed_p_value(black_box(120), black_box(130), black_box(80), black_box(170)))
    });

    let pvalues: Vec<f64> = (1..=10_000).map(|i| 1.0 / f64::from(i)).collect();
    c.bench_function("q-values 10000", |b| b.iter(|| q_values(black_box(&pvalues))));

    c.bench_function("mutation enrichment 2000 protein changes", |b| {
        b.iter(|| compute_enrichment(black_box(&groups)))
    });
}

criterion_group!(enrichment, enrichment_benchmark);
criterion_main!(enrichment);
