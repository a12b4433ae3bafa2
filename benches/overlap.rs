use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rayon::prelude::*;

use groupcomp::group::{ComparisonGroup, SessionGroup};
use groupcomp::overlap::resolve_overlap;
use groupcomp::study::SessionStudy;
use groupcomp::{Sample, SampleIndex};

const STUDIES: usize = 5;
const SAMPLES_PER_STUDY: usize = 2_000;

fn index() -> SampleIndex {
    SampleIndex::new((0..STUDIES).flat_map(|study| {
        (0..SAMPLES_PER_STUDY).map(move |sample| {
            Sample::new(
                format!("study_{study}"),
                format!("sample_{sample}"),
                format!("patient_{}", sample / 2),
            )
        })
    }))
}

/// Every group covers a window of samples in every study. Windows of
/// neighbouring groups overlap and the last groups are fully covered
/// by their neighbours.
fn groups(index: &SampleIndex, num: usize) -> Vec<ComparisonGroup> {
    let ordinals = groupcomp::group::ordinals(num, 26);
    (0..num)
        .map(|g| {
            let start = g * SAMPLES_PER_STUDY / (num + 1);
            let end = if g + 2 >= num {
                start + SAMPLES_PER_STUDY / (2 * num)
            } else {
                start + 2 * SAMPLES_PER_STUDY / (num + 1)
            };
            let studies = (0..STUDIES)
                .map(|study| {
                    SessionStudy::new(
                        format!("study_{study}"),
                        (start..end).map(|s| format!("sample_{s}")).collect(),
                    )
                })
                .collect();
            let session = SessionGroup::new(format!("Group {g}"), studies);
            ComparisonGroup::from_session(&format!("g{g}"), &ordinals[g], "#3366cc", &session, index)
        })
        .collect()
}

fn resolve_sequential(groups: &[ComparisonGroup], times: usize) -> usize {
    let mut excluded = 0usize;
    for _ in 0..times {
        excluded += resolve_overlap(groups, |_| true).excluded_from_analysis().len();
    }
    excluded
}

fn resolve_parallel(groups: &[ComparisonGroup], times: usize) -> usize {
    (0..times)
        .into_par_iter()
        .map(|_| resolve_overlap(groups, |_| true).excluded_from_analysis().len())
        .sum()
}

fn overlap_benchmark(c: &mut Criterion) {
    let index = index();
    let few = groups(&index, 4);
    let many = groups(&index, 20);

    c.bench_function("resolve overlap 4 groups", |b| {
        b.iter(|| resolve_overlap(black_box(&few), |_| true))
    });

    c.bench_function("resolve overlap 20 groups", |b| {
        b.iter(|| resolve_overlap(black_box(&many), |_| true))
    });

    c.bench_function("resolve overlap 20 groups x10", |b| {
        b.iter(|| resolve_sequential(black_box(&many), black_box(10)))
    });

    c.bench_function("resolve-parallel overlap 20 groups x10", |b| {
        b.iter(|| resolve_parallel(black_box(&many), black_box(10)))
    });
}

criterion_group!(overlap, overlap_benchmark);
criterion_main!(overlap);
