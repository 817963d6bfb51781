//! Benchmarks for the plain parser and the statistics engine

use bpdiag::{ParseOptions, ParserKind, Statistic};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn create_lines(count: usize, per_line: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            (0..per_line)
                .map(|j| {
                    if (i + j) % 7 == 0 {
                        "-".to_string()
                    } else {
                        format!("{}/{}/{}", 110 + (i + j) % 40, 70 + i % 20, 55 + j % 30)
                    }
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect()
}

fn bench_plain_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_parser");

    for size in [100, 1_000, 10_000] {
        let lines = create_lines(size, 3);
        let options = ParseOptions::default().with_max_entries(3);

        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| {
                let parser = ParserKind::Plain.build(&options).unwrap();
                let mut input = lines.iter().cloned();
                black_box(parser.parse(&mut input).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_statistic(c: &mut Criterion) {
    let lines = create_lines(10_000, 3);
    let parser = ParserKind::Plain
        .build(&ParseOptions::default().with_max_entries(3))
        .unwrap();
    let dataset = parser.parse(&mut lines.into_iter()).unwrap();

    c.bench_function("statistic_10000_lines", |b| {
        b.iter(|| black_box(Statistic::new(dataset.clone()).export()))
    });
}

criterion_group!(benches, bench_plain_parser, bench_statistic);
criterion_main!(benches);
