use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use traffic_speed::algorithms::{add_missing_dots, data_sum, future_limits, graph_data, ScannerConfig};
use traffic_speed::core::domain::Dot;
use traffic_speed::curve::HourlyCurve;
use traffic_speed::time::resolve_window;

const START_DAY: i64 = 19_000 * 86_400 + 3_600;

fn dots(count: i64) -> Vec<Dot> {
    (0..count)
        .map(|i| Dot {
            seo: 100.0 + (i % 7) as f64,
            smm: 50.0,
            mail: 10.0,
            market: 20.0,
            limit: 400.0,
            ..Dot::at(START_DAY - 86_400 + i * 86_400 * 2 / count)
        })
        .collect()
}

fn bench_reconstruction(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruction");

    for count in [10, 100, 1000] {
        let input = dots(count);
        group.bench_with_input(BenchmarkId::new("add_missing_dots", count), &input, |b, input| {
            b.iter(|| add_missing_dots(black_box(input), black_box(&[START_DAY, START_DAY + 86_400])))
        });
    }

    group.finish();
}

fn bench_integration(c: &mut Criterion) {
    let mut group = c.benchmark_group("integration");
    let curve = HourlyCurve::diurnal();
    let input = dots(100);

    group.bench_function("data_sum_day", |b| {
        b.iter(|| {
            data_sum(
                black_box(&input),
                START_DAY,
                START_DAY + 86_400,
                START_DAY + 43_200,
                &curve,
                None,
            )
        })
    });

    let window = resolve_window(None, START_DAY + 86_000).unwrap();
    group.bench_function("graph_data_day", |b| {
        b.iter(|| graph_data(black_box(&input), &window, &curve))
    });

    group.finish();
}

fn bench_future_limits(c: &mut Criterion) {
    let mut group = c.benchmark_group("future_limits");
    let curve = HourlyCurve::diurnal();
    let dot = Dot { seo: 200.0, smm: 100.0, limit: 300.0, ..Dot::at(START_DAY) };

    group.bench_function("adaptive", |b| {
        b.iter(|| future_limits(black_box(&dot), &curve, &ScannerConfig::default()))
    });
    group.bench_function("fixed", |b| {
        b.iter(|| future_limits(black_box(&dot), &curve, &ScannerConfig::fixed(60)))
    });

    group.finish();
}

criterion_group!(benches, bench_reconstruction, bench_integration, bench_future_limits);
criterion_main!(benches);
