use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trailmetrics::models::Coordinate;
use trailmetrics::sampling::{self, DecodedStep, GEOMETRY_PRECISION};
use trailmetrics::polyline;

fn synthetic_coords(count: usize) -> Vec<Coordinate> {
    // Meandering northbound track, ~11m between consecutive points.
    (0..count)
        .map(|i| Coordinate {
            lat: 45.0 + 0.0001 * i as f64,
            lon: 5.0 + 0.00005 * ((i as f64) * 0.3).sin(),
        })
        .collect()
}

fn benchmark_polyline_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("polyline_decode");

    for count in [100usize, 1_000, 10_000] {
        let encoded = polyline::encode(&synthetic_coords(count), GEOMETRY_PRECISION);
        group.bench_with_input(BenchmarkId::from_parameter(count), &encoded, |b, encoded| {
            b.iter(|| polyline::decode(black_box(encoded), GEOMETRY_PRECISION));
        });
    }

    group.finish();
}

fn benchmark_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_steps");

    for count in [1_000usize, 10_000, 50_000] {
        let steps = vec![DecodedStep {
            coordinates: synthetic_coords(count),
            distance_meters: count as f64 * 11.0,
        }];
        let threshold =
            sampling::spacing_threshold_m(sampling::SampleSpacing::Metrics, count as f64 * 11.0);

        group.bench_with_input(BenchmarkId::from_parameter(count), &steps, |b, steps| {
            b.iter(|| sampling::sample_steps(black_box(steps), threshold));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_polyline_decode, benchmark_sampling);
criterion_main!(benches);
