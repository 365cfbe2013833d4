use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use driftgrid::particles::{Method, ParticleSet};
use driftgrid::synth::{
    central_difference, stommel_exponential_grid, stommel_streamfunction_grid, StommelExponential,
    StommelStreamfunction,
};
use ndarray::{Array2, Axis};

const SIZES: [usize; 3] = [64, 128, 256];

pub fn bench_difference(c: &mut Criterion) {
    let mut group = c.benchmark_group("CentralDifference");
    group.significance_level(0.1).sample_size(10);
    for n in SIZES.iter() {
        let field = Array2::from_shape_fn((*n, *n), |(i, j)| ((i * j) as f64).sin());
        let name = format!("Size: {} x {}", *n, *n);
        group.bench_function(&name, |b| {
            b.iter(|| central_difference(black_box(&field), Axis(0), 0.5))
        });
    }
    group.finish();
}

pub fn bench_stommel(c: &mut Criterion) {
    let mut group = c.benchmark_group("StommelGrid");
    group.significance_level(0.1).sample_size(10);
    for n in SIZES.iter() {
        group.bench_with_input(BenchmarkId::new("exponential", n), n, |b, &n| {
            let params = StommelExponential {
                xdim: n,
                ydim: n,
                ..StommelExponential::default()
            };
            b.iter(|| stommel_exponential_grid(black_box(&params)))
        });
        group.bench_with_input(BenchmarkId::new("streamfunction", n), n, |b, &n| {
            let params = StommelStreamfunction {
                xdim: n,
                ydim: n,
                ..StommelStreamfunction::default()
            };
            b.iter(|| stommel_streamfunction_grid(black_box(&params)))
        });
    }
    group.finish();
}

pub fn bench_advection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Advection");
    group.significance_level(0.1).sample_size(10);
    let grid = stommel_exponential_grid(&StommelExponential::default()).unwrap();
    for name in ["EE", "RK4", "RK45"] {
        let method = Method::from_name(name).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut pset = ParticleSet::from_line(10, (10., 50.), (7., 30.)).unwrap();
                pset.execute(&grid, method, 86400., 300., None, None)
                    .unwrap();
                pset
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_difference, bench_stommel, bench_advection);
criterion_main!(benches);
