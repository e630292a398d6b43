use cleave::cluster::{Clustering, Kmeans};
use cleave::SpectralClustering;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;

fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");

    // Generate synthetic data
    let mut rng = StdRng::seed_from_u64(42);
    let n = 1000;
    let d = 16;
    let k = 10;

    let data: Vec<Vec<f64>> = (0..n)
        .map(|_| (0..d).map(|_| rng.random::<f64>()).collect())
        .collect();

    group.bench_function("fit_predict_n1000_d16_k10", |b| {
        b.iter(|| {
            let model = Kmeans::new(k).with_max_iter(10).with_n_init(1).with_seed(42);
            model.fit_predict(black_box(&data)).unwrap();
        })
    });

    group.finish();
}

fn bench_spectral(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectral");
    group.sample_size(10);

    // Four noisy blocks of 50 items.
    let mut rng = StdRng::seed_from_u64(7);
    let n = 200;
    let mut w = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in i..n {
            let same = i / 50 == j / 50;
            let v = if same { 0.5 + 0.5 * rng.random::<f64>() } else { 0.05 * rng.random::<f64>() };
            w[i][j] = v;
            w[j][i] = v;
        }
    }

    group.bench_function("fit_predict_n200_k4", |b| {
        b.iter(|| {
            let model = SpectralClustering::new(4).with_seed(42);
            model.fit_predict(black_box(&w)).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_kmeans, bench_spectral);
criterion_main!(benches);
