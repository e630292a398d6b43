//! Spectral partition of a small affinity matrix with three weakly linked groups.

use cleave::{Clustering, Kmeans, SpectralClustering};

fn main() {
    // Groups {0..4}, {4..7}, {7..10}; strong links inside, faint links across.
    let group = |i: usize| match i {
        0..=3 => 0,
        4..=6 => 1,
        _ => 2,
    };
    let n = 10;
    let w: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if group(i) == group(j) { 1.0 } else { 0.02 })
                .collect()
        })
        .collect();

    let fit = SpectralClustering::new(3).with_seed(42).fit(&w).unwrap();
    println!("=== Spectral partition (n=3) ===");
    println!("  smallest eigenvalues: {:?}", fit.eigenvalues);
    for (i, label) in fit.labels.iter().enumerate() {
        let row = fit.embedding.row(i);
        println!("  item {:2} (group {}) => cluster {}  embedding {:?}", i, group(i), label, row);
    }
    println!("  inertia {:.3e} after {} iterations", fit.inertia, fit.iterations);
    for advisory in &fit.advisories {
        println!("  advisory: {advisory}");
    }

    // The same k-means primitive on the raw affinity rows, for comparison.
    let labels = Kmeans::new(3).with_seed(42).fit_predict(&w).unwrap();
    println!("\n=== K-means on raw rows (k=3) ===");
    println!("  {:?}", labels);
}
