use cleave::spectral::embedding::spectral_embedding;
use cleave::spectral::laplacian::{degrees, normalized_laplacian};
use cleave::{spectral_partition, Advisory, Error, SpectralClustering, Stage, DEFAULT_EPSILON};
use nalgebra::DMatrix;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `sizes.len()` blocks with weight `inner` inside and `outer` across.
fn coupled_blocks(sizes: &[usize], inner: f64, outer: f64) -> Vec<Vec<f64>> {
    let block_of: Vec<usize> = sizes
        .iter()
        .enumerate()
        .flat_map(|(b, &s)| std::iter::repeat(b).take(s))
        .collect();
    let n = block_of.len();
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if block_of[i] == block_of[j] { inner } else { outer })
                .collect()
        })
        .collect()
}

fn assert_groups(labels: &[usize], sizes: &[usize]) {
    let mut start = 0;
    let mut firsts = Vec::new();
    for &s in sizes {
        let first = labels[start];
        assert!(
            labels[start..start + s].iter().all(|&l| l == first),
            "block starting at {start} split: {labels:?}"
        );
        firsts.push(first);
        start += s;
    }
    firsts.sort_unstable();
    firsts.dedup();
    assert_eq!(firsts.len(), sizes.len(), "blocks merged: {labels:?}");
}

#[test]
fn two_dense_blocks_get_two_labels() {
    init_tracing();
    let w = coupled_blocks(&[5, 5], 1.0, 0.0);
    let labels = spectral_partition(&w, 2, 42).unwrap();

    assert_eq!(labels.len(), 10);
    assert!(labels.iter().all(|&l| l < 2));
    assert_groups(&labels, &[5, 5]);
}

#[test]
fn single_precision_input_is_accepted() {
    let w: Vec<Vec<f32>> = coupled_blocks(&[5, 5], 1.0, 0.0)
        .into_iter()
        .map(|row| row.into_iter().map(|x| x as f32).collect())
        .collect();
    let labels = SpectralClustering::new(2).with_seed(3).fit_predict(&w).unwrap();
    assert_groups(&labels, &[5, 5]);
}

#[test]
fn weakly_coupled_blocks_are_recovered() {
    init_tracing();
    let sizes = [4, 6, 5];
    let w = coupled_blocks(&sizes, 1.0, 0.01);
    let fit = SpectralClustering::new(3).with_seed(11).fit(&w).unwrap();

    assert_groups(&fit.labels, &sizes);
    assert_eq!(fit.eigenvalues.len(), 3);
    assert!(fit.eigenvalues[0].abs() < 1e-10);
    assert!(fit.eigenvalues[2] < 0.2, "eigenvalues: {:?}", fit.eigenvalues);
    assert!(fit.converged());
    assert_eq!(fit.embedding.n_items(), 15);
    assert_eq!(fit.embedding.dim(), 3);
}

#[test]
fn dmatrix_input_matches_row_input() {
    let w = coupled_blocks(&[3, 3, 3], 1.0, 0.05);
    let m = DMatrix::from_fn(9, 9, |i, j| w[i][j]);
    let model = SpectralClustering::new(3).with_seed(5);

    let from_rows = model.fit_predict(&w).unwrap();
    let from_matrix = model.fit_matrix(&m).unwrap().labels;
    assert_eq!(from_rows, from_matrix);
}

#[test]
fn stages_compose_like_the_routine() {
    let w = coupled_blocks(&[4, 4], 1.0, 0.1);
    let m = DMatrix::from_fn(8, 8, |i, j| w[i][j]);

    let deg = degrees(&m, DEFAULT_EPSILON);
    assert!(deg.iter().all(|&d| (d - 4.4).abs() < 1e-12));

    let lap = normalized_laplacian(&m, DEFAULT_EPSILON).unwrap();
    let emb = spectral_embedding(lap.matrix(), 2, DEFAULT_EPSILON).unwrap();
    let fit = SpectralClustering::new(2).with_seed(0).fit_matrix(&m).unwrap();

    assert_eq!(emb.eigenvalues, fit.eigenvalues);
    assert_eq!(emb.embedding, fit.embedding);
}

#[test]
fn zero_row_surfaces_as_advisory() {
    init_tracing();
    let mut w = coupled_blocks(&[3, 3], 1.0, 0.0);
    w.push(vec![0.0; 6]);
    for row in w.iter_mut() {
        row.resize(7, 0.0);
    }

    let fit = SpectralClustering::new(3).with_seed(2).fit(&w).unwrap();
    assert_eq!(fit.labels.len(), 7);
    assert!(fit.advisories.iter().any(|a| matches!(
        a,
        Advisory::NumericalDegeneracy { stage: Stage::Laplacian, items } if items == &vec![6]
    )));
}

#[test]
fn errors_are_reported_before_work() {
    let not_square = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
    assert!(matches!(
        spectral_partition(&not_square, 1, 0),
        Err(Error::InvalidDimensions { .. })
    ));

    let w = coupled_blocks(&[2, 2], 1.0, 0.0);
    assert!(matches!(
        spectral_partition(&w, 0, 0),
        Err(Error::InvalidConfiguration { requested: 0, n_items: 4 })
    ));
    assert!(matches!(
        spectral_partition(&w, 9, 0),
        Err(Error::InvalidConfiguration { requested: 9, n_items: 4 })
    ));

    let empty: Vec<Vec<f64>> = Vec::new();
    assert!(matches!(spectral_partition(&empty, 1, 0), Err(Error::EmptyInput)));
}

#[test]
fn error_messages_are_readable() {
    let err = Error::InvalidConfiguration {
        requested: 5,
        n_items: 3,
    };
    assert_eq!(
        err.to_string(),
        "invalid cluster count: requested 5, but dataset has 3 items"
    );

    let advisory = Advisory::ConvergenceNotReached { max_iter: 1000 };
    assert_eq!(
        advisory.to_string(),
        "k-means did not converge within 1000 iterations"
    );
}
