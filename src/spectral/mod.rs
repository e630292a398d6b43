//! Spectral partitioning of a pairwise affinity matrix.
//!
//! Given a symmetric, non-negative `N x N` affinity matrix `W` and a group count
//! `n`, the routine runs three stages, strictly in order:
//!
//! ```text
//! W ──► L = I - D^{-1/2} W D^{-1/2} ──► bottom-n eigenvectors, rows normalized ──► k-means(n)
//!       (laplacian)                     (embedding)                              (cluster)
//! ```
//!
//! Row `i` of the embedding and label `i` always describe row/column `i` of `W`.
//!
//! ## Why it works
//!
//! If the graph described by `W` splits into `n` connected components, the
//! Laplacian has eigenvalue 0 with multiplicity `n` and every item of a
//! component lands on the same point of the embedding. k-means then separates
//! `n` well-separated points. Weak links between groups perturb this picture
//! only slightly, which is what makes the method robust.
//!
//! ## Reproducibility
//!
//! The k-means stage is the only random part. Fix it with
//! [`SpectralClustering::with_seed`]; without a seed one is drawn from the thread
//! RNG per call. Eigenvectors carry an arbitrary sign and, within repeated
//! eigenvalues, an arbitrary basis. Compare results as partitions, not as label
//! values.
//!
//! ## Cost
//!
//! A dense symmetric eigen-decomposition: `O(N^3)` time, `O(N^2)` memory.
//! All shape and configuration checks run before it.
//!
//! ## References
//!
//! - Ng, Jordan, Weiss (2001). "On Spectral Clustering: Analysis and an algorithm." NIPS.
//! - von Luxburg (2007). "A Tutorial on Spectral Clustering." Statistics and Computing.

pub mod embedding;
pub mod laplacian;

use crate::cluster::{EmptyClusterPolicy, Kmeans, DEFAULT_MAX_ITER, DEFAULT_N_INIT};
use crate::error::{Advisory, Error, Result, Stage};
use embedding::{spectral_embedding, Embedding};
use laplacian::{affinity_matrix, normalized_laplacian};
use nalgebra::DMatrix;
use tracing::{debug, warn};

/// Guard added to degrees and row norms.
pub const DEFAULT_EPSILON: f64 = f64::EPSILON;

/// Spectral clustering on a precomputed affinity matrix.
#[derive(Debug, Clone)]
pub struct SpectralClustering {
    n_clusters: usize,
    epsilon: f64,
    max_iter: usize,
    n_init: usize,
    empty_cluster_policy: EmptyClusterPolicy,
    seed: Option<u64>,
}

/// Everything produced by one [`SpectralClustering::fit`] call.
#[derive(Debug, Clone)]
pub struct SpectralFit {
    /// One label per item, in `[0, n_clusters)`.
    pub labels: Vec<usize>,
    /// The `n_clusters` smallest Laplacian eigenvalues, ascending.
    pub eigenvalues: Vec<f64>,
    /// Row-normalized embedding handed to k-means.
    pub embedding: Embedding,
    /// Within-cluster sum of squares of the kept k-means restart.
    pub inertia: f64,
    /// Lloyd iterations of the kept restart.
    pub iterations: usize,
    /// Non-fatal conditions met along the way.
    pub advisories: Vec<Advisory>,
}

impl SpectralFit {
    /// Whether the kept k-means restart converged before the iteration cap.
    pub fn converged(&self) -> bool {
        !self
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::ConvergenceNotReached { .. }))
    }
}

impl SpectralClustering {
    /// Partition into `n_clusters` groups.
    ///
    /// Defaults: `epsilon = f64::EPSILON`, `max_iter = 1000`, `n_init = 20`,
    /// singleton empty-cluster policy, random seed.
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            epsilon: DEFAULT_EPSILON,
            max_iter: DEFAULT_MAX_ITER,
            n_init: DEFAULT_N_INIT,
            empty_cluster_policy: EmptyClusterPolicy::Singleton,
            seed: None,
        }
    }

    /// Set the epsilon guard for degrees and row norms.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the k-means iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the number of k-means restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set the k-means empty-cluster policy.
    pub fn with_empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster_policy = policy;
        self
    }

    /// Fix the k-means seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Configured group count.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    fn kmeans(&self) -> Kmeans {
        let kmeans = Kmeans::new(self.n_clusters)
            .with_max_iter(self.max_iter)
            .with_n_init(self.n_init)
            .with_empty_cluster_policy(self.empty_cluster_policy);
        match self.seed {
            Some(seed) => kmeans.with_seed(seed),
            None => kmeans,
        }
    }

    /// Fit on an affinity matrix given as rows. Returns only the labels.
    pub fn fit_predict<T>(&self, affinity: &[Vec<T>]) -> Result<Vec<usize>>
    where
        T: Copy + Into<f64>,
    {
        Ok(self.fit(affinity)?.labels)
    }

    /// Fit on an affinity matrix given as rows (`f32` or `f64`).
    pub fn fit<T>(&self, affinity: &[Vec<T>]) -> Result<SpectralFit>
    where
        T: Copy + Into<f64>,
    {
        let matrix = affinity_matrix(affinity)?;
        self.fit_matrix(&matrix)
    }

    /// Fit on an affinity matrix already held as a `DMatrix`.
    pub fn fit_matrix(&self, affinity: &DMatrix<f64>) -> Result<SpectralFit> {
        let (n_items, cols) = affinity.shape();
        if n_items == 0 {
            return Err(Error::EmptyInput);
        }
        if n_items != cols {
            return Err(Error::InvalidDimensions {
                row: 0,
                expected: n_items,
                found: cols,
            });
        }
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be finite and positive",
            });
        }
        let kmeans = self.kmeans();
        kmeans.validate(n_items)?;

        debug!(n_items, n_clusters = self.n_clusters, "spectral partition");
        let mut advisories = Vec::new();

        let laplacian = normalized_laplacian(affinity, self.epsilon)?;
        if !laplacian.isolated_nodes().is_empty() {
            advisories.push(Advisory::NumericalDegeneracy {
                stage: Stage::Laplacian,
                items: laplacian.isolated_nodes().to_vec(),
            });
        }

        let spectral = spectral_embedding(laplacian.matrix(), self.n_clusters, self.epsilon)?;
        if !spectral.degenerate_rows.is_empty() {
            advisories.push(Advisory::NumericalDegeneracy {
                stage: Stage::Embedding,
                items: spectral.degenerate_rows.clone(),
            });
        }

        let fit = kmeans.fit_rows(spectral.embedding.as_slice(), spectral.embedding.dim())?;
        if !fit.converged {
            advisories.push(Advisory::ConvergenceNotReached {
                max_iter: self.max_iter,
            });
        }

        for advisory in &advisories {
            warn!(%advisory, "spectral partition advisory");
        }

        Ok(SpectralFit {
            labels: fit.labels,
            eigenvalues: spectral.eigenvalues,
            embedding: spectral.embedding,
            inertia: fit.inertia,
            iterations: fit.iterations,
            advisories,
        })
    }
}

/// Partition `affinity` into `n_groups` with the default configuration and a fixed seed.
pub fn spectral_partition<T>(affinity: &[Vec<T>], n_groups: usize, seed: u64) -> Result<Vec<usize>>
where
    T: Copy + Into<f64>,
{
    SpectralClustering::new(n_groups)
        .with_seed(seed)
        .fit_predict(affinity)
}
