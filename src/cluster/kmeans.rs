//! K-means: k-means++ seeding, Lloyd iterations, best-of-N restarts.
//!
//! # The Algorithm (Lloyd, 1982)
//!
//! Alternate two steps until the assignment stops changing:
//!
//! 1. **Assignment**: each point joins the cluster whose centroid is nearest
//!    (squared Euclidean distance).
//! 2. **Update**: each centroid moves to the mean of its members.
//!
//! Each step can only lower the objective
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! so the iteration terminates, but only at a *local* minimum. Running several
//! independently seeded restarts and keeping the lowest `J` (the inertia) is the
//! usual remedy.
//!
//! ## Seeding (Arthur & Vassilvitskii, 2007)
//!
//! k-means++ picks the first centroid uniformly, then every further centroid with
//! probability proportional to its squared distance from the nearest centroid
//! already chosen. When every remaining weight is zero (all points coincide with a
//! chosen centroid), the next centroid is drawn uniformly from the unchosen points.
//!
//! ## Empty clusters
//!
//! A cluster can lose every member during assignment. [`EmptyClusterPolicy`]
//! decides what happens:
//!
//! - `Singleton`: the point farthest from its own centroid (searched among clusters
//!   that still have at least two members) is moved into the empty cluster, and
//!   becomes its centroid. Because `k <= n`, such a donor always exists.
//! - `Error`: the fit fails with [`Error::EmptyCluster`].
//!
//! ## Determinism
//!
//! Restart `r` draws from `StdRng::seed_from_u64(seed + r)`. The result therefore
//! only depends on the base seed, not on the order in which restarts run, and the
//! `parallel` feature yields the same labels as the sequential path.
//!
//! ## References
//!
//! - Lloyd, S. (1982). "Least squares quantization in PCM." IEEE Trans. Inf. Theory.
//! - Arthur, D., Vassilvitskii, S. (2007). "k-means++: The Advantages of Careful Seeding." SODA.

use super::traits::Clustering;
use super::util::{flatten_rows, squared_euclidean};
use crate::error::{Error, Result};
use rand::prelude::*;
use tracing::{debug, warn};

/// Default iteration cap per restart.
pub const DEFAULT_MAX_ITER: usize = 1000;

/// Default number of independently seeded restarts.
pub const DEFAULT_N_INIT: usize = 20;

/// What to do when a cluster loses all of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Reseed the empty cluster with the single point farthest from its centroid.
    #[default]
    Singleton,
    /// Fail with [`Error::EmptyCluster`].
    Error,
}

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    k: usize,
    max_iter: usize,
    n_init: usize,
    /// Squared centroid shift under which a run also counts as converged (0 disables).
    tol: f64,
    empty_cluster_policy: EmptyClusterPolicy,
    seed: Option<u64>,
}

/// Result of a k-means fit: the best of all restarts.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// One label per input point, in `[0, k)`.
    pub labels: Vec<usize>,
    /// Final centroids, one per cluster.
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances from each point to its centroid.
    pub inertia: f64,
    /// Lloyd iterations performed by the kept restart.
    pub iterations: usize,
    /// Whether the kept restart stabilized before the iteration cap.
    pub converged: bool,
}

impl KmeansFit {
    /// Number of clusters in the fit.
    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Assign new points to the nearest learned centroid.
    pub fn predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        let (flat, d) = flatten_rows(data)?;
        let expected = self.centroids.first().map_or(0, Vec::len);
        if d != expected {
            return Err(Error::DimensionMismatch { expected, found: d });
        }

        Ok(flat
            .chunks_exact(d)
            .map(|point| {
                let mut best = 0;
                let mut best_dist = f64::INFINITY;
                for (c, centroid) in self.centroids.iter().enumerate() {
                    let dist = squared_euclidean(point, centroid);
                    if dist < best_dist {
                        best = c;
                        best_dist = dist;
                    }
                }
                best
            })
            .collect())
    }
}

impl Kmeans {
    /// Create a new k-means clusterer for `k` clusters.
    ///
    /// Defaults: `max_iter = 1000`, `n_init = 20`, singleton empty-cluster policy,
    /// no tolerance (a run stops when no label changes), random seed.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: DEFAULT_MAX_ITER,
            n_init: DEFAULT_N_INIT,
            tol: 0.0,
            empty_cluster_policy: EmptyClusterPolicy::Singleton,
            seed: None,
        }
    }

    /// Set the iteration cap per restart.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the number of restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Also stop a run once the largest squared centroid shift is at most `tol`.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the empty-cluster policy.
    pub fn with_empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster_policy = policy;
        self
    }

    /// Fix the base RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Configured iteration cap.
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Configured number of restarts.
    pub fn n_init(&self) -> usize {
        self.n_init
    }

    /// Check parameters against a dataset of `n_items` points, without touching the data.
    pub(crate) fn validate(&self, n_items: usize) -> Result<()> {
        if n_items == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 || self.k > n_items {
            return Err(Error::InvalidConfiguration {
                requested: self.k,
                n_items,
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if self.n_init == 0 {
            return Err(Error::InvalidParameter {
                name: "n_init",
                message: "must be at least 1",
            });
        }
        if !(self.tol >= 0.0 && self.tol.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "tol",
                message: "must be finite and non-negative",
            });
        }
        Ok(())
    }

    /// Fit on dense points and return the best restart.
    pub fn fit(&self, data: &[Vec<f64>]) -> Result<KmeansFit> {
        let (flat, d) = flatten_rows(data)?;
        self.fit_rows(&flat, d)
    }

    /// Fit on row-major storage: `data.len() / dim` points of `dim` coordinates.
    pub fn fit_rows(&self, data: &[f64], dim: usize) -> Result<KmeansFit> {
        if dim == 0 {
            return Err(Error::InvalidParameter {
                name: "dimension",
                message: "must be at least 1",
            });
        }
        if data.len() % dim != 0 {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: data.len() % dim,
            });
        }
        let n = data.len() / dim;
        self.validate(n)?;

        let base_seed = self.seed.unwrap_or_else(|| rand::rng().random());

        #[cfg(feature = "parallel")]
        let runs: Vec<Result<KmeansFit>> = {
            use rayon::prelude::*;
            (0..self.n_init)
                .into_par_iter()
                .map(|run| self.run_once(data, n, dim, base_seed.wrapping_add(run as u64)))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let runs: Vec<Result<KmeansFit>> = (0..self.n_init)
            .map(|run| self.run_once(data, n, dim, base_seed.wrapping_add(run as u64)))
            .collect();

        let mut best: Option<(usize, KmeansFit)> = None;
        for (run, fit) in runs.into_iter().enumerate() {
            let fit = fit?;
            // Strict comparison: ties keep the earliest restart.
            if best.as_ref().map_or(true, |(_, b)| fit.inertia < b.inertia) {
                best = Some((run, fit));
            }
        }

        let Some((run, fit)) = best else {
            return Err(Error::InvalidParameter {
                name: "n_init",
                message: "must be at least 1",
            });
        };

        debug!(
            k = self.k,
            n_init = self.n_init,
            kept_run = run,
            inertia = fit.inertia,
            iterations = fit.iterations,
            "k-means finished"
        );
        if !fit.converged {
            warn!(
                max_iter = self.max_iter,
                "k-means hit the iteration cap; returning best assignment found"
            );
        }

        Ok(fit)
    }

    /// One seeded restart: k-means++ seeding followed by Lloyd iterations.
    fn run_once(&self, data: &[f64], n: usize, d: usize, seed: u64) -> Result<KmeansFit> {
        let k = self.k;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut centroids = kmeans_plus_plus(data, n, d, k, &mut rng);

        // `usize::MAX` marks "not yet assigned" so the first pass always counts as a change.
        let mut labels = vec![usize::MAX; n];
        let mut iterations = 0;
        let mut converged = false;

        for _ in 0..self.max_iter {
            iterations += 1;

            let changed = assign(data, d, &centroids, &mut labels);
            let reseeded = self.reseed_empty(data, d, k, &mut centroids, &mut labels)?;
            let shift = update_centroids(data, d, k, &labels, &mut centroids);

            if reseeded == 0 && (changed == 0 || (self.tol > 0.0 && shift <= self.tol)) {
                converged = true;
                break;
            }
        }

        let inertia = labels
            .iter()
            .enumerate()
            .map(|(i, &l)| squared_euclidean(&data[i * d..(i + 1) * d], &centroids[l * d..(l + 1) * d]))
            .sum::<f64>();

        Ok(KmeansFit {
            labels,
            centroids: centroids.chunks_exact(d).map(<[f64]>::to_vec).collect(),
            inertia,
            iterations,
            converged,
        })
    }

    /// Apply the empty-cluster policy. Returns the number of reseeded clusters.
    fn reseed_empty(
        &self,
        data: &[f64],
        d: usize,
        k: usize,
        centroids: &mut [f64],
        labels: &mut [usize],
    ) -> Result<usize> {
        let mut counts = vec![0usize; k];
        for &l in labels.iter() {
            counts[l] += 1;
        }

        let mut reseeded = 0;
        for c in 0..k {
            if counts[c] > 0 {
                continue;
            }
            if self.empty_cluster_policy == EmptyClusterPolicy::Error {
                return Err(Error::EmptyCluster { cluster: c });
            }

            let mut farthest: Option<(usize, f64)> = None;
            for (i, &l) in labels.iter().enumerate() {
                if counts[l] < 2 {
                    continue;
                }
                let dist = squared_euclidean(&data[i * d..(i + 1) * d], &centroids[l * d..(l + 1) * d]);
                if farthest.map_or(true, |(_, best)| dist > best) {
                    farthest = Some((i, dist));
                }
            }
            let Some((i, _)) = farthest else {
                continue;
            };

            counts[labels[i]] -= 1;
            counts[c] = 1;
            labels[i] = c;
            centroids[c * d..(c + 1) * d].copy_from_slice(&data[i * d..(i + 1) * d]);
            reseeded += 1;
        }

        if reseeded > 0 {
            debug!(reseeded, "reseeded empty clusters with singletons");
        }
        Ok(reseeded)
    }
}

impl Default for Kmeans {
    fn default() -> Self {
        Self::new(8)
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

fn kmeans_plus_plus(data: &[f64], n: usize, d: usize, k: usize, rng: &mut StdRng) -> Vec<f64> {
    let point = |i: usize| &data[i * d..(i + 1) * d];

    let mut centroids: Vec<f64> = Vec::with_capacity(k * d);
    let mut chosen = vec![false; n];

    let first = rng.random_range(0..n);
    chosen[first] = true;
    centroids.extend_from_slice(point(first));

    let mut closest: Vec<f64> = (0..n).map(|i| squared_euclidean(point(i), point(first))).collect();

    for _ in 1..k {
        let total: f64 = closest.iter().sum();
        let next = if total > 0.0 && total.is_finite() {
            let mut target = rng.random::<f64>() * total;
            let mut pick = None;
            for (i, &w) in closest.iter().enumerate() {
                if w <= 0.0 {
                    continue;
                }
                if target < w {
                    pick = Some(i);
                    break;
                }
                target -= w;
            }
            // Rounding can exhaust `target` past the last weight.
            pick.or_else(|| closest.iter().rposition(|&w| w > 0.0))
        } else {
            let remaining: Vec<usize> = (0..n).filter(|&i| !chosen[i]).collect();
            remaining.choose(rng).copied()
        };
        let Some(next) = next else {
            break;
        };

        chosen[next] = true;
        centroids.extend_from_slice(point(next));
        for (i, c) in closest.iter_mut().enumerate() {
            let dist = squared_euclidean(point(i), point(next));
            if dist < *c {
                *c = dist;
            }
        }
    }

    // Only reachable with k > n, which `validate` rules out.
    while centroids.len() < k * d {
        centroids.extend_from_slice(point(0));
    }
    centroids
}

/// Nearest-centroid assignment. Ties keep the current label. Returns the number of changes.
fn assign(data: &[f64], d: usize, centroids: &[f64], labels: &mut [usize]) -> usize {
    let k = centroids.len() / d;
    let mut changed = 0;
    for (i, label) in labels.iter_mut().enumerate() {
        let p = &data[i * d..(i + 1) * d];
        let current = *label;
        let (mut best, mut best_dist) = if current < k {
            (current, squared_euclidean(p, &centroids[current * d..(current + 1) * d]))
        } else {
            (0, f64::INFINITY)
        };
        for c in 0..k {
            let dist = squared_euclidean(p, &centroids[c * d..(c + 1) * d]);
            if dist < best_dist {
                best = c;
                best_dist = dist;
            }
        }
        if best != current {
            *label = best;
            changed += 1;
        }
    }
    changed
}

/// Move each non-empty centroid to the mean of its members. Returns the largest squared shift.
fn update_centroids(data: &[f64], d: usize, k: usize, labels: &[usize], centroids: &mut [f64]) -> f64 {
    let mut sums = vec![0.0f64; k * d];
    let mut counts = vec![0usize; k];
    for (i, &l) in labels.iter().enumerate() {
        counts[l] += 1;
        for (s, x) in sums[l * d..(l + 1) * d].iter_mut().zip(&data[i * d..(i + 1) * d]) {
            *s += x;
        }
    }

    let mut max_shift = 0.0f64;
    for c in 0..k {
        if counts[c] == 0 {
            continue;
        }
        let inv = 1.0 / counts[c] as f64;
        let mean = &mut sums[c * d..(c + 1) * d];
        for x in mean.iter_mut() {
            *x *= inv;
        }
        let old = &mut centroids[c * d..(c + 1) * d];
        max_shift = max_shift.max(squared_euclidean(old, mean));
        old.copy_from_slice(mean);
    }
    max_shift
}
