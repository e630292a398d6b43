//! Clustering primitives for dense points.
//!
//! ## K-means
//!
//! Assign each point to the nearest centroid, then move each centroid to the mean
//! of its points. Repeat.
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! **Assumptions**:
//! - Clusters are roughly spherical
//! - Clusters have similar sizes
//! - You know k in advance
//!
//! The spectral embedding in [`crate::spectral`] is built to satisfy exactly these
//! assumptions: each group collapses towards a single point on the unit sphere.
//!
//! ## Usage
//!
//! ```rust
//! use cleave::cluster::{Clustering, EmptyClusterPolicy, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//!
//! // Full result: centroids, inertia, convergence.
//! let fit = Kmeans::new(2)
//!     .with_max_iter(1000)
//!     .with_n_init(20)
//!     .with_empty_cluster_policy(EmptyClusterPolicy::Singleton)
//!     .with_seed(42)
//!     .fit(&data)
//!     .unwrap();
//! assert!(fit.converged);
//! ```

mod kmeans;
mod traits;
mod util;

pub use kmeans::{EmptyClusterPolicy, Kmeans, KmeansFit, DEFAULT_MAX_ITER, DEFAULT_N_INIT};
pub use traits::Clustering;
