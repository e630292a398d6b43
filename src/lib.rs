//! Spectral partitioning of affinity matrices.
//!
//! `cleave` splits N items into n groups given only their pairwise affinities:
//! - [`spectral`]: normalized Laplacian, bottom eigenvectors, row-normalized embedding
//! - [`cluster`]: k-means (k-means++ seeding, Lloyd iterations, restarts) run on that embedding
//!
//! ```rust
//! use cleave::SpectralClustering;
//!
//! // Two disconnected triangles.
//! let w = vec![
//!     vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
//!     vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
//!     vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
//!     vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
//!     vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
//!     vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
//! ];
//!
//! let labels = SpectralClustering::new(2).with_seed(42).fit_predict(&w).unwrap();
//! assert_eq!(labels[0], labels[2]);
//! assert_eq!(labels[3], labels[5]);
//! assert_ne!(labels[0], labels[3]);
//! ```

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod spectral;

pub use cluster::{Clustering, EmptyClusterPolicy, Kmeans, KmeansFit};
pub use error::{Advisory, Error, Result, Stage};
pub use spectral::embedding::Embedding;
pub use spectral::{spectral_partition, SpectralClustering, SpectralFit, DEFAULT_EPSILON};
