use thiserror::Error;

/// Errors returned by the partitioning routine and the clustering primitives.
#[derive(Debug, Error)]
pub enum Error {
    /// Input is empty (zero items).
    #[error("empty input")]
    EmptyInput,

    /// The affinity matrix is not square.
    #[error("affinity matrix is not square: row {row} has {found} columns, expected {expected}")]
    InvalidDimensions {
        /// Offending row.
        row: usize,
        /// Expected number of columns (the number of rows).
        expected: usize,
        /// Columns actually found.
        found: usize,
    },

    /// Requested group count is zero or exceeds the number of items.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidConfiguration {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// A cluster lost all of its members under [`EmptyClusterPolicy::Error`].
    ///
    /// [`EmptyClusterPolicy::Error`]: crate::cluster::EmptyClusterPolicy::Error
    #[error("cluster {cluster} became empty")]
    EmptyCluster {
        /// Index of the empty cluster.
        cluster: usize,
    },

    /// The symmetric eigensolver did not converge.
    #[error("eigen-decomposition of the {size}x{size} Laplacian did not converge")]
    EigenDecomposition {
        /// Matrix order.
        size: usize,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Degree / normalized Laplacian construction.
    Laplacian,
    /// Row-normalized spectral embedding.
    Embedding,
}

/// Non-fatal conditions recovered locally during a fit.
///
/// These never abort a call. They are logged at `warn` level and attached to
/// [`SpectralFit::advisories`](crate::SpectralFit::advisories).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Advisory {
    /// Items with zero degree or a zero-norm embedding row; handled by the epsilon guard.
    #[error("numerical degeneracy in {stage:?} stage for {} item(s)", items.len())]
    NumericalDegeneracy {
        /// Stage where the condition was detected.
        stage: Stage,
        /// Affected item indices (ascending).
        items: Vec<usize>,
    },

    /// The kept k-means run stopped at the iteration cap.
    #[error("k-means did not converge within {max_iter} iterations")]
    ConvergenceNotReached {
        /// Iteration cap that was hit.
        max_iter: usize,
    },
}
