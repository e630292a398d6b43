//! Row-normalized eigenvector embedding (Ng, Jordan & Weiss, 2001).
//!
//! The `n` eigenvectors of the `n` smallest Laplacian eigenvalues are stacked as
//! columns of an `N x n` matrix `U`; row `i` of `U`, scaled to unit length, is the
//! embedding of item `i`.
//!
//! For a graph with `n` connected components the bottom eigenspace is spanned by
//! `D^{1/2} 1_C` per component `C`. Row normalization removes the `D^{1/2}`
//! scaling, so every item of a component maps to the same unit vector and
//! different components map to orthogonal ones.
//!
//! Eigenvectors are only defined up to sign, and up to rotation inside a repeated
//! eigenvalue. Tied eigenvalues keep the order the solver returns them in.

use crate::error::{Error, Result};
use nalgebra::{DMatrix, SymmetricEigen};
use tracing::debug;

/// Dense `n_items x dim` row-major embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    data: Vec<f64>,
    n_items: usize,
    dim: usize,
}

impl Embedding {
    /// Zero-filled embedding of the given shape.
    pub fn zeros(n_items: usize, dim: usize) -> Self {
        Self {
            data: vec![0.0; n_items * dim],
            n_items,
            dim,
        }
    }

    /// Number of rows (items).
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of columns (eigenvectors kept).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Coordinates of item `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Iterate rows in item order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.dim.max(1))
    }

    /// Row-major backing storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Copy into one `Vec` per item.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}

/// Output of [`spectral_embedding`].
#[derive(Debug, Clone)]
pub struct SpectralEmbedding {
    /// Row-normalized embedding, one row per item.
    pub embedding: Embedding,
    /// The `dim` smallest eigenvalues, ascending.
    pub eigenvalues: Vec<f64>,
    /// Items whose row had exactly zero norm before the epsilon guard.
    pub degenerate_rows: Vec<usize>,
}

/// Embed the items of `laplacian` into its bottom `n_components` eigenvectors.
///
/// Each row is divided by `||row|| + epsilon`.
pub fn spectral_embedding(
    laplacian: &DMatrix<f64>,
    n_components: usize,
    epsilon: f64,
) -> Result<SpectralEmbedding> {
    let (n, cols) = laplacian.shape();
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    if n != cols {
        return Err(Error::InvalidDimensions {
            row: 0,
            expected: n,
            found: cols,
        });
    }
    if n_components == 0 || n_components > n {
        return Err(Error::InvalidConfiguration {
            requested: n_components,
            n_items: n,
        });
    }

    let max_sweeps = (100 * n).max(1000);
    let eigen = SymmetricEigen::try_new(laplacian.clone(), f64::EPSILON, max_sweeps)
        .ok_or(Error::EigenDecomposition { size: n })?;

    // Stable: tied eigenvalues stay in solver order.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    order.truncate(n_components);

    let eigenvalues: Vec<f64> = order.iter().map(|&c| eigen.eigenvalues[c]).collect();

    let mut embedding = Embedding::zeros(n, n_components);
    let mut degenerate_rows = Vec::new();
    for i in 0..n {
        let row = embedding.row_mut(i);
        for (slot, &c) in row.iter_mut().zip(&order) {
            *slot = eigen.eigenvectors[(i, c)];
        }
        let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm == 0.0 {
            degenerate_rows.push(i);
        }
        let scale = 1.0 / (norm + epsilon);
        for x in row.iter_mut() {
            *x *= scale;
        }
    }

    debug!(
        n,
        n_components,
        smallest = eigenvalues.first().copied().unwrap_or(f64::NAN),
        largest_kept = eigenvalues.last().copied().unwrap_or(f64::NAN),
        "computed spectral embedding"
    );

    Ok(SpectralEmbedding {
        embedding,
        eigenvalues,
        degenerate_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::laplacian::normalized_laplacian;

    fn two_blocks() -> DMatrix<f64> {
        DMatrix::from_fn(10, 10, |i, j| if (i < 5) == (j < 5) { 1.0 } else { 0.0 })
    }

    #[test]
    fn eigenvalues_ascending_and_rows_unit() {
        let w = DMatrix::from_fn(8, 8, |i, j| {
            let d = (i as f64 - j as f64).abs();
            (-d * d / 4.0).exp()
        });
        let lap = normalized_laplacian(&w, f64::EPSILON).unwrap();
        let emb = spectral_embedding(lap.matrix(), 3, f64::EPSILON).unwrap();

        assert_eq!(emb.eigenvalues.len(), 3);
        assert!(emb.eigenvalues.windows(2).all(|p| p[0] <= p[1]));
        assert!(emb.eigenvalues[0].abs() < 1e-10);

        assert_eq!(emb.embedding.n_items(), 8);
        assert_eq!(emb.embedding.dim(), 3);
        for row in emb.embedding.rows() {
            let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9, "row norm {norm}");
        }
        assert!(emb.degenerate_rows.is_empty());
    }

    #[test]
    fn disconnected_blocks_collapse_to_two_points() {
        let lap = normalized_laplacian(&two_blocks(), f64::EPSILON).unwrap();
        let emb = spectral_embedding(lap.matrix(), 2, f64::EPSILON).unwrap();

        assert!(emb.eigenvalues.iter().all(|v| v.abs() < 1e-10));

        let e = &emb.embedding;
        let dist = |a: &[f64], b: &[f64]| -> f64 {
            a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
        };
        for i in 1..5 {
            assert!(dist(e.row(0), e.row(i)) < 1e-6);
            assert!(dist(e.row(5), e.row(5 + i)) < 1e-6);
        }
        // Orthogonal unit vectors are sqrt(2) apart.
        assert!((dist(e.row(0), e.row(5)) - 2.0f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn zero_rows_are_flagged() {
        // Only item 0 carries weight in the bottom eigenvector.
        let lap = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![0.0, 1.0, 2.0]));
        let emb = spectral_embedding(&lap, 1, f64::EPSILON).unwrap();

        assert!(emb.eigenvalues[0].abs() < 1e-12);
        assert!((emb.embedding.row(0)[0].abs() - 1.0).abs() < 1e-9);
        assert_eq!(emb.degenerate_rows, vec![1, 2]);
    }

    #[test]
    fn rejects_bad_component_count() {
        let lap = DMatrix::<f64>::identity(3, 3);
        assert!(matches!(
            spectral_embedding(&lap, 0, f64::EPSILON),
            Err(Error::InvalidConfiguration { requested: 0, .. })
        ));
        assert!(matches!(
            spectral_embedding(&lap, 4, f64::EPSILON),
            Err(Error::InvalidConfiguration {
                requested: 4,
                n_items: 3
            })
        ));
    }

    #[test]
    fn embedding_accessors() {
        let mut e = Embedding::zeros(2, 2);
        e.row_mut(1).copy_from_slice(&[3.0, 4.0]);
        assert_eq!(e.as_slice(), &[0.0, 0.0, 3.0, 4.0]);
        assert_eq!(e.to_rows(), vec![vec![0.0, 0.0], vec![3.0, 4.0]]);
    }
}
