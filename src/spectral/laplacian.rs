//! Symmetric normalized Laplacian of a weighted graph.
//!
//! ```text
//! L_sym = I - D^{-1/2} W D^{-1/2},    D = diag(deg),  deg_i = Σ_j W_ij + ε
//! ```
//!
//! For a symmetric, non-negative `W` the result is symmetric positive
//! semi-definite with eigenvalues in `[0, 2]`. The multiplicity of the eigenvalue
//! 0 equals the number of connected components.

use crate::error::{Error, Result};
use nalgebra::DMatrix;
use tracing::debug;

/// Output of [`normalized_laplacian`].
#[derive(Debug, Clone)]
pub struct NormalizedLaplacian {
    matrix: DMatrix<f64>,
    degrees: Vec<f64>,
    isolated: Vec<usize>,
}

impl NormalizedLaplacian {
    /// The `N x N` Laplacian.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Degrees including the epsilon term.
    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// Items whose affinity row sums to exactly zero.
    pub fn isolated_nodes(&self) -> &[usize] {
        &self.isolated
    }

    /// Take the matrix, dropping the degree bookkeeping.
    pub fn into_matrix(self) -> DMatrix<f64> {
        self.matrix
    }
}

/// Copy a square affinity matrix given as rows into a `DMatrix<f64>`.
///
/// Accepts any element type that widens losslessly into `f64`.
pub fn affinity_matrix<T>(rows: &[Vec<T>]) -> Result<DMatrix<f64>>
where
    T: Copy + Into<f64>,
{
    let n = rows.len();
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
        return Err(Error::InvalidDimensions {
            row,
            expected: n,
            found: r.len(),
        });
    }
    Ok(DMatrix::from_fn(n, n, |i, j| rows[i][j].into()))
}

/// Row sums of `affinity` plus `epsilon`.
pub fn degrees(affinity: &DMatrix<f64>, epsilon: f64) -> Vec<f64> {
    affinity.row_iter().map(|row| row.sum() + epsilon).collect()
}

/// Build `I - D^{-1/2} W D^{-1/2}`.
///
/// Symmetry of `affinity` is assumed, not checked. Entry `(i, j)` is formed as
/// `δ_ij - W_ij · (d_i · d_j)`, so a symmetric input yields an exactly symmetric
/// output.
pub fn normalized_laplacian(affinity: &DMatrix<f64>, epsilon: f64) -> Result<NormalizedLaplacian> {
    let (rows, cols) = affinity.shape();
    if rows == 0 {
        return Err(Error::EmptyInput);
    }
    if rows != cols {
        return Err(Error::InvalidDimensions {
            row: 0,
            expected: rows,
            found: cols,
        });
    }

    let row_sums: Vec<f64> = affinity.row_iter().map(|row| row.sum()).collect();
    let isolated: Vec<usize> = row_sums
        .iter()
        .enumerate()
        .filter(|&(_, &sum)| sum == 0.0)
        .map(|(i, _)| i)
        .collect();
    let degrees: Vec<f64> = row_sums.iter().map(|&sum| sum + epsilon).collect();

    let inv_sqrt: Vec<f64> = degrees.iter().map(|&deg| 1.0 / deg.sqrt()).collect();
    let matrix = DMatrix::from_fn(rows, rows, |i, j| {
        let identity = if i == j { 1.0 } else { 0.0 };
        identity - affinity[(i, j)] * (inv_sqrt[i] * inv_sqrt[j])
    });

    debug!(n = rows, isolated = isolated.len(), "built normalized Laplacian");

    Ok(NormalizedLaplacian {
        matrix,
        degrees,
        isolated,
    })
}
