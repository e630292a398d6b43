use crate::error::{Error, Result};

#[inline]
pub(crate) fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Flatten equal-length rows into row-major storage.
///
/// Returns the flat buffer and the row dimension.
pub(crate) fn flatten_rows(data: &[Vec<f64>]) -> Result<(Vec<f64>, usize)> {
    let Some(first) = data.first() else {
        return Err(Error::EmptyInput);
    };

    let d = first.len();
    if d == 0 {
        return Err(Error::InvalidParameter {
            name: "dimension",
            message: "must be at least 1",
        });
    }

    let mut flat: Vec<f64> = Vec::with_capacity(data.len() * d);
    for point in data {
        if point.len() != d {
            return Err(Error::DimensionMismatch {
                expected: d,
                found: point.len(),
            });
        }
        flat.extend_from_slice(point);
    }
    Ok((flat, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_is_row_major() {
        let (flat, d) = flatten_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(d, 2);
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn flatten_rejects_ragged_rows() {
        let err = flatten_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn squared_euclidean_basic() {
        assert_eq!(squared_euclidean(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }
}
