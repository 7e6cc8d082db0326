//! Validated covariance matrix: the data input to the Gaussian score.

use std::sync::Arc;

use ges_kernel::graph::VariableSet;
use ges_kernel::proof::canon::{canonical_json_bytes, f64_value, CanonError};
use ges_kernel::proof::hash::{canonical_hash, ContentHash};
use ges_kernel::proof::hash_domain::HashDomain;

/// Relative tolerance for the symmetry check on explicit matrices.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Rejected covariance input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CovarianceError {
    #[error("matrix has {rows} rows but {vars} variables")]
    DimensionMismatch { rows: usize, vars: usize },

    #[error("row {row} has {len} entries, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("entry ({row}, {col}) is not finite")]
    NonFinite { row: usize, col: usize },

    #[error("entries ({row}, {col}) and ({col}, {row}) differ")]
    NotSymmetric { row: usize, col: usize },

    #[error("variance of {name} is not positive")]
    NonPositiveVariance { name: String },

    #[error("sample size {sample_size} is too small (need at least 2)")]
    SampleSizeTooSmall { sample_size: usize },
}

/// Symmetric covariance matrix over named variables, with the sample size
/// it was estimated from.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix {
    variables: Arc<VariableSet>,
    sample_size: usize,
    values: Vec<f64>,
}

impl CovarianceMatrix {
    /// Build from explicit row-major values.
    ///
    /// Entries `(i, j)` and `(j, i)` must agree to a relative tolerance; the
    /// stored matrix uses their mean so it is exactly symmetric.
    ///
    /// # Errors
    ///
    /// Returns [`CovarianceError`] if the shape does not match `variables`,
    /// an entry is not finite, the matrix is not symmetric, a variance is not
    /// positive, or `sample_size < 2`.
    pub fn from_rows(
        variables: Arc<VariableSet>,
        rows: &[Vec<f64>],
        sample_size: usize,
    ) -> Result<Self, CovarianceError> {
        let n = variables.len();
        if rows.len() != n {
            return Err(CovarianceError::DimensionMismatch {
                rows: rows.len(),
                vars: n,
            });
        }
        if sample_size < 2 {
            return Err(CovarianceError::SampleSizeTooSmall { sample_size });
        }
        let mut values = vec![0.0; n * n];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(CovarianceError::RaggedRow {
                    row: i,
                    len: row.len(),
                    expected: n,
                });
            }
            for (j, &v) in row.iter().enumerate() {
                if !v.is_finite() {
                    return Err(CovarianceError::NonFinite { row: i, col: j });
                }
                values[i * n + j] = v;
            }
        }
        for i in 0..n {
            for j in i + 1..n {
                let (a, b) = (values[i * n + j], values[j * n + i]);
                let scale = a.abs().max(b.abs()).max(1.0);
                if (a - b).abs() > SYMMETRY_TOLERANCE * scale {
                    return Err(CovarianceError::NotSymmetric { row: i, col: j });
                }
                let mean = 0.5 * (a + b);
                values[i * n + j] = mean;
                values[j * n + i] = mean;
            }
        }
        let matrix = Self {
            variables,
            sample_size,
            values,
        };
        matrix.check_variances()?;
        Ok(matrix)
    }

    /// Unbiased sample covariance of `data` (one row per observation, one
    /// column per variable).
    ///
    /// # Errors
    ///
    /// Same as [`CovarianceMatrix::from_rows`], with the row count as the
    /// sample size.
    pub fn from_data(
        variables: Arc<VariableSet>,
        data: &[Vec<f64>],
    ) -> Result<Self, CovarianceError> {
        let n = variables.len();
        let rows = data.len();
        if rows < 2 {
            return Err(CovarianceError::SampleSizeTooSmall { sample_size: rows });
        }
        let mut means = vec![0.0; n];
        for (r, obs) in data.iter().enumerate() {
            if obs.len() != n {
                return Err(CovarianceError::RaggedRow {
                    row: r,
                    len: obs.len(),
                    expected: n,
                });
            }
            for (j, &v) in obs.iter().enumerate() {
                if !v.is_finite() {
                    return Err(CovarianceError::NonFinite { row: r, col: j });
                }
                means[j] += v;
            }
        }
        let count = rows as f64;
        means.iter_mut().for_each(|m| *m /= count);

        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                let s: f64 = data
                    .iter()
                    .map(|obs| (obs[i] - means[i]) * (obs[j] - means[j]))
                    .sum();
                let c = s / (count - 1.0);
                values[i * n + j] = c;
                values[j * n + i] = c;
            }
        }
        let matrix = Self {
            variables,
            sample_size: rows,
            values,
        };
        matrix.check_variances()?;
        Ok(matrix)
    }

    fn check_variances(&self) -> Result<(), CovarianceError> {
        for v in self.variables.ids() {
            if self.get(v.index(), v.index()) <= 0.0 {
                return Err(CovarianceError::NonPositiveVariance {
                    name: self.variables.name(v).to_string(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn variables(&self) -> &Arc<VariableSet> {
        &self.variables
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.dim() + j]
    }

    /// Row-major submatrix over `indices`.
    #[must_use]
    pub fn submatrix(&self, indices: &[usize]) -> Vec<f64> {
        let mut out = Vec::with_capacity(indices.len() * indices.len());
        for &i in indices {
            for &j in indices {
                out.push(self.get(i, j));
            }
        }
        out
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let n = self.dim();
        let rows: Vec<Vec<serde_json::Value>> = (0..n)
            .map(|i| (0..n).map(|j| f64_value(self.get(i, j))).collect())
            .collect();
        serde_json::json!({
            "sample_size": self.sample_size,
            "schema_version": "covariance.v1",
            "values": rows,
            "variables": self.variables.names(),
        })
    }

    /// Content hash binding a run to its exact numeric input.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonError`].
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = canonical_json_bytes(&self.to_json_value())?;
        Ok(canonical_hash(HashDomain::CovarianceInput, &bytes))
    }
}
