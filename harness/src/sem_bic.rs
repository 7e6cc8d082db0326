//! Linear Gaussian BIC score over a covariance matrix.
//!
//! `score(y | Pa) = 2L − c·k·ln n − prior(k)`, where
//! `L = −n/2 · (ln(2πσ²) + 1)`, `σ²` is the residual variance of `y`
//! regressed on `Pa`, `k = |Pa|`, `c` the penalty discount and `prior` the
//! optional structure prior (zero by default).

use std::f64::consts::PI;

use ges_kernel::graph::VarId;
use ges_search::LocalScore;

use crate::covariance::CovarianceMatrix;
use crate::linalg::Cholesky;

/// Rejected score parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreConfigError {
    #[error("penalty discount must be finite and non-negative, got {value}")]
    InvalidPenalty { value: f64 },

    #[error("structure prior must be in [0, {num_vars}), got {value}")]
    InvalidStructurePrior { value: f64, num_vars: usize },
}

/// Gaussian BIC with a penalty discount.
#[derive(Debug, Clone)]
pub struct SemBicScore {
    covariance: CovarianceMatrix,
    penalty_discount: f64,
    structure_prior: f64,
    log_n: f64,
}

impl SemBicScore {
    /// # Errors
    ///
    /// Returns [`ScoreConfigError::InvalidPenalty`] if `penalty_discount` is
    /// negative or not finite.
    pub fn new(
        covariance: CovarianceMatrix,
        penalty_discount: f64,
    ) -> Result<Self, ScoreConfigError> {
        if !penalty_discount.is_finite() || penalty_discount < 0.0 {
            return Err(ScoreConfigError::InvalidPenalty {
                value: penalty_discount,
            });
        }
        let log_n = (covariance.sample_size() as f64).ln();
        Ok(Self {
            covariance,
            penalty_discount,
            structure_prior: 0.0,
            log_n,
        })
    }

    /// Set the expected number of parents per variable. Zero disables the
    /// prior.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreConfigError::InvalidStructurePrior`] unless
    /// `0 <= prior < num_vars`.
    pub fn with_structure_prior(mut self, prior: f64) -> Result<Self, ScoreConfigError> {
        let num_vars = self.covariance.dim();
        if !prior.is_finite() || prior < 0.0 || prior >= num_vars as f64 {
            return Err(ScoreConfigError::InvalidStructurePrior {
                value: prior,
                num_vars,
            });
        }
        self.structure_prior = prior;
        Ok(self)
    }

    #[must_use]
    pub fn covariance(&self) -> &CovarianceMatrix {
        &self.covariance
    }

    #[must_use]
    pub fn penalty_discount(&self) -> f64 {
        self.penalty_discount
    }

    /// Variance of `target` not explained by a linear regression on
    /// `parents`. `None` if the parents' covariance is singular.
    #[must_use]
    pub fn residual_variance(&self, target: VarId, parents: &[VarId]) -> Option<f64> {
        let y = target.index();
        let idx: Vec<usize> = parents.iter().map(|p| p.index()).collect();
        let var_y = self.covariance.get(y, y);
        if idx.is_empty() {
            return Some(var_y);
        }
        let sxx = self.covariance.submatrix(&idx);
        let sxy: Vec<f64> = idx.iter().map(|&i| self.covariance.get(i, y)).collect();
        let coefs = Cholesky::factor(&sxx, idx.len())?.solve(&sxy);
        let explained: f64 = coefs.iter().zip(&sxy).map(|(b, c)| b * c).sum();
        Some(var_y - explained)
    }

    fn prior_penalty(&self, k: usize) -> f64 {
        if self.structure_prior <= 0.0 {
            return 0.0;
        }
        let n = self.covariance.dim() as f64;
        let p = self.structure_prior / n;
        let k = k as f64;
        -(k * p.ln() + (n - k) * (1.0 - p).ln())
    }
}

impl LocalScore for SemBicScore {
    fn num_vars(&self) -> usize {
        self.covariance.dim()
    }

    fn local_score(&self, target: VarId, parents: &[VarId]) -> Option<f64> {
        let sigma2 = self.residual_variance(target, parents)?;
        if sigma2.is_nan() || sigma2 <= 0.0 {
            return None;
        }
        let n = self.covariance.sample_size() as f64;
        let lik = -0.5 * n * ((2.0 * PI * sigma2).ln() + 1.0);
        let k = parents.len();
        let score =
            2.0 * lik - self.penalty_discount * k as f64 * self.log_n - self.prior_penalty(k);
        score.is_finite().then_some(score)
    }
}
