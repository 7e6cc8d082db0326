//! Linear structural equation models and their implied covariance.
//!
//! `x_j = Σ_{i → j} b_ij · x_i + e_j` with independent errors of variance
//! `ω_j`. Used as a noise-free data source: the implied covariance is what
//! an infinite sample from the model would estimate.

use std::collections::BTreeMap;
use std::sync::Arc;

use ges_kernel::graph::dag::topological_order;
use ges_kernel::graph::{GraphError, GraphStore, VarId, VariableSet};

use crate::covariance::{CovarianceError, CovarianceMatrix};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinearSemError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("model graph contains a directed cycle")]
    Cyclic,

    #[error("error variance of {name} must be finite and positive")]
    InvalidErrorVariance { name: String },

    #[error("coefficient on {from} -> {to} is not finite")]
    InvalidCoefficient { from: String, to: String },

    #[error(transparent)]
    Covariance(#[from] CovarianceError),
}

/// A DAG with edge coefficients and error variances.
#[derive(Debug, Clone)]
pub struct LinearSem {
    variables: Arc<VariableSet>,
    coefficients: BTreeMap<(VarId, VarId), f64>,
    error_variances: Vec<f64>,
}

impl LinearSem {
    /// Model with no edges and unit error variances.
    #[must_use]
    pub fn new(variables: Arc<VariableSet>) -> Self {
        let n = variables.len();
        Self {
            variables,
            coefficients: BTreeMap::new(),
            error_variances: vec![1.0; n],
        }
    }

    fn id(&self, name: &str) -> Result<VarId, GraphError> {
        self.variables
            .id(name)
            .ok_or_else(|| GraphError::UnknownVariable {
                name: name.to_string(),
            })
    }

    /// Add or replace the edge `from → to` with coefficient `coef`.
    ///
    /// # Errors
    ///
    /// Unknown names, self loops, and non-finite coefficients are rejected.
    pub fn with_edge(mut self, from: &str, to: &str, coef: f64) -> Result<Self, LinearSemError> {
        let (a, b) = (self.id(from)?, self.id(to)?);
        if a == b {
            return Err(GraphError::SelfLoop {
                name: from.to_string(),
            }
            .into());
        }
        if !coef.is_finite() {
            return Err(LinearSemError::InvalidCoefficient {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.coefficients.remove(&(b, a));
        self.coefficients.insert((a, b), coef);
        Ok(self)
    }

    /// # Errors
    ///
    /// Unknown name, or a variance that is not finite and positive.
    pub fn with_error_variance(
        mut self,
        name: &str,
        variance: f64,
    ) -> Result<Self, LinearSemError> {
        let v = self.id(name)?;
        if !variance.is_finite() || variance <= 0.0 {
            return Err(LinearSemError::InvalidErrorVariance {
                name: name.to_string(),
            });
        }
        self.error_variances[v.index()] = variance;
        Ok(self)
    }

    #[must_use]
    pub fn variables(&self) -> &Arc<VariableSet> {
        &self.variables
    }

    /// The model's DAG.
    #[must_use]
    pub fn dag(&self) -> GraphStore {
        let mut g = GraphStore::new(Arc::clone(&self.variables));
        for &(a, b) in self.coefficients.keys() {
            g.add_directed_edge(a, b);
        }
        g
    }

    /// Population covariance implied by the model, labeled with
    /// `sample_size` for scoring.
    ///
    /// # Errors
    ///
    /// Returns [`LinearSemError::Cyclic`] if the edges form a cycle, or a
    /// [`CovarianceError`] if `sample_size < 2`.
    pub fn implied_covariance(
        &self,
        sample_size: usize,
    ) -> Result<CovarianceMatrix, LinearSemError> {
        let dag = self.dag();
        let order = topological_order(&dag).ok_or(LinearSemError::Cyclic)?;
        let n = self.variables.len();
        let mut sigma = vec![0.0; n * n];

        for (pos, &j) in order.iter().enumerate() {
            let parents: Vec<(usize, f64)> = dag
                .parents(j)
                .into_iter()
                .map(|p| {
                    let b = self.coefficients.get(&(p, j)).copied().unwrap_or_default();
                    (p.index(), b)
                })
                .collect();
            let j = j.index();
            // Covariance with every variable already placed.
            for &k in &order[..pos] {
                let k = k.index();
                let c: f64 = parents.iter().map(|&(p, b)| b * sigma[p * n + k]).sum();
                sigma[j * n + k] = c;
                sigma[k * n + j] = c;
            }
            let mut var = self.error_variances[j];
            for &(p, bp) in &parents {
                for &(q, bq) in &parents {
                    var += bp * bq * sigma[p * n + q];
                }
            }
            sigma[j * n + j] = var;
        }

        let rows: Vec<Vec<f64>> = sigma.chunks(n.max(1)).take(n).map(<[f64]>::to_vec).collect();
        Ok(CovarianceMatrix::from_rows(
            Arc::clone(&self.variables),
            &rows,
            sample_size,
        )?)
    }
}
