//! Dense symmetric positive-definite solves for regression on covariances.

/// Pivots below this fraction of their diagonal entry count as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Lower-triangular Cholesky factor `L` with `A = L Lᵀ`, row-major.
#[derive(Debug, Clone)]
pub(crate) struct Cholesky {
    n: usize,
    l: Vec<f64>,
}

impl Cholesky {
    /// Factor the row-major `n × n` matrix `a`. `None` if `a` is not
    /// numerically positive definite.
    pub(crate) fn factor(a: &[f64], n: usize) -> Option<Self> {
        debug_assert_eq!(a.len(), n * n);
        let mut l = vec![0.0; n * n];
        for j in 0..n {
            let mut d = a[j * n + j];
            for k in 0..j {
                d -= l[j * n + k] * l[j * n + k];
            }
            if !d.is_finite() || d <= SINGULAR_TOLERANCE * a[j * n + j].abs() {
                return None;
            }
            let pivot = d.sqrt();
            l[j * n + j] = pivot;
            for i in j + 1..n {
                let mut s = a[i * n + j];
                for k in 0..j {
                    s -= l[i * n + k] * l[j * n + k];
                }
                l[i * n + j] = s / pivot;
            }
        }
        Some(Self { n, l })
    }

    /// Solve `A x = b`.
    pub(crate) fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = self.n;
        let mut y = b.to_vec();
        for i in 0..n {
            for k in 0..i {
                y[i] -= self.l[i * n + k] * y[k];
            }
            y[i] /= self.l[i * n + i];
        }
        for i in (0..n).rev() {
            for k in i + 1..n {
                y[i] -= self.l[k * n + i] * y[k];
            }
            y[i] /= self.l[i * n + i];
        }
        y
    }
}
