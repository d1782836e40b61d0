//! Standardized elastic-net regression via cyclic coordinate descent.
//!
//! Used only to seed the Bayesian optimizer's initial search direction:
//! the sign of each fitted weight decides which way the seed candidate
//! steps from the most recent trial. Weights are un-standardized at the
//! end so prediction operates on raw-scale inputs.

use crate::linalg::dot;

#[derive(Debug, Clone, Copy)]
pub struct ElasticNetCfg {
    /// Overall regularization strength.
    pub alpha: f64,
    /// Mix between L1 (1.0) and L2 (0.0).
    pub l1_ratio: f64,
    pub max_iter: usize,
    /// Stop when the largest coordinate change in a sweep drops below this.
    pub tol: f64,
}

impl Default for ElasticNetCfg {
    fn default() -> Self {
        Self {
            alpha: 0.25,
            l1_ratio: 0.5,
            max_iter: 1500,
            tol: 1e-5,
        }
    }
}

/// Fitted model on the raw (un-standardized) scale.
#[derive(Debug, Clone)]
pub struct ElasticNet {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl ElasticNet {
    pub fn predict(&self, x: &[f64]) -> f64 {
        self.intercept + dot(&self.weights, x)
    }
}

fn soft_threshold(a: f64, k: f64) -> f64 {
    if a > k {
        a - k
    } else if a < -k {
        a + k
    } else {
        0.0
    }
}

/// Column means and sample standard deviations (n-1 denominator, floor 1
/// for constant columns) plus the standardized matrix.
fn standardize(x: &[Vec<f64>]) -> (Vec<Vec<f64>>, Vec<f64>, Vec<f64>) {
    let n = x.len();
    let d = x[0].len();
    let mut means = vec![0.0; d];
    let mut stds = vec![0.0; d];
    for j in 0..d {
        let s: f64 = x.iter().map(|row| row[j]).sum();
        means[j] = s / n as f64;
        let v: f64 = x.iter().map(|row| (row[j] - means[j]).powi(2)).sum();
        let sd = (v / (n.saturating_sub(1).max(1)) as f64).sqrt();
        stds[j] = if sd > 0.0 { sd } else { 1.0 };
    }
    let xs = x
        .iter()
        .map(|row| row.iter().enumerate().map(|(j, v)| (v - means[j]) / stds[j]).collect())
        .collect();
    (xs, means, stds)
}

/// Fit by cyclic coordinate descent on the centered target.
pub fn fit(x: &[Vec<f64>], y: &[f64], cfg: &ElasticNetCfg) -> ElasticNet {
    let n = x.len();
    let d = x[0].len();
    debug_assert_eq!(n, y.len());

    let y_mean: f64 = y.iter().sum::<f64>() / n as f64;
    let yc: Vec<f64> = y.iter().map(|v| v - y_mean).collect();
    let (xs, means, stds) = standardize(x);

    let l1 = cfg.alpha * cfg.l1_ratio;
    let l2 = cfg.alpha * (1.0 - cfg.l1_ratio);
    // Denominators: squared column norm plus the L2 term.
    let col_norm: Vec<f64> = (0..d)
        .map(|j| xs.iter().map(|row| row[j] * row[j]).sum::<f64>() + l2 * n as f64)
        .collect();

    let mut w = vec![0.0; d];
    for _ in 0..cfg.max_iter {
        let mut max_delta = 0.0f64;
        for j in 0..d {
            // Partial residual correlation for coordinate j.
            let mut rho = 0.0;
            for (row, &ri) in xs.iter().zip(&yc) {
                let mut pred = 0.0;
                for (k, &wk) in w.iter().enumerate() {
                    if k != j {
                        pred += row[k] * wk;
                    }
                }
                rho += row[j] * (ri - pred);
            }
            let nw = soft_threshold(rho, l1 * n as f64) / col_norm[j];
            max_delta = max_delta.max((nw - w[j]).abs());
            w[j] = nw;
        }
        if max_delta < cfg.tol {
            break;
        }
    }

    let weights: Vec<f64> = w.iter().zip(&stds).map(|(wj, sd)| wj / sd).collect();
    let intercept = y_mean - dot(&weights, &means);
    ElasticNet { weights, intercept }
}
