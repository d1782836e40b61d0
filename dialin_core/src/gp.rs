//! RBF-kernel Gaussian-process posterior and Expected Improvement.

use crate::linalg::{self, dot};

/// Kernel output variance.
pub const OUTPUT_VARIANCE: f64 = 1.0;
/// Observation noise added to the kernel diagonal.
pub const NOISE: f64 = 1e-6;
/// Floor for the posterior variance.
pub const VARIANCE_FLOOR: f64 = 1e-12;
/// Lengthscale floor.
pub const LENGTHSCALE_FLOOR: f64 = 0.12;
/// Lengthscale used when fewer than two training points exist.
pub const LENGTHSCALE_FALLBACK: f64 = 0.25;

/// Isotropic RBF kernel `v * exp(-0.5 * sum(((x-z)/l)^2))`.
pub fn rbf(x: &[f64], z: &[f64], lengthscale: f64, variance: f64) -> f64 {
    let s: f64 = x
        .iter()
        .zip(z)
        .map(|(a, b)| {
            let u = (a - b) / lengthscale;
            u * u
        })
        .sum();
    variance * (-0.5 * s).exp()
}

/// Lengthscale heuristic: mean pairwise Euclidean distance between the
/// (normalized) training points, floored at [`LENGTHSCALE_FLOOR`];
/// [`LENGTHSCALE_FALLBACK`] when no pair exists.
pub fn lengthscale_from(x: &[Vec<f64>]) -> f64 {
    let n = x.len();
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            let d2: f64 = x[i]
                .iter()
                .zip(&x[j])
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            sum += d2.sqrt();
            count += 1;
        }
    }
    if count == 0 {
        return LENGTHSCALE_FALLBACK;
    }
    (sum / count as f64).max(LENGTHSCALE_FLOOR)
}

/// Posterior mean and standard deviation at one candidate point.
#[derive(Debug, Clone, Copy)]
pub struct Posterior {
    pub mean: f64,
    pub sd: f64,
}

/// A fitted GP: kernel matrix and the solved target weights.
#[derive(Debug, Clone)]
pub struct Gp {
    train: Vec<Vec<f64>>,
    kernel: Vec<Vec<f64>>,
    alpha: Vec<f64>,
    lengthscale: f64,
}

impl Gp {
    /// Fit on normalized training points and targets.
    pub fn fit(train: Vec<Vec<f64>>, y: &[f64], lengthscale: f64) -> Self {
        let n = train.len();
        let mut kernel = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                let mut k = rbf(&train[i], &train[j], lengthscale, OUTPUT_VARIANCE);
                if i == j {
                    k += NOISE;
                }
                kernel[i][j] = k;
            }
        }
        let alpha = linalg::solve_lenient(&kernel, y, linalg::KERNEL_PIVOT_EPS).x;
        Self {
            train,
            kernel,
            alpha,
            lengthscale,
        }
    }

    pub fn lengthscale(&self) -> f64 {
        self.lengthscale
    }

    /// Posterior at a candidate: mean from the precomputed weights,
    /// variance from one kernel solve against the similarity vector,
    /// floored at [`VARIANCE_FLOOR`].
    pub fn posterior(&self, xstar: &[f64]) -> Posterior {
        let kstar: Vec<f64> = self
            .train
            .iter()
            .map(|xi| rbf(xi, xstar, self.lengthscale, OUTPUT_VARIANCE))
            .collect();
        let mean = dot(&kstar, &self.alpha);
        let w = linalg::solve_lenient(&self.kernel, &kstar, linalg::KERNEL_PIVOT_EPS).x;
        let kss = OUTPUT_VARIANCE + NOISE;
        let var = (kss - dot(&kstar, &w)).max(VARIANCE_FLOOR);
        Posterior {
            mean,
            sd: var.sqrt(),
        }
    }
}

/// Standard normal density.
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Standard normal CDF, Abramowitz-Stegun polynomial approximation
/// (accurate to ~1e-7, plenty for an acquisition function).
pub fn norm_cdf(x: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.2316419 * x.abs());
    let d = 0.3989423 * (-x * x / 2.0).exp();
    let p = d * t
        * (0.3193815 + t * (-0.3565638 + t * (1.781478 + t * (-1.821256 + t * 1.330274))));
    if x > 0.0 { 1.0 - p } else { p }
}

/// Expected Improvement for maximization. Zero when the posterior has
/// (numerically) no uncertainty.
pub fn expected_improvement(mu: f64, sigma: f64, best: f64, xi: f64) -> f64 {
    if sigma < 1e-12 {
        return 0.0;
    }
    let z = (mu - best - xi) / sigma;
    (mu - best - xi) * norm_cdf(z) + sigma * norm_pdf(z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_symmetry_and_tails() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-6);
        assert!(norm_cdf(6.0) > 0.999_999);
        assert!(norm_cdf(-6.0) < 1e-6);
        let x = 1.234;
        assert!((norm_cdf(x) + norm_cdf(-x) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn kernel_peaks_at_identity() {
        let x = [0.3, 0.7];
        assert!((rbf(&x, &x, 0.5, 1.0) - 1.0).abs() < 1e-12);
        assert!(rbf(&x, &[0.9, 0.1], 0.5, 1.0) < 1.0);
    }
}
