//! Dense Gauss-Jordan elimination for the small systems this crate
//! solves (ridge normal equations of size 6, GP kernel systems of size
//! n-trials).
//!
//! Two entry points share one elimination routine:
//!
//! - [`solve_lenient`] skips a column whose pivot magnitude falls below
//!   the threshold and reports how many were skipped. For the ridge
//!   normal equations a skipped column leaves that weight at its
//!   prior-dominated right-hand-side value; regularization on the
//!   diagonal makes this branch effectively unreachable, so recurrence is
//!   a data-quality signal, not a crash.
//! - [`solve`] is the strict variant returning [`SingularMatrix`] when
//!   any pivot was skipped.

pub use crate::error::SingularMatrix;

/// Pivot threshold for the ridge normal equations.
pub const RIDGE_PIVOT_EPS: f64 = 1e-9;
/// Pivot threshold for GP kernel systems (noise-regularized).
pub const KERNEL_PIVOT_EPS: f64 = 1e-12;

/// Output of the lenient solver.
#[derive(Debug, Clone)]
pub struct Solution {
    pub x: Vec<f64>,
    /// Columns whose pivot fell below the threshold and were skipped.
    pub skipped_pivots: usize,
}

/// Solve `A x = b` in place on an augmented copy, with partial pivoting.
/// Columns with a sub-threshold pivot are skipped rather than eliminated.
pub fn solve_lenient(a: &[Vec<f64>], b: &[f64], pivot_eps: f64) -> Solution {
    let n = a.len();
    debug_assert_eq!(n, b.len());
    debug_assert!(a.iter().all(|row| row.len() == n));

    // Augmented matrix [A | b]
    let mut m: Vec<Vec<f64>> = a
        .iter()
        .zip(b)
        .map(|(row, &bi)| {
            let mut r = Vec::with_capacity(n + 1);
            r.extend_from_slice(row);
            r.push(bi);
            r
        })
        .collect();

    let mut skipped = 0usize;
    for col in 0..n {
        let mut piv = col;
        for r in (col + 1)..n {
            if m[r][col].abs() > m[piv][col].abs() {
                piv = r;
            }
        }
        if m[piv][col].abs() < pivot_eps {
            skipped += 1;
            continue;
        }
        if piv != col {
            m.swap(piv, col);
        }
        let div = m[col][col];
        for c in col..=n {
            m[col][c] /= div;
        }
        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = m[r][col];
            if factor == 0.0 {
                continue;
            }
            for c in col..=n {
                m[r][c] -= factor * m[col][c];
            }
        }
    }

    Solution {
        x: m.into_iter().map(|row| row[n]).collect(),
        skipped_pivots: skipped,
    }
}

/// Strict solve: any skipped pivot is an error.
pub fn solve(a: &[Vec<f64>], b: &[f64], pivot_eps: f64) -> Result<Vec<f64>, SingularMatrix> {
    let n = a.len();
    let sol = solve_lenient(a, b, pivot_eps);
    if sol.skipped_pivots > 0 {
        // Re-scan for the first offending column so the error is precise.
        let column = (0..n)
            .find(|&col| a.iter().map(|row| row[col].abs()).fold(0.0, f64::max) < pivot_eps)
            .unwrap_or(0);
        return Err(SingularMatrix { column });
    }
    Ok(sol.x)
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
