//! Ordinary least-squares line fitting.
//!
//! Degenerate inputs never fail: they produce [`LinearFit::ZERO`], which
//! callers read as "no rate information" through its zero R².

use serde::{Deserialize, Serialize};

/// Denominators below this magnitude are treated as zero.
pub const DEGENERATE_DENOMINATOR: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    pub const ZERO: LinearFit = LinearFit {
        slope: 0.0,
        intercept: 0.0,
        r_squared: 0.0,
    };

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits `y = slope * x + intercept` through the paired points.
///
/// Only the common prefix of `xs` and `ys` is used when their lengths differ.
pub fn fit(xs: &[f64], ys: &[f64]) -> LinearFit {
    let n_points = xs.len().min(ys.len());
    if n_points < 2 {
        return LinearFit::ZERO;
    }
    let (xs, ys) = (&xs[..n_points], &ys[..n_points]);
    let n = n_points as f64;

    let (sum_x, sum_y, sum_xx, sum_xy) = xs.iter().zip(ys).fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sum_x, sum_y, sum_xx, sum_xy), (&x, &y)| {
            (sum_x + x, sum_y + y, sum_xx + x * x, sum_xy + x * y)
        },
    );

    let denominator = n * sum_xx - sum_x * sum_x;
    if !denominator.is_finite() || denominator.abs() < DEGENERATE_DENOMINATOR {
        return LinearFit::ZERO;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    if !slope.is_finite() || !intercept.is_finite() {
        return LinearFit::ZERO;
    }

    LinearFit {
        slope,
        intercept,
        r_squared: r_squared_against(slope, intercept, xs, ys),
    }
}

/// Coefficient of determination of the line `slope * x + intercept` measured
/// against the observations `ys`.
///
/// The line does not have to be the least-squares fit of `ys`; segment search
/// scores a line fitted on smoothed data against the raw readings. The result
/// is clamped to `[0, 1]`, and a zero-variance or non-finite series yields 0.
pub fn r_squared_against(slope: f64, intercept: f64, xs: &[f64], ys: &[f64]) -> f64 {
    let n_points = xs.len().min(ys.len());
    if n_points == 0 {
        return 0.0;
    }
    let (xs, ys) = (&xs[..n_points], &ys[..n_points]);

    let mean_y = ys.iter().sum::<f64>() / n_points as f64;
    let (ss_res, ss_tot) = xs.iter().zip(ys).fold((0.0, 0.0), |(ss_res, ss_tot), (&x, &y)| {
        let residual = y - (slope * x + intercept);
        let deviation = y - mean_y;
        (ss_res + residual * residual, ss_tot + deviation * deviation)
    });

    if ss_tot <= f64::EPSILON * n_points as f64 {
        return 0.0;
    }
    let r_squared = 1.0 - ss_res / ss_tot;
    if r_squared.is_nan() {
        0.0
    } else {
        r_squared.clamp(0.0, 1.0)
    }
}
