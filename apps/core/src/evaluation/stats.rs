//! Normal-distribution helpers for significance testing.

use serde::{Deserialize, Serialize};

/// Abramowitz & Stegun 7.1.26 coefficients (max error 1.5e-7).
const P: f64 = 0.327_591_1;
const A: [f64; 5] = [
    0.254_829_592,
    -0.284_496_736,
    1.421_413_741,
    -1.453_152_027,
    1.061_405_429,
];

/// z for a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

/// Error function. Odd: `erf(-x) == -erf(x)`.
pub fn erf(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    if x.is_infinite() {
        return x.signum();
    }
    let sign = x.signum();
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = t * (A[0] + t * (A[1] + t * (A[2] + t * (A[3] + t * A[4]))));
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Two-tailed p-value for a z-score.
pub fn two_tailed_p(z: f64) -> f64 {
    (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignificanceTest {
    pub z_score: f64,
    pub p_value: f64,
    /// `p_value < 0.05`.
    pub significant: bool,
}

/// `z = |acc - baseline| / sqrt(baseline * (1 - baseline) / n)`.
///
/// A zero-variance baseline (accuracy 0 or 1) yields an infinite z when the
/// accuracies differ and z = 0 when they do not.
pub fn two_proportion_significance(accuracy: f64, baseline: f64, n: usize) -> SignificanceTest {
    let diff = (accuracy - baseline).abs();
    let variance = if n == 0 {
        0.0
    } else {
        baseline * (1.0 - baseline) / n as f64
    };

    let z_score = if variance > 0.0 {
        diff / variance.sqrt()
    } else if diff > 0.0 && n > 0 {
        f64::INFINITY
    } else {
        0.0
    };
    let p_value = if z_score.is_infinite() {
        0.0
    } else {
        two_tailed_p(z_score)
    };

    SignificanceTest {
        z_score,
        p_value,
        significant: p_value < 0.05,
    }
}

/// `accuracy ± 1.96 * stderr`, clamped to [0, 1].
pub fn confidence_interval_95(accuracy: f64, n: usize) -> (f64, f64) {
    if n == 0 {
        return (0.0, 1.0);
    }
    let stderr = (accuracy * (1.0 - accuracy) / n as f64).sqrt();
    (
        (accuracy - Z_95 * stderr).clamp(0.0, 1.0),
        (accuracy + Z_95 * stderr).clamp(0.0, 1.0),
    )
}
