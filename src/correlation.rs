//! Fitness/similarity correlation.
//!
//! Pearson's `r` between per-candidate fitness and similarity, with a
//! two-sided p-value from Student's t distribution (`n - 2` degrees of
//! freedom). Degenerate inputs are errors, never NaN.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::CorrelationConfig;
use crate::error::{CheckError, CheckResult};
use crate::record::SimilarityRecord;

/// Pearson correlation and its two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Correlation coefficient in `[-1, 1]`.
    pub r: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Correlate fitness with similarity.
///
/// With `exclude_best`, the candidate with the lowest fitness (first on
/// ties) is removed from both series first.
///
/// # Errors
///
/// - [`CheckError::InvalidInput`] if the series are empty or differ in length
/// - [`CheckError::UndefinedCorrelation`] if fewer than two points remain or
///   either series has zero variance
pub fn correlate(
    fitnesses: &[f64],
    similarities: &[f64],
    exclude_best: bool,
) -> CheckResult<CorrelationResult> {
    if fitnesses.is_empty() || similarities.is_empty() {
        return Err(CheckError::invalid_input("fitnesses and similarities must be non-empty"));
    }
    if fitnesses.len() != similarities.len() {
        return Err(CheckError::invalid_input(format!(
            "{} fitnesses but {} similarities",
            fitnesses.len(),
            similarities.len()
        )));
    }

    if exclude_best {
        let (f, s) = without_best(fitnesses, similarities);
        pearson(&f, &s)
    } else {
        pearson(fitnesses, similarities)
    }
}

/// Both series without the element at the first minimum fitness.
#[must_use]
pub fn without_best(fitnesses: &[f64], similarities: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let best = fitnesses
        .iter()
        .enumerate()
        .fold(None, |acc: Option<(usize, f64)>, (i, &f)| match acc {
            Some((_, min)) if f >= min => acc,
            _ => Some((i, f)),
        })
        .map(|(i, _)| i);

    let keep = |i: &usize| Some(*i) != best;
    let f = (0..fitnesses.len()).filter(keep).map(|i| fitnesses[i]).collect();
    let s = (0..similarities.len()).filter(keep).map(|i| similarities[i]).collect();
    (f, s)
}

/// Pearson correlation of two equal-length series.
///
/// # Errors
///
/// Returns [`CheckError::UndefinedCorrelation`] for fewer than two points or
/// zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> CheckResult<CorrelationResult> {
    let n = x.len();
    if n != y.len() {
        return Err(CheckError::invalid_input(format!("{n} x values but {} y values", y.len())));
    }
    if n < 2 {
        return Err(CheckError::undefined_correlation(format!(
            "need at least 2 points, got {n}"
        )));
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if is_constant(x) || sxx == 0.0 {
        return Err(CheckError::undefined_correlation("fitnesses have zero variance"));
    }
    if is_constant(y) || syy == 0.0 {
        return Err(CheckError::undefined_correlation("similarities have zero variance"));
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    Ok(CorrelationResult {
        r,
        p_value: two_sided_p(r, n),
    })
}

/// Every value equals the first. Checked on the inputs because the mean of a
/// constant non-integer series may round away from the value itself.
#[allow(clippy::float_cmp)]
fn is_constant(values: &[f64]) -> bool {
    values.first().map_or(true, |&first| values.iter().all(|&v| v == first))
}

/// Two-sided p-value of `r` for `n` points.
///
/// With two points every line fits perfectly and the test has no degrees of
/// freedom, so the p-value is 1.
fn two_sided_p(r: f64, n: usize) -> f64 {
    if n <= 2 {
        return 1.0;
    }
    if r.abs() >= 1.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    let t2 = r * r * df / (1.0 - r * r);
    regularized_incomplete_beta(df / (df + t2), df / 2.0, 0.5).clamp(0.0, 1.0)
}

/// Natural log of the gamma function (Lanczos, g = 7).
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula.
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFS[0];
    for (i, &c) in COEFFS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Regularized incomplete beta function `I_x(a, b)`.
fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    // The continued fraction converges fast only on this side.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

/// Continued fraction for the incomplete beta (modified Lentz).
fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

/// One row of a correlation sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRow {
    /// Dataset directory, e.g. `TSPA`.
    pub dataset: String,
    /// Method directory, e.g. `common_edges_best`.
    pub method: String,
    /// Whether the best candidate was excluded.
    pub excluded_best: bool,
    /// Correlation result.
    pub result: CorrelationResult,
}

/// Correlate every `<base>/<dataset>/<method>/<record_file>`.
///
/// Methods ending in `_best` exclude the best candidate, since its similarity
/// to itself would dominate. Missing files and unusable series are logged and
/// skipped.
#[must_use]
pub fn correlate_tree(base: &Path, record_file: &str, config: &CorrelationConfig) -> Vec<CorrelationRow> {
    let mut rows = Vec::new();

    for dataset in &config.datasets {
        for method in &config.methods {
            let path = base.join(dataset).join(method).join(record_file);
            if !path.exists() {
                warn!(path = %path.display(), "file not found");
                continue;
            }

            let exclude_best = method.ends_with("_best");
            let outcome = SimilarityRecord::load(&path)
                .and_then(|r| correlate(&r.fitnesses, &r.similarities, exclude_best));

            match outcome {
                Ok(result) => {
                    info!(
                        dataset = %dataset,
                        method = %method,
                        r = result.r,
                        p_value = result.p_value,
                        "correlation"
                    );
                    rows.push(CorrelationRow {
                        dataset: dataset.clone(),
                        method: method.clone(),
                        excluded_best: exclude_best,
                        result,
                    });
                }
                Err(e) => warn!(path = %path.display(), error = %e, "data issue, skipping"),
            }
        }
    }

    rows
}
