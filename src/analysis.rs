// Statistics shared by the sweep engine and the test suite.

use std::f64::consts::PI;

/// Welford online mean / variance.
#[derive(Debug, Default, Clone)]
pub struct OnlineStats {
    n: u64,
    mean: f64,
    m2: f64,
}

impl OnlineStats {
    pub fn push(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn var(&self) -> f64 {
        if self.n > 1 {
            self.m2 / (self.n - 1) as f64
        } else {
            0.0
        }
    }

    pub fn std(&self) -> f64 {
        self.var().sqrt()
    }
}

/// Population variance of a slice.
pub fn variance(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    series.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n
}

/// Variance of the trailing `fraction` of a measurement series. The chain is
/// considered settled when this stays below a configured threshold.
pub fn tail_variance(series: &[f64], fraction: f64) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let tail_len = ((series.len() as f64 * fraction).ceil() as usize)
        .clamp(1, series.len());
    variance(&series[series.len() - tail_len..])
}

/// Chi-squared goodness-of-fit test against expected values with known
/// errors.
pub struct ChiSquaredTest {
    chi2: f64,
    dof: usize,
    p_value: f64,
}

impl ChiSquaredTest {
    pub fn new(observed: &[f64], expected: &[f64], errors: &[f64]) -> Self {
        assert_eq!(observed.len(), expected.len());
        assert_eq!(observed.len(), errors.len());

        let chi2: f64 = observed
            .iter()
            .zip(expected.iter())
            .zip(errors.iter())
            .map(|((&obs, &exp), &err)| {
                if err > 0.0 {
                    ((obs - exp) / err).powi(2)
                } else {
                    0.0
                }
            })
            .sum();

        let dof = observed.len().saturating_sub(1).max(1);
        let p_value = chi2_p_value(chi2, dof);

        Self { chi2, dof, p_value }
    }

    pub fn chi2(&self) -> f64 {
        self.chi2
    }

    pub fn dof(&self) -> usize {
        self.dof
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    pub fn chi2_per_dof(&self) -> f64 {
        self.chi2 / self.dof as f64
    }
}

/// Upper-tail p-value of the chi-squared distribution.
fn chi2_p_value(chi2: f64, dof: usize) -> f64 {
    let k = dof as f64;

    // Wilson-Hilferty transformation for large dof.
    if dof > 30 {
        let z = ((chi2 / k).powf(1.0 / 3.0) - (1.0 - 2.0 / (9.0 * k)))
            / (2.0 / (9.0 * k)).sqrt();
        return 0.5 * (1.0 + erf(-z / std::f64::consts::SQRT_2));
    }

    // Small dof: series expansion of the regularized incomplete gamma.
    let x = chi2 / 2.0;
    let a = k / 2.0;

    if x < a + 1.0 {
        let mut sum = 1.0 / a;
        let mut term = 1.0 / a;
        for n in 1..100 {
            term *= x / (a + n as f64);
            sum += term;
            if term < 1e-10 * sum {
                break;
            }
        }
        1.0 - sum * (-x + a * x.ln() - ln_gamma(a)).exp()
    } else {
        0.5 * (1.0 + erf(-(chi2 - k).abs() / (2.0 * k).sqrt()))
    }
}

/// Abramowitz and Stegun error-function approximation.
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

/// Stirling approximation with recursion for small arguments.
fn ln_gamma(x: f64) -> f64 {
    if x > 12.0 {
        let inv_x = 1.0 / x;
        let inv_x2 = inv_x * inv_x;
        x * x.ln() - x + 0.5 * (2.0 * PI * x).ln() + inv_x / 12.0 - inv_x2 * inv_x / 360.0
    } else {
        let mut z = x;
        let mut result = 0.0;
        while z < 12.0 {
            result -= z.ln();
            z += 1.0;
        }
        result + ln_gamma(z)
    }
}
