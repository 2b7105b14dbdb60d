// Magnetization curves and their normalization.

/// One measured temperature point of a (J, k) pair.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub temperature: f64,
    /// Mean |m| over the sampling sweeps. Raw until the owning curve is
    /// normalized, then rescaled into [0, 1].
    pub magnetization: f64,
    /// Susceptibility: variance of the |m| series at this temperature.
    pub susceptibility: f64,
    /// Energy fluctuation: Var(E)/T, 0 at T = 0.
    pub energy_fluctuation: f64,
    /// Set when the slow-convergence check failed for this point.
    pub low_confidence: bool,
}

/// Ordered magnetization-vs-temperature samples for one (J, k) pair.
#[derive(Debug, Clone)]
pub struct Curve {
    pub coupling: f64,
    pub field: f64,
    pub samples: Vec<Sample>,
    /// Whole curve measured zero; normalization left it untouched.
    pub degenerate: bool,
    normalized: bool,
}

impl Curve {
    pub fn raw(coupling: f64, field: f64, samples: Vec<Sample>) -> Self {
        Self {
            coupling,
            field,
            samples,
            degenerate: false,
            normalized: false,
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Largest magnetization anywhere in the curve. Values are means of
    /// |m|, so this is also the largest absolute value.
    pub fn max_magnetization(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.magnetization)
            .fold(0.0, f64::max)
    }

    /// Rescale every magnetization by the curve maximum so the peak is
    /// exactly 1.0 and all values lie in [0, 1], matching the convention of
    /// the externally produced loudness curves. An all-zero curve stays
    /// all-zero and is flagged degenerate instead of dividing by zero.
    pub fn normalize(&mut self) {
        let max = self.max_magnetization();
        if max > 0.0 {
            for sample in &mut self.samples {
                sample.magnetization /= max;
            }
        } else {
            self.degenerate = true;
        }
        self.normalized = true;
    }

    pub fn low_confidence_points(&self) -> usize {
        self.samples.iter().filter(|s| s.low_confidence).count()
    }
}
