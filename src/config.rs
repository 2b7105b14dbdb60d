// Run-time configuration (single source of truth) and its validation.

use thiserror::Error;

/// How the lattice is obtained at each temperature point of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPolicy {
    /// Fresh random lattice per temperature, each with its own derived RNG.
    /// Temperature points are mutually independent.
    Cold,
    /// Reuse the lattice equilibrated at the previous (lower) temperature.
    /// Fewer burn-in sweeps suffice, at the cost of a strict sequential
    /// chain over the temperature grid within the pair.
    Warm,
}

/// Knobs of the advisory slow-convergence check.
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceOpts {
    /// Fraction of the sampling series inspected, from the tail.
    pub tail_fraction: f64,
    /// Tail variance above this marks the sample low-confidence.
    pub variance_threshold: f64,
    /// Cap on additional sampling sweeps run before annotating regardless.
    /// 0 disables the extension entirely.
    pub max_extra_sweeps: usize,
}

impl Default for ConvergenceOpts {
    fn default() -> Self {
        Self {
            tail_fraction: 0.25,
            variance_threshold: 2.5e-3,
            max_extra_sweeps: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Side length L of the square lattice.
    pub lattice_size: usize,
    /// Coupling constants J to sweep.
    pub couplings: Vec<f64>,
    /// External field strengths k to sweep.
    pub fields: Vec<f64>,
    pub t_min: f64,
    pub t_max: f64,
    /// Number of temperature points spanning [t_min, t_max].
    pub n_temps: usize,
    /// Burn-in sweeps per temperature point.
    pub equilibration_sweeps: usize,
    /// Measured sweeps per temperature point.
    pub sampling_sweeps: usize,
    /// Base seed; every task derives its own stream from it.
    pub seed: u64,
    pub start_policy: StartPolicy,
    pub convergence: ConvergenceOpts,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lattice_size: 32,
            couplings: vec![1.0],
            fields: vec![0.0],
            t_min: 0.5,
            t_max: 4.0,
            n_temps: 36,
            equilibration_sweeps: 500,
            sampling_sweeps: 1000,
            seed: 42,
            start_policy: StartPolicy::Cold,
            convergence: ConvergenceOpts::default(),
        }
    }
}

/// Rejected before any simulation starts; no partial output is produced.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("lattice_size must be positive, got {0}")]
    LatticeSize(usize),
    #[error("couplings must not be empty")]
    EmptyCouplings,
    #[error("fields must not be empty")]
    EmptyFields,
    #[error("n_temps must be positive, got {0}")]
    TemperatureCount(usize),
    #[error("temperature range is malformed: min {min} must be below max {max}")]
    TemperatureRange { min: f64, max: f64 },
    #[error("temperatures must be non-negative and finite, got min {0}")]
    NegativeTemperature(f64),
    #[error("{name} must be finite")]
    NonFinite { name: &'static str },
    #[error("convergence tail_fraction must lie in (0, 1], got {0}")]
    TailFraction(f64),
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lattice_size == 0 {
            return Err(ConfigError::LatticeSize(self.lattice_size));
        }
        if self.couplings.is_empty() {
            return Err(ConfigError::EmptyCouplings);
        }
        if self.fields.is_empty() {
            return Err(ConfigError::EmptyFields);
        }
        if self.n_temps == 0 {
            return Err(ConfigError::TemperatureCount(self.n_temps));
        }
        if !self.couplings.iter().all(|j| j.is_finite()) {
            return Err(ConfigError::NonFinite { name: "couplings" });
        }
        if !self.fields.iter().all(|k| k.is_finite()) {
            return Err(ConfigError::NonFinite { name: "fields" });
        }
        if !self.t_min.is_finite() || self.t_min < 0.0 {
            return Err(ConfigError::NegativeTemperature(self.t_min));
        }
        if !self.t_max.is_finite() || self.t_min >= self.t_max {
            return Err(ConfigError::TemperatureRange {
                min: self.t_min,
                max: self.t_max,
            });
        }
        if !(self.convergence.tail_fraction > 0.0 && self.convergence.tail_fraction <= 1.0) {
            return Err(ConfigError::TailFraction(self.convergence.tail_fraction));
        }
        Ok(())
    }

    /// Ascending, linearly spaced grid of `n_temps` points with inclusive
    /// endpoints. A single-point grid sits at t_min.
    pub fn temperature_grid(&self) -> Vec<f64> {
        if self.n_temps == 1 {
            return vec![self.t_min];
        }
        let step = (self.t_max - self.t_min) / (self.n_temps - 1) as f64;
        (0..self.n_temps)
            .map(|i| self.t_min + step * i as f64)
            .collect()
    }
}
