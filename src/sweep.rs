// Drives one (J, k) pair across the ascending temperature grid.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::analysis::{tail_variance, variance, OnlineStats};
use crate::config::{ScanConfig, StartPolicy};
use crate::curve::{Curve, Sample};
use crate::lattice::{Lattice, StartMode};
use crate::metropolis::sweep;

/// One unit of parallel work: a (J, k) pair with its derived seed.
#[derive(Debug, Clone, Copy)]
pub struct PairJob {
    pub coupling: f64,
    pub field: f64,
    /// Derived from the base seed and the pair's grid indices; the low bits
    /// stay free for per-temperature derivation under cold start.
    pub seed: u64,
}

/// Run the full temperature grid for one pair. Returns `None` if the
/// cancellation flag was raised; a cancelled pair never emits a partial
/// curve.
///
/// Cold start maps independently over temperatures, each with its own
/// lattice and RNG stream. Warm start folds one lattice and one RNG stream
/// through the ascending grid, so each point begins near the previous
/// equilibrium.
pub fn run_pair(cfg: &ScanConfig, job: &PairJob, cancel: &AtomicBool) -> Option<Curve> {
    let temps = cfg.temperature_grid();

    let samples = match cfg.start_policy {
        StartPolicy::Cold => {
            let mut samples = Vec::with_capacity(temps.len());
            for (t_idx, &t) in temps.iter().enumerate() {
                let mut rng = ChaCha20Rng::seed_from_u64(job.seed ^ t_idx as u64);
                let mut lattice = Lattice::new(cfg.lattice_size, StartMode::Random, &mut rng);
                samples.push(measure_point(cfg, job, &mut lattice, t, &mut rng, cancel)?);
            }
            samples
        }
        StartPolicy::Warm => {
            let mut rng = ChaCha20Rng::seed_from_u64(job.seed);
            let mut lattice = Lattice::new(cfg.lattice_size, StartMode::Random, &mut rng);
            let mut samples = Vec::with_capacity(temps.len());
            for &t in &temps {
                samples.push(measure_point(cfg, job, &mut lattice, t, &mut rng, cancel)?);
            }
            samples
        }
    };

    Some(Curve::raw(job.coupling, job.field, samples))
}

/// Equilibrate and sample the lattice at a single temperature.
///
/// Burn-in sweeps discard all observations; every sampling sweep then
/// records |m| and the energy per site. The tail of the |m| series feeds
/// the slow-convergence check, optionally extended in batches up to the
/// configured cap. The cancel flag is consulted between sweeps only, never
/// mid-sweep.
fn measure_point(
    cfg: &ScanConfig,
    job: &PairJob,
    lattice: &mut Lattice,
    temperature: f64,
    rng: &mut ChaCha20Rng,
    cancel: &AtomicBool,
) -> Option<Sample> {
    for _ in 0..cfg.equilibration_sweeps {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        sweep(lattice, job.coupling, job.field, temperature, rng);
    }

    let mut m_series = Vec::with_capacity(cfg.sampling_sweeps);
    let mut e_series = Vec::with_capacity(cfg.sampling_sweeps);
    if !record(job, lattice, temperature, rng, cancel, cfg.sampling_sweeps,
               &mut m_series, &mut e_series) {
        return None;
    }

    let conv = &cfg.convergence;
    let mut low_confidence =
        tail_variance(&m_series, conv.tail_fraction) > conv.variance_threshold;

    // Convergence extension: keep sampling in batches until the tail
    // settles or the cap is exhausted, then annotate with whatever verdict
    // remains.
    if low_confidence && conv.max_extra_sweeps > 0 {
        let batch = (cfg.sampling_sweeps / 4).max(1);
        let mut extra = 0;
        while low_confidence && extra < conv.max_extra_sweeps {
            let run = batch.min(conv.max_extra_sweeps - extra);
            if !record(job, lattice, temperature, rng, cancel, run,
                       &mut m_series, &mut e_series) {
                return None;
            }
            extra += run;
            low_confidence =
                tail_variance(&m_series, conv.tail_fraction) > conv.variance_threshold;
        }
    }

    let mut m_stats = OnlineStats::default();
    for &m in &m_series {
        m_stats.push(m);
    }

    let energy_fluctuation = if temperature == 0.0 {
        0.0
    } else {
        variance(&e_series) / temperature
    };

    Some(Sample {
        temperature,
        magnetization: m_stats.mean(),
        susceptibility: variance(&m_series),
        energy_fluctuation,
        low_confidence,
    })
}

/// Run `count` measured sweeps, appending |m| and E/site after each.
/// Returns false when cancelled.
#[allow(clippy::too_many_arguments)]
fn record(
    job: &PairJob,
    lattice: &mut Lattice,
    temperature: f64,
    rng: &mut ChaCha20Rng,
    cancel: &AtomicBool,
    count: usize,
    m_series: &mut Vec<f64>,
    e_series: &mut Vec<f64>,
) -> bool {
    for _ in 0..count {
        if cancel.load(Ordering::Relaxed) {
            return false;
        }
        sweep(lattice, job.coupling, job.field, temperature, rng);
        m_series.push(lattice.mean_abs_magnetization());
        e_series.push(lattice.energy_per_site(job.coupling, job.field));
    }
    true
}
