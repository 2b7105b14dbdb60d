// Cartesian-product dispatch of pair jobs, in parallel.

use std::sync::atomic::AtomicBool;
use std::sync::Mutex;

use rayon::prelude::*;

use crate::config::ScanConfig;
use crate::curve::Curve;
use crate::sweep::{run_pair, PairJob};

/// Every (J, k) combination with a deterministically derived seed. The
/// disjoint bit ranges (J index above bit 40, k index above bit 20, the
/// low 20 bits free for the temperature index) keep all task streams
/// distinct and independent of execution order.
pub fn pair_jobs(cfg: &ScanConfig) -> Vec<PairJob> {
    let mut jobs = Vec::with_capacity(cfg.couplings.len() * cfg.fields.len());
    for (j_idx, &coupling) in cfg.couplings.iter().enumerate() {
        for (k_idx, &field) in cfg.fields.iter().enumerate() {
            let seed = cfg.seed ^ ((j_idx as u64) << 40) ^ ((k_idx as u64) << 20);
            jobs.push(PairJob {
                coupling,
                field,
                seed,
            });
        }
    }
    jobs
}

/// Run the whole scan: one normalized curve per (J, k) pair, sorted by
/// (J, k) for deterministic output order. Pairs share no mutable state, so
/// any degree of parallelism yields bit-identical curves.
///
/// Pairs cancelled mid-flight are dropped from the result; completed pairs
/// are unaffected.
pub fn run_scan(cfg: &ScanConfig, cancel: &AtomicBool) -> Vec<Curve> {
    run_scan_with(cfg, cancel, || {})
}

/// Same as [`run_scan`], invoking `on_pair_done` as each pair finishes
/// (progress reporting).
pub fn run_scan_with(
    cfg: &ScanConfig,
    cancel: &AtomicBool,
    on_pair_done: impl Fn() + Sync,
) -> Vec<Curve> {
    let jobs = pair_jobs(cfg);
    let curves: Mutex<Vec<Curve>> = Mutex::new(Vec::with_capacity(jobs.len()));

    jobs.par_iter().for_each(|job| {
        if let Some(mut curve) = run_pair(cfg, job, cancel) {
            curve.normalize();
            curves.lock().unwrap().push(curve);
        }
        on_pair_done();
    });

    let mut curves = curves.into_inner().unwrap();
    curves.sort_by(|a, b| {
        a.coupling
            .partial_cmp(&b.coupling)
            .unwrap()
            .then(a.field.partial_cmp(&b.field).unwrap())
    });
    curves
}
