//! Physical limits and convergence behaviour of the temperature sweep.

use std::sync::atomic::AtomicBool;

use ising_scan::config::{ConvergenceOpts, ScanConfig, StartPolicy};
use ising_scan::lattice::{Lattice, StartMode};
use ising_scan::metropolis::sweep;
use ising_scan::sweep::{run_pair, PairJob};

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn single_point_config(temperature: f64) -> ScanConfig {
    ScanConfig {
        lattice_size: 10,
        couplings: vec![1.0],
        fields: vec![0.0],
        t_min: temperature,
        t_max: temperature + 1.0,
        n_temps: 1,
        equilibration_sweeps: 200,
        sampling_sweeps: 300,
        seed: 2024,
        start_policy: StartPolicy::Cold,
        convergence: ConvergenceOpts::default(),
    }
}

#[test]
fn test_zero_temperature_keeps_ordered_state() {
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let mut lattice = Lattice::new(8, StartMode::AllUp, &mut rng);

    // Every flip from the uniform state costs 8J; at T=0 nothing moves.
    for _ in 0..100 {
        let info = sweep(&mut lattice, 1.0, 0.0, 0.0, &mut rng);
        assert_eq!(info.accepted, 0);
    }
    assert_eq!(lattice.mean_abs_magnetization(), 1.0);
}

#[test]
fn test_zero_temperature_heals_isolated_defects() {
    let mut rng = ChaCha20Rng::seed_from_u64(2);
    let mut lattice = Lattice::new(8, StartMode::AllUp, &mut rng);

    // Scattered single-site defects each lower the energy when flipped back.
    lattice.flip(0, 0);
    lattice.flip(3, 5);
    lattice.flip(6, 2);
    assert!(lattice.mean_abs_magnetization() < 1.0);

    sweep(&mut lattice, 1.0, 0.0, 0.0, &mut rng);
    assert_eq!(lattice.mean_abs_magnetization(), 1.0);
}

#[test]
fn test_zero_temperature_quench_never_raises_energy() {
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let mut lattice = Lattice::new(8, StartMode::Random, &mut rng);

    let mut energy = lattice.energy_per_site(1.0, 0.0);
    for _ in 0..200 {
        sweep(&mut lattice, 1.0, 0.0, 0.0, &mut rng);
        let next = lattice.energy_per_site(1.0, 0.0);
        assert!(next <= energy + 1e-12, "energy rose during a T=0 quench");
        energy = next;
    }
}

#[test]
fn test_low_temperature_ordered_phase_is_stable() {
    let mut rng = ChaCha20Rng::seed_from_u64(4);
    let mut lattice = Lattice::new(10, StartMode::AllUp, &mut rng);

    for _ in 0..500 {
        sweep(&mut lattice, 1.0, 0.0, 1.0, &mut rng);
    }

    let mut mean = 0.0;
    let samples = 200;
    for _ in 0..samples {
        sweep(&mut lattice, 1.0, 0.0, 1.0, &mut rng);
        mean += lattice.mean_abs_magnetization();
    }
    mean /= samples as f64;

    println!("mean |m| at T=1.0: {mean:.4}");
    assert!(mean > 0.9, "ordered phase melted at T=1.0: |m| = {mean:.4}");
}

#[test]
fn test_high_temperature_magnetization_vanishes() {
    // k=0 and T large against J: the sampled |m| sits at the finite-size
    // noise floor.
    let mut cfg = single_point_config(8.0);
    cfg.lattice_size = 16;

    let job = PairJob {
        coupling: 1.0,
        field: 0.0,
        seed: cfg.seed,
    };
    let cancel = AtomicBool::new(false);
    let curve = run_pair(&cfg, &job, &cancel).unwrap();

    assert_eq!(curve.samples.len(), 1);
    let m = curve.samples[0].magnetization;
    println!("mean |m| at T=8.0: {m:.4}");
    assert!(m < 0.2, "magnetization did not vanish at high T: {m:.4}");
}

#[test]
fn test_warm_start_folds_over_ascending_grid() {
    let cfg = ScanConfig {
        lattice_size: 8,
        t_min: 1.0,
        t_max: 3.0,
        n_temps: 5,
        equilibration_sweeps: 100,
        sampling_sweeps: 100,
        start_policy: StartPolicy::Warm,
        ..single_point_config(1.0)
    };

    let job = PairJob {
        coupling: 1.0,
        field: 0.0,
        seed: 77,
    };
    let cancel = AtomicBool::new(false);

    let curve = run_pair(&cfg, &job, &cancel).unwrap();
    assert_eq!(curve.samples.len(), 5);

    // Grid stays ascending and the warm chain is reproducible.
    for pair in curve.samples.windows(2) {
        assert!(pair[0].temperature < pair[1].temperature);
    }
    let again = run_pair(&cfg, &job, &cancel).unwrap();
    for (a, b) in curve.samples.iter().zip(again.samples.iter()) {
        assert_eq!(a.magnetization, b.magnetization);
        assert_eq!(a.susceptibility, b.susceptibility);
    }
}

#[test]
fn test_cancellation_yields_no_partial_curve() {
    let cfg = single_point_config(2.0);
    let job = PairJob {
        coupling: 1.0,
        field: 0.0,
        seed: 5,
    };

    let cancel = AtomicBool::new(true);
    assert!(run_pair(&cfg, &job, &cancel).is_none());
}

#[test]
fn test_slow_convergence_is_annotated() {
    // An impossible threshold at a noisy temperature: the tail never
    // settles, so the point comes back low-confidence.
    let mut cfg = single_point_config(8.0);
    cfg.lattice_size = 8;
    cfg.convergence = ConvergenceOpts {
        tail_fraction: 0.5,
        variance_threshold: 1e-12,
        max_extra_sweeps: 0,
    };

    let job = PairJob {
        coupling: 1.0,
        field: 0.0,
        seed: 6,
    };
    let cancel = AtomicBool::new(false);
    let curve = run_pair(&cfg, &job, &cancel).unwrap();
    assert!(curve.samples[0].low_confidence);

    // Extension runs up to the cap and still annotates when the threshold
    // cannot be met.
    cfg.convergence.max_extra_sweeps = 50;
    let extended = run_pair(&cfg, &job, &cancel).unwrap();
    assert!(extended.samples[0].low_confidence);
}

#[test]
fn test_settled_chain_is_not_annotated() {
    // Deep in the ordered phase from a cold start the |m| series is flat;
    // the default threshold passes easily.
    let cfg = ScanConfig {
        lattice_size: 4,
        t_min: 0.5,
        t_max: 1.5,
        equilibration_sweeps: 500,
        sampling_sweeps: 200,
        ..single_point_config(0.5)
    };

    let job = PairJob {
        coupling: 1.0,
        field: 0.5,
        seed: 8,
    };
    let cancel = AtomicBool::new(false);
    let curve = run_pair(&cfg, &job, &cancel).unwrap();

    let sample = &curve.samples[0];
    println!(
        "T={} |m|={:.4} chi={:.2e}",
        sample.temperature, sample.magnetization, sample.susceptibility
    );
    assert!(!sample.low_confidence);
    assert!(sample.magnetization > 0.9);
}
