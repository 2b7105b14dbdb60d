// Single-spin-flip Metropolis updates.

use rand::Rng;

use crate::lattice::Lattice;

/// Returned by [`sweep`] for O(1) acceptance bookkeeping in the driver.
#[derive(Debug, Clone, Copy)]
pub struct SweepInfo {
    pub attempted: usize,
    pub accepted: usize,
}

/// Boltzmann acceptance probability for a proposed flip (k_B = 1).
///
/// Total over all inputs: downhill and flat moves are certain, and T = 0
/// accepts only those, never dividing by zero.
#[inline]
pub fn flip_probability(energy_delta: f64, temperature: f64) -> f64 {
    if energy_delta <= 0.0 {
        1.0
    } else if temperature == 0.0 {
        0.0
    } else {
        (-energy_delta / temperature).exp()
    }
}

/// Propose flipping the spin at (row, col) and accept per Metropolis.
///
/// ΔE ≤ 0 accepts unconditionally without consuming randomness; an uphill
/// move draws exactly one uniform [0,1) value and accepts iff it falls
/// below the Boltzmann factor.
pub fn attempt_flip(
    lattice: &mut Lattice,
    row: usize,
    col: usize,
    coupling: f64,
    field: f64,
    temperature: f64,
    rng: &mut impl Rng,
) -> bool {
    let delta = lattice.energy_delta(row, col, coupling, field);
    let probability = flip_probability(delta, temperature);

    let accept = if probability >= 1.0 {
        true
    } else if probability == 0.0 {
        false
    } else {
        rng.gen::<f64>() < probability
    };

    if accept {
        lattice.flip(row, col);
    }
    accept
}

/// One full sweep: attempt a flip at every site in fixed row-major raster
/// order, so a seeded RNG reproduces the exact accept/reject sequence.
pub fn sweep(
    lattice: &mut Lattice,
    coupling: f64,
    field: f64,
    temperature: f64,
    rng: &mut impl Rng,
) -> SweepInfo {
    let l = lattice.size();
    let mut accepted = 0usize;

    for row in 0..l {
        for col in 0..l {
            if attempt_flip(lattice, row, col, coupling, field, temperature, rng) {
                accepted += 1;
            }
        }
    }

    SweepInfo {
        attempted: l * l,
        accepted,
    }
}
