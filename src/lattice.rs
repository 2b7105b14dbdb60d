// Square-lattice spin state with periodic boundaries.

use rand::Rng;

/// A single binary spin. Converted to ±1 only where the energy and
/// magnetization arithmetic needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spin {
    Up,
    Down,
}

impl Spin {
    #[inline(always)]
    pub fn value(self) -> i32 {
        match self {
            Spin::Up => 1,
            Spin::Down => -1,
        }
    }

    #[inline(always)]
    pub fn flipped(self) -> Spin {
        match self {
            Spin::Up => Spin::Down,
            Spin::Down => Spin::Up,
        }
    }
}

/// Initial spin configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Each site drawn independently and uniformly from {Up, Down}.
    Random,
    AllUp,
    AllDown,
}

/// An L×L grid of spins on a torus: neighbor lookups wrap modulo L in both
/// axes, so every site has exactly 4 neighbors.
#[derive(Debug, Clone)]
pub struct Lattice {
    size: usize,
    spins: Vec<Spin>,
}

impl Lattice {
    /// Build an L×L lattice with a caller-supplied RNG (preferred for
    /// reproducibility).
    pub fn new(size: usize, mode: StartMode, rng: &mut impl Rng) -> Self {
        let n = size * size;
        let spins = match mode {
            StartMode::Random => (0..n)
                .map(|_| if rng.gen_bool(0.5) { Spin::Up } else { Spin::Down })
                .collect(),
            StartMode::AllUp => vec![Spin::Up; n],
            StartMode::AllDown => vec![Spin::Down; n],
        };

        Self { size, spins }
    }

    /// Side length L.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of sites, L².
    #[inline(always)]
    pub fn n_sites(&self) -> usize {
        self.spins.len()
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    #[inline(always)]
    pub fn spin(&self, row: usize, col: usize) -> Spin {
        self.spins[self.index(row, col)]
    }

    /// Sum of the four neighbor spins of (row, col), wrapping at the edges.
    #[inline]
    fn neighbor_sum(&self, row: usize, col: usize) -> i32 {
        let l = self.size;
        let up = if row == 0 { l - 1 } else { row - 1 };
        let down = if row + 1 == l { 0 } else { row + 1 };
        let left = if col == 0 { l - 1 } else { col - 1 };
        let right = if col + 1 == l { 0 } else { col + 1 };

        self.spins[self.index(up, col)].value()
            + self.spins[self.index(down, col)].value()
            + self.spins[self.index(row, left)].value()
            + self.spins[self.index(row, right)].value()
    }

    /// Energy change if the spin at (row, col) were flipped.
    ///
    /// ΔE = E_after − E_before
    ///    = (−J·(−s)·Σn − k·(−s)) − (−J·s·Σn − k·s)
    ///    = 2·s·(J·Σn + k)
    ///
    /// The factor 2 arises because flipping reverses the sign of the site's
    /// own contribution.
    pub fn energy_delta(&self, row: usize, col: usize, coupling: f64, field: f64) -> f64 {
        let s = self.spin(row, col).value() as f64;
        let neighbors = self.neighbor_sum(row, col) as f64;

        2.0 * s * (coupling * neighbors + field)
    }

    /// Negate the spin at (row, col). No other site is touched.
    #[inline]
    pub fn flip(&mut self, row: usize, col: usize) {
        let ix = self.index(row, col);
        self.spins[ix] = self.spins[ix].flipped();
    }

    /// (1/L²)·|Σ spins|, in [0, 1].
    pub fn mean_abs_magnetization(&self) -> f64 {
        let total: i32 = self.spins.iter().map(|s| s.value()).sum();
        (total.abs() as f64) / self.n_sites() as f64
    }

    /// (−J·Σ_bonds s_i s_j − k·Σ s_i) / L², each bond counted once via the
    /// right and down neighbor of every site.
    pub fn energy_per_site(&self, coupling: f64, field: f64) -> f64 {
        let l = self.size;
        let mut bond_sum = 0i32;
        let mut spin_sum = 0i32;

        for row in 0..l {
            for col in 0..l {
                let s = self.spin(row, col).value();
                let down = if row + 1 == l { 0 } else { row + 1 };
                let right = if col + 1 == l { 0 } else { col + 1 };
                bond_sum += s * (self.spin(down, col).value() + self.spin(row, right).value());
                spin_sum += s;
            }
        }

        (-coupling * bond_sum as f64 - field * spin_sum as f64) / self.n_sites() as f64
    }
}
