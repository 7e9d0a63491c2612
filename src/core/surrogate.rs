//! Amplitude-adjusted surrogate sequences.
//!
//! A surrogate keeps the exact multiset of values of its source sequence and
//! approximately its magnitude spectrum, while its temporal order is random.
//! Generation alternates a spectral adjustment (impose the source magnitudes,
//! keep the current phases) with a rank adjustment (map the result back onto
//! the source values by rank) until the spectral residual drops below the
//! tolerance, the rank order stops changing, or the iteration cap is hit.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::core::fft::{RealSpectrum, half_len};

pub const DEFAULT_TOLERANCE: f64 = 0.01;
pub const DEFAULT_MAX_ITERATIONS: usize = 500;

/// Per-sequence quantities every surrogate of that sequence must reproduce.
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateInvariants {
    sorted_values: Vec<f64>,
    spectrum_magnitudes: Vec<f64>,
}

impl SurrogateInvariants {
    /// Sorted copy of `seq` and the magnitudes of its half spectrum.
    pub fn new(seq: &[f64]) -> Self {
        let mut sorted_values = seq.to_vec();
        sorted_values.sort_by(f64::total_cmp);
        Self {
            sorted_values,
            spectrum_magnitudes: crate::core::fft::magnitude_spectrum(seq),
        }
    }

    pub fn len(&self) -> usize {
        self.sorted_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_values.is_empty()
    }

    pub fn sorted_values(&self) -> &[f64] {
        &self.sorted_values
    }

    pub fn spectrum_magnitudes(&self) -> &[f64] {
        &self.spectrum_magnitudes
    }

    /// Relative L1 deviation `Σ|m_k - A_k| / Σ A_k` of `mags` from the source spectrum.
    pub fn spectral_residual(&self, mags: &[f64]) -> f64 {
        let total: f64 = self.spectrum_magnitudes.iter().sum();
        if total == 0.0 {
            return 0.0;
        }
        let diff: f64 = mags
            .iter()
            .zip(&self.spectrum_magnitudes)
            .map(|(m, a)| (m - a).abs())
            .sum();
        diff / total
    }
}

/// Shorthand for [`SurrogateInvariants::new`].
pub fn initialize(seq: &[f64]) -> SurrogateInvariants {
    SurrogateInvariants::new(seq)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurrogateParams {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SurrogateParams {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// One generated surrogate plus how the iteration ended.
#[derive(Debug, Clone)]
pub struct Surrogate {
    pub values: Vec<f64>,
    /// Spectral residual of `values`.
    pub residual: f64,
    pub iterations: usize,
    /// `residual <= tolerance` was reached.
    pub converged: bool,
}

/// Reusable generator for one sequence: owns the FFT plan and scratch buffers,
/// borrows the shared invariants.
pub struct SurrogateGenerator<'a> {
    invariants: &'a SurrogateInvariants,
    params: SurrogateParams,
    spectrum: RealSpectrum,
    filtered: Vec<f64>,
    mags: Vec<f64>,
    order: Vec<usize>,
    prev_order: Vec<usize>,
}

impl<'a> SurrogateGenerator<'a> {
    pub fn new(invariants: &'a SurrogateInvariants, params: SurrogateParams) -> Self {
        let n = invariants.len();
        Self {
            invariants,
            params,
            spectrum: RealSpectrum::new(n),
            filtered: vec![0.0; n],
            mags: vec![0.0; half_len(n)],
            order: (0..n).collect(),
            prev_order: Vec::with_capacity(n),
        }
    }

    /// Generates one surrogate driven by `seed`.
    pub fn generate(&mut self, seed: u64) -> Surrogate {
        let invariants = self.invariants;
        let sorted = invariants.sorted_values();
        let target = invariants.spectrum_magnitudes();
        let n = sorted.len();

        let mut rng = StdRng::seed_from_u64(seed);
        let mut current = sorted.to_vec();
        current.shuffle(&mut rng);
        if n < 3 {
            // Too short to reorder meaningfully; report the shuffle as is.
            let residual = if n == 0 {
                0.0
            } else {
                self.spectrum.magnitudes(&current, &mut self.mags);
                invariants.spectral_residual(&self.mags)
            };
            return Surrogate {
                values: current,
                residual,
                iterations: 0,
                converged: residual <= self.params.tolerance,
            };
        }

        let mut best = current.clone();
        let mut best_residual = f64::INFINITY;
        let mut iterations = 0;
        self.prev_order.clear();

        while iterations < self.params.max_iterations {
            iterations += 1;

            // Spectral adjustment.
            self.spectrum
                .impose_magnitudes(&current, target, &mut self.filtered);

            // Rank adjustment: i-th smallest filtered sample takes the i-th smallest value.
            for (i, slot) in self.order.iter_mut().enumerate() {
                *slot = i;
            }
            let filtered = &self.filtered;
            self.order
                .sort_by(|&i, &j| filtered[i].total_cmp(&filtered[j]));
            for (&idx, &v) in self.order.iter().zip(sorted) {
                current[idx] = v;
            }

            self.spectrum.magnitudes(&current, &mut self.mags);
            let residual = invariants.spectral_residual(&self.mags);
            if residual < best_residual {
                best_residual = residual;
                best.copy_from_slice(&current);
            }
            if residual <= self.params.tolerance {
                break;
            }
            if self.order == self.prev_order {
                break;
            }
            self.prev_order.clone_from(&self.order);
        }

        Surrogate {
            values: best,
            residual: best_residual,
            iterations,
            converged: best_residual <= self.params.tolerance,
        }
    }
}

/// Generates one surrogate of `seq` with the default iteration cap.
pub fn generate(seq: &[f64], invariants: &SurrogateInvariants, tolerance: f64, seed: u64) -> Vec<f64> {
    assert_eq!(seq.len(), invariants.len(), "invariants belong to another sequence");
    let params = SurrogateParams {
        tolerance,
        ..SurrogateParams::default()
    };
    SurrogateGenerator::new(invariants, params).generate(seed).values
}
