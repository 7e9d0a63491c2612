use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex64};

/// Number of non-redundant bins in the spectrum of a real signal of length `n`.
#[inline]
pub fn half_len(n: usize) -> usize {
    n / 2 + 1
}

/// Magnitudes of the non-redundant DFT bins of `x` (phase discarded).
pub fn magnitude_spectrum(x: &[f64]) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    let mut spectrum = RealSpectrum::new(x.len());
    let mut out = vec![0.0; half_len(x.len())];
    spectrum.magnitudes(x, &mut out);
    out
}

// ======================================================================
// Planned forward/inverse pair for a fixed length
// ======================================================================

/// Planned FFT pair with a reusable complex buffer, sized for one sequence length.
pub struct RealSpectrum {
    n: usize,
    fft: Arc<dyn Fft<f64>>,
    ifft: Arc<dyn Fft<f64>>,
    buf: Vec<Complex64>,
}

impl RealSpectrum {
    pub fn new(n: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            n,
            fft: planner.plan_fft_forward(n),
            ifft: planner.plan_fft_inverse(n),
            buf: vec![Complex64::new(0.0, 0.0); n],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    fn forward(&mut self, x: &[f64]) {
        assert_eq!(x.len(), self.n);
        for (z, &v) in self.buf.iter_mut().zip(x) {
            *z = Complex64::new(v, 0.0);
        }
        self.fft.process(&mut self.buf);
    }

    /// Writes the half-spectrum magnitudes of `x` into `out`.
    pub fn magnitudes(&mut self, x: &[f64], out: &mut [f64]) {
        assert_eq!(out.len(), half_len(self.n));
        self.forward(x);
        for (m, z) in out.iter_mut().zip(&self.buf) {
            *m = z.norm();
        }
    }

    /// Replaces the magnitudes of `x` with `mags` while keeping its phases,
    /// then transforms back to the time domain into `out`.
    pub fn impose_magnitudes(&mut self, x: &[f64], mags: &[f64], out: &mut [f64]) {
        let n = self.n;
        assert_eq!(mags.len(), half_len(n));
        assert_eq!(out.len(), n);
        self.forward(x);

        for (z, &a) in self.buf.iter_mut().zip(mags) {
            let r = z.norm();
            // Zero bins carry no phase; keep them real.
            *z = if r > 0.0 {
                *z * (a / r)
            } else {
                Complex64::new(a, 0.0)
            };
        }
        // Restore Hermitian symmetry so the inverse is real.
        for k in 1..n.div_ceil(2) {
            self.buf[n - k] = self.buf[k].conj();
        }

        self.ifft.process(&mut self.buf);
        let inv_n = 1.0 / n as f64;
        for (y, z) in out.iter_mut().zip(&self.buf) {
            *y = z.re * inv_n;
        }
    }
}
