use std::ops::Range;

use tracing::warn;

use crate::error::{DxcError, Result};

/// Multi-scale windowing: level `w` (1-based) uses windows of `w * base_width` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    base_width: usize,
    width_count: usize,
    delay: usize,
}

impl WindowSpec {
    /// Builds a spec, reducing an odd `base_width` by one.
    pub fn new(base_width: usize, width_count: usize, delay: usize) -> Result<Self> {
        if width_count == 0 {
            return Err(DxcError::InvalidWindowCount);
        }
        let even = base_width - base_width % 2;
        if even < 2 {
            return Err(DxcError::InvalidBaseWidth(base_width));
        }
        // The widest window must be addressable.
        if width_count.checked_mul(even).is_none() {
            return Err(DxcError::InvalidWindowCount);
        }
        if even != base_width {
            warn!(
                "window base width was an odd number; it is now reduced to {}",
                even
            );
        }
        Ok(Self {
            base_width: even,
            width_count,
            delay,
        })
    }

    #[inline]
    pub fn base_width(&self) -> usize {
        self.base_width
    }

    #[inline]
    pub fn width_count(&self) -> usize {
        self.width_count
    }

    /// Symmetric delay in samples; 0 disables delay averaging.
    #[inline]
    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Width in samples of windows at `level` (1-based).
    #[inline]
    pub fn width(&self, level: usize) -> usize {
        level * self.base_width
    }

    /// Position index set shared by every level of a diagram over `len` samples.
    pub fn positions(&self, len: usize) -> Positions {
        let half_max = self.width_count * self.base_width / 2;
        let start = half_max - 1;
        let end = len.saturating_sub(half_max.saturating_add(self.delay));
        Positions {
            start,
            end: end.max(start),
            stride: self.base_width,
        }
    }

    /// Samples covered by the window of `level` at position `k`.
    ///
    /// `k` is the last sample of the left half, so the range is
    /// `[k + 1 - w*B/2, k + 1 + w*B/2)`.
    #[inline]
    pub fn window(&self, level: usize, k: usize) -> Range<usize> {
        let half = self.width(level) / 2;
        (k + 1 - half)..(k + 1 + half)
    }

    /// Rejects sequence lengths that admit no window position.
    pub fn ensure_feasible(&self, len: usize) -> Result<()> {
        if self.positions(len).is_empty() {
            return Err(DxcError::InfeasibleWindowing {
                length: len,
                base_width: self.base_width,
                width_count: self.width_count,
                delay: self.delay,
            });
        }
        Ok(())
    }
}

/// Strided half-open range of window centres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Positions {
    start: usize,
    end: usize,
    stride: usize,
}

impl Positions {
    pub fn len(&self) -> usize {
        (self.end - self.start).div_ceil(self.stride)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn iter(self) -> impl Iterator<Item = usize> {
        (self.start..self.end).step_by(self.stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_base_width_is_reduced() {
        let spec = WindowSpec::new(7, 3, 0).unwrap();
        assert_eq!(spec.base_width(), 6);
        assert_eq!(spec.width(3), 18);
    }

    #[test]
    fn degenerate_widths_are_rejected() {
        assert!(matches!(
            WindowSpec::new(1, 2, 0),
            Err(DxcError::InvalidBaseWidth(1))
        ));
        assert!(matches!(
            WindowSpec::new(0, 2, 0),
            Err(DxcError::InvalidBaseWidth(0))
        ));
        assert!(matches!(
            WindowSpec::new(4, 0, 0),
            Err(DxcError::InvalidWindowCount)
        ));
    }

    #[test]
    fn positions_follow_stride_and_bounds() {
        let spec = WindowSpec::new(10, 1, 0).unwrap();
        let pos = spec.positions(1000);
        let ks: Vec<usize> = pos.iter().collect();
        assert_eq!(ks.len(), pos.len());
        assert_eq!(ks.first(), Some(&4));
        assert_eq!(ks.last(), Some(&994));
        assert_eq!(pos.len(), 100);
    }

    #[test]
    fn delay_shortens_only_the_upper_end() {
        let spec = WindowSpec::new(4, 2, 0).unwrap();
        let delayed = WindowSpec::new(4, 2, 5).unwrap();
        let a: Vec<usize> = spec.positions(40).iter().collect();
        let b: Vec<usize> = delayed.positions(40).iter().collect();
        assert_eq!(a.first(), b.first());
        assert!(b.len() < a.len());
        assert!(b.iter().all(|k| k + 4 + 5 < 40));
    }

    #[test]
    fn every_window_stays_in_bounds() {
        let len = 123;
        for (base, count, delay) in [(2, 1, 0), (4, 3, 2), (6, 5, 0), (10, 2, 7)] {
            let spec = WindowSpec::new(base, count, delay).unwrap();
            for k in spec.positions(len).iter() {
                for level in 1..=count {
                    let r = spec.window(level, k);
                    assert_eq!(r.len(), spec.width(level));
                    assert!(r.end + delay <= len, "window {r:?} + {delay} overflows {len}");
                }
            }
        }
    }

    #[test]
    fn infeasible_lengths_are_rejected() {
        let spec = WindowSpec::new(10, 5, 0).unwrap();
        assert!(spec.ensure_feasible(49).is_err());
        assert!(spec.ensure_feasible(20).is_err());
        assert!(spec.ensure_feasible(50).is_ok());
        assert_eq!(spec.positions(50).len(), 1);
        assert!(spec.positions(0).is_empty());
        assert_eq!(spec.positions(0).len(), 0);
    }

    #[test]
    fn oversized_windowing_is_an_error_not_a_panic() {
        assert!(matches!(
            WindowSpec::new(4, usize::MAX / 2, 0),
            Err(DxcError::InvalidWindowCount)
        ));
        assert!(matches!(
            WindowSpec::new(usize::MAX, 3, 0),
            Err(DxcError::InvalidWindowCount)
        ));

        let wide = WindowSpec::new(2, usize::MAX / 4, 0).unwrap();
        assert!(matches!(
            wide.ensure_feasible(100),
            Err(DxcError::InfeasibleWindowing { length: 100, .. })
        ));
        let far = WindowSpec::new(10, 1, usize::MAX).unwrap();
        assert!(far.positions(1000).is_empty());
        assert!(far.ensure_feasible(1000).is_err());
    }

    #[test]
    fn odd_base_width_is_reported() {
        use std::io;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            WindowSpec::new(8, 2, 0).unwrap();
            WindowSpec::new(9, 2, 0).unwrap();
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert_eq!(logs.matches("WARN").count(), 1, "{logs}");
        assert!(logs.contains("reduced to 8"), "{logs}");
    }
}
