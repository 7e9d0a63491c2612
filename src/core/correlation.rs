//! Windowed zero-delay cross-correlation diagrams.
//!
//! Each row of a diagram corresponds to one window width (`w * base_width`),
//! each column to one window position. With a non-zero delay `τ`, a cell is the
//! mean of the correlations at lags `+τ` and `-τ`, which removes the bias a
//! small systematic lag would otherwise introduce into the zero-delay estimate.

use std::ops::Range;

use crate::core::diagram::CorrelationDiagram;
use crate::core::window::WindowSpec;
use crate::error::{DxcError, Result};

/// Pearson correlation coefficient of two equally long slices.
///
/// Returns NaN when either operand has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let da = a - mx;
        let db = b - my;
        sxy += da * db;
        sxx += da * da;
        syy += db * db;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

/// Correlation of one cell: window of `level` at position `k`.
#[inline]
fn cell(a: &[f64], b: &[f64], spec: &WindowSpec, level: usize, k: usize) -> f64 {
    let win = spec.window(level, k);
    let tau = spec.delay();
    if tau == 0 {
        return pearson(&a[win.clone()], &b[win]);
    }
    let shifted = (win.start + tau)..(win.end + tau);
    // +τ: b leads a; -τ: b lags a. Both stay on the forward side of the window.
    let lead = pearson(&a[win.clone()], &b[shifted.clone()]);
    let lag = pearson(&a[shifted], &b[win]);
    0.5 * (lead + lag)
}

/// Computes the correlation diagram of `a` and `b` under `spec`.
///
/// Row lengths depend only on `a.len()` and `spec`; the computation is
/// deterministic. Panics if the sequences differ in length.
pub fn compute_diagram(a: &[f64], b: &[f64], spec: &WindowSpec) -> CorrelationDiagram {
    assert_eq!(a.len(), b.len(), "sequences must have equal length");
    let mut diagram = CorrelationDiagram::zeros(a.len(), spec);
    let positions = spec.positions(a.len());
    for level in 1..=spec.width_count() {
        let row = diagram.row_mut(level - 1);
        for (slot, k) in row.iter_mut().zip(positions.iter()) {
            *slot = cell(a, b, spec, level, k);
        }
    }
    diagram
}

/// Rejects a sequence that is constant over any window the diagram will read,
/// including the delay-shifted windows. `column` is the 1-based column for reporting.
pub fn ensure_window_variance(seq: &[f64], column: usize, spec: &WindowSpec) -> Result<()> {
    let tau = spec.delay();
    for k in spec.positions(seq.len()).iter() {
        for level in 1..=spec.width_count() {
            let win = spec.window(level, k);
            ensure_varies(seq, win.clone(), column)?;
            if tau > 0 {
                ensure_varies(seq, (win.start + tau)..(win.end + tau), column)?;
            }
        }
    }
    Ok(())
}

#[inline]
fn ensure_varies(seq: &[f64], r: Range<usize>, column: usize) -> Result<()> {
    let first = seq[r.start];
    if seq[r.clone()].iter().all(|&v| v == first) {
        return Err(DxcError::ConstantWindow {
            column,
            width: r.len(),
            end: r.end - 1,
        });
    }
    Ok(())
}
