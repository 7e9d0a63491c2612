use crate::core::diagram::{CorrelationDiagram, Diagram, PValueDiagram};
use crate::error::{DxcError, Result};

/// Two-sided exceedance test: is the surrogate cell at least as extreme as the observed one?
///
/// NaN on either side never counts.
#[inline]
pub fn is_exceedance(observed: f64, surrogate: f64) -> bool {
    surrogate.abs() >= observed.abs()
}

/// Per-cell exceedance counters over a number of surrogate trials.
///
/// Partial accumulators are combined with [`ExceedanceCounts::merge`], which is
/// commutative and associative, so the final counts do not depend on the order
/// in which trials complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceedanceCounts {
    rows: Vec<Vec<u32>>,
    trials: usize,
}

impl ExceedanceCounts {
    /// Zero counters shaped like `observed`.
    pub fn zeros_like(observed: &CorrelationDiagram) -> Self {
        Self {
            rows: observed.rows().map(|r| vec![0; r.len()]).collect(),
            trials: 0,
        }
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn count(&self, level_index: usize, position: usize) -> Option<u32> {
        self.rows.get(level_index)?.get(position).copied()
    }

    /// Folds one trial's surrogate diagram into the counters.
    pub fn record(mut self, observed: &CorrelationDiagram, surrogate: &CorrelationDiagram) -> Self {
        debug_assert!(observed.same_shape(surrogate));
        for (level, counts) in self.rows.iter_mut().enumerate() {
            let obs = observed.row(level);
            let sur = surrogate.row(level);
            for ((c, &o), &s) in counts.iter_mut().zip(obs).zip(sur) {
                if is_exceedance(o, s) {
                    *c += 1;
                }
            }
        }
        self.trials += 1;
        self
    }

    /// Combines two partial accumulators over disjoint sets of trials.
    pub fn merge(mut self, other: ExceedanceCounts) -> Self {
        debug_assert_eq!(self.rows.len(), other.rows.len());
        for (mine, theirs) in self.rows.iter_mut().zip(&other.rows) {
            for (a, b) in mine.iter_mut().zip(theirs) {
                *a += b;
            }
        }
        self.trials += other.trials;
        self
    }

    /// Converts counts to fractions of the recorded trials.
    pub fn finalize(&self) -> Result<PValueDiagram> {
        if self.trials == 0 {
            return Err(DxcError::ZeroTrials);
        }
        let m = self.trials as f64;
        Ok(Diagram::from_rows(
            self.rows
                .iter()
                .map(|r| r.iter().map(|&c| c as f64 / m).collect())
                .collect(),
        ))
    }
}
