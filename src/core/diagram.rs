use crate::core::window::WindowSpec;

/// Grid of values indexed by window-width level (row) and window position (column).
///
/// Rows are sized once from the position index set and never resized, so
/// diagrams computed from sequences of equal length align cell by cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    rows: Vec<Vec<f64>>,
}

/// Correlation value per cell, in `[-1, 1]`.
pub type CorrelationDiagram = Diagram;
/// Fraction of surrogate trials at least as extreme as the observed cell, in `[0, 1]`.
pub type PValueDiagram = Diagram;

impl Diagram {
    /// Zero-filled diagram shaped for `len`-sample sequences under `spec`.
    pub fn zeros(len: usize, spec: &WindowSpec) -> Self {
        let cols = spec.positions(len).len();
        Self {
            rows: vec![vec![0.0; cols]; spec.width_count()],
        }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    /// Number of window-width levels.
    pub fn levels(&self) -> usize {
        self.rows.len()
    }

    /// Number of positions in the row at `level_index` (0-based).
    pub fn row_len(&self, level_index: usize) -> usize {
        self.rows.get(level_index).map_or(0, Vec::len)
    }

    pub fn row(&self, level_index: usize) -> &[f64] {
        &self.rows[level_index]
    }

    pub(crate) fn row_mut(&mut self, level_index: usize) -> &mut [f64] {
        &mut self.rows[level_index]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn cells(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().flatten().copied()
    }

    pub fn get(&self, level_index: usize, position: usize) -> Option<f64> {
        self.rows.get(level_index)?.get(position).copied()
    }

    /// True when both diagrams have identical row lengths.
    pub fn same_shape(&self, other: &Diagram) -> bool {
        self.rows.len() == other.rows.len()
            && self
                .rows
                .iter()
                .zip(&other.rows)
                .all(|(a, b)| a.len() == b.len())
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}
