use std::sync::Arc;

use crate::error::{DxcError, Result};

/// Immutable series of samples, shared read-only between trials.
pub type Sequence = Arc<[f64]>;

/// Column-indexed holder of loaded sequences (0-based internally).
#[derive(Debug, Clone, Default)]
pub struct SequenceStore {
    sequences: Vec<Sequence>,
    labels: Vec<String>,
}

impl SequenceStore {
    /// Builds a store from columns, requiring at least two of equal length
    /// holding only finite samples.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self> {
        if columns.len() < 2 {
            return Err(DxcError::TooFewSequences(columns.len()));
        }
        let len = columns[0].len();
        if let Some(other) = columns.iter().find(|c| c.len() != len) {
            return Err(DxcError::LengthMismatch {
                left: len,
                right: other.len(),
            });
        }
        for (col, values) in columns.iter().enumerate() {
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(DxcError::NonFiniteSample {
                    column: col + 1,
                    index,
                });
            }
        }
        Ok(Self {
            sequences: columns.into_iter().map(Sequence::from).collect(),
            labels: Vec::new(),
        })
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Common length of every stored sequence.
    pub fn sequence_len(&self) -> usize {
        self.sequences.first().map_or(0, |s| s.len())
    }

    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Resolves a 1-based user column number.
    pub fn column(&self, column: usize) -> Result<&Sequence> {
        column
            .checked_sub(1)
            .and_then(|i| self.sequences.get(i))
            .ok_or(DxcError::ColumnOutOfRange {
                requested: column,
                available: self.sequences.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_one_based() {
        let store =
            SequenceStore::from_columns(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
                .unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.sequence_len(), 2);
        assert_eq!(&store.column(1).unwrap()[..], &[1.0, 2.0]);
        assert_eq!(&store.column(3).unwrap()[..], &[5.0, 6.0]);
        assert!(matches!(
            store.column(4),
            Err(DxcError::ColumnOutOfRange {
                requested: 4,
                available: 3
            })
        ));
        assert!(store.column(0).is_err());
    }

    #[test]
    fn rejects_single_or_ragged_columns() {
        assert!(matches!(
            SequenceStore::from_columns(vec![vec![1.0]]),
            Err(DxcError::TooFewSequences(1))
        ));
        assert!(matches!(
            SequenceStore::from_columns(vec![vec![1.0, 2.0], vec![1.0]]),
            Err(DxcError::LengthMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn rejects_non_finite_samples() {
        assert!(matches!(
            SequenceStore::from_columns(vec![vec![1.0, 2.0, 3.0], vec![1.0, f64::NAN, 3.0]]),
            Err(DxcError::NonFiniteSample { column: 2, index: 1 })
        ));
        assert!(matches!(
            SequenceStore::from_columns(vec![vec![f64::NEG_INFINITY, 2.0], vec![1.0, 2.0]]),
            Err(DxcError::NonFiniteSample { column: 1, index: 0 })
        ));
    }
}
