//! Error taxonomy shared by the loader, validation and the Monte-Carlo phase.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DxcError {
    // --- configuration ---
    #[error("column numbers must be positive (got {a} and {b})")]
    InvalidColumn { a: usize, b: usize },
    #[error("number of window widths must be positive")]
    InvalidWindowCount,
    #[error("base window width must be at least 2 samples (got {0})")]
    InvalidBaseWidth(usize),
    #[error("number of surrogates must be positive")]
    ZeroTrials,
    #[error("surrogate tolerance must be a positive finite number (got {0})")]
    InvalidTolerance(f64),
    #[error("requested column {requested} exceeds the {available} loaded sequences")]
    ColumnOutOfRange { requested: usize, available: usize },
    #[error("failed to parse config {path}: {message}")]
    Config { path: PathBuf, message: String },

    // --- input consistency ---
    #[error("cannot read {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}, column {column}: '{cell}' is not a number")]
    Parse {
        line: usize,
        column: usize,
        cell: String,
    },
    #[error("line {line} has {found} cells, expected {expected}")]
    RaggedTable {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}, column {column}: '{cell}' is not a finite number")]
    NonFiniteCell {
        line: usize,
        column: usize,
        cell: String,
    },
    #[error("sequence {column} has a non-finite value at sample {index}")]
    NonFiniteSample { column: usize, index: usize },
    #[error("at least two sequences are required, found {0}")]
    TooFewSequences(usize),
    #[error("sequences must have equal length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
    #[error("sequence {column} is constant over the window of width {width} ending at sample {end}")]
    ConstantWindow {
        column: usize,
        width: usize,
        end: usize,
    },

    // --- windowing ---
    #[error(
        "windowing settings are invalid: {length} samples admit no window position \
         (base width {base_width}, {width_count} widths, delay {delay})"
    )]
    InfeasibleWindowing {
        length: usize,
        base_width: usize,
        width_count: usize,
        delay: usize,
    },

    // --- output ---
    #[error("cannot write {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: std::io::Error,
    },

    // --- worker pool ---
    #[error("failed to spawn surrogate worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
    #[error("a surrogate worker panicked")]
    WorkerPanicked,
}

impl DxcError {
    /// Configuration and input errors are reported before anything is computed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DxcError::InvalidColumn { .. }
                | DxcError::InvalidWindowCount
                | DxcError::InvalidBaseWidth(_)
                | DxcError::ZeroTrials
                | DxcError::InvalidTolerance(_)
                | DxcError::ColumnOutOfRange { .. }
                | DxcError::Config { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DxcError>;
