//! Zero-delay cross-correlation diagrams and their surrogate-based significance.
//!
//! The observed diagram of two sequences is compared cell by cell with diagrams
//! of amplitude-adjusted surrogate pairs; the fraction of surrogate cells at
//! least as extreme as the observed one is the cell's p-value.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod io;

pub use crate::core::correlation::compute_diagram;
pub use crate::core::diagram::{CorrelationDiagram, Diagram, PValueDiagram};
pub use crate::core::surrogate::SurrogateInvariants;
pub use crate::core::window::WindowSpec;
pub use crate::error::{DxcError, Result};
