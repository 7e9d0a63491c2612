//! Diagram engine, surrogate generation and Monte-Carlo accumulation.

pub mod correlation;
pub mod diagram;
pub mod fft;
pub mod montecarlo;
pub mod pvalue;
pub mod sequence;
pub mod surrogate;
pub mod window;
