//! One analysis run: load, validate, compute, write.

use tracing::{info, warn};

use crate::cli::{RunMode, RunSettings};
use crate::core::correlation::{compute_diagram, ensure_window_variance};
use crate::core::diagram::Diagram;
use crate::core::montecarlo::{self, MonteCarloSettings};
use crate::core::sequence::{Sequence, SequenceStore};
use crate::error::Result;
use crate::io::{table, writer};

/// Selects the analyzed pair and rejects inputs the diagram cannot be computed on.
pub fn select_pair(store: &SequenceStore, settings: &RunSettings) -> Result<(Sequence, Sequence)> {
    let (col_a, col_b) = settings.columns;
    let a = store.column(col_a)?.clone();
    let b = store.column(col_b)?.clone();
    if col_a == col_b {
        warn!(column = col_a, "both columns select the same sequence");
    }

    let spec = &settings.window;
    spec.ensure_feasible(a.len())?;
    ensure_window_variance(&a, col_a, spec)?;
    ensure_window_variance(&b, col_b, spec)?;
    Ok((a, b))
}

/// Computes the diagram requested by `settings.mode`.
pub fn analyze(store: &SequenceStore, settings: &RunSettings) -> Result<Diagram> {
    let (a, b) = select_pair(store, settings)?;
    let spec = &settings.window;
    if let (Some(la), Some(lb)) = (
        store.label(settings.columns.0 - 1),
        store.label(settings.columns.1 - 1),
    ) {
        info!(a = la, b = lb, "analyzing labelled columns");
    }

    match settings.mode {
        RunMode::CorrelationOnly => Ok(compute_diagram(&a, &b, spec)),
        RunMode::PValue => {
            let base_seed = settings.seed.unwrap_or_else(rand::random);
            info!(base_seed, trials = settings.trials, "surrogate seed");
            let mc = MonteCarloSettings {
                trials: settings.trials,
                surrogate: settings.surrogate,
                base_seed,
                execution: settings.execution,
            };
            let outcome = montecarlo::run(&a, &b, spec, &mc)?;
            if outcome.non_converged > 0 {
                info!(
                    non_converged = outcome.non_converged,
                    tolerance = settings.surrogate.tolerance,
                    "some surrogates stopped above the tolerance"
                );
            }
            Ok(outcome.pvalues)
        }
    }
}

/// Full run from `settings`: reads input, writes the diagram.
pub fn run(settings: &RunSettings) -> Result<()> {
    let store = table::load(settings.input.as_deref(), settings.separator)?;
    let diagram = analyze(&store, settings)?;
    writer::save(&diagram, settings.output.as_deref(), settings.separator)
}
