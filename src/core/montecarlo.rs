//! Monte-Carlo significance of a correlation diagram.
//!
//! Each trial draws one surrogate per sequence, recomputes the correlation
//! diagram of the surrogate pair and folds it into per-cell exceedance counters.
//! Trials are independent; workers keep local counters which are reduced once
//! at the end, so sequential and parallel runs with the same base seed produce
//! identical p-values.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::unbounded;
use tracing::{debug, info};

use crate::core::correlation::compute_diagram;
use crate::core::diagram::{CorrelationDiagram, PValueDiagram};
use crate::core::pvalue::ExceedanceCounts;
use crate::core::surrogate::{SurrogateGenerator, SurrogateInvariants, SurrogateParams};
use crate::core::window::WindowSpec;
use crate::error::{DxcError, Result};

pub const DEFAULT_TRIALS: usize = 100;

/// Counter-based seed derivation (SplitMix64 finalizer).
#[inline]
fn splitmix64(base: u64, counter: u64) -> u64 {
    let mut z = base.wrapping_add(counter.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Seeds of the two surrogates of `trial`; a pure function of `(base, trial)`.
pub fn trial_seeds(base: u64, trial: usize) -> (u64, u64) {
    let t = trial as u64;
    (splitmix64(base, 2 * t), splitmix64(base, 2 * t + 1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    Sequential,
    /// Fixed-size pool of worker threads drawing trial indices from a shared counter.
    Parallel { threads: NonZeroUsize },
}

impl Execution {
    /// Pool sized to the available parallelism.
    pub fn parallel_auto() -> Self {
        let threads = thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        Execution::Parallel { threads }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MonteCarloSettings {
    pub trials: usize,
    pub surrogate: SurrogateParams,
    pub base_seed: u64,
    pub execution: Execution,
}

#[derive(Debug, Clone)]
pub struct MonteCarloOutcome {
    pub observed: CorrelationDiagram,
    pub pvalues: PValueDiagram,
    pub counts: ExceedanceCounts,
    /// Surrogates that stopped above the tolerance.
    pub non_converged: usize,
}

/// Read-only state shared by every trial.
struct TrialContext<'a> {
    observed: &'a CorrelationDiagram,
    inv_a: &'a SurrogateInvariants,
    inv_b: &'a SurrogateInvariants,
    spec: WindowSpec,
    surrogate: SurrogateParams,
    base_seed: u64,
}

/// Per-worker generators and scratch; never shared.
struct TrialRunner<'a> {
    ctx: &'a TrialContext<'a>,
    gen_a: SurrogateGenerator<'a>,
    gen_b: SurrogateGenerator<'a>,
    non_converged: usize,
}

impl<'a> TrialRunner<'a> {
    fn new(ctx: &'a TrialContext<'a>) -> Self {
        Self {
            ctx,
            gen_a: SurrogateGenerator::new(ctx.inv_a, ctx.surrogate),
            gen_b: SurrogateGenerator::new(ctx.inv_b, ctx.surrogate),
            non_converged: 0,
        }
    }

    fn run(&mut self, trial: usize, counts: ExceedanceCounts) -> ExceedanceCounts {
        let (seed_a, seed_b) = trial_seeds(self.ctx.base_seed, trial);
        let sa = self.gen_a.generate(seed_a);
        let sb = self.gen_b.generate(seed_b);
        self.non_converged += usize::from(!sa.converged) + usize::from(!sb.converged);
        debug!(
            trial,
            residual_a = sa.residual,
            residual_b = sb.residual,
            iterations_a = sa.iterations,
            iterations_b = sb.iterations,
            "surrogate pair generated"
        );
        let diagram = compute_diagram(&sa.values, &sb.values, &self.ctx.spec);
        counts.record(self.ctx.observed, &diagram)
    }
}

/// Observed diagram of `a` and `b` plus its surrogate-based p-value diagram.
pub fn run(a: &[f64], b: &[f64], spec: &WindowSpec, settings: &MonteCarloSettings) -> Result<MonteCarloOutcome> {
    if settings.trials == 0 {
        return Err(DxcError::ZeroTrials);
    }
    let observed = compute_diagram(a, b, spec);
    let inv_a = SurrogateInvariants::new(a);
    let inv_b = SurrogateInvariants::new(b);
    run_with_invariants(observed, &inv_a, &inv_b, spec, settings)
}

/// Monte-Carlo phase for an already computed observed diagram.
pub fn run_with_invariants(
    observed: CorrelationDiagram,
    inv_a: &SurrogateInvariants,
    inv_b: &SurrogateInvariants,
    spec: &WindowSpec,
    settings: &MonteCarloSettings,
) -> Result<MonteCarloOutcome> {
    if settings.trials == 0 {
        return Err(DxcError::ZeroTrials);
    }
    let ctx = TrialContext {
        observed: &observed,
        inv_a,
        inv_b,
        spec: *spec,
        surrogate: settings.surrogate,
        base_seed: settings.base_seed,
    };

    let started = Instant::now();
    let (counts, non_converged) = match settings.execution {
        Execution::Sequential => run_sequential(&ctx, settings.trials),
        Execution::Parallel { threads } => {
            let threads = threads.get().min(settings.trials);
            run_parallel(&ctx, settings.trials, threads)?
        }
    };
    info!(
        trials = counts.trials(),
        non_converged,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "surrogate trials finished"
    );

    let pvalues = counts.finalize()?;
    Ok(MonteCarloOutcome {
        observed,
        pvalues,
        counts,
        non_converged,
    })
}

fn run_sequential(ctx: &TrialContext<'_>, trials: usize) -> (ExceedanceCounts, usize) {
    let mut runner = TrialRunner::new(ctx);
    let counts = (0..trials).fold(ExceedanceCounts::zeros_like(ctx.observed), |acc, trial| {
        runner.run(trial, acc)
    });
    (counts, runner.non_converged)
}

fn run_parallel(ctx: &TrialContext<'_>, trials: usize, threads: usize) -> Result<(ExceedanceCounts, usize)> {
    info!(threads, trials, "starting surrogate worker pool");
    let next_trial = AtomicUsize::new(0);
    let (partial_tx, partial_rx) = unbounded::<(ExceedanceCounts, usize)>();

    thread::scope(|scope| -> Result<()> {
        let mut handles = Vec::with_capacity(threads);
        for worker in 0..threads {
            let partial_tx = partial_tx.clone();
            let next_trial = &next_trial;
            let handle = thread::Builder::new()
                .name(format!("surrogate-{worker}"))
                .spawn_scoped(scope, move || {
                    let mut runner = TrialRunner::new(ctx);
                    let mut counts = ExceedanceCounts::zeros_like(ctx.observed);
                    loop {
                        let trial = next_trial.fetch_add(1, Ordering::Relaxed);
                        if trial >= trials {
                            break;
                        }
                        counts = runner.run(trial, counts);
                    }
                    debug!(worker, trials = counts.trials(), "worker done");
                    let _ = partial_tx.send((counts, runner.non_converged));
                })
                .map_err(DxcError::WorkerSpawn)?;
            handles.push(handle);
        }
        drop(partial_tx);

        for handle in handles {
            handle.join().map_err(|_| DxcError::WorkerPanicked)?;
        }
        Ok(())
    })?;

    // Single reduction over the per-worker partials.
    Ok(partial_rx.try_iter().fold(
        (ExceedanceCounts::zeros_like(ctx.observed), 0),
        |(acc, nc), (partial, partial_nc)| (acc.merge(partial), nc + partial_nc),
    ))
}
