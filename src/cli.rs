use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::AppConfig;
use crate::core::montecarlo::Execution;
use crate::core::surrogate::SurrogateParams;
use crate::core::window::WindowSpec;
use crate::error::{DxcError, Result};
use crate::io::Separator;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Zero-delay cross-correlation diagram of two sequences, with surrogate-based p-values"
)]
pub struct Args {
    /// Column numbers (1-based) of the two sequences to analyze
    #[arg(short = 'n', num_args = 2, value_names = ["A", "B"])]
    pub columns: Option<Vec<usize>>,

    /// Number of window widths (rows of a diagram)
    #[arg(short = 'W', long = "widths")]
    pub width_count: Option<usize>,

    /// Base window width in samples (odd values are reduced by 1)
    #[arg(short = 'L', long = "base-width")]
    pub base_width: Option<usize>,

    /// Only compute the correlation diagram
    #[arg(short = 'C', short_alias = 'c', long = "correlation")]
    pub correlation: bool,

    /// Compute the p-value diagram by surrogate generation (default)
    #[arg(short = 'p', long = "pvalue")]
    pub pvalue: bool,

    /// Number of surrogate pairs (overrides config; default 100)
    #[arg(short = 'M', long = "surrogates")]
    pub trials: Option<usize>,

    /// Average the correlations at delays +tau and -tau
    #[arg(long, default_value_t = 0)]
    pub tau: usize,

    /// Run surrogate trials on a pool of worker threads
    #[arg(long)]
    pub parallel: bool,

    /// Worker threads for --parallel (0 = available parallelism)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Base seed of the surrogate generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Surrogate convergence tolerance on the relative spectral deviation
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Read the table from a file instead of standard input
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write the diagram to a file instead of standard output
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Column separator: t (TAB), s (space) or c (comma)
    #[arg(short = 's', long = "separator", value_enum, default_value_t = Separator::Tab)]
    pub separator: Separator,

    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the default config TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Which diagram a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    CorrelationOnly,
    PValue,
}

/// Fully validated parameters of one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// 1-based column numbers.
    pub columns: (usize, usize),
    pub window: WindowSpec,
    pub mode: RunMode,
    pub trials: usize,
    pub surrogate: SurrogateParams,
    pub seed: Option<u64>,
    pub execution: Execution,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub separator: Separator,
}

impl Args {
    /// P-value output unless only the correlation diagram was asked for.
    pub fn run_mode(&self) -> RunMode {
        if self.correlation && !self.pvalue {
            RunMode::CorrelationOnly
        } else {
            RunMode::PValue
        }
    }

    /// Validates flags against `config` before any input is read.
    pub fn resolve(&self, config: &AppConfig) -> Result<RunSettings> {
        let columns = match self.columns.as_deref() {
            Some(&[a, b]) if a > 0 && b > 0 => (a, b),
            Some(&[a, b]) => return Err(DxcError::InvalidColumn { a, b }),
            _ => return Err(DxcError::InvalidColumn { a: 0, b: 0 }),
        };
        let width_count = self.width_count.ok_or(DxcError::InvalidWindowCount)?;
        let window = WindowSpec::new(self.base_width.unwrap_or(0), width_count, self.tau)?;

        let trials = self.trials.unwrap_or(config.montecarlo.trials);
        if trials == 0 {
            return Err(DxcError::ZeroTrials);
        }
        let mut surrogate = config.surrogate.params();
        if let Some(tolerance) = self.tolerance {
            surrogate.tolerance = tolerance;
        }
        if !(surrogate.tolerance.is_finite() && surrogate.tolerance > 0.0) {
            return Err(DxcError::InvalidTolerance(surrogate.tolerance));
        }

        let execution = if self.parallel {
            match NonZeroUsize::new(self.threads.unwrap_or(config.montecarlo.threads)) {
                Some(threads) => Execution::Parallel { threads },
                None => Execution::parallel_auto(),
            }
        } else {
            Execution::Sequential
        };

        Ok(RunSettings {
            columns,
            window,
            mode: self.run_mode(),
            trials,
            surrogate,
            seed: self.seed.or(config.montecarlo.seed),
            execution,
            input: self.input.clone(),
            output: self.output.clone(),
            separator: self.separator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("zdxc").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn minimal_invocation_defaults_to_pvalues() {
        let args = parse(&["-n", "1", "2", "-W", "3", "-L", "10"]);
        let s = args.resolve(&AppConfig::default()).unwrap();
        assert_eq!(s.columns, (1, 2));
        assert_eq!(s.mode, RunMode::PValue);
        assert_eq!(s.trials, 100);
        assert_eq!(s.window.base_width(), 10);
        assert_eq!(s.window.width_count(), 3);
        assert_eq!(s.window.delay(), 0);
        assert_eq!(s.execution, Execution::Sequential);
        assert_eq!(s.separator, Separator::Tab);
    }

    #[test]
    fn mode_flags_resolve_to_one_mode() {
        assert_eq!(parse(&["-C"]).run_mode(), RunMode::CorrelationOnly);
        assert_eq!(parse(&["-c"]).run_mode(), RunMode::CorrelationOnly);
        assert_eq!(parse(&["-p"]).run_mode(), RunMode::PValue);
        assert_eq!(parse(&["-C", "-p"]).run_mode(), RunMode::PValue);
        assert_eq!(parse(&[]).run_mode(), RunMode::PValue);
    }

    #[test]
    fn cli_overrides_config() {
        let mut config = AppConfig::default();
        config.montecarlo.trials = 500;
        config.montecarlo.threads = 2;
        config.montecarlo.seed = Some(5);
        let args = parse(&[
            "-n", "2", "3", "-W", "2", "-L", "7", "-M", "40", "--tau", "3", "--parallel",
            "--tolerance", "0.2", "-s", "c",
        ]);
        let s = args.resolve(&config).unwrap();
        assert_eq!(s.trials, 40);
        assert_eq!(s.window.base_width(), 6);
        assert_eq!(s.window.delay(), 3);
        assert_eq!(s.seed, Some(5));
        assert_eq!(s.surrogate.tolerance, 0.2);
        assert_eq!(
            s.execution,
            Execution::Parallel {
                threads: NonZeroUsize::new(2).unwrap()
            }
        );
        assert_eq!(s.separator, Separator::Comma);
    }

    #[test]
    fn invalid_flags_are_configuration_errors() {
        let cfg = AppConfig::default();
        let cases: [&[&str]; 6] = [
            &["-W", "2", "-L", "4"],
            &["-n", "0", "2", "-W", "2", "-L", "4"],
            &["-n", "1", "2", "-L", "4"],
            &["-n", "1", "2", "-W", "2"],
            &["-n", "1", "2", "-W", "2", "-L", "4", "-M", "0"],
            &["-n", "1", "2", "-W", "2", "-L", "4", "--tolerance", "0"],
        ];
        for argv in cases {
            let err = parse(argv).resolve(&cfg).unwrap_err();
            assert!(err.is_configuration(), "{argv:?} -> {err}");
        }
    }
}
