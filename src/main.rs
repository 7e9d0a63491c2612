// Entry point: parses flags, installs logging and runs one analysis.
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use zdxc::app;
use zdxc::cli::Args;
use zdxc::config::AppConfig;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.print_config {
        print!("{}", AppConfig::commented_defaults());
        return;
    }

    let result = args
        .config
        .as_deref()
        .map_or_else(|| Ok(AppConfig::default()), AppConfig::load)
        .and_then(|config| args.resolve(&config))
        .and_then(|settings| app::run(&settings));

    if let Err(err) = result {
        error!("{err}");
        if err.is_configuration() {
            eprintln!("Use {} -h for a list of options.", env!("CARGO_BIN_NAME"));
        }
        std::process::exit(1);
    }
}
