use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use varsync::cli::{self, Commands, RunStatus};
use varsync::core::config::ConfigError;

/// Exit status for options rejected before any work is done
const EXIT_INVALID_CONFIG: u8 = 2;

/// Exit status for a run that finished with abandoned chromosomes
const EXIT_INCOMPLETE: u8 = 3;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("varsync=debug,info")
    } else {
        EnvFilter::new("varsync=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Compare(args) => cli::compare::run(args, cli.format, cli.verbose),
        Commands::Trio(args) => cli::trio::run(args, cli.format, cli.verbose),
    };

    match result {
        Ok(RunStatus::Complete) => ExitCode::SUCCESS,
        Ok(RunStatus::Incomplete) => ExitCode::from(EXIT_INCOMPLETE),
        Err(error) => {
            eprintln!("Error: {error:#}");
            if error.downcast_ref::<ConfigError>().is_some() {
                ExitCode::from(EXIT_INVALID_CONFIG)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
