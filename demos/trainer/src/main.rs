//! Trainer entry-point: build options, parse the command line, report the run.

use std::io::Write as _;

use model_opts::ModelError;
use tracing_subscriber::EnvFilter;

use trainer::cli::TrainerOptions;
use trainer::error::{Result, TrainerError};
use trainer::report::write_summary;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    match run() {
        Err(TrainerError::Options(err)) => exit_with(&err),
        outcome => outcome.map_err(color_eyre::eyre::Report::from),
    }
}

/// Report a rejected invocation and leave with the error's exit status.
fn exit_with(err: &ModelError) -> ! {
    // clap renders its own errors, help and version output.
    if let ModelError::CliParsing(clap_err) = err {
        clap_err.exit();
    }
    let code = err.exit_code();
    tracing::debug!(code, "options rejected");
    writeln!(std::io::stderr().lock(), "error: {err}").ok();
    std::process::exit(code)
}

fn run() -> Result<()> {
    let options = TrainerOptions::from_env()?;
    let invocation = options.parse_from(std::env::args_os())?;
    tracing::info!(
        epochs = invocation.training.epochs,
        dataset = %invocation.training.dataset.path,
        "starting run"
    );
    write_summary(&mut std::io::stdout().lock(), &invocation)
}
