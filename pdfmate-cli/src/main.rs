//! pdfmate - Merge, split and compress PDF documents.
//!
//! Human-readable output goes through [`OutputFormatter`]; with `--json` the
//! outcome or error is printed as one JSON document on stdout instead.

mod cli;

use clap::Parser;
use serde::Serialize;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use pdfmate::config::Config;
use pdfmate::error::{ErrorReport, PdfMateError};
use pdfmate::output::{OutputFormatter, display_document_info, display_outcome};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            // Usage errors share the exit code of argument errors.
            process::exit(1);
        }
        Err(err) => err.exit(),
    };

    init_logging(&cli);
    let json = cli.global.json;

    if let Err(err) = run(cli).await {
        if json {
            print_json(&ErrorReport::from(&err));
        } else {
            OutputFormatter::new(false, false).error(&err.to_string());
        }
        process::exit(err.exit_code());
    }
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise the level follows `--verbose` / `--quiet`.
/// Logs always go to stderr so stdout stays clean for `--json`.
fn init_logging(cli: &Cli) {
    let default = if cli.global.verbose {
        "pdfmate=debug"
    } else if cli.global.quiet || cli.global.json {
        "pdfmate=error"
    } else {
        "pdfmate=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), PdfMateError> {
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);

    tracing::debug!(command = ?cli.command, "{} v{}", pdfmate::NAME, pdfmate::VERSION);

    match &cli.command {
        Command::Info { input } => {
            let info = pdfmate::inspect(input).await?;
            if config.json {
                print_json(&info);
            } else {
                display_document_info(&formatter, &info);
            }
            return Ok(());
        }
        Command::Merge { inputs, .. } => {
            formatter.info(&format!("Merging {} file(s)...", inputs.len()));
        }
        Command::Split { input, .. } | Command::Range { input, .. } => {
            formatter.info(&format!("Splitting {}...", input.display()));
        }
        Command::Compress { input, .. } => {
            formatter.info(&format!("Compressing {}...", input.display()));
        }
    }

    let outcome = execute(&cli.command, &config).await?;

    if config.json {
        print_json(&outcome);
    } else {
        display_outcome(&formatter, &outcome);
    }

    Ok(())
}

/// Run the operation named by `command`.
async fn execute(
    command: &Command,
    config: &Config,
) -> Result<pdfmate::OperationOutcome, PdfMateError> {
    let out = config.output_dir.as_path();
    let options = &config.options;

    match command {
        Command::Merge { inputs, .. } => pdfmate::merge(inputs, out, options).await,
        Command::Split {
            input,
            pages_per_file,
        } => pdfmate::split_by_count(input, *pages_per_file, out, options).await,
        Command::Range { input, start, end } => {
            pdfmate::split_by_range(input, *start, *end, out, options).await
        }
        Command::Compress { input, level } => {
            let level = Cli::compression_level(level)?;
            pdfmate::compress(input, level, out, options).await
        }
        Command::Info { .. } => Err(PdfMateError::invalid_config(
            "info does not produce output files",
        )),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "Could not serialize JSON output"),
    }
}
