mod cli;

use anyhow::{Context, Result};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use cli::Cli;
use std::process::ExitCode;
use std::sync::Arc;
use wavforge::{build_encoder, config, PoolReport, Reporter, Scheduler};

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = config::load_config_or_default(cli.config.as_deref())?;
    cli.apply(&mut config);

    // Per-file lines move to stderr so stdout carries only the JSON report
    let reporter = Arc::new(if cli.json {
        Reporter::stderr()
    } else {
        Reporter::stdout()
    });

    let scheduler = Scheduler::new(&config.batch);
    let queue = scheduler.load(&cli.dir, &reporter)?;

    let report = if queue.is_empty() {
        PoolReport::nothing_to_do(0)
    } else {
        let encoder = build_encoder(&config).context("Failed to set up the encoder")?;
        tracing::info!(
            encoder = encoder.name(),
            jobs = queue.len(),
            "Starting batch"
        );
        scheduler.dispatch(queue, encoder, Arc::clone(&reporter))
    };

    tracing::info!(
        status = %report.status,
        succeeded = report.succeeded,
        failed = report.failed,
        unattempted = report.unattempted,
        "Batch finished"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if report.is_success(config.batch.strict) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// A missing or extra folder argument only prints usage. Unknown flags keep
/// clap's normal error exit.
fn is_folder_count_error(e: &clap::Error) -> bool {
    match e.kind() {
        ErrorKind::MissingRequiredArgument | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            true
        }
        ErrorKind::UnknownArgument => match e.get(ContextKind::InvalidArg) {
            Some(ContextValue::String(arg)) => !arg.starts_with('-'),
            _ => false,
        },
        _ => false,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if is_folder_count_error(&e) => {
            print!("{}", e.render());
            return ExitCode::SUCCESS;
        }
        Err(e) => e.exit(),
    };

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "wavforge=debug,wavforge_av=debug,wavforge_common=debug".to_string()
        } else {
            "wavforge=warn,wavforge_av=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
