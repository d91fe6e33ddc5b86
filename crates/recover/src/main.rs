//! `recover` binary entry point.
//!
//! Startup sequence:
//! 1. Parse the command line.
//! 2. Load and validate [`Config`] from environment variables, apply CLI overrides.
//! 3. Initialise structured JSON logging.
//! 4. Resolve the passphrase from its configured source.
//! 5. Run the selected command and print one JSON report line on stdout.
//!
//! Exit code is `0` on success and `1` on any failure.

mod app;
mod cli;
mod config;
mod crypto;
mod fetch;
mod passphrase;
mod persist;
mod pipeline;
mod telemetry;

use std::{process::ExitCode, time::Duration};

use clap::Parser;
use common::{
    protocol::{ErrorReport, RecoveryReport},
    RecoveryError,
};
use serde::Serialize;
use tracing::{error, info};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::passphrase::Passphrase;
use crate::persist::FilePersister;

#[tokio::main]
async fn main() -> ExitCode {
    // -----------------------------------------------------------------------
    // 1. Command line
    // -----------------------------------------------------------------------
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = match Config::from_env()
        .and_then(|c| c.with_overrides(cli.url.clone(), cli.output.clone()))
    {
        Ok(cfg) => cfg,
        Err(e) => {
            // Telemetry is not yet up; write to stderr directly.
            eprintln!("ERROR: configuration invalid: {e:#}");
            return fail(&RecoveryError::Config(format!("{e:#}")));
        }
    };

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    if let Err(e) = telemetry::init(&cfg.log_level) {
        eprintln!("ERROR: {e:#}");
        return fail(&RecoveryError::Config(format!("{e:#}")));
    }
    info!(version = env!("CARGO_PKG_VERSION"), "recover starting");

    // -----------------------------------------------------------------------
    // 4. Passphrase
    // -----------------------------------------------------------------------
    let passphrase = match passphrase::resolve(&cfg, |name| std::env::var(name).ok()) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    // -----------------------------------------------------------------------
    // 5. Command
    // -----------------------------------------------------------------------
    let outcome = match cli.action() {
        Command::Recover => recover(&cfg, passphrase).await.map(|r| print_json(&r)),
        Command::Seal { input } => app::run_seal(&input, &passphrase).map(|r| print_json(&r)),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

async fn recover(cfg: &Config, passphrase: Passphrase) -> Result<RecoveryReport, RecoveryError> {
    let url = cfg
        .source_url()
        .map_err(|e| RecoveryError::Config(format!("{e:#}")))?;
    let fetcher = HttpFetcher::new(
        Duration::from_secs(cfg.fetch_timeout_secs),
        cfg.max_blob_bytes,
    )?;
    let persister = FilePersister::new(&cfg.output_path);

    let report = app::run_recovery(&fetcher, &persister, url, passphrase, &cfg.output_path).await?;
    info!(
        path = %persister.path().display(),
        bytes = report.bytes_written,
        "recovery complete"
    );
    Ok(report)
}

fn fail(e: &RecoveryError) -> ExitCode {
    error!(kind = %e.kind(), error = %e, "run failed");
    print_json(&ErrorReport::from(e));
    ExitCode::from(e.exit_code())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => eprintln!("ERROR: failed to serialise report: {e}"),
    }
}
