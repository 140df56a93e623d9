//! nupdate - NuGet dependency updater CLI tool
//!
//! Updates `PackageReference` and `packages.config` versions of a solution,
//! a project or a directory according to a major/minor/patch policy.

use anyhow::Context;
use clap::Parser;
use nupdate::cli::CliArgs;
use nupdate::config::Settings;
use nupdate::error::{AppError, ConfigError};
use nupdate::logging::{init_logging, LogConfig};
use nupdate::manifest::{detect_location, ManifestLocation};
use nupdate::orchestrator::{Orchestrator, OrchestratorConfig};
use nupdate::output::{create_formatter, OutputConfig};
use nupdate::registry::{HttpClient, NuGetAdapter};
use nupdate::restore::{run_restores, SystemRestore};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Resolves logging, feed settings and the target before anything runs
fn prepare(args: &CliArgs) -> Result<(Settings, ManifestLocation), AppError> {
    init_logging(&LogConfig::from_flags(
        args.verbose,
        args.quiet,
        args.log.as_deref(),
    ))?;
    debug!(version = env!("CARGO_PKG_VERSION"), path = %args.path.display(), "starting");

    let cwd = std::env::current_dir().map_err(|e| ConfigError::InvalidPath {
        path: PathBuf::from("."),
        message: e.to_string(),
    })?;
    let settings = Settings::resolve(args.source.as_deref(), &cwd)?;
    info!(feed = %settings.feed_url, source = %settings.source, "using feed");

    let location = detect_location(&args.path)?;
    Ok((settings, location))
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let (settings, location) = prepare(&args)?;

    let client = HttpClient::new().context("failed to create HTTP client")?;
    let registry = Arc::new(NuGetAdapter::new(client, settings.feed_url));
    let orchestrator = Orchestrator::new(OrchestratorConfig::from_args(&args), registry);

    if let Some(timeout) = args.timeout {
        let token = orchestrator.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            warn!(seconds = timeout.as_secs(), "timeout reached, cancelling");
            token.cancel();
        });
    }

    let summary = orchestrator.run(&location).await;

    // Output results
    let mut output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet, args.dry_run);
    output_config.color = io::stdout().is_terminal();
    let formatter = create_formatter(output_config);
    let mut stdout = io::stdout().lock();
    formatter.format(&summary, &mut stdout)?;
    stdout.flush()?;
    drop(stdout);

    let mut has_errors = summary.has_errors();

    // Restore changed projects if requested
    if args.restore && !args.dry_run {
        let changed: Vec<PathBuf> = summary.changed_projects().map(|p| p.path.clone()).collect();
        for result in run_restores(&SystemRestore::new(), &changed) {
            if result.is_skipped() {
                continue;
            }
            if result.success {
                if !args.quiet {
                    eprintln!("Restored {}: {}", result.project.display(), result.command);
                }
            } else {
                has_errors = true;
                eprintln!("Restore failed for {}: {}", result.project.display(), result.command);
                if !result.stderr.is_empty() {
                    eprintln!("    {}", result.stderr.trim_end());
                }
            }
        }
    }

    // Return appropriate exit code
    if has_errors {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
