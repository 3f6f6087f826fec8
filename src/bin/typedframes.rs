use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use typedframes::checker::{self, ProcessChecker};
use typedframes::TypedFramesError;

#[derive(Parser)]
#[command(name = "typedframes")]
#[command(about = "Static analysis for DataFrame column schemas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check Python files for column errors
    Check {
        /// File or directory to check
        path: PathBuf,

        /// Exit with code 1 if any errors are found
        #[arg(long)]
        strict: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { path, strict, json } => run_check(path, strict, json),
    }
}

fn run_check(path: PathBuf, strict: bool, json: bool) -> Result<ExitCode> {
    if !path.exists() {
        eprintln!("Error: path does not exist: {}", path.display());
        return Ok(ExitCode::from(2));
    }
    let path = path
        .canonicalize()
        .with_context(|| format!("resolving {}", path.display()))?;

    let files = checker::collect_python_files(&path)?;
    info!(path = %path.display(), files = files.len(), "Starting check");

    let start = Instant::now();
    let diagnostics = match checker::check_files(&ProcessChecker::from_env(), &files) {
        Ok(diagnostics) => diagnostics,
        Err(TypedFramesError::Checker(msg)) => {
            error!("{}", msg);
            eprintln!("Error: {}", msg);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };
    let elapsed = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    } else {
        if !diagnostics.is_empty() {
            println!("{}", checker::format_human(&diagnostics));
            println!();
        }
        println!("{}", checker::format_summary(diagnostics.len(), files.len(), elapsed));
    }

    if strict && !diagnostics.is_empty() {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}
