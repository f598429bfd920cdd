//! Save Backup - Main entry point
//!
//! Mirrors game-save directories into a local backup tree.

use anyhow::Result;
use clap::{Parser, Subcommand};
use saves_backup::{catalog, config::Config, executor, fs, utils, BackupRunner, RunLog};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Back up every game save (default)
    Run,
    /// Show the games that would be backed up, without copying
    List,
    /// Print the path of today's log file
    LogPath,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = if let Some(config_path) = args.config {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };
    let config = config.with_env_overrides();

    // Initialize logging
    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    utils::logger::init(log_level)?;

    tracing::info!(
        "Starting saves-backup v{} (backup root: {})",
        env!("CARGO_PKG_VERSION"),
        config.paths.backup_root.display()
    );

    let log = Arc::new(RunLog::new(config.paths.log_dir()));

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run(&config, log).await,
        Command::List => list(&config).await,
        Command::LogPath => {
            println!("{}", log.current_path().display());
            Ok(())
        }
    }
}

/// Create the backup root, game directory and log directory if needed.
fn bootstrap(config: &Config, log: &RunLog) -> Result<()> {
    if log.ensure_dir()? {
        log.record(&format!(
            "Destination Directory created at {}",
            log.dir().display()
        ));
    }
    executor::ensure_root(&config.paths.game_dir(), log)?;
    Ok(())
}

async fn run(config: &Config, log: Arc<RunLog>) -> Result<()> {
    bootstrap(config, &log)?;

    println!("Gathering game information...");
    let resolution = catalog::resolve_from_config(config).await;
    for e in &resolution.rejected {
        log.record(&e.log_line());
    }
    let rejected = resolution.rejected.len();

    println!("Starting backup of {} games...", resolution.jobs.len());
    let jobs = resolution.jobs;
    let runner_log = log.clone();
    let mut result =
        tokio::task::spawn_blocking(move || BackupRunner::new(runner_log).run(&jobs)).await?;
    result.job_errors += rejected;

    if result.is_clean() {
        println!("Complete");
    } else {
        println!(
            "Error, see {} for details.",
            log.current_path().display()
        );
    }
    println!(
        "Backed up {} games ({} file errors, {} backup errors)",
        result.completed.len(),
        result.file_errors,
        result.job_errors
    );

    Ok(())
}

async fn list(config: &Config) -> Result<()> {
    let resolution = catalog::resolve_from_config(config).await;

    for e in &resolution.rejected {
        eprintln!("warning: {}", e);
    }

    for job in &resolution.jobs {
        match fs::summarize_tree(job.source_path()) {
            Ok(summary) => println!(
                "{}\n  {} -> {} ({} files, {} bytes)",
                job.identifier(),
                job.source_path().display(),
                job.dest_path().display(),
                summary.files,
                summary.bytes
            ),
            Err(e) => println!(
                "{}\n  {} -> {} (unreadable: {})",
                job.identifier(),
                job.source_path().display(),
                job.dest_path().display(),
                e
            ),
        }
    }

    Ok(())
}
