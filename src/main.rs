use anyhow::{bail, Context, Result};
use backup_app::config::{self, load_config};
use backup_app::managers::backup::BackupManager;
use backup_app::managers::logging::{self, LoggingConfig};
use backup_app::managers::wizard::{self, TerminalPrompter};
use backup_app::utils::cron;
use backup_app::utils::executor::RealExecutor;
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "backup-app")]
#[command(about = "Scheduled backups of PostgreSQL databases and folders", long_about = None)]
#[command(version)]
struct Cli {
    /// Run a backup with the saved configuration (used by the cron job)
    #[arg(long)]
    backup: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.backup {
        run_backup()
    } else {
        run_configure()
    }
}

/// Execution mode: load, capture, dispatch, clean up
fn run_backup() -> Result<()> {
    // Keep the guard alive until the end of the run so the file log is flushed
    let _log_guard = match logging::init_logging(&LoggingConfig::default()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            logging::init_console_logging("info");
            error!("File logging unavailable: {:#}", e);
            None
        }
    };

    let config_path = config::default_config_path()?;
    let config = load_config(&config_path).map_err(|e| {
        error!("Error loading config: {}", e);
        e
    })?;

    let work_dir = std::env::current_dir().context("Failed to determine working directory")?;
    let manager = BackupManager::new(config, work_dir);

    let report = manager.run().map_err(|e| {
        error!("Backup aborted: {}", e);
        e
    })?;

    if !report.is_success() {
        for failure in &report.failures {
            eprintln!("✗ {}: {}", failure.file_name, failure.error);
        }
        bail!(
            "{} of {} backup(s) could not be stored",
            report.failures.len(),
            report.failures.len() + report.delivered.len()
        );
    }

    info!("All backups stored successfully");
    Ok(())
}

/// Interactive mode: wizard, save, install the cron job
fn run_configure() -> Result<()> {
    logging::init_console_logging("warn");

    let config_path = config::default_config_path()?;
    let mut prompter = TerminalPrompter;
    let executor = RealExecutor::new();

    let config = wizard::configure(&mut prompter, &executor, &config_path, cron::get_binary_path)?;

    println!("✓ Backup configured successfully.");
    println!("  Config:   {}", config_path.display());
    println!("  Schedule: {}", config.frequency);
    println!("  Storage:  {}", config.storage.kind());
    Ok(())
}
