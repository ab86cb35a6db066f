//! Cron job management utilities

use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::command::CommandError;
use super::executor::CommandExecutor;

/// Flag that switches the binary into execution mode
pub const EXECUTION_FLAG: &str = "--backup";

/// Daily at midnight
pub const DAILY: &str = "0 0 * * *";
/// Weekly on Sunday at midnight
pub const WEEKLY: &str = "0 0 * * 0";
/// Monthly on the 1st at midnight
pub const MONTHLY: &str = "0 0 1 * *";

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Failed to get current executable path: {0}")]
    ExecutablePath(#[source] std::io::Error),

    #[error("Failed to update crontab: {0}")]
    Crontab(#[from] CommandError),
}

/// Get the path to the running backup-app binary
pub fn get_binary_path() -> Result<PathBuf, ScheduleError> {
    env::current_exe().map_err(ScheduleError::ExecutablePath)
}

/// Build the single crontab line that re-invokes `executable` in execution mode
pub fn build_cron_entry(schedule: &str, executable: &Path) -> String {
    format!("{} {} {}", schedule.trim(), executable.display(), EXECUTION_FLAG)
}

/// Get the current crontab
pub fn get_crontab(executor: &dyn CommandExecutor) -> Result<String, ScheduleError> {
    match executor.run_command_stdout("crontab", &["-l"], None) {
        Ok(content) => Ok(content),
        // An empty table makes `crontab -l` exit non-zero
        Err(CommandError::Failed { stderr, .. }) if stderr.contains("no crontab") => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Replace the whole crontab with `content`
pub fn set_crontab(executor: &dyn CommandExecutor, content: &str) -> Result<(), ScheduleError> {
    executor.run_command_with_input("crontab", &["-"], content)?;
    info!("Crontab updated successfully");
    Ok(())
}

/// Install the backup job, replacing any previous crontab content for this user.
///
/// Returns the installed line.
pub fn install_backup_job(
    executor: &dyn CommandExecutor,
    schedule: &str,
    executable: &Path,
) -> Result<String, ScheduleError> {
    let entry = build_cron_entry(schedule, executable);
    set_crontab(executor, &format!("{}\n", entry))?;

    // Read back; a mismatch is worth a warning but the install itself succeeded
    match get_crontab(executor) {
        Ok(current) if current.lines().any(|line| line.trim() == entry) => {
            info!("Installed cron job: {}", entry);
        }
        Ok(_) => warn!("Installed cron job not found when reading crontab back"),
        Err(e) => warn!("Could not verify crontab: {}", e),
    }

    Ok(entry)
}

/// Validate cron schedule syntax
pub fn validate_cron_schedule(schedule: &str) -> bool {
    // Basic validation: should have 5 fields
    schedule.split_whitespace().count() == 5
}
