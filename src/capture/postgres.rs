use chrono::{DateTime, Local};
use std::path::Path;
use tracing::info;

use super::{Artifact, CaptureError, PendingOutput};
use crate::config::Integration;
use crate::utils::executor::CommandExecutor;

/// Dump a PostgreSQL database with `pg_dump <url> -f <file>`
pub fn capture_database(
    executor: &dyn CommandExecutor,
    connection_string: &str,
    output_dir: &Path,
    at: DateTime<Local>,
) -> Result<Artifact, CaptureError> {
    let pending = PendingOutput::new(output_dir, Integration::Postgresql, at);
    let output = pending.path_arg();

    info!("Dumping PostgreSQL database to {}", output);

    executor
        .run_command("pg_dump", &[connection_string, "-f", &output], None)
        .map_err(|error| CaptureError {
            integration: Integration::Postgresql,
            error,
        })?;

    Ok(pending.complete(Integration::Postgresql))
}
