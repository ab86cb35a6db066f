use chrono::{DateTime, Local};
use std::path::Path;
use tracing::info;

use super::{Artifact, CaptureError, PendingOutput};
use crate::config::{expand_tilde, Integration};
use crate::utils::executor::CommandExecutor;

/// Archive a folder with `tar -czf <file> <path>`
pub fn capture_folder(
    executor: &dyn CommandExecutor,
    folder: &Path,
    output_dir: &Path,
    at: DateTime<Local>,
) -> Result<Artifact, CaptureError> {
    let pending = PendingOutput::new(output_dir, Integration::Folder, at);
    let output = pending.path_arg();
    let folder = expand_tilde(folder);
    let folder = folder.to_string_lossy();

    info!("Archiving {} to {}", folder, output);

    executor
        .run_command("tar", &["-czf", &output, &folder], None)
        .map_err(|error| CaptureError {
            integration: Integration::Folder,
            error,
        })?;

    Ok(pending.complete(Integration::Folder))
}
