//! Source capture
//!
//! Each capture runs one external tool and yields exactly one [`Artifact`]:
//! a timestamped file in the output directory that the orchestrator hands to a
//! destination and deletes afterwards.

mod folder;
mod postgres;

pub use folder::capture_folder;
pub use postgres::capture_database;

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Integration;
use crate::utils::command::CommandError;

/// Timestamp layout used in artifact names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// A transient backup file produced by one capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub source: Integration,
    pub path: PathBuf,
}

impl Artifact {
    pub fn new(source: Integration, path: PathBuf) -> Self {
        Self { source, path }
    }

    /// Base file name, used as the object name at every destination
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{integration} backup failed: {error}")]
pub struct CaptureError {
    pub integration: Integration,
    #[source]
    pub error: CommandError,
}

/// `postgres_backup_<ts>.sql` / `folder_backup_<ts>.tar.gz`
pub fn artifact_file_name(source: Integration, at: DateTime<Local>) -> String {
    let timestamp = at.format(TIMESTAMP_FORMAT);
    match source {
        Integration::Postgresql => format!("postgres_backup_{}.sql", timestamp),
        Integration::Folder => format!("folder_backup_{}.tar.gz", timestamp),
    }
}

/// Removes a half-written output file unless the capture completes
struct PendingOutput {
    path: PathBuf,
    armed: bool,
}

impl PendingOutput {
    fn new(output_dir: &Path, source: Integration, at: DateTime<Local>) -> Self {
        Self {
            path: output_dir.join(artifact_file_name(source, at)),
            armed: true,
        }
    }

    fn path_arg(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    fn complete(mut self, source: Integration) -> Artifact {
        self.armed = false;
        Artifact::new(source, std::mem::take(&mut self.path))
    }
}

impl Drop for PendingOutput {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                debug!("Failed to remove partial output {:?}: {}", self.path, e);
            }
        }
    }
}
