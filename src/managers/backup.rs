//! Backup manager - orchestrates a `--backup` run
//!
//! Capture every configured source in order, then dispatch each artifact to
//! the configured destination and delete the local copy.

use chrono::Local;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::capture::{self, Artifact, CaptureError};
use crate::config::{BackupConfiguration, Integration};
use crate::destinations::{build_destination, Destination, DispatchError};
use crate::utils::executor::{CommandExecutor, RealExecutor};

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("{0} is selected but not configured")]
    MissingParameter(&'static str),
}

/// A dispatch that did not make it to the destination
#[derive(Debug)]
pub struct DispatchFailure {
    pub file_name: String,
    pub error: DispatchError,
}

/// Outcome of one run
#[derive(Debug, Default)]
pub struct RunReport {
    pub delivered: Vec<String>,
    pub failures: Vec<DispatchFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct BackupManager {
    config: BackupConfiguration,
    executor: Box<dyn CommandExecutor>,
    destination: Box<dyn Destination>,
    /// Where artifacts are written before dispatch
    work_dir: PathBuf,
}

impl BackupManager {
    /// Create a backup manager using real processes and the configured destination
    pub fn new(config: BackupConfiguration, work_dir: PathBuf) -> Self {
        let destination = build_destination(&config.storage);
        Self {
            config,
            executor: Box::new(RealExecutor::new()),
            destination,
            work_dir,
        }
    }

    /// Create a backup manager with specific collaborators
    pub fn with_components(
        config: BackupConfiguration,
        work_dir: PathBuf,
        executor: Box<dyn CommandExecutor>,
        destination: Box<dyn Destination>,
    ) -> Self {
        Self {
            config,
            executor,
            destination,
            work_dir,
        }
    }

    /// Run one backup: capture all sources, then dispatch and clean up each artifact.
    ///
    /// A capture failure aborts the run before anything is dispatched; artifacts
    /// captured earlier in the same run stay in the working directory.
    pub fn run(&self) -> Result<RunReport, BackupError> {
        let start_time = Instant::now();

        info!(
            "Starting backup of {} source(s) to {}",
            self.config.integrations.len(),
            self.destination.name()
        );

        let artifacts = self.capture_all()?;

        let mut report = RunReport::default();
        for artifact in &artifacts {
            match self.destination.deliver(artifact) {
                Ok(()) => {
                    info!(
                        "Successfully stored '{}' at {}",
                        artifact.file_name(),
                        self.destination.name()
                    );
                    report.delivered.push(artifact.file_name());
                }
                Err(e) => {
                    error!(
                        "Failed to store '{}' at {}: {}",
                        artifact.file_name(),
                        self.destination.name(),
                        e
                    );
                    report.failures.push(DispatchFailure {
                        file_name: artifact.file_name(),
                        error: e,
                    });
                }
            }

            remove_artifact(artifact);
        }

        info!(
            "Backup completed in {:.2}s: {} stored, {} failed",
            start_time.elapsed().as_secs_f64(),
            report.delivered.len(),
            report.failures.len()
        );

        Ok(report)
    }

    /// Capture every configured source in the fixed order, stopping at the first failure
    fn capture_all(&self) -> Result<Vec<Artifact>, BackupError> {
        let mut artifacts = Vec::new();

        for integration in self.config.capture_order() {
            let artifact = self.capture(integration).map_err(|e| {
                error!("{}", e);
                e
            })?;
            info!("Captured {} as {}", integration, artifact.file_name());
            artifacts.push(artifact);
        }

        Ok(artifacts)
    }

    fn capture(&self, integration: Integration) -> Result<Artifact, BackupError> {
        let executor = self.executor.as_ref();
        let at = Local::now();

        let artifact = match integration {
            Integration::Postgresql => {
                let url = self
                    .config
                    .postgres_url
                    .as_deref()
                    .ok_or(BackupError::MissingParameter("postgres_url"))?;
                capture::capture_database(executor, url, &self.work_dir, at)?
            }
            Integration::Folder => {
                let folder = self
                    .config
                    .folder_path
                    .as_deref()
                    .ok_or(BackupError::MissingParameter("folder_path"))?;
                capture::capture_folder(executor, folder, &self.work_dir, at)?
            }
        };

        Ok(artifact)
    }
}

/// Best-effort removal of the local artifact; failures are not surfaced
fn remove_artifact(artifact: &Artifact) {
    match fs::remove_file(&artifact.path) {
        Ok(()) => debug!("Removed local artifact {:?}", artifact.path),
        Err(e) => debug!("Local artifact {:?} not removed: {}", artifact.path, e),
    }
}
