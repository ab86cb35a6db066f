use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::{Destination, DispatchError};
use crate::capture::Artifact;
use crate::config::expand_tilde;

/// Moves artifacts into a directory on the local filesystem
pub struct LocalDestination {
    target_dir: PathBuf,
}

impl LocalDestination {
    pub fn new(target_dir: PathBuf) -> Self {
        Self { target_dir }
    }
}

impl Destination for LocalDestination {
    fn name(&self) -> &str {
        "local"
    }

    fn deliver(&self, artifact: &Artifact) -> Result<(), DispatchError> {
        let target_dir = expand_tilde(&self.target_dir);
        if !target_dir.is_dir() {
            return Err(DispatchError::NotFound(format!(
                "directory {} does not exist",
                target_dir.display()
            )));
        }

        let target = target_dir.join(artifact.file_name());

        // Plain rename: a move across filesystems fails instead of copying
        fs::rename(&artifact.path, &target).map_err(|e| DispatchError::io(&target, e))?;

        info!("Moved {} to {}", artifact.file_name(), target.display());
        Ok(())
    }
}
