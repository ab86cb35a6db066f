//! Destination dispatcher
//!
//! Every storage target implements [`Destination`]. The configured
//! [`StorageSettings`] variant picks exactly one implementation through
//! [`build_destination`].

mod google_drive;
mod local;
mod s3;
mod telegram;

pub use google_drive::{GoogleDriveDestination, ServiceAccountKey};
pub use local::LocalDestination;
pub use s3::S3Destination;
pub use telegram::TelegramDestination;

use std::path::PathBuf;

use crate::capture::Artifact;
use crate::config::StorageSettings;

/// Ship one artifact to a storage target.
///
/// On success the artifact is durably stored at the destination. On failure
/// the local file is left where it was.
pub trait Destination: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    fn deliver(&self, artifact: &Artifact) -> Result<(), DispatchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Unusable credentials: {0}")]
    Credentials(String),

    #[error("Destination not found: {0}")]
    NotFound(String),

    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DispatchError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DispatchError::Io {
            path: path.into(),
            source,
        }
    }
}

// Request URLs can carry credentials (the Telegram bot token is part of the path)
impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        DispatchError::Transport(e.without_url().to_string())
    }
}

/// Build the destination selected by the configuration
pub fn build_destination(settings: &StorageSettings) -> Box<dyn Destination> {
    match settings {
        StorageSettings::Local { local_path } => Box::new(LocalDestination::new(local_path.clone())),
        StorageSettings::Telegram {
            bot_token,
            channel_id,
        } => Box::new(TelegramDestination::new(bot_token.clone(), *channel_id)),
        StorageSettings::S3 {
            s3_bucket,
            s3_region,
            s3_access_key,
            s3_secret_key,
            s3_endpoint,
        } => Box::new(
            S3Destination::new(
                s3_bucket.clone(),
                s3_region.clone(),
                s3_access_key.clone(),
                s3_secret_key.clone(),
            )
            .with_endpoint(s3_endpoint.clone()),
        ),
        StorageSettings::GoogleDrive {
            google_creds,
            google_folder_id,
        } => Box::new(GoogleDriveDestination::new(
            google_creds.clone(),
            google_folder_id.clone(),
        )),
    }
}

/// A recording destination for testing
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use crate::config::Integration;
    use std::sync::{Arc, Mutex};

    /// One recorded delivery attempt
    #[derive(Clone, Debug)]
    pub struct Delivery {
        pub source: Integration,
        pub file_name: String,
        /// Whether the artifact file existed when the attempt was made
        pub file_present: bool,
        pub succeeded: bool,
    }

    /// Mock destination for testing
    #[derive(Clone, Default)]
    pub struct MockDestination {
        deliveries: Arc<Mutex<Vec<Delivery>>>,
        failing_sources: Arc<Mutex<Vec<Integration>>>,
    }

    impl MockDestination {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail deliveries of artifacts captured from `source`
        pub fn failing_for(self, source: Integration) -> Self {
            self.failing_sources.lock().unwrap().push(source);
            self
        }

        pub fn deliveries(&self) -> Vec<Delivery> {
            self.deliveries.lock().unwrap().clone()
        }

        pub fn delivery_count(&self) -> usize {
            self.deliveries.lock().unwrap().len()
        }
    }

    impl Destination for MockDestination {
        fn name(&self) -> &str {
            "mock"
        }

        fn deliver(&self, artifact: &Artifact) -> Result<(), DispatchError> {
            let fail = self.failing_sources.lock().unwrap().contains(&artifact.source);

            self.deliveries.lock().unwrap().push(Delivery {
                source: artifact.source,
                file_name: artifact.file_name(),
                file_present: artifact.path.exists(),
                succeeded: !fail,
            });

            if fail {
                Err(DispatchError::Transport(format!(
                    "simulated failure for {}",
                    artifact.file_name()
                )))
            } else {
                Ok(())
            }
        }
    }
}
