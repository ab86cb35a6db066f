use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration record, persisted as `~/.backup_app/config.json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackupConfiguration {
    /// Sources to capture on every run
    pub integrations: Vec<Integration>,

    /// PostgreSQL connection string handed to `pg_dump`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres_url: Option<String>,

    /// Folder archived with `tar`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<PathBuf>,

    /// Cron schedule
    pub frequency: String,

    /// Where artifacts are shipped
    #[serde(flatten)]
    pub storage: StorageSettings,
}

impl BackupConfiguration {
    /// Whether `integration` is selected
    pub fn includes(&self, integration: Integration) -> bool {
        self.integrations.contains(&integration)
    }

    /// Selected integrations in capture order, regardless of how they were stored
    pub fn capture_order(&self) -> Vec<Integration> {
        Integration::CAPTURE_ORDER
            .into_iter()
            .filter(|i| self.includes(*i))
            .collect()
    }
}

/// A backup source
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Integration {
    Postgresql,
    Folder,
}

impl Integration {
    /// Fixed order in which sources are captured and dispatched
    pub const CAPTURE_ORDER: [Integration; 2] = [Integration::Postgresql, Integration::Folder];
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integration::Postgresql => write!(f, "PostgreSQL"),
            Integration::Folder => write!(f, "folder"),
        }
    }
}

/// Destination settings; the tag is stored in the `storage` field
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "storage", rename_all = "snake_case")]
pub enum StorageSettings {
    Local {
        local_path: PathBuf,
    },
    Telegram {
        bot_token: String,
        channel_id: i64,
    },
    S3 {
        s3_bucket: String,
        s3_region: String,
        s3_access_key: String,
        s3_secret_key: String,
        /// S3-compatible endpoint override (path-style addressing)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        s3_endpoint: Option<String>,
    },
    GoogleDrive {
        /// Service-account key file
        google_creds: PathBuf,
        google_folder_id: String,
    },
}

impl StorageSettings {
    /// Tag as written to the config file
    pub fn kind(&self) -> &'static str {
        match self {
            StorageSettings::Local { .. } => "local",
            StorageSettings::Telegram { .. } => "telegram",
            StorageSettings::S3 { .. } => "s3",
            StorageSettings::GoogleDrive { .. } => "google_drive",
        }
    }
}
