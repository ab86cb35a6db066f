use super::types::*;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine the home directory")]
    HomeDirUnavailable,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Directory holding the config file, relative to the home directory
pub const APP_DIR: &str = ".backup_app";
/// Config file name inside [`APP_DIR`]
pub const CONFIG_FILE: &str = "config.json";

/// `<home>/.backup_app`
pub fn app_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(APP_DIR))
        .ok_or(ConfigError::HomeDirUnavailable)
}

/// `<home>/.backup_app/config.json`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(CONFIG_FILE))
}

/// Load and validate configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BackupConfiguration> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let config: BackupConfiguration = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    debug!("Loaded configuration from {:?}", path);
    Ok(config)
}

/// Write configuration as JSON, replacing any existing file.
///
/// The file holds credentials in clear text, so it is created owner-only (0600).
pub fn save_config<P: AsRef<Path>>(path: P, config: &BackupConfiguration) -> Result<()> {
    let path = path.as_ref();
    let write_error = |source: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let mut contents = serde_json::to_string_pretty(config)
        .map_err(|e| write_error(std::io::Error::new(ErrorKind::InvalidData, e)))?;
    contents.push('\n');

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(write_error)?;
    file.write_all(contents.as_bytes()).map_err(write_error)?;
    file.sync_all().map_err(write_error)?;

    debug!("Saved configuration to {:?}", path);
    Ok(())
}

/// Validate the configuration
///
/// Blank values count as missing.
pub fn validate_config(config: &BackupConfiguration) -> Result<()> {
    if config.integrations.is_empty() {
        return Err(ConfigError::Invalid(
            "No integrations selected".to_string(),
        ));
    }

    if config.includes(Integration::Postgresql) && is_blank(config.postgres_url.as_deref()) {
        return Err(ConfigError::Invalid(
            "PostgreSQL is selected but postgres_url is missing".to_string(),
        ));
    }

    if config.includes(Integration::Folder)
        && is_blank(config.folder_path.as_deref().and_then(Path::to_str))
    {
        return Err(ConfigError::Invalid(
            "Folder backup is selected but folder_path is missing".to_string(),
        ));
    }

    Ok(())
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
