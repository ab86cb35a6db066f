//! Configuration module for backup-app
//!
//! A single JSON record describes which sources to capture, how often, and
//! where the artifacts go. It lives at `~/.backup_app/config.json`, is written
//! by the configuration wizard and read once per `--backup` run.
//!
//! ## Example Usage
//!
//! ```no_run
//! use backup_app::config;
//!
//! let path = config::default_config_path()?;
//! let config = config::load_config(&path)?;
//!
//! for source in config.capture_order() {
//!     println!("Source: {}, destination: {}", source, config.storage.kind());
//! }
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{
    app_dir, default_config_path, load_config, save_config, validate_config, ConfigError, Result,
    APP_DIR, CONFIG_FILE,
};
pub use types::*;

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
