//! Backup App Library
//!
//! Captures PostgreSQL databases and folders, ships the artifacts to a single
//! destination and installs the cron job that re-runs it.

pub mod capture;
pub mod config;
pub mod destinations;
pub mod managers;
pub mod utils;

// Re-export commonly used types
pub use capture::{Artifact, CaptureError};
pub use config::{default_config_path, load_config, save_config, BackupConfiguration, ConfigError};
pub use destinations::{build_destination, Destination, DispatchError};
pub use managers::backup::{BackupError, BackupManager, RunReport};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use managers::wizard::{configure, Prompter, TerminalPrompter, Wizard, WizardError};
