//! Test utilities for backup-app
//!
//! This crate provides shared test utilities, mock implementations,
//! and helper functions for testing the backup-app binary and library.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{ConfigBuilder, MockDestination, MockExecutor, TestContext};
//!
//! #[test]
//! fn my_test() {
//!     let ctx = TestContext::new();
//!     let config = ConfigBuilder::folder(ctx.create_subdir("data"))
//!         .local(ctx.create_subdir("backups"))
//!         .build();
//!     // ... test code
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod prompter;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::ConfigBuilder;
pub use fixtures::*;
pub use prompter::ScriptedPrompter;
pub use test_context::{ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use backup_app::capture::Artifact;
pub use backup_app::config::{BackupConfiguration, Integration, StorageSettings};

// Re-export mock implementations from the main crate
pub use backup_app::destinations::mock::{Delivery, MockDestination};
pub use backup_app::destinations::Destination;
pub use backup_app::utils::executor::mock::{MockExecutor, MockResponse};
pub use backup_app::utils::executor::CommandExecutor;

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
