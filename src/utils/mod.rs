pub mod command;
pub mod cron;

// Trait-based abstraction for testability
pub mod executor;

// Re-export commonly used types and traits (used by test crate)
pub use command::CommandError;
pub use executor::{CommandExecutor, RealExecutor};
