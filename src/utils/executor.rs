//! Command execution abstraction for testability
//!
//! Captures and the crontab installer go through [`CommandExecutor`] so tests
//! can swap in [`mock::MockExecutor`] instead of spawning `pg_dump`, `tar` or
//! `crontab`.

use std::path::Path;
use std::process::Output;

use super::command::Result;

/// Abstraction for command execution, enabling mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Run a command and block until it exits
    fn run_command(&self, program: &str, args: &[&str], working_dir: Option<&Path>) -> Result<Output>;

    /// Run a command and return stdout as string
    fn run_command_stdout(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<String>;

    /// Run a command with `input` written to its stdin
    fn run_command_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<Output>;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealExecutor {
    fn run_command(&self, program: &str, args: &[&str], working_dir: Option<&Path>) -> Result<Output> {
        super::command::run_command(program, args, working_dir)
    }

    fn run_command_stdout(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<String> {
        super::command::run_command_stdout(program, args, working_dir)
    }

    fn run_command_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<Output> {
        super::command::run_command_with_input(program, args, input)
    }
}

/// A mock executor for testing that records calls and returns configured responses
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use crate::utils::command::CommandError;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Recorded command invocation
    #[derive(Clone, Debug)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
        pub working_dir: Option<String>,
        pub input: Option<String>,
    }

    /// Response configuration for mock
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        Success { stdout: String, stderr: String },
        Failure { stderr: String, exit_code: i32 },
        NotFound,
    }

    impl Default for MockResponse {
        fn default() -> Self {
            MockResponse::Success {
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    }

    /// Mock executor for testing
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded command invocations
        pub calls: Arc<Mutex<Vec<CommandCall>>>,
        /// Pre-configured responses: program name -> response
        responses: Arc<Mutex<HashMap<String, MockResponse>>>,
        /// Default response when no specific response is configured
        default_response: Arc<Mutex<MockResponse>>,
        /// Whether successful calls write the file named after `-f` / `-czf`
        touch_outputs: Arc<Mutex<bool>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure a response for a specific program
        pub fn expect(self, program: &str, response: MockResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(program.to_string(), response);
            self
        }

        /// Set the default response for unconfigured programs
        pub fn with_default_response(self, response: MockResponse) -> Self {
            *self.default_response.lock().unwrap() = response;
            self
        }

        /// Make successful `pg_dump -f FILE` / `tar -czf FILE` calls create FILE,
        /// the way the real tools would
        pub fn touching_outputs(self) -> Self {
            *self.touch_outputs.lock().unwrap() = true;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<CommandCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Check if a program was called
        pub fn was_called(&self, program: &str) -> bool {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .any(|c| c.program == program)
        }

        /// Get number of calls to a specific program
        pub fn call_count(&self, program: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.program == program)
                .count()
        }

        /// Stdin passed to the most recent stdin-fed call of `program`
        pub fn last_input(&self, program: &str) -> Option<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|c| c.program == program)
                .find_map(|c| c.input.clone())
        }

        fn record_call(
            &self,
            program: &str,
            args: &[&str],
            working_dir: Option<&Path>,
            input: Option<&str>,
        ) {
            self.calls.lock().unwrap().push(CommandCall {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
                working_dir: working_dir.map(|p| p.display().to_string()),
                input: input.map(String::from),
            });
        }

        fn get_response(&self, program: &str) -> MockResponse {
            self.responses
                .lock()
                .unwrap()
                .get(program)
                .cloned()
                .unwrap_or_else(|| self.default_response.lock().unwrap().clone())
        }

        fn touch_output(&self, args: &[&str], working_dir: Option<&Path>) {
            if !*self.touch_outputs.lock().unwrap() {
                return;
            }

            let target = args
                .windows(2)
                .find(|pair| pair[0] == "-f" || pair[0] == "-czf")
                .map(|pair| PathBuf::from(pair[1]));

            if let Some(path) = target {
                let path = match working_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path,
                };
                std::fs::write(&path, b"mock backup payload").unwrap();
            }
        }

        fn execute_response(
            &self,
            program: &str,
            args: &[&str],
            working_dir: Option<&Path>,
        ) -> Result<Output> {
            match self.get_response(program) {
                MockResponse::Success { stdout, stderr } => {
                    self.touch_output(args, working_dir);
                    Ok(Output {
                        status: std::process::ExitStatus::default(),
                        stdout: stdout.into_bytes(),
                        stderr: stderr.into_bytes(),
                    })
                }
                MockResponse::Failure { stderr, exit_code } => Err(CommandError::Failed {
                    program: program.to_string(),
                    code: Some(exit_code),
                    stderr,
                }),
                MockResponse::NotFound => Err(CommandError::NotFound {
                    program: program.to_string(),
                }),
            }
        }
    }

    impl CommandExecutor for MockExecutor {
        fn run_command(
            &self,
            program: &str,
            args: &[&str],
            working_dir: Option<&Path>,
        ) -> Result<Output> {
            self.record_call(program, args, working_dir, None);
            self.execute_response(program, args, working_dir)
        }

        fn run_command_stdout(
            &self,
            program: &str,
            args: &[&str],
            working_dir: Option<&Path>,
        ) -> Result<String> {
            let output = self.run_command(program, args, working_dir)?;
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        }

        fn run_command_with_input(&self, program: &str, args: &[&str], input: &str) -> Result<Output> {
            self.record_call(program, args, None, Some(input));
            self.execute_response(program, args, None)
        }
    }
}
