#![deny(missing_docs)]

//! # Spec Generator
//!
//! Runs the `spec_generator` commands of the linter config so the schema is
//! regenerated before it is linted.
//!
//! Commands run through `sh -c`, so pipes and redirections work as typed.

use crate::error::{CliError, CliResult};
use std::process::{Command, Output};

/// Interface for executing external commands.
///
/// Abstracted to allow mocking command execution in tests.
pub trait CommandExecutor {
    /// Executes the command and returns the output.
    fn execute(&self, program: &str, args: &[&str]) -> CliResult<Output>;
}

/// Standard executor using `std::process::Command`.
pub struct ShellExecutor;

impl CommandExecutor for ShellExecutor {
    fn execute(&self, program: &str, args: &[&str]) -> CliResult<Output> {
        let output = Command::new(program).args(args).output()?;
        Ok(output)
    }
}

/// Runs each schema generation command in order, stopping at the first failure.
///
/// # Arguments
///
/// * `commands` - Shell command lines from the config file.
/// * `executor` - The command runner (use `ShellExecutor` for real execution).
pub fn run_spec_generators<E: CommandExecutor>(commands: &[String], executor: &E) -> CliResult<()> {
    for command in commands {
        log::info!("Regenerating schema: {}", command);
        let output = executor.execute("sh", &["-c", command])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CliError::General(format!(
                "Spec generator '{}' failed with status {}: {}",
                command,
                output.status,
                stderr.trim()
            )));
        }
        log::debug!("{}", String::from_utf8_lossy(&output.stdout).trim());
    }
    Ok(())
}
