//! Command execution abstraction for testability.
//!
//! Both external collaborators (ufw and lsof) are reached through
//! [`CommandExecutor`], so the inventory reader and the usage prober can be
//! exercised in unit tests against canned command output.

use anyhow::{Context, Result};
use std::process::{Command, Stdio};

#[cfg(test)]
use mockall::automock;

/// Output from command execution
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// The exit code, if available
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Shorthand for a successful run that printed `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }

    /// Shorthand for a run that exited with `code` and printed `stderr`.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
            code: Some(code),
        }
    }

    /// First non-empty line of stderr, falling back to the exit code.
    pub fn error_summary(&self) -> String {
        self.stderr
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| match self.code {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            })
    }
}

/// Trait for command execution, allowing dependency injection for testing.
///
/// The real implementation spawns processes; tests use `MockCommandExecutor`.
#[cfg_attr(test, automock)]
pub trait CommandExecutor: Send + Sync {
    /// Execute `cmd` with `args` and capture its output.
    ///
    /// An `Err` means the process could not be spawned at all. A process
    /// that runs and exits non-zero is reported through
    /// [`CommandOutput::success`].
    fn execute(&self, cmd: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Real implementation of CommandExecutor that runs actual system commands.
#[derive(Debug, Clone, Default)]
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, cmd: &str, args: &[String]) -> Result<CommandOutput> {
        let output = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("Failed to execute {}", cmd))?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Convert a slice of &str to Vec<String>.
///
/// mockall has trouble with lifetimes in `&[&str]`, so the trait takes
/// `&[String]` instead.
pub fn args_to_strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_to_strings() {
        let args = args_to_strings(&["delete", "allow", "80/tcp"]);
        assert_eq!(args, vec!["delete", "allow", "80/tcp"]);
        assert!(args_to_strings(&[]).is_empty());
    }

    #[test]
    fn test_command_output_default() {
        let output = CommandOutput::default();
        assert!(output.stdout.is_empty());
        assert!(!output.success);
        assert!(output.code.is_none());
    }

    #[test]
    fn test_error_summary_prefers_stderr() {
        let output = CommandOutput::failed(1, "\nERROR: Could not delete non-existent rule\n");
        assert_eq!(output.error_summary(), "ERROR: Could not delete non-existent rule");
    }

    #[test]
    fn test_error_summary_falls_back_to_code() {
        assert_eq!(CommandOutput::failed(2, "").error_summary(), "exit code 2");
        let signalled = CommandOutput {
            code: None,
            ..Default::default()
        };
        assert_eq!(signalled.error_summary(), "terminated by signal");
    }

    #[test]
    fn test_real_command_executor_execute_echo() {
        let executor = RealCommandExecutor::new();
        let output = executor
            .execute("echo", &args_to_strings(&["-n", "hello"]))
            .unwrap();
        assert!(output.success);
        assert_eq!(output.stdout, "hello");
    }

    #[test]
    fn test_real_command_executor_nonzero_exit_is_ok() {
        let executor = RealCommandExecutor::new();
        let output = executor
            .execute("ls", &args_to_strings(&["--invalid-flag"]))
            .unwrap();
        assert!(!output.success);
    }

    #[test]
    fn test_real_command_executor_missing_binary_is_err() {
        let executor = RealCommandExecutor::new();
        let result = executor.execute("/nonexistent/portsweep-test-binary", &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mock_command_executor() {
        let mut mock = MockCommandExecutor::new();
        mock.expect_execute()
            .withf(|cmd, args| cmd == "ufw" && args == ["status".to_string()])
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("Status: inactive\n")));

        let output = mock.execute("ufw", &args_to_strings(&["status"])).unwrap();
        assert_eq!(output.stdout, "Status: inactive\n");
    }
}
