//! ufw backend implementation.

use anyhow::{Context, Result};
use tracing::debug;

use super::FirewallStateSource;
use crate::cmd_abstraction::{args_to_strings, CommandExecutor, RealCommandExecutor};
use crate::error::PortsweepError;
use crate::rule::{Action, Rule};

/// ufw driven through a [`CommandExecutor`].
pub struct UfwBackend<E: CommandExecutor = RealCommandExecutor> {
    executor: E,
    ufw_path: String,
}

impl UfwBackend<RealCommandExecutor> {
    pub fn new(ufw_path: impl Into<String>) -> Self {
        Self::with_executor(RealCommandExecutor::new(), ufw_path)
    }
}

impl<E: CommandExecutor> UfwBackend<E> {
    pub fn with_executor(executor: E, ufw_path: impl Into<String>) -> Self {
        Self {
            executor,
            ufw_path: ufw_path.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        debug!("Running {} {}", self.ufw_path, args.join(" "));
        let output = self
            .executor
            .execute(&self.ufw_path, &args_to_strings(args))?;

        if !output.success {
            return Err(PortsweepError::Firewall(format!(
                "{} {} failed: {}",
                self.ufw_path,
                args.join(" "),
                output.error_summary()
            ))
            .into());
        }
        Ok(output.stdout)
    }
}

impl<E: CommandExecutor> FirewallStateSource for UfwBackend<E> {
    fn status(&self) -> Result<String> {
        self.run(&["status"])
    }

    fn delete_rule(&self, rule: &Rule) -> Result<()> {
        let action = match rule.action {
            Action::Allow => "allow",
            Action::Deny => "deny",
        };
        let spec = rule.firewall_spec();
        self.run(&["delete", action, &spec])
            .with_context(|| format!("Failed to delete rule {}", rule))?;
        Ok(())
    }

    fn preflight(&self) -> Result<()> {
        self.run(&["version"])
            .with_context(|| format!("ufw is not usable (tried '{}')", self.ufw_path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd_abstraction::{CommandOutput, MockCommandExecutor};
    use crate::rule::PortSpec;

    fn rule(spec: &str) -> Rule {
        Rule::new(spec.parse::<PortSpec>().unwrap(), Action::Allow)
    }

    #[test]
    fn test_status_returns_stdout() {
        let mut mock = MockCommandExecutor::new();
        mock.expect_execute()
            .withf(|cmd, args| cmd == "ufw" && args == ["status".to_string()])
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("Status: active\n")));

        let backend = UfwBackend::with_executor(mock, "ufw");
        assert_eq!(backend.status().unwrap(), "Status: active\n");
    }

    #[test]
    fn test_status_nonzero_exit_is_error() {
        let mut mock = MockCommandExecutor::new();
        mock.expect_execute()
            .returning(|_, _| Ok(CommandOutput::failed(1, "ERROR: You need to be root to run this script")));

        let backend = UfwBackend::with_executor(mock, "ufw");
        let err = backend.status().unwrap_err();
        assert!(err.to_string().contains("You need to be root"));
    }

    #[test]
    fn test_delete_uses_explicit_protocol() {
        let mut mock = MockCommandExecutor::new();
        mock.expect_execute()
            .withf(|cmd, args| {
                cmd == "/usr/sbin/ufw" && args == args_to_strings(&["delete", "allow", "9443/tcp"])
            })
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("Rule deleted\n")));

        let backend = UfwBackend::with_executor(mock, "/usr/sbin/ufw");
        backend.delete_rule(&rule("9443/tcp")).unwrap();
    }

    #[test]
    fn test_delete_bare_rule_uses_bare_port() {
        let mut mock = MockCommandExecutor::new();
        mock.expect_execute()
            .withf(|_, args| args == args_to_strings(&["delete", "allow", "80"]))
            .times(1)
            .returning(|_, _| Ok(CommandOutput::ok("Rule deleted\nRule deleted (v6)\n")));

        let backend = UfwBackend::with_executor(mock, "ufw");
        backend.delete_rule(&rule("80")).unwrap();
    }

    #[test]
    fn test_delete_failure_names_rule() {
        let mut mock = MockCommandExecutor::new();
        mock.expect_execute()
            .returning(|_, _| Ok(CommandOutput::failed(1, "Could not delete non-existent rule")));

        let backend = UfwBackend::with_executor(mock, "ufw");
        let err = backend.delete_rule(&rule("8000/udp")).unwrap_err();
        assert!(format!("{:#}", err).contains("8000/udp"));
    }

    #[test]
    fn test_preflight_missing_binary() {
        let mut mock = MockCommandExecutor::new();
        mock.expect_execute()
            .returning(|_, _| Err(anyhow::anyhow!("No such file or directory")));

        let backend = UfwBackend::with_executor(mock, "ufw");
        assert!(backend.preflight().is_err());
    }
}
