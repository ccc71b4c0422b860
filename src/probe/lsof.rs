//! lsof-backed socket inspector.

use anyhow::{Context, Result};
use tracing::debug;

use super::SocketUsageSource;
use crate::cmd_abstraction::{CommandExecutor, RealCommandExecutor};
use crate::error::PortsweepError;

/// Runs `lsof -nP -i:<port>`.
///
/// `-n` and `-P` keep addresses and ports numeric; without `-P` lsof prints
/// `*:ssh` instead of `*:22` and the port never shows up in the report.
pub struct LsofProbe<E: CommandExecutor = RealCommandExecutor> {
    executor: E,
    lsof_path: String,
}

impl LsofProbe<RealCommandExecutor> {
    pub fn new(lsof_path: impl Into<String>) -> Self {
        Self::with_executor(RealCommandExecutor::new(), lsof_path)
    }
}

impl<E: CommandExecutor> LsofProbe<E> {
    pub fn with_executor(executor: E, lsof_path: impl Into<String>) -> Self {
        Self {
            executor,
            lsof_path: lsof_path.into(),
        }
    }
}

impl<E: CommandExecutor> SocketUsageSource for LsofProbe<E> {
    fn socket_users(&self, port: u16) -> Result<String> {
        let args = vec!["-nP".to_string(), format!("-i:{}", port)];
        debug!("Running {} {}", self.lsof_path, args.join(" "));
        let output = self.executor.execute(&self.lsof_path, &args)?;

        if output.success {
            return Ok(output.stdout);
        }
        // lsof exits 1 without output when no socket matches.
        if output.code == Some(1) && output.stdout.trim().is_empty() {
            return Ok(String::new());
        }
        Err(PortsweepError::Probe(format!(
            "{} -i:{} failed: {}",
            self.lsof_path,
            port,
            output.error_summary()
        ))
        .into())
    }

    fn preflight(&self) -> Result<()> {
        self.executor
            .execute(&self.lsof_path, &["-v".to_string()])
            .with_context(|| format!("lsof is not usable (tried '{}')", self.lsof_path))?;
        Ok(())
    }
}
