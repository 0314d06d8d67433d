use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{bail, Context};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use nunit_step_core::export::OutputExporter;
use nunit_step_core::runner::exit::exit_code_of;

/// Exports values with `envman add --key <KEY>`, feeding the value on stdin.
#[derive(Debug, Clone)]
pub struct EnvmanExporter {
    program: PathBuf,
}

impl EnvmanExporter {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

#[async_trait]
impl OutputExporter for EnvmanExporter {
    async fn export(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut child = Command::new(&self.program)
            .args(["add", "--key", key])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(value.as_bytes())
                .await
                .context("failed to write value to envman")?;
            // closing stdin lets envman finish reading
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .context("failed waiting for envman")?;
        if !output.status.success() {
            bail!(
                "envman exited with code {}: {}",
                exit_code_of(output.status),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        tracing::debug!(key, bytes = value.len(), "exported output");
        Ok(())
    }
}
