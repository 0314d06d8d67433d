mod tee;

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

use nunit_step_core::error::RunnerError;
use nunit_step_core::runner::exit::exit_code_of;
use nunit_step_core::runner::{CapturedOutput, CommandRunner, ExecutionResult, Invocation};

pub use tee::{pump, TailBuffer};

/// Runs invocations through the platform shell, streaming output live to the
/// console while keeping a bounded tail of each stream.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    capture_bytes: usize,
    timeout: Option<Duration>,
    echo: bool,
}

impl ProcessRunner {
    pub fn new(capture_bytes: usize) -> Self {
        Self {
            capture_bytes,
            timeout: None,
            echo: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables forwarding child output to this process's stdout/stderr.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }
}

fn shell_command(command_line: &str) -> Command {
    #[cfg(windows)]
    {
        // cmd.exe does its own parsing; arg() would re-escape embedded quotes
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").raw_arg(command_line);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command_line);
        cmd
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, RunnerError> {
        let program = invocation.program.clone();
        let command_line = invocation.command_line();
        tracing::debug!(%program, %command_line, "spawning");

        let started = Instant::now();
        let mut child = shell_command(&command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: program.clone(),
                source,
            })?;

        let missing_pipe = |stream| RunnerError::StreamIo {
            stream,
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe not captured"),
        };
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        let echo = self.echo;
        let run = async {
            let (out, err, status) = tokio::join!(
                pump(stdout, echo.then(tokio::io::stdout), self.capture_bytes, "stdout"),
                pump(stderr, echo.then(tokio::io::stderr), self.capture_bytes, "stderr"),
                child.wait(),
            );
            let status = status.map_err(|source| RunnerError::Wait {
                program: program.clone(),
                source,
            })?;
            Ok::<_, RunnerError>((out?, err?, status))
        };

        let finished = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.ok(),
            None => Some(run.await),
        };
        let Some(finished) = finished else {
            let secs = self.timeout.map(|d| d.as_secs()).unwrap_or_default();
            tracing::warn!(%program, secs, "process timed out, killing");
            if let Err(e) = child.kill().await {
                tracing::warn!(%program, error = %e, "failed to kill timed out process");
            }
            return Err(RunnerError::Timeout { program, secs });
        };
        let (out, err, status) = finished?;

        Ok(ExecutionResult {
            exit_code: exit_code_of(status),
            output: CapturedOutput {
                stdout: out.into_string(),
                stderr: err.into_string(),
            },
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}


#[cfg(all(test, windows))]
mod windows_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn quoted_options_reach_cmd_untouched() {
        let runner = ProcessRunner::new(1024).quiet();
        let inv = Invocation::new("echo").trailing(Some(r#"--where "cat == Unit""#));
        let result = runner.run(&inv).await.unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output.stdout.trim_end(), r#"--where "cat == Unit""#);
    }
}
