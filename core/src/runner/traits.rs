use async_trait::async_trait;

use super::types::{ExecutionResult, Invocation};
use crate::error::RunnerError;

/// Executes an external tool and waits for it to exit.
///
/// A non-zero exit is still `Ok`; `Err` means no exit code was obtained
/// (spawn failure, broken pipes, timeout).
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, RunnerError>;
}
