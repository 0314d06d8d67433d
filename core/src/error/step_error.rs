use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::{ConfigError, RunnerError};
use crate::runner::CapturedOutput;

/// Pipeline position, used for logging transitions and naming the failing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Building,
    Locating,
    Testing,
    Reporting,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Validating => "validate",
            Stage::Building => "build",
            Stage::Locating => "locate",
            Stage::Testing => "test",
            Stage::Reporting => "report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subprocess that either exited non-zero or never produced an exit code.
#[derive(Debug)]
pub struct ProcessFailure {
    pub command_line: String,
    pub exit_code: Option<i32>,
    pub fault: Option<RunnerError>,
    pub output: CapturedOutput,
}

impl ProcessFailure {
    pub fn exited(command_line: String, exit_code: i32, output: CapturedOutput) -> Self {
        Self {
            command_line,
            exit_code: Some(exit_code),
            fault: None,
            output,
        }
    }

    pub fn faulted(command_line: String, fault: RunnerError) -> Self {
        Self {
            command_line,
            exit_code: None,
            fault: Some(fault),
            output: CapturedOutput::default(),
        }
    }
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.fault, self.exit_code) {
            (Some(fault), _) => write!(f, "{fault}"),
            // sh reports unknown programs with 127
            (None, Some(127)) if cfg!(unix) => write!(f, "command not found (exit code 127)"),
            (None, Some(code)) => write!(f, "exit code {code}"),
            (None, None) => f.write_str("no exit code"),
        }
    }
}

impl std::error::Error for ProcessFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.fault
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("issue with input: {0}")]
    Config(#[from] ConfigError),

    #[error("build failed: {0}")]
    Build(#[source] ProcessFailure),

    #[error("no test assembly found for {}: {}", .solution.display(), describe_expected(.expected))]
    AssemblyNotFound {
        solution: PathBuf,
        expected: Vec<PathBuf>,
    },

    #[error("nunit test failed: {0}")]
    TestExecution(#[source] ProcessFailure),
}

impl StepError {
    pub fn stage(&self) -> Stage {
        match self {
            StepError::Config(_) => Stage::Validating,
            StepError::Build(_) => Stage::Building,
            StepError::AssemblyNotFound { .. } => Stage::Locating,
            StepError::TestExecution(_) => Stage::Testing,
        }
    }

    pub fn captured_output(&self) -> Option<&CapturedOutput> {
        match self {
            StepError::Build(failure) | StepError::TestExecution(failure) => Some(&failure.output),
            _ => None,
        }
    }
}

fn describe_expected(expected: &[PathBuf]) -> String {
    if expected.is_empty() {
        return "no NUnit test project in solution".to_string();
    }
    let paths: Vec<String> = expected.iter().map(|p| p.display().to_string()).collect();
    format!("expected {}", paths.join(", "))
}
