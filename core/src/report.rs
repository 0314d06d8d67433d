use std::io::Write;

use crossterm::style::Stylize;

use crate::error::{Stage, StepError};
use crate::runner::ExecutionResult;

/// Lines of captured output repeated under a failure message.
const OUTPUT_TAIL_LINES: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure { stage: Stage, reason: String },
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success)
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Verdict::Success => 0,
            Verdict::Failure { .. } => 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Colours only when stdout is a terminal.
    pub fn for_stdout() -> Self {
        Self::new(atty::is(atty::Stream::Stdout))
    }

    /// Turns the pipeline outcome into a verdict, printing the failure if any.
    /// Success prints nothing; the runner already wrote its own summary.
    pub fn report(
        &self,
        outcome: &Result<ExecutionResult, StepError>,
        out: &mut dyn Write,
    ) -> Verdict {
        let err = match outcome {
            Ok(_) => return Verdict::Success,
            Err(err) => err,
        };

        let verdict = Verdict::Failure {
            stage: err.stage(),
            reason: err.to_string(),
        };
        if let Err(e) = self.print_failure(err, out) {
            tracing::warn!(error = %e, "failed to print failure message");
        }
        verdict
    }

    fn print_failure(&self, err: &StepError, out: &mut dyn Write) -> std::io::Result<()> {
        let line = failure_line(err);
        writeln!(out)?;
        if self.color {
            writeln!(out, "{}", line.red().bold())?;
        } else {
            writeln!(out, "{line}")?;
        }
        if let Some(output) = err.captured_output().filter(|o| !o.is_empty()) {
            writeln!(out, "--- captured output (last {OUTPUT_TAIL_LINES} lines) ---")?;
            for l in output.tail(OUTPUT_TAIL_LINES) {
                writeln!(out, "{l}")?;
            }
        }
        out.flush()
    }
}

/// Single-line failure summary: `[<stage>] <cause>`.
pub fn failure_line(err: &StepError) -> String {
    format!("[{}] {}", err.stage(), err)
}
