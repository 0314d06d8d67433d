use std::io::Write;
use std::path::Path;

use crate::error::{ProcessFailure, StepError};
use crate::locate::TestAssemblyRef;
use crate::runner::{program_stem_lower, CommandRunner, ExecutionResult, Invocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestRunnerKind {
    /// `nunit3-console` and anything unrecognized.
    NUnit3,
    /// NUnit 2.x `nunit-console`.
    NUnit2,
}

impl TestRunnerKind {
    pub fn detect(program: &str) -> Self {
        let exe = program_stem_lower(program);
        if exe.contains("nunit-console") && !exe.contains("nunit3") {
            TestRunnerKind::NUnit2
        } else {
            TestRunnerKind::NUnit3
        }
    }

    pub fn result_arg(self, path: &Path) -> String {
        match self {
            TestRunnerKind::NUnit3 => format!("--result={}", path.display()),
            TestRunnerKind::NUnit2 => format!("-result={}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TestRunRequest<'a> {
    pub runner: &'a str,
    pub assemblies: &'a [TestAssemblyRef],
    pub result_file: Option<&'a Path>,
    pub extra_options: Option<&'a str>,
}

/// One runner invocation for all assemblies; extra options ride along untouched.
pub fn test_invocation(req: &TestRunRequest<'_>) -> Invocation {
    let kind = TestRunnerKind::detect(req.runner);
    let mut invocation = Invocation::new(req.runner)
        .args(req.assemblies.iter().map(|a| a.path.display().to_string()));
    if let Some(result_file) = req.result_file {
        invocation = invocation.arg(kind.result_arg(result_file));
    }
    invocation.trailing(req.extra_options)
}

/// Runs the tests. A failing run and a runner that never started both end up
/// as `StepError::TestExecution`; the captured output tells them apart.
pub async fn run_tests(
    runner: &dyn CommandRunner,
    req: &TestRunRequest<'_>,
    out: &mut (dyn Write + Send),
) -> Result<ExecutionResult, StepError> {
    let invocation = test_invocation(req);
    let command_line = invocation.command_line();

    if let Err(e) = announce(out, req.assemblies, &command_line) {
        tracing::warn!(error = %e, "failed to print test command");
    }

    let result = runner.run(&invocation).await.map_err(|fault| {
        StepError::TestExecution(ProcessFailure::faulted(command_line.clone(), fault))
    })?;

    tracing::info!(
        exit_code = result.exit_code,
        duration_ms = result.duration_ms,
        assemblies = req.assemblies.len(),
        "test run finished"
    );

    if !result.success() {
        return Err(StepError::TestExecution(ProcessFailure::exited(
            command_line,
            result.exit_code,
            result.output,
        )));
    }
    Ok(result)
}

fn announce(
    out: &mut (dyn Write + Send),
    assemblies: &[TestAssemblyRef],
    command_line: &str,
) -> std::io::Result<()> {
    for assembly in assemblies {
        writeln!(out, "Running test project: {}", assembly.project)?;
    }
    writeln!(out, "$ {command_line}")?;
    out.flush()
}
