use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ProcessFailure, StepError};
use crate::runner::{program_stem_lower, CommandRunner, ExecutionResult, Invocation};

/// Solution + configuration + platform handed to the build tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    solution: PathBuf,
    configuration: String,
    platform: String,
}

impl BuildTarget {
    pub fn new(solution: PathBuf, configuration: String, platform: String) -> Self {
        Self {
            solution,
            configuration,
            platform,
        }
    }

    pub fn solution(&self) -> &Path {
        &self.solution
    }

    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildToolKind {
    /// `msbuild`, `xbuild` and anything unrecognized.
    MsBuild,
    DotNet,
}

impl BuildToolKind {
    pub fn detect(program: &str) -> Self {
        if program_stem_lower(program) == "dotnet" {
            BuildToolKind::DotNet
        } else {
            BuildToolKind::MsBuild
        }
    }
}

pub fn build_invocation(tool: &str, target: &BuildTarget) -> Invocation {
    let solution = target.solution().display().to_string();
    match BuildToolKind::detect(tool) {
        BuildToolKind::MsBuild => Invocation::new(tool).args([
            solution,
            "/t:Build".to_string(),
            format!("/p:Configuration={}", target.configuration()),
            format!("/p:Platform={}", target.platform()),
        ]),
        BuildToolKind::DotNet => Invocation::new(tool).args([
            "build".to_string(),
            solution,
            "--configuration".to_string(),
            target.configuration().to_string(),
            format!("-p:Platform={}", target.platform()),
        ]),
    }
}

/// Builds the solution; any non-zero exit or launch fault is a `StepError::Build`.
pub async fn run_build(
    runner: &dyn CommandRunner,
    tool: &str,
    target: &BuildTarget,
    out: &mut (dyn Write + Send),
) -> Result<ExecutionResult, StepError> {
    let invocation = build_invocation(tool, target);
    let command_line = invocation.command_line();

    if let Err(e) = announce(out, target.solution(), &command_line) {
        tracing::warn!(error = %e, "failed to print build command");
    }

    let result = runner
        .run(&invocation)
        .await
        .map_err(|fault| StepError::Build(ProcessFailure::faulted(command_line.clone(), fault)))?;

    tracing::info!(
        exit_code = result.exit_code,
        duration_ms = result.duration_ms,
        "build finished"
    );

    if !result.success() {
        return Err(StepError::Build(ProcessFailure::exited(
            command_line,
            result.exit_code,
            result.output,
        )));
    }
    Ok(result)
}

fn announce(out: &mut (dyn Write + Send), solution: &Path, command_line: &str) -> std::io::Result<()> {
    writeln!(out, "Building solution: {}", solution.display())?;
    writeln!(out, "$ {command_line}")?;
    out.flush()
}
