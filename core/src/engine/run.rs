use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::build::run_build;
use crate::error::{Stage, StepError};
use crate::inputs::{RunConfig, RunInputs};
use crate::locate::locate_test_assemblies;
use crate::report::Verdict;
use crate::runner::ExecutionResult;
use crate::testrun::{run_tests, TestRunRequest};

use super::post::post_run;
use super::types::StepContext;

/// Runs the whole step: echo, validate, build, locate, test, report, export.
pub async fn run_step(ctx: &StepContext, inputs: RunInputs, out: &mut (dyn Write + Send)) -> Verdict {
    let started = Instant::now();

    if let Err(e) = inputs.echo(out) {
        tracing::warn!(error = %e, "failed to print configs");
    }

    tracing::info!(stage = %Stage::Validating, "stage start");
    let (outcome, result_file) = match inputs.validate() {
        Ok(config) => {
            let result_file = result_file_path(ctx, &config);
            if let Some(path) = result_file.as_deref() {
                discard_stale_result(path);
            }
            let outcome = run_pipeline(ctx, &config, result_file.as_deref(), out).await;
            (outcome, result_file)
        }
        Err(e) => (Err(StepError::from(e)), None),
    };

    tracing::info!(stage = %Stage::Reporting, "stage start");
    let verdict = ctx.reporter().report(&outcome, out);
    post_run(ctx.exporter(), &verdict, result_file.as_deref()).await;

    tracing::info!(
        success = verdict.is_success(),
        duration_ms = started.elapsed().as_millis() as u64,
        "step finished"
    );
    verdict
}

fn result_file_path(ctx: &StepContext, config: &RunConfig) -> Option<PathBuf> {
    config
        .deploy_dir()
        .map(|dir| dir.join(&ctx.cfg().run.result_file_name))
}

/// Removes a result file left by an earlier run so only this run's runner
/// output can be published.
fn discard_stale_result(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed stale test result"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove stale test result"),
    }
}

/// Build (unless skipped), locate, test. Stops at the first failing stage.
pub async fn run_pipeline(
    ctx: &StepContext,
    config: &RunConfig,
    result_file: Option<&Path>,
    out: &mut (dyn Write + Send),
) -> Result<ExecutionResult, StepError> {
    let target = config.build_target();
    let tools = &ctx.cfg().tools;

    if config.skip_build() {
        tracing::info!(stage = %Stage::Building, "build skipped, using existing artifacts");
    } else {
        tracing::info!(stage = %Stage::Building, tool = %tools.build_tool, "stage start");
        run_build(ctx.runner(), &tools.build_tool, &target, out).await?;
    }

    tracing::info!(stage = %Stage::Locating, "stage start");
    let assemblies = locate_test_assemblies(&target)?;

    tracing::info!(stage = %Stage::Testing, runner = %tools.test_runner, "stage start");
    let request = TestRunRequest {
        runner: &tools.test_runner,
        assemblies: &assemblies,
        result_file,
        extra_options: config.extra_test_options(),
    };
    run_tests(ctx.runner(), &request, out).await
}
