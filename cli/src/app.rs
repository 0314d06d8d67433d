use std::io::Write;

use nunit_step_core::api::{load_config, Reporter, StepError};
use nunit_step_core::engine::run_step;
use nunit_step_plugins::factory;

use crate::commands::cli::Args;

/// Runs the step and returns the process exit code.
pub async fn run_app(args: Args) -> anyhow::Result<i32> {
    let reporter = Reporter::for_stdout();
    let mut stdout = std::io::stdout();

    let cfg = match load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            let verdict = reporter.report(&Err(StepError::from(e)), &mut stdout);
            return Ok(verdict.exit_code());
        }
    };
    tracing::debug!(
        build_tool = %cfg.tools.build_tool,
        test_runner = %cfg.tools.test_runner,
        timeout_secs = ?cfg.run.timeout_secs,
        "step config"
    );

    let ctx = factory::build_context(cfg, reporter);
    let verdict = run_step(&ctx, args.to_inputs(), &mut stdout).await;
    stdout.flush()?;

    Ok(verdict.exit_code())
}
