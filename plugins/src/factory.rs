use std::sync::Arc;
use std::time::Duration;

use nunit_step_core::config::StepConfig;
use nunit_step_core::engine::StepContext;
use nunit_step_core::export::{NoopExporter, OutputExporter};
use nunit_step_core::report::Reporter;
use nunit_step_core::runner::CommandRunner;

use crate::export::EnvmanExporter;
use crate::process::ProcessRunner;

pub fn build_runner(cfg: &StepConfig) -> Arc<dyn CommandRunner> {
    let timeout = cfg.run.timeout_secs.map(Duration::from_secs);
    Arc::new(ProcessRunner::new(cfg.run.capture_bytes).with_timeout(timeout))
}

/// `envman` when enabled and installed, otherwise a no-op.
pub fn build_exporter(cfg: &StepConfig) -> Arc<dyn OutputExporter> {
    if !cfg.export.enabled {
        tracing::debug!("output export disabled by config");
        return Arc::new(NoopExporter);
    }
    match which::which(&cfg.export.tool) {
        Ok(path) => {
            tracing::debug!(tool = %path.display(), "exporting outputs");
            Arc::new(EnvmanExporter::new(path))
        }
        Err(e) => {
            tracing::info!(tool = %cfg.export.tool, error = %e, "export tool not found, outputs will not be exported");
            Arc::new(NoopExporter)
        }
    }
}

pub fn build_context(cfg: StepConfig, reporter: Reporter) -> StepContext {
    let runner = build_runner(&cfg);
    let exporter = build_exporter(&cfg);
    StepContext::new(cfg, runner, exporter, reporter)
}
