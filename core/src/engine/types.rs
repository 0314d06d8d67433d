use std::sync::Arc;

use crate::config::StepConfig;
use crate::export::OutputExporter;
use crate::report::Reporter;
use crate::runner::CommandRunner;

/// Everything a step run needs besides its inputs.
#[derive(Clone)]
pub struct StepContext {
    cfg: StepConfig,
    runner: Arc<dyn CommandRunner>,
    exporter: Arc<dyn OutputExporter>,
    reporter: Reporter,
}

impl StepContext {
    pub fn new(
        cfg: StepConfig,
        runner: Arc<dyn CommandRunner>,
        exporter: Arc<dyn OutputExporter>,
        reporter: Reporter,
    ) -> Self {
        Self {
            cfg,
            runner,
            exporter,
            reporter,
        }
    }

    pub fn cfg(&self) -> &StepConfig {
        &self.cfg
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub fn exporter(&self) -> &dyn OutputExporter {
        self.exporter.as_ref()
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }
}
