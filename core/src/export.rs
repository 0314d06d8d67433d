use std::path::Path;

use async_trait::async_trait;

pub const RESULT_KEY: &str = "BITRISE_XAMARIN_TEST_RESULT";
pub const FULL_RESULTS_KEY: &str = "BITRISE_XAMARIN_TEST_FULL_RESULTS_TEXT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResultStatus {
    Succeeded,
    Failed,
}

impl TestResultStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestResultStatus::Succeeded => "succeeded",
            TestResultStatus::Failed => "failed",
        }
    }
}

/// Values published for later steps of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutputs {
    pub result: TestResultStatus,
    pub full_results: Option<String>,
}

impl StepOutputs {
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = vec![(RESULT_KEY, self.result.as_str())];
        if let Some(text) = self.full_results.as_deref().filter(|t| !t.is_empty()) {
            entries.push((FULL_RESULTS_KEY, text));
        }
        entries
    }
}

/// Publishes a key/value pair to the surrounding CI environment.
#[async_trait]
pub trait OutputExporter: Send + Sync {
    async fn export(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Used when exporting is disabled or no export tool is installed.
pub struct NoopExporter;

#[async_trait]
impl OutputExporter for NoopExporter {
    async fn export(&self, key: &str, _value: &str) -> anyhow::Result<()> {
        tracing::debug!(key, "output export disabled, dropping value");
        Ok(())
    }
}

/// Reads the runner's result file. Absence is logged, not an error.
pub fn read_result_log(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read test result");
            None
        }
    }
}

pub async fn export_outputs(exporter: &dyn OutputExporter, outputs: &StepOutputs) {
    for (key, value) in outputs.entries() {
        if let Err(e) = exporter.export(key, value).await {
            tracing::warn!(key, error = %e, "failed to export environment");
        }
    }
}
