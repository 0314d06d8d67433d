use std::path::Path;

use crate::export::{export_outputs, read_result_log, OutputExporter, StepOutputs, TestResultStatus};
use crate::error::Stage;
use crate::report::Verdict;

/// Publishes the verdict and the runner's result file. Never changes the verdict.
pub async fn post_run(exporter: &dyn OutputExporter, verdict: &Verdict, result_file: Option<&Path>) {
    let result = if verdict.is_success() {
        TestResultStatus::Succeeded
    } else {
        TestResultStatus::Failed
    };
    // a run that stopped before the runner started has no results of its own
    let runner_started = match verdict {
        Verdict::Success => true,
        Verdict::Failure { stage, .. } => *stage == Stage::Testing,
    };
    let full_results = result_file
        .filter(|p| runner_started && p.exists())
        .and_then(read_result_log);

    if result_file.is_some() && full_results.is_none() {
        tracing::debug!("no test result file to export");
    }

    export_outputs(exporter, &StepOutputs { result, full_results }).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{FULL_RESULTS_KEY, RESULT_KEY};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    #[async_trait]
    impl OutputExporter for Recorder {
        async fn export(&self, key: &str, _value: &str) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    fn failed_at(stage: Stage) -> Verdict {
        Verdict::Failure {
            stage,
            reason: "boom".into(),
        }
    }

    #[tokio::test]
    async fn result_file_exported_only_once_runner_started() {
        let dir = tempfile::tempdir().unwrap();
        let result = dir.path().join("TestResult.xml");
        std::fs::write(&result, "<test-run />").unwrap();

        let recorder = Recorder::default();
        post_run(&recorder, &failed_at(Stage::Building), Some(&result)).await;
        assert_eq!(*recorder.0.lock().unwrap(), vec![RESULT_KEY]);

        let recorder = Recorder::default();
        post_run(&recorder, &failed_at(Stage::Testing), Some(&result)).await;
        assert_eq!(*recorder.0.lock().unwrap(), vec![RESULT_KEY, FULL_RESULTS_KEY]);

        let recorder = Recorder::default();
        post_run(&recorder, &Verdict::Success, Some(&result)).await;
        assert_eq!(*recorder.0.lock().unwrap(), vec![RESULT_KEY, FULL_RESULTS_KEY]);
    }
}
