//! End-to-end runs of the step against a scripted command runner.
//!
//! The runner records every invocation and answers from a queue, so each
//! test can assert exactly which subprocesses would have been launched.
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use nunit_step_core::api::{
    CapturedOutput, CommandRunner, ExecutionResult, Invocation, OutputExporter, Reporter,
    RunInputs, RunnerError, Stage, StepConfig, StepContext, Verdict,
};
use nunit_step_core::engine::run_step;
use nunit_step_core::export::{FULL_RESULTS_KEY, RESULT_KEY};

#[derive(Default)]
struct ScriptedRunner {
    responses: Mutex<VecDeque<Result<ExecutionResult, RunnerError>>>,
    calls: Mutex<Vec<Invocation>>,
    /// Written to the `--result=` path, the way nunit3-console would.
    result_xml: Option<String>,
}

impl ScriptedRunner {
    fn answering(responses: Vec<Result<ExecutionResult, RunnerError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        })
    }

    fn writing_result(
        responses: Vec<Result<ExecutionResult, RunnerError>>,
        xml: &str,
    ) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            result_xml: Some(xml.to_string()),
            ..Default::default()
        })
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, RunnerError> {
        self.calls.lock().unwrap().push(invocation.clone());
        if let Some(xml) = &self.result_xml {
            let result_path = invocation.args.iter().find_map(|a| a.strip_prefix("--result="));
            if let Some(path) = result_path {
                std::fs::write(path, xml).unwrap();
            }
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(exited(0, "")))
    }
}

#[derive(Default)]
struct RecordingExporter {
    exported: Mutex<Vec<(String, String)>>,
}

impl RecordingExporter {
    fn exported(&self) -> Vec<(String, String)> {
        self.exported.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutputExporter for RecordingExporter {
    async fn export(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.exported
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }
}

fn exited(code: i32, stdout: &str) -> ExecutionResult {
    ExecutionResult {
        exit_code: code,
        output: CapturedOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
        },
        duration_ms: 5,
    }
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// App.sln with one library and one NUnit project; returns the solution path.
fn solution(root: &Path) -> PathBuf {
    let sln = root.join("App.sln");
    write(
        &sln,
        concat!(
            "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"App\", \"App\\App.csproj\", \"{00000000-0000-0000-0000-000000000001}\"\n",
            "EndProject\n",
            "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"App.Tests\", \"App.Tests\\App.Tests.csproj\", \"{00000000-0000-0000-0000-000000000002}\"\n",
            "EndProject\n",
        ),
    );
    write(&root.join("App/App.csproj"), "<Project />");
    write(
        &root.join("App.Tests/App.Tests.csproj"),
        r#"<Project><ItemGroup><PackageReference Include="NUnit" Version="3.13.3" /></ItemGroup></Project>"#,
    );
    sln
}

fn release_assembly(root: &Path) -> PathBuf {
    let dll = root.join("App.Tests/bin/Release/App.Tests.dll");
    write(&dll, "");
    dll
}

fn inputs(sln: &Path) -> RunInputs {
    RunInputs {
        solution: Some(sln.to_path_buf()),
        configuration: Some("Release".into()),
        platform: Some("AnyCPU".into()),
        ..Default::default()
    }
}

struct Harness {
    runner: Arc<ScriptedRunner>,
    exporter: Arc<RecordingExporter>,
    ctx: StepContext,
}

fn harness(responses: Vec<Result<ExecutionResult, RunnerError>>) -> Harness {
    harness_with(ScriptedRunner::answering(responses))
}

fn harness_with(runner: Arc<ScriptedRunner>) -> Harness {
    let exporter = Arc::new(RecordingExporter::default());
    let ctx = StepContext::new(
        StepConfig::default(),
        runner.clone(),
        exporter.clone(),
        Reporter::new(false),
    );
    Harness {
        runner,
        exporter,
        ctx,
    }
}

async fn run(h: &Harness, inputs: RunInputs) -> (Verdict, String) {
    let mut console: Vec<u8> = Vec::new();
    let verdict = run_step(&h.ctx, inputs, &mut console).await;
    (verdict, String::from_utf8(console).unwrap())
}

#[tokio::test]
async fn scenario_a_build_and_tests_pass() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution(dir.path());
    let dll = release_assembly(dir.path());
    let h = harness(vec![Ok(exited(0, "Build succeeded.")), Ok(exited(0, "Tests run: 4"))]);

    let (verdict, console) = run(&h, inputs(&sln)).await;

    assert_eq!(verdict, Verdict::Success);
    assert_eq!(verdict.exit_code(), 0);
    assert!(console.contains("========== Configs =========="));
    assert!(!console.contains("failed"));

    let calls = h.runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].program, "msbuild");
    assert_eq!(
        calls[0].args,
        vec![
            sln.display().to_string(),
            "/t:Build".to_string(),
            "/p:Configuration=Release".to_string(),
            "/p:Platform=AnyCPU".to_string(),
        ]
    );
    assert_eq!(calls[1].program, "nunit3-console");
    assert_eq!(calls[1].args, vec![dll.display().to_string()]);
    assert_eq!(calls[1].trailing, None);

    assert_eq!(
        h.exporter.exported(),
        vec![(RESULT_KEY.to_string(), "succeeded".to_string())]
    );
}

#[tokio::test]
async fn scenario_b_missing_solution_launches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Missing.sln");
    let h = harness(vec![]);

    let (verdict, console) = run(&h, inputs(&missing)).await;

    assert_eq!(verdict.exit_code(), 1);
    assert!(matches!(verdict, Verdict::Failure { stage: Stage::Validating, .. }));
    assert!(console.contains(&missing.display().to_string()));
    assert!(console.contains("no solution file found at path"));
    assert!(h.runner.calls().is_empty());
    assert_eq!(
        h.exporter.exported(),
        vec![(RESULT_KEY.to_string(), "failed".to_string())]
    );
}

#[tokio::test]
async fn scenario_c_failing_tests_report_runner_output() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution(dir.path());
    release_assembly(dir.path());
    let runner_stdout = "Errors, Failures and Warnings\n1) Failed : App.Tests.MathTests.Adds\n  Expected: 4\n  But was:  5\nTests run: 4, Passed: 3, Failed: 1";
    let h = harness(vec![Ok(exited(0, "")), Ok(exited(1, runner_stdout))]);

    let (verdict, console) = run(&h, inputs(&sln)).await;

    assert_eq!(verdict.exit_code(), 1);
    assert!(matches!(verdict, Verdict::Failure { stage: Stage::Testing, .. }));
    assert!(console.contains("nunit test failed: exit code 1"));
    assert!(console.contains("1) Failed : App.Tests.MathTests.Adds"));
    assert!(console.contains("Tests run: 4, Passed: 3, Failed: 1"));
}

#[tokio::test]
async fn empty_configuration_or_platform_launch_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution(dir.path());

    for (configuration, platform) in [("", "AnyCPU"), ("Release", ""), ("Release", "  ")] {
        let h = harness(vec![]);
        let mut inputs = inputs(&sln);
        inputs.configuration = Some(configuration.into());
        inputs.platform = Some(platform.into());

        let (verdict, _) = run(&h, inputs).await;
        assert!(matches!(verdict, Verdict::Failure { stage: Stage::Validating, .. }));
        assert!(h.runner.calls().is_empty());
    }
}

#[tokio::test]
async fn build_failure_short_circuits_tests() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution(dir.path());
    release_assembly(dir.path());
    let h = harness(vec![Ok(exited(1, "error CS1002: ; expected"))]);

    let (verdict, console) = run(&h, inputs(&sln)).await;

    assert!(matches!(verdict, Verdict::Failure { stage: Stage::Building, .. }));
    assert_eq!(h.runner.calls().len(), 1);
    assert!(console.contains("build failed: exit code 1"));
    assert!(console.contains("error CS1002"));
}

#[tokio::test]
async fn build_launch_fault_is_a_build_failure() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution(dir.path());
    let h = harness(vec![Err(RunnerError::Spawn {
        program: "msbuild".into(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    })]);

    let (verdict, _) = run(&h, inputs(&sln)).await;

    assert!(matches!(verdict, Verdict::Failure { stage: Stage::Building, .. }));
    assert_eq!(h.runner.calls().len(), 1);
}

#[tokio::test]
async fn missing_assembly_never_invokes_runner() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution(dir.path());
    // built for Debug, asked for Release
    write(&dir.path().join("App.Tests/bin/Debug/App.Tests.dll"), "");
    let h = harness(vec![Ok(exited(0, ""))]);

    let (verdict, console) = run(&h, inputs(&sln)).await;

    assert!(matches!(verdict, Verdict::Failure { stage: Stage::Locating, .. }));
    assert_eq!(h.runner.calls().len(), 1, "only the build may run");
    assert!(console.contains("App.Tests/bin/Release/App.Tests.dll") || console.contains("App.Tests\\bin\\Release\\App.Tests.dll"));
}

#[tokio::test]
async fn skip_build_runs_only_the_test_runner() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution(dir.path());
    release_assembly(dir.path());
    let h = harness(vec![Ok(exited(0, ""))]);
    let mut inputs = inputs(&sln);
    inputs.skip_build = true;

    let (verdict, _) = run(&h, inputs).await;

    assert_eq!(verdict, Verdict::Success);
    let calls = h.runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "nunit3-console");
}

#[tokio::test]
async fn extra_options_reach_the_runner_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution(dir.path());
    release_assembly(dir.path());
    let h = harness(vec![Ok(exited(0, "")), Ok(exited(0, ""))]);
    let options = r#"--where "cat == Smoke && method =~ /Login/" --workers=1"#;
    let mut inputs = inputs(&sln);
    inputs.options = Some(options.into());

    run(&h, inputs).await;

    let calls = h.runner.calls();
    assert_eq!(calls[1].trailing.as_deref(), Some(options));
    assert!(calls[1].command_line().contains(options));
}

#[tokio::test]
async fn runner_fault_is_a_test_execution_failure() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution(dir.path());
    release_assembly(dir.path());
    let h = harness(vec![
        Ok(exited(0, "")),
        Err(RunnerError::Timeout {
            program: "nunit3-console".into(),
            secs: 60,
        }),
    ]);

    let (verdict, console) = run(&h, inputs(&sln)).await;

    assert!(matches!(verdict, Verdict::Failure { stage: Stage::Testing, .. }));
    assert!(console.contains("process timed out after 60s"));
}

#[tokio::test]
async fn deploy_dir_adds_result_file_and_exports_it() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution(dir.path());
    release_assembly(dir.path());
    let deploy = dir.path().join("deploy");
    std::fs::create_dir_all(&deploy).unwrap();

    let h = harness_with(ScriptedRunner::writing_result(
        vec![Ok(exited(0, "")), Ok(exited(0, ""))],
        "<test-run result=\"Passed\" />",
    ));
    let mut inputs = inputs(&sln);
    inputs.deploy_dir = Some(deploy.clone());

    let (verdict, _) = run(&h, inputs).await;

    assert_eq!(verdict, Verdict::Success);
    let calls = h.runner.calls();
    assert_eq!(
        calls[1].args.last().unwrap(),
        &format!("--result={}", deploy.join("TestResult.xml").display())
    );
    assert_eq!(
        h.exporter.exported(),
        vec![
            (RESULT_KEY.to_string(), "succeeded".to_string()),
            (
                FULL_RESULTS_KEY.to_string(),
                "<test-run result=\"Passed\" />".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn old_result_file_is_not_published_after_build_failure() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution(dir.path());
    release_assembly(dir.path());
    let deploy = dir.path().join("deploy");
    let old_result = deploy.join("TestResult.xml");
    write(&old_result, "<test-run result=\"Passed\" /> from an earlier run");

    let h = harness(vec![Ok(exited(1, "error MSB1009: Project file does not exist."))]);
    let mut inputs = inputs(&sln);
    inputs.deploy_dir = Some(deploy);

    let (verdict, _) = run(&h, inputs).await;

    assert!(matches!(verdict, Verdict::Failure { stage: Stage::Building, .. }));
    assert!(!old_result.exists());
    assert_eq!(
        h.exporter.exported(),
        vec![(RESULT_KEY.to_string(), "failed".to_string())]
    );
}
