pub use crate::build::{build_invocation, run_build, BuildTarget, BuildToolKind};
pub use crate::config::{load as load_config, StepConfig};
pub use crate::engine::{run_pipeline, run_step, StepContext};
pub use crate::error::{ConfigError, ProcessFailure, RunnerError, Stage, StepError};
pub use crate::export::{NoopExporter, OutputExporter, StepOutputs, TestResultStatus};
pub use crate::inputs::{parse_bool, RunConfig, RunInputs};
pub use crate::locate::{locate_test_assemblies, TestAssemblyRef};
pub use crate::report::{Reporter, Verdict};
pub use crate::runner::{CapturedOutput, CommandRunner, ExecutionResult, Invocation};
pub use crate::testrun::{run_tests, test_invocation, TestRunRequest};
