use std::path::PathBuf;

use clap::Parser;
use nunit_step_core::api::{parse_bool, RunInputs};

/// Build a solution and run its NUnit test projects.
///
/// Every input can also come from the environment variable the CI step
/// definition exports, so the step runs without any flags.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Args {
    /// Path to the .sln file.
    #[arg(short = 's', long, env = "xamarin_solution")]
    pub solution: Option<PathBuf>,

    /// Build configuration, e.g. Release.
    #[arg(short = 'c', long, env = "xamarin_configuration")]
    pub configuration: Option<String>,

    /// Build platform, e.g. AnyCPU or iPhoneSimulator.
    #[arg(short = 'l', long, env = "xamarin_platform")]
    pub platform: Option<String>,

    /// Extra test runner options, appended verbatim.
    #[arg(short = 'o', long, env = "nunit_options", allow_hyphen_values = true)]
    pub options: Option<String>,

    /// Directory receiving the NUnit result file.
    #[arg(long, env = "BITRISE_DEPLOY_DIR")]
    pub deploy_dir: Option<PathBuf>,

    /// Skip the build and test already-built assemblies.
    #[arg(
        long,
        env = "skip_build",
        action = clap::ArgAction::Set,
        value_parser = parse_bool,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub skip_build: bool,

    /// Step config file (TOML). Defaults to ./nunit-step.toml when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn to_inputs(&self) -> RunInputs {
        RunInputs {
            solution: self.solution.clone(),
            configuration: self.configuration.clone(),
            platform: self.platform.clone(),
            options: self.options.clone(),
            deploy_dir: self.deploy_dir.clone(),
            skip_build: self.skip_build,
        }
    }
}
