mod config_error;
mod runner_error;
mod step_error;

pub use config_error::ConfigError;
pub use runner_error::RunnerError;
pub use step_error::{ProcessFailure, Stage, StepError};
