mod post;
mod run;
mod types;

pub use post::post_run;
pub use run::{run_pipeline, run_step};
pub use types::StepContext;
