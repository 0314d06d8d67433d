pub mod exit;
mod traits;
mod types;

pub use traits::CommandRunner;
pub use types::{CapturedOutput, ExecutionResult, Invocation};

/// Lowercased file stem of a program path, e.g. `C:\Tools\MSBuild.exe` -> `msbuild`.
pub fn program_stem_lower(program: &str) -> String {
    let normalized = program.replace('\\', "/");
    let p = std::path::Path::new(&normalized);
    let s = p.file_stem().and_then(|x| x.to_str()).unwrap_or(program);
    s.to_ascii_lowercase()
}
