//! Where the build tool drops a project's output.
//!
//! An explicit `<OutputPath>` wins. Without one, MSBuild writes `AnyCPU`
//! builds to `bin/<Configuration>/` and every other platform to
//! `bin/<Platform>/<Configuration>/`. SDK-style projects add a
//! `<TargetFramework>` folder below either.

use std::path::{Component, Path, PathBuf};

use super::project::ProjectInfo;

/// `AnyCPU`, `Any CPU`, `anycpu`, ...
pub fn is_any_cpu(platform: &str) -> bool {
    let compact: String = platform.chars().filter(|c| !c.is_whitespace()).collect();
    compact.eq_ignore_ascii_case("anycpu")
}

pub fn output_dir(project_dir: &Path, configuration: &str, platform: &str) -> PathBuf {
    let bin = project_dir.join("bin");
    if is_any_cpu(platform) {
        bin.join(configuration)
    } else {
        bin.join(platform.trim()).join(configuration)
    }
}

pub fn assembly_path(
    project_dir: &Path,
    assembly_name: &str,
    configuration: &str,
    platform: &str,
) -> PathBuf {
    output_dir(project_dir, configuration, platform).join(format!("{assembly_name}.dll"))
}

/// Output directory of an inspected project, honouring its `<OutputPath>`
/// and target framework folder before falling back to [`output_dir`].
pub fn project_output_dir(
    project_dir: &Path,
    info: &ProjectInfo,
    configuration: &str,
    platform: &str,
) -> PathBuf {
    let base = match &info.output_path {
        Some(output_path) => normalize(&project_dir.join(output_path)),
        None => output_dir(project_dir, configuration, platform),
    };
    match &info.target_framework {
        Some(tfm) => base.join(tfm),
        None => base,
    }
}

pub fn project_assembly_path(
    project_dir: &Path,
    info: &ProjectInfo,
    configuration: &str,
    platform: &str,
) -> PathBuf {
    project_output_dir(project_dir, info, configuration, platform)
        .join(format!("{}.dll", info.assembly_name))
}

/// Folds `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
