mod convention;
mod project;
mod solution;

use std::path::PathBuf;

pub use convention::{
    assembly_path, is_any_cpu, output_dir, project_assembly_path, project_output_dir,
};
pub use project::{inspect_project, ProjectInfo};
pub use solution::{parse_solution, read_solution, ProjectConfigMapping, Solution, SolutionProject};

use crate::build::BuildTarget;
use crate::error::StepError;

/// A compiled NUnit assembly on disk and the project it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestAssemblyRef {
    pub project: String,
    pub path: PathBuf,
}

/// Expected assembly paths of every NUnit test project in the solution,
/// whether or not they exist yet. Each project is evaluated with the
/// configuration the solution maps `target` to, falling back to `target`'s
/// own pair when the solution has no mapping for it.
pub fn expected_test_assemblies(target: &BuildTarget) -> Result<Vec<TestAssemblyRef>, StepError> {
    let solution = read_solution(target.solution())?;
    let mut expected = Vec::new();

    for project in &solution.projects {
        let content = match std::fs::read_to_string(&project.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    project = %project.name,
                    path = %project.path.display(),
                    error = %e,
                    "skipping unreadable project file"
                );
                continue;
            }
        };
        let (configuration, platform) = solution
            .project_configuration(&project.guid, target.configuration(), target.platform())
            .unwrap_or((target.configuration(), target.platform()));

        let info = inspect_project(&content, &project.path, configuration, platform);
        if !info.is_nunit_test {
            continue;
        }
        tracing::debug!(
            project = %project.name,
            configuration,
            platform,
            output_path = ?info.output_path,
            target_framework = ?info.target_framework,
            "evaluated test project"
        );
        let project_dir = project
            .path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();
        expected.push(TestAssemblyRef {
            path: project_assembly_path(&project_dir, &info, configuration, platform),
            project: project.name.clone(),
        });
    }

    Ok(expected)
}

/// Test assemblies present on disk for `target`, in solution order.
pub fn locate_test_assemblies(target: &BuildTarget) -> Result<Vec<TestAssemblyRef>, StepError> {
    let expected = expected_test_assemblies(target)?;
    let (found, missing): (Vec<_>, Vec<_>) = expected.into_iter().partition(|a| a.path.is_file());

    if found.is_empty() {
        return Err(StepError::AssemblyNotFound {
            solution: target.solution().to_path_buf(),
            expected: missing.into_iter().map(|a| a.path).collect(),
        });
    }

    for skipped in &missing {
        tracing::warn!(
            project = %skipped.project,
            path = %skipped.path.display(),
            "test assembly not built, skipping"
        );
    }
    for assembly in &found {
        tracing::debug!(project = %assembly.project, path = %assembly.path.display(), "located test assembly");
    }

    Ok(found)
}
