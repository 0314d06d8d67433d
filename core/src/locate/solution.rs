use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ConfigError;

const PROJECT_EXTENSIONS: [&str; 3] = ["csproj", "fsproj", "vbproj"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionProject {
    pub name: String,
    /// Project file path, resolved against the solution's directory.
    pub path: PathBuf,
    /// Upper-cased project GUID, without braces.
    pub guid: String,
}

/// One `ActiveCfg` line of `GlobalSection(ProjectConfigurationPlatforms)`:
/// which project configuration a solution configuration builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfigMapping {
    pub project_guid: String,
    pub solution_configuration: String,
    pub solution_platform: String,
    pub configuration: String,
    pub platform: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    pub projects: Vec<SolutionProject>,
    pub mappings: Vec<ProjectConfigMapping>,
}

impl Solution {
    /// The `(configuration, platform)` pair `project_guid` is built with when
    /// the solution is built as `configuration|platform`.
    pub fn project_configuration(
        &self,
        project_guid: &str,
        configuration: &str,
        platform: &str,
    ) -> Option<(&str, &str)> {
        self.mappings
            .iter()
            .find(|m| {
                m.project_guid == project_guid
                    && same_name(&m.solution_configuration, configuration)
                    && same_name(&m.solution_platform, platform)
            })
            .map(|m| (m.configuration.as_str(), m.platform.as_str()))
    }
}

/// Solution names compare case-insensitively and ignore whitespace, so
/// `Any CPU` matches `AnyCPU`.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    let compact = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    };
    compact(a) == compact(b)
}

fn project_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*Project\("\{[0-9A-Fa-f-]+\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)"\s*,\s*"\{([0-9A-Fa-f-]+)\}""#)
            .expect("valid project regex")
    })
}

fn active_cfg_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*\{([0-9A-Fa-f-]+)\}\.([^|\r\n]+)\|([^\r\n]+?)\.ActiveCfg\s*=\s*([^|\r\n]+)\|([^\r\n]+?)\s*$")
            .expect("valid configuration regex")
    })
}

/// Project entries of a `.sln`, in file order, plus its configuration map.
/// Solution folders and other non-project entries are skipped.
pub fn parse_solution(content: &str, solution_dir: &Path) -> Solution {
    let projects = project_line()
        .captures_iter(content)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().trim().to_string();
            let rel = caps.get(2)?.as_str().trim().replace('\\', "/");
            let guid = caps.get(3)?.as_str().to_ascii_uppercase();
            let rel = PathBuf::from(rel);
            let ext = rel.extension()?.to_str()?.to_ascii_lowercase();
            PROJECT_EXTENSIONS
                .contains(&ext.as_str())
                .then(|| SolutionProject {
                    name,
                    path: solution_dir.join(rel),
                    guid,
                })
        })
        .collect();

    let mappings = active_cfg_line()
        .captures_iter(content)
        .map(|caps| ProjectConfigMapping {
            project_guid: caps[1].to_ascii_uppercase(),
            solution_configuration: caps[2].trim().to_string(),
            solution_platform: caps[3].trim().to_string(),
            configuration: caps[4].trim().to_string(),
            platform: caps[5].trim().to_string(),
        })
        .collect();

    Solution { projects, mappings }
}

pub fn read_solution(solution: &Path) -> Result<Solution, ConfigError> {
    let content = std::fs::read_to_string(solution).map_err(|source| ConfigError::SolutionRead {
        path: solution.to_path_buf(),
        source,
    })?;
    let dir = solution.parent().unwrap_or_else(|| Path::new(""));
    Ok(parse_solution(&content, dir))
}
