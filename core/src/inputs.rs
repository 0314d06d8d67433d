use std::io::Write;
use std::path::{Path, PathBuf};

use crate::build::BuildTarget;
use crate::error::ConfigError;

/// Step inputs as received from flags and the environment, before validation.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub solution: Option<PathBuf>,
    pub configuration: Option<String>,
    pub platform: Option<String>,
    pub options: Option<String>,
    pub deploy_dir: Option<PathBuf>,
    pub skip_build: bool,
}

/// Validated, immutable step inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    solution_path: PathBuf,
    configuration: String,
    platform: String,
    extra_test_options: Option<String>,
    deploy_dir: Option<PathBuf>,
    skip_build: bool,
}

impl RunInputs {
    /// Prints the resolved inputs so operators can see what the step received.
    pub fn echo(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let show_path = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        let show = |s: &Option<String>| s.clone().unwrap_or_default();

        writeln!(out)?;
        writeln!(out, "========== Configs ==========")?;
        writeln!(out, "Build Configs:")?;
        writeln!(out, " - solution: {}", show_path(&self.solution))?;
        writeln!(out, " - configuration: {}", show(&self.configuration))?;
        writeln!(out, " - platform: {}", show(&self.platform))?;
        writeln!(out, " - skip build: {}", self.skip_build)?;
        writeln!(out, "NUnit Configs:")?;
        writeln!(out, " - options: {}", show(&self.options))?;
        writeln!(out, "Other Configs:")?;
        writeln!(out, " - deploy dir: {}", show_path(&self.deploy_dir))?;
        writeln!(out)
    }

    pub fn validate(self) -> Result<RunConfig, ConfigError> {
        let solution_path = self
            .solution
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingSolution)?;
        check_solution(&solution_path)?;

        let configuration = non_empty(self.configuration).ok_or(ConfigError::MissingConfiguration)?;
        let platform = non_empty(self.platform).ok_or(ConfigError::MissingPlatform)?;

        Ok(RunConfig {
            solution_path,
            configuration,
            platform,
            extra_test_options: self.options.filter(|o| !o.trim().is_empty()),
            deploy_dir: self.deploy_dir.filter(|p| !p.as_os_str().is_empty()),
            skip_build: self.skip_build,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_solution(path: &Path) -> Result<(), ConfigError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(ConfigError::SolutionNotFile(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConfigError::SolutionNotFound(path.to_path_buf()))
        }
        Err(source) => Err(ConfigError::SolutionRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl RunConfig {
    pub fn solution_path(&self) -> &Path {
        &self.solution_path
    }

    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn extra_test_options(&self) -> Option<&str> {
        self.extra_test_options.as_deref()
    }

    pub fn deploy_dir(&self) -> Option<&Path> {
        self.deploy_dir.as_deref()
    }

    pub fn skip_build(&self) -> bool {
        self.skip_build
    }

    pub fn build_target(&self) -> BuildTarget {
        BuildTarget::new(
            self.solution_path.clone(),
            self.configuration.clone(),
            self.platform.clone(),
        )
    }
}

/// Parses the boolean spellings CI systems put into environment variables.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "0" | "" => Ok(false),
        _ => Err(format!("invalid value for boolean: \"{value}\"")),
    }
}
