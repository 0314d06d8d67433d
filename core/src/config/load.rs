use std::path::Path;

use super::types::StepConfig;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "nunit-step.toml";

/// Loads the step config.
///
/// An explicit `path` must exist. Without one, `nunit-step.toml` in the working
/// directory is used when present, otherwise defaults. Environment overrides
/// are applied last.
pub fn load(path: Option<&Path>) -> Result<StepConfig, ConfigError> {
    let source = match path {
        Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.to_path_buf())),
        Some(p) => Some(p),
        None => Some(Path::new(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };

    let mut cfg = match source {
        Some(p) => {
            let s = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                path: p.to_path_buf(),
                source,
            })?;
            tracing::debug!(path = %p.display(), "loaded step config");
            toml::from_str::<StepConfig>(&s).map_err(ConfigError::Parse)?
        }
        None => StepConfig::default(),
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    Ok(cfg)
}

pub fn apply_env_overrides<F>(cfg: &mut StepConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("NUNIT_STEP_BUILD_TOOL") {
        cfg.tools.build_tool = v;
    }
    if let Some(v) = non_empty("NUNIT_STEP_TEST_RUNNER") {
        cfg.tools.test_runner = v;
    }
    if let Some(v) = non_empty("NUNIT_STEP_TIMEOUT_SECS") {
        let secs = v
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::EnvInvalid {
                key: "NUNIT_STEP_TIMEOUT_SECS".to_string(),
                source: e.into(),
            })?;
        cfg.run.timeout_secs = (secs > 0).then_some(secs);
    }

    Ok(())
}
