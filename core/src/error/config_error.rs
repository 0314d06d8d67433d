use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no solution parameter specified")]
    MissingSolution,

    #[error("no solution file found at path: {}", .0.display())]
    SolutionNotFound(PathBuf),

    #[error("solution path is not a file: {}", .0.display())]
    SolutionNotFile(PathBuf),

    #[error("failed to read solution at: {}", .path.display())]
    SolutionRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no configuration parameter specified")]
    MissingConfiguration,

    #[error("no platform parameter specified")]
    MissingPlatform,

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error")]
    Parse(#[source] toml::de::Error),

    #[error("env var invalid: {key}")]
    EnvInvalid {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}
