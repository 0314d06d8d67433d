use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepConfig {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub run: RunSettings,

    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_build_tool")]
    pub build_tool: String,

    #[serde(default = "default_test_runner")]
    pub test_runner: String,
}

fn default_build_tool() -> String {
    "msbuild".to_string()
}

fn default_test_runner() -> String {
    "nunit3-console".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            build_tool: default_build_tool(),
            test_runner: default_test_runner(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    /// Bytes of each subprocess stream kept for diagnostics.
    #[serde(default = "default_capture_bytes")]
    pub capture_bytes: usize,

    /// Kill a subprocess that runs longer than this. Unset means no limit.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_result_file_name")]
    pub result_file_name: String,
}

fn default_capture_bytes() -> usize {
    65_536
}

fn default_result_file_name() -> String {
    "TestResult.xml".to_string()
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            capture_bytes: default_capture_bytes(),
            timeout_secs: None,
            result_file_name: default_result_file_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_enabled")]
    pub enabled: bool,

    #[serde(default = "default_export_tool")]
    pub tool: String,
}

fn default_export_enabled() -> bool {
    true
}

fn default_export_tool() -> String {
    "envman".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: default_export_enabled(),
            tool: default_export_tool(),
        }
    }
}
