use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use super::solution::same_name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub assembly_name: String,
    pub is_nunit_test: bool,
    /// `<OutputPath>` in effect for the inspected configuration and platform,
    /// with separators normalized. Relative to the project directory.
    pub output_path: Option<PathBuf>,
    /// Folder the SDK appends to the output path (`net8.0`, ...). Only the
    /// first of several `<TargetFrameworks>` is used.
    pub target_framework: Option<String>,
}

fn assembly_name_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<AssemblyName>\s*([^<]+?)\s*</AssemblyName>").expect("valid assembly regex")
    })
}

fn nunit_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)nunit\.framework|Include\s*=\s*"NUnit""#).expect("valid nunit regex")
    })
}

fn property_group() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<PropertyGroup\b([^>]*?)(?:/>|>(.*?)</PropertyGroup>)")
            .expect("valid property group regex")
    })
}

fn output_path_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<OutputPath\b([^>]*)>\s*([^<]*?)\s*</OutputPath>").expect("valid output path regex")
    })
}

fn condition_attr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"Condition\s*=\s*"([^"]*)""#).expect("valid condition regex")
    })
}

fn condition_value() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"==\s*'([^']*)'").expect("valid condition value regex"))
}

fn target_framework_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<TargetFrameworks?>\s*([^<]+?)\s*</TargetFrameworks?>")
            .expect("valid target framework regex")
    })
}

fn no_framework_folder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<AppendTargetFrameworkToOutputPath>\s*false\s*</AppendTargetFrameworkToOutputPath>")
            .expect("valid append regex")
    })
}

/// Whether an MSBuild `Condition` holds for `configuration|platform`.
/// Conditions on other properties never match; no condition always does.
fn condition_holds(attrs: &str, configuration: &str, platform: &str) -> bool {
    let Some(condition) = condition_attr().captures(attrs).map(|c| c[1].to_string()) else {
        return true;
    };
    let Some(expected) = condition_value().captures(&condition).map(|c| c[1].to_string()) else {
        return false;
    };
    match expected.split_once('|') {
        Some((cfg, plat)) => same_name(cfg, configuration) && same_name(plat, platform),
        None if condition.contains("$(Configuration)") => same_name(&expected, configuration),
        None if condition.contains("$(Platform)") => same_name(&expected, platform),
        None => false,
    }
}

/// `<OutputPath>` for `configuration|platform`. A conditional match wins over
/// an unconditional value; paths still holding unknown `$(...)` properties
/// are ignored.
fn output_path_for(content: &str, configuration: &str, platform: &str) -> Option<PathBuf> {
    let mut unconditional = None;
    let mut conditional = None;

    for group in property_group().captures_iter(content) {
        let group_attrs = group.get(1).map_or("", |m| m.as_str());
        let Some(body) = group.get(2) else { continue };
        if !condition_holds(group_attrs, configuration, platform) {
            continue;
        }
        let group_is_conditional = condition_attr().is_match(group_attrs);

        for tag in output_path_tag().captures_iter(body.as_str()) {
            let attrs = tag.get(1).map_or("", |m| m.as_str());
            if !condition_holds(attrs, configuration, platform) {
                continue;
            }
            let raw = tag[2]
                .replace("$(Configuration)", configuration)
                .replace("$(Platform)", platform);
            if raw.is_empty() || raw.contains("$(") {
                tracing::debug!(output_path = %raw, "ignoring unresolved output path");
                continue;
            }
            let path = PathBuf::from(raw.replace('\\', "/"));
            if group_is_conditional || condition_attr().is_match(attrs) {
                conditional = Some(path);
            } else {
                unconditional = Some(path);
            }
        }
    }

    conditional.or(unconditional)
}

fn target_framework(content: &str) -> Option<String> {
    if no_framework_folder().is_match(content) {
        return None;
    }
    target_framework_tag()
        .captures(content)
        .and_then(|c| {
            c[1].split(';')
                .map(str::trim)
                .find(|tfm| !tfm.is_empty())
                .map(str::to_string)
        })
}

/// Reads what the locator needs from a project file, evaluated for the
/// project's own `configuration|platform`.
pub fn inspect_project(
    content: &str,
    project_path: &Path,
    configuration: &str,
    platform: &str,
) -> ProjectInfo {
    let assembly_name = assembly_name_tag()
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| {
            project_path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_default();

    ProjectInfo {
        assembly_name,
        is_nunit_test: nunit_reference().is_match(content),
        output_path: output_path_for(content, configuration, platform),
        target_framework: target_framework(content),
    }
}
