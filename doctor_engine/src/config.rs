//! `warden`'s own on-disk TOML configuration: the concrete model the
//! `ConfigLoader` collaborator loads, and the default
//! `TomlConfigLoader` implementation.
//!
//! Resolution order: project file, then a pyproject-style aggregator,
//! falling back to defaults. `ConfigLoader` is a replaceable collaborator,
//! not part of the diagnostics core itself.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::external::{ConfigLoader, ConfigLoaderError};

/// Case-insensitive membership lexicon for rule `event`.
pub const VALID_EVENTS: &[&str] = &["PreToolUse", "PostToolUse", "Notification", "Stop", "SubagentStop"];
/// Case-insensitive membership lexicon for rule `tool`.
pub const VALID_TOOLS: &[&str] = &["Bash", "Write", "Edit", "Read", "Glob", "Grep"];
/// Exact-case membership lexicon for rule `action`.
pub const VALID_ACTIONS: &[&str] = &["allow", "deny", "ask", "log"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl MatchSection {
    pub fn is_empty(&self) -> bool {
        self.event.as_deref().unwrap_or("").is_empty() && self.tool.as_deref().unwrap_or("").is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_section: Option<MatchSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl Rule {
    /// `enabled != false`.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathOverride {
    pub path_glob: String,
    pub rule: String,
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionalTool {
    pub name: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub critical: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardenConfig {
    #[serde(default = "default_binary_name")]
    pub binary_name: String,
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub overrides: Vec<PathOverride>,
    #[serde(default)]
    pub optional_tools: Vec<OptionalTool>,
}

fn default_binary_name() -> String {
    "warden".to_string()
}

fn default_app_name() -> String {
    "warden".to_string()
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            binary_name: default_binary_name(),
            app_name: default_app_name(),
            rules: Vec::new(),
            overrides: Vec::new(),
            optional_tools: vec![OptionalTool { name: "git".to_string(), alternatives: vec![], critical: false }],
        }
    }
}

/// Raw TOML shape before defaulting — separates "what's on disk" from
/// "the fully-defaulted in-memory config".
#[derive(Debug, Default, Deserialize)]
struct TomlConfigFile {
    #[serde(default)]
    binary_name: Option<String>,
    #[serde(default)]
    app_name: Option<String>,
    #[serde(default)]
    rules: Vec<Rule>,
    #[serde(default)]
    overrides: Vec<PathOverride>,
    #[serde(default)]
    optional_tools: Vec<OptionalTool>,
}

impl TomlConfigFile {
    fn into_config(self) -> WardenConfig {
        let defaults = WardenConfig::default();
        WardenConfig {
            binary_name: self.binary_name.unwrap_or(defaults.binary_name),
            app_name: self.app_name.unwrap_or(defaults.app_name),
            rules: self.rules,
            overrides: self.overrides,
            optional_tools: if self.optional_tools.is_empty() { defaults.optional_tools } else { self.optional_tools },
        }
    }
}

fn parse_toml(path: &Path) -> Result<WardenConfig, ConfigLoaderError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigLoaderError::Io { path: path.display().to_string(), source: e })?;
    let file: TomlConfigFile = toml::from_str(&text).map_err(|e| ConfigLoaderError::InvalidToml { path: path.display().to_string(), source: e })?;
    Ok(file.into_config())
}

/// Public entry point for callers (e.g. the project-config checker) that
/// load a config without going through `ConfigLoader::load` but still need
/// the same validation rules applied.
pub fn validate_config(config: &WardenConfig) -> Result<(), ConfigLoaderError> {
    validate(config)
}

fn validate(config: &WardenConfig) -> Result<(), ConfigLoaderError> {
    for rule in &config.rules {
        if !rule.is_enabled() {
            continue;
        }
        let Some(section) = &rule.match_section else {
            return Err(ConfigLoaderError::EmptyMatchConditions { rule: rule.name.clone() });
        };
        if section.is_empty() {
            return Err(ConfigLoaderError::EmptyMatchConditions { rule: rule.name.clone() });
        }
        if let Some(event) = &section.event {
            if !VALID_EVENTS.iter().any(|v| v.eq_ignore_ascii_case(event)) {
                return Err(ConfigLoaderError::InvalidRule { rule: rule.name.clone(), reason: format!("unknown event '{event}'") });
            }
        }
        if let Some(tool) = &section.tool {
            if !VALID_TOOLS.iter().any(|v| v.eq_ignore_ascii_case(tool)) {
                return Err(ConfigLoaderError::InvalidRule { rule: rule.name.clone(), reason: format!("unknown tool '{tool}'") });
            }
        }
        if let Some(action) = &rule.action {
            if !VALID_ACTIONS.contains(&action.as_str()) {
                return Err(ConfigLoaderError::InvalidRule { rule: rule.name.clone(), reason: format!("unknown action '{action}'") });
            }
        }
    }
    Ok(())
}

/// Concrete `ConfigLoader`: global config at `<xdg-config>/<app>/config.toml`,
/// project config at `./.warden/config.toml`.
pub struct TomlConfigLoader {
    global_path: PathBuf,
    project_root: PathBuf,
}

impl TomlConfigLoader {
    pub fn new(app_name: &str, project_root: PathBuf) -> Self {
        let global_path = crate::xdg::resolve(app_name).config_home.join("config.toml");
        Self { global_path, project_root }
    }

    fn project_path(&self) -> PathBuf {
        self.project_root.join(".warden/config.toml")
    }

    fn merge(global: Option<WardenConfig>, project: Option<WardenConfig>) -> WardenConfig {
        match (global, project) {
            (Some(mut global), Some(project)) => {
                global.rules.extend(project.rules);
                global.overrides.extend(project.overrides);
                if !project.optional_tools.is_empty() {
                    global.optional_tools = project.optional_tools;
                }
                global
            }
            (Some(global), None) => global,
            (None, Some(project)) => project,
            (None, None) => WardenConfig::default(),
        }
    }
}

impl ConfigLoader for TomlConfigLoader {
    fn has_global_config(&self) -> bool {
        self.global_path.exists()
    }

    fn has_project_config(&self) -> bool {
        self.project_path().exists()
    }

    fn global_config_path(&self) -> PathBuf {
        self.global_path.clone()
    }

    fn project_config_paths(&self) -> Vec<PathBuf> {
        vec![self.project_path()]
    }

    fn load(&self) -> Result<WardenConfig, ConfigLoaderError> {
        let config = self.load_without_validation()?;
        validate(&config)?;
        Ok(config)
    }

    fn load_without_validation(&self) -> Result<WardenConfig, ConfigLoaderError> {
        let global = if self.has_global_config() { Some(parse_toml(&self.global_path)?) } else { None };
        let project = if self.has_project_config() { Some(parse_toml(&self.project_path())?) } else { None };
        Ok(Self::merge(global, project))
    }

    fn load_project_config_only(&self) -> Result<(WardenConfig, PathBuf), ConfigLoaderError> {
        let path = self.project_path();
        if !path.exists() {
            return Err(ConfigLoaderError::ConfigNotFound(path.display().to_string()));
        }
        Ok((parse_toml(&path)?, path))
    }
}
