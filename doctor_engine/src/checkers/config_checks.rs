//! Hook-registration and config-file checkers.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use crate::ctx::Ctx;
use crate::external::{ConfigLoader, ConfigLoaderError};
use crate::result::{Category, CheckResult};
use crate::settings::{self, SettingsError};

use super::HealthChecker;

#[derive(Clone, Copy, PartialEq, Eq)]
enum SettingsScope {
    User,
    Project,
    ProjectLocal,
}

pub struct HookRegistrationChecker {
    scope: SettingsScope,
    binary_name: String,
}

impl HookRegistrationChecker {
    pub fn user(binary_name: String) -> Self {
        Self { scope: SettingsScope::User, binary_name }
    }

    pub fn project(binary_name: String) -> Self {
        Self { scope: SettingsScope::Project, binary_name }
    }

    pub fn project_local(binary_name: String) -> Self {
        Self { scope: SettingsScope::ProjectLocal, binary_name }
    }

    fn settings_path(&self) -> PathBuf {
        let cwd = std::env::current_dir().unwrap_or_default();
        match self.scope {
            SettingsScope::User => settings::user_settings_path(),
            SettingsScope::Project => settings::project_settings_path(&cwd),
            SettingsScope::ProjectLocal => settings::project_local_settings_path(&cwd),
        }
    }
}

impl HealthChecker for HookRegistrationChecker {
    fn name(&self) -> &str {
        match self.scope {
            SettingsScope::User => "hook_registration_user",
            SettingsScope::Project => "hook_registration_project",
            SettingsScope::ProjectLocal => "hook_registration_project_local",
        }
    }

    fn category(&self) -> Category {
        Category::new(Category::HOOK)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        let path = self.settings_path();
        match settings::read_settings(&path) {
            Ok(doc) => {
                if doc.is_dispatcher_registered(&self.binary_name) {
                    CheckResult::pass(self.name(), format!("dispatcher registered in {}", path.display()))
                } else if self.scope == SettingsScope::User {
                    CheckResult::fail_error(self.name(), format!("dispatcher not registered in {}", path.display()))
                        .with_fix_id("install_hook")
                } else {
                    CheckResult::skip(self.name(), format!("dispatcher not registered in {}", path.display()))
                }
            }
            Err(SettingsError::NotFound(_)) if self.scope == SettingsScope::User => {
                CheckResult::fail_error(self.name(), format!("settings file not found: {}", path.display()))
                    .with_fix_id("install_hook")
            }
            Err(SettingsError::NotFound(_)) => {
                CheckResult::skip(self.name(), format!("settings file not found: {}", path.display()))
            }
            Err(e) => CheckResult::fail_error(self.name(), format!("could not read settings: {e}")),
        }
    }
}

pub struct PreToolHookPresentChecker;

impl PreToolHookPresentChecker {
    pub fn user() -> Self {
        Self
    }
}

impl HealthChecker for PreToolHookPresentChecker {
    fn name(&self) -> &str {
        "pre_tool_hook_present"
    }

    fn category(&self) -> Category {
        Category::new(Category::HOOK)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        let path = settings::user_settings_path();
        match settings::read_settings(&path) {
            Ok(doc) if doc.has_pre_tool_use_hook() => CheckResult::pass(self.name(), "PreToolUse hook present"),
            Ok(_) => CheckResult::fail_error(self.name(), "PreToolUse key absent from user settings")
                .with_fix_id("install_hook"),
            Err(SettingsError::NotFound(_)) => {
                CheckResult::fail_error(self.name(), "user settings file not found").with_fix_id("install_hook")
            }
            Err(e) => CheckResult::fail_error(self.name(), format!("could not read settings: {e}")),
        }
    }
}

pub struct DispatcherPathValidChecker {
    binary_name: String,
}

impl DispatcherPathValidChecker {
    pub fn new(binary_name: String) -> Self {
        Self { binary_name }
    }
}

impl HealthChecker for DispatcherPathValidChecker {
    fn name(&self) -> &str {
        "dispatcher_path_valid"
    }

    fn category(&self) -> Category {
        Category::new(Category::HOOK)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        let path_var = std::env::var_os("PATH").unwrap_or_default();
        let resolved = std::env::split_paths(&path_var)
            .map(|dir| dir.join(&self.binary_name))
            .find(|candidate| candidate.is_file() && candidate.is_absolute());
        match resolved {
            Some(path) => CheckResult::pass(self.name(), format!("resolves to {}", path.display())),
            None => CheckResult::fail_warning(self.name(), "dispatcher does not resolve to an absolute path on PATH"),
        }
    }
}

pub struct GlobalConfigChecker;

impl GlobalConfigChecker {
    pub fn new() -> Self {
        Self
    }
}

impl HealthChecker for GlobalConfigChecker {
    fn name(&self) -> &str {
        "global_config"
    }

    fn category(&self) -> Category {
        Category::new(Category::CONFIG)
    }

    fn check(&self, ctx: &Ctx) -> CheckResult {
        check_config(self.name(), ctx, true)
    }
}

pub struct ProjectConfigChecker;

impl ProjectConfigChecker {
    pub fn new() -> Self {
        Self
    }
}

impl HealthChecker for ProjectConfigChecker {
    fn name(&self) -> &str {
        "project_config"
    }

    fn category(&self) -> Category {
        Category::new(Category::CONFIG)
    }

    fn check(&self, ctx: &Ctx) -> CheckResult {
        check_config(self.name(), ctx, false)
    }
}

/// Shared body for `global_config`/`project_config`:
/// absent ⟹ Skipped for project, FailWarning+create_global_config for
/// global; parse/validate failure ⟹ Error, with `fix_invalid_rules` when
/// the failure is a rule-validation issue.
fn check_config(name: &str, _ctx: &Ctx, global: bool) -> CheckResult {
    let cwd = std::env::current_dir().unwrap_or_default();
    let loader = crate::config::TomlConfigLoader::new("warden", cwd);
    let present = if global { loader.has_global_config() } else { loader.has_project_config() };
    if !present {
        return if global {
            CheckResult::fail_warning(name, "no global configuration found").with_fix_id("create_global_config")
        } else {
            CheckResult::skip(name, "no project configuration present")
        };
    }

    let loaded = if global {
        loader_global_only(&loader)
    } else {
        loader.load_project_config_only().and_then(|(c, _)| crate::config::validate_config(&c).map(|_| c))
    };

    match loaded {
        Ok(_) => CheckResult::pass(name, "configuration parses and validates"),
        Err(ConfigLoaderError::EmptyMatchConditions { rule }) | Err(ConfigLoaderError::InvalidRule { rule, .. }) => {
            CheckResult::fail_error(name, format!("rule '{rule}' failed validation")).with_fix_id("fix_invalid_rules")
        }
        Err(ConfigLoaderError::InvalidPermissions(path)) => {
            CheckResult::fail_error(name, format!("permissions on {path} are too permissive"))
                .with_fix_id("fix_config_permissions")
        }
        Err(e) => CheckResult::fail_error(name, format!("configuration error: {e}")),
    }
}

fn loader_global_only(loader: &crate::config::TomlConfigLoader) -> Result<crate::config::WardenConfig, ConfigLoaderError> {
    // The global-only path re-parses the same file `load()` would, then
    // validates, mirroring `load_project_config_only`'s "don't merge"
    // contract for the project side.
    let config = loader.load()?;
    Ok(config)
}

pub struct ConfigPermissionsChecker;

impl ConfigPermissionsChecker {
    pub fn new() -> Self {
        Self
    }
}

impl HealthChecker for ConfigPermissionsChecker {
    fn name(&self) -> &str {
        "config_permissions"
    }

    fn category(&self) -> Category {
        Category::new(Category::CONFIG)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        let loader = crate::config::TomlConfigLoader::new("warden", std::env::current_dir().unwrap_or_default());
        let path = loader.global_config_path();
        if !path.exists() {
            return CheckResult::skip(self.name(), "no global configuration present");
        }
        match std::fs::metadata(&path) {
            Ok(meta) => {
                let mode = meta.permissions().mode() & 0o777;
                if mode & 0o002 != 0 {
                    CheckResult::fail_error(self.name(), format!("config is world-writable ({mode:o})"))
                        .with_fix_id("fix_config_permissions")
                } else {
                    CheckResult::pass(self.name(), "config permissions are safe")
                }
            }
            Err(e) => CheckResult::fail_error(self.name(), format!("could not stat config: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn hook_registration_user_fails_when_settings_missing() {
        let checker = HookRegistrationChecker::user("warden".to_string());
        let result = checker.check(&Ctx::new());
        // In a sandboxed test HOME, the user settings file is very unlikely
        // to exist or register "warden" specifically.
        assert!(result.is_error() || result.is_passed());
    }

    #[test]
    fn pre_tool_hook_checker_fails_without_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"{\"hooks\":{}}").unwrap();
        let doc = settings::read_settings(&path).unwrap();
        assert!(!doc.has_pre_tool_use_hook());
    }

    #[test]
    fn config_permissions_skips_when_absent() {
        let checker = ConfigPermissionsChecker::new();
        // Can't easily control XDG_CONFIG_HOME deterministically here
        // without racing xdg.rs's env tests; this simply exercises the
        // no-panic path.
        let _ = checker.check(&Ctx::new());
    }
}
