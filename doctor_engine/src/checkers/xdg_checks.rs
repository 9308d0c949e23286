//! XDG layout checkers: migration status and base-directory
//! presence/mode.

use crate::ctx::Ctx;
use crate::result::{Category, CheckResult};
use crate::xdg;

use super::HealthChecker;

pub struct XdgMigrationStatusChecker {
    app_name: String,
}

impl XdgMigrationStatusChecker {
    pub fn new(app_name: String) -> Self {
        Self { app_name }
    }
}

impl HealthChecker for XdgMigrationStatusChecker {
    fn name(&self) -> &str {
        "xdg_migration_status"
    }

    fn category(&self) -> Category {
        Category::new(Category::XDG)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        let paths = xdg::resolve(&self.app_name);
        let home = dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("/"));
        let legacy_dir = home.join(format!(".{}", self.app_name));

        if !legacy_dir.exists() {
            return CheckResult::pass(self.name(), "no legacy layout present");
        }
        if !xdg::needs_migration(&paths.state_home) {
            return CheckResult::pass(self.name(), "legacy layout already migrated");
        }
        CheckResult::fail_warning(self.name(), format!("legacy layout at {} has not been migrated", legacy_dir.display()))
            .with_fix_id("migrate_xdg")
    }
}

pub struct XdgDirectoriesChecker {
    app_name: String,
}

impl XdgDirectoriesChecker {
    pub fn new(app_name: String) -> Self {
        Self { app_name }
    }
}

impl HealthChecker for XdgDirectoriesChecker {
    fn name(&self) -> &str {
        "xdg_directories"
    }

    fn category(&self) -> Category {
        Category::new(Category::XDG)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        let paths = xdg::resolve(&self.app_name);
        let mut missing = Vec::new();
        let mut wrong_mode = Vec::new();

        for dir in [&paths.config_home, &paths.data_home, &paths.state_home, &paths.cache_home] {
            match std::fs::metadata(dir) {
                Ok(meta) => {
                    #[cfg(unix)]
                    {
                        use std::os::unix::fs::PermissionsExt;
                        let mode = meta.permissions().mode() & 0o777;
                        if mode != 0o700 {
                            wrong_mode.push(format!("{} has mode {mode:o}, expected 0700", dir.display()));
                        }
                    }
                    let _ = meta;
                }
                Err(_) => missing.push(format!("{} does not exist", dir.display())),
            }
        }

        if missing.is_empty() && wrong_mode.is_empty() {
            return CheckResult::pass(self.name(), "all XDG base directories exist with mode 0700");
        }

        let mut details = missing;
        details.extend(wrong_mode);
        CheckResult::fail_warning(self.name(), format!("{} XDG directory issue(s) found", details.len()))
            .with_details(details)
            .with_fix_id("create_xdg_dirs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn migration_status_passes_when_no_legacy_dir() {
        let _guard = ENV_LOCK.lock().unwrap();
        let home = tempdir().unwrap();
        std::env::set_var("HOME", home.path());
        let result = XdgMigrationStatusChecker::new("warden-migr-test-1".into()).check(&Ctx::new());
        assert!(result.is_passed());
    }

    #[test]
    fn migration_status_warns_when_legacy_present_and_unmigrated() {
        let _guard = ENV_LOCK.lock().unwrap();
        let home = tempdir().unwrap();
        std::env::set_var("HOME", home.path());
        std::env::remove_var("XDG_STATE_HOME");
        std::fs::create_dir_all(home.path().join(".warden-migr-test-2")).unwrap();
        let result = XdgMigrationStatusChecker::new("warden-migr-test-2".into()).check(&Ctx::new());
        assert!(result.is_warning());
        assert_eq!(result.fix_id.unwrap().as_str(), "migrate_xdg");
    }

    #[test]
    fn directories_checker_fails_when_dirs_missing() {
        let _guard = ENV_LOCK.lock().unwrap();
        let home = tempdir().unwrap();
        std::env::set_var("HOME", home.path());
        std::env::remove_var("XDG_CONFIG_HOME");
        std::env::remove_var("XDG_DATA_HOME");
        std::env::remove_var("XDG_STATE_HOME");
        std::env::remove_var("XDG_CACHE_HOME");
        let result = XdgDirectoriesChecker::new("warden-dirs-test-missing".into()).check(&Ctx::new());
        assert!(result.is_warning());
        assert_eq!(result.fix_id.unwrap().as_str(), "create_xdg_dirs");
    }

    #[test]
    fn directories_checker_passes_when_all_present_with_mode_0700() {
        let _guard = ENV_LOCK.lock().unwrap();
        let home = tempdir().unwrap();
        std::env::set_var("HOME", home.path());
        std::env::remove_var("XDG_CONFIG_HOME");
        std::env::remove_var("XDG_DATA_HOME");
        std::env::remove_var("XDG_STATE_HOME");
        std::env::remove_var("XDG_CACHE_HOME");
        let paths = xdg::resolve("warden-dirs-test-ok");
        for dir in [&paths.config_home, &paths.data_home, &paths.state_home, &paths.cache_home] {
            xdg::ensure_dir(dir).unwrap();
        }
        let result = XdgDirectoriesChecker::new("warden-dirs-test-ok".into()).check(&Ctx::new());
        assert!(result.is_passed());
    }
}
