//! Writes a default configuration file when global or project config is
//! absent.

use crate::atomic::atomic_write_file;
use crate::config::WardenConfig;

use super::{FixCtx, FixError, Fixer};

fn default_config_toml(binary_name: &str, app_name: &str) -> String {
    let config = WardenConfig {
        binary_name: binary_name.to_string(),
        app_name: app_name.to_string(),
        ..WardenConfig::default()
    };
    toml::to_string_pretty(&config).unwrap_or_default()
}

pub struct CreateGlobalConfigFixer;

impl Fixer for CreateGlobalConfigFixer {
    fn id(&self) -> &str {
        "create_global_config"
    }

    fn description(&self) -> &str {
        "write a default global configuration file"
    }

    fn fix(&self, ctx: &FixCtx) -> Result<(), FixError> {
        let path = ctx.config_loader.global_config_path();
        if ctx.config_loader.has_global_config() {
            return Ok(());
        }
        if ctx.interactive {
            let proceed = ctx
                .prompter
                .confirm(&format!("Create default global configuration at {}?", path.display()), true)
                .map_err(|e| FixError::failed(self.id(), e))?;
            if !proceed {
                return Ok(());
            }
        }
        let contents = default_config_toml(ctx.binary_name, ctx.app_name);
        atomic_write_file(&path, contents.as_bytes(), false).map_err(|e| FixError::failed(self.id(), e))
    }
}

pub struct CreateProjectConfigFixer;

impl Fixer for CreateProjectConfigFixer {
    fn id(&self) -> &str {
        "create_project_config"
    }

    fn description(&self) -> &str {
        "write a default project configuration file"
    }

    fn fix(&self, ctx: &FixCtx) -> Result<(), FixError> {
        if ctx.config_loader.has_project_config() {
            return Ok(());
        }
        let Some(path) = ctx.config_loader.project_config_paths().into_iter().next() else {
            return Err(FixError::failed(
                self.id(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no project configuration path known"),
            ));
        };
        if ctx.interactive {
            let proceed = ctx
                .prompter
                .confirm(&format!("Create default project configuration at {}?", path.display()), true)
                .map_err(|e| FixError::failed(self.id(), e))?;
            if !proceed {
                return Ok(());
            }
        }
        let contents = default_config_toml(ctx.binary_name, ctx.app_name);
        atomic_write_file(&path, contents.as_bytes(), false).map_err(|e| FixError::failed(self.id(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Ctx;
    use crate::external::{ConfigLoader, ConfigLoaderError, GitRunner, NonInteractivePrompter};
    use tempfile::tempdir;

    struct NullGit;
    impl GitRunner for NullGit {
        fn is_inside_repo(&self, _path: &std::path::Path) -> bool {
            false
        }
    }

    struct FakeLoader {
        global_path: std::path::PathBuf,
        global_exists: bool,
        project_path: std::path::PathBuf,
        project_exists: bool,
    }

    impl ConfigLoader for FakeLoader {
        fn has_global_config(&self) -> bool {
            self.global_exists
        }
        fn has_project_config(&self) -> bool {
            self.project_exists
        }
        fn global_config_path(&self) -> std::path::PathBuf {
            self.global_path.clone()
        }
        fn project_config_paths(&self) -> Vec<std::path::PathBuf> {
            vec![self.project_path.clone()]
        }
        fn load(&self) -> Result<WardenConfig, ConfigLoaderError> {
            Ok(WardenConfig::default())
        }
        fn load_without_validation(&self) -> Result<WardenConfig, ConfigLoaderError> {
            Ok(WardenConfig::default())
        }
        fn load_project_config_only(&self) -> Result<(WardenConfig, std::path::PathBuf), ConfigLoaderError> {
            Ok((WardenConfig::default(), self.project_path.clone()))
        }
    }

    #[test]
    fn writes_global_config_when_absent() {
        let dir = tempdir().unwrap();
        let global_path = dir.path().join("config.toml");
        let loader = FakeLoader {
            global_path: global_path.clone(),
            global_exists: false,
            project_path: dir.path().join(".warden/config.toml"),
            project_exists: true,
        };
        let ctx = Ctx::new();
        let prompter = NonInteractivePrompter;
        let git = NullGit;
        let fix_ctx = FixCtx { ctx: &ctx, interactive: false, prompter: &prompter, config_loader: &loader, git_runner: &git, app_name: "warden", binary_name: "warden" };
        CreateGlobalConfigFixer.fix(&fix_ctx).unwrap();
        assert!(global_path.exists());
    }

    #[test]
    fn no_op_when_project_config_already_present() {
        let dir = tempdir().unwrap();
        let project_path = dir.path().join(".warden/config.toml");
        let loader = FakeLoader {
            global_path: dir.path().join("config.toml"),
            global_exists: true,
            project_path: project_path.clone(),
            project_exists: true,
        };
        let ctx = Ctx::new();
        let prompter = NonInteractivePrompter;
        let git = NullGit;
        let fix_ctx = FixCtx { ctx: &ctx, interactive: false, prompter: &prompter, config_loader: &loader, git_runner: &git, app_name: "warden", binary_name: "warden" };
        CreateProjectConfigFixer.fix(&fix_ctx).unwrap();
        assert!(!project_path.exists());
    }
}
