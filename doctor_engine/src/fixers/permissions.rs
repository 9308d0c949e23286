//! Permission-fixing fixers: binary mode 0755, config mode 0600.

use std::os::unix::fs::PermissionsExt;

use super::{FixCtx, FixError, Fixer};

fn find_on_path(binary_name: &str) -> Option<std::path::PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).map(|dir| dir.join(binary_name)).find(|candidate| candidate.is_file())
}

pub struct FixPermissionsFixer;

impl Fixer for FixPermissionsFixer {
    fn id(&self) -> &str {
        "fix_permissions"
    }

    fn description(&self) -> &str {
        "chmod the binary to 0755"
    }

    fn fix(&self, ctx: &FixCtx) -> Result<(), FixError> {
        let Some(path) = find_on_path(ctx.binary_name) else {
            return Err(FixError::failed(
                self.id(),
                std::io::Error::new(std::io::ErrorKind::NotFound, format!("'{}' not found on PATH", ctx.binary_name)),
            ));
        };

        if ctx.interactive {
            let proceed = ctx
                .prompter
                .confirm(&format!("chmod {} to 0755?", path.display()), true)
                .map_err(|e| FixError::failed(self.id(), e))?;
            if !proceed {
                return Ok(());
            }
        }

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .map_err(|e| FixError::failed(self.id(), e))
    }
}

pub struct FixConfigPermissionsFixer;

impl Fixer for FixConfigPermissionsFixer {
    fn id(&self) -> &str {
        "fix_config_permissions"
    }

    fn description(&self) -> &str {
        "chmod the global configuration to 0600"
    }

    fn fix(&self, ctx: &FixCtx) -> Result<(), FixError> {
        let path = ctx.config_loader.global_config_path();
        let current = std::fs::metadata(&path).map_err(|e| FixError::failed(self.id(), e))?.permissions().mode() & 0o777;
        if current == 0o600 {
            return Ok(());
        }

        if ctx.interactive {
            let proceed = ctx
                .prompter
                .confirm(&format!("chmod {} to 0600?", path.display()), true)
                .map_err(|e| FixError::failed(self.id(), e))?;
            if !proceed {
                return Ok(());
            }
        }

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).map_err(|e| FixError::failed(self.id(), e))
    }
}
