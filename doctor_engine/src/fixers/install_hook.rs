//! Registers the dispatcher as a `PreToolUse` hook in the user's settings
//!: locate the binary on PATH, parse-or-create
//! the settings document, register idempotently, write back atomically.

use crate::settings::{read_settings_or_default, user_settings_path, write_settings};

use super::{FixCtx, FixError, Fixer};

pub struct InstallHookFixer;

impl Fixer for InstallHookFixer {
    fn id(&self) -> &str {
        "install_hook"
    }

    fn description(&self) -> &str {
        "register the dispatcher as a PreToolUse hook in your user settings"
    }

    fn fix(&self, ctx: &FixCtx) -> Result<(), FixError> {
        let Some(binary_path) = find_on_path(ctx.binary_name) else {
            return Err(FixError::failed(
                self.id(),
                std::io::Error::new(std::io::ErrorKind::NotFound, format!("'{}' not found on PATH", ctx.binary_name)),
            ));
        };

        if ctx.interactive {
            let proceed = ctx
                .prompter
                .confirm(&format!("Register {} as a PreToolUse hook?", binary_path.display()), true)
                .map_err(|e| FixError::failed(self.id(), e))?;
            if !proceed {
                return Ok(());
            }
        }

        let path = user_settings_path();
        let mut doc = read_settings_or_default(&path).map_err(|e| FixError::failed(self.id(), e))?;
        doc.register_hook(&binary_path.to_string_lossy());
        write_settings(&path, &doc).map_err(|e| FixError::failed(self.id(), e))
    }
}

fn find_on_path(binary_name: &str) -> Option<std::path::PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).map(|dir| dir.join(binary_name)).find(|candidate| candidate.is_file())
}
