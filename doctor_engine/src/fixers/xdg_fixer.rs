//! Runs the XDG migration and/or (re-)creates the XDG base directories
//!. One fixer owns both
//! fix-ids since they operate on the same `xdg` module and are frequently
//! needed together (a fresh migration still wants the base dirs present).

use crate::xdg;

use super::{FixCtx, FixError, Fixer};

pub struct XdgFixer;

impl Fixer for XdgFixer {
    fn id(&self) -> &str {
        "migrate_xdg"
    }

    fn description(&self) -> &str {
        "migrate the legacy layout to XDG base directories and ensure they exist"
    }

    fn owned_ids(&self) -> Vec<&str> {
        vec!["migrate_xdg", "create_xdg_dirs"]
    }

    fn can_fix(&self, result: &crate::result::CheckResult) -> bool {
        matches!(result.fix_id.as_ref().map(|f| f.as_str()), Some("migrate_xdg") | Some("create_xdg_dirs"))
    }

    fn fix(&self, ctx: &FixCtx) -> Result<(), FixError> {
        if ctx.interactive {
            let proceed = ctx
                .prompter
                .confirm(&format!("Migrate {} to the XDG layout and ensure base directories exist?", ctx.app_name), true)
                .map_err(|e| FixError::failed(self.id(), e))?;
            if !proceed {
                return Ok(());
            }
        }

        xdg::migrate(ctx.app_name).map_err(|e| FixError::failed(self.id(), e))?;

        let paths = xdg::resolve(ctx.app_name);
        for dir in [&paths.config_home, &paths.data_home, &paths.state_home, &paths.cache_home] {
            xdg::ensure_dir(dir).map_err(|e| FixError::failed(self.id(), e))?;
        }
        Ok(())
    }
}
