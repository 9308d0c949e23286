//! Removes expired and redundant path overrides. Unknown-rule overrides are left alone — deleting a
//! reference to a rule that may simply not have loaded yet is not this
//! fixer's call to make, so only `Expired`/`Redundant` issues are acted on.

use crate::atomic::atomic_write_file;
use crate::checkers::overrides::{collect_issues, OverrideIssueType};

use super::{FixCtx, FixError, Fixer};

pub struct OverridesFixer;

impl Fixer for OverridesFixer {
    fn id(&self) -> &str {
        "overrides_fixer"
    }

    fn description(&self) -> &str {
        "remove expired and redundant path overrides"
    }

    fn fix(&self, ctx: &FixCtx) -> Result<(), FixError> {
        let (mut config, path) = ctx.config_loader.load_project_config_only().map_err(|e| FixError::failed(self.id(), e))?;
        let today = chrono::Local::now().date_naive();
        let issues = collect_issues(&config, today);
        let to_remove: Vec<usize> = issues
            .iter()
            .filter(|i| matches!(i.issue_type, OverrideIssueType::Expired | OverrideIssueType::Redundant))
            .map(|i| i.override_index)
            .collect();
        if to_remove.is_empty() {
            return Ok(());
        }

        if ctx.interactive {
            let proceed = ctx
                .prompter
                .confirm(&format!("Remove {} expired/redundant override(s) from {}?", to_remove.len(), path.display()), true)
                .map_err(|e| FixError::failed(self.id(), e))?;
            if !proceed {
                return Ok(());
            }
        }

        let mut index = 0;
        config.overrides.retain(|_| {
            let keep = !to_remove.contains(&index);
            index += 1;
            keep
        });

        let contents = toml::to_string_pretty(&config).map_err(|e| FixError::failed(self.id(), std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        atomic_write_file(&path, contents.as_bytes(), true).map_err(|e| FixError::failed(self.id(), e))
    }
}
