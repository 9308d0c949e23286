//! Disables rules that failed semantic validation rather than guessing at a
//! repair: each offending rule gets
//! `enabled = false` plus an idempotent marker appended to its description,
//! then the project file is rewritten atomically.

use crate::atomic::atomic_write_file;
use crate::checkers::rules::collect_issues;

use super::{FixCtx, FixError, Fixer};

const MARKER: &str = "DISABLED BY DOCTOR: fix and re-enable";

pub struct FixInvalidRulesFixer;

impl Fixer for FixInvalidRulesFixer {
    fn id(&self) -> &str {
        "fix_invalid_rules"
    }

    fn description(&self) -> &str {
        "disable rules that fail semantic validation until they're fixed by hand"
    }

    fn fix(&self, ctx: &FixCtx) -> Result<(), FixError> {
        let (mut config, path) = ctx.config_loader.load_project_config_only().map_err(|e| FixError::failed(self.id(), e))?;
        let issues = collect_issues(&config);
        if issues.is_empty() {
            return Ok(());
        }

        if ctx.interactive {
            let proceed = ctx
                .prompter
                .confirm(&format!("Disable {} invalid rule(s) in {}?", issues.len(), path.display()), true)
                .map_err(|e| FixError::failed(self.id(), e))?;
            if !proceed {
                return Ok(());
            }
        }

        for issue in &issues {
            let Some(rule) = config.rules.get_mut(issue.rule_index) else { continue };
            rule.enabled = Some(false);
            if !rule.description.contains(MARKER) {
                if rule.description.is_empty() {
                    rule.description = MARKER.to_string();
                } else {
                    rule.description = format!("{} [{MARKER}]", rule.description);
                }
            }
        }

        let contents = toml::to_string_pretty(&config).map_err(|e| FixError::failed(self.id(), std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        atomic_write_file(&path, contents.as_bytes(), true).map_err(|e| FixError::failed(self.id(), e))
    }
}
