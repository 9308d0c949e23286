//! Override-targets checker: expired / unknown / redundant / malformed
//! path overrides.
//!
//! Grounded in the teacher's `config.rs::PerPathOverride` + per-path glob
//! matching (`globset::Glob`) — the doctor's `PathOverride` is the same
//! "glob → rule" shape, minus the severity map (the doctor's overrides are
//! enable/disable, not severity tiers), plus an `expires` field this
//! checker is built around. `globset::Glob::new` also validates each
//! entry's pattern syntax, the same call the teacher uses to compile a
//! `PerPathOverride`'s glob before matching it against discovered files.

use chrono::NaiveDate;

use crate::config::{PathOverride, WardenConfig};
use crate::ctx::Ctx;
use crate::external::ConfigLoader;
use crate::result::{Category, CheckResult, Severity};

use super::HealthChecker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideIssueType {
    Expired,
    UnknownRule,
    Redundant,
    InvalidGlobSyntax,
}

#[derive(Debug, Clone)]
pub struct OverrideIssue {
    pub override_index: usize,
    pub issue_type: OverrideIssueType,
    pub message: String,
}

/// Walks `config.overrides` and flags expired entries, entries referencing
/// a rule that doesn't exist, and entries that are redundant with the
/// parent rule's own enabled state (spec.md §4.4, §4.5 `overrides_fixer`:
/// "removes expired entries and code-level entries that are redundant
/// (parent validator entry active with same disabled state)").
pub fn collect_issues(config: &WardenConfig, today: NaiveDate) -> Vec<OverrideIssue> {
    let mut issues = Vec::new();
    for (index, entry) in config.overrides.iter().enumerate() {
        if globset::Glob::new(&entry.path_glob).is_err() {
            issues.push(OverrideIssue {
                override_index: index,
                issue_type: OverrideIssueType::InvalidGlobSyntax,
                message: format!("override pattern '{}' is not a valid glob", entry.path_glob),
            });
            continue;
        }
        if let Some(issue) = expired_issue(index, entry, today) {
            issues.push(issue);
            continue;
        }
        let Some(rule) = config.rules.iter().find(|r| r.name == entry.rule) else {
            issues.push(OverrideIssue {
                override_index: index,
                issue_type: OverrideIssueType::UnknownRule,
                message: format!("override for '{}' references unknown rule '{}'", entry.path_glob, entry.rule),
            });
            continue;
        };
        // Redundant: the rule already sits in the state the override would
        // force it into, so the override changes nothing.
        if rule.is_enabled() == !entry.disabled {
            issues.push(OverrideIssue {
                override_index: index,
                issue_type: OverrideIssueType::Redundant,
                message: format!(
                    "override for '{}' on rule '{}' is redundant — rule is already {}",
                    entry.path_glob,
                    entry.rule,
                    if rule.is_enabled() { "enabled" } else { "disabled" }
                ),
            });
        }
    }
    issues
}

fn expired_issue(index: usize, entry: &PathOverride, today: NaiveDate) -> Option<OverrideIssue> {
    let expires = entry.expires.as_ref()?;
    let date = NaiveDate::parse_from_str(expires, "%Y-%m-%d").ok()?;
    if date < today {
        Some(OverrideIssue {
            override_index: index,
            issue_type: OverrideIssueType::Expired,
            message: format!("override for '{}' on rule '{}' expired on {expires}", entry.path_glob, entry.rule),
        })
    } else {
        None
    }
}

pub struct OverrideTargetsChecker;

impl OverrideTargetsChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OverrideTargetsChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthChecker for OverrideTargetsChecker {
    fn name(&self) -> &str {
        "override_targets"
    }

    fn category(&self) -> Category {
        Category::new(Category::OVERRIDES)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        let loader = crate::config::TomlConfigLoader::new("warden", std::env::current_dir().unwrap_or_default());
        if !loader.has_project_config() {
            return CheckResult::skip(self.name(), "no project configuration present");
        }
        let config = match loader.load_without_validation() {
            Ok(config) => config,
            Err(e) => return CheckResult::fail_error(self.name(), format!("could not load project configuration: {e}")),
        };
        if config.overrides.is_empty() {
            return CheckResult::pass(self.name(), "no path overrides configured");
        }

        let today = chrono::Local::now().date_naive();
        let issues = collect_issues(&config, today);
        if issues.is_empty() {
            return CheckResult::pass(self.name(), "all overrides reference known, active, non-expired rules");
        }

        let has_unknown = issues
            .iter()
            .any(|i| matches!(i.issue_type, OverrideIssueType::UnknownRule | OverrideIssueType::InvalidGlobSyntax));
        let has_fixable = issues.iter().any(|i| {
            matches!(i.issue_type, OverrideIssueType::Expired | OverrideIssueType::Redundant)
        });
        let details: Vec<String> = issues.iter().map(|i| i.message.clone()).collect();

        let severity = if has_unknown { Severity::Error } else { Severity::Warning };
        let mut result = CheckResult::fail(
            self.name(),
            severity,
            format!("{} override(s) need attention", issues.len()),
        )
        .with_details(details);
        if has_fixable {
            result = result.with_fix_id("overrides_fixer");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatchSection, Rule};

    fn rule(name: &str, enabled: bool) -> Rule {
        Rule {
            name: name.to_string(),
            enabled: Some(enabled),
            match_section: Some(MatchSection { event: Some("PreToolUse".into()), tool: Some("Bash".into()) }),
            action: Some("allow".into()),
            description: String::new(),
        }
    }

    fn over(path: &str, rule: &str, disabled: bool, expires: Option<&str>) -> PathOverride {
        PathOverride {
            path_glob: path.to_string(),
            rule: rule.to_string(),
            disabled,
            expires: expires.map(String::from),
        }
    }

    #[test]
    fn expired_override_is_flagged() {
        let config = WardenConfig {
            rules: vec![rule("a", true)],
            overrides: vec![over("src/**", "a", true, Some("2020-01-01"))],
            ..WardenConfig::default()
        };
        let issues = collect_issues(&config, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(issues[0].issue_type, OverrideIssueType::Expired);
    }

    #[test]
    fn future_expiry_is_not_flagged_as_expired() {
        let config = WardenConfig {
            rules: vec![rule("a", true)],
            overrides: vec![over("src/**", "a", true, Some("2099-01-01"))],
            ..WardenConfig::default()
        };
        let issues = collect_issues(&config, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert!(issues.is_empty());
    }

    #[test]
    fn malformed_glob_is_flagged_before_other_checks() {
        let config = WardenConfig {
            rules: vec![],
            overrides: vec![over("src/[unterminated", "ghost", true, None)],
            ..WardenConfig::default()
        };
        let issues = collect_issues(&config, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, OverrideIssueType::InvalidGlobSyntax);
    }

    #[test]
    fn unknown_rule_reference_is_flagged() {
        let config = WardenConfig {
            rules: vec![],
            overrides: vec![over("src/**", "ghost", true, None)],
            ..WardenConfig::default()
        };
        let issues = collect_issues(&config, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(issues[0].issue_type, OverrideIssueType::UnknownRule);
    }

    #[test]
    fn redundant_when_rule_already_matches_override_intent() {
        let config = WardenConfig {
            rules: vec![rule("a", false)],
            overrides: vec![over("src/**", "a", true, None)],
            ..WardenConfig::default()
        };
        let issues = collect_issues(&config, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(issues[0].issue_type, OverrideIssueType::Redundant);
    }

    #[test]
    fn not_redundant_when_override_actually_changes_state() {
        let config = WardenConfig {
            rules: vec![rule("a", true)],
            overrides: vec![over("src/**", "a", true, None)],
            ..WardenConfig::default()
        };
        let issues = collect_issues(&config, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert!(issues.is_empty());
    }
}
