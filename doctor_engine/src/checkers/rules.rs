//! Rules-validation checker.
//!
//! Loads the project config *without* enforcing validation and runs its own
//! semantic pass over each enabled rule, collecting one [`RuleIssue`] per
//! problem found. Grounded in the teacher's `config.rs` validation helpers
//! (`effective_severity_for_path`'s style of "walk the rules, check each
//! field against a lexicon"), generalized from severity-override lookups to
//! the doctor's missing/empty/invalid-value checks named in spec.md §4.4.

use std::sync::Mutex;

use crate::config::{WardenConfig, VALID_ACTIONS, VALID_EVENTS, VALID_TOOLS};
use crate::ctx::Ctx;
use crate::external::ConfigLoader;
use crate::result::{Category, CheckResult};

use super::HealthChecker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleIssueType {
    MissingMatchSection,
    EmptyMatchSection,
    InvalidEventType,
    InvalidToolType,
    InvalidActionType,
}

#[derive(Debug, Clone)]
pub struct RuleIssue {
    pub rule_index: usize,
    pub rule_name: String,
    pub issue_type: RuleIssueType,
    pub message: String,
    pub fixable: bool,
}

/// Walks every enabled rule in `config` and returns one issue per problem
/// found. Shared between the checker (which
/// loads its own config) and `fix_invalid_rules` (which loads through the
/// `ConfigLoader` collaborator passed via `FixCtx`) so both sides agree on
/// exactly what counts as an issue.
pub fn collect_issues(config: &WardenConfig) -> Vec<RuleIssue> {
    let mut issues = Vec::new();
    for (index, rule) in config.rules.iter().enumerate() {
        if !rule.is_enabled() {
            continue;
        }
        let Some(section) = &rule.match_section else {
            issues.push(RuleIssue {
                rule_index: index,
                rule_name: rule.name.clone(),
                issue_type: RuleIssueType::MissingMatchSection,
                message: format!("rule '{}' has no match section", rule.name),
                fixable: true,
            });
            continue;
        };
        if section.is_empty() {
            issues.push(RuleIssue {
                rule_index: index,
                rule_name: rule.name.clone(),
                issue_type: RuleIssueType::EmptyMatchSection,
                message: format!("rule '{}' has an empty match section", rule.name),
                fixable: true,
            });
            continue;
        }
        if let Some(event) = &section.event {
            if !VALID_EVENTS.iter().any(|v| v.eq_ignore_ascii_case(event)) {
                issues.push(RuleIssue {
                    rule_index: index,
                    rule_name: rule.name.clone(),
                    issue_type: RuleIssueType::InvalidEventType,
                    message: format!("rule '{}' references unknown event '{event}'", rule.name),
                    fixable: true,
                });
            }
        }
        if let Some(tool) = &section.tool {
            if !VALID_TOOLS.iter().any(|v| v.eq_ignore_ascii_case(tool)) {
                issues.push(RuleIssue {
                    rule_index: index,
                    rule_name: rule.name.clone(),
                    issue_type: RuleIssueType::InvalidToolType,
                    message: format!("rule '{}' references unknown tool '{tool}'", rule.name),
                    fixable: true,
                });
            }
        }
        if let Some(action) = &rule.action {
            if !VALID_ACTIONS.contains(&action.as_str()) {
                issues.push(RuleIssue {
                    rule_index: index,
                    rule_name: rule.name.clone(),
                    issue_type: RuleIssueType::InvalidActionType,
                    message: format!("rule '{}' has unknown action '{action}'", rule.name),
                    fixable: true,
                });
            }
        }
    }
    issues
}

/// Caches the last-collected issues behind a `Mutex` so `get_issues` can
/// hand them back after `check` returns (spec.md §4.4 "Exposes a post-run
/// `GetIssues()` for the corresponding fixer") without making the trait
/// itself stateful — `&self` stays `Send + Sync` and every other checker
/// remains a plain stateless value.
pub struct RulesValidationChecker {
    issues: Mutex<Vec<RuleIssue>>,
}

impl RulesValidationChecker {
    pub fn new() -> Self {
        Self { issues: Mutex::new(Vec::new()) }
    }

    /// Issues collected by the most recent `check` call, if any.
    pub fn get_issues(&self) -> Vec<RuleIssue> {
        self.issues.lock().expect("rules checker poisoned").clone()
    }
}

impl Default for RulesValidationChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthChecker for RulesValidationChecker {
    fn name(&self) -> &str {
        "rules_validation"
    }

    fn category(&self) -> Category {
        Category::new(Category::CONFIG)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        let loader = crate::config::TomlConfigLoader::new("warden", std::env::current_dir().unwrap_or_default());
        if !loader.has_project_config() {
            *self.issues.lock().expect("rules checker poisoned") = Vec::new();
            return CheckResult::skip(self.name(), "no project configuration present");
        }
        let config = match loader.load_without_validation() {
            Ok(config) => config,
            Err(e) => return CheckResult::fail_error(self.name(), format!("could not load project configuration: {e}")),
        };

        let issues = collect_issues(&config);
        *self.issues.lock().expect("rules checker poisoned") = issues.clone();

        if issues.is_empty() {
            return CheckResult::pass(self.name(), "all rules have valid match sections and fields");
        }

        let fixable = issues.iter().any(|i| i.fixable);
        let details: Vec<String> = issues.iter().map(|i| i.message.clone()).collect();
        let mut result = CheckResult::fail_error(
            self.name(),
            format!("{} rule(s) failed validation", issues.len()),
        )
        .with_details(details);
        if fixable {
            result = result.with_fix_id("fix_invalid_rules");
        }
        result
    }
}
