//! The tagged result model: `Status`, `Severity`, `Category`, and `CheckResult`.
//!
//! Mirrors the teacher's `types.rs` shape (a plain-data record with derived
//! predicates and a `to_json` rendering) but replaces the SQL-diagnostic
//! fields (rule_id, line, column, snippet) with the doctor's flatter
//! name/message/details/fix-id shape from spec.md §3.

use serde::{Deserialize, Serialize};

/// Severity of a failing (or passing) check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Outcome of running a single checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
    Skipped,
}

/// Opaque grouping tag. The core defines six well-known categories; callers
/// may register checkers under any other string, which sorts after the
/// known ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    pub const BINARY: &'static str = "Binary";
    pub const HOOK: &'static str = "Hook";
    pub const CONFIG: &'static str = "Config";
    pub const TOOLS: &'static str = "Tools";
    pub const XDG: &'static str = "XDG";
    pub const OVERRIDES: &'static str = "Overrides";

    /// The declared display order from spec.md §4.10. Anything not in this
    /// list sorts after it, alphabetically.
    const KNOWN_ORDER: &'static [&'static str] = &[
        Self::BINARY,
        Self::HOOK,
        Self::CONFIG,
        Self::TOOLS,
        Self::XDG,
        Self::OVERRIDES,
    ];

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rank used to sort categories into the declared display order; unknown
    /// categories all share the "after known ones" rank and then tie-break
    /// on name.
    fn rank(&self) -> usize {
        Self::KNOWN_ORDER
            .iter()
            .position(|k| *k == self.0)
            .unwrap_or(Self::KNOWN_ORDER.len())
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank()).then_with(|| self.0.cmp(&other.0))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Opaque identifier linking a failing result to the fixer that can remediate it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixId(String);

impl FixId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FixId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable record of a single checker's outcome.
///
/// Constructed via the named factories (`pass`, `fail_error`, `fail_warning`,
/// `skip`); augmented via `with_details`/`with_fix_id`, each of which
/// consumes `self` and returns a new value — there is no in-place mutation,
/// matching the "results are value types" invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    /// Stamped by the engine after the checker returns; checkers must not
    /// be trusted to fill this themselves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub status: Status,
    pub severity: Severity,
    pub message: String,
    pub details: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_id: Option<FixId>,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            status: Status::Pass,
            severity: Severity::Info,
            message: message.into(),
            details: Vec::new(),
            fix_id: None,
        }
    }

    pub fn skip(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            status: Status::Skipped,
            severity: Severity::Info,
            message: message.into(),
            details: Vec::new(),
            fix_id: None,
        }
    }

    pub fn fail_error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            status: Status::Fail,
            severity: Severity::Error,
            message: message.into(),
            details: Vec::new(),
            fix_id: None,
        }
    }

    pub fn fail_warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            status: Status::Fail,
            severity: Severity::Warning,
            message: message.into(),
            details: Vec::new(),
            fix_id: None,
        }
    }

    /// A Fail result at arbitrary severity, for checkers whose severity is
    /// data-driven.
    pub fn fail(name: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            status: Status::Fail,
            severity,
            message: message.into(),
            details: Vec::new(),
            fix_id: None,
        }
    }

    /// Appends to `details`.
    pub fn with_details(mut self, details: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.details.extend(details.into_iter().map(Into::into));
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    /// Stamps `category`, overwriting whatever the checker itself set (or
    /// didn't). Used by the execution engine only — checkers must not call
    /// this themselves.
    pub(crate) fn stamp_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets `fix_id`. Only meaningful on `Fail` results; set only when a
    /// registered fixer is known to exist — the
    /// caller is responsible for that invariant, not this setter.
    pub fn with_fix_id(mut self, id: impl Into<String>) -> Self {
        self.fix_id = Some(FixId::new(id));
        self
    }

    pub fn is_passed(&self) -> bool {
        self.status == Status::Pass
    }

    pub fn is_skipped(&self) -> bool {
        self.status == Status::Skipped
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Fail && self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.status == Status::Fail && self.severity == Severity::Warning
    }

    pub fn has_fix(&self) -> bool {
        self.fix_id.is_some()
    }

    /// Sort rank within a category: Error < Warning < Pass < Skipped
    ///. `Fail`+`Info` (used by some optional-tool checks)
    /// sorts alongside warnings, ahead of passes.
    pub(crate) fn severity_rank(&self) -> u8 {
        match (self.status, self.severity) {
            (Status::Fail, Severity::Error) => 0,
            (Status::Fail, Severity::Warning) => 1,
            (Status::Fail, Severity::Info) => 1,
            (Status::Pass, _) => 2,
            (Status::Skipped, _) => 3,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_has_info_severity_and_no_fix() {
        let r = CheckResult::pass("binary_presence", "found on PATH");
        assert!(r.is_passed());
        assert_eq!(r.severity, Severity::Info);
        assert!(!r.has_fix());
    }

    #[test]
    fn skip_has_info_severity_and_no_fix() {
        let r = CheckResult::skip("project_config", "no project config present");
        assert!(r.is_skipped());
        assert_eq!(r.severity, Severity::Info);
        assert!(!r.has_fix());
    }

    #[test]
    fn fail_error_is_error_not_warning() {
        let r = CheckResult::fail_error("binary_presence", "not found").with_fix_id("install_binary");
        assert!(r.is_error());
        assert!(!r.is_warning());
        assert!(r.has_fix());
    }

    #[test]
    fn fail_warning_is_warning_not_error() {
        let r = CheckResult::fail_warning("binary_permissions", "0644, expected 0755");
        assert!(r.is_warning());
        assert!(!r.is_error());
    }

    #[test]
    fn details_append_in_order() {
        let r = CheckResult::fail_error("x", "y")
            .with_detail("first")
            .with_details(vec!["second", "third"]);
        assert_eq!(r.details, vec!["first", "second", "third"]);
    }

    #[test]
    fn category_known_order() {
        let mut cats = vec![
            Category::new(Category::OVERRIDES),
            Category::new(Category::BINARY),
            Category::new("Zzz-unknown"),
            Category::new(Category::HOOK),
        ];
        cats.sort();
        assert_eq!(
            cats,
            vec![
                Category::new(Category::BINARY),
                Category::new(Category::HOOK),
                Category::new(Category::OVERRIDES),
                Category::new("Zzz-unknown"),
            ]
        );
    }

    #[test]
    fn severity_rank_orders_error_before_warning_before_pass_before_skipped() {
        let error = CheckResult::fail_error("a", "m");
        let warning = CheckResult::fail_warning("b", "m");
        let pass = CheckResult::pass("c", "m");
        let skipped = CheckResult::skip("d", "m");
        assert!(error.severity_rank() < warning.severity_rank());
        assert!(warning.severity_rank() < pass.severity_rank());
        assert!(pass.severity_rank() < skipped.severity_rank());
    }
}
