//! Fix-and-recheck orchestration: run checks, report, decide
//! whether and how to fix, re-run, re-report.

use thiserror::Error;

use crate::ctx::Ctx;
use crate::external::{ConfigLoader, GitRunner, Prompter};
use crate::fixers::{FixCtx, Fixer};
use crate::registry::Registry;
use crate::reporter::{DiagnosisSummary, Reporter, StreamingReporter};
use crate::result::{Category, CheckResult};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("health checks failed")]
    HealthChecksFailed,
    #[error("fixer '{fixer}' failed: {source}")]
    FixFailed {
        fixer: String,
        #[source]
        source: crate::fixers::FixError,
    },
}

/// How discovered fixable results should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixMode {
    /// Apply every fixable result's fixer without prompting; the first
    /// failure aborts the run.
    AutoFix,
    /// Apply fixers one at a time, letting each fixer's own prompter
    /// interaction decide whether to proceed.
    Interactive,
    /// Print each fixable result's fixer description; mutate nothing.
    Suggest,
}

impl FixMode {
    pub fn from_flags(auto_fix: bool, interactive: bool) -> Self {
        if auto_fix {
            FixMode::AutoFix
        } else if interactive {
            FixMode::Interactive
        } else {
            FixMode::Suggest
        }
    }
}

/// Which reporter flavor to drive the run with — chosen statically by the
/// caller rather than probed at runtime.
#[derive(Clone, Copy)]
pub enum ReporterKind<'a> {
    Batch(&'a dyn Reporter),
    Streaming(&'a dyn StreamingReporter),
}

pub struct RunOptions<'a> {
    pub verbose: bool,
    pub fix_mode: FixMode,
    pub categories: Vec<Category>,
    pub prompter: &'a dyn Prompter,
    pub config_loader: &'a dyn ConfigLoader,
    pub git_runner: &'a dyn GitRunner,
    pub app_name: &'a str,
    pub binary_name: &'a str,
}

/// Runs the full diagnose → report → fix → recheck → report loop and
/// returns the process exit code. `RunnerError` is
/// reserved for fixer failures under `AutoFix`; a clean run with remaining
/// errors is not an `Err` — it's reflected in the returned exit code.
pub fn run(registry: &Registry, ctx: &Ctx, reporter: ReporterKind, options: &RunOptions) -> Result<i32, RunnerError> {
    let mut results = match reporter {
        ReporterKind::Batch(reporter) => {
            let checkers = registry.checkers_for_categories(&options.categories);
            let results = crate::engine::run(&checkers, ctx);
            reporter.report(&results, options.verbose);
            results
        }
        ReporterKind::Streaming(reporter) => reporter.run_and_report(ctx, registry, options.verbose, &options.categories),
    };

    let fixable: Vec<&CheckResult> = results.iter().filter(|r| r.is_error() && r.has_fix()).collect();
    if fixable.is_empty() {
        return Ok(DiagnosisSummary::from_results(&results).determine_exit_code());
    }

    match options.fix_mode {
        FixMode::Suggest => {
            for result in &fixable {
                if let Some(fix_id) = &result.fix_id {
                    let description = registry.with_fixer(fix_id.as_str(), |fixer| fixer.description().to_string());
                    if let Some(description) = description {
                        println!("{}: {description} (run with --fix to apply)", result.name);
                    }
                }
            }
            return Ok(DiagnosisSummary::from_results(&results).determine_exit_code());
        }
        FixMode::AutoFix | FixMode::Interactive => {
            let interactive = options.fix_mode == FixMode::Interactive;
            let fix_ids: Vec<String> = fixable.iter().filter_map(|r| r.fix_id.as_ref().map(|f| f.as_str().to_string())).collect();

            for fix_id in fix_ids {
                let fix_ctx = FixCtx {
                    ctx,
                    interactive,
                    prompter: options.prompter,
                    config_loader: options.config_loader,
                    git_runner: options.git_runner,
                    app_name: options.app_name,
                    binary_name: options.binary_name,
                };
                let outcome = registry.with_fixer(&fix_id, |fixer: &dyn Fixer| fixer.fix(&fix_ctx));
                match outcome {
                    Some(Ok(())) => {}
                    Some(Err(source)) => {
                        if options.fix_mode == FixMode::AutoFix {
                            return Err(RunnerError::FixFailed { fixer: fix_id, source });
                        }
                    }
                    None => {}
                }
            }

            // Re-run every registered checker, ignoring the category filter,
            // since a fix may have changed state a filtered-out checker
            // would have reported on.
            let all_checkers = registry.checkers();
            let rerun = crate::engine::run(&all_checkers, ctx);
            results = merge_rerun(results, rerun);

            match reporter {
                ReporterKind::Batch(reporter) => reporter.report(&results, options.verbose),
                ReporterKind::Streaming(reporter) => reporter.report(&results, options.verbose),
            }
        }
    }

    Ok(DiagnosisSummary::from_results(&results).determine_exit_code())
}

/// Replaces each original result with its rerun counterpart by name when
/// one exists; originals with no rerun counterpart (filtered out of the
/// original category-restricted run) are dropped, since the rerun is
/// authoritative for the fixed state.
fn merge_rerun(original: Vec<CheckResult>, rerun: Vec<CheckResult>) -> Vec<CheckResult> {
    original
        .into_iter()
        .filter_map(|orig| rerun.iter().find(|r| r.name == orig.name).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::HealthChecker;
    use crate::config::WardenConfig;
    use crate::external::{ConfigLoaderError, NonInteractivePrompter};
    use crate::fixers::FixError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct NullGit;
    impl GitRunner for NullGit {
        fn is_inside_repo(&self, _path: &std::path::Path) -> bool {
            false
        }
    }

    struct NullLoader;
    impl ConfigLoader for NullLoader {
        fn has_global_config(&self) -> bool {
            false
        }
        fn has_project_config(&self) -> bool {
            false
        }
        fn global_config_path(&self) -> std::path::PathBuf {
            std::path::PathBuf::new()
        }
        fn project_config_paths(&self) -> Vec<std::path::PathBuf> {
            vec![]
        }
        fn load(&self) -> Result<WardenConfig, ConfigLoaderError> {
            Ok(WardenConfig::default())
        }
        fn load_without_validation(&self) -> Result<WardenConfig, ConfigLoaderError> {
            Ok(WardenConfig::default())
        }
        fn load_project_config_only(&self) -> Result<(WardenConfig, std::path::PathBuf), ConfigLoaderError> {
            Err(ConfigLoaderError::ConfigNotFound("none".into()))
        }
    }

    struct NullReporter;
    impl Reporter for NullReporter {
        fn report(&self, _results: &[CheckResult], _verbose: bool) {}
    }

    struct FailingThenPassingChecker {
        fixed: Arc<std::sync::atomic::AtomicBool>,
    }
    impl HealthChecker for FailingThenPassingChecker {
        fn name(&self) -> &str {
            "flaky"
        }
        fn category(&self) -> Category {
            Category::new(Category::BINARY)
        }
        fn check(&self, _ctx: &Ctx) -> CheckResult {
            if self.fixed.load(Ordering::SeqCst) {
                CheckResult::pass(self.name(), "now fine")
            } else {
                CheckResult::fail_error(self.name(), "broken").with_fix_id("test_fix")
            }
        }
    }

    struct FlipsFlagFixer {
        fixed: Arc<std::sync::atomic::AtomicBool>,
        calls: Arc<AtomicUsize>,
    }
    impl Fixer for FlipsFlagFixer {
        fn id(&self) -> &str {
            "test_fix"
        }
        fn description(&self) -> &str {
            "flip the flag"
        }
        fn fix(&self, _ctx: &FixCtx) -> Result<(), FixError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.fixed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn suggest_mode_does_not_mutate_or_change_exit_code() {
        let fixed = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let registry = Registry::new();
        registry.register_checker(Arc::new(FailingThenPassingChecker { fixed: fixed.clone() }));
        registry.register_fixer(Box::new(FlipsFlagFixer { fixed: fixed.clone(), calls: Arc::new(AtomicUsize::new(0)) }));

        let reporter = NullReporter;
        let prompter = NonInteractivePrompter;
        let loader = NullLoader;
        let git = NullGit;
        let options = RunOptions {
            verbose: false,
            fix_mode: FixMode::Suggest,
            categories: vec![],
            prompter: &prompter,
            config_loader: &loader,
            git_runner: &git,
            app_name: "warden",
            binary_name: "warden",
        };
        let code = run(&registry, &Ctx::new(), ReporterKind::Batch(&reporter), &options).unwrap();
        assert_eq!(code, 1);
        assert!(!fixed.load(Ordering::SeqCst));
    }

    #[test]
    fn auto_fix_mode_applies_fixer_and_rerun_reflects_pass() {
        let fixed = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = Registry::new();
        registry.register_checker(Arc::new(FailingThenPassingChecker { fixed: fixed.clone() }));
        registry.register_fixer(Box::new(FlipsFlagFixer { fixed: fixed.clone(), calls: calls.clone() }));

        let reporter = NullReporter;
        let prompter = NonInteractivePrompter;
        let loader = NullLoader;
        let git = NullGit;
        let options = RunOptions {
            verbose: false,
            fix_mode: FixMode::AutoFix,
            categories: vec![],
            prompter: &prompter,
            config_loader: &loader,
            git_runner: &git,
            app_name: "warden",
            binary_name: "warden",
        };
        let code = run(&registry, &Ctx::new(), ReporterKind::Batch(&reporter), &options).unwrap();
        assert_eq!(code, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_fixable_results_skips_fix_phase_entirely() {
        struct AlwaysPass;
        impl HealthChecker for AlwaysPass {
            fn name(&self) -> &str {
                "always_pass"
            }
            fn category(&self) -> Category {
                Category::new(Category::BINARY)
            }
            fn check(&self, _ctx: &Ctx) -> CheckResult {
                CheckResult::pass(self.name(), "ok")
            }
        }
        let registry = Registry::new();
        registry.register_checker(Arc::new(AlwaysPass));

        let reporter = NullReporter;
        let prompter = NonInteractivePrompter;
        let loader = NullLoader;
        let git = NullGit;
        let options = RunOptions {
            verbose: false,
            fix_mode: FixMode::AutoFix,
            categories: vec![],
            prompter: &prompter,
            config_loader: &loader,
            git_runner: &git,
            app_name: "warden",
            binary_name: "warden",
        };
        let code = run(&registry, &Ctx::new(), ReporterKind::Batch(&reporter), &options).unwrap();
        assert_eq!(code, 0);
    }
}
