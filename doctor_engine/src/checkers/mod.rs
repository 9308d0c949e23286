//! `HealthChecker` trait definition and the built-in checker registry.
//!
//! Every checker implements the [`HealthChecker`] trait. Checkers are
//! stateless — a checker's category is fixed at construction, and `check` receives a cancellation
//! context plus whatever collaborators it needs rather than holding state.

pub mod binary;
pub mod config_checks;
pub mod overrides;
pub mod rules;
pub mod tools;
pub mod xdg_checks;

use std::sync::Arc;

use crate::ctx::Ctx;
use crate::result::{Category, CheckResult};

/// Every checker implements this trait. Implementations must be
/// concurrency-safe and
/// must not block indefinitely — they cooperatively observe `ctx`.
pub trait HealthChecker: Send + Sync {
    /// Human-readable check label.
    fn name(&self) -> &str;

    /// Category this checker belongs to, fixed at construction. The engine
    /// stamps this onto the returned result after `check` returns; checkers
    /// must not rely on setting it themselves.
    fn category(&self) -> Category;

    /// Inspect one aspect of the environment and return exactly one result
    /// describing the single most important observation.
    fn check(&self, ctx: &Ctx) -> CheckResult;
}

/// Construct the full set of built-in checkers, grouped as
/// `(category, checkers)` pairs in the order they should be registered.
/// Mirrors the teacher's `build_checker_registry()` shape, generalized from
/// a flat `Vec<Box<dyn Checker>>` to the doctor's category-partitioned
/// registration.
pub fn build_default_checkers(
    config: &crate::config::WardenConfig,
) -> Vec<Arc<dyn HealthChecker>> {
    let mut checkers: Vec<Arc<dyn HealthChecker>> = Vec::new();

    checkers.push(Arc::new(binary::BinaryPresenceChecker::new(config.binary_name.clone())));
    checkers.push(Arc::new(binary::BinaryPermissionsChecker::new(config.binary_name.clone())));
    checkers.push(Arc::new(binary::BinaryLocationChecker::new(config.binary_name.clone())));

    checkers.push(Arc::new(config_checks::HookRegistrationChecker::user(
        config.binary_name.clone(),
    )));
    checkers.push(Arc::new(config_checks::HookRegistrationChecker::project(
        config.binary_name.clone(),
    )));
    checkers.push(Arc::new(config_checks::HookRegistrationChecker::project_local(
        config.binary_name.clone(),
    )));
    checkers.push(Arc::new(config_checks::PreToolHookPresentChecker::user()));
    checkers.push(Arc::new(config_checks::DispatcherPathValidChecker::new(
        config.binary_name.clone(),
    )));

    checkers.push(Arc::new(config_checks::GlobalConfigChecker::new()));
    checkers.push(Arc::new(config_checks::ProjectConfigChecker::new()));
    checkers.push(Arc::new(config_checks::ConfigPermissionsChecker::new()));

    checkers.push(Arc::new(xdg_checks::XdgMigrationStatusChecker::new(
        config.app_name.clone(),
    )));
    checkers.push(Arc::new(xdg_checks::XdgDirectoriesChecker::new(
        config.app_name.clone(),
    )));

    checkers.push(Arc::new(rules::RulesValidationChecker::new()));
    checkers.push(Arc::new(overrides::OverrideTargetsChecker::new()));

    for tool in &config.optional_tools {
        checkers.push(Arc::new(tools::OptionalToolChecker::new(tool.clone())));
    }

    checkers
}
