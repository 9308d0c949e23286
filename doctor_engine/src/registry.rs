//! Process-wide but explicitly constructed store mapping category → checkers
//! and fix-id → fixer.
//!
//! Construction happens at startup (single-threaded); the registry is then
//! frozen and read concurrently by the execution engine. The `RwLock`
//! around each map enforces shared reads during execution and exclusive
//! access during registration as an invariant, not just an assumption —
//! registration always finishes before the first run in practice.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::checkers::HealthChecker;
use crate::fixers::Fixer;
use crate::result::Category;

/// Checkers are stored behind `Arc`: `checkers()` and
/// `checkers_for_categories()` hand out checkers to the execution engine
/// after the read lock has been released (the engine fans them out across
/// threads), so the return value must outlive the guard. Cloning an `Arc`
/// under the read lock does that; returning `&dyn HealthChecker` borrowed
/// through a `RwLockReadGuard` does not, since the guard is a local that
/// drops at the end of these methods. Fixers are invoked only through
/// `with_fixer` while the guard is still held, so they don't need `Arc` for
/// that reason — but they're stored behind one anyway, since a fixer
/// covering more than one fix-id (`owned_ids()`) is registered once under
/// each id and those map entries must share the same instance.
pub struct Registry {
    checkers: RwLock<HashMap<Category, Vec<Arc<dyn HealthChecker>>>>,
    fixers: RwLock<HashMap<String, Arc<dyn Fixer>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            checkers: RwLock::new(HashMap::new()),
            fixers: RwLock::new(HashMap::new()),
        }
    }

    /// Appends to the checker's category list, preserving registration
    /// order within the category.
    pub fn register_checker(&self, checker: Arc<dyn HealthChecker>) {
        let category = checker.category();
        let mut guard = self.checkers.write().expect("registry poisoned");
        guard.entry(category).or_default().push(checker);
    }

    /// Registers `fixer` under every id in its `owned_ids()` (almost always
    /// just `id()`; a fixer covering more than one fix-id, like `XdgFixer`,
    /// overrides `owned_ids()` so both ids resolve to the same instance).
    /// Overwrites any existing fixer registered under the same id — last
    /// registration wins, but callers must not rely on which one that is.
    pub fn register_fixer(&self, fixer: Box<dyn Fixer>) {
        let fixer: Arc<dyn Fixer> = Arc::from(fixer);
        let mut guard = self.fixers.write().expect("registry poisoned");
        for id in fixer.owned_ids() {
            guard.insert(id.to_string(), Arc::clone(&fixer));
        }
    }

    /// All checkers across all categories, in category-then-registration
    /// order. Category iteration order here is arbitrary (`HashMap`); callers
    /// that care about a stable on-screen order should sort the resulting
    /// `CheckResult`s by category,
    /// not rely on this method's ordering.
    pub fn checkers(&self) -> Vec<Arc<dyn HealthChecker>> {
        let guard = self.checkers.read().expect("registry poisoned");
        let mut out = Vec::new();
        for (_, list) in guard.iter() {
            for checker in list.iter() {
                out.push(Arc::clone(checker));
            }
        }
        out
    }

    /// Checkers restricted to the given categories; an empty or absent
    /// filter means "all".
    pub fn checkers_for_categories(&self, categories: &[Category]) -> Vec<Arc<dyn HealthChecker>> {
        if categories.is_empty() {
            return self.checkers();
        }
        let guard = self.checkers.read().expect("registry poisoned");
        let mut out = Vec::new();
        for category in categories {
            if let Some(list) = guard.get(category) {
                for checker in list.iter() {
                    out.push(Arc::clone(checker));
                }
            }
        }
        out
    }

    /// Looks up a fixer by id and invokes `f` with it while the registry's
    /// read lock is held, returning `None` if no fixer owns `id`.
    pub fn with_fixer<R>(&self, id: &str, f: impl FnOnce(&dyn Fixer) -> R) -> Option<R> {
        let guard = self.fixers.read().expect("registry poisoned");
        guard.get(id).map(|fixer| f(fixer.as_ref()))
    }

    /// Defensive copy of all registered fix-ids.
    pub fn fixer_ids(&self) -> Vec<String> {
        let guard = self.fixers.read().expect("registry poisoned");
        guard.keys().cloned().collect()
    }

    /// All distinct categories with at least one registered checker.
    pub fn categories(&self) -> Vec<Category> {
        let guard = self.checkers.read().expect("registry poisoned");
        guard.keys().cloned().collect()
    }
}
