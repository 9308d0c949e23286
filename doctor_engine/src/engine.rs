//! Execution engine — fans checkers out concurrently and collects results
//! with stable per-checker indexing.
//!
//! `rayon::par_iter` fan-out with each dispatch wrapped in `catch_unwind`
//! so one checker's panic can't take down its peers. Each result lands at
//! the same index as its checker in the input slice.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;

use crate::checkers::HealthChecker;
use crate::ctx::Ctx;
use crate::result::CheckResult;

/// Runs every checker in `checkers` concurrently against a context derived
/// from `ctx`, returning one result per checker at the same index. A panicking checker does not cancel its peers — the engine treats
/// it as `FailError(checker.name, "internal error")`. The
/// engine imposes no timeout of its own; `ctx`'s deadline, if any, is the
/// caller's responsibility to set and the checker's to poll.
pub fn run(checkers: &[Arc<dyn HealthChecker>], ctx: &Ctx) -> Vec<CheckResult> {
    checkers
        .par_iter()
        .map(|checker| {
            let child_ctx = ctx.child();
            let outcome = catch_unwind(AssertUnwindSafe(|| checker.check(&child_ctx)));
            let result = match outcome {
                Ok(result) => result,
                Err(_) => CheckResult::fail_error(checker.name(), "internal error"),
            };
            result.stamp_category(checker.category())
        })
        .collect()
}
