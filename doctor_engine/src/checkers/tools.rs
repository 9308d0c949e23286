//! Optional-tool presence checker: one instance per entry
//! in `config.optional_tools`, severity driven by the tool's own
//! `critical` flag rather than fixed at the type level.

use crate::config::OptionalTool;
use crate::ctx::Ctx;
use crate::result::{Category, CheckResult, Severity};

use super::HealthChecker;

fn on_path(name: &str) -> bool {
    let Some(path_var) = std::env::var_os("PATH") else { return false };
    std::env::split_paths(&path_var).any(|dir| dir.join(name).is_file())
}

pub struct OptionalToolChecker {
    tool: OptionalTool,
}

impl OptionalToolChecker {
    pub fn new(tool: OptionalTool) -> Self {
        Self { tool }
    }
}

impl HealthChecker for OptionalToolChecker {
    fn name(&self) -> &str {
        &self.tool.name
    }

    fn category(&self) -> Category {
        Category::new(Category::TOOLS)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        if on_path(&self.tool.name) {
            return CheckResult::pass(self.name(), format!("'{}' found on PATH", self.tool.name));
        }
        if let Some(found) = self.tool.alternatives.iter().find(|alt| on_path(alt)) {
            return CheckResult::pass(
                self.name(),
                format!("'{}' not found, but alternative '{found}' is available", self.tool.name),
            );
        }

        let severity = if self.tool.critical { Severity::Warning } else { Severity::Info };
        let mut result = CheckResult::fail(self.name(), severity, format!("'{}' not found on PATH", self.tool.name));
        if !self.tool.alternatives.is_empty() {
            result = result.with_detail(format!("alternatives considered: {}", self.tool.alternatives.join(", ")));
        }
        result
    }
}
