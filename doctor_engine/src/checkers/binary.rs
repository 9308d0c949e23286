//! Binary presence / permissions / location checkers.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::ctx::Ctx;
use crate::result::{Category, CheckResult};

use super::HealthChecker;

/// Standard install directories the binary-location checker considers
/// "standard" — not flagged with a note even though Pass either way.
const STANDARD_DIRS: &[&str] = &["/usr/local/bin", "/usr/bin", "/opt/homebrew/bin"];

fn find_on_path(binary_name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).map(|dir| dir.join(binary_name)).find(|candidate| candidate.is_file())
}

pub struct BinaryPresenceChecker {
    binary_name: String,
}

impl BinaryPresenceChecker {
    pub fn new(binary_name: String) -> Self {
        Self { binary_name }
    }
}

impl HealthChecker for BinaryPresenceChecker {
    fn name(&self) -> &str {
        "binary_presence"
    }

    fn category(&self) -> Category {
        Category::new(Category::BINARY)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        match find_on_path(&self.binary_name) {
            Some(path) => CheckResult::pass(self.name(), format!("found at {}", path.display())),
            None => CheckResult::fail_error(self.name(), format!("'{}' not found on PATH", self.binary_name))
                .with_fix_id("install_binary"),
        }
    }
}

pub struct BinaryPermissionsChecker {
    binary_name: String,
}

impl BinaryPermissionsChecker {
    pub fn new(binary_name: String) -> Self {
        Self { binary_name }
    }
}

impl HealthChecker for BinaryPermissionsChecker {
    fn name(&self) -> &str {
        "binary_permissions"
    }

    fn category(&self) -> Category {
        Category::new(Category::BINARY)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        let Some(path) = find_on_path(&self.binary_name) else {
            return CheckResult::skip(self.name(), "binary not found in PATH");
        };
        let mode = match std::fs::metadata(&path) {
            Ok(meta) => meta.permissions().mode() & 0o777,
            Err(e) => return CheckResult::fail_warning(self.name(), format!("could not stat binary: {e}")),
        };
        if mode == 0o755 {
            CheckResult::pass(self.name(), "binary has permissions 0755")
        } else {
            CheckResult::fail_warning(
                self.name(),
                format!("binary has permissions {mode:04o}, expected 0755"),
            )
            .with_fix_id("fix_permissions")
        }
    }
}

pub struct BinaryLocationChecker {
    binary_name: String,
}

impl BinaryLocationChecker {
    pub fn new(binary_name: String) -> Self {
        Self { binary_name }
    }
}

impl HealthChecker for BinaryLocationChecker {
    fn name(&self) -> &str {
        "binary_location"
    }

    fn category(&self) -> Category {
        Category::new(Category::BINARY)
    }

    fn check(&self, _ctx: &Ctx) -> CheckResult {
        let Some(path) = find_on_path(&self.binary_name) else {
            return CheckResult::skip(self.name(), "binary not found in PATH");
        };
        let parent = path.parent().unwrap_or(Path::new(""));
        let parent_str = parent.to_string_lossy();
        if STANDARD_DIRS.iter().any(|dir| parent_str == *dir) {
            CheckResult::pass(self.name(), format!("installed in standard directory {parent_str}"))
        } else {
            CheckResult::pass(self.name(), format!("installed in non-standard directory {parent_str}"))
                .with_detail("consider reinstalling into a standard PATH directory")
        }
    }
}
