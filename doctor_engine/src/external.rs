//! External collaborator interfaces: `ConfigLoader`,
//! `GitRunner`, `Prompter`, `Logger`. Specified at interface only — these
//! are abstractions a real `warden` binary plugs concrete implementations
//! into; the doctor core never assumes a specific backing store.
//!
//! `doctor_engine::config` ships one concrete `ConfigLoader` (a TOML file
//! on disk) since a collaborator-only interface still needs *something*
//! behind it for the crate to run end to end — but checkers and fixers are
//! written against the trait, never the concrete type.

use thiserror::Error;

/// Errors a `ConfigLoader` may surface.
#[derive(Debug, Error)]
pub enum ConfigLoaderError {
    #[error("invalid TOML in {path}: {source}")]
    InvalidToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("permissions on {0} are too permissive")]
    InvalidPermissions(String),
    #[error("no configuration found at {0}")]
    ConfigNotFound(String),
    #[error("rule {rule} has an empty match section")]
    EmptyMatchConditions { rule: String },
    #[error("rule {rule}: {reason}")]
    InvalidRule { rule: String, reason: String },
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Loads and validates `warden`'s own TOML configuration. Internals
/// (merge order, validation rules) are a collaborator concern out of scope
/// for the diagnostics core; checkers consume only this trait.
pub trait ConfigLoader: Send + Sync {
    fn has_global_config(&self) -> bool;
    fn has_project_config(&self) -> bool;
    fn global_config_path(&self) -> std::path::PathBuf;
    fn project_config_paths(&self) -> Vec<std::path::PathBuf>;

    /// Full load with validation.
    fn load(&self) -> Result<crate::config::WardenConfig, ConfigLoaderError>;

    /// Load without enforcing rule validation — used by checkers that want
    /// to run their own semantic analysis over the raw document.
    fn load_without_validation(&self) -> Result<crate::config::WardenConfig, ConfigLoaderError>;

    /// Loads the project config only (not merged with global), returning
    /// its path alongside — used by fixers that must write back to the
    /// exact file they read from.
    fn load_project_config_only(
        &self,
    ) -> Result<(crate::config::WardenConfig, std::path::PathBuf), ConfigLoaderError>;
}

/// Git repository introspection, used by a few checkers. Shells out to
/// `git` rather than linking a git library.
pub trait GitRunner: Send + Sync {
    /// True iff `path` is inside a git working tree.
    fn is_inside_repo(&self, path: &std::path::Path) -> bool;
}

/// Errors a `Prompter` may surface.
#[derive(Debug, Error)]
pub enum PrompterError {
    #[error("empty input")]
    EmptyInput,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Interactive confirmation/input, used by fixers in interactive mode.
pub trait Prompter: Send + Sync {
    fn confirm(&self, message: &str, default_yes: bool) -> Result<bool, PrompterError>;
    fn input(&self, message: &str, default: &str) -> Result<String, PrompterError>;
}

/// A prompter that always answers with the default — used by `AutoFix` mode
/// and in tests, where no interactive terminal is attached.
pub struct NonInteractivePrompter;

impl Prompter for NonInteractivePrompter {
    fn confirm(&self, _message: &str, default_yes: bool) -> Result<bool, PrompterError> {
        Ok(default_yes)
    }

    fn input(&self, _message: &str, default: &str) -> Result<String, PrompterError> {
        Ok(default.to_string())
    }
}

/// Structured key-value logging with levels Debug/Info/Error.
/// A thin facade over the `log` crate, bridged to a plain subscriber in
/// `doctor_cli`.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    /// Returns a logger carrying additional key-value context prefixed onto
    /// every subsequent message from it.
    fn with_kv(&self, key: &str, value: &str) -> Box<dyn Logger>;
}

#[derive(Clone, Default)]
pub struct LogCrateLogger {
    context: Vec<(String, String)>,
}

impl LogCrateLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn format(&self, message: &str) -> String {
        if self.context.is_empty() {
            return message.to_string();
        }
        let kv: Vec<String> = self.context.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{message} ({})", kv.join(" "))
    }
}

impl Logger for LogCrateLogger {
    fn debug(&self, message: &str) {
        log::debug!("{}", self.format(message));
    }

    fn info(&self, message: &str) {
        log::info!("{}", self.format(message));
    }

    fn error(&self, message: &str) {
        log::error!("{}", self.format(message));
    }

    fn with_kv(&self, key: &str, value: &str) -> Box<dyn Logger> {
        let mut context = self.context.clone();
        context.push((key.to_string(), value.to_string()));
        Box::new(Self { context })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_prompter_always_answers_default() {
        let p = NonInteractivePrompter;
        assert_eq!(p.confirm("apply fix?", true).unwrap(), true);
        assert_eq!(p.confirm("apply fix?", false).unwrap(), false);
        assert_eq!(p.input("value?", "fallback").unwrap(), "fallback");
    }

    #[test]
    fn logger_with_kv_formats_context() {
        let logger = LogCrateLogger::new();
        let with_ctx = logger.with_kv("checker", "binary_presence");
        // Formatting is exercised via `format`, which is private; this test
        // only checks the builder doesn't panic and returns a usable logger.
        with_ctx.info("ran check");
    }
}
