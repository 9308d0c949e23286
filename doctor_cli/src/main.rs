//! `warden doctor` — CLI framing around `doctor_engine`: flag parsing,
//! logging setup, and wiring concrete collaborators to the core.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::Command;

use clap::Parser;

use doctor_engine::checkers::build_default_checkers;
use doctor_engine::config::{TomlConfigLoader, WardenConfig};
use doctor_engine::ctx::Ctx;
use doctor_engine::external::{ConfigLoader, GitRunner, NonInteractivePrompter, Prompter, PrompterError};
use doctor_engine::fixers::build_default_fixers;
use doctor_engine::registry::Registry;
use doctor_engine::reporter::{color_enabled, HumanReporter, StreamingHumanReporter};
use doctor_engine::result::Category;
use doctor_engine::runner::{self, FixMode, ReporterKind, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "warden-doctor", about = "Diagnose and repair a warden installation")]
struct Cli {
    /// Show details and passing checks, not just failures.
    #[arg(long)]
    verbose: bool,

    /// Apply fixes automatically, without prompting.
    #[arg(long)]
    fix: bool,

    /// Prompt before applying each fix.
    #[arg(long)]
    interactive: bool,

    /// Restrict checks to one or more categories (repeatable).
    #[arg(long = "category", value_name = "CATEGORY")]
    categories: Vec<String>,

    /// Disable ANSI color regardless of terminal detection.
    #[arg(long)]
    no_color: bool,
}

struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, message: &str, default_yes: bool) -> Result<bool, PrompterError> {
        let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
        print!("{message} {hint} ");
        io::stdout().flush().ok();
        let mut line = String::new();
        io::stdin().read_line(&mut line).map_err(|_| PrompterError::InvalidInput("could not read stdin".into()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(default_yes);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            other => Err(PrompterError::InvalidInput(other.to_string())),
        }
    }

    fn input(&self, message: &str, default: &str) -> Result<String, PrompterError> {
        print!("{message} [{default}] ");
        io::stdout().flush().ok();
        let mut line = String::new();
        io::stdin().read_line(&mut line).map_err(|_| PrompterError::InvalidInput("could not read stdin".into()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }
}

struct ShellGitRunner;

impl GitRunner for ShellGitRunner {
    fn is_inside_repo(&self, path: &std::path::Path) -> bool {
        Command::new("git")
            .arg("-C")
            .arg(path)
            .args(["rev-parse", "--is-inside-work-tree"])
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let project_root: PathBuf = std::env::current_dir().unwrap_or_default();
    let loader = TomlConfigLoader::new("warden", project_root);
    let config: WardenConfig = loader.load_without_validation().unwrap_or_default();

    let registry = Registry::new();
    for checker in build_default_checkers(&config) {
        registry.register_checker(checker);
    }
    for fixer in build_default_fixers() {
        registry.register_fixer(fixer);
    }

    let categories: Vec<Category> = cli.categories.iter().map(|c| Category::new(c.clone())).collect();

    let known_categories = registry.categories();
    let unknown: Vec<&Category> = categories.iter().filter(|c| !known_categories.contains(c)).collect();
    if !unknown.is_empty() {
        let names: Vec<&str> = unknown.iter().map(|c| c.as_str()).collect();
        eprintln!("error: unknown --category value(s): {}", names.join(", "));
        std::process::exit(2);
    }

    let fix_mode = FixMode::from_flags(cli.fix, cli.interactive);
    let color = color_enabled(cli.no_color);

    let stdin_prompter = StdinPrompter;
    let non_interactive_prompter = NonInteractivePrompter;
    let prompter: &dyn Prompter = if cli.interactive { &stdin_prompter } else { &non_interactive_prompter };
    let git_runner = ShellGitRunner;

    let options = RunOptions {
        verbose: cli.verbose,
        fix_mode,
        categories,
        prompter,
        config_loader: &loader,
        git_runner: &git_runner,
        app_name: &config.app_name,
        binary_name: &config.binary_name,
    };

    let ctx = Ctx::new();
    let human_reporter = HumanReporter::new(color);
    let streaming_reporter = StreamingHumanReporter::new(color);
    let reporter_kind = if io::stdout().is_terminal() {
        ReporterKind::Streaming(&streaming_reporter)
    } else {
        ReporterKind::Batch(&human_reporter)
    };

    match runner::run(&registry, &ctx, reporter_kind, &options) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
