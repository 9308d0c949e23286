//! Installs the binary by running `task install`, but only when there's
//! reasonable evidence this is the source checkout rather than some
//! unrelated directory the user happened to run the doctor in.

use std::process::Command;

use super::{FixCtx, FixError, Fixer};

fn task_on_path() -> bool {
    let Some(path_var) = std::env::var_os("PATH") else { return false };
    std::env::split_paths(&path_var).any(|dir| dir.join("task").is_file())
}

pub struct InstallBinaryFixer;

impl Fixer for InstallBinaryFixer {
    fn id(&self) -> &str {
        "install_binary"
    }

    fn description(&self) -> &str {
        "run `task install` from the source checkout"
    }

    fn fix(&self, ctx: &FixCtx) -> Result<(), FixError> {
        let cwd = std::env::current_dir().map_err(|e| FixError::failed(self.id(), e))?;
        if !ctx.git_runner.is_inside_repo(&cwd) || !task_on_path() {
            return Err(FixError::failed(
                self.id(),
                std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "not running from a source checkout with `task` on PATH — install the binary manually",
                ),
            ));
        }

        if ctx.interactive {
            let proceed = ctx
                .prompter
                .confirm("Run `task install` to build and install the binary?", true)
                .map_err(|e| FixError::failed(self.id(), e))?;
            if !proceed {
                return Ok(());
            }
        }

        let status = Command::new("task").arg("install").status().map_err(|e| FixError::failed(self.id(), e))?;
        if status.success() {
            Ok(())
        } else {
            Err(FixError::failed(
                self.id(),
                std::io::Error::new(std::io::ErrorKind::Other, format!("`task install` exited with {status}")),
            ))
        }
    }
}
