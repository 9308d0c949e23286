//! XDG base-directory resolution with legacy-layout fallback and a
//! one-shot, concurrency-safe migration.
//!
//! The teacher has no XDG layer of its own (`check_engine` is a linter, not
//! an installer) — this module is grounded instead in the general
//! freedesktop XDG convention plus the `dirs` crate already present in the
//! teacher's dependency table (`dirs = "6"`, unused by `check_engine` but
//! carried forward here into its first real use).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::atomic::{ensure_dir_mode, ExclusiveLock};

pub struct XdgPaths {
    pub config_home: PathBuf,
    pub data_home: PathBuf,
    pub state_home: PathBuf,
    pub cache_home: PathBuf,
}

/// Resolves the four XDG base directories for `app_name`, honoring
/// `XDG_*` environment overrides with the standard fallbacks.
pub fn resolve(app_name: &str) -> XdgPaths {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
    let base = |env_var: &str, fallback: PathBuf| -> PathBuf {
        std::env::var_os(env_var)
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .unwrap_or(fallback)
    };

    XdgPaths {
        config_home: base("XDG_CONFIG_HOME", home.join(".config")).join(app_name),
        data_home: base("XDG_DATA_HOME", home.join(".local/share")).join(app_name),
        state_home: base("XDG_STATE_HOME", home.join(".local/state")).join(app_name),
        cache_home: base("XDG_CACHE_HOME", home.join(".cache")).join(app_name),
    }
}

/// Expands a leading `~` or `~/...` against the home directory. `~user` is
/// rejected (returns the input unchanged) — tilde expansion is scoped to
/// the current user only.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// `mkdir -p` with mode 0700, tightening an existing wider-mode directory.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    ensure_dir_mode(path, 0o700)
}

const MARKER_CONTENTS: &str = "v2";

fn marker_path(state_home: &Path) -> PathBuf {
    state_home.join(".migration_v2")
}

/// True iff the migration marker is present.
pub fn needs_migration(state_home: &Path) -> bool {
    !marker_path(state_home).exists()
}

/// One legacy-suffix → XDG-destination move entry.
struct MigrationEntry {
    legacy_suffix: &'static str,
    destination: fn(&XdgPaths) -> PathBuf,
    is_dir: bool,
}

fn migration_table() -> Vec<MigrationEntry> {
    vec![
        MigrationEntry { legacy_suffix: "config.toml", destination: |p| p.config_home.join("config.toml"), is_dir: false },
        MigrationEntry { legacy_suffix: "dispatcher.log", destination: |p| p.state_home.join("dispatcher.log"), is_dir: false },
        MigrationEntry { legacy_suffix: "exceptions", destination: |p| p.data_home.join("exceptions"), is_dir: true },
        MigrationEntry { legacy_suffix: "crash_dumps", destination: |p| p.data_home.join("crash_dumps"), is_dir: true },
        MigrationEntry { legacy_suffix: "patterns", destination: |p| p.data_home.join("patterns"), is_dir: true },
        MigrationEntry { legacy_suffix: "backups", destination: |p| p.data_home.join("backups"), is_dir: true },
        MigrationEntry { legacy_suffix: "plugins", destination: |p| p.data_home.join("plugins"), is_dir: true },
    ]
}

/// Outcome of a migration attempt.
#[derive(Debug, Default, Clone)]
pub struct MigrationResult {
    pub moved: Vec<PathBuf>,
    pub symlinks: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Runs the idempotent, concurrency-safe migration from `~/.{app_name}/` to
/// the XDG layout.
pub fn migrate(app_name: &str) -> io::Result<MigrationResult> {
    let paths = resolve(app_name);
    let mut result = MigrationResult::default();

    // Step 1: fast path.
    if !needs_migration(&paths.state_home) {
        return Ok(result);
    }

    // Step 2: acquire exclusive lock; another process migrating is not an error.
    ensure_dir_mode(&paths.state_home, 0o700)?;
    let lock_path = marker_path(&paths.state_home).with_extension("lock");
    let lock = match ExclusiveLock::try_acquire(&lock_path)? {
        Some(lock) => lock,
        None => return Ok(result),
    };

    // Step 3: re-check marker under the lock (TOCTOU).
    if !needs_migration(&paths.state_home) {
        drop(lock);
        return Ok(result);
    }

    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
    let legacy_dir = home.join(format!(".{app_name}"));

    // Step 4: legacy dir absent ⟹ write marker, nothing to move.
    if !legacy_dir.exists() {
        write_marker(&paths.state_home)?;
        drop(lock);
        return Ok(result);
    }

    // Step 5: ensure XDG base dirs exist.
    for dir in [&paths.config_home, &paths.data_home, &paths.state_home, &paths.cache_home] {
        ensure_dir(dir)?;
    }

    // Step 6: move entries that exist at the source and don't already exist at the destination.
    for entry in migration_table() {
        let src = legacy_dir.join(entry.legacy_suffix);
        if !src.exists() {
            continue;
        }
        let dest = (entry.destination)(&paths);
        if dest.exists() {
            result.skipped.push(src);
            continue;
        }
        match move_path(&src, &dest, entry.is_dir) {
            Ok(()) => result.moved.push(dest),
            Err(e) => result.warnings.push(format!("failed to move {}: {e}", src.display())),
        }
    }

    // Step 7: backward-compat symlinks, never overwriting an existing path.
    let legacy_config = legacy_dir.join("config.toml");
    let xdg_config = paths.config_home.join("config.toml");
    if !legacy_config.exists() && xdg_config.exists() {
        if symlink(&xdg_config, &legacy_config).is_ok() {
            result.symlinks.push(legacy_config);
        }
    }
    let legacy_log = legacy_dir.join("dispatcher.log");
    let xdg_log = paths.state_home.join("dispatcher.log");
    if !legacy_log.exists() && xdg_log.exists() {
        if symlink(&xdg_log, &legacy_log).is_ok() {
            result.symlinks.push(legacy_log);
        }
    }

    // Step 8: write marker.
    write_marker(&paths.state_home)?;

    // Step 9: lock released on drop.
    drop(lock);
    Ok(result)
}

fn write_marker(state_home: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let marker = marker_path(state_home);
    fs::write(&marker, MARKER_CONTENTS)?;
    fs::set_permissions(&marker, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

/// Cross-device rename falls back to copy-then-remove for files, or
/// recursive copy-then-remove for directories.
fn move_path(src: &Path, dest: &Path, is_dir: bool) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(_) if is_dir => {
            copy_dir_recursive(src, dest)?;
            fs::remove_dir_all(src)
        }
        Err(_) => {
            fs::copy(src, dest)?;
            fs::remove_file(src)
        }
    }
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let dest_path = dest.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // XDG resolution reads process-global environment variables and
    // $HOME; serialize these tests so they don't race each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn resolve_honors_xdg_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", dir.path());
        let paths = resolve("warden");
        assert_eq!(paths.config_home, dir.path().join("warden"));
        std::env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    fn expand_tilde_rejects_other_user() {
        let expanded = expand_tilde("~otheruser/foo");
        assert_eq!(expanded, PathBuf::from("~otheruser/foo"));
    }

    #[test]
    fn migration_is_idempotent() {
        let _guard = ENV_LOCK.lock().unwrap();
        let home = tempdir().unwrap();
        std::env::set_var("HOME", home.path());
        std::env::remove_var("XDG_CONFIG_HOME");
        std::env::remove_var("XDG_DATA_HOME");
        std::env::remove_var("XDG_STATE_HOME");
        std::env::remove_var("XDG_CACHE_HOME");

        let legacy = home.path().join(".warden");
        fs::create_dir_all(&legacy).unwrap();
        fs::write(legacy.join("config.toml"), b"old=true").unwrap();

        let first = migrate("warden").unwrap();
        assert_eq!(first.moved.len(), 1);

        let second = migrate("warden").unwrap();
        assert!(second.moved.is_empty());
        assert!(second.symlinks.is_empty());
        assert!(second.skipped.is_empty());
    }

    #[test]
    fn migration_no_op_when_legacy_dir_absent() {
        let _guard = ENV_LOCK.lock().unwrap();
        let home = tempdir().unwrap();
        std::env::set_var("HOME", home.path());
        std::env::remove_var("XDG_CONFIG_HOME");
        std::env::remove_var("XDG_STATE_HOME");

        let result = migrate("warden-fresh-install").unwrap();
        assert!(result.moved.is_empty());
        assert!(!needs_migration(&resolve("warden-fresh-install").state_home));
    }

    #[test]
    fn migration_skips_when_destination_already_exists() {
        let _guard = ENV_LOCK.lock().unwrap();
        let home = tempdir().unwrap();
        std::env::set_var("HOME", home.path());
        std::env::remove_var("XDG_CONFIG_HOME");
        std::env::remove_var("XDG_DATA_HOME");
        std::env::remove_var("XDG_STATE_HOME");

        let legacy = home.path().join(".warden2");
        fs::create_dir_all(&legacy).unwrap();
        fs::write(legacy.join("config.toml"), b"legacy=true").unwrap();

        let paths = resolve("warden2");
        fs::create_dir_all(&paths.config_home).unwrap();
        fs::write(paths.config_home.join("config.toml"), b"already=here").unwrap();

        let result = migrate("warden2").unwrap();
        assert_eq!(result.skipped.len(), 1);
        assert!(result.moved.is_empty());
        assert_eq!(fs::read(paths.config_home.join("config.toml")).unwrap(), b"already=here");
    }
}
