//! Atomic file-write primitive and the directory/lock
//! helpers XDG migration builds on.
//!
//! One write-then-rename primitive, extended with backup-before-overwrite
//! semantics for files where losing the previous version matters.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Writes `data` to `path`, creating a timestamped backup of any existing
/// file first when `create_backup` is set. Steps:
/// 1. Ensure the parent directory exists (mode 0750).
/// 2. Capture the existing file's mode, else default to 0600.
/// 3. If `create_backup` and the file exists, copy it to
///    `<path>.backup.<unix-seconds>` preserving its mode; a backup failure
///    aborts the write before anything is touched.
/// 4. Write the new content to `<path>.tmp` with the captured mode.
/// 5. Rename `<path>.tmp` → `path`; on failure, remove the temp file and
///    propagate the error.
pub fn atomic_write_file(path: &Path, data: &[u8], create_backup: bool) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_mode(parent, 0o750)?;
    }

    let existing_mode = fs::metadata(path).ok().map(|m| m.permissions().mode() & 0o777);
    let mode = existing_mode.unwrap_or(0o600);

    if create_backup && path.exists() {
        let backup_path = backup_path_for(path);
        fs::copy(path, &backup_path)?;
        fs::set_permissions(&backup_path, fs::Permissions::from_mode(mode))?;
    }

    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, data)?;
    fs::set_permissions(&tmp_path, fs::Permissions::from_mode(mode))?;

    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn backup_path_for(path: &Path) -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".backup.{secs}"));
    PathBuf::from(name)
}

/// `mkdir -p` with the given mode; chmods an existing directory down to
/// `mode` if it's wider.
pub fn ensure_dir_mode(path: &Path, mode: u32) -> io::Result<()> {
    fs::create_dir_all(path)?;
    let current = fs::metadata(path)?.permissions().mode() & 0o777;
    if current != mode && current & !mode != 0 {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

/// Guard releasing an exclusive marker-file lock on drop. Acquired via `O_CREAT|O_EXCL`; failure to create means another
/// process holds it.
pub struct ExclusiveLock {
    path: PathBuf,
}

impl ExclusiveLock {
    /// Attempts to acquire the lock at `path`. Returns `Ok(None)` (not an
    /// error) if another process already holds it — migration treats that
    /// as "another process is migrating, return cleanly".
    pub fn try_acquire(path: &Path) -> io::Result<Option<Self>> {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;
        match OpenOptions::new().create_new(true).write(true).mode(0o600).open(path) {
            Ok(_) => Ok(Some(Self { path: path.to_path_buf() })),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Drop for ExclusiveLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_creates_file_with_default_mode_when_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        atomic_write_file(&path, b"{}", true).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{}");
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn write_preserves_existing_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, b"old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        atomic_write_file(&path, b"new", false).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn backup_created_with_previous_bytes_when_requested() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, b"original content").unwrap();

        atomic_write_file(&path, b"updated content", true).unwrap();

        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".backup."))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read(backups[0].path()).unwrap(), b"original content");
        assert_eq!(fs::read(&path).unwrap(), b"updated content");
    }

    #[test]
    fn no_backup_when_flag_false() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, b"original").unwrap();
        atomic_write_file(&path, b"updated", false).unwrap();
        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".backup."))
            .collect();
        assert!(backups.is_empty());
    }

    #[test]
    fn idempotent_write_of_identical_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        atomic_write_file(&path, b"{\"hooks\":{}}", true).unwrap();
        atomic_write_file(&path, b"{\"hooks\":{}}", true).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{\"hooks\":{}}");
    }

    #[test]
    fn ensure_dir_creates_with_mode_and_tightens_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir");
        ensure_dir_mode(&path, 0o700).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o700);

        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        ensure_dir_mode(&path, 0o700).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o700);
    }

    #[test]
    fn exclusive_lock_second_attempt_returns_none() {
        let dir = tempdir().unwrap();
        let lock_path = dir.path().join(".migration_v2.lock");
        let first = ExclusiveLock::try_acquire(&lock_path).unwrap();
        assert!(first.is_some());
        let second = ExclusiveLock::try_acquire(&lock_path).unwrap();
        assert!(second.is_none());
        drop(first);
        let third = ExclusiveLock::try_acquire(&lock_path).unwrap();
        assert!(third.is_some());
    }
}
