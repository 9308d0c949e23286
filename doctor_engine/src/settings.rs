//! Reads/writes the host assistant's JSON settings files and answers
//! "is the app's dispatcher registered?" / "is a pre-tool hook present?".
//!
//! Serializes via `serde_json::to_string_pretty`, matching the host's own
//! on-disk formatting (2-space indent, trailing newline) byte for byte.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atomic::atomic_write_file;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file not found: {0}")]
    NotFound(PathBuf),
    #[error("permission denied reading {0}")]
    PermissionDenied(PathBuf),
    #[error("invalid JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookMatcher {
    pub matcher: String,
    pub hooks: Vec<HookEntry>,
}

/// The host assistant's settings document: `{"hooks": {event: [matcher entries]}}`
///. `hooks` normalizes to an empty mapping when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(default)]
    pub hooks: BTreeMap<String, Vec<HookMatcher>>,
    /// Any other top-level keys are preserved round-trip rather than
    /// dropped — the host assistant's schema is explicitly out of scope
    ///, so this parser must not destroy fields it doesn't
    /// understand.
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl SettingsDocument {
    pub const PRE_TOOL_USE: &'static str = "PreToolUse";

    /// True iff any hook command in the document contains either the
    /// literal `dispatcher_path` or its basename.
    pub fn is_dispatcher_registered(&self, dispatcher_path: &str) -> bool {
        let basename = Path::new(dispatcher_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(dispatcher_path);
        self.hooks.values().flatten().any(|matcher| {
            matcher
                .hooks
                .iter()
                .any(|h| h.command.contains(dispatcher_path) || h.command.contains(basename))
        })
    }

    pub fn has_pre_tool_use_hook(&self) -> bool {
        self.hooks.contains_key(Self::PRE_TOOL_USE)
    }

    /// Registers `dispatcher_path` under `PreToolUse` with the matcher and
    /// timeout spec.md §4.5/§6 specify exactly, skipping if already
    /// registered.
    pub fn register_hook(&mut self, dispatcher_path: &str) {
        if self.is_dispatcher_registered(dispatcher_path) {
            return;
        }
        let entry = HookMatcher {
            matcher: "Bash|Write|Edit".to_string(),
            hooks: vec![HookEntry {
                kind: "command".to_string(),
                command: format!("{dispatcher_path} --hook-type PreToolUse"),
                timeout: Some(30),
            }],
        };
        self.hooks.entry(Self::PRE_TOOL_USE.to_string()).or_default().push(entry);
    }

    /// Two-space indent, trailing newline — bit-exact for compatibility
    /// with the host assistant.
    pub fn serialize(&self) -> serde_json::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(self, &mut ser)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// Reads the settings document at `path`. An absent file is *not* treated
/// as `NotFound` by this function's callers in practice — checkers decide
/// whether absence is expected; this function surfaces the sentinel so
/// callers can choose. An empty file parses as an empty document.
pub fn read_settings(path: &Path) -> Result<SettingsDocument, SettingsError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(SettingsError::NotFound(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err(SettingsError::PermissionDenied(path.to_path_buf()))
        }
        Err(e) => return Err(SettingsError::Io { path: path.to_path_buf(), source: e }),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(SettingsDocument::default());
    }
    serde_json::from_slice(&bytes).map_err(|e| SettingsError::InvalidJson { path: path.to_path_buf(), source: e })
}

/// Loads the settings document at `path`, treating a missing file as an
/// empty document rather than an error — the shape `install_hook` needs
/// (spec.md §4.5 "parse user settings (creating an empty document if
/// missing)").
pub fn read_settings_or_default(path: &Path) -> Result<SettingsDocument, SettingsError> {
    match read_settings(path) {
        Ok(doc) => Ok(doc),
        Err(SettingsError::NotFound(_)) => Ok(SettingsDocument::default()),
        Err(e) => Err(e),
    }
}

pub fn write_settings(path: &Path, doc: &SettingsDocument) -> io::Result<()> {
    let bytes = doc
        .serialize()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    atomic_write_file(path, &bytes, true)
}

/// Platform-specific well-known settings paths.
pub fn user_settings_path() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".claude/settings.json")
}

pub fn project_settings_path(project_root: &Path) -> PathBuf {
    project_root.join(".claude/settings.json")
}

pub fn project_local_settings_path(project_root: &Path) -> PathBuf {
    project_root.join(".claude/settings.local.json")
}

#[cfg(target_os = "macos")]
pub fn enterprise_settings_path() -> PathBuf {
    PathBuf::from("/Library/Application Support/ClaudeCode/policies.json")
}

#[cfg(not(target_os = "macos"))]
pub fn enterprise_settings_path() -> PathBuf {
    PathBuf::from("/etc/claude-code/policies.json")
}
