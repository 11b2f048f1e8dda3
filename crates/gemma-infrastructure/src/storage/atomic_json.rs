//! Whole-document JSON file writes.
//!
//! A document is always rewritten in full: serialize, write a sibling temp
//! file, fsync, then rename over the target. Readers never observe a
//! half-written file.

use gemma_core::error::{AssistantError, Result};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// A handle to a JSON document on disk.
///
/// Does NOT:
/// - Know about specific entities (topics, messages)
/// - Handle schema versions (delegated to the repository layer)
/// - Lock the file (single writer, single process)
#[derive(Debug, Clone)]
pub struct AtomicJsonFile {
    path: PathBuf,
}

impl AtomicJsonFile {
    /// Creates a new handle for `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and parses the document.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(JsonValue))`: Successfully loaded and parsed
    /// - `Ok(None)`: File doesn't exist or is blank
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<JsonValue>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let value: JsonValue = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    /// Serializes `data` as pretty-printed JSON and replaces the document.
    ///
    /// The parent directory is created if absent.
    pub fn save<T: Serialize>(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json_string = serde_json::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }

        Ok(())
    }

    /// Temp file next to the target so the rename never crosses filesystems.
    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| AssistantError::io(format!("Path has no file name: {:?}", self.path)))?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(match self.path.parent() {
            Some(parent) => parent.join(tmp_name),
            None => PathBuf::from(tmp_name),
        })
    }
}
