//! Atomic file writes.
//!
//! Every write follows the same pattern:
//! 1. write the content to `.{filename}.tmp` in the target's directory
//! 2. fsync the temporary file
//! 3. rename it over the target
//!
//! Source and destination share a directory, so the rename never crosses
//! filesystems. On crash a stale `.{filename}.tmp` may remain.

use crate::error::{Result, SynthError};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories as needed.
///
/// ```no_run
/// use fleetplan::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("fleetplan.out/plan.json"), b"{}\n")?;
/// # Ok::<(), fleetplan::error::SynthError>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        SynthError::UserError(format!(
            "failed to atomically replace '{}': {}",
            path.display(),
            e
        ))
    })?;

    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Atomically write `value` as pretty JSON with a trailing newline.
pub fn atomic_write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)
        .map_err(|e| SynthError::UserError(format!("failed to serialize to JSON: {}", e)))?;
    json.push('\n');
    atomic_write(path, json.as_bytes())
}

/// Atomically write a file that must not exist yet.
///
/// The existence check and the rename are separate steps, so a file created
/// in between is replaced.
pub fn write_new_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Err(SynthError::UserError(format!(
            "'{}' already exists; refusing to overwrite it",
            path.display()
        )));
    }
    atomic_write_file(path, content)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            SynthError::UserError(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }
    Ok(())
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SynthError::UserError("invalid file path".to_string()))?;
    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        SynthError::UserError(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        SynthError::UserError(format!("failed to write to temporary file: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        SynthError::UserError(format!("failed to sync temporary file to disk: {}", e))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("plan.json");

        atomic_write(&file_path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
    }

    #[test]
    fn test_atomic_write_replaces_existing_and_cleans_temp() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("plan.json");
        fs::write(&file_path, "old").unwrap();

        atomic_write_file(&file_path, "new").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new");
        assert!(!temp_dir.path().join(".plan.json.tmp").exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("fleetplan.out/nested/plan.json");

        atomic_write_json(&file_path, &json!({"agents": []})).unwrap();

        let content = fs::read_to_string(&file_path).unwrap();
        assert!(content.ends_with('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["agents"], json!([]));
    }

    #[test]
    fn test_write_new_file_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("fleetplan.yaml");

        write_new_file(&file_path, "a: 1\n").unwrap();
        let err = write_new_file(&file_path, "b: 2\n").unwrap_err();

        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "a: 1\n");
    }

    #[test]
    fn test_write_new_file_goes_through_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("config/fleetplan.yaml");

        write_new_file(&file_path, "stack_id: Fleet\n").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "stack_id: Fleet\n");
        assert!(!temp_dir.path().join("config/.fleetplan.yaml.tmp").exists());
    }
}
