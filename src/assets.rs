//! Scoped reads of local synthesis inputs.
//!
//! Instructions, prompt templates and interface contracts are opened, read in
//! full and closed in one call. A missing or unreadable file aborts the run;
//! partial reads are never returned.

use crate::error::{Result, SynthError};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Resolve `rel` against `root`. Absolute paths are taken as-is.
pub fn resolve(root: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

/// Read a UTF-8 text asset in full.
pub fn read_text(root: &Path, rel: &str) -> Result<String> {
    let path = resolve(root, rel);
    let mut file = File::open(&path).map_err(|e| SynthError::missing(&path, e.to_string()))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| SynthError::missing(&path, format!("failed to read: {}", e)))?;
    Ok(content)
}

/// Read a JSON asset in full and check that it parses.
pub fn read_json(root: &Path, rel: &str) -> Result<serde_json::Value> {
    let content = read_text(root, rel)?;
    serde_json::from_str(&content).map_err(|e| {
        SynthError::missing(resolve(root, rel), format!("not a valid JSON document: {}", e))
    })
}

/// Require that `rel` names an existing directory.
pub fn require_dir(root: &Path, rel: &str) -> Result<PathBuf> {
    let path = resolve(root, rel);
    if !path.is_dir() {
        return Err(SynthError::missing(&path, "directory does not exist"));
    }
    Ok(path)
}

/// Require that `path` is an existing regular file.
pub fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(SynthError::missing(path, "file does not exist"));
    }
    Ok(())
}
