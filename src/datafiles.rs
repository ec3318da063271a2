use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    DATA_DIR, INTERMEDIATE_DIR, OUTPUT_DIR, PRIVATE_DATA_DIR, PUBLIC_DATA_DIR, ROOT_MARKERS,
    SHARED_EXTERNALLY_DIR,
};
use crate::error::{DataError, Result};

/// Walk up from `start` to the first directory that contains one of `markers`.
pub fn find_project_root(start: &Path, markers: &[&str]) -> Result<PathBuf> {
    let markers = if markers.is_empty() { ROOT_MARKERS } else { markers };
    let mut dir = start;
    loop {
        if markers.iter().any(|m| dir.join(m).exists()) {
            return Ok(dir.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return Err(DataError::NoProjectRoot(start.to_path_buf())),
        }
    }
}

/// Resolve `parts` against the project root found from the current directory.
pub fn here(parts: &[&str]) -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| DataError::io(".", e))?;
    let root = find_project_root(&cwd, ROOT_MARKERS)?;
    Ok(parts.iter().fold(root, |acc, p| acc.join(p)))
}

/// Conventional directory layout of an analysis project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub base: PathBuf,
    pub data: PathBuf,
    pub private_data: PathBuf,
    pub public_data: PathBuf,
    pub shared_externally: PathBuf,
    pub intermediate: PathBuf,
    pub output: PathBuf,
}

impl DataLayout {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        let base = base.into();
        let data = base.join(DATA_DIR);
        Self {
            private_data: data.join(PRIVATE_DATA_DIR),
            public_data: data.join(PUBLIC_DATA_DIR),
            shared_externally: data.join(SHARED_EXTERNALLY_DIR),
            intermediate: data.join(INTERMEDIATE_DIR),
            output: base.join(OUTPUT_DIR),
            data,
            base,
        }
    }

    pub fn discover() -> Result<Self> {
        Ok(Self::new(here(&[])?))
    }
}

/// The most recent `{prefix}...` entry of `dir`.
///
/// Intermediate objects are written as `{prefix}-YYYY-MM-DD...`, so the
/// lexicographically greatest name is the newest one.
pub fn most_recent(prefix: &str, dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|e| DataError::io(dir, e))?;
    let mut best: Option<PathBuf> = None;
    for entry in entries {
        let entry = entry.map_err(|e| DataError::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(prefix) {
            continue;
        }
        let path = entry.path();
        if best.as_ref().map_or(true, |b| path > *b) {
            best = Some(path);
        }
    }
    let best = best.ok_or_else(|| DataError::NoMatchingFiles {
        dir: dir.to_path_buf(),
        prefix: prefix.to_string(),
    })?;
    std::path::absolute(&best).map_err(|e| DataError::io(&best, e))
}
