//! Data inventory: a manifest of every file under a data directory with its SHA-256.
//!
//! [`InventoryManager`] owns the location of a data directory and the name of
//! the manifest file inside it. It builds manifests by walking the tree,
//! refreshes hashes, verifies files against stored hashes, and clones a data
//! directory using the manifest as the copy list.
//!
//! Per-entry failures are collected across the whole manifest: every entry is
//! visited, then missing files are reported together as
//! [`DataError::MissingFiles`], or as [`DataError::UnreadableFiles`] when some
//! entries failed for other reasons. One bad entry never hides the others.

pub mod hashing;
pub mod manifest;

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::constants::{INVENTORY_FILE_NAME, SHARED_EXTERNALLY_DIR};
use crate::error::{DataError, EntryFailure, Result};
use crate::metrics;

pub use hashing::{sha256_bytes, sha256_file};
pub use manifest::{Entry, Manifest};

/// A stored hash that no longer matches the file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityMismatch {
    pub path: String,
    pub expected: String,
    pub actual: String,
}

/// Outcome of [`InventoryManager::verify`]. Mismatches are data, not errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Entries whose hash was recomputed and compared
    pub checked: usize,
    /// Entries without a stored hash
    pub skipped: usize,
    pub mismatches: Vec<IntegrityMismatch>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn mismatched_paths(&self) -> Vec<&str> {
        self.mismatches.iter().map(|m| m.path.as_str()).collect()
    }
}

pub struct InventoryManager {
    root: PathBuf,
    manifest_name: String,
    shared_dir_name: String,
    excluded_dirs: Vec<PathBuf>,
}

impl InventoryManager {
    pub fn new<P: Into<PathBuf>>(data_root: P) -> Self {
        Self {
            root: data_root.into(),
            manifest_name: INVENTORY_FILE_NAME.to_string(),
            shared_dir_name: SHARED_EXTERNALLY_DIR.to_string(),
            excluded_dirs: Vec::new(),
        }
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn with_shared_dir_name(mut self, name: impl Into<String>) -> Self {
        self.shared_dir_name = name.into();
        self
    }

    /// Leave `dir` (and everything below it) out of [`create`](Self::create).
    /// Used for the log directory when it lives inside the data directory.
    pub fn with_excluded_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.excluded_dirs.push(dir.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_name(&self) -> &str {
        &self.manifest_name
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest_name)
    }

    fn require_root(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(DataError::NotFound(self.root.clone()))
        }
    }

    /// Walk the data directory and hash every file except the manifest itself.
    ///
    /// Entries come out in file-name order within each directory, so repeated
    /// runs over the same tree produce identical manifests.
    pub fn create(&self) -> Result<Manifest> {
        self.require_root()?;
        let span = tracing::info_span!("inventory_create", root = %self.root.display());
        let _enter = span.enter();

        let excluded: Vec<PathBuf> = self
            .excluded_dirs
            .iter()
            .filter_map(|d| fs::canonicalize(d).ok())
            .collect();

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_excluded_dir(e, &excluded));
        for item in walker {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    if let Some(link) = dangling_symlink(&e) {
                        warn!(path = %link.display(), "Skipping dangling symlink");
                        continue;
                    }
                    return Err(self.walk_error(e));
                }
            };
            if !item.file_type().is_file() {
                continue;
            }
            if item.file_name().to_str() == Some(self.manifest_name.as_str()) {
                continue;
            }
            let rel = manifest::relative_posix(&self.root, item.path())?;
            let hash = sha256_file(item.path())?;
            debug!(path = %rel, sha256 = %hash, "Hashed file");
            files.push(Entry::new(rel, Some(hash)));
        }

        info!(files = files.len(), "Inventory created");
        Ok(Manifest::new(files))
    }

    /// Recompute every entry's hash in place.
    ///
    /// Every readable file is rehashed even when others fail; the failed
    /// entries keep their old hash and are reported together afterwards.
    pub fn recompute_hashes(&self, manifest: &mut Manifest) -> Result<()> {
        self.require_root()?;
        let mut missing = Vec::new();
        let mut failures = Vec::new();
        for entry in manifest.files.iter_mut() {
            match sha256_file(&entry.resolve(&self.root)) {
                Ok(hash) => entry.content_hash = Some(hash),
                Err(DataError::NotFound(_)) => {
                    warn!(path = %entry.path, "Inventoried file is missing");
                    metrics::inventory::missing_file();
                    missing.push(entry.path.clone());
                }
                Err(e) => {
                    warn!(path = %entry.path, error = %e, "Failed to hash inventoried file");
                    failures.push(entry_failure(&entry.path, e));
                }
            }
        }
        self.entry_failures_result(missing, failures)?;
        info!(files = manifest.len(), "Recomputed inventory hashes");
        Ok(())
    }

    /// Compare each hashed entry against the file on disk.
    ///
    /// Entries with no stored hash are skipped. A missing or unreadable file is
    /// an error, distinct from a mismatch; all entries are still visited first.
    pub fn verify(&self, manifest: &Manifest) -> Result<VerifyReport> {
        self.require_root()?;
        let mut report = VerifyReport::default();
        let mut missing = Vec::new();
        let mut failures = Vec::new();

        for entry in &manifest.files {
            let Some(expected) = entry.content_hash.as_deref().filter(|h| !h.is_empty()) else {
                report.skipped += 1;
                continue;
            };
            let actual = match sha256_file(&entry.resolve(&self.root)) {
                Ok(hash) => hash,
                Err(DataError::NotFound(_)) => {
                    metrics::inventory::missing_file();
                    missing.push(entry.path.clone());
                    continue;
                }
                Err(e) => {
                    warn!(path = %entry.path, error = %e, "Failed to hash inventoried file");
                    failures.push(entry_failure(&entry.path, e));
                    continue;
                }
            };
            report.checked += 1;
            if actual != expected {
                metrics::inventory::hash_mismatch();
                report.mismatches.push(IntegrityMismatch {
                    path: entry.path.clone(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        self.entry_failures_result(missing, failures)?;
        info!(
            checked = report.checked,
            skipped = report.skipped,
            mismatches = report.mismatches.len(),
            "Inventory verified"
        );
        Ok(report)
    }

    /// Copy every inventoried file into a fresh directory `new_root`.
    ///
    /// `manifest` is written into `new_root` as its manifest, so the new root
    /// lists exactly the files that were copied, whatever is on disk here. The
    /// externally-shared subdirectory is created. The destination must not
    /// exist yet.
    pub fn clone_to(&self, manifest: &Manifest, new_root: &Path) -> Result<Manifest> {
        self.require_root()?;
        if new_root.exists() {
            return Err(DataError::AlreadyExists(new_root.to_path_buf()));
        }

        let missing: Vec<String> = manifest
            .files
            .iter()
            .filter(|e| !e.resolve(&self.root).is_file())
            .map(|e| e.path.clone())
            .collect();
        self.missing_files_result(missing)?;

        fs::create_dir_all(new_root).map_err(|e| DataError::io(new_root, e))?;
        for entry in &manifest.files {
            let from = entry.resolve(&self.root);
            let to = entry.resolve(new_root);
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
            }
            let bytes = fs::copy(&from, &to).map_err(|e| DataError::io(&from, e))?;
            metrics::inventory::file_copied(bytes);
            debug!(path = %entry.path, bytes, "Copied file");
        }

        let target = InventoryManager::new(new_root)
            .with_manifest_name(self.manifest_name.clone())
            .with_shared_dir_name(self.shared_dir_name.clone());
        target.save(manifest)?;

        let shared = new_root.join(&self.shared_dir_name);
        fs::create_dir_all(&shared).map_err(|e| DataError::io(&shared, e))?;

        info!(
            from = %self.root.display(),
            to = %new_root.display(),
            files = manifest.len(),
            "Data directory cloned"
        );
        Ok(manifest.clone())
    }

    /// Read the persisted manifest from the data directory.
    pub fn load(&self) -> Result<Manifest> {
        let path = self.manifest_path();
        let content = fs::read_to_string(&path).map_err(|e| DataError::io(&path, e))?;
        Manifest::from_yaml_str(&content, &path, &self.manifest_name)
    }

    /// Write `manifest` to the data directory, replacing any previous one.
    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        self.require_root()?;
        let path = self.manifest_path();
        let yaml = manifest.to_yaml_string()?;
        fs::write(&path, yaml).map_err(|e| DataError::io(&path, e))?;
        debug!(path = %path.display(), files = manifest.len(), "Saved manifest");
        Ok(())
    }

    fn entry_failures_result(
        &self,
        missing: Vec<String>,
        failures: Vec<EntryFailure>,
    ) -> Result<()> {
        if failures.is_empty() {
            return self.missing_files_result(missing);
        }
        Err(DataError::UnreadableFiles {
            root: self.root.clone(),
            missing,
            failures,
        })
    }

    fn walk_error(&self, e: walkdir::Error) -> DataError {
        let path = e
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        match e.into_io_error() {
            Some(io) => DataError::io(&path, io),
            None => DataError::Config(format!("filesystem loop at {}", path.display())),
        }
    }

    fn missing_files_result(&self, missing: Vec<String>) -> Result<()> {
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DataError::MissingFiles {
                root: self.root.clone(),
                paths: missing,
            })
        }
    }
}

fn entry_failure(path: &str, e: DataError) -> EntryFailure {
    let reason = match e {
        DataError::Io { source, .. } => source.to_string(),
        other => other.to_string(),
    };
    EntryFailure {
        path: path.to_string(),
        reason,
    }
}

/// The path of a symlink whose target is gone, if that is what `e` is about.
fn dangling_symlink(e: &walkdir::Error) -> Option<&Path> {
    let not_found = e
        .io_error()
        .map_or(false, |io| io.kind() == std::io::ErrorKind::NotFound);
    let path = e.path()?;
    let is_link = fs::symlink_metadata(path).map_or(false, |m| m.file_type().is_symlink());
    (not_found && is_link).then_some(path)
}

fn is_excluded_dir(entry: &walkdir::DirEntry, excluded: &[PathBuf]) -> bool {
    if excluded.is_empty() || !entry.file_type().is_dir() {
        return false;
    }
    let hit = fs::canonicalize(entry.path()).map_or(false, |p| excluded.contains(&p));
    if hit {
        debug!(path = %entry.path().display(), "Skipping excluded directory");
    }
    hit
}
