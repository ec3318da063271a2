use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use super::hashing::is_sha256_hex;
use crate::error::{DataError, Result};

/// One inventoried file: a path relative to the inventory root and its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// POSIX-style path relative to the inventory root
    pub path: String,
    /// Lowercase hex SHA-256 of the file; `None` until hashed
    #[serde(
        rename = "sha256",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub content_hash: Option<String>,
}

impl Entry {
    pub fn new(path: impl Into<String>, content_hash: Option<String>) -> Self {
        Self {
            path: path.into(),
            content_hash,
        }
    }

    /// Location of this entry's file under `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        self.path
            .split('/')
            .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
    }
}

/// Ordered list of inventoried files, persisted as `files: [...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: Vec<Entry>,
}

impl Manifest {
    pub fn new(files: Vec<Entry>) -> Self {
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.files.iter().find(|e| e.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|e| e.path.as_str())
    }

    /// Parse a persisted manifest. `source` is only used for error messages.
    pub fn from_yaml_str(yaml: &str, source: &Path, manifest_name: &str) -> Result<Self> {
        let manifest: Manifest =
            serde_yaml::from_str(yaml).map_err(|e| DataError::MalformedManifest {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?;
        manifest
            .validate(manifest_name)
            .map_err(|message| DataError::MalformedManifest {
                path: source.to_path_buf(),
                message,
            })?;
        Ok(manifest)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check the entry invariants: relative non-escaping unique paths, well-formed hashes,
    /// and no entry naming the manifest file itself.
    pub fn validate(&self, manifest_name: &str) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for entry in &self.files {
            validate_relative_path(&entry.path)?;
            if entry.path.rsplit('/').next() == Some(manifest_name) {
                return Err(format!("entry '{}' names the manifest file", entry.path));
            }
            if !seen.insert(entry.path.as_str()) {
                return Err(format!("duplicate entry '{}'", entry.path));
            }
            if let Some(hash) = &entry.content_hash {
                if !is_sha256_hex(hash) {
                    return Err(format!(
                        "entry '{}' has invalid sha256 '{}'",
                        entry.path, hash
                    ));
                }
            }
        }
        Ok(())
    }
}

fn validate_relative_path(path: &str) -> std::result::Result<(), String> {
    if path.is_empty() {
        return Err("entry with empty path".to_string());
    }
    if path.contains('\\') {
        return Err(format!("entry '{}' is not a POSIX path", path));
    }
    // `a//b` and `a/./b` would alias `a/b` and slip past the duplicate check
    let segments_ok = path
        .split('/')
        .all(|seg| !seg.is_empty() && seg != "." && seg != "..");
    let ok = segments_ok
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !ok {
        return Err(format!("entry '{}' is not a plain relative path", path));
    }
    Ok(())
}

/// Express `path` relative to `root` with `/` separators.
pub(crate) fn relative_posix(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).map_err(|_| {
        DataError::Config(format!(
            "{} is not under {}",
            path.display(),
            root.display()
        ))
    })?;
    let mut parts = Vec::new();
    for component in rel.components() {
        let part = component.as_os_str().to_str().ok_or_else(|| {
            DataError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "file name is not UTF-8"),
            )
        })?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC_SHA: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn parse(yaml: &str) -> Result<Manifest> {
        Manifest::from_yaml_str(yaml, Path::new("inventory.yml"), "inventory.yml")
    }

    #[test]
    fn test_parse_tolerates_absent_and_empty_hash() {
        let yaml = format!(
            concat!(
                "files:\n",
                "- path: a.csv\n  sha256: {}\n",
                "- path: b/c.csv\n",
                "- path: d.csv\n  sha256: ''\n",
                "- path: e.csv\n  sha256:\n",
            ),
            ABC_SHA
        );
        let manifest = parse(&yaml).unwrap();
        assert_eq!(manifest.len(), 4);
        assert_eq!(manifest.files[0].content_hash.as_deref(), Some(ABC_SHA));
        assert_eq!(manifest.files[1].content_hash, None);
        assert_eq!(manifest.files[2].content_hash, None);
        assert_eq!(manifest.files[3].content_hash, None);
        assert_eq!(manifest.paths().collect::<Vec<_>>(), ["a.csv", "b/c.csv", "d.csv", "e.csv"]);
    }

    #[test]
    fn test_serialized_shape() {
        let manifest = Manifest::new(vec![
            Entry::new("a.csv", Some(ABC_SHA.to_string())),
            Entry::new("b.csv", None),
        ]);
        let yaml = manifest.to_yaml_string().unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let files = value["files"].as_sequence().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["path"].as_str(), Some("a.csv"));
        assert_eq!(files[0]["sha256"].as_str(), Some(ABC_SHA));
        assert!(files[1].get("sha256").is_none());

        assert_eq!(parse(&yaml).unwrap(), manifest);
    }

    #[test]
    fn test_malformed_manifests_are_rejected() {
        let cases = [
            "files:\n- sha256: abc\n".to_string(),
            "files: 3\n".to_string(),
            "entries: []\n".to_string(),
            "files:\n- path: [1, 2]\n".to_string(),
            "files:\n- path: /etc/passwd\n".to_string(),
            "files:\n- path: ../outside.csv\n".to_string(),
            "files:\n- path: a.csv\n- path: a.csv\n".to_string(),
            "files:\n- path: a.csv\n  sha256: NOTAHEX\n".to_string(),
            "files:\n- path: inventory.yml\n".to_string(),
            "files:\n- path: a//b.csv\n".to_string(),
            "files:\n- path: a/./b.csv\n".to_string(),
            "files:\n- path: a/\n".to_string(),
            "files:\n- path: a/b.csv\n- path: a/./b.csv\n".to_string(),
        ];
        for yaml in &cases {
            let err = parse(yaml).unwrap_err();
            assert!(
                matches!(err, DataError::MalformedManifest { .. }),
                "expected malformed for {:?}, got {:?}",
                yaml,
                err
            );
        }
    }

    #[test]
    fn test_empty_manifest_round_trips() {
        let yaml = Manifest::default().to_yaml_string().unwrap();
        assert!(parse(&yaml).unwrap().is_empty());
    }

    #[test]
    fn test_entry_resolve_and_relative_posix() {
        let root = Path::new("/srv/data");
        let entry = Entry::new("private_data/2019/runs.csv", None);
        assert_eq!(
            entry.resolve(root),
            PathBuf::from("/srv/data/private_data/2019/runs.csv")
        );
        assert_eq!(
            relative_posix(root, &entry.resolve(root)).unwrap(),
            "private_data/2019/runs.csv"
        );
        assert!(relative_posix(root, Path::new("/elsewhere/x.csv")).is_err());
    }
}
