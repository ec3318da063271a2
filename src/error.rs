use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(
        "{} inventoried file(s) missing under {}: {}",
        .paths.len(),
        .root.display(),
        .paths.join(", ")
    )]
    MissingFiles { root: PathBuf, paths: Vec<String> },

    /// Entries that failed for reasons other than being absent, plus any absent ones.
    #[error(
        "Inventoried files under {} could not be read: {}",
        .root.display(),
        describe_failures(.missing, .failures)
    )]
    UnreadableFiles {
        root: PathBuf,
        missing: Vec<String>,
        failures: Vec<EntryFailure>,
    },

    #[error("Destination already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Malformed manifest {}: {message}", .path.display())]
    MalformedManifest { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No project root found above {}", .0.display())]
    NoProjectRoot(PathBuf),

    #[error("No files starting with '{prefix}' in {}", .dir.display())]
    NoMatchingFiles { dir: PathBuf, prefix: String },
}

impl DataError {
    /// Wrap an I/O error with the path it happened on. A missing file maps to `NotFound`.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == std::io::ErrorKind::NotFound {
            DataError::NotFound(path)
        } else {
            DataError::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound(_) | DataError::MissingFiles { .. })
    }
}

/// A manifest entry whose file exists but could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub path: String,
    pub reason: String,
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.reason)
    }
}

fn describe_failures(missing: &[String], failures: &[EntryFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .chain(missing.iter().map(|p| format!("{} (missing)", p)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, DataError>;
