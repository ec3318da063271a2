/// File and directory name constants shared by the CLI and the library.
/// These mirror the conventional layout of a project data directory.

// Inventory
pub const INVENTORY_FILE_NAME: &str = "inventory.yml";
pub const SHARED_EXTERNALLY_DIR: &str = "data_shared_externally";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_NEW_DATA_DIR: &str = "new_data";

// Hashing reads files in fixed-size chunks so memory stays bounded on large files
pub const HASH_CHUNK_SIZE: usize = 8192;

// Project layout (relative to the project root)
pub const DATA_DIR: &str = "data";
pub const PRIVATE_DATA_DIR: &str = "private_data";
pub const PUBLIC_DATA_DIR: &str = "public_data";
pub const INTERMEDIATE_DIR: &str = "intermediate_objects";
pub const OUTPUT_DIR: &str = "output";

/// Files whose presence marks a directory as the project root
pub const ROOT_MARKERS: &[&str] = &[".git", "Cargo.toml", "pyproject.toml", "poetry.lock"];

// Configuration
pub const CONFIG_FILE_NAME: &str = "femsntl.toml";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DATA_DIR_ENV: &str = "FEMSNTL_DATA_DIR";
pub const LOG_DIR_ENV: &str = "FEMSNTL_LOG_DIR";

/// Separator used when several names are folded into a single field
pub const NAME_JOIN_SEPARATOR: &str = "; ";
