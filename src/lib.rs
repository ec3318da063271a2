pub mod config;
pub mod constants;
pub mod datafiles;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod stdio;
pub mod table;

pub use error::{DataError, EntryFailure, Result};
pub use inventory::{Entry, InventoryManager, Manifest, VerifyReport};
