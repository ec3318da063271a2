//! Metrics for the inventory and normalizer
//!
//! Counters and histograms are recorded through the `metrics` facade. The CLI
//! installs an in-process Prometheus recorder and can render a snapshot at exit;
//! without a recorder every call here is a no-op.

use std::fmt;
use std::sync::{Once, OnceLock};
use tracing::{debug, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// All metric names used in the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    InventoryFilesHashed,
    InventoryBytesHashed,
    InventoryHashMismatches,
    InventoryMissingFiles,
    InventoryFilesCopied,
    InventoryBytesCopied,
    NormalizeNamesCleaned,
    NormalizeValuesRejected,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricName::InventoryFilesHashed => "femsntl_inventory_files_hashed_total",
            MetricName::InventoryBytesHashed => "femsntl_inventory_bytes_hashed",
            MetricName::InventoryHashMismatches => "femsntl_inventory_hash_mismatches_total",
            MetricName::InventoryMissingFiles => "femsntl_inventory_missing_files_total",
            MetricName::InventoryFilesCopied => "femsntl_inventory_files_copied_total",
            MetricName::InventoryBytesCopied => "femsntl_inventory_bytes_copied",
            MetricName::NormalizeNamesCleaned => "femsntl_normalize_names_cleaned_total",
            MetricName::NormalizeValuesRejected => "femsntl_normalize_values_rejected_total",
        };
        write!(f, "{}", name)
    }
}

impl MetricName {
    pub fn as_str(&self) -> String {
        self.to_string()
    }
}

/// Install the global in-process recorder. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| {
        match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                if HANDLE.set(handle).is_err() {
                    warn!("Metrics handle was already set");
                }
                debug!("Prometheus recorder installed");
            }
            Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
        }
    });
}

/// Render the current metric values in Prometheus exposition format.
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

pub mod inventory {
    use super::MetricName;

    pub fn file_hashed(bytes: u64) {
        ::metrics::counter!(MetricName::InventoryFilesHashed.as_str()).increment(1);
        ::metrics::histogram!(MetricName::InventoryBytesHashed.as_str()).record(bytes as f64);
    }

    pub fn hash_mismatch() {
        ::metrics::counter!(MetricName::InventoryHashMismatches.as_str()).increment(1);
    }

    pub fn missing_file() {
        ::metrics::counter!(MetricName::InventoryMissingFiles.as_str()).increment(1);
    }

    pub fn file_copied(bytes: u64) {
        ::metrics::counter!(MetricName::InventoryFilesCopied.as_str()).increment(1);
        ::metrics::histogram!(MetricName::InventoryBytesCopied.as_str()).record(bytes as f64);
    }
}

pub mod normalize {
    use super::MetricName;

    pub fn name_cleaned() {
        ::metrics::counter!(MetricName::NormalizeNamesCleaned.as_str()).increment(1);
    }

    /// A value the normalizer refused to guess at (ambiguous year, over-wide month).
    pub fn value_rejected(kind: &'static str) {
        ::metrics::counter!(MetricName::NormalizeValuesRejected.as_str(), "kind" => kind)
            .increment(1);
    }
}
