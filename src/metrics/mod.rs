//! Prometheus metrics exporter for index selection.
//!
//! # Metrics Exposed
//!
//! ## Last build
//! - `optical_index_selection_complete` - 1 if the last build completed, 0 if cancelled
//! - `optical_index_target_count` - Indices requested
//! - `optical_index_accepted_indices` - Distinct indices accepted
//! - `optical_index_last_blob_values` - Length of the last accepted blob
//!
//! ## Cumulative
//! - `optical_index_builds_total` - Build calls recorded
//! - `optical_index_attempts_total` - Collection attempts
//! - `optical_index_empty_blobs_total` - Attempts without an entropy-bearing region
//! - `optical_index_duplicate_indices_total` - Duplicate indices discarded
//! - `optical_index_sampler_rehashes_total` - Rejection-sampling re-hashes
//!
//! # Example
//!
//! ```no_run
//! use optical_index::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! registry.update(&MetricsSnapshot::default());
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
