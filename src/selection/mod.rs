//! Distinct index selection.
//!
//! Ties collection and sampling together: [`UniqueIndexSetBuilder`]
//! keeps drawing from fresh camera attempts until the requested number
//! of distinct indices exists, recording each accepted blob for audit.

mod builder;
mod cancel;
mod record;

pub use builder::{BuildOutcome, GeneratedIndices, SelectionError, UniqueIndexSetBuilder};
pub use cancel::CancelToken;
pub use record::{BlobSummary, BuildStats, IndexAudit, IndexRecord, IndexSelection};
