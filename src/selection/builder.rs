//! Unique index set construction.
//!
//! Repeatedly collects a blob and samples an index from it until the
//! requested number of distinct indices has been accepted. Empty blobs
//! and duplicate indices are retried locally and never surface.

use super::cancel::CancelToken;
use super::record::{IndexAudit, IndexRecord, IndexSelection};
use crate::capture::{CaptureError, CaptureSession, FrameSource};
use crate::conditioning::{SampleError, UniformSampler};
use crate::detection::RegionDetector;
use crate::extraction::EntropyCollector;
use crate::features::FeatureExtractor;
use chrono::Utc;
use thiserror::Error;

/// Errors that end a build call.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("target count must be at least 1")]
    InvalidTargetCount,
    #[error("cannot select {requested} distinct indices from {available}")]
    UnreachableTargetCount { requested: usize, available: usize },
    #[error("index bound {0} exceeds the sampler's range")]
    BoundTooLarge(usize),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Result of a build call that did not fail.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// All requested indices were collected.
    Complete(IndexSelection),
    /// Cancellation was observed; holds whatever was accepted before it.
    Cancelled(IndexSelection),
}

impl BuildOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn selection(&self) -> &IndexSelection {
        match self {
            Self::Complete(s) | Self::Cancelled(s) => s,
        }
    }

    pub fn into_selection(self) -> IndexSelection {
        match self {
            Self::Complete(s) | Self::Cancelled(s) => s,
        }
    }
}

/// Indices plus their audit entries, as handed to consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedIndices {
    /// Distinct indices in acceptance order.
    pub indices: Vec<usize>,
    pub audit: Vec<IndexAudit>,
}

/// Drives collection and sampling until enough distinct indices exist.
pub struct UniqueIndexSetBuilder<S, D, E> {
    source: S,
    collector: EntropyCollector<D, E>,
    sampler: UniformSampler,
    cancel: CancelToken,
}

impl<S, D, E> UniqueIndexSetBuilder<S, D, E>
where
    S: FrameSource,
    D: RegionDetector,
    E: FeatureExtractor,
{
    pub fn new(source: S, collector: EntropyCollector<D, E>, sampler: UniformSampler) -> Self {
        Self {
            source,
            collector,
            sampler,
            cancel: CancelToken::new(),
        }
    }

    /// Replaces the cancellation token checked by [`build`](Self::build).
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns a handle that cancels in-progress and future builds.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Returns the frame source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Collects `target_count` distinct indices in `[0, max_index_exclusive)`.
    ///
    /// The frame source is opened once, held across all attempts and
    /// released before returning on every path. There is no retry
    /// bound; cancel through [`cancel_token`](Self::cancel_token).
    pub fn build(
        &mut self,
        target_count: usize,
        max_index_exclusive: usize,
    ) -> Result<BuildOutcome, SelectionError> {
        if target_count == 0 {
            return Err(SelectionError::InvalidTargetCount);
        }
        if target_count > max_index_exclusive {
            return Err(SelectionError::UnreachableTargetCount {
                requested: target_count,
                available: max_index_exclusive,
            });
        }
        let max_index = i64::try_from(max_index_exclusive - 1)
            .map_err(|_| SelectionError::BoundTooLarge(max_index_exclusive))?;

        let mut session = CaptureSession::open(&mut self.source)?;
        let mut selection = IndexSelection::new();

        while selection.len() < target_count {
            if self.cancel.is_cancelled() {
                tracing::info!(
                    accepted = selection.len(),
                    target = target_count,
                    "Selection cancelled"
                );
                return Ok(BuildOutcome::Cancelled(selection));
            }

            selection.stats_mut().attempts += 1;
            let attempt = selection.stats().attempts;

            let blob = self.collector.collect(&mut session)?;
            if blob.is_empty() {
                selection.stats_mut().empty_blobs += 1;
                tracing::debug!(attempt, "No entropy-bearing region found, retrying");
                continue;
            }

            let draw = self.sampler.draw(&blob, 0, max_index)?;
            selection.stats_mut().rehashes += draw.rehashes as u64;
            // In range by construction: 0 <= value <= max_index.
            let index = draw.value as usize;

            let values = blob.len();
            let record = IndexRecord {
                blob,
                index,
                digest: draw.digest,
                accepted_at: Utc::now(),
            };
            if selection.accept(record) {
                selection.stats_mut().accepted += 1;
                tracing::debug!(attempt, index, values, "Index accepted");
            } else {
                selection.stats_mut().duplicates += 1;
                tracing::debug!(attempt, index, "Duplicate index discarded");
            }
        }

        tracing::info!(
            accepted = selection.len(),
            attempts = selection.stats().attempts,
            frames = session.frames_read(),
            "Selection complete"
        );
        Ok(BuildOutcome::Complete(selection))
    }

    /// Consumer entry point: indices into an external collection of
    /// `exclusive_upper_bound` items, with per-index blob summaries.
    ///
    /// Returns `Ok(None)` if the run was cancelled.
    pub fn generate_indices(
        &mut self,
        count: usize,
        exclusive_upper_bound: usize,
    ) -> Result<Option<GeneratedIndices>, SelectionError> {
        match self.build(count, exclusive_upper_bound)? {
            BuildOutcome::Complete(selection) => Ok(Some(GeneratedIndices {
                indices: selection.indices(),
                audit: selection.audit(),
            })),
            BuildOutcome::Cancelled(_) => Ok(None),
        }
    }
}
