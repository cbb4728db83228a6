//! Accepted samples and their audit trail.

use crate::conditioning::Digest;
use crate::extraction::EntropyBlob;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

const SUMMARY_HEAD: usize = 6;

/// One accepted sample: the blob and the index it produced.
#[derive(Debug, Clone)]
pub struct IndexRecord {
    pub blob: EntropyBlob,
    pub index: usize,
    pub digest: Digest,
    pub accepted_at: DateTime<Utc>,
}

impl IndexRecord {
    /// Returns a compact description of the blob for display.
    pub fn summary(&self) -> BlobSummary {
        BlobSummary {
            values: self.blob.len(),
            keypoints: self.blob.keypoint_count(),
            regions: self.blob.region_count(),
            head: self.blob.values().iter().take(SUMMARY_HEAD).copied().collect(),
            digest_prefix: self.digest.to_hex()[..16].to_string(),
        }
    }
}

/// Display-sized view of an entropy blob.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlobSummary {
    pub values: usize,
    pub keypoints: usize,
    pub regions: usize,
    /// The first few values of the blob.
    pub head: Vec<f64>,
    pub digest_prefix: String,
}

impl std::fmt::Display for BlobSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} values ({} keypoints, {} regions) {:?}",
            self.values, self.keypoints, self.regions, self.head
        )?;
        if self.values > self.head.len() {
            f.write_str(" ...")?;
        }
        write!(f, " digest {}", self.digest_prefix)
    }
}

/// `{blob_summary, index}` pair handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexAudit {
    pub index: usize,
    pub summary: BlobSummary,
}

/// Counters for one build call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Collection attempts started.
    pub attempts: u64,
    /// Attempts that produced an empty blob.
    pub empty_blobs: u64,
    /// Sampled indices discarded as already collected.
    pub duplicates: u64,
    /// Digest re-hashes performed by rejection sampling.
    pub rehashes: u64,
    /// Indices accepted.
    pub accepted: u64,
}

/// The accepted, pairwise-distinct indices of one build call.
#[derive(Debug, Clone, Default)]
pub struct IndexSelection {
    records: Vec<IndexRecord>,
    set: HashSet<usize>,
    stats: BuildStats,
}

impl IndexSelection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `record` unless its index is already present.
    ///
    /// Returns false for duplicates.
    pub(crate) fn accept(&mut self, record: IndexRecord) -> bool {
        if !self.set.insert(record.index) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub(crate) fn stats_mut(&mut self) -> &mut BuildStats {
        &mut self.stats
    }

    /// Returns the indices in acceptance order.
    pub fn indices(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.index).collect()
    }

    /// Returns the accepted records in acceptance order.
    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    /// Returns true if `index` was accepted.
    pub fn contains(&self, index: usize) -> bool {
        self.set.contains(&index)
    }

    /// Returns the accepted indices as a set.
    pub fn as_set(&self) -> &HashSet<usize> {
        &self.set
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the counters accumulated while building.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Returns the audit entries in acceptance order.
    pub fn audit(&self) -> Vec<IndexAudit> {
        self.records
            .iter()
            .map(|r| IndexAudit {
                index: r.index,
                summary: r.summary(),
            })
            .collect()
    }
}
