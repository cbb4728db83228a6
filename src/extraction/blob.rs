//! Entropy blob type for extracted keypoint data.

use crate::features::KeypointDescriptor;

/// Flattened keypoint data from one collection attempt.
///
/// Values are `[x, y, scale]` triples in detector-then-descriptor order.
/// An empty blob means the attempt found nothing usable and should be
/// retried; it is never an error.
#[derive(Clone, Default, PartialEq)]
pub struct EntropyBlob {
    /// Flattened descriptor values.
    values: Vec<f64>,
    /// Number of entropy-bearing regions that contributed.
    regions: usize,
    /// Sequence number of the source frame.
    source_sequence: u64,
}

impl EntropyBlob {
    /// Creates an empty blob for the frame with the given sequence number.
    pub fn new(source_sequence: u64) -> Self {
        Self {
            values: Vec::new(),
            regions: 0,
            source_sequence,
        }
    }

    /// Creates a blob directly from raw values.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            regions: 0,
            source_sequence: 0,
        }
    }

    /// Appends the keypoints of one region.
    pub fn push_region(&mut self, keypoints: &[KeypointDescriptor]) {
        self.values.reserve(keypoints.len() * 3);
        for keypoint in keypoints {
            self.values.extend_from_slice(&keypoint.to_triple());
        }
        self.regions += 1;
    }

    /// Returns the flattened values.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the number of values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no values were collected.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of complete keypoint triples.
    #[inline]
    pub fn keypoint_count(&self) -> usize {
        self.values.len() / 3
    }

    /// Returns the number of regions that contributed.
    #[inline]
    pub fn region_count(&self) -> usize {
        self.regions
    }

    /// Returns the source frame sequence number.
    #[inline]
    pub fn source_sequence(&self) -> u64 {
        self.source_sequence
    }

    /// Serializes the values to their canonical text form.
    ///
    /// Each value is rendered in shortest round-trip form (`5.0`, `10.5`)
    /// and values are joined by `,`. Rendered floats never contain a
    /// comma, so distinct blobs always serialize differently.
    pub fn canonical_text(&self) -> String {
        let mut text = String::with_capacity(self.values.len() * 8);
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                text.push(',');
            }
            text.push_str(&format!("{:?}", value));
        }
        text
    }
}

impl std::fmt::Debug for EntropyBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropyBlob")
            .field("values", &self.values.len())
            .field("regions", &self.regions)
            .field("source_sequence", &self.source_sequence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_text() {
        let blob = EntropyBlob::from_values(vec![10.5, 20.25, 5.0]);
        assert_eq!(blob.canonical_text(), "10.5,20.25,5.0");
    }

    #[test]
    fn test_canonical_text_distinguishes_splits() {
        // Plain concatenation would render both as "1.215.0".
        let a = EntropyBlob::from_values(vec![1.2, 15.0]);
        let b = EntropyBlob::from_values(vec![1.21, 5.0]);
        assert_ne!(a.canonical_text(), b.canonical_text());
    }

    #[test]
    fn test_push_region_flattens_in_order() {
        let mut blob = EntropyBlob::new(4);
        blob.push_region(&[
            KeypointDescriptor::new(1.0, 2.0, 31.0),
            KeypointDescriptor::new(3.0, 4.0, 37.2),
        ]);
        blob.push_region(&[]);

        assert_eq!(blob.values(), &[1.0, 2.0, 31.0, 3.0, 4.0, 37.2]);
        assert_eq!(blob.keypoint_count(), 2);
        assert_eq!(blob.region_count(), 2);
        assert_eq!(blob.source_sequence(), 4);
    }

    #[test]
    fn test_empty_blob() {
        let blob = EntropyBlob::new(1);
        assert!(blob.is_empty());
        assert_eq!(blob.canonical_text(), "");
    }
}
