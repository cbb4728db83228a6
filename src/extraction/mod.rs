//! Entropy blob collection.
//!
//! This module runs one collection attempt: read a frame, localize
//! regions, keep those of the entropy-bearing class and flatten their
//! keypoints into an [`EntropyBlob`].

mod blob;

pub use blob::EntropyBlob;

use crate::capture::{CaptureError, CaptureSession, FrameSource};
use crate::detection::RegionDetector;
use crate::features::FeatureExtractor;

/// Collects entropy blobs from frames.
///
/// Combines a region detector and a feature extractor. Only regions
/// labelled with the entropy-bearing class contribute.
pub struct EntropyCollector<D, E> {
    detector: D,
    extractor: E,
    entropy_class: u32,
}

impl<D: RegionDetector, E: FeatureExtractor> EntropyCollector<D, E> {
    pub fn new(detector: D, extractor: E, entropy_class: u32) -> Self {
        Self {
            detector,
            extractor,
            entropy_class,
        }
    }

    /// Returns the entropy-bearing class label.
    pub fn entropy_class(&self) -> u32 {
        self.entropy_class
    }

    /// Performs one collection attempt.
    ///
    /// Returns an empty blob if no qualifying region or keypoint was
    /// found. Frame acquisition failures are propagated.
    pub fn collect<S: FrameSource + ?Sized>(
        &mut self,
        session: &mut CaptureSession<'_, S>,
    ) -> Result<EntropyBlob, CaptureError> {
        let frame = session.read()?;
        let regions = self.detector.detect(&frame);

        let mut blob = EntropyBlob::new(frame.sequence());
        for region in regions.iter().filter(|r| r.class_id == self.entropy_class) {
            let keypoints = self.extractor.describe(&frame, region);
            blob.push_region(&keypoints);
        }

        tracing::trace!(
            sequence = frame.sequence(),
            detected = regions.len(),
            matching = blob.region_count(),
            values = blob.len(),
            "Collection attempt complete"
        );

        Ok(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureConfig, Frame, SyntheticLampSource};
    use crate::detection::Region;
    use crate::features::KeypointDescriptor;

    struct FixedDetector(Vec<Region>);

    impl RegionDetector for FixedDetector {
        fn detect(&mut self, _frame: &Frame) -> Vec<Region> {
            self.0.clone()
        }
    }

    /// Emits one keypoint per region, positioned at the region origin.
    struct OriginExtractor;

    impl FeatureExtractor for OriginExtractor {
        fn describe(&self, _frame: &Frame, region: &Region) -> Vec<KeypointDescriptor> {
            vec![KeypointDescriptor::new(
                region.x as f64,
                region.y as f64,
                region.class_id as f64,
            )]
        }
    }

    fn source() -> SyntheticLampSource {
        SyntheticLampSource::with_seed(CaptureConfig::with_dimensions(64, 48), 1)
    }

    #[test]
    fn test_only_entropy_class_contributes() {
        let detector = FixedDetector(vec![
            Region::new(1.0, 2.0, 5.0, 5.0, 0.9, 0),
            Region::new(7.0, 8.0, 5.0, 5.0, 0.9, 3),
            Region::new(9.0, 10.0, 5.0, 5.0, 0.9, 0),
        ]);
        let mut collector = EntropyCollector::new(detector, OriginExtractor, 0);
        let mut source = source();
        let mut session = CaptureSession::open(&mut source).unwrap();

        let blob = collector.collect(&mut session).unwrap();
        assert_eq!(blob.values(), &[1.0, 2.0, 0.0, 9.0, 10.0, 0.0]);
        assert_eq!(blob.region_count(), 2);
        assert_eq!(blob.source_sequence(), 1);
    }

    #[test]
    fn test_no_regions_yields_empty_blob() {
        let mut collector = EntropyCollector::new(FixedDetector(Vec::new()), OriginExtractor, 0);
        let mut source = source();
        let mut session = CaptureSession::open(&mut source).unwrap();

        let blob = collector.collect(&mut session).unwrap();
        assert!(blob.is_empty());
    }

    #[test]
    fn test_end_of_stream_propagates() {
        let mut collector = EntropyCollector::new(FixedDetector(Vec::new()), OriginExtractor, 0);
        let mut source = source().with_frame_limit(0);
        let mut session = CaptureSession::open(&mut source).unwrap();

        assert!(matches!(
            collector.collect(&mut session),
            Err(CaptureError::EndOfStream)
        ));
    }
}
