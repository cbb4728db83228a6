//! Local feature description of detected regions.
//!
//! A [`FeatureExtractor`] turns one region of a frame into a list of
//! keypoints. Regions are normalized to a canonical square first, so
//! keypoint coordinates are comparable regardless of how large the
//! object appeared in the frame.

mod fast;
mod normalize;

pub use fast::FastKeypointExtractor;
pub use normalize::RegionNormalizer;

use crate::capture::{ConfigError, Frame};
use crate::detection::Region;
use serde::{Deserialize, Serialize};

/// A keypoint in canonical region coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeypointDescriptor {
    pub position_x: f64,
    pub position_y: f64,
    /// Diameter of the keypoint neighbourhood.
    pub scale: f64,
}

impl KeypointDescriptor {
    pub fn new(position_x: f64, position_y: f64, scale: f64) -> Self {
        Self {
            position_x,
            position_y,
            scale,
        }
    }

    /// Returns the `[x, y, scale]` triple appended to entropy blobs.
    #[inline]
    pub fn to_triple(&self) -> [f64; 3] {
        [self.position_x, self.position_y, self.scale]
    }
}

/// Trait for feature extractors.
///
/// Implementations must be deterministic: identical frame and region
/// inputs produce identical keypoints in identical order.
pub trait FeatureExtractor {
    fn describe(&self, frame: &Frame, region: &Region) -> Vec<KeypointDescriptor>;
}

impl<E: FeatureExtractor + ?Sized> FeatureExtractor for Box<E> {
    fn describe(&self, frame: &Frame, region: &Region) -> Vec<KeypointDescriptor> {
        (**self).describe(frame, region)
    }
}

/// Region normalization and keypoint detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Side length of the square every region is resized to.
    pub canonical_size: u32,
    /// Gaussian smoothing applied after grayscale conversion.
    pub blur_sigma: f32,
    /// FAST intensity threshold.
    pub fast_threshold: u8,
    /// Number of pyramid levels searched.
    pub pyramid_levels: u32,
    /// Downscale factor between pyramid levels.
    pub scale_factor: f64,
    /// Keypoint diameter at level 0.
    pub patch_size: f64,
    /// Upper bound on keypoints per region.
    pub max_keypoints: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            canonical_size: 256,
            blur_sigma: 2.0, // sigma of an 11x11 Gaussian kernel
            fast_threshold: 20,
            pyramid_levels: 3,
            scale_factor: 1.2,
            patch_size: 31.0,
            max_keypoints: 500,
        }
    }
}

impl FeatureConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canonical_size < 16 {
            return Err(ConfigError::InvalidFeatures("canonical_size must be at least 16"));
        }
        if !(self.blur_sigma > 0.0) {
            return Err(ConfigError::InvalidFeatures("blur_sigma must be positive"));
        }
        if self.pyramid_levels == 0 {
            return Err(ConfigError::InvalidFeatures("pyramid_levels must be at least 1"));
        }
        if !(self.scale_factor > 1.0) {
            return Err(ConfigError::InvalidFeatures("scale_factor must exceed 1"));
        }
        if self.max_keypoints == 0 {
            return Err(ConfigError::InvalidFeatures("max_keypoints must be at least 1"));
        }
        Ok(())
    }
}
