//! Region cropping and normalization.

use super::FeatureConfig;
use crate::capture::Frame;
use crate::detection::Region;
use image::imageops::{self, FilterType};
use image::GrayImage;

/// Crops a region and maps it into canonical space.
///
/// The crop is resized to a fixed square, converted to a single
/// intensity channel and smoothed, in that order.
#[derive(Debug, Clone)]
pub struct RegionNormalizer {
    canonical_size: u32,
    blur_sigma: f32,
}

impl RegionNormalizer {
    pub fn new(canonical_size: u32, blur_sigma: f32) -> Self {
        Self {
            canonical_size: canonical_size.max(1),
            blur_sigma,
        }
    }

    /// Returns the canonical side length.
    pub fn canonical_size(&self) -> u32 {
        self.canonical_size
    }

    /// Produces the normalized grayscale patch for `region`.
    ///
    /// Returns `None` if the region does not overlap the frame.
    pub fn normalize(&self, frame: &Frame, region: &Region) -> Option<GrayImage> {
        let (x, y, width, height) = region.pixel_bounds(frame.width(), frame.height())?;

        let crop = imageops::crop_imm(frame.image(), x, y, width, height).to_image();
        let resized = imageops::resize(
            &crop,
            self.canonical_size,
            self.canonical_size,
            FilterType::Triangle,
        );
        let gray = imageops::grayscale(&resized);

        if self.blur_sigma > 0.0 {
            Some(imageops::blur(&gray, self.blur_sigma))
        } else {
            Some(gray)
        }
    }
}

impl From<&FeatureConfig> for RegionNormalizer {
    fn from(config: &FeatureConfig) -> Self {
        Self::new(config.canonical_size, config.blur_sigma)
    }
}

impl Default for RegionNormalizer {
    fn default() -> Self {
        Self::from(&FeatureConfig::default())
    }
}
