//! Region detection.
//!
//! A [`RegionDetector`] localizes objects in a frame and labels each
//! with a class and a confidence. The rest of the pipeline only depends
//! on this trait, so a trained model, the built-in luminance detector
//! or a test double can be injected interchangeably.

mod threshold;

pub use threshold::{ThresholdBlobDetector, WAX_CLASS};

use crate::capture::{ConfigError, Frame};
use serde::{Deserialize, Serialize};

/// A localized region reported by a detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge in frame pixels.
    pub x: f32,
    /// Top edge in frame pixels.
    pub y: f32,
    /// Width in frame pixels.
    pub width: f32,
    /// Height in frame pixels.
    pub height: f32,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,
    /// Class label.
    pub class_id: u32,
}

impl Region {
    pub fn new(x: f32, y: f32, width: f32, height: f32, confidence: f32, class_id: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
            class_id,
        }
    }

    /// Returns the integer pixel rectangle `(x, y, width, height)` of this
    /// region clipped to a `frame_width` × `frame_height` frame.
    ///
    /// Returns `None` if nothing of the region lies inside the frame.
    pub fn pixel_bounds(&self, frame_width: u32, frame_height: u32) -> Option<(u32, u32, u32, u32)> {
        if !(self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()) {
            return None;
        }

        let x0 = self.x.max(0.0).floor() as u32;
        let y0 = self.y.max(0.0).floor() as u32;
        let x1 = ((self.x + self.width).ceil().max(0.0) as u32).min(frame_width);
        let y1 = ((self.y + self.height).ceil().max(0.0) as u32).min(frame_height);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0, y0, x1 - x0, y1 - y0))
    }
}

/// Trait for region detectors.
pub trait RegionDetector {
    /// Returns all regions in `frame` at or above the configured
    /// confidence threshold, in a stable order.
    fn detect(&mut self, frame: &Frame) -> Vec<Region>;
}

impl<D: RegionDetector + ?Sized> RegionDetector for Box<D> {
    fn detect(&mut self, frame: &Frame) -> Vec<Region> {
        (**self).detect(frame)
    }
}

/// Detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Regions below this confidence are omitted.
    pub confidence_threshold: f32,
    /// The class whose regions are treated as an entropy source.
    pub entropy_class: u32,
    /// Luma level separating wax from background (built-in detector).
    pub luminance_threshold: u8,
    /// Smallest component area in pixels (built-in detector).
    pub min_area: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            entropy_class: WAX_CLASS,
            luminance_threshold: 120,
            min_area: 16,
        }
    }
}

impl DetectorConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::InvalidConfidence(self.confidence_threshold));
        }
        Ok(())
    }
}
