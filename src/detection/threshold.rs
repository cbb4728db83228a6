//! Luminance-threshold blob detector.
//!
//! Segments bright pixels into 8-connected components and reports the
//! bounding box of each. Confidence is the component's fill ratio
//! relative to an inscribed ellipse, so round wax blobs score close
//! to 1 while smeared or merged shapes score lower.

use super::{DetectorConfig, Region, RegionDetector};
use crate::capture::Frame;
use std::collections::VecDeque;

/// Class label assigned to every component found by [`ThresholdBlobDetector`].
pub const WAX_CLASS: u32 = 0;

const ELLIPSE_FILL: f32 = std::f32::consts::FRAC_PI_4;

/// Stateless detector for bright, roughly elliptical blobs.
#[derive(Debug, Clone)]
pub struct ThresholdBlobDetector {
    luminance_threshold: u8,
    min_area: u32,
    confidence_threshold: f32,
}

impl ThresholdBlobDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            luminance_threshold: config.luminance_threshold,
            min_area: config.min_area.max(1),
            confidence_threshold: config.confidence_threshold,
        }
    }

    /// Grows the component containing `(sx, sy)` and clears it from `mask`.
    fn grow(mask: &mut [bool], width: usize, height: usize, sx: usize, sy: usize) -> Component {
        let mut component = Component {
            min_x: sx,
            min_y: sy,
            max_x: sx,
            max_y: sy,
            area: 0,
        };
        let mut queue = VecDeque::from([(sx, sy)]);
        mask[sy * width + sx] = false;

        while let Some((x, y)) = queue.pop_front() {
            component.area += 1;
            component.min_x = component.min_x.min(x);
            component.min_y = component.min_y.min(y);
            component.max_x = component.max_x.max(x);
            component.max_y = component.max_y.max(y);

            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let idx = ny as usize * width + nx as usize;
                    if mask[idx] {
                        mask[idx] = false;
                        queue.push_back((nx as usize, ny as usize));
                    }
                }
            }
        }

        component
    }
}

impl Default for ThresholdBlobDetector {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}

#[derive(Debug)]
struct Component {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    area: u32,
}

impl Component {
    fn to_region(&self) -> Region {
        let width = (self.max_x - self.min_x + 1) as f32;
        let height = (self.max_y - self.min_y + 1) as f32;
        let fill = self.area as f32 / (width * height);
        Region::new(
            self.min_x as f32,
            self.min_y as f32,
            width,
            height,
            (fill / ELLIPSE_FILL).min(1.0),
            WAX_CLASS,
        )
    }
}

impl RegionDetector for ThresholdBlobDetector {
    fn detect(&mut self, frame: &Frame) -> Vec<Region> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;

        let mut mask: Vec<bool> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| frame.luma(x as u32, y as u32) >= self.luminance_threshold)
            .collect();

        let mut regions = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if !mask[y * width + x] {
                    continue;
                }
                let component = Self::grow(&mut mask, width, height, x, y);
                if component.area < self.min_area {
                    continue;
                }
                let region = component.to_region();
                if region.confidence >= self.confidence_threshold {
                    regions.push(region);
                }
            }
        }

        tracing::trace!(
            sequence = frame.sequence(),
            regions = regions.len(),
            "Threshold detection complete"
        );
        regions
    }
}
