//! FAST-9 keypoints over a scale pyramid.
//!
//! Each pyramid level is searched with the segment test on a
//! 16-pixel Bresenham circle of radius 3, followed by 3x3 non-maximum
//! suppression. Keypoint positions are mapped back to level-0 canonical
//! coordinates and sized `patch_size * scale_factor^level`.

use super::{FeatureConfig, FeatureExtractor, KeypointDescriptor, RegionNormalizer};
use crate::capture::Frame;
use crate::detection::Region;
use image::imageops::{self, FilterType};
use image::GrayImage;

const CIRCLE: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

const ARC_LENGTH: u32 = 9;
const BORDER: u32 = 3;

#[derive(Debug, Clone, Copy)]
struct Corner {
    x: u32,
    y: u32,
    level: u32,
    score: u32,
}

/// Keypoint extractor combining region normalization with FAST-9.
#[derive(Debug, Clone)]
pub struct FastKeypointExtractor {
    normalizer: RegionNormalizer,
    threshold: u8,
    levels: u32,
    scale_factor: f64,
    patch_size: f64,
    max_keypoints: usize,
}

impl FastKeypointExtractor {
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            normalizer: RegionNormalizer::from(config),
            threshold: config.fast_threshold,
            levels: config.pyramid_levels.max(1),
            scale_factor: config.scale_factor,
            patch_size: config.patch_size,
            max_keypoints: config.max_keypoints,
        }
    }

    /// Detects keypoints on an already normalized patch.
    pub fn detect_keypoints(&self, patch: &GrayImage) -> Vec<KeypointDescriptor> {
        let mut corners = Vec::new();
        let mut level_image = patch.clone();

        for level in 0..self.levels {
            if level > 0 {
                let scale = self.scale_factor.powi(level as i32);
                let width = (patch.width() as f64 / scale).round() as u32;
                let height = (patch.height() as f64 / scale).round() as u32;
                if width <= 2 * BORDER || height <= 2 * BORDER {
                    break;
                }
                level_image = imageops::resize(patch, width, height, FilterType::Triangle);
            }
            corners.extend(fast9(&level_image, self.threshold, level));
        }

        // Strongest first; ties broken by position so the order is total.
        corners.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.level.cmp(&b.level))
                .then(a.y.cmp(&b.y))
                .then(a.x.cmp(&b.x))
        });
        corners.truncate(self.max_keypoints);

        corners
            .into_iter()
            .map(|c| {
                let scale = self.scale_factor.powi(c.level as i32);
                KeypointDescriptor::new(
                    c.x as f64 * scale,
                    c.y as f64 * scale,
                    self.patch_size * scale,
                )
            })
            .collect()
    }
}

impl Default for FastKeypointExtractor {
    fn default() -> Self {
        Self::new(&FeatureConfig::default())
    }
}

impl FeatureExtractor for FastKeypointExtractor {
    fn describe(&self, frame: &Frame, region: &Region) -> Vec<KeypointDescriptor> {
        match self.normalizer.normalize(frame, region) {
            Some(patch) => self.detect_keypoints(&patch),
            None => {
                tracing::trace!(?region, "Region outside frame, no keypoints");
                Vec::new()
            }
        }
    }
}

/// Runs the FAST-9 segment test with non-maximum suppression.
fn fast9(image: &GrayImage, threshold: u8, level: u32) -> Vec<Corner> {
    let (width, height) = image.dimensions();
    if width <= 2 * BORDER || height <= 2 * BORDER {
        return Vec::new();
    }

    let mut scores = vec![0u32; (width * height) as usize];
    for y in BORDER..height - BORDER {
        for x in BORDER..width - BORDER {
            scores[(y * width + x) as usize] = corner_score(image, x, y, threshold);
        }
    }

    let mut corners = Vec::new();
    for y in BORDER..height - BORDER {
        for x in BORDER..width - BORDER {
            let score = scores[(y * width + x) as usize];
            if score == 0 {
                continue;
            }
            let is_max = (-1i32..=1).all(|dy| {
                (-1i32..=1).all(|dx| {
                    if dx == 0 && dy == 0 {
                        return true;
                    }
                    let nx = (x as i32 + dx) as u32;
                    let ny = (y as i32 + dy) as u32;
                    let neighbour = scores[(ny * width + nx) as usize];
                    // Strict on one side so equal plateaus keep exactly one pixel.
                    if (dy, dx) < (0, 0) {
                        score > neighbour
                    } else {
                        score >= neighbour
                    }
                })
            });
            if is_max {
                corners.push(Corner { x, y, level, score });
            }
        }
    }
    corners
}

/// Returns the corner score at `(x, y)`, or 0 if it is not a corner.
///
/// The score is the summed excess contrast of the circle pixels on the
/// winning side (brighter or darker) of the centre.
fn corner_score(image: &GrayImage, x: u32, y: u32, threshold: u8) -> u32 {
    let center = image.get_pixel(x, y).0[0] as i32;
    let t = threshold as i32;

    let mut brighter = 0u32;
    let mut darker = 0u32;
    let mut bright_sum = 0u32;
    let mut dark_sum = 0u32;

    for (i, (dx, dy)) in CIRCLE.iter().enumerate() {
        let value = image
            .get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)
            .0[0] as i32;
        if value > center + t {
            brighter |= 1 << i;
            bright_sum += (value - center - t) as u32;
        } else if value < center - t {
            darker |= 1 << i;
            dark_sum += (center - t - value) as u32;
        }
    }

    let bright = has_arc(brighter);
    let dark = has_arc(darker);
    match (bright, dark) {
        (true, true) => bright_sum.max(dark_sum),
        (true, false) => bright_sum.max(1),
        (false, true) => dark_sum.max(1),
        (false, false) => 0,
    }
}

/// Checks for `ARC_LENGTH` contiguous set bits on the 16-bit ring.
fn has_arc(mask: u32) -> bool {
    if mask.count_ones() < ARC_LENGTH {
        return false;
    }
    let ring = mask | (mask << 16);
    let mut run = 0;
    for i in 0..32 {
        if ring & (1 << i) != 0 {
            run += 1;
            if run >= ARC_LENGTH {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}
