//! Frame type representing a captured image with metadata.

use image::RgbImage;
use std::time::Instant;

/// A single captured frame from a frame source.
///
/// Holds RGB pixel data along with the metadata needed to
/// correlate audit records back to the attempt that produced them.
#[derive(Clone)]
pub struct Frame {
    /// Pixel data, 3 bytes per pixel.
    image: RgbImage,
    /// Capture timestamp.
    timestamp: Instant,
    /// Monotonic sequence number.
    sequence: u64,
}

impl Frame {
    /// Creates a frame from an already decoded RGB image.
    pub fn new(image: RgbImage, sequence: u64) -> Self {
        Self {
            image,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Creates a frame from a raw RGB buffer.
    ///
    /// Returns `None` if the buffer length does not match `width * height * 3`.
    pub fn from_rgb(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Option<Self> {
        RgbImage::from_raw(width, height, pixels).map(|image| Self::new(image, sequence))
    }

    /// Returns the underlying RGB image.
    #[inline]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width() as usize) * (self.height() as usize)
    }

    /// Returns the Rec. 601 luma of the pixel at `(x, y)`.
    #[inline]
    pub fn luma(&self, x: u32, y: u32) -> u8 {
        let [r, g, b] = self.image.get_pixel(x, y).0;
        ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.image.as_raw().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::from_rgb(vec![0u8; 640 * 480 * 3], 640, 480, 1).unwrap();

        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.sequence(), 1);
        assert_eq!(frame.pixel_count(), 640 * 480);
    }

    #[test]
    fn test_frame_invalid_size() {
        // Wrong size
        assert!(Frame::from_rgb(vec![0u8; 100], 640, 480, 1).is_none());
    }

    #[test]
    fn test_luma_weights() {
        let frame = Frame::from_rgb(vec![255, 255, 255, 0, 0, 0], 2, 1, 1).unwrap();
        assert_eq!(frame.luma(0, 0), 255);
        assert_eq!(frame.luma(1, 0), 0);
    }
}
