//! Synthetic lava-lamp frame source.
//!
//! Renders a lamp body with drifting bright wax blobs, each speckled
//! with dark bubbles. Blob motion is driven by ChaCha20 so a fixed seed
//! reproduces the same frame sequence. Used for demos and tests; it is
//! NOT an entropy source.

use super::{CaptureConfig, CaptureError, Frame, FrameSource};
use image::{Rgb, RgbImage};
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};

const BACKGROUND: Rgb<u8> = Rgb([18, 18, 28]);
const LAMP_BODY: Rgb<u8> = Rgb([90, 20, 20]);
const WAX: Rgb<u8> = Rgb([255, 160, 40]);
const BUBBLE: Rgb<u8> = Rgb([40, 10, 10]);

const BLOB_COUNT: usize = 4;
const BUBBLES_PER_BLOB: usize = 12;

#[derive(Debug, Clone)]
struct WaxBlob {
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
    radius: f32,
}

/// Axis-aligned lamp body in frame coordinates.
#[derive(Debug, Clone, Copy)]
struct LampBody {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

/// Frame source that renders a moving lava lamp.
pub struct SyntheticLampSource {
    config: CaptureConfig,
    rng: ChaCha20Rng,
    blobs: Vec<WaxBlob>,
    open: bool,
    sequence: u64,
    frame_limit: Option<u64>,
}

impl SyntheticLampSource {
    /// Creates a source seeded from the OS entropy source.
    pub fn new(config: CaptureConfig) -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::from_rng(config, ChaCha20Rng::from_seed(seed))
    }

    /// Creates a reproducible source from a fixed seed.
    pub fn with_seed(config: CaptureConfig, seed: u64) -> Self {
        Self::from_rng(config, ChaCha20Rng::seed_from_u64(seed))
    }

    fn from_rng(config: CaptureConfig, rng: ChaCha20Rng) -> Self {
        Self {
            config,
            rng,
            blobs: Vec::new(),
            open: false,
            sequence: 0,
            frame_limit: None,
        }
    }

    /// Ends the stream after `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    fn unit(&mut self) -> f32 {
        (self.rng.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    fn lamp_body(&self) -> LampBody {
        let w = self.config.width as f32;
        let h = self.config.height as f32;
        LampBody {
            left: w * 0.35,
            top: h * 0.1,
            right: w * 0.65,
            bottom: h * 0.9,
        }
    }

    fn spawn_blobs(&mut self) {
        let body = self.lamp_body();
        let max_radius = ((body.right - body.left) * 0.2).max(2.0);

        let blobs = (0..BLOB_COUNT)
            .map(|_| {
                let radius = max_radius * (0.5 + 0.5 * self.unit());
                WaxBlob {
                    x: body.left + radius + (body.right - body.left - 2.0 * radius) * self.unit(),
                    y: body.top + radius + (body.bottom - body.top - 2.0 * radius) * self.unit(),
                    dx: (self.unit() - 0.5) * 4.0,
                    dy: (self.unit() - 0.5) * 8.0,
                    radius,
                }
            })
            .collect();
        self.blobs = blobs;
    }

    fn step(&mut self) {
        let body = self.lamp_body();
        let mut jitter = [0f32; BLOB_COUNT * 2];
        for j in jitter.iter_mut() {
            *j = self.unit() - 0.5;
        }

        for (i, blob) in self.blobs.iter_mut().enumerate() {
            blob.dx = (blob.dx + jitter[2 * i]).clamp(-3.0, 3.0);
            blob.dy = (blob.dy + jitter[2 * i + 1]).clamp(-6.0, 6.0);
            blob.x += blob.dx;
            blob.y += blob.dy;

            if blob.x - blob.radius < body.left || blob.x + blob.radius > body.right {
                blob.dx = -blob.dx;
                blob.x = blob.x.clamp(body.left + blob.radius, body.right - blob.radius);
            }
            if blob.y - blob.radius < body.top || blob.y + blob.radius > body.bottom {
                blob.dy = -blob.dy;
                blob.y = blob.y.clamp(body.top + blob.radius, body.bottom - blob.radius);
            }
        }
    }

    fn render(&mut self) -> RgbImage {
        let (width, height) = (self.config.width, self.config.height);
        let body = self.lamp_body();
        let mut image = RgbImage::from_pixel(width, height, BACKGROUND);

        for y in body.top as u32..(body.bottom as u32).min(height) {
            for x in body.left as u32..(body.right as u32).min(width) {
                image.put_pixel(x, y, LAMP_BODY);
            }
        }

        let blobs = self.blobs.clone();
        for blob in &blobs {
            let r2 = blob.radius * blob.radius;
            let x0 = (blob.x - blob.radius).max(0.0) as u32;
            let y0 = (blob.y - blob.radius).max(0.0) as u32;
            let x1 = ((blob.x + blob.radius).ceil() as u32).min(width);
            let y1 = ((blob.y + blob.radius).ceil() as u32).min(height);
            for y in y0..y1 {
                for x in x0..x1 {
                    let dx = x as f32 + 0.5 - blob.x;
                    let dy = y as f32 + 0.5 - blob.y;
                    if dx * dx + dy * dy <= r2 {
                        image.put_pixel(x, y, WAX);
                    }
                }
            }

            // Bubbles stay well inside the rim so the blob outline is unchanged.
            for _ in 0..BUBBLES_PER_BLOB {
                let angle = self.unit() * std::f32::consts::TAU;
                let dist = self.unit().sqrt() * blob.radius * 0.7;
                let bx = blob.x + dist * angle.cos();
                let by = blob.y + dist * angle.sin();
                if bx >= 0.0 && by >= 0.0 && (bx as u32) < width && (by as u32) < height {
                    image.put_pixel(bx as u32, by as u32, BUBBLE);
                }
            }
        }

        image
    }
}

impl FrameSource for SyntheticLampSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        self.config
            .validate()
            .map_err(|e| CaptureError::SourceUnavailable(e.to_string()))?;
        self.sequence = 0;
        self.spawn_blobs();
        self.open = true;
        tracing::info!(
            width = self.config.width,
            height = self.config.height,
            "SyntheticLampSource opened"
        );
        Ok(())
    }

    fn read(&mut self) -> Result<Frame, CaptureError> {
        if !self.open {
            return Err(CaptureError::NotOpen);
        }
        if self.frame_limit.is_some_and(|limit| self.sequence >= limit) {
            return Err(CaptureError::EndOfStream);
        }

        self.step();
        let image = self.render();
        self.sequence += 1;
        Ok(Frame::new(image, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.blobs.clear();
            tracing::info!("SyntheticLampSource released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> CaptureConfig {
        CaptureConfig::with_dimensions(160, 120)
    }

    #[test]
    fn test_synthetic_source_lifecycle() {
        let mut source = SyntheticLampSource::with_seed(small_config(), 7);
        assert!(!source.is_open());

        source.open().unwrap();
        assert!(source.is_open());

        let frame = source.read().unwrap();
        assert_eq!(frame.width(), 160);
        assert_eq!(frame.sequence(), 1);
        assert_eq!(source.read().unwrap().sequence(), 2);

        source.release();
        assert!(!source.is_open());
    }

    #[test]
    fn test_read_without_open() {
        let mut source = SyntheticLampSource::with_seed(small_config(), 7);
        assert!(matches!(source.read(), Err(CaptureError::NotOpen)));
    }

    #[test]
    fn test_invalid_config_unavailable() {
        let mut source = SyntheticLampSource::with_seed(CaptureConfig::with_dimensions(0, 0), 7);
        assert!(matches!(
            source.open(),
            Err(CaptureError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_frame_limit_ends_stream() {
        let mut source = SyntheticLampSource::with_seed(small_config(), 7).with_frame_limit(1);
        source.open().unwrap();
        assert!(source.read().is_ok());
        assert!(matches!(source.read(), Err(CaptureError::EndOfStream)));
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = SyntheticLampSource::with_seed(small_config(), 42);
        let mut b = SyntheticLampSource::with_seed(small_config(), 42);
        a.open().unwrap();
        b.open().unwrap();

        for _ in 0..3 {
            assert_eq!(a.read().unwrap().image(), b.read().unwrap().image());
        }
    }

    #[test]
    fn test_frames_contain_wax() {
        let mut source = SyntheticLampSource::with_seed(small_config(), 3);
        source.open().unwrap();
        let frame = source.read().unwrap();

        assert!(frame.image().pixels().any(|p| *p == WAX));
    }
}
