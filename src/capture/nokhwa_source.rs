//! Webcam frame source backed by `nokhwa`.

use super::{CaptureConfig, CaptureError, Frame, FrameSource};
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

/// Frame source reading from a local camera device.
pub struct NokhwaSource {
    config: CaptureConfig,
    camera: Option<Camera>,
    sequence: u64,
}

impl NokhwaSource {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            camera: None,
            sequence: 0,
        }
    }
}

impl FrameSource for NokhwaSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        self.config
            .validate()
            .map_err(|e| CaptureError::SourceUnavailable(e.to_string()))?;

        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(self.config.width, self.config.height),
                FrameFormat::MJPEG,
                self.config.fps,
            ),
        ));
        let mut camera = Camera::new(CameraIndex::Index(self.config.device_id), format)
            .map_err(|e| CaptureError::SourceUnavailable(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CaptureError::SourceUnavailable(e.to_string()))?;

        tracing::info!(device = self.config.device_id, "Camera opened");
        self.camera = Some(camera);
        self.sequence = 0;
        Ok(())
    }

    fn read(&mut self) -> Result<Frame, CaptureError> {
        let camera = self.camera.as_mut().ok_or(CaptureError::NotOpen)?;

        let decoded = camera
            .frame()
            .and_then(|buffer| buffer.decode_image::<RgbFormat>())
            .map_err(|e| {
                tracing::warn!("Camera frame unavailable: {}", e);
                CaptureError::EndOfStream
            })?;

        // nokhwa links its own `image` version, so hand over the raw buffer.
        let (width, height) = (decoded.width(), decoded.height());
        let image =
            RgbImage::from_raw(width, height, decoded.into_raw()).ok_or(CaptureError::EndOfStream)?;

        self.sequence += 1;
        Ok(Frame::new(image, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.camera.is_some()
    }

    fn release(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                tracing::warn!("Failed to stop camera stream: {}", e);
            }
            tracing::info!("Camera released");
        }
    }
}
