//! Frame sources and capture sessions.
//!
//! This module provides abstractions for acquiring frames from a camera
//! or a synthetic generator. The source is treated as a supplier of raw
//! images; entropy is only derived further down the pipeline.

mod config;
mod frame;
#[cfg(feature = "camera")]
mod nokhwa_source;
mod source;
mod synthetic;

pub use config::{CaptureConfig, ConfigError};
pub use frame::Frame;
#[cfg(feature = "camera")]
pub use nokhwa_source::NokhwaSource;
pub use source::{CaptureError, CaptureSession, FrameSource};
pub use synthetic::SyntheticLampSource;
