//! Frame source abstraction and scoped capture sessions.
//!
//! A [`FrameSource`] is any device or generator that can hand out
//! successive frames. [`CaptureSession`] wraps an opened source so
//! that it is released on every exit path, including early returns
//! through `?` and cancellation.

use super::Frame;
use thiserror::Error;

/// Errors that can occur while acquiring frames.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("frame source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("frame source has no more frames")]
    EndOfStream,
    #[error("frame source not opened")]
    NotOpen,
}

/// Trait for frame source implementations.
///
/// This abstraction allows swapping between real camera hardware,
/// synthetic generators and scripted sources in tests.
pub trait FrameSource {
    /// Opens the source.
    ///
    /// Fails with [`CaptureError::SourceUnavailable`] if the device
    /// cannot be acquired.
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Reads the next frame.
    ///
    /// Fails with [`CaptureError::EndOfStream`] if no frame is available.
    fn read(&mut self) -> Result<Frame, CaptureError>;

    /// Checks if the source is currently open.
    fn is_open(&self) -> bool;

    /// Releases the underlying device. Must be idempotent.
    fn release(&mut self);
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn open(&mut self) -> Result<(), CaptureError> {
        (**self).open()
    }

    fn read(&mut self) -> Result<Frame, CaptureError> {
        (**self).read()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// An opened frame source, released when dropped.
pub struct CaptureSession<'a, S: FrameSource + ?Sized> {
    source: &'a mut S,
    frames_read: u64,
}

impl<'a, S: FrameSource + ?Sized> CaptureSession<'a, S> {
    /// Opens `source` and takes exclusive use of it for the session.
    pub fn open(source: &'a mut S) -> Result<Self, CaptureError> {
        source.open()?;
        tracing::info!("Capture session opened");
        Ok(Self {
            source,
            frames_read: 0,
        })
    }

    /// Reads one frame from the underlying source.
    pub fn read(&mut self) -> Result<Frame, CaptureError> {
        let frame = self.source.read()?;
        self.frames_read += 1;
        tracing::trace!(
            sequence = frame.sequence(),
            width = frame.width(),
            height = frame.height(),
            "Frame acquired"
        );
        Ok(frame)
    }

    /// Returns the number of frames read during this session.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

impl<S: FrameSource + ?Sized> Drop for CaptureSession<'_, S> {
    fn drop(&mut self) {
        self.source.release();
        tracing::info!(frames_read = self.frames_read, "Capture session released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingSource {
        open: bool,
        fail_open: bool,
        remaining: u32,
        releases: u32,
    }

    impl FrameSource for CountingSource {
        fn open(&mut self) -> Result<(), CaptureError> {
            if self.fail_open {
                return Err(CaptureError::SourceUnavailable("no device".into()));
            }
            self.open = true;
            Ok(())
        }

        fn read(&mut self) -> Result<Frame, CaptureError> {
            if !self.open {
                return Err(CaptureError::NotOpen);
            }
            if self.remaining == 0 {
                return Err(CaptureError::EndOfStream);
            }
            self.remaining -= 1;
            Frame::from_rgb(vec![0u8; 12], 2, 2, 0).ok_or(CaptureError::EndOfStream)
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn release(&mut self) {
            self.open = false;
            self.releases += 1;
        }
    }

    #[test]
    fn test_session_releases_on_drop() {
        let mut source = CountingSource {
            remaining: 2,
            ..Default::default()
        };

        {
            let mut session = CaptureSession::open(&mut source).unwrap();
            session.read().unwrap();
            session.read().unwrap();
            assert!(matches!(session.read(), Err(CaptureError::EndOfStream)));
            assert_eq!(session.frames_read(), 2);
        }

        assert!(!source.is_open());
        assert_eq!(source.releases, 1);
    }

    #[test]
    fn test_failed_open_does_not_release() {
        let mut source = CountingSource {
            fail_open: true,
            ..Default::default()
        };

        assert!(matches!(
            CaptureSession::open(&mut source),
            Err(CaptureError::SourceUnavailable(_))
        ));
        assert_eq!(source.releases, 0);
    }

    #[test]
    fn test_boxed_source_delegates() {
        let mut source: Box<dyn FrameSource> = Box::new(CountingSource {
            remaining: 1,
            ..Default::default()
        });

        let mut session = CaptureSession::open(&mut source).unwrap();
        assert!(session.read().is_ok());
        drop(session);
        assert!(!source.is_open());
    }
}
