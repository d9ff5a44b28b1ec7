#[cfg(feature = "camera")]
mod webcam;
mod session;

#[cfg(feature = "camera")]
pub use webcam::WebcamCapture;
pub use session::{LiveFrame, LiveSession, SessionControl, snapshot_name};

use crate::error::Result;
use image::RgbImage;

/// Trait for camera capture sources
pub trait CaptureSource {
    /// Capture a single frame, blocking until one is available
    fn capture_frame(&mut self) -> Result<RgbImage>;

    /// Get the requested resolution of captured frames
    fn resolution(&self) -> (u32, u32);

    /// Acquire the device; called once when a session starts
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Give the device back; must be safe to call more than once
    fn release(&mut self) {}
}

impl<C: CaptureSource + ?Sized> CaptureSource for Box<C> {
    fn capture_frame(&mut self) -> Result<RgbImage> {
        (**self).capture_frame()
    }

    fn resolution(&self) -> (u32, u32) {
        (**self).resolution()
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
