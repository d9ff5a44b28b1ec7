use image::{DynamicImage, RgbImage};
use std::path::PathBuf;

use super::CaptureSource;
use crate::config::SessionConfig;
use crate::detection::FillDetector;
use crate::error::{Error, Result};
use crate::models::Detection;
use crate::overlay::Overlay;

/// File name used for a saved raw frame
pub fn snapshot_name(frame_index: u64) -> String {
    format!("water_bottle_frame_{}.jpg", frame_index)
}

/// One step of the live loop
pub struct LiveFrame {
    pub index: u64,
    /// Processed-size frame to show; annotated when `detection` is set
    pub display: RgbImage,
    /// Only present on processed frames
    pub detection: Option<Detection>,
}

/// What the caller should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionControl {
    Continue,
    Saved(PathBuf),
    Quit,
}

/// Owns the capture source and the frame counter of one live run.
///
/// The source is released by `stop`, and by `Drop` on every other exit path.
pub struct LiveSession<C: CaptureSource> {
    source: C,
    detector: FillDetector,
    overlay: Overlay,
    config: SessionConfig,
    frame_count: u64,
    last_raw: Option<(u64, RgbImage)>,
    last_detection: Option<Detection>,
    running: bool,
    annotate: bool,
}

impl<C: CaptureSource> LiveSession<C> {
    pub fn new(source: C, detector: FillDetector, overlay: Overlay, config: SessionConfig) -> Self {
        Self {
            source,
            detector,
            overlay,
            config,
            frame_count: 0,
            last_raw: None,
            last_detection: None,
            running: false,
            annotate: true,
        }
    }

    /// Skip drawing overlays; `LiveFrame::display` is then the plain processing frame
    pub fn without_display(mut self) -> Self {
        self.annotate = false;
        self
    }

    pub fn start(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }
        self.source.open()?;
        self.running = true;
        let (width, height) = self.source.resolution();
        tracing::info!(width, height, "live session started");
        Ok(())
    }

    /// Release the capture source; calling it again is a no-op
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.source.release();
        self.running = false;
        tracing::info!(frames = self.frame_count, "live session stopped, camera released");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Most recent result from a processed frame
    pub fn last_detection(&self) -> Option<&Detection> {
        self.last_detection.as_ref()
    }

    fn should_process(&self, index: u64) -> bool {
        index % self.config.process_every.max(1) == 0
    }

    /// Capture one frame; every `process_every`-th frame runs detection, the rest pass through resized
    pub fn next_frame(&mut self) -> anyhow::Result<LiveFrame> {
        if !self.running {
            return Err(Error::SessionStopped.into());
        }

        let raw = self.source.capture_frame()?;
        let index = self.frame_count;
        let prepared = self
            .detector
            .prepare_frame(&DynamicImage::ImageRgb8(raw.clone()));

        let live = if self.should_process(index) {
            // already at processing size, so the pipeline's resize is a no-op
            let detection = self.detector.detect(&prepared)?;
            tracing::debug!(index, message = %detection.message(), "processed frame");
            let frame = prepared.to_rgb8();
            let display = if self.annotate {
                self.overlay.annotate(&frame, &detection)
            } else {
                frame
            };
            self.last_detection = Some(detection.clone());
            LiveFrame {
                index,
                display,
                detection: Some(detection),
            }
        } else {
            LiveFrame {
                index,
                display: prepared.to_rgb8(),
                detection: None,
            }
        };

        self.last_raw = Some((index, raw));
        self.frame_count += 1;
        Ok(live)
    }

    /// Write the latest raw frame as JPEG into the snapshot directory
    pub fn save_snapshot(&self) -> Result<PathBuf> {
        let (index, raw) = self.last_raw.as_ref().ok_or(Error::NoFrame)?;
        std::fs::create_dir_all(&self.config.snapshot_dir)?;
        let path = self.config.snapshot_dir.join(snapshot_name(*index));
        raw.save_with_format(&path, image::ImageFormat::Jpeg)
            .map_err(|source| Error::ImageSave {
                path: path.clone(),
                source,
            })?;
        tracing::info!("Frame saved as {}", path.display());
        Ok(path)
    }

    /// 'q' stops the session, 's' saves a snapshot, anything else is ignored
    pub fn handle_key(&mut self, key: char) -> Result<SessionControl> {
        match key.to_ascii_lowercase() {
            'q' => {
                self.stop();
                Ok(SessionControl::Quit)
            }
            's' => self.save_snapshot().map(SessionControl::Saved),
            _ => Ok(SessionControl::Continue),
        }
    }
}

impl<C: CaptureSource> Drop for LiveSession<C> {
    fn drop(&mut self) {
        self.stop();
    }
}
