use super::CaptureSource;
use crate::error::{Error, Result};
use image::RgbImage;
use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType, Resolution};

fn camera_err(context: &str, err: impl std::fmt::Display) -> Error {
    Error::Camera(format!("{context}: {err}"))
}

/// System camera via nokhwa. The stream is opened by `open` and closed by `release`.
pub struct WebcamCapture {
    camera: Camera,
    width: u32,
    height: u32,
    streaming: bool,
}

impl WebcamCapture {
    /// The resolution is a request; the driver may pick another one
    pub fn new(device_index: u32, width: u32, height: u32) -> Result<Self> {
        tracing::info!("Initializing webcam {} at {}x{}", device_index, width, height);

        let index = CameraIndex::Index(device_index);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::HighestResolution(
            Resolution::new(width, height),
        ));

        let camera = Camera::new(index, requested).map_err(|e| camera_err("Failed to open camera", e))?;

        Ok(Self {
            camera,
            width,
            height,
            streaming: false,
        })
    }
}

impl CaptureSource for WebcamCapture {
    fn capture_frame(&mut self) -> Result<RgbImage> {
        let frame = self
            .camera
            .frame()
            .map_err(|e| camera_err("Failed to capture frame", e))?;

        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| camera_err("Failed to decode frame", e))?;

        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| Error::Camera("decoded frame has wrong buffer size".to_string()))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn open(&mut self) -> Result<()> {
        if !self.streaming {
            self.camera
                .open_stream()
                .map_err(|e| camera_err("Failed to open camera stream", e))?;
            self.streaming = true;
            tracing::info!("Webcam stream opened");
        }
        Ok(())
    }

    fn release(&mut self) {
        if self.streaming {
            if let Err(e) = self.camera.stop_stream() {
                tracing::warn!("Failed to stop camera stream: {}", e);
            }
            self.streaming = false;
            tracing::info!("Webcam released");
        }
    }
}
