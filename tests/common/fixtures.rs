use std::cell::Cell;
use std::rc::Rc;

use bottlefill::capture::CaptureSource;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use tempfile::NamedTempFile;

pub const FRAME_WIDTH: u32 = 400;
pub const FRAME_HEIGHT: u32 = 600;

/// Bottle body in the synthetic frames: x 100..300, y 100..500
pub const BOTTLE: (u32, u32, u32, u32) = (100, 100, 200, 400);

const BACKGROUND: Rgb<u8> = Rgb([250, 250, 250]);

/// A 400x600 light frame with a bottle whose upper half is dark and lower half light grey.
/// The dark half is what the region threshold marks as foreground.
pub fn bottle_frame() -> RgbImage {
    let (bx, by, bw, bh) = BOTTLE;
    let split = by + bh / 2;
    ImageBuffer::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |x, y| {
        let inside = x >= bx && x < bx + bw && y >= by && y < by + bh;
        match (inside, y < split) {
            (true, true) => Rgb([40, 40, 40]),
            (true, false) => Rgb([150, 150, 150]),
            (false, _) => BACKGROUND,
        }
    })
}

/// A 400x600 white frame with pure blue from row `top` down to the bottom, x 100..300
pub fn blue_water_frame(top: u32) -> RgbImage {
    ImageBuffer::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |x, y| {
        if (100..300).contains(&x) && y >= top {
            Rgb([0, 0, 255])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

/// A frame without any structure
pub fn blank_frame() -> RgbImage {
    ImageBuffer::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, BACKGROUND)
}

/// Binary mask whose first `rows` rows are fully set
pub fn top_rows_mask(width: u32, height: u32, rows: u32) -> GrayImage {
    ImageBuffer::from_fn(width, height, |_, y| if y < rows { Luma([255]) } else { Luma([0]) })
}

/// Binary mask with the given filled rectangles
pub fn mask_with_blocks(width: u32, height: u32, blocks: &[(u32, u32, u32, u32)]) -> GrayImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let set = blocks
            .iter()
            .any(|&(bx, by, bw, bh)| x >= bx && x < bx + bw && y >= by && y < by + bh);
        if set { Luma([255]) } else { Luma([0]) }
    })
}

/// Saves an image to a temp PNG file.
/// The file will be automatically cleaned up when dropped.
pub fn save_temp_png(img: &RgbImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    DynamicImage::ImageRgb8(img.clone())
        .save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Counters shared between a [`FakeCamera`] and the test that owns it
#[derive(Clone, Default)]
pub struct CameraProbe {
    pub opened: Rc<Cell<u32>>,
    pub released: Rc<Cell<u32>>,
    pub captured: Rc<Cell<u32>>,
}

/// In-memory capture source replaying one frame
pub struct FakeCamera {
    frame: RgbImage,
    probe: CameraProbe,
    fail_after: Option<u32>,
}

impl FakeCamera {
    pub fn new(frame: RgbImage) -> (Self, CameraProbe) {
        let probe = CameraProbe::default();
        let camera = Self {
            frame,
            probe: probe.clone(),
            fail_after: None,
        };
        (camera, probe)
    }

    /// Capture fails once `frames` frames have been delivered
    pub fn failing_after(mut self, frames: u32) -> Self {
        self.fail_after = Some(frames);
        self
    }
}

impl CaptureSource for FakeCamera {
    fn capture_frame(&mut self) -> bottlefill::Result<RgbImage> {
        let captured = self.probe.captured.get();
        if self.fail_after.is_some_and(|limit| captured >= limit) {
            return Err(bottlefill::Error::Camera("device unplugged".to_string()));
        }
        self.probe.captured.set(captured + 1);
        Ok(self.frame.clone())
    }

    fn resolution(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn open(&mut self) -> bottlefill::Result<()> {
        self.probe.opened.set(self.probe.opened.get() + 1);
        Ok(())
    }

    fn release(&mut self) {
        self.probe.released.set(self.probe.released.get() + 1);
    }
}
