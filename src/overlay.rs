use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{Detection, Region};

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LINE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const ALERT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const FOOTER_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

pub const FOOTER: &str = "Press 'q' to quit, 's' to save";

/// Draws detection results onto frames. Text needs a font; without one only shapes are drawn.
pub struct Overlay {
    font: Option<FontVec>,
}

impl Overlay {
    pub fn without_text() -> Self {
        Self { font: None }
    }

    pub fn from_font_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| Error::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { font: Some(font) })
    }

    /// Font from config when given, shapes-only otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_font_file(path),
            None => Ok(Self::without_text()),
        }
    }

    pub fn has_text(&self) -> bool {
        self.font.is_some()
    }

    /// Copy of `frame` with box, water line, labels and footer drawn in.
    /// `frame` must be the processed frame the detection coordinates refer to.
    pub fn annotate(&self, frame: &RgbImage, detection: &Detection) -> RgbImage {
        let mut canvas = frame.clone();

        match detection.region {
            Some(region) => {
                draw_thick_rect(&mut canvas, &region, 2, BOX_COLOR);

                if let (Some(fill), Some(line_y)) = (detection.fill, detection.water_line) {
                    draw_thick_hline(&mut canvas, &region, line_y, 3, LINE_COLOR);

                    let label = format!("Fill Level: {:.1}%", fill.value());
                    let label_y = (region.y as i32 - 24).max(0);
                    self.text(&mut canvas, BOX_COLOR, region.x as i32, label_y, 20.0, &label);

                    let status = fill.status();
                    self.text(
                        &mut canvas,
                        status.color(),
                        region.x as i32,
                        region.bottom() as i32 + 8,
                        22.0,
                        status.label(),
                    );
                }
            }
            None => self.text(&mut canvas, ALERT_COLOR, 10, 10, 28.0, "No bottle detected"),
        }

        let footer_y = canvas.height() as i32 - 22;
        self.text(&mut canvas, FOOTER_COLOR, 10, footer_y, 16.0, FOOTER);

        canvas
    }

    fn text(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, size: f32, text: &str) {
        if let Some(font) = &self.font {
            draw_text_mut(canvas, color, x, y, PxScale::from(size), font, text);
        }
    }
}

fn draw_thick_rect(canvas: &mut RgbImage, region: &Region, thickness: u32, color: Rgb<u8>) {
    for t in 0..thickness {
        let width = region.width + 2 * t;
        let height = region.height + 2 * t;
        let rect = Rect::at(region.x as i32 - t as i32, region.y as i32 - t as i32)
            .of_size(width, height);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

fn draw_thick_hline(canvas: &mut RgbImage, region: &Region, y: u32, thickness: u32, color: Rgb<u8>) {
    let start = y as i32 - (thickness as i32 / 2);
    for row in start..start + thickness as i32 {
        draw_line_segment_mut(
            canvas,
            (region.x as f32, row as f32),
            (region.right() as f32, row as f32),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FillPercent;

    fn detection(region: Option<Region>, fill: Option<f32>) -> Detection {
        let fill = fill.map(FillPercent::new);
        Detection {
            region,
            fill,
            water_line: match (region, fill) {
                (Some(r), Some(f)) => Some(crate::detection::fill::water_line(&r, f)),
                _ => None,
            },
            frame_size: (100, 100),
            strategy: crate::config::SegmentationKind::Edge,
        }
    }

    #[test]
    fn no_region_does_not_panic() {
        let frame = RgbImage::new(100, 100);
        let out = Overlay::without_text().annotate(&frame, &detection(None, None));
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(out, frame);
    }

    #[test]
    fn box_and_water_line_are_drawn() {
        let frame = RgbImage::new(100, 100);
        let region = Region::new(20, 20, 40, 60).unwrap();
        let out = Overlay::without_text().annotate(&frame, &detection(Some(region), Some(50.0)));
        assert_eq!(*out.get_pixel(20, 40), BOX_COLOR);
        assert_eq!(*out.get_pixel(40, 50), LINE_COLOR);
        assert_eq!(*out.get_pixel(40, 30), Rgb([0, 0, 0]));
    }

    #[test]
    fn undetermined_fill_draws_only_box() {
        let frame = RgbImage::new(100, 100);
        let region = Region::new(20, 20, 40, 60).unwrap();
        let out = Overlay::without_text().annotate(&frame, &detection(Some(region), None));
        assert_eq!(*out.get_pixel(20, 40), BOX_COLOR);
        assert!(!out.pixels().any(|p| *p == LINE_COLOR));
    }

    #[test]
    fn bad_font_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("font.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(Overlay::load(Some(&path)), Err(Error::Font { .. })));
        assert!(!Overlay::load(None).unwrap().has_text());
    }
}
