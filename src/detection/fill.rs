//! Water-line estimation.
//!
//! A thresholded ROI marks dark pixels as foreground. Scanning top to bottom,
//! every row with more than half of its pixels set is a "water" row, and the
//! boundary sits just below the lowest of them. The fill is the share of rows
//! under that boundary, so a region that is foreground all the way down reads
//! as 0%.

use image::{DynamicImage, GrayImage};

use crate::detection::preprocessing;
use crate::models::{FillPercent, Region};

/// True when more than half of the row is foreground
fn is_water_row(mask: &GrayImage, y: u32) -> bool {
    let width = mask.width();
    let set = (0..width).filter(|&x| mask.get_pixel(x, y)[0] != 0).count() as u64;
    set * 2 > width as u64
}

/// Index one past the lowest majority-foreground row, `None` when no row qualifies
pub fn water_boundary(mask: &GrayImage) -> Option<u32> {
    (0..mask.height())
        .rev()
        .find(|&y| is_water_row(mask, y))
        .map(|lowest| lowest + 1)
}

/// Share of `height` rows lying at or below `boundary`
pub fn fill_below(boundary: u32, height: u32) -> FillPercent {
    FillPercent::from_ratio(height.saturating_sub(boundary) as f64, height as f64)
}

/// Row-scan fill of an already binarized region
pub fn row_scan_fill(mask: &GrayImage) -> Option<FillPercent> {
    water_boundary(mask).map(|boundary| fill_below(boundary, mask.height()))
}

/// Grayscale and inverse-threshold an ROI crop, then row-scan it
pub fn estimate_roi_fill(roi: &DynamicImage, threshold: u8) -> Option<FillPercent> {
    let gray = preprocessing::to_grayscale(roi);
    let mask = preprocessing::threshold_binary_inv(&gray, threshold);
    row_scan_fill(&mask)
}

/// Fill from how far the water region reaches up the frame
pub fn mask_extent_fill(region: &Region, frame_height: u32) -> Option<FillPercent> {
    if frame_height == 0 {
        return None;
    }
    Some(FillPercent::from_ratio(
        frame_height.saturating_sub(region.y) as f64,
        frame_height as f64,
    ))
}

/// Row, in frame coordinates, where the water surface is drawn
pub fn water_line(region: &Region, fill: FillPercent) -> u32 {
    let empty_share = 1.0 - fill.value() as f64 / 100.0;
    let offset = (region.height as f64 * empty_share).floor() as u32;
    region.y + offset.min(region.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn top_rows(width: u32, height: u32, k: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |_, y| Luma([if y < k { 255 } else { 0 }]))
    }

    #[test]
    fn half_filled_region_is_fifty_percent() {
        let mask = top_rows(400, 600, 300);
        assert_eq!(row_scan_fill(&mask).unwrap().value(), 50.0);
    }

    #[test]
    fn fully_foreground_is_zero() {
        let mask = top_rows(10, 40, 40);
        assert_eq!(row_scan_fill(&mask).unwrap().value(), 0.0);
    }

    #[test]
    fn empty_mask_is_undetermined() {
        let mask = GrayImage::new(30, 30);
        assert_eq!(water_boundary(&mask), None);
        assert!(row_scan_fill(&mask).is_none());
    }

    #[test]
    fn exactly_half_row_does_not_count() {
        let mask = GrayImage::from_fn(10, 4, |x, y| Luma([if y == 2 && x < 5 { 255 } else { 0 }]));
        assert!(row_scan_fill(&mask).is_none());
        let mask = GrayImage::from_fn(10, 4, |x, y| Luma([if y == 2 && x < 6 { 255 } else { 0 }]));
        assert_eq!(water_boundary(&mask), Some(3));
    }

    #[test]
    fn lowest_row_wins_over_gaps() {
        let mask = GrayImage::from_fn(4, 10, |_, y| Luma([if y == 1 || y == 4 { 255 } else { 0 }]));
        assert_eq!(water_boundary(&mask), Some(5));
        assert_eq!(row_scan_fill(&mask).unwrap().value(), 50.0);
    }

    #[test]
    fn roi_threshold_treats_dark_as_foreground() {
        let roi = DynamicImage::ImageLuma8(GrayImage::from_fn(8, 20, |_, y| {
            Luma([if y < 5 { 30 } else { 200 }])
        }));
        assert_eq!(estimate_roi_fill(&roi, 100).unwrap().value(), 75.0);
    }

    #[test]
    fn mask_extent_uses_region_top() {
        let region = Region::new(0, 150, 50, 450).unwrap();
        assert_eq!(mask_extent_fill(&region, 600).unwrap().value(), 75.0);
        let region = Region::new(0, 0, 50, 600).unwrap();
        assert_eq!(mask_extent_fill(&region, 600).unwrap().value(), 100.0);
    }

    #[test]
    fn fill_below_boundary() {
        assert_eq!(fill_below(300, 600).value(), 50.0);
        assert_eq!(fill_below(600, 600).value(), 0.0);
        assert_eq!(fill_below(0, 600).value(), 100.0);
        assert_eq!(fill_below(10, 0).value(), 0.0);
    }

    #[test]
    fn water_line_position() {
        let region = Region::new(10, 100, 20, 200).unwrap();
        assert_eq!(water_line(&region, FillPercent::new(50.0)), 200);
        assert_eq!(water_line(&region, FillPercent::new(100.0)), 100);
        assert_eq!(water_line(&region, FillPercent::new(0.0)), 300);
    }
}
