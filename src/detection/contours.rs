use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};

use crate::models::{Contour, Region};

/// Outer boundaries of every foreground component (holes and nested shapes are skipped)
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.parent.is_none() && matches!(c.border_type, BorderType::Outer))
        .map(|c| Contour::new(c.points))
        .collect()
}

/// The contour with the largest area plus its bounding box.
///
/// Ties keep the first contour in discovery order. Returns `None` when there
/// are no contours or the winner is smaller than `min_area`.
pub fn select_largest(contours: &[Contour], min_area: f64) -> Option<(f64, Region)> {
    let (best, area) = contours
        .iter()
        .map(|c| (c, c.area()))
        .fold(None, |acc: Option<(&Contour, f64)>, (c, area)| match acc {
            Some((_, best_area)) if best_area >= area => acc,
            _ => Some((c, area)),
        })?;

    if area < min_area {
        tracing::debug!(area, min_area, "largest contour below size floor");
        return None;
    }

    best.bounding_box().map(|region| (area, region))
}

/// Find contours in a mask and pick the bottle region in one go
pub fn select_region(mask: &GrayImage, min_area: f64) -> Option<(f64, Region)> {
    let contours = find_external_contours(mask);
    tracing::debug!(count = contours.len(), "external contours");
    select_largest(&contours, min_area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::point::Point;

    fn rect(x: i32, y: i32, w: i32, h: i32) -> Contour {
        Contour::new(vec![
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ])
    }

    #[test]
    fn empty_mask_has_no_region() {
        let mask = GrayImage::new(50, 50);
        assert!(find_external_contours(&mask).is_empty());
        assert!(select_region(&mask, 0.0).is_none());
    }

    #[test]
    fn filled_block_is_selected() {
        let mask = GrayImage::from_fn(100, 100, |x, y| {
            if (20..60).contains(&x) && (10..90).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let (area, region) = select_region(&mask, 1000.0).unwrap();
        // boundary polygon through pixel centres: 39 x 79
        assert_eq!(area, 39.0 * 79.0);
        assert_eq!(region, Region::new(20, 10, 40, 80).unwrap());
    }

    #[test]
    fn small_region_is_rejected() {
        let mask = GrayImage::from_fn(100, 100, |x, y| {
            if (5..15).contains(&x) && (5..15).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        assert!(select_region(&mask, 1000.0).is_none());
        assert!(select_region(&mask, 10.0).is_some());
    }

    #[test]
    fn ties_keep_first_found() {
        let contours = vec![rect(0, 0, 10, 10), rect(50, 50, 10, 10)];
        let (_, region) = select_largest(&contours, 0.0).unwrap();
        assert_eq!(region.x, 0);
    }
}
