mod common;
use common::*;

use bottlefill::detection::fill::{mask_extent_fill, row_scan_fill, water_boundary};

#[test]
fn top_rows_give_remaining_share() {
    for (height, rows) in [(10, 3), (600, 150), (37, 36), (400, 1)] {
        let mask = top_rows_mask(20, height, rows);
        let fill = row_scan_fill(&mask).expect("water line should be found");
        let expected = (height - rows) as f32 / height as f32 * 100.0;
        assert!(
            (fill.value() - expected).abs() < 1e-4,
            "{rows} of {height}: got {}, expected {expected}",
            fill.value()
        );
    }
}

#[test]
fn processing_frame_half_full() {
    let mask = top_rows_mask(FRAME_WIDTH, FRAME_HEIGHT, 300);
    assert_eq!(water_boundary(&mask), Some(300));
    assert_eq!(row_scan_fill(&mask).map(|f| f.value()), Some(50.0));
}

#[test]
fn fully_set_mask_is_empty_bottle() {
    let mask = top_rows_mask(FRAME_WIDTH, FRAME_HEIGHT, FRAME_HEIGHT);
    assert_eq!(row_scan_fill(&mask).map(|f| f.value()), Some(0.0));
}

#[test]
fn empty_mask_has_no_water_line() {
    let mask = top_rows_mask(FRAME_WIDTH, FRAME_HEIGHT, 0);
    assert_eq!(water_boundary(&mask), None);
    assert_eq!(row_scan_fill(&mask), None);
}

#[test]
fn fill_stays_in_range() {
    for rows in 0..=40 {
        let mask = top_rows_mask(7, 40, rows);
        if let Some(fill) = row_scan_fill(&mask) {
            assert!((0.0..=100.0).contains(&fill.value()));
        }
    }
    let region = Region::new(0, 0, 10, 10).expect("non-empty region");
    let fill = mask_extent_fill(&region, 5).expect("frame height is positive");
    assert_eq!(fill.value(), 100.0);
}

#[test]
fn status_follows_fill() {
    assert_eq!(FillPercent::new(80.0).status(), FillStatus::HalfFull);
    assert_eq!(FillPercent::new(80.1).status(), FillStatus::Full);
    assert_eq!(FillPercent::new(35.0).status(), FillStatus::Low);
    assert_eq!(FillPercent::new(20.0).status(), FillStatus::Empty);
    assert_eq!(FillStatus::Full.label(), "FULL");
    assert_eq!(FillStatus::HalfFull.label(), "HALF FULL");
}
