mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from bottlefill for tests
pub use bottlefill::config::SegmentationKind;
pub use bottlefill::capture::{CaptureSource, LiveSession, SessionControl};
pub use bottlefill::{
    AppConfig, Detection, DetectorConfig, Error, FillDetector, FillPercent, FillStatus, Overlay,
    Region, SessionConfig,
};
