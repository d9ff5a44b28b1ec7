pub mod capture;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod overlay;
pub mod pipeline;

pub use config::{
    AppConfig, DetectorConfig, DetectorOverrides, FillMethod, GuiConfig, Segmentation,
    SegmentationKind, SessionConfig,
};
pub use detection::FillDetector;
pub use error::{Error, Result};
pub use models::{Contour, Detection, FillPercent, FillStatus, Region};
pub use overlay::Overlay;
pub use pipeline::{MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep};

#[cfg(feature = "gui")]
pub mod gui;
