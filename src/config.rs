use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Frame size every detector run works on, (width, height)
pub const PROCESSING_SIZE: (u32, u32) = (400, 600);

/// Smallest contour area (px²) accepted as a bottle
pub const MIN_REGION_AREA: f64 = 1000.0;

/// Gray level at or below which a pixel counts as foreground in the ROI
pub const ROI_THRESHOLD: u8 = 100;

/// How the source image is turned into a binary mask
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segmentation {
    /// Grayscale, Gaussian blur, then Canny
    Edge {
        blur_sigma: f32,
        canny_low: f32,
        canny_high: f32,
    },
    /// HSV range on the OpenCV 8-bit scale (H in [0,180))
    Color { lower: [u8; 3], upper: [u8; 3] },
}

impl Segmentation {
    /// Sigma 1.1 is what a 5x5 kernel with sigma=0 resolves to in OpenCV
    pub fn edge() -> Self {
        Segmentation::Edge {
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 150.0,
        }
    }

    /// Blue water
    pub fn color() -> Self {
        Segmentation::Color {
            lower: [90, 50, 50],
            upper: [130, 255, 255],
        }
    }

    /// Default parameters for a segmentation kind
    pub fn preset(kind: SegmentationKind) -> Self {
        match kind {
            SegmentationKind::Edge => Self::edge(),
            SegmentationKind::Color => Self::color(),
        }
    }

    pub fn kind(&self) -> SegmentationKind {
        match self {
            Segmentation::Edge { .. } => SegmentationKind::Edge,
            Segmentation::Color { .. } => SegmentationKind::Color,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Segmentation variant without its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationKind {
    Edge,
    Color,
}

impl SegmentationKind {
    pub fn name(&self) -> &'static str {
        match self {
            SegmentationKind::Edge => "edge",
            SegmentationKind::Color => "color",
        }
    }

    /// Fill method that pairs with this segmentation
    pub fn fill_method(&self) -> FillMethod {
        match self {
            SegmentationKind::Edge => FillMethod::RowScan,
            SegmentationKind::Color => FillMethod::MaskExtent,
        }
    }
}

/// How the selected region is turned into a fill percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMethod {
    /// Threshold the ROI and look for the lowest majority-foreground row
    RowScan,
    /// Use the top of the region relative to the whole frame
    MaskExtent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub strategy: Segmentation,
    pub fill_method: FillMethod,
    pub min_area: f64,
    pub threshold: u8,
    /// Resize input to (width, height) before processing, `None` keeps it as is
    pub resize: Option<(u32, u32)>,
}

impl DetectorConfig {
    pub fn edge() -> Self {
        Self {
            strategy: Segmentation::edge(),
            fill_method: FillMethod::RowScan,
            min_area: MIN_REGION_AREA,
            threshold: ROI_THRESHOLD,
            resize: Some(PROCESSING_SIZE),
        }
    }

    pub fn color() -> Self {
        Self {
            strategy: Segmentation::color(),
            fill_method: FillMethod::MaskExtent,
            ..Self::edge()
        }
    }
}

/// Command line values laid over a loaded `DetectorConfig`; `None` keeps the loaded value
#[derive(Debug, Clone, Default)]
pub struct DetectorOverrides {
    pub strategy: Option<SegmentationKind>,
    pub min_area: Option<f64>,
    pub threshold: Option<u8>,
    pub no_resize: bool,
}

impl DetectorConfig {
    /// Switching strategy swaps segmentation parameters and fill method only;
    /// asking for the strategy already configured keeps its parameters.
    pub fn apply_overrides(&mut self, overrides: &DetectorOverrides) {
        if let Some(kind) = overrides.strategy {
            if self.strategy.kind() != kind {
                self.strategy = Segmentation::preset(kind);
                self.fill_method = kind.fill_method();
            }
        }
        if let Some(min_area) = overrides.min_area {
            self.min_area = min_area;
        }
        if let Some(threshold) = overrides.threshold {
            self.threshold = threshold;
        }
        if overrides.no_resize {
            self.resize = None;
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::edge()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub device_index: u32,
    /// Requested capture resolution; the camera may ignore it
    pub capture_size: (u32, u32),
    /// Run detection on every n-th frame, pass the others through
    pub process_every: u64,
    pub snapshot_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            capture_size: (640, 480),
            process_every: 3,
            snapshot_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiConfig {
    pub font: Option<PathBuf>,
    pub splash: Option<PathBuf>,
    pub preview_size: u32,
    pub splash_duration_ms: u64,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            font: None,
            splash: None,
            preview_size: 500,
            splash_duration_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detector: DetectorConfig,
    pub session: SessionConfig,
    pub gui: GuiConfig,
}

impl AppConfig {
    /// Load a JSON config file; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{ "detector": { "min_area": 50.0 } }"#).unwrap();
        assert_eq!(cfg.detector.min_area, 50.0);
        assert_eq!(cfg.detector.strategy, Segmentation::edge());
        assert_eq!(cfg.session.process_every, 3);
        assert_eq!(cfg.gui.preview_size, 500);
    }

    #[test]
    fn color_strategy_from_json() {
        let cfg: DetectorConfig = serde_json::from_str(
            r#"{ "strategy": { "kind": "color", "lower": [100, 60, 60], "upper": [120, 255, 255] },
                 "fill_method": "mask_extent" }"#,
        )
        .unwrap();
        assert_eq!(cfg.fill_method, FillMethod::MaskExtent);
        assert_eq!(cfg.strategy.name(), "color");
    }

    #[test]
    fn overrides_keep_loaded_values() {
        let mut cfg: DetectorConfig = serde_json::from_str(
            r#"{ "min_area": 300.0, "threshold": 80, "resize": [200, 300] }"#,
        )
        .unwrap();
        cfg.apply_overrides(&DetectorOverrides {
            strategy: Some(SegmentationKind::Edge),
            ..Default::default()
        });
        assert_eq!(cfg.min_area, 300.0);
        assert_eq!(cfg.threshold, 80);
        assert_eq!(cfg.resize, Some((200, 300)));
        assert_eq!(cfg.strategy, Segmentation::edge());

        cfg.apply_overrides(&DetectorOverrides {
            strategy: Some(SegmentationKind::Color),
            threshold: Some(120),
            no_resize: true,
            ..Default::default()
        });
        assert_eq!(cfg.strategy, Segmentation::color());
        assert_eq!(cfg.fill_method, FillMethod::MaskExtent);
        assert_eq!(cfg.min_area, 300.0);
        assert_eq!(cfg.threshold, 120);
        assert_eq!(cfg.resize, None);
    }

    #[test]
    fn same_strategy_keeps_custom_parameters() {
        let mut cfg: DetectorConfig = serde_json::from_str(
            r#"{ "strategy": { "kind": "edge", "blur_sigma": 2.0, "canny_low": 20.0, "canny_high": 90.0 } }"#,
        )
        .unwrap();
        let loaded = cfg.strategy;
        cfg.apply_overrides(&DetectorOverrides {
            strategy: Some(SegmentationKind::Edge),
            ..Default::default()
        });
        assert_eq!(cfg.strategy, loaded);
    }

    #[test]
    fn load_reports_bad_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(Error::Config { .. })));
    }
}
