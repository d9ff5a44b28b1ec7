pub mod contours;
pub mod fill;
pub mod preprocessing;
pub mod steps;

use anyhow::Result;
use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{DetectorConfig, FillMethod, Segmentation};
use crate::error::Error;
use crate::models::{Detection, FillPercent};
use crate::pipeline::Pipeline;
use steps::*;

/// Fill-level detector: one configurable pipeline for both segmentation variants
#[derive(Clone)]
pub struct FillDetector {
    config: DetectorConfig,
    pipeline: Pipeline,
}

impl FillDetector {
    pub fn new(config: DetectorConfig) -> Self {
        let pipeline = build_pipeline(&config);
        Self { config, pipeline }
    }

    /// Dump every step's images below `output_dir` on each run
    pub fn with_debug(mut self, output_dir: PathBuf) -> crate::Result<Self> {
        self.pipeline = self.pipeline.with_debug(output_dir)?;
        Ok(self)
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Size of the frame the returned coordinates refer to
    pub fn frame_size(&self, img: &DynamicImage) -> (u32, u32) {
        self.config.resize.unwrap_or((img.width(), img.height()))
    }

    /// The frame detection actually runs on (resized when configured)
    pub fn prepare_frame(&self, img: &DynamicImage) -> DynamicImage {
        match self.config.resize {
            Some((width, height)) => preprocessing::resize(img, width, height),
            None => img.clone(),
        }
    }

    /// Run the full detection pipeline on an image
    pub fn detect(&self, img: &DynamicImage) -> Result<Detection> {
        let frame_size = self.frame_size(img);
        let strategy = self.config.strategy.kind();

        let results = self.pipeline.run(img.clone())?;

        let Some(item) = results.into_iter().next() else {
            tracing::debug!(strategy = strategy.name(), "no bottle detected");
            return Ok(Detection::not_found(frame_size, strategy));
        };

        let fill = item.get_float("fill").map(FillPercent::new);
        let water_line = match (item.region, fill) {
            (Some(region), Some(fill)) => Some(fill::water_line(&region, fill)),
            _ => None,
        };

        tracing::debug!(
            strategy = strategy.name(),
            fill = ?fill.map(|f| f.value()),
            boundary = ?item.get_int("water_boundary"),
            "detection finished"
        );

        Ok(Detection {
            region: item.region,
            fill,
            water_line,
            frame_size,
            strategy,
        })
    }

    /// Decode an image file and run detection on it
    pub fn detect_file(&self, path: &Path) -> Result<Detection> {
        let img = load_image(path)?;
        tracing::debug!("loaded {}: {}x{}", path.display(), img.width(), img.height());
        self.detect(&img)
    }

    /// The binary mask the region selector sees (for debugging and overlays)
    pub fn mask(&self, img: &DynamicImage) -> Result<DynamicImage> {
        let steps_before_selection = self
            .pipeline
            .step_names()
            .iter()
            .position(|name| *name == "Region Selection")
            .unwrap_or(0);
        self.pipeline
            .run_partial(img.clone(), steps_before_selection)?
            .into_iter()
            .next()
            .map(|item| item.image)
            .ok_or_else(|| anyhow::anyhow!("segmentation produced no mask"))
    }
}

impl Default for FillDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

/// Open and decode an image file (JPEG, PNG, ...)
pub fn load_image(path: &Path) -> crate::Result<DynamicImage> {
    let to_err = |source: image::ImageError| Error::ImageOpen {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(|e| to_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(to_err)
}

/// Build the step sequence for a detector configuration
pub fn build_pipeline(config: &DetectorConfig) -> Pipeline {
    let mut pipeline = Pipeline::new();

    if let Some((width, height)) = config.resize {
        pipeline = pipeline.add_step(Arc::new(ResizeStep { width, height }));
    }

    pipeline = match config.strategy {
        Segmentation::Edge {
            blur_sigma,
            canny_low,
            canny_high,
        } => pipeline
            .add_step(Arc::new(GrayscaleStep))
            .add_step(Arc::new(BlurStep { sigma: blur_sigma }))
            .add_step(Arc::new(EdgeDetectionStep {
                low_threshold: canny_low,
                high_threshold: canny_high,
            })),
        Segmentation::Color { lower, upper } => {
            pipeline.add_step(Arc::new(HsvMaskStep { lower, upper }))
        }
    };

    pipeline = pipeline.add_step(Arc::new(RegionSelectionStep {
        min_area: config.min_area,
    }));

    match config.fill_method {
        FillMethod::RowScan => pipeline
            .add_step(Arc::new(RoiThresholdStep {
                threshold: config.threshold,
            }))
            .add_step(Arc::new(RowScanStep)),
        FillMethod::MaskExtent => pipeline.add_step(Arc::new(MaskExtentStep)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_pipeline_steps() {
        let pipeline = build_pipeline(&DetectorConfig::edge());
        assert_eq!(
            pipeline.step_names(),
            vec![
                "Resize",
                "Grayscale Conversion",
                "Gaussian Blur",
                "Edge Detection",
                "Region Selection",
                "ROI Threshold",
                "Row Scan",
            ]
        );
    }

    #[test]
    fn color_pipeline_steps() {
        let config = DetectorConfig {
            resize: None,
            ..DetectorConfig::color()
        };
        assert_eq!(
            build_pipeline(&config).step_names(),
            vec!["Color Mask", "Region Selection", "Mask Extent"]
        );
    }

    #[test]
    fn mask_has_frame_size() {
        let detector = FillDetector::default();
        let img = DynamicImage::new_rgb8(64, 48);
        let mask = detector.mask(&img).unwrap();
        assert_eq!((mask.width(), mask.height()), (400, 600));
    }
}
