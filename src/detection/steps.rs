use crate::detection::{contours, fill, preprocessing};
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep};
use anyhow::Result;
use image::DynamicImage;

/// Resize the frame to the fixed processing size; regions refer to the resized frame
pub struct ResizeStep {
    pub width: u32,
    pub height: u32,
}

impl PipelineStep for ResizeStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let resized = preprocessing::resize(&item.image, self.width, self.height);
            let mut new_item = PipelineData::from_image(resized);
            new_item.metadata = item.metadata;
            result.push(new_item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Resize"
    }
}

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = preprocessing::to_grayscale(&item.image);
            result.push(item.with_image(DynamicImage::ImageLuma8(gray)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Apply Gaussian blur
pub struct BlurStep {
    pub sigma: f32,
}

impl PipelineStep for BlurStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = item.image.to_luma8();
            let blurred = preprocessing::apply_blur(&gray, self.sigma);
            result.push(item.with_image(DynamicImage::ImageLuma8(blurred)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = item.image.to_luma8();
            let edges = preprocessing::detect_edges(&gray, self.low_threshold, self.high_threshold);
            result.push(item.with_image(DynamicImage::ImageLuma8(edges)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Keep pixels inside an HSV range
pub struct HsvMaskStep {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl PipelineStep for HsvMaskStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let rgb = item.image.to_rgb8();
            let mask = preprocessing::hsv_in_range(&rgb, self.lower, self.upper);
            let covered = mask.pixels().filter(|p| p[0] != 0).count();
            tracing::debug!(covered, "color mask pixels");
            result.push(
                item.with_image(DynamicImage::ImageLuma8(mask))
                    .with_metadata("mask_pixels", MetadataValue::Int(covered as i32)),
            );
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Color Mask"
    }
}

/// Pick the largest external contour of the mask and crop its box from the frame.
/// Items without a large enough contour are dropped.
pub struct RegionSelectionStep {
    pub min_area: f64,
}

impl PipelineStep for RegionSelectionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let mask = item.image.to_luma8();
            let Some((area, region)) = contours::select_region(&mask, self.min_area) else {
                tracing::debug!("no region found");
                continue;
            };

            let (img_width, img_height) = (item.original.width(), item.original.height());
            let Some(region) = region.clamp_to(img_width, img_height) else {
                continue;
            };

            tracing::debug!(
                x = region.x,
                y = region.y,
                width = region.width,
                height = region.height,
                area,
                "selected region"
            );

            let roi = item.original.crop_imm(region.x, region.y, region.width, region.height);
            let mut new_item = item
                .with_image(roi)
                .with_metadata("contour_area", MetadataValue::Float(area as f32));
            new_item.region = Some(region);
            result.push(new_item);
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Region Selection"
    }
}

/// Grayscale the ROI and apply an inverse binary threshold (dark becomes foreground)
pub struct RoiThresholdStep {
    pub threshold: u8,
}

impl PipelineStep for RoiThresholdStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = preprocessing::to_grayscale(&item.image);
            let mask = preprocessing::threshold_binary_inv(&gray, self.threshold);
            result.push(item.with_image(DynamicImage::ImageLuma8(mask)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "ROI Threshold"
    }
}

/// Row-majority scan of the thresholded ROI.
/// Sets "fill" only when a water line was found; the item itself is always kept.
pub struct RowScanStep;

impl PipelineStep for RowScanStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for mut item in data {
            let mask = item.image.to_luma8();
            match fill::water_boundary(&mask) {
                Some(boundary) => {
                    let percent = fill::fill_below(boundary, mask.height());
                    item.metadata
                        .insert("water_boundary".to_string(), MetadataValue::Int(boundary as i32));
                    item.metadata
                        .insert("fill".to_string(), MetadataValue::Float(percent.value()));
                }
                None => tracing::debug!("no majority row in ROI"),
            }
            result.push(item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Row Scan"
    }
}

/// Fill from the top of the region relative to the full frame height
pub struct MaskExtentStep;

impl PipelineStep for MaskExtentStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for mut item in data {
            let percent = item
                .region
                .and_then(|region| fill::mask_extent_fill(&region, item.original.height()));
            if let Some(percent) = percent {
                item.metadata
                    .insert("fill".to_string(), MetadataValue::Float(percent.value()));
            }
            result.push(item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Mask Extent"
    }
}
