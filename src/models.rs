use image::Rgb;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::config::SegmentationKind;

/// Axis-aligned box of a selected contour, in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegionBounds")]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Returns `None` for degenerate boxes so a zero-sized region never stands in for "nothing found"
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { x, y, width, height })
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Clip the box to an image of the given size
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        Region::new(
            self.x,
            self.y,
            self.width.min(width - self.x),
            self.height.min(height - self.y),
        )
    }
}

/// Unchecked wire form of a `Region`
#[derive(Deserialize)]
struct RegionBounds {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl TryFrom<RegionBounds> for Region {
    type Error = String;

    fn try_from(b: RegionBounds) -> std::result::Result<Self, Self::Error> {
        Region::new(b.x, b.y, b.width, b.height)
            .ok_or_else(|| format!("region must not be empty, got {}x{}", b.width, b.height))
    }
}

/// Outer boundary of a connected foreground region
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Polygon area of the boundary (shoelace); a one-pixel curve has zero area
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let p = self.points[i];
                let q = self.points[(i + 1) % n];
                p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64
            })
            .sum();
        twice.abs() as f64 / 2.0
    }

    /// Bounding box covering every boundary pixel
    pub fn bounding_box(&self) -> Option<Region> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Region::new(
            min_x.max(0) as u32,
            min_y.max(0) as u32,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        )
    }
}

/// Fill level in percent, always within [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct FillPercent(f32);

impl FillPercent {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return FillPercent(0.0);
        }
        FillPercent(value.clamp(0.0, 100.0))
    }

    /// `part / whole`, as a percentage
    pub fn from_ratio(part: f64, whole: f64) -> Self {
        if whole <= 0.0 {
            return FillPercent(0.0);
        }
        FillPercent::new((part / whole * 100.0) as f32)
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn status(&self) -> FillStatus {
        FillStatus::from_percent(self.0)
    }
}

impl From<f32> for FillPercent {
    fn from(value: f32) -> Self {
        FillPercent::new(value)
    }
}

impl From<FillPercent> for f32 {
    fn from(fill: FillPercent) -> Self {
        fill.0
    }
}

impl std::fmt::Display for FillPercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

/// Coarse bucket shown next to a live detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillStatus {
    Full,
    HalfFull,
    Low,
    Empty,
}

impl FillStatus {
    pub fn from_percent(percent: f32) -> Self {
        if percent > 80.0 {
            FillStatus::Full
        } else if percent > 50.0 {
            FillStatus::HalfFull
        } else if percent > 20.0 {
            FillStatus::Low
        } else {
            FillStatus::Empty
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FillStatus::Full => "FULL",
            FillStatus::HalfFull => "HALF FULL",
            FillStatus::Low => "LOW",
            FillStatus::Empty => "EMPTY",
        }
    }

    pub fn color(&self) -> Rgb<u8> {
        match self {
            FillStatus::Full => Rgb([0, 255, 0]),
            FillStatus::HalfFull => Rgb([255, 255, 0]),
            FillStatus::Low => Rgb([255, 165, 0]),
            FillStatus::Empty => Rgb([255, 0, 0]),
        }
    }
}

/// Outcome of one detector run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bottle (edge) or water (color) box; `None` when nothing large enough was found
    pub region: Option<Region>,
    /// `None` when no water line could be determined
    pub fill: Option<FillPercent>,
    /// Row of the water surface in frame coordinates
    pub water_line: Option<u32>,
    /// Size of the frame the coordinates refer to
    pub frame_size: (u32, u32),
    pub strategy: SegmentationKind,
}

impl Detection {
    pub fn not_found(frame_size: (u32, u32), strategy: SegmentationKind) -> Self {
        Self {
            region: None,
            fill: None,
            water_line: None,
            frame_size,
            strategy,
        }
    }

    pub fn status(&self) -> Option<FillStatus> {
        self.fill.map(|f| f.status())
    }

    /// Human-readable one-liner for the CLI and the GUI result label
    pub fn message(&self) -> String {
        match (&self.region, &self.fill) {
            (None, _) => "No bottle detected.".to_string(),
            (Some(_), None) => "Could not detect water level.".to_string(),
            (Some(_), Some(fill)) => format!("Estimated water fill: {}", fill),
        }
    }
}
