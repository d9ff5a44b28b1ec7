use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use palette::{FromColor, Hsv, Srgb};

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Apply Gaussian blur to reduce noise
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Resize to an exact (width, height), ignoring aspect ratio
pub fn resize(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() == width && img.height() == height {
        return img.clone();
    }
    img.resize_exact(width, height, FilterType::Triangle)
}

/// Pixels at or below `thresh` become 255, everything else 0
pub fn threshold_binary_inv(img: &GrayImage, thresh: u8) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        if img.get_pixel(x, y)[0] > thresh {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

/// RGB to HSV on the 8-bit OpenCV scale: H in [0, 180), S and V in [0, 255]
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = pixel.0;
    let hsv: Hsv = Hsv::from_color(Srgb::new(r, g, b).into_format::<f32>());
    let hue = hsv.hue.into_positive_degrees() / 2.0;
    [
        (hue.round() as u32 % 180) as u8,
        (hsv.saturation * 255.0).round() as u8,
        (hsv.value * 255.0).round() as u8,
    ]
}

/// Binary mask of pixels whose HSV triple lies inside [lower, upper] (inclusive)
pub fn hsv_in_range(img: &RgbImage, lower: [u8; 3], upper: [u8; 3]) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let hsv = rgb_to_hsv(*img.get_pixel(x, y));
        let inside = (0..3).all(|i| hsv[i] >= lower[i] && hsv[i] <= upper[i]);
        Luma([if inside { 255 } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_matches_opencv_scale() {
        assert_eq!(rgb_to_hsv(Rgb([0, 0, 255])), [120, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([255, 0, 0])), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([0, 255, 0])), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([0, 0, 0])), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(Rgb([128, 128, 128])), [0, 0, 128]);
        assert_eq!(rgb_to_hsv(Rgb([0, 255, 255])), [90, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([20, 60, 200]))[0], 113);
    }

    #[test]
    fn blue_range_keeps_blue_drops_red() {
        let img = RgbImage::from_fn(4, 1, |x, _| match x {
            0 => Rgb([20, 60, 200]),
            1 => Rgb([220, 10, 10]),
            2 => Rgb([10, 10, 30]),
            _ => Rgb([240, 240, 250]),
        });
        let mask = hsv_in_range(&img, [90, 50, 50], [130, 255, 255]);
        assert_eq!(mask.get_pixel(0, 0)[0], 255);
        assert_eq!(mask.get_pixel(1, 0)[0], 0);
        // too dark
        assert_eq!(mask.get_pixel(2, 0)[0], 0);
        // not saturated enough
        assert_eq!(mask.get_pixel(3, 0)[0], 0);
    }

    #[test]
    fn threshold_inverts_at_boundary() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([[99u8, 100, 101][x as usize]]));
        let out = threshold_binary_inv(&img, 100);
        assert_eq!(out.as_raw(), &vec![255, 255, 0]);
    }
}
