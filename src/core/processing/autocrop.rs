//! Color-distance auto-crop ("chroma key" trimming).
//!
//! A key color is picked from the image border (or given explicitly), every
//! pixel is compared to it by Euclidean RGB distance, and the tight bounding
//! box of the pixels that differ by more than the tolerance is kept.
//! Optionally the key-colored pixels are made transparent.
use image::{Rgba, RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::{Color, PixelRect};

/// Largest possible RGB distance, `sqrt(3 * 255^2)`.
pub const MAX_COLOR_DISTANCE: f32 = 441.672_96;

/// Euclidean distance between the RGB components of two pixels. Alpha is ignored.
pub fn color_distance(a: Rgba<u8>, b: Rgba<u8>) -> f32 {
    let dr = a[0] as f32 - b[0] as f32;
    let dg = a[1] as f32 - b[1] as f32;
    let db = a[2] as f32 - b[2] as f32;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Where the background (key) color comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSample {
    TopLeft,
    /// Most frequent of the four corner pixels; ties go to the top-left one.
    #[default]
    Corners,
    Color(Color),
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCropParams {
    pub sample: BackgroundSample,
    /// Pixels within this RGB distance of the key count as background.
    pub tolerance: f32,
    /// Extra pixels kept around the detected content.
    pub margin: u32,
    /// Make background pixels transparent after cropping.
    pub remove_background: bool,
    /// Width of the soft alpha ramp beyond `tolerance` when removing the background.
    pub feather: f32,
}

impl Default for AutoCropParams {
    fn default() -> Self {
        Self {
            sample: BackgroundSample::Corners,
            tolerance: 32.0,
            margin: 0,
            remove_background: false,
            feather: 0.0,
        }
    }
}

impl AutoCropParams {
    fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidArgument {
                arg: "tolerance",
                value: self.tolerance.to_string(),
            });
        }
        if !self.feather.is_finite() || self.feather < 0.0 {
            return Err(Error::InvalidArgument {
                arg: "feather",
                value: self.feather.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AutoCropOutcome {
    pub image: RgbaImage,
    /// Region of the source that was kept (full image when nothing was found).
    pub bounds: PixelRect,
    pub key: Color,
    pub found_content: bool,
}

/// Key color for `sample`. An empty image has no pixels to sample.
pub fn sample_key(image: &RgbaImage, sample: BackgroundSample) -> Result<Color> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(Error::ZeroSize { what: "image" });
    }
    let key = match sample {
        BackgroundSample::Color(c) => c,
        BackgroundSample::TopLeft => Color::from_rgba(*image.get_pixel(0, 0)),
        BackgroundSample::Corners => {
            let corners = [
                *image.get_pixel(0, 0),
                *image.get_pixel(w - 1, 0),
                *image.get_pixel(0, h - 1),
                *image.get_pixel(w - 1, h - 1),
            ];
            let mut best = corners[0];
            let mut best_count = 0;
            for candidate in corners {
                let count = corners.iter().filter(|c| **c == candidate).count();
                if count > best_count {
                    best = candidate;
                    best_count = count;
                }
            }
            Color::from_rgba(best)
        }
    };
    Ok(key)
}

/// Tight bounding box of the pixels that are visible and farther than
/// `tolerance` from `key`. `None` when the whole image matches the key.
pub fn find_content_bounds(image: &RgbaImage, key: Color, tolerance: f32) -> Option<PixelRect> {
    let key = key.to_rgba();
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, px) in image.enumerate_pixels() {
        if px[3] == 0 || color_distance(*px, key) <= tolerance {
            continue;
        }
        found = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    found.then(|| PixelRect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Clear pixels close to `key`. With `feather > 0`, pixels between `tolerance`
/// and `tolerance + feather` fade linearly instead of switching off.
pub fn remove_background(image: &mut RgbaImage, key: Color, tolerance: f32, feather: f32) {
    let key = key.to_rgba();
    for px in image.pixels_mut() {
        if px[3] == 0 {
            continue;
        }
        let d = color_distance(*px, key);
        if d <= tolerance {
            px[3] = 0;
        } else if feather > 0.0 && d < tolerance + feather {
            let keep = (d - tolerance) / feather;
            px[3] = (px[3] as f32 * keep).round() as u8;
        }
    }
}

pub fn auto_crop(image: &RgbaImage, params: &AutoCropParams) -> Result<AutoCropOutcome> {
    params.validate()?;
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::ZeroSize { what: "image" });
    }

    let key = sample_key(image, params.sample)?;
    debug!("auto-crop key color {} tolerance {}", key, params.tolerance);

    let (bounds, found_content) = match find_content_bounds(image, key, params.tolerance) {
        Some(content) => {
            let x0 = content.x.saturating_sub(params.margin);
            let y0 = content.y.saturating_sub(params.margin);
            let x1 = content.right().saturating_add(params.margin).min(width);
            let y1 = content.bottom().saturating_add(params.margin).min(height);
            (PixelRect::new(x0, y0, x1 - x0, y1 - y0), true)
        }
        None => {
            warn!(
                "No content differs from key color {} by more than {}; leaving image uncropped",
                key, params.tolerance
            );
            (PixelRect::new(0, 0, width, height), false)
        }
    };

    info!("Auto-crop: {}x{} -> {} (key {})", width, height, bounds, key);

    let mut cropped =
        imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height).to_image();
    if params.remove_background {
        remove_background(&mut cropped, key, params.tolerance, params.feather);
    }

    Ok(AutoCropOutcome {
        image: cropped,
        bounds,
        key,
        found_content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn framed(width: u32, height: u32, content: PixelRect) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(width, height, WHITE);
        for y in content.y..content.bottom() {
            for x in content.x..content.right() {
                img.put_pixel(x, y, BLUE);
            }
        }
        img
    }

    #[test]
    fn distance_matches_euclidean_rgb() {
        assert_eq!(color_distance(WHITE, WHITE), 0.0);
        assert!((color_distance(Rgba([0, 0, 0, 255]), WHITE) - MAX_COLOR_DISTANCE).abs() < 1e-3);
        assert_eq!(
            color_distance(Rgba([3, 4, 0, 0]), Rgba([0, 0, 0, 255])),
            5.0
        );
    }

    #[test]
    fn finds_tight_bounds() {
        let img = framed(20, 10, PixelRect::new(5, 2, 4, 3));
        let bounds = find_content_bounds(&img, Color::WHITE, 10.0).unwrap();
        assert_eq!(bounds, PixelRect::new(5, 2, 4, 3));
    }

    #[test]
    fn near_key_colors_count_as_background() {
        let mut img = framed(10, 10, PixelRect::new(4, 4, 2, 2));
        img.put_pixel(0, 5, Rgba([250, 250, 250, 255]));
        let bounds = find_content_bounds(&img, Color::WHITE, 20.0).unwrap();
        assert_eq!(bounds, PixelRect::new(4, 4, 2, 2));
    }

    #[test]
    fn transparent_pixels_are_ignored() {
        let mut img = framed(10, 10, PixelRect::new(4, 4, 2, 2));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let bounds = find_content_bounds(&img, Color::WHITE, 1.0).unwrap();
        assert_eq!(bounds, PixelRect::new(4, 4, 2, 2));
    }

    #[test]
    fn corners_majority_picks_background() {
        let mut img = framed(8, 8, PixelRect::new(2, 2, 2, 2));
        img.put_pixel(0, 0, BLUE);
        let key = sample_key(&img, BackgroundSample::Corners).unwrap();
        assert_eq!(key, Color::WHITE);
        let key = sample_key(&img, BackgroundSample::TopLeft).unwrap();
        assert_eq!(key, Color::from_rgba(BLUE));
    }

    #[test]
    fn corner_tie_goes_to_top_left() {
        // Top-left and bottom-right share a color, the other diagonal another.
        let mut img = RgbaImage::from_pixel(6, 6, WHITE);
        img.put_pixel(0, 0, BLUE);
        img.put_pixel(5, 5, BLUE);
        let key = sample_key(&img, BackgroundSample::Corners).unwrap();
        assert_eq!(key, Color::from_rgba(BLUE));

        // All four corners differ.
        img.put_pixel(5, 0, Rgba([1, 1, 1, 255]));
        img.put_pixel(0, 5, Rgba([2, 2, 2, 255]));
        img.put_pixel(5, 5, Rgba([3, 3, 3, 255]));
        let key = sample_key(&img, BackgroundSample::Corners).unwrap();
        assert_eq!(key, Color::from_rgba(BLUE));
    }

    #[test]
    fn empty_image_has_no_key() {
        let img = RgbaImage::new(0, 0);
        assert!(sample_key(&img, BackgroundSample::Corners).is_err());
        assert!(sample_key(&img, BackgroundSample::Color(Color::WHITE)).is_err());
    }

    #[test]
    fn auto_crop_applies_margin_clamped_to_image() {
        let img = framed(20, 10, PixelRect::new(1, 3, 4, 4));
        let params = AutoCropParams {
            margin: 2,
            ..Default::default()
        };
        let out = auto_crop(&img, &params).unwrap();
        assert!(out.found_content);
        assert_eq!(out.bounds, PixelRect::new(0, 1, 7, 8));
        assert_eq!(out.image.dimensions(), (7, 8));
    }

    #[test]
    fn uniform_image_is_returned_unchanged() {
        let img = RgbaImage::from_pixel(6, 4, WHITE);
        let out = auto_crop(&img, &AutoCropParams::default()).unwrap();
        assert!(!out.found_content);
        assert_eq!(out.bounds, PixelRect::new(0, 0, 6, 4));
        assert_eq!(out.image, img);
    }

    #[test]
    fn remove_background_clears_key_pixels() {
        let img = framed(10, 10, PixelRect::new(2, 2, 6, 6));
        let params = AutoCropParams {
            margin: 1,
            remove_background: true,
            ..Default::default()
        };
        let out = auto_crop(&img, &params).unwrap();
        assert_eq!(out.image.get_pixel(0, 0)[3], 0);
        assert_eq!(out.image.get_pixel(3, 3), &BLUE);
    }

    #[test]
    fn feather_ramps_alpha() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 10, 255]));
        remove_background(&mut img, Color::BLACK, 0.0, 20.0);
        assert_eq!(img.get_pixel(0, 0)[3], 128);
    }

    #[test]
    fn explicit_key_color_is_used() {
        let img = framed(10, 10, PixelRect::new(2, 2, 3, 3));
        let params = AutoCropParams {
            sample: BackgroundSample::Color(Color::from_rgba(BLUE)),
            ..Default::default()
        };
        let out = auto_crop(&img, &params).unwrap();
        assert_eq!(out.bounds, PixelRect::new(0, 0, 10, 10));
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let img = RgbaImage::from_pixel(2, 2, WHITE);
        let params = AutoCropParams {
            tolerance: -1.0,
            ..Default::default()
        };
        assert!(auto_crop(&img, &params).is_err());
    }
}
