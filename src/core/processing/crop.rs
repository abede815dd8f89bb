//! Manual crop box geometry: hit testing, handle drags (free or with a locked
//! aspect ratio), clamping, and conversion to pixel rectangles.
//!
//! Coordinates are in source-image pixels as `f64`. A preview drawn at a
//! different scale converts with [`CropBox::scaled`].
use std::str::FromStr;

use image::{RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{Handle, ParseValueError, PixelRect};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Limits applied while dragging a crop box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CropConstraints {
    pub bounds_width: f64,
    pub bounds_height: f64,
    pub min_size: f64,
    /// Locked width / height ratio.
    pub aspect: Option<f64>,
}

impl CropConstraints {
    pub fn new(bounds_width: u32, bounds_height: u32) -> Self {
        Self {
            bounds_width: bounds_width.max(1) as f64,
            bounds_height: bounds_height.max(1) as f64,
            min_size: 1.0,
            aspect: None,
        }
    }

    pub fn with_min_size(mut self, min_size: f64) -> Self {
        self.min_size = min_size.max(1.0);
        self
    }

    pub fn with_aspect(mut self, aspect: Option<f64>) -> Self {
        self.aspect = aspect.filter(|r| r.is_finite() && *r > 0.0);
        self
    }

    fn min_width(&self) -> f64 {
        self.min_size.min(self.bounds_width)
    }

    fn min_height(&self) -> f64 {
        self.min_size.min(self.bounds_height)
    }
}

impl CropBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        let finite = [x, y, width, height].iter().all(|v| v.is_finite());
        if !finite || width <= 0.0 || height <= 0.0 {
            return Err(Error::InvalidCrop(format!(
                "{}x{} at ({}, {})",
                width, height, x, y
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f64,
            height: height as f64,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Shift the box inside `[0, w] x [0, h]`, shrinking only when it is larger
    /// than the bounds.
    pub fn clamp_to(self, bounds_width: f64, bounds_height: f64) -> Self {
        let bw = bounds_width.max(1.0);
        let bh = bounds_height.max(1.0);
        let width = self.width.clamp(1.0, bw);
        let height = self.height.clamp(1.0, bh);
        Self {
            x: self.x.clamp(0.0, bw - width),
            y: self.y.clamp(0.0, bh - height),
            width,
            height,
        }
    }

    pub fn scaled(self, sx: f64, sy: f64) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }

    pub fn handle_points(&self) -> [(Handle, f64, f64); 8] {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        [
            (Handle::NW, x, y),
            (Handle::N, x + w / 2.0, y),
            (Handle::NE, x + w, y),
            (Handle::E, x + w, y + h / 2.0),
            (Handle::SE, x + w, y + h),
            (Handle::S, x + w / 2.0, y + h),
            (Handle::SW, x, y + h),
            (Handle::W, x, y + h / 2.0),
        ]
    }

    /// Which handle sits under `(px, py)`. Corners take priority over edges,
    /// edges over the interior.
    pub fn hit_test(&self, px: f64, py: f64, tolerance: f64) -> Option<Handle> {
        let near = |hx: f64, hy: f64| ((px - hx).powi(2) + (py - hy).powi(2)).sqrt() <= tolerance;
        for (handle, hx, hy) in self.handle_points() {
            if handle.is_corner() && near(hx, hy) {
                return Some(handle);
            }
        }

        let within_y = py >= self.y && py <= self.bottom();
        let within_x = px >= self.x && px <= self.right();
        if within_y && (px - self.x).abs() <= tolerance {
            return Some(Handle::W);
        }
        if within_y && (px - self.right()).abs() <= tolerance {
            return Some(Handle::E);
        }
        if within_x && (py - self.y).abs() <= tolerance {
            return Some(Handle::N);
        }
        if within_x && (py - self.bottom()).abs() <= tolerance {
            return Some(Handle::S);
        }

        self.contains(px, py).then_some(Handle::Move)
    }

    /// Apply a drag of `(dx, dy)` on `handle`.
    pub fn drag(&self, handle: Handle, dx: f64, dy: f64, constraints: &CropConstraints) -> Self {
        let current = self.clamp_to(constraints.bounds_width, constraints.bounds_height);
        let next = match (handle, constraints.aspect) {
            (Handle::Move, _) => current.translated(dx, dy, constraints),
            (_, None) => current.resized_free(handle, dx, dy, constraints),
            (_, Some(ratio)) => current.resized_locked(handle, dx, dy, ratio, constraints),
        };
        debug!(
            "crop drag {:?} by ({:.1}, {:.1}): {:?} -> {:?}",
            handle, dx, dy, current, next
        );
        next
    }

    fn translated(&self, dx: f64, dy: f64, c: &CropConstraints) -> Self {
        Self {
            x: (self.x + dx).clamp(0.0, c.bounds_width - self.width),
            y: (self.y + dy).clamp(0.0, c.bounds_height - self.height),
            ..*self
        }
    }

    fn resized_free(&self, handle: Handle, dx: f64, dy: f64, c: &CropConstraints) -> Self {
        let (min_w, min_h) = (c.min_width(), c.min_height());
        let (mut left, mut top, mut right, mut bottom) =
            (self.x, self.y, self.right(), self.bottom());

        if handle.moves_left() {
            left = (left + dx).clamp(0.0, (right - min_w).max(0.0));
        }
        if handle.moves_right() {
            right = (right + dx).clamp((left + min_w).min(c.bounds_width), c.bounds_width);
        }
        if handle.moves_top() {
            top = (top + dy).clamp(0.0, (bottom - min_h).max(0.0));
        }
        if handle.moves_bottom() {
            bottom = (bottom + dy).clamp((top + min_h).min(c.bounds_height), c.bounds_height);
        }

        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    fn resized_locked(
        &self,
        handle: Handle,
        dx: f64,
        dy: f64,
        ratio: f64,
        c: &CropConstraints,
    ) -> Self {
        let tiny = 1e-9;
        let grow_w = if handle.moves_right() {
            dx
        } else if handle.moves_left() {
            -dx
        } else {
            0.0
        };
        let grow_h = if handle.moves_bottom() {
            dy
        } else if handle.moves_top() {
            -dy
        } else {
            0.0
        };
        let mut w = (self.width + grow_w).max(tiny);
        let mut h = (self.height + grow_h).max(tiny);

        if handle.is_corner() {
            let rel_w = (w / self.width - 1.0).abs();
            let rel_h = (h / self.height - 1.0).abs();
            if rel_w >= rel_h {
                h = w / ratio;
            } else {
                w = h * ratio;
            }
        } else if matches!(handle, Handle::N | Handle::S) {
            w = h * ratio;
        } else {
            h = w / ratio;
        }

        let grow = (c.min_width() / w).max(c.min_height() / h).max(1.0);
        w *= grow;
        h *= grow;

        // Room available from the anchor in each direction.
        let (cx, cy) = self.center();
        let max_w = if handle.moves_right() {
            c.bounds_width - self.x
        } else if handle.moves_left() {
            self.right()
        } else {
            2.0 * cx.min(c.bounds_width - cx)
        };
        let max_h = if handle.moves_bottom() {
            c.bounds_height - self.y
        } else if handle.moves_top() {
            self.bottom()
        } else {
            2.0 * cy.min(c.bounds_height - cy)
        };
        let shrink = (max_w / w).min(max_h / h).min(1.0);
        w *= shrink;
        h *= shrink;

        let x = if handle.moves_right() {
            self.x
        } else if handle.moves_left() {
            self.right() - w
        } else {
            cx - w / 2.0
        };
        let y = if handle.moves_bottom() {
            self.y
        } else if handle.moves_top() {
            self.bottom() - h
        } else {
            cy - h / 2.0
        };

        Self {
            x,
            y,
            width: w,
            height: h,
        }
    }

    /// Round to whole pixels; never smaller than 1x1.
    pub fn to_pixel_rect(&self) -> PixelRect {
        PixelRect::new(
            self.x.max(0.0).round() as u32,
            self.y.max(0.0).round() as u32,
            (self.width.round() as u32).max(1),
            (self.height.round() as u32).max(1),
        )
    }
}

impl FromStr for CropBox {
    type Err = ParseValueError;

    /// Parses `x,y,width,height`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| ParseValueError::new("crop box", s))?;
        match parts.as_slice() {
            [x, y, w, h] => {
                CropBox::new(*x, *y, *w, *h).map_err(|_| ParseValueError::new("crop box", s))
            }
            _ => Err(ParseValueError::new("crop box", s)),
        }
    }
}

/// Copy the region under `crop` out of `image`. The box is clamped to the image
/// first; a box that misses the image entirely is an error.
pub fn apply_crop(image: &RgbaImage, crop: &CropBox) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    let (bw, bh) = (width as f64, height as f64);
    if crop.x >= bw || crop.y >= bh || crop.right() <= 0.0 || crop.bottom() <= 0.0 {
        return Err(Error::InvalidCrop(format!(
            "{:?} lies outside the {}x{} image",
            crop, width, height
        )));
    }

    let mut rect = crop.clamp_to(bw, bh).to_pixel_rect();
    rect.x = rect.x.min(width - 1);
    rect.y = rect.y.min(height - 1);
    rect.width = rect.width.min(width - rect.x);
    rect.height = rect.height.min(height - rect.y);

    debug!("Cropping {}x{} image to {}", width, height, rect);
    Ok(imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image())
}

/// Common aspect ratio locks for the crop tool.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectPreset {
    #[default]
    Free,
    Original,
    Square,
    R4_3,
    R3_4,
    R16_9,
    R9_16,
    R3_2,
    R2_3,
}

impl AspectPreset {
    pub fn ratio(self, image_width: u32, image_height: u32) -> Option<f64> {
        match self {
            AspectPreset::Free => None,
            AspectPreset::Original => {
                (image_height > 0).then(|| image_width as f64 / image_height as f64)
            }
            AspectPreset::Square => Some(1.0),
            AspectPreset::R4_3 => Some(4.0 / 3.0),
            AspectPreset::R3_4 => Some(3.0 / 4.0),
            AspectPreset::R16_9 => Some(16.0 / 9.0),
            AspectPreset::R9_16 => Some(9.0 / 16.0),
            AspectPreset::R3_2 => Some(3.0 / 2.0),
            AspectPreset::R2_3 => Some(2.0 / 3.0),
        }
    }
}

/// Reshape `crop` to `ratio` around its center, keeping its major dimension
/// where the bounds allow.
pub fn fit_aspect(crop: &CropBox, ratio: f64, bounds_width: f64, bounds_height: f64) -> CropBox {
    let (cx, cy) = crop.center();
    let max_dim = crop.width.max(crop.height);
    let (mut w, mut h) = if ratio >= 1.0 {
        (max_dim, max_dim / ratio)
    } else {
        (max_dim * ratio, max_dim)
    };
    if w > bounds_width {
        w = bounds_width;
        h = w / ratio;
    }
    if h > bounds_height {
        h = bounds_height;
        w = h * ratio;
    }
    CropBox {
        x: cx - w / 2.0,
        y: cy - h / 2.0,
        width: w,
        height: h,
    }
    .clamp_to(bounds_width, bounds_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn bx(x: f64, y: f64, w: f64, h: f64) -> CropBox {
        CropBox::new(x, y, w, h).unwrap()
    }

    #[test]
    fn rejects_degenerate_boxes() {
        assert!(CropBox::new(0.0, 0.0, 0.0, 5.0).is_err());
        assert!(CropBox::new(f64::NAN, 0.0, 5.0, 5.0).is_err());
    }

    #[test]
    fn clamp_shifts_before_shrinking() {
        let c = bx(-10.0, 90.0, 50.0, 30.0).clamp_to(100.0, 100.0);
        assert_eq!(c, bx(0.0, 70.0, 50.0, 30.0));
        let c = bx(10.0, 10.0, 500.0, 20.0).clamp_to(100.0, 100.0);
        assert_eq!(c, bx(0.0, 10.0, 100.0, 20.0));
    }

    #[test]
    fn hit_test_prefers_corners_then_edges() {
        let c = bx(10.0, 10.0, 100.0, 50.0);
        assert_eq!(c.hit_test(11.0, 12.0, 5.0), Some(Handle::NW));
        assert_eq!(c.hit_test(110.0, 60.0, 5.0), Some(Handle::SE));
        assert_eq!(c.hit_test(60.0, 8.0, 5.0), Some(Handle::N));
        assert_eq!(c.hit_test(108.0, 30.0, 5.0), Some(Handle::E));
        assert_eq!(c.hit_test(60.0, 30.0, 5.0), Some(Handle::Move));
        assert_eq!(c.hit_test(200.0, 200.0, 5.0), None);
    }

    #[test]
    fn move_is_clamped_to_bounds() {
        let c = bx(10.0, 10.0, 20.0, 20.0);
        let k = CropConstraints::new(100, 50);
        assert_eq!(c.drag(Handle::Move, 500.0, -500.0, &k), bx(80.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn edge_drag_keeps_opposite_edge() {
        let c = bx(10.0, 10.0, 40.0, 40.0);
        let k = CropConstraints::new(100, 100);
        let r = c.drag(Handle::E, 15.0, 99.0, &k);
        assert_eq!(r, bx(10.0, 10.0, 55.0, 40.0));
        let r = c.drag(Handle::NW, -20.0, 5.0, &k);
        assert_eq!(r, bx(0.0, 15.0, 50.0, 35.0));
    }

    #[test]
    fn free_resize_respects_min_size() {
        let c = bx(10.0, 10.0, 40.0, 40.0);
        let k = CropConstraints::new(100, 100).with_min_size(8.0);
        let r = c.drag(Handle::W, 100.0, 0.0, &k);
        assert!(approx(r.width, 8.0));
        assert!(approx(r.right(), 50.0));
    }

    #[test]
    fn locked_corner_drag_keeps_ratio_and_anchor() {
        let c = bx(10.0, 10.0, 40.0, 20.0);
        let k = CropConstraints::new(200, 200).with_aspect(Some(2.0));
        let r = c.drag(Handle::SE, 20.0, 2.0, &k);
        assert!(approx(r.width / r.height, 2.0));
        assert!(approx(r.x, 10.0) && approx(r.y, 10.0));
        assert!(approx(r.width, 60.0));
    }

    #[test]
    fn locked_drag_shrinks_to_fit_bounds() {
        let c = bx(50.0, 50.0, 20.0, 20.0);
        let k = CropConstraints::new(100, 100).with_aspect(Some(1.0));
        let r = c.drag(Handle::SE, 500.0, 500.0, &k);
        assert!(approx(r.width, 50.0) && approx(r.height, 50.0));
        assert!(approx(r.right(), 100.0) && approx(r.bottom(), 100.0));
    }

    #[test]
    fn locked_edge_drag_keeps_center_line() {
        let c = bx(40.0, 40.0, 20.0, 20.0);
        let k = CropConstraints::new(100, 100).with_aspect(Some(1.0));
        let r = c.drag(Handle::S, 0.0, 10.0, &k);
        assert!(approx(r.height, 30.0) && approx(r.width, 30.0));
        assert!(approx(r.center().0, 50.0));
        assert!(approx(r.y, 40.0));
    }

    #[test]
    fn pixel_rect_rounds_and_has_min_size() {
        let r = bx(1.4, 2.6, 0.2, 9.5).to_pixel_rect();
        assert_eq!(r, PixelRect::new(1, 3, 1, 10));
    }

    #[test]
    fn scaled_maps_preview_to_image() {
        let c = bx(10.0, 5.0, 20.0, 10.0).scaled(4.0, 4.0);
        assert_eq!(c, bx(40.0, 20.0, 80.0, 40.0));
    }

    #[test]
    fn parses_crop_argument() {
        assert_eq!("1,2,3,4".parse::<CropBox>().unwrap(), bx(1.0, 2.0, 3.0, 4.0));
        assert!("1,2,3".parse::<CropBox>().is_err());
        assert!("1,2,0,4".parse::<CropBox>().is_err());
    }

    #[test]
    fn apply_crop_copies_region() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        img.put_pixel(3, 4, Rgba([255, 0, 0, 255]));
        let out = apply_crop(&img, &bx(3.0, 4.0, 2.0, 2.0)).unwrap();
        assert_eq!(out.dimensions(), (2, 2));
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn apply_crop_clamps_overhang_and_rejects_misses() {
        let img = RgbaImage::new(10, 10);
        let out = apply_crop(&img, &bx(8.0, 8.0, 5.0, 5.0)).unwrap();
        assert_eq!(out.dimensions(), (5, 5));
        assert!(apply_crop(&img, &bx(20.0, 0.0, 5.0, 5.0)).is_err());
    }

    #[test]
    fn fit_aspect_reshapes_around_center() {
        let c = bx(0.0, 0.0, 100.0, 100.0);
        let r = fit_aspect(&c, 16.0 / 9.0, 100.0, 100.0);
        assert!(approx(r.width, 100.0));
        assert!(approx(r.height, 56.25));
        assert!(approx(r.center().1, 50.0));
        assert_eq!(AspectPreset::Original.ratio(300, 150), Some(2.0));
        assert_eq!(AspectPreset::Free.ratio(300, 150), None);
    }
}
