use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::processing::autocrop::{AutoCropParams, auto_crop};
use crate::core::processing::crop::{CropBox, apply_crop};
use crate::core::processing::flip::flip_in_place;
use crate::error::Result;
use crate::types::FlipAxis;

/// Edits applied to one image before it is placed in the grid.
///
/// Order is fixed: auto-crop, then the manual crop (in the coordinates of the
/// auto-cropped image), then flips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellEdits {
    pub autocrop: Option<AutoCropParams>,
    pub crop: Option<CropBox>,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl CellEdits {
    pub fn is_empty(&self) -> bool {
        self.autocrop.is_none() && self.crop.is_none() && !self.flip_horizontal && !self.flip_vertical
    }
}

pub fn apply_edits(image: &RgbaImage, edits: &CellEdits) -> Result<RgbaImage> {
    if edits.is_empty() {
        return Ok(image.clone());
    }

    let (width, height) = image.dimensions();
    let mut current = match &edits.autocrop {
        Some(params) => auto_crop(image, params)?.image,
        None => image.clone(),
    };
    if let Some(crop) = &edits.crop {
        current = apply_crop(&current, crop)?;
    }
    if edits.flip_horizontal {
        flip_in_place(&mut current, FlipAxis::Horizontal);
    }
    if edits.flip_vertical {
        flip_in_place(&mut current, FlipAxis::Vertical);
    }

    info!(
        "Edited image {}x{} -> {}x{}",
        width,
        height,
        current.width(),
        current.height()
    );
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn no_edits_is_identity() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 255]));
        assert_eq!(apply_edits(&img, &CellEdits::default()).unwrap(), img);
    }

    #[test]
    fn crop_is_relative_to_autocropped_image() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        for y in 2..6 {
            for x in 2..6 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        img.put_pixel(2, 2, Rgba([255, 0, 0, 255]));

        let edits = CellEdits {
            autocrop: Some(AutoCropParams::default()),
            crop: Some(CropBox::new(0.0, 0.0, 2.0, 2.0).unwrap()),
            flip_horizontal: true,
            ..Default::default()
        };
        let out = apply_edits(&img, &edits).unwrap();
        assert_eq!(out.dimensions(), (2, 2));
        assert_eq!(out.get_pixel(1, 0), &Rgba([255, 0, 0, 255]));
    }
}
