//! Fit an image into a fixed-size canvas.
use std::borrow::Cow;

use image::{RgbaImage, imageops};
use tracing::debug;

use crate::core::processing::padding::pad_to_canvas;
use crate::core::processing::resize::{calculate_fit_dimensions, cover_source_crop, resize_rgba};
use crate::error::Result;
use crate::types::{Color, FitMode, PixelRect};

/// Fit `image` into a `width x height` canvas filled with `background`.
/// The result is always exactly `width x height`.
pub fn letterbox(
    image: &RgbaImage,
    width: u32,
    height: u32,
    mode: FitMode,
    background: Color,
) -> Result<RgbaImage> {
    let (src_width, src_height) = image.dimensions();
    if mode == FitMode::Cover {
        let region = cover_source_crop(src_width, src_height, width, height)?;
        let cropped = if region == PixelRect::new(0, 0, src_width, src_height) {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(
                imageops::crop_imm(image, region.x, region.y, region.width, region.height)
                    .to_image(),
            )
        };
        let resized = resize_rgba(&cropped, width, height)?;
        return pad_to_canvas(&resized, width, height, 0, 0, background);
    }

    let rect = calculate_fit_dimensions(src_width, src_height, width, height, mode)?;
    let resized = resize_rgba(image, rect.width, rect.height)?;
    pad_to_canvas(&resized, width, height, rect.x, rect.y, background)
}

/// Fit `image` into `cell` of an existing canvas. Overflow (cover mode) never
/// leaves the cell.
pub fn letterbox_into(
    canvas: &mut RgbaImage,
    image: &RgbaImage,
    cell: PixelRect,
    mode: FitMode,
) -> Result<()> {
    let tile = letterbox(image, cell.width, cell.height, mode, Color::TRANSPARENT)?;
    debug!("placing {}x{} tile at {}", tile.width(), tile.height(), cell);
    imageops::overlay(canvas, &tile, cell.x as i64, cell.y as i64);
    Ok(())
}
