use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::RgbaImage;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{FitMode, PixelRect};

/// Placement of a scaled source inside a target box.
///
/// Offsets are relative to the box's top-left corner and may be negative
/// for [`FitMode::Cover`], where the scaled image overflows the box. Cover is
/// rendered from [`cover_source_crop`] instead of resizing to this rect.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FitRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

pub fn calculate_fit_dimensions(
    src_width: u32,
    src_height: u32,
    box_width: u32,
    box_height: u32,
    mode: FitMode,
) -> Result<FitRect> {
    if src_width == 0 || src_height == 0 {
        return Err(Error::ZeroSize {
            what: "source image size",
        });
    }
    if box_width == 0 || box_height == 0 {
        return Err(Error::ZeroSize { what: "target box" });
    }

    let sx = box_width as f64 / src_width as f64;
    let sy = box_height as f64 / src_height as f64;

    let (width, height) = match mode {
        FitMode::Stretch => (box_width, box_height),
        FitMode::Contain => {
            let scale = sx.min(sy);
            let w = ((src_width as f64 * scale).round() as u32).clamp(1, box_width);
            let h = ((src_height as f64 * scale).round() as u32).clamp(1, box_height);
            (w, h)
        }
        FitMode::Cover => {
            let scale = sx.max(sy);
            let w = ((src_width as f64 * scale).round() as u32).max(box_width);
            let h = ((src_height as f64 * scale).round() as u32).max(box_height);
            (w, h)
        }
    };

    let x = (box_width as i64 - width as i64) / 2;
    let y = (box_height as i64 - height as i64) / 2;

    debug!(
        "fit {}x{} into {}x{} ({}): {}x{} at ({}, {})",
        src_width, src_height, box_width, box_height, mode, width, height, x, y
    );

    Ok(FitRect {
        x,
        y,
        width,
        height,
    })
}

/// Centered region of a `src_width x src_height` source with the aspect ratio
/// of the box. Resizing it to the box size gives the Cover result without
/// building the overflowing intermediate image.
pub fn cover_source_crop(
    src_width: u32,
    src_height: u32,
    box_width: u32,
    box_height: u32,
) -> Result<PixelRect> {
    if src_width == 0 || src_height == 0 {
        return Err(Error::ZeroSize {
            what: "source image size",
        });
    }
    if box_width == 0 || box_height == 0 {
        return Err(Error::ZeroSize { what: "target box" });
    }

    let box_ratio = box_width as f64 / box_height as f64;
    let width = ((src_height as f64 * box_ratio).round() as u32).clamp(1, src_width);
    let height = ((src_width as f64 / box_ratio).round() as u32).clamp(1, src_height);
    let rect = PixelRect::new(
        (src_width - width) / 2,
        (src_height - height) / 2,
        width,
        height,
    );
    debug!(
        "cover {}x{} into {}x{}: source region {}",
        src_width, src_height, box_width, box_height, rect
    );
    Ok(rect)
}

/// Scale dimensions so the long side equals `target_size`, keeping the aspect ratio.
/// Images already smaller than the target keep their size.
pub fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    target_size: u32,
) -> (u32, u32) {
    let short_side = original_height.min(original_width);
    let long_side = original_height.max(original_width);

    if target_size >= long_side {
        if target_size > long_side {
            warn!(
                "Target size {} is larger than original long side {}. Keeping original dimensions {}x{}",
                target_size, long_side, original_width, original_height
            );
        }
        return (original_width, original_height);
    }

    let scale_factor = target_size as f64 / long_side as f64;
    let new_short_side = ((short_side as f64 * scale_factor).round() as u32).max(1);

    if original_width > original_height {
        (target_size, new_short_side)
    } else {
        (new_short_side, target_size)
    }
}

/// Lanczos3 resize of an RGBA image. Alpha is premultiplied during filtering.
pub fn resize_rgba(image: &RgbaImage, target_width: u32, target_height: u32) -> Result<RgbaImage> {
    if target_width == 0 || target_height == 0 {
        return Err(Error::ZeroSize { what: "resize target" });
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::ZeroSize {
            what: "source image size",
        });
    }
    if (width, height) == (target_width, target_height) {
        return Ok(image.clone());
    }

    let resize_options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    let mut resizer = Resizer::new();

    let src_image = ImageRef::new(width, height, image.as_raw(), PixelType::U8x4)?;
    let mut dst_image = Image::new(target_width, target_height, PixelType::U8x4);
    resizer.resize(&src_image, &mut dst_image, &resize_options)?;

    RgbaImage::from_raw(target_width, target_height, dst_image.into_vec()).ok_or_else(|| {
        Error::Processing(format!(
            "resized buffer does not match {}x{}",
            target_width, target_height
        ))
    })
}

/// Downscale so that the long side is at most `max_side`; never upscales.
pub fn limit_long_side(image: &RgbaImage, max_side: u32) -> Result<RgbaImage> {
    if max_side == 0 {
        return Err(Error::ZeroSize { what: "max side" });
    }
    let (width, height) = image.dimensions();
    if width.max(height) <= max_side {
        return Ok(image.clone());
    }
    let (new_width, new_height) = calculate_resize_dimensions(width, height, max_side);
    resize_rgba(image, new_width, new_height)
}
