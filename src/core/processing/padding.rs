use image::{RgbaImage, imageops};
use tracing::info;

use crate::error::{Error, Result};
use crate::types::Color;

/// Place `image` at `(x, y)` on a `canvas_width x canvas_height` canvas filled with
/// `background`. Offsets may be negative; whatever falls outside the canvas is clipped.
pub fn pad_to_canvas(
    image: &RgbaImage,
    canvas_width: u32,
    canvas_height: u32,
    x: i64,
    y: i64,
    background: Color,
) -> Result<RgbaImage> {
    if canvas_width == 0 || canvas_height == 0 {
        return Err(Error::ZeroSize { what: "canvas" });
    }
    let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, background.to_rgba());
    imageops::overlay(&mut canvas, image, x, y);
    Ok(canvas)
}

/// Center the image on a square canvas whose side is the image's long side.
pub fn pad_to_square(image: &RgbaImage, background: Color) -> Result<RgbaImage> {
    let (cols, rows) = image.dimensions();
    let max_dim = cols.max(rows);
    let pad_cols = (max_dim - cols) / 2;
    let pad_rows = (max_dim - rows) / 2;

    info!(
        "Adding padding: cols={}, rows={}, pad_cols={}, pad_rows={}",
        cols, rows, pad_cols, pad_rows
    );
    info!("Final dimensions: {}x{}", max_dim, max_dim);

    pad_to_canvas(
        image,
        max_dim,
        max_dim,
        pad_cols as i64,
        pad_rows as i64,
        background,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn pad_to_square_centers_image() {
        let img = RgbaImage::from_pixel(4, 2, Rgba([255, 0, 0, 255]));
        let out = pad_to_square(&img, Color::BLACK).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(0, 1), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(3, 2), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(3, 3), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn negative_offsets_are_clipped() {
        let img = RgbaImage::from_pixel(6, 6, Rgba([0, 0, 255, 255]));
        let out = pad_to_canvas(&img, 4, 4, -4, -4, Color::WHITE).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(out.get_pixel(1, 1), &Rgba([0, 0, 255, 255]));
        assert_eq!(out.get_pixel(2, 2), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn transparent_pixels_show_background() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 0]));
        let out = pad_to_canvas(&img, 2, 2, 0, 0, Color::rgb(1, 2, 3)).unwrap();
        assert_eq!(out.get_pixel(1, 1), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn zero_canvas_is_rejected() {
        let img = RgbaImage::new(1, 1);
        assert!(pad_to_canvas(&img, 0, 5, 0, 0, Color::WHITE).is_err());
    }
}
