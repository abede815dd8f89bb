use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::RgbaImage;

use crate::error::{Error, Result};
use crate::types::Color;

/// Composite RGBA pixels over `background` and drop the alpha channel.
/// JPEG has no transparency; a transparent background falls back to white.
pub fn flatten_alpha(image: &RgbaImage, background: Color) -> Vec<u8> {
    let bg = if background.a == 0 {
        Color::WHITE
    } else {
        background
    };
    let mut rgb = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for px in image.pixels() {
        let a = px[3] as u32;
        let blend = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
        rgb.push(blend(px[0], bg.r));
        rgb.push(blend(px[1], bg.g));
        rgb.push(blend(px[2], bg.b));
    }
    rgb
}

pub fn write_rgb_jpeg(
    output: &Path,
    cols: u32,
    rows: u32,
    rgb_data: &[u8],
    quality: u8,
) -> Result<()> {
    let (width, height) = match (u16::try_from(cols), u16::try_from(rows)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(Error::InvalidArgument {
                arg: "jpeg dimensions",
                value: format!("{}x{} exceeds 65535", cols, rows),
            });
        }
    };
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, quality);
    encoder.encode(rgb_data, width, height, ColorType::Rgb)?;
    Ok(())
}

pub fn write_rgba_as_jpeg(
    output: &Path,
    image: &RgbaImage,
    background: Color,
    quality: u8,
) -> Result<()> {
    let rgb = flatten_alpha(image, background);
    write_rgb_jpeg(output, image.width(), image.height(), &rgb, quality)
}
