use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::error::Result;

pub fn write_png(output: &Path, image: &RgbaImage) -> Result<()> {
    image.save_with_format(output, ImageFormat::Png)?;
    Ok(())
}
