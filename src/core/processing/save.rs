use std::borrow::Cow;
use std::path::Path;

use image::RgbaImage;
use tracing::info;

use crate::core::params::ExportParams;
use crate::core::processing::resize::limit_long_side;
use crate::error::Result;
use crate::io::writers::jpeg::write_rgba_as_jpeg;
use crate::io::writers::png::write_png;
use crate::io::writers::tiff::write_tiff_rgba;
use crate::types::{Color, OutputFormat};

/// Encode `image` to `output` in `export.format`, downscaling first when
/// `export.max_side` is set. JPEG alpha is flattened over `export.background`,
/// falling back to `background`. Returns the written dimensions.
pub fn save_image(
    image: &RgbaImage,
    output: &Path,
    export: &ExportParams,
    background: Color,
) -> Result<(u32, u32)> {
    export.validate()?;
    let background = export.background.unwrap_or(background);

    let image: Cow<'_, RgbaImage> = match export.max_side {
        Some(max_side) => Cow::Owned(limit_long_side(image, max_side)?),
        None => Cow::Borrowed(image),
    };
    let (width, height) = image.dimensions();

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match export.format {
        OutputFormat::Png => write_png(output, &image)?,
        OutputFormat::Jpeg => write_rgba_as_jpeg(output, &image, background, export.jpeg_quality)?,
        OutputFormat::Tiff => write_tiff_rgba(output, width, height, image.as_raw())?,
    }

    info!(
        "save_image: {} {}x{} written to {:?}",
        export.format, width, height, output
    );
    Ok((width, height))
}
