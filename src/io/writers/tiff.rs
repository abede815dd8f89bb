use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::{TiffEncoder, colortype};

use crate::error::Result;

pub fn write_tiff_rgba(output: &Path, cols: u32, rows: u32, data: &[u8]) -> Result<()> {
    let file = File::create(output)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    encoder.write_image::<colortype::RGBA8>(cols, rows, data)?;
    Ok(())
}
