//! Grid layout math and compositing of the final collage ("masterpiece").
//!
//! Padding is applied around the outer edge and between neighbouring cells.
//! Leftover pixels from integer division are spread over the cells, so cells
//! and gaps always tile the canvas exactly.
use std::borrow::Cow;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::processing::letterbox::letterbox_into;
use crate::error::{Error, Result};
use crate::types::{Color, FitMode, PixelRect};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub padding: u32,
}

/// One filled grid slot; `fit` overrides the collage-wide fit mode.
#[derive(Debug, Clone)]
pub struct GridCell<'a> {
    pub image: Cow<'a, RgbaImage>,
    pub fit: Option<FitMode>,
}

impl GridCell<'_> {
    pub fn with_fit(mut self, fit: Option<FitMode>) -> Self {
        self.fit = fit;
        self
    }
}

impl From<RgbaImage> for GridCell<'static> {
    fn from(image: RgbaImage) -> Self {
        Self {
            image: Cow::Owned(image),
            fit: None,
        }
    }
}

impl<'a> From<&'a RgbaImage> for GridCell<'a> {
    fn from(image: &'a RgbaImage) -> Self {
        Self {
            image: Cow::Borrowed(image),
            fit: None,
        }
    }
}

fn axis_spans(extent: u32, count: u32, padding: u32, axis: &str) -> Result<Vec<(u32, u32)>> {
    let gaps = padding as u64 * (count as u64 + 1);
    let avail = (extent as u64).saturating_sub(gaps);
    if avail < count as u64 {
        return Err(Error::InvalidLayout(format!(
            "{} cells with {}px padding do not fit in {}px {}",
            count, padding, extent, axis
        )));
    }

    Ok((0..count as u64)
        .map(|i| {
            let start = padding as u64 * (i + 1) + i * avail / count as u64;
            let end = padding as u64 * (i + 1) + (i + 1) * avail / count as u64;
            (start as u32, (end - start) as u32)
        })
        .collect())
}

impl GridLayout {
    pub fn new(rows: u32, cols: u32, canvas_width: u32, canvas_height: u32, padding: u32) -> Self {
        Self {
            rows,
            cols,
            canvas_width,
            canvas_height,
            padding,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Cell rectangles in row-major order.
    pub fn cell_rects(&self) -> Result<Vec<PixelRect>> {
        if self.rows == 0 {
            return Err(Error::ZeroSize { what: "rows" });
        }
        if self.cols == 0 {
            return Err(Error::ZeroSize { what: "cols" });
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(Error::ZeroSize { what: "canvas" });
        }

        let xs = axis_spans(self.canvas_width, self.cols, self.padding, "width")?;
        let ys = axis_spans(self.canvas_height, self.rows, self.padding, "height")?;

        Ok(ys
            .iter()
            .flat_map(|&(y, h)| xs.iter().map(move |&(x, w)| PixelRect::new(x, y, w, h)))
            .collect())
    }
}

/// Composite `cells` (row-major) onto a background-filled canvas. Missing
/// cells stay background.
pub fn compose_grid(
    layout: &GridLayout,
    cells: &[Option<RgbaImage>],
    fit: FitMode,
    background: Color,
) -> Result<RgbaImage> {
    let cells: Vec<Option<GridCell>> = cells
        .iter()
        .map(|c| c.as_ref().map(GridCell::from))
        .collect();
    compose_grid_cells(layout, &cells, fit, background)
}

pub fn compose_grid_cells(
    layout: &GridLayout,
    cells: &[Option<GridCell<'_>>],
    fit: FitMode,
    background: Color,
) -> Result<RgbaImage> {
    let rects = layout.cell_rects()?;
    if cells.len() > rects.len() {
        return Err(Error::InvalidLayout(format!(
            "{} images for a {}x{} grid",
            cells.len(),
            layout.rows,
            layout.cols
        )));
    }

    info!(
        "Composing {}x{} grid on {}x{} canvas (padding {}, background {})",
        layout.rows,
        layout.cols,
        layout.canvas_width,
        layout.canvas_height,
        layout.padding,
        background
    );

    let mut canvas =
        RgbaImage::from_pixel(layout.canvas_width, layout.canvas_height, background.to_rgba());

    for (index, (cell, rect)) in cells.iter().zip(&rects).enumerate() {
        match cell {
            Some(cell) => {
                let mode = cell.fit.unwrap_or(fit);
                letterbox_into(&mut canvas, &cell.image, *rect, mode)?;
            }
            None => debug!("cell {} is empty", index),
        }
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn cells_and_gaps_tile_canvas_exactly() {
        let layout = GridLayout::new(2, 3, 100, 50, 4);
        let rects = layout.cell_rects().unwrap();
        assert_eq!(rects.len(), 6);
        assert_eq!(rects[0], PixelRect::new(4, 4, 28, 19));
        // 100 - 4 * 4 = 84 splits evenly into three 28px columns.
        assert_eq!(rects[2].right() + 4, 100);
        assert_eq!(rects[5].bottom() + 4, 50);
        assert_eq!(rects[3].y, rects[0].bottom() + 4);
    }

    #[test]
    fn remainder_is_spread_over_cells() {
        let layout = GridLayout::new(1, 3, 10, 10, 0);
        let widths: Vec<u32> = layout
            .cell_rects()
            .unwrap()
            .iter()
            .map(|r| r.width)
            .collect();
        assert_eq!(widths, vec![3, 3, 4]);
    }

    #[test]
    fn oversized_padding_is_rejected() {
        let layout = GridLayout::new(1, 2, 10, 10, 5);
        assert!(matches!(layout.cell_rects(), Err(Error::InvalidLayout(_))));
        let layout = GridLayout::new(0, 2, 10, 10, 0);
        assert!(matches!(layout.cell_rects(), Err(Error::ZeroSize { .. })));
    }

    #[test]
    fn empty_cells_show_background() {
        let layout = GridLayout::new(1, 2, 20, 10, 0);
        let red = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let out = compose_grid(&layout, &[Some(red), None], FitMode::Contain, Color::WHITE).unwrap();
        assert_eq!(out.get_pixel(5, 5), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(15, 5), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn padding_stays_background() {
        let layout = GridLayout::new(1, 1, 12, 12, 2);
        let green = RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 255]));
        let out = compose_grid(&layout, &[Some(green)], FitMode::Stretch, Color::BLACK).unwrap();
        assert_eq!(out.get_pixel(1, 1), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(2, 2)[3], 255);
        assert!(out.get_pixel(6, 6)[1] > 250);
        assert_eq!(out.get_pixel(10, 10), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn cell_fit_overrides_canvas_fit() {
        let layout = GridLayout::new(1, 2, 20, 10, 0);
        let red = RgbaImage::from_pixel(20, 10, Rgba([255, 0, 0, 255]));
        let cells = [
            Some(GridCell::from(&red).with_fit(Some(FitMode::Cover))),
            Some(GridCell::from(&red)),
        ];
        let out = compose_grid_cells(&layout, &cells, FitMode::Contain, Color::WHITE).unwrap();
        // Cover fills the whole first cell.
        assert_eq!(out.get_pixel(5, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(5, 9), &Rgba([255, 0, 0, 255]));
        // The second cell keeps the canvas-wide Contain bands.
        assert_eq!(out.get_pixel(15, 0), &Rgba([255, 255, 255, 255]));
        let center = out.get_pixel(15, 5);
        assert!(center[0] > 250 && center[1] < 5);
    }

    #[test]
    fn too_many_cells_is_an_error() {
        let layout = GridLayout::new(1, 1, 10, 10, 0);
        let img = RgbaImage::new(2, 2);
        let cells = vec![Some(img.clone()), Some(img)];
        assert!(compose_grid(&layout, &cells, FitMode::Contain, Color::WHITE).is_err());
    }
}
