use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::processing::grid::GridLayout;
use crate::core::processing::pipeline::CellEdits;
use crate::error::{Error, Result};
use crate::types::{CanvasSize, Color, FitMode, OutputFormat};

/// Canvas settings of a collage, suitable for config files and presets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub size: CanvasSize,
    /// Gap in pixels around and between cells
    pub padding: u32,
    pub background: Color,
    pub fit: FitMode,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            size: CanvasSize::SQUARE,
            padding: 0,
            background: Color::WHITE,
            fit: FitMode::Contain,
        }
    }
}

impl CanvasSettings {
    pub fn layout(&self, rows: u32, cols: u32) -> GridLayout {
        GridLayout::new(rows, cols, self.size.width, self.size.height, self.padding)
    }
}

/// One image slot of a collage project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    /// Image path; relative paths resolve against the project file's directory
    pub path: PathBuf,
    #[serde(default)]
    pub edits: CellEdits,
    /// Overrides the canvas-wide fit mode for this cell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<FitMode>,
}

impl CellSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            edits: CellEdits::default(),
            fit: None,
        }
    }

    pub fn resolved_path(&self, base_dir: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            base_dir.join(&self.path)
        }
    }
}

/// A saved collage: canvas settings plus a row-major list of cells.
/// `null` entries are empty slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollageProject {
    #[serde(default)]
    pub canvas: CanvasSettings,
    pub rows: u32,
    pub cols: u32,
    #[serde(default)]
    pub cells: Vec<Option<CellSpec>>,
}

impl CollageProject {
    pub fn new(rows: u32, cols: u32, canvas: CanvasSettings) -> Self {
        Self {
            canvas,
            rows,
            cols,
            cells: Vec::new(),
        }
    }

    /// Smallest near-square grid holding `count` images (columns >= rows).
    pub fn auto_grid(count: usize) -> (u32, u32) {
        let count = count.max(1);
        let cols = (count as f64).sqrt().ceil() as usize;
        let rows = count.div_ceil(cols);
        (rows as u32, cols as u32)
    }

    pub fn layout(&self) -> GridLayout {
        self.canvas.layout(self.rows, self.cols)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(Error::ZeroSize { what: "rows" });
        }
        if self.cols == 0 {
            return Err(Error::ZeroSize { what: "cols" });
        }
        let slots = self.rows as usize * self.cols as usize;
        if self.cells.len() > slots {
            return Err(Error::InvalidLayout(format!(
                "{} cells for a {}x{} grid",
                self.cells.len(),
                self.rows,
                self.cols
            )));
        }
        Ok(())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let project: CollageProject = serde_json::from_str(&text)?;
        project.validate()?;
        info!(
            "Loaded project {:?}: {}x{} grid, {} cells",
            path,
            project.rows,
            project.cols,
            project.cells.iter().flatten().count()
        );
        Ok(project)
    }

    pub fn to_path(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Output encoding options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportParams {
    pub format: OutputFormat,
    /// JPEG quality, 1..=100
    pub jpeg_quality: u8,
    /// Downscale so the long side is at most this many pixels
    pub max_side: Option<u32>,
    /// Color JPEG alpha is flattened over; `None` uses the canvas
    /// background of the export (white for plain edits and frames)
    pub background: Option<Color>,
    /// Write a `<output>.json` sidecar describing the export
    pub sidecar: bool,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            jpeg_quality: 92,
            max_side: None,
            background: None,
            sidecar: false,
        }
    }
}

impl ExportParams {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::InvalidArgument {
                arg: "jpeg_quality",
                value: self.jpeg_quality.to_string(),
            });
        }
        if self.max_side == Some(0) {
            return Err(Error::ZeroSize { what: "max side" });
        }
        Ok(())
    }
}
