use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::processing::grid::GridLayout;
use crate::error::Result;
use crate::types::{Color, FitMode, OutputFormat, PixelRect};

/// Description of a written image, stored next to it as `<name>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub tool: String,
    pub version: String,
    /// RFC 3339 local timestamp
    pub created: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collage: Option<CollageMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollageMetadata {
    pub rows: u32,
    pub cols: u32,
    pub padding: u32,
    pub background: Color,
    pub fit: FitMode,
    pub cells: Vec<CellMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellMetadata {
    pub index: usize,
    pub rect: PixelRect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Manifest written alongside an exported frame sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceManifest {
    pub tool: String,
    pub version: String,
    pub created: String,
    pub source_fps: f64,
    pub fps: f64,
    pub trim_start: f64,
    pub trim_end: f64,
    pub source_frames: Vec<usize>,
    pub files: Vec<String>,
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Local::now().to_rfc3339()
}

impl ExportMetadata {
    pub fn new(format: OutputFormat, width: u32, height: u32) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created: now_rfc3339(),
            format,
            width,
            height,
            source: None,
            collage: None,
        }
    }
}

impl CollageMetadata {
    pub fn from_layout(
        layout: &GridLayout,
        rects: &[PixelRect],
        background: Color,
        fit: FitMode,
        sources: &[Option<String>],
    ) -> Self {
        let cells = rects
            .iter()
            .enumerate()
            .map(|(index, rect)| CellMetadata {
                index,
                rect: *rect,
                source: sources.get(index).cloned().flatten(),
            })
            .collect();
        Self {
            rows: layout.rows,
            cols: layout.cols,
            padding: layout.padding,
            background,
            fit,
            cells,
        }
    }
}

pub fn sidecar_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("json")
}

/// Create a sidecar metadata file next to `output_path`
pub fn create_metadata_sidecar(output_path: &Path, meta: &ExportMetadata) -> Result<PathBuf> {
    let sidecar = sidecar_path(output_path);
    let json_string = serde_json::to_string_pretty(meta)?;
    std::fs::write(&sidecar, json_string)?;
    info!("Created metadata sidecar: {:?}", sidecar);
    Ok(sidecar)
}

pub fn write_sequence_manifest(path: &Path, manifest: &SequenceManifest) -> Result<()> {
    let json_string = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, json_string)?;
    info!("Created sequence manifest: {:?}", path);
    Ok(())
}
