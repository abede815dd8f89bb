//! High-level, ergonomic library API: compose collages to files or in-memory
//! buffers, edit single images or whole directories, and trim/export frame
//! sequences. Prefer these entrypoints over the low-level processing modules
//! when integrating MIXGRID.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::params::{CanvasSettings, CollageProject, ExportParams};
use crate::core::processing::grid::{GridCell, GridLayout, compose_grid_cells};
use crate::core::processing::letterbox::letterbox;
use crate::core::processing::pipeline::{CellEdits, apply_edits};
use crate::core::processing::save::save_image;
use crate::core::processing::sequence::{
    FrameSequence, TrimRange, frame_file_name, resample_indices, trim_indices,
};
use crate::error::{Error, Result};
use crate::io::load::{is_supported, list_images, load_image};
use crate::io::writers::metadata::{
    CollageMetadata, ExportMetadata, SequenceManifest, create_metadata_sidecar, now_rfc3339,
    write_sequence_manifest,
};
use crate::types::{CanvasSize, Color, FitMode, OutputFormat};

/// Letterbox target for single-image processing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitTo {
    pub size: CanvasSize,
    pub fit: FitMode,
    pub background: Color,
}

impl FitTo {
    fn apply(&self, image: &RgbaImage) -> Result<RgbaImage> {
        letterbox(
            image,
            self.size.width,
            self.size.height,
            self.fit,
            self.background,
        )
    }
}

/// Load and edit every cell of `project`. Relative paths resolve against `base_dir`.
pub fn load_project_cells(
    project: &CollageProject,
    base_dir: &Path,
) -> Result<Vec<Option<GridCell<'static>>>> {
    project.validate()?;
    project
        .cells
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let Some(spec) = spec else {
                return Ok(None);
            };
            let path = spec.resolved_path(base_dir);
            let image = load_image(&path).inspect_err(|e| {
                warn!("Cell {}: failed to load {:?}: {}", index, path, e);
            })?;
            let image = apply_edits(&image, &spec.edits)?;
            Ok(Some(GridCell::from(image).with_fit(spec.fit)))
        })
        .collect()
}

/// Compose a collage project in memory
pub fn compose_project_to_buffer(project: &CollageProject, base_dir: &Path) -> Result<RgbaImage> {
    let cells = load_project_cells(project, base_dir)?;
    compose_grid_cells(
        &project.layout(),
        &cells,
        project.canvas.fit,
        project.canvas.background,
    )
}

/// Compose a collage project and write it to `output`
pub fn compose_project_to_path(
    project: &CollageProject,
    base_dir: &Path,
    output: &Path,
    export: &ExportParams,
) -> Result<()> {
    let canvas = compose_project_to_buffer(project, base_dir)?;
    let (width, height) = save_image(&canvas, output, export, project.canvas.background)?;

    if export.sidecar {
        let layout = project.layout();
        let rects = layout.cell_rects()?;
        let sources: Vec<Option<String>> = project
            .cells
            .iter()
            .map(|c| c.as_ref().map(|c| c.path.to_string_lossy().into_owned()))
            .collect();
        let mut meta = ExportMetadata::new(export.format, width, height);
        meta.collage = Some(CollageMetadata::from_layout(
            &layout,
            &rects,
            project.canvas.background,
            project.canvas.fit,
            &sources,
        ));
        create_metadata_sidecar(output, &meta)?;
    }

    info!("Collage written: {:?} ({}x{})", output, width, height);
    Ok(())
}

/// Compose already-decoded images row-major into a `rows x cols` grid
pub fn compose_images(
    images: &[RgbaImage],
    rows: u32,
    cols: u32,
    canvas: &CanvasSettings,
) -> Result<RgbaImage> {
    let layout: GridLayout = canvas.layout(rows, cols);
    let cells: Vec<Option<GridCell>> = images
        .iter()
        .map(|img| Some(GridCell::from(img)))
        .collect();
    compose_grid_cells(&layout, &cells, canvas.fit, canvas.background)
}

/// Edit one image in memory, optionally letterboxing it onto a fixed canvas
pub fn process_image(
    image: &RgbaImage,
    edits: &CellEdits,
    fit_to: Option<&FitTo>,
) -> Result<RgbaImage> {
    let edited = apply_edits(image, edits)?;
    match fit_to {
        Some(target) => target.apply(&edited),
        None => Ok(edited),
    }
}

/// Edit the image at `input` and write the result to `output`
pub fn process_image_to_path(
    input: &Path,
    output: &Path,
    edits: &CellEdits,
    fit_to: Option<&FitTo>,
    export: &ExportParams,
) -> Result<()> {
    let image = load_image(input)?;
    let processed = process_image(&image, edits, fit_to)?;
    let background = fit_to.map(|f| f.background).unwrap_or(Color::WHITE);
    let (width, height) = save_image(&processed, output, export, background)?;

    if export.sidecar {
        let mut meta = ExportMetadata::new(export.format, width, height);
        meta.source = Some(input.to_string_lossy().into_owned());
        create_metadata_sidecar(output, &meta)?;
    }
    Ok(())
}

/// Batch processing report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Return an iterator over the regular files directly inside `input_dir`
pub fn iterate_files(input_dir: &Path) -> Result<std::vec::IntoIter<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir).map_err(Error::from)? {
        let entry = entry.map_err(Error::from)?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into_iter())
}

/// Process every image in `input_dir` into `output_dir` using the same edits.
/// Files that are not images are skipped. Outputs are named `<stem>.<ext>`; a
/// second source mapping to an already written name (`a.png` and `a.bmp`) is
/// an `OutputCollision` error. If `continue_on_error` is true, errors are
/// counted in the report and processing continues; otherwise the first error
/// is returned.
pub fn process_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    edits: &CellEdits,
    fit_to: Option<&FitTo>,
    export: &ExportParams,
    continue_on_error: bool,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir).map_err(Error::from)?;

    let mut report = BatchReport::default();
    let mut written: HashMap<PathBuf, PathBuf> = HashMap::new();

    for path in iterate_files(input_dir)? {
        if !is_supported(&path) {
            info!("Skipping non-image file: {:?}", path);
            report.skipped += 1;
            continue;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let output_path = output_dir.join(format!("{}.{}", stem, export.format.extension()));

        let result = match written.get(&output_path) {
            Some(first) => Err(Error::OutputCollision {
                output: output_path.clone(),
                source_path: path.clone(),
                first: first.clone(),
            }),
            None => {
                info!("Processing: {:?} -> {:?}", path, output_path);
                process_image_to_path(&path, &output_path, edits, fit_to, export)
            }
        };
        match result {
            Ok(()) => {
                written.insert(output_path, path);
                report.processed += 1;
            }
            Err(e) => {
                warn!("Error processing {:?}: {}", path, e);
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
            }
        }
    }

    info!(
        "Batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}

/// Load every image in `dir` (sorted by name) as one frame sequence
pub fn load_sequence(dir: &Path, fps: f64) -> Result<FrameSequence> {
    let files = list_images(dir)?;
    if files.is_empty() {
        return Err(Error::EmptySequence);
    }
    let frames = files
        .iter()
        .map(|p| load_image(p))
        .collect::<Result<Vec<_>>>()?;
    info!("Loaded {} frames from {:?} at {} fps", frames.len(), dir, fps);
    FrameSequence::new(frames, fps)
}

/// How a frame sequence is trimmed and named on export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceExport {
    pub trim: TrimRange,
    /// Lower output frame rate; `None` keeps the source rate
    pub export_fps: Option<f64>,
    pub prefix: String,
}

impl Default for SequenceExport {
    fn default() -> Self {
        Self {
            trim: TrimRange::default(),
            export_fps: None,
            prefix: "frame".to_string(),
        }
    }
}

/// Trim `sequence`, optionally lower its frame rate, and write the frames as
/// numbered files into `output_dir`. With `export.sidecar` a
/// `<prefix>.json` manifest is written too. Returns the written paths.
pub fn export_sequence(
    sequence: &FrameSequence,
    options: &SequenceExport,
    output_dir: &Path,
    export: &ExportParams,
) -> Result<Vec<PathBuf>> {
    let range = trim_indices(sequence.len(), sequence.fps, options.trim)?;
    let out_fps = options
        .export_fps
        .map(|f| f.min(sequence.fps))
        .unwrap_or(sequence.fps);
    let picked = resample_indices(
        range.clone(),
        sequence.fps,
        options.export_fps.unwrap_or(sequence.fps),
    )?;

    std::fs::create_dir_all(output_dir)?;
    info!(
        "Exporting {} of {} frames ({}..{}) to {:?}",
        picked.len(),
        sequence.len(),
        range.start,
        range.end,
        output_dir
    );

    let mut written = Vec::with_capacity(picked.len());
    for (n, &src) in picked.iter().enumerate() {
        let name = frame_file_name(&options.prefix, n, picked.len(), export.format);
        let path = output_dir.join(name);
        save_image(&sequence.frames[src], &path, export, Color::WHITE)?;
        written.push(path);
    }

    if export.sidecar {
        let manifest = SequenceManifest {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created: now_rfc3339(),
            source_fps: sequence.fps,
            fps: out_fps,
            trim_start: range.start as f64 / sequence.fps,
            trim_end: range.end as f64 / sequence.fps,
            source_frames: picked.clone(),
            files: written
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect(),
        };
        write_sequence_manifest(&output_dir.join(format!("{}.json", options.prefix)), &manifest)?;
    }

    Ok(written)
}

/// `<prefix>-YYYYMMDD-HHMMSS.<ext>` using local time
pub fn default_output_name(prefix: &str, format: OutputFormat) -> String {
    format!(
        "{}-{}.{}",
        prefix,
        chrono::Local::now().format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}
