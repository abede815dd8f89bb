use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::EnvFilter;

use mixgrid::api::{
    FitTo, SequenceExport, compose_project_to_path, default_output_name, export_sequence,
    load_sequence, process_directory_to_path, process_image_to_path,
};
use mixgrid::core::processing::autocrop::{AutoCropParams, BackgroundSample};
use mixgrid::core::processing::pipeline::CellEdits;
use mixgrid::core::processing::sequence::TrimRange;
use mixgrid::{CanvasSettings, CellSpec, CollageProject, ExportParams, OutputFormat};

use super::args::{CliArgs, Command, ComposeArgs, EditArgs, ExportArgs, FramesArgs};
use super::errors::AppError;

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("mixgrid=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn export_params(args: &ExportArgs, output: Option<&Path>) -> ExportParams {
    let format = args
        .format
        .or_else(|| output.and_then(OutputFormat::from_path))
        .unwrap_or(OutputFormat::Png);
    ExportParams {
        format,
        jpeg_quality: args.quality,
        max_side: args.max_side,
        background: None,
        sidecar: args.sidecar,
    }
}

fn run_compose(args: ComposeArgs) -> Result<(), AppError> {
    let (mut project, base_dir) = match &args.project {
        Some(path) => {
            let project = CollageProject::from_path(path)?;
            let base = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (project, base)
        }
        None => {
            if args.images.is_empty() {
                return Err(AppError::NoImages);
            }
            let count = args.images.len();
            let (auto_rows, auto_cols) = CollageProject::auto_grid(count);
            let (rows, cols) = match (args.rows, args.cols) {
                (Some(r), Some(c)) => (r, c),
                (Some(r), None) => (r, count.div_ceil(r.max(1) as usize) as u32),
                (None, Some(c)) => (count.div_ceil(c.max(1) as usize) as u32, c),
                (None, None) => (auto_rows, auto_cols),
            };
            if (rows as usize) * (cols as usize) < count {
                return Err(AppError::GridTooSmall { count, rows, cols });
            }
            let mut project = CollageProject::new(rows, cols, CanvasSettings::default());
            project.cells = args
                .images
                .iter()
                .map(|p| Some(CellSpec::new(p.clone())))
                .collect();
            (project, PathBuf::from("."))
        }
    };

    // Command-line flags override the project's canvas settings.
    if let Some(size) = args.canvas {
        project.canvas.size = size;
    }
    if let Some(padding) = args.padding {
        project.canvas.padding = padding;
    }
    if let Some(background) = args.background {
        project.canvas.background = background;
    }
    if let Some(fit) = args.fit {
        project.canvas.fit = fit;
    }

    let format_hint = args.export.format.unwrap_or(OutputFormat::Png);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_output_name("masterpiece", format_hint)));
    let export = export_params(&args.export, Some(&output));

    compose_project_to_path(&project, &base_dir, &output, &export)?;
    info!("Successfully composed collage -> {:?}", output);
    Ok(())
}

fn edits_from_args(args: &EditArgs) -> CellEdits {
    let autocrop = (args.autocrop || args.remove_background).then(|| AutoCropParams {
        sample: args
            .key
            .map(BackgroundSample::Color)
            .unwrap_or(BackgroundSample::Corners),
        tolerance: args.tolerance,
        margin: args.margin,
        remove_background: args.remove_background,
        feather: args.feather,
    });
    CellEdits {
        autocrop,
        crop: args.crop,
        flip_horizontal: args.flip_h,
        flip_vertical: args.flip_v,
    }
}

fn run_edit(args: EditArgs) -> Result<(), AppError> {
    let edits = edits_from_args(&args);
    let fit_to = args.fit_canvas.map(|size| FitTo {
        size,
        fit: args.fit,
        background: args.background,
    });

    let batch_mode = args.input_dir.is_some();
    if batch_mode {
        if args.input.is_some() {
            return Err(AppError::ConflictingArguments {
                first: "--input".to_string(),
                second: "--input-dir".to_string(),
            });
        }
        let input_dir = args.input_dir.clone().ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        let output_dir = args.output_dir.clone().ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;
        let export = ExportParams {
            background: Some(args.background),
            ..export_params(&args.export, None)
        };

        info!("Starting batch processing from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);

        let report = process_directory_to_path(
            &input_dir,
            &output_dir,
            &edits,
            fit_to.as_ref(),
            &export,
            args.continue_on_error,
        )?;

        info!("Batch processing complete!");
        info!("Processed: {}", report.processed);
        info!("Skipped: {}", report.skipped);
        info!("Errors: {}", report.errors);
    } else {
        let input = args.input.clone().ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        let output = args.output.clone().ok_or(AppError::MissingArgument {
            arg: "--output".to_string(),
        })?;
        let export = ExportParams {
            background: Some(args.background),
            ..export_params(&args.export, Some(&output))
        };

        process_image_to_path(&input, &output, &edits, fit_to.as_ref(), &export)?;
        info!("Successfully processed: {:?} -> {:?}", input, output);
    }
    Ok(())
}

fn run_frames(args: FramesArgs) -> Result<(), AppError> {
    let sequence = load_sequence(&args.input_dir, args.fps)?;
    let options = SequenceExport {
        trim: TrimRange::new(args.start, args.end),
        export_fps: args.export_fps,
        prefix: args.prefix.clone(),
    };
    let export = export_params(&args.export, None);
    let written = export_sequence(&sequence, &options, &args.output_dir, &export)?;
    info!(
        "Exported {} frames to {:?}",
        written.len(),
        args.output_dir
    );
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    match args.command {
        Command::Compose(a) => run_compose(a)?,
        Command::Edit(a) => run_edit(a)?,
        Command::Frames(a) => run_frames(a)?,
    }
    Ok(())
}
