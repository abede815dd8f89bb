use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use mixgrid::core::processing::crop::CropBox;
use mixgrid::{CanvasSize, Color, FitMode, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "mixgrid", version, about = "MIXGRID collage CLI")]
pub struct CliArgs {
    /// Enable debug logging (otherwise RUST_LOG is honored)
    #[arg(long, global = true, default_value_t = false)]
    pub log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Composite images into one grid collage
    Compose(ComposeArgs),
    /// Auto-crop, crop, flip and/or letterbox one image or a directory of images
    Edit(EditArgs),
    /// Trim a directory of animation frames and export them as a numbered sequence
    Frames(FramesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Output format; defaults to the output file extension, else png
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = 92)]
    pub quality: u8,

    /// Downscale so the long side is at most this many pixels
    #[arg(long)]
    pub max_side: Option<u32>,

    /// Write a JSON sidecar describing the export
    #[arg(long, default_value_t = false)]
    pub sidecar: bool,
}

#[derive(Parser, Debug)]
pub struct ComposeArgs {
    /// Collage project JSON
    #[arg(short, long, conflicts_with = "images")]
    pub project: Option<PathBuf>,

    /// Images in row-major order (ad-hoc mode); repeat the flag per image
    #[arg(short, long = "image")]
    pub images: Vec<PathBuf>,

    /// Grid rows (ad-hoc mode); derived from the image count when omitted
    #[arg(long, conflicts_with = "project")]
    pub rows: Option<u32>,

    /// Grid columns (ad-hoc mode); derived from the image count when omitted
    #[arg(long, conflicts_with = "project")]
    pub cols: Option<u32>,

    /// Canvas size: WxH or square, portrait, story, landscape
    #[arg(long)]
    pub canvas: Option<CanvasSize>,

    /// Padding in pixels around and between cells
    #[arg(long)]
    pub padding: Option<u32>,

    /// Background color (#rgb, #rrggbb, #rrggbbaa, white, black, transparent)
    #[arg(long)]
    pub background: Option<Color>,

    /// How images fill their cells
    #[arg(long, value_enum)]
    pub fit: Option<FitMode>,

    /// Output filename; defaults to masterpiece-<timestamp>.<ext>
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Parser, Debug)]
pub struct EditArgs {
    /// Input image (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory of images (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output filename (single file mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory (batch mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Trim the uniform background around the subject
    #[arg(long, default_value_t = false)]
    pub autocrop: bool,

    /// Auto-crop key color; sampled from the corners when omitted
    #[arg(long)]
    pub key: Option<Color>,

    /// Max RGB distance from the key still treated as background
    #[arg(long, default_value_t = 32.0)]
    pub tolerance: f32,

    /// Pixels kept around the detected subject
    #[arg(long, default_value_t = 0)]
    pub margin: u32,

    /// Make the background transparent (chroma key)
    #[arg(long, default_value_t = false)]
    pub remove_background: bool,

    /// Soft edge width beyond the tolerance when removing the background
    #[arg(long, default_value_t = 0.0)]
    pub feather: f32,

    /// Manual crop box x,y,width,height (applied after auto-crop)
    #[arg(long)]
    pub crop: Option<CropBox>,

    /// Mirror horizontally
    #[arg(long, default_value_t = false)]
    pub flip_h: bool,

    /// Mirror vertically
    #[arg(long, default_value_t = false)]
    pub flip_v: bool,

    /// Letterbox the result onto a canvas of this size
    #[arg(long)]
    pub fit_canvas: Option<CanvasSize>,

    /// Fit mode used with --fit-canvas
    #[arg(long, value_enum, default_value_t = FitMode::Contain)]
    pub fit: FitMode,

    /// Canvas color for --fit-canvas and JPEG alpha flattening
    #[arg(long, default_value = "white")]
    pub background: Color,

    /// Batch mode: keep going when an image fails
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Parser, Debug)]
pub struct FramesArgs {
    /// Directory of frames, ordered by file name
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Frame rate of the source frames
    #[arg(long)]
    pub fps: f64,

    /// Output directory
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Trim start in seconds
    #[arg(long, default_value_t = 0.0)]
    pub start: f64,

    /// Trim end in seconds; defaults to the end of the sequence
    #[arg(long)]
    pub end: Option<f64>,

    /// Export at a lower frame rate
    #[arg(long)]
    pub export_fps: Option<f64>,

    /// File name prefix of the exported frames
    #[arg(long, default_value = "frame")]
    pub prefix: String,

    #[command(flatten)]
    pub export: ExportArgs,
}
