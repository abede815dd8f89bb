#![doc = r#"
MIXGRID: a collage and image-mixing toolkit.

This crate provides a typed API for filling a grid with images and compositing
it into a single "masterpiece" with a configurable canvas size, padding and
background. Each image can be auto-cropped by color distance (chroma-key style
background trimming), cropped with a crop box, flipped, and fitted into its
cell. Animations kept as still frames can be trimmed and exported as a
numbered frame sequence. It powers the MIXGRID CLI and can be embedded in your
own Rust applications.

Add dependency
--------------
```toml
[dependencies]
mixgrid = "0.1"
```

Quick start: compose a collage project to a file
------------------------------------------------
```rust,no_run
use std::path::Path;
use mixgrid::{compose_project_to_path, CollageProject, ExportParams, OutputFormat};

fn main() -> mixgrid::Result<()> {
    let project = CollageProject::from_path(Path::new("/work/collage.json"))?;
    let export = ExportParams {
        format: OutputFormat::Jpeg,
        jpeg_quality: 90,
        ..Default::default()
    };
    compose_project_to_path(&project, Path::new("/work"), Path::new("/out/masterpiece.jpg"), &export)
}
```

Compose in memory
-----------------
```rust,no_run
use mixgrid::{compose_images, CanvasSettings, CanvasSize, Color, FitMode};
use mixgrid::io::load_image;
use std::path::Path;

fn main() -> mixgrid::Result<()> {
    let images = vec![
        load_image(Path::new("a.png"))?,
        load_image(Path::new("b.png"))?,
    ];
    let canvas = CanvasSettings {
        size: CanvasSize::LANDSCAPE,
        padding: 16,
        background: Color::rgb(20, 20, 20),
        fit: FitMode::Cover,
    };
    let collage = compose_images(&images, 1, 2, &canvas)?;
    collage.save("collage.png").map_err(mixgrid::Error::from)?;
    Ok(())
}
```

Auto-crop and crop boxes
------------------------
```rust,no_run
use mixgrid::core::processing::autocrop::{auto_crop, AutoCropParams};
use mixgrid::core::processing::crop::{apply_crop, CropBox, CropConstraints};
use mixgrid::types::Handle;
use std::path::Path;

fn main() -> mixgrid::Result<()> {
    let img = mixgrid::io::load_image(Path::new("product.jpg"))?;
    let trimmed = auto_crop(&img, &AutoCropParams { tolerance: 40.0, margin: 8, ..Default::default() })?;

    let (w, h) = trimmed.image.dimensions();
    let constraints = CropConstraints::new(w, h).with_aspect(Some(1.0));
    let crop = CropBox::full(w, h).drag(Handle::SE, -50.0, -50.0, &constraints);
    let square = apply_crop(&trimmed.image, &crop)?;
    square.save("square.png").map_err(mixgrid::Error::from)?;
    Ok(())
}
```

Error handling
--------------
All public functions return `mixgrid::Result<T>`; match on `mixgrid::Error` to handle
specific cases, e.g. layout or crop errors.

Useful modules
--------------
- [`api`]: high-level, ergonomic entry points.
- [`core`]: parameters and processing primitives (fit, letterbox, auto-crop, crop, flip, grid, sequence).
- [`types`]: enums and value types (e.g. `FitMode`, `Color`, `CanvasSize`, `Handle`).
- [`io`]: image decoding and PNG/JPEG/TIFF writers with JSON sidecars.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::params::{CanvasSettings, CellSpec, CollageProject, ExportParams};
pub use error::{Error, Result};
pub use types::{CanvasSize, Color, FitMode, FlipAxis, Handle, OutputFormat, PixelRect};

// Processing
pub use crate::core::processing::autocrop::{AutoCropOutcome, AutoCropParams, BackgroundSample, auto_crop};
pub use crate::core::processing::crop::{CropBox, CropConstraints, apply_crop};
pub use crate::core::processing::grid::{GridCell, GridLayout, compose_grid};
pub use crate::core::processing::letterbox::letterbox;
pub use crate::core::processing::pipeline::{CellEdits, apply_edits};
pub use crate::core::processing::sequence::{FrameSequence, TrimRange};

// High-level API re-exports
pub use api::{
    BatchReport, FitTo, SequenceExport, compose_images, compose_project_to_buffer,
    compose_project_to_path, export_sequence, load_sequence, process_directory_to_path,
    process_image, process_image_to_path,
};
pub use crate::core::processing::save::save_image;
