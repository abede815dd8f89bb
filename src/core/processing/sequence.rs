//! Trimming and resampling of an animation held as still frames.
use std::ops::Range;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::OutputFormat;

#[derive(Debug, Clone)]
pub struct FrameSequence {
    pub frames: Vec<RgbaImage>,
    pub fps: f64,
}

impl FrameSequence {
    pub fn new(frames: Vec<RgbaImage>, fps: f64) -> Result<Self> {
        check_fps(fps, "fps")?;
        Ok(Self { frames, fps })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.frames.len() as f64 / self.fps
    }
}

/// Trim window in seconds; `end = None` runs to the last frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start: f64,
    pub end: Option<f64>,
}

impl TrimRange {
    pub fn new(start: f64, end: Option<f64>) -> Self {
        Self { start, end }
    }
}

fn check_fps(fps: f64, arg: &'static str) -> Result<()> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(Error::InvalidArgument {
            arg,
            value: fps.to_string(),
        });
    }
    Ok(())
}

/// Frame indices covered by `trim`.
pub fn trim_indices(total_frames: usize, fps: f64, trim: TrimRange) -> Result<Range<usize>> {
    check_fps(fps, "fps")?;
    if total_frames == 0 {
        return Err(Error::EmptySequence);
    }
    let duration = total_frames as f64 / fps;
    let end = trim.end.unwrap_or(duration);
    let invalid = Error::InvalidTrim {
        start: trim.start,
        end,
        duration,
    };
    if !trim.start.is_finite() || !end.is_finite() || trim.start < 0.0 || end <= trim.start {
        return Err(invalid);
    }

    let start_idx = (trim.start * fps).floor() as usize;
    let end_idx = ((end * fps).ceil() as usize).min(total_frames);
    if start_idx >= end_idx {
        return Err(invalid);
    }

    debug!(
        "trim {:.3}s..{:.3}s at {} fps -> frames {}..{}",
        trim.start, end, fps, start_idx, end_idx
    );
    Ok(start_idx..end_idx)
}

/// Source frame indices to export at `dst_fps`. Lowering the rate picks the
/// nearest source frame for each output tick; raising it keeps every frame.
pub fn resample_indices(range: Range<usize>, src_fps: f64, dst_fps: f64) -> Result<Vec<usize>> {
    check_fps(src_fps, "fps")?;
    check_fps(dst_fps, "export_fps")?;
    if dst_fps >= src_fps {
        return Ok(range.collect());
    }

    let step = src_fps / dst_fps;
    let span = range.end - range.start;
    let mut picked = Vec::new();
    let mut k = 0usize;
    loop {
        let offset = (k as f64 * step).round() as usize;
        if offset >= span {
            break;
        }
        picked.push(range.start + offset);
        k += 1;
    }
    Ok(picked)
}

/// `prefix_0001.png`-style name; `index` is 0-based, the written number 1-based.
pub fn frame_file_name(prefix: &str, index: usize, total: usize, format: OutputFormat) -> String {
    let width = total.to_string().len().max(4);
    format!(
        "{}_{:0width$}.{}",
        prefix,
        index + 1,
        format.extension(),
        width = width
    )
}
