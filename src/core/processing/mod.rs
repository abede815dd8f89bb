//! Pixel-level processing primitives: fit geometry and resizing, padding and
//! letterboxing, color-distance auto-crop, crop-box geometry, flips, grid
//! compositing, the per-cell edit pipeline, frame-sequence trimming and saving.
pub mod autocrop;
pub mod crop;
pub mod flip;
pub mod grid;
pub mod letterbox;
pub mod padding;
pub mod pipeline;
pub mod resize;
pub mod save;
pub mod sequence;
