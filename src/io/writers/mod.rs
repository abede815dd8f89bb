//! Format-specific writers. All take straight RGBA8 pixels.
pub mod jpeg;
pub mod metadata;
pub mod png;
pub mod tiff;
