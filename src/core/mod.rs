//! Core building blocks: collage/export parameters and the image processing
//! primitives. These are consumed by the high-level `api` module.
pub mod params;
pub mod processing;
