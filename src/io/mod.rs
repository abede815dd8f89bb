//! I/O layer: decoding source images and writing PNG/JPEG/TIFF outputs,
//! plus JSON sidecars describing an export.
pub mod load;
pub use load::{is_supported, list_images, load_image, load_image_from_bytes};

pub mod writers;
