use image::{RgbaImage, imageops};

use crate::types::FlipAxis;

/// Mirror image along `axis`.
pub fn flip(image: &RgbaImage, axis: FlipAxis) -> RgbaImage {
    match axis {
        FlipAxis::Horizontal => imageops::flip_horizontal(image),
        FlipAxis::Vertical => imageops::flip_vertical(image),
    }
}

pub fn flip_in_place(image: &mut RgbaImage, axis: FlipAxis) {
    match axis {
        FlipAxis::Horizontal => imageops::flip_horizontal_in_place(image),
        FlipAxis::Vertical => imageops::flip_vertical_in_place(image),
    }
}
