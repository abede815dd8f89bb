use std::path::Path;
use std::process::Command;

use image::{Rgba, RgbaImage};

fn mixgrid() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mixgrid"))
}

fn write_tile(path: &Path, color: Rgba<u8>) {
    RgbaImage::from_pixel(16, 16, color).save(path).unwrap();
}

#[test]
fn compose_writes_collage_of_requested_size() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    let c = dir.path().join("c.png");
    write_tile(&a, Rgba([255, 0, 0, 255]));
    write_tile(&b, Rgba([0, 255, 0, 255]));
    write_tile(&c, Rgba([0, 0, 255, 255]));
    let out = dir.path().join("collage.png");

    let status = mixgrid()
        .arg("compose")
        .args(["--image"])
        .arg(&a)
        .args(["--image"])
        .arg(&b)
        .args(["--image"])
        .arg(&c)
        .args(["--canvas", "120x80", "--padding", "4", "--background", "#101010"])
        .arg("--output")
        .arg(&out)
        .arg("--sidecar")
        .status()
        .unwrap();
    assert!(status.success());

    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (120, 80));
    assert_eq!(img.get_pixel(1, 1), &Rgba([16, 16, 16, 255]));
    assert!(out.with_extension("json").is_file());
}

#[test]
fn compose_rejects_grid_smaller_than_image_count() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    write_tile(&a, Rgba([255, 0, 0, 255]));

    let status = mixgrid()
        .arg("compose")
        .arg("--image")
        .arg(&a)
        .arg("--image")
        .arg(&a)
        .args(["--rows", "1", "--cols", "1"])
        .arg("--output")
        .arg(dir.path().join("x.png"))
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn edit_flips_and_letterboxes() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    let mut img = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
    img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
    img.save(&input).unwrap();
    let output = dir.path().join("out.tif");

    let status = mixgrid()
        .arg("edit")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .args(["--flip-h", "--fit-canvas", "20x10", "--background", "#f00"])
        .status()
        .unwrap();
    assert!(status.success());

    let out = image::open(&output).unwrap().to_rgba8();
    assert_eq!(out.dimensions(), (20, 10));
    assert_eq!(out.get_pixel(0, 5), &Rgba([255, 0, 0, 255]));
    assert!(out.get_pixel(10, 5)[0] < 8);
    // Top-left marker moved to the right edge of the fitted image.
    assert!(out.get_pixel(14, 0)[0] > 200);
}

#[test]
fn edit_without_input_fails() {
    let status = mixgrid()
        .args(["edit", "--flip-v"])
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn frames_exports_trimmed_sequence() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for i in 0..10u8 {
        RgbaImage::from_pixel(4, 4, Rgba([i * 20, 0, 0, 255]))
            .save(src.path().join(format!("in_{:02}.png", i)))
            .unwrap();
    }

    let status = mixgrid()
        .arg("frames")
        .arg("--input-dir")
        .arg(src.path())
        .arg("--output-dir")
        .arg(out.path())
        .args(["--fps", "10", "--start", "0.2", "--end", "0.5", "--prefix", "shot"])
        .status()
        .unwrap();
    assert!(status.success());

    let mut names: Vec<String> = std::fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["shot_0001.png", "shot_0002.png", "shot_0003.png"]);
    let first = image::open(out.path().join("shot_0001.png")).unwrap().to_rgba8();
    assert_eq!(first.get_pixel(0, 0)[0], 40);
}

#[test]
fn edit_flattens_jpeg_over_background_flag() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clear.png");
    RgbaImage::from_pixel(12, 12, Rgba([255, 255, 255, 0]))
        .save(&input)
        .unwrap();
    let output = dir.path().join("out.jpg");

    let status = mixgrid()
        .arg("edit")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .args(["--flip-h", "--background", "#000000"])
        .status()
        .unwrap();
    assert!(status.success());

    let px = *image::open(&output).unwrap().to_rgba8().get_pixel(6, 6);
    assert!(px[0] < 10 && px[1] < 10 && px[2] < 10, "{:?}", px);
}

#[test]
fn compose_project_rejects_grid_flags() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("collage.json");
    std::fs::write(&project, r#"{ "rows": 1, "cols": 1, "cells": [] }"#).unwrap();

    let status = mixgrid()
        .arg("compose")
        .arg("--project")
        .arg(&project)
        .args(["--rows", "2"])
        .arg("--output")
        .arg(dir.path().join("x.png"))
        .status()
        .unwrap();
    assert!(!status.success());
    assert!(!dir.path().join("x.png").exists());
}
