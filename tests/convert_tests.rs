//! Integration tests for the conversion pipeline
//!
//! These tests run the library against fixture exports and check the
//! produced meshes and errors.

use atlasmesh::convert::ConvertError;
use atlasmesh::geometry::{build_mesh, GeometryOptions, DEFAULT_PIXELS_PER_UNIT};
use atlasmesh::models::AtlasSize;
use atlasmesh::output::{prune_stale, write_meshes};
use atlasmesh::scanner::{parse_shapes, scan_atlas, ScanOptions};
use atlasmesh::{AtlasError, Converter};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(path)
}

fn fixture_lines(path: &str) -> Vec<String> {
    fs::read_to_string(fixture(path))
        .expect("fixture should be readable")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Get all .json files in a directory
fn get_json_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .expect("fixture directory should exist")
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |e| e == "json"))
        .collect();
    files.sort();
    files
}

#[test]
fn test_parse_shapes_returns_every_shape_in_order() {
    let lines = fixture_lines("valid/characters.json");
    let shapes = parse_shapes(&lines, &ScanOptions::default()).unwrap();

    let names: Vec<&str> = shapes.iter().map(|s| s.frame.name.as_str()).collect();
    assert_eq!(names, vec!["hero", "enemy", "coin"]);
    assert!(shapes.iter().all(|s| !s.frame.name.is_empty()));
}

#[test]
fn test_scan_atlas_reads_size() {
    let atlas =
        scan_atlas(&fixture_lines("valid/characters.json"), &ScanOptions::default()).unwrap();
    assert_eq!(atlas.size, AtlasSize { w: 128, h: 64 });
}

#[test]
fn test_reference_triangle_positions() {
    let atlas = scan_atlas(&fixture_lines("valid/triangle.json"), &ScanOptions::default()).unwrap();
    let shape = &atlas.shapes[0];
    let mesh = build_mesh(&shape.frame, &shape.arrays, atlas.size, &GeometryOptions::default())
        .unwrap();

    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.triangle_count(), 1);

    let expected_x = (-0.0 - 0.5 * 100.0) / DEFAULT_PIXELS_PER_UNIT;
    let expected_y = -(-0.0 - 0.5 * 100.0) / DEFAULT_PIXELS_PER_UNIT;
    assert!((mesh.vertices[0].x - expected_x).abs() < 1e-5);
    assert!((mesh.vertices[0].y - expected_y).abs() < 1e-5);
    assert_eq!(mesh.vertices[0].z, 0.0);

    // raw (0,0) -> (0,1), raw (w,h) -> (1,0)
    assert_eq!((mesh.uv[0].x, mesh.uv[0].y), (0.0, 1.0));
    assert_eq!((mesh.uv[1].x, mesh.uv[1].y), (1.0, 0.0));
}

#[test]
fn test_reference_triangle_face_line() {
    let converter = Converter::new();
    let conversion = converter.convert_file(&fixture("valid/triangle.json")).unwrap();
    let text = &conversion.meshes[0].text;

    let faces: Vec<&str> = text.lines().filter(|l| l.starts_with("f ")).collect();
    assert_eq!(faces, vec!["f 2/2/2 1/1/1 3/3/3"]);
}

#[test]
fn test_obj_layout() {
    let conversion = Converter::new().convert_file(&fixture("valid/characters.json")).unwrap();
    let hero = &conversion.meshes[0];
    let lines: Vec<&str> = hero.text.lines().collect();

    assert_eq!(lines[0], "g hero");
    assert_eq!(lines.iter().filter(|l| l.starts_with("v ")).count(), 4);
    assert_eq!(lines.iter().filter(|l| l.starts_with("vn ")).count(), 4);
    assert_eq!(lines.iter().filter(|l| l.starts_with("vt ")).count(), 4);
    assert_eq!(lines.iter().filter(|l| l.starts_with("f ")).count(), 2);
    assert_eq!(lines.iter().filter(|l| l.is_empty()).count(), 3);
    assert!(lines.iter().filter(|l| l.starts_with("vn ")).all(|l| *l == "vn 0 0 -1"));
    assert!(!hero.text.contains("usemtl"));
    assert!(!hero.text.contains("\ns "));
}

#[test]
fn test_mirrored_x_on_output() {
    let conversion = Converter::new()
        .with_geometry(GeometryOptions { pixels_per_unit: 100.0 })
        .convert_file(&fixture("valid/triangle.json"))
        .unwrap();
    let text = &conversion.meshes[0].text;

    // raw (100,0) maps to (0.5, 0.5) and is written with x mirrored
    let vertices: Vec<&str> = text.lines().filter(|l| l.starts_with("v ")).collect();
    assert_eq!(vertices, vec!["v 0.5 0.5 0", "v -0.5 0.5 0", "v 0.5 -0.5 0"]);
}

#[test]
fn test_conversion_is_deterministic() {
    let converter = Converter::new();
    let first = converter.convert_file(&fixture("valid/characters.json")).unwrap();
    let second = converter.convert_file(&fixture("valid/characters.json")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_size_is_reported() {
    let err =
        Converter::new().convert_file(&fixture("invalid/missing_size.json")).unwrap_err();
    assert!(matches!(err, ConvertError::Atlas { source: AtlasError::MissingMetadata, .. }));
}

#[test]
fn test_malformed_array_is_reported() {
    let err =
        Converter::new().convert_file(&fixture("invalid/malformed_array.json")).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Atlas { source: AtlasError::MalformedArray { field: "vertices", .. }, .. }
    ));
}

#[test]
fn test_structural_decode_error_is_reported() {
    let err =
        Converter::new().convert_file(&fixture("invalid/structural_decode.json")).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Atlas { source: AtlasError::StructuralDecode { .. }, .. }
    ));
}

#[test]
fn test_index_out_of_range_is_reported() {
    let err =
        Converter::new().convert_file(&fixture("invalid/index_out_of_range.json")).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Atlas {
            source: AtlasError::IndexOutOfRange { index: 3, vertex_count: 3, .. },
            ..
        }
    ));
}

#[test]
fn test_all_valid_fixtures_convert() {
    let files = get_json_files(&fixture("valid"));
    assert!(!files.is_empty(), "No valid fixtures found");

    let results = Converter::new().convert_files(&files, 2).unwrap();
    for (file, result) in files.iter().zip(results) {
        let conversion = result.unwrap_or_else(|e| panic!("{:?} should convert: {}", file, e));
        assert!(!conversion.meshes.is_empty());
    }
}

#[test]
fn test_all_invalid_fixtures_fail() {
    let files = get_json_files(&fixture("invalid"));
    assert!(!files.is_empty(), "No invalid fixtures found");

    let results = Converter::new().convert_files(&files, 2).unwrap();
    for (file, result) in files.iter().zip(results) {
        assert!(result.is_err(), "{:?} should fail to convert", file);
    }
}

#[test]
fn test_labels_may_not_leave_output_dir() {
    let text = fs::read_to_string(fixture("valid/triangle.json")).unwrap();

    for label in ["\"../escaped.png\":", "\"/tmp/escaped.png\":"] {
        let export = text.replace("\"tri.png\":", label);
        let err = Converter::new().convert_str(&export).unwrap_err();
        assert!(
            matches!(err, AtlasError::UnsafeShapeName { line: 3, .. }),
            "{}: {:?}",
            label,
            err
        );
    }
}

#[test]
fn test_write_and_prune_round() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path();
    fs::write(out.join("retired.obj"), "g retired\n").unwrap();

    let conversion = Converter::new().convert_file(&fixture("valid/characters.json")).unwrap();
    let written = write_meshes(out, &conversion.meshes, "obj").unwrap();
    assert_eq!(written.len(), 3);

    let keep: HashSet<PathBuf> = written.into_iter().collect();
    let removed = prune_stale(out, &keep, "obj").unwrap();
    assert_eq!(removed, vec![out.join("retired.obj")]);

    for name in ["hero", "enemy", "coin"] {
        let text = fs::read_to_string(out.join(format!("{}.obj", name))).unwrap();
        assert!(text.starts_with(&format!("g {}\n", name)));
    }
}
