//! CLI dispatch for the `atlasmesh inspect` command.
//!
//! Lists every shape of one export with its frame placement and the size of
//! the mesh it would produce.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::config::{CliOverrides, MeshConfig};
use crate::error::AtlasError;
use crate::geometry::{build_mesh, MeshStats};
use crate::models::{AtlasSize, Pivot, Rect};
use crate::scanner::scan_atlas;

use super::convert::resolve_config;
use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// One shape in the inspect report.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeSummary {
    pub name: String,
    pub frame: Rect,
    pub rotated: bool,
    pub trimmed: bool,
    pub pivot: Pivot,
    #[serde(flatten)]
    pub stats: MeshStats,
}

/// Summary of one export.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub source: PathBuf,
    pub size: AtlasSize,
    pub shapes: Vec<ShapeSummary>,
}

/// Scan an export and build each shape's mesh to collect its statistics.
pub(crate) fn inspect_text(
    source: &Path,
    text: &str,
    config: &MeshConfig,
) -> Result<InspectReport, AtlasError> {
    let lines: Vec<&str> = text.lines().collect();
    let atlas = scan_atlas(&lines, &config.scan_options())?;
    let geometry = config.geometry_options();

    let shapes = atlas
        .shapes
        .iter()
        .map(|shape| {
            let mesh = build_mesh(&shape.frame, &shape.arrays, atlas.size, &geometry)?;
            Ok(ShapeSummary {
                name: mesh.name.clone(),
                frame: shape.frame.frame,
                rotated: shape.frame.rotated,
                trimmed: shape.frame.trimmed,
                pivot: shape.frame.pivot,
                stats: mesh.stats(),
            })
        })
        .collect::<Result<Vec<_>, AtlasError>>()?;

    Ok(InspectReport { source: source.to_path_buf(), size: atlas.size, shapes })
}

fn print_report(report: &InspectReport) {
    println!(
        "{}: {}x{} atlas, {} shapes",
        report.source.display(),
        report.size.w,
        report.size.h,
        report.shapes.len()
    );

    let width = report.shapes.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for shape in &report.shapes {
        println!(
            "  {:<width$}  {:>4} vertices  {:>4} triangles  at {},{} {}x{}{}",
            shape.name,
            shape.stats.vertices,
            shape.stats.triangles,
            shape.frame.x,
            shape.frame.y,
            shape.frame.w,
            shape.frame.h,
            if shape.rotated { " (rotated)" } else { "" },
            width = width
        );
    }
}

/// Execute the inspect command.
pub fn run_inspect(input: &Path, json: bool, config_path: Option<&Path>) -> ExitCode {
    let config = match resolve_config(config_path, &CliOverrides::default()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let text = match fs::read_to_string(input) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let report = match inspect_text(input, &text, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        print_report(&report);
    }

    ExitCode::from(EXIT_SUCCESS)
}
