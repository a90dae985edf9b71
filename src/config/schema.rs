//! Configuration schema types for `atlasmesh.toml`
//!
//! Defines the structure and validation rules for conversion settings.

use crate::geometry::{GeometryOptions, DEFAULT_PIXELS_PER_UNIT};
use crate::scanner::ScanOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mesh geometry section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Pixels per world unit (2048 px = 21 units by default)
    #[serde(default = "default_pixels_per_unit")]
    pub pixels_per_unit: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self { pixels_per_unit: default_pixels_per_unit() }
    }
}

fn default_pixels_per_unit() -> f32 {
    DEFAULT_PIXELS_PER_UNIT
}

/// Mesh file output section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory mesh files are written to
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,
    /// Extension of written mesh files (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Delete mesh files no current shape produced
    #[serde(default)]
    pub prune: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_out_dir(), extension: default_extension(), prune: false }
    }
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("meshes")
}

fn default_extension() -> String {
    "obj".to_string()
}

/// Export scanning section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Image extensions stripped from shape labels
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { image_extensions: default_image_extensions() }
    }
}

fn default_image_extensions() -> Vec<String> {
    ScanOptions::default().image_extensions
}

/// Complete `atlasmesh.toml` configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshConfig {
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "geometry.pixels_per_unit")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "atlasmesh.toml: '{}' {}", self.field, self.message)
    }
}

impl MeshConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        let ppu = self.geometry.pixels_per_unit;
        if !ppu.is_finite() || ppu <= 0.0 {
            errors.push(ConfigValidationError {
                field: "geometry.pixels_per_unit".to_string(),
                message: "must be a positive number".to_string(),
            });
        }

        if self.output.extension.is_empty() || self.output.extension.contains('.') {
            errors.push(ConfigValidationError {
                field: "output.extension".to_string(),
                message: "must be a non-empty extension without a dot".to_string(),
            });
        }

        if self.scan.image_extensions.iter().any(|ext| ext.is_empty()) {
            errors.push(ConfigValidationError {
                field: "scan.image_extensions".to_string(),
                message: "must not contain empty entries".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Geometry options for the mesh builder
    pub fn geometry_options(&self) -> GeometryOptions {
        GeometryOptions { pixels_per_unit: self.geometry.pixels_per_unit }
    }

    /// Scanner options for label cleaning
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            image_extensions: self
                .scan
                .image_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}
