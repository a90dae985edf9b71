//! Atlasmesh - Library for converting polygon sprite atlas exports to meshes
//!
//! This library provides functionality to:
//! - Scan a sprite packer's polygon export into per-shape frame records
//! - Build pivot-centered, UV-mapped triangle meshes from those records
//! - Serialize meshes as Wavefront OBJ text

pub mod array_literal;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod geometry;
pub mod models;
pub mod output;
pub mod record;
pub mod scanner;

pub use convert::{AtlasConversion, ConvertedMesh, Converter};
pub use error::AtlasError;
pub use geometry::{build_mesh, GeometryOptions, Mesh};
pub use scanner::{parse_shapes, scan_atlas, ScanOptions};
