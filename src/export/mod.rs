//! Export formats for built meshes.
//!
//! # Supported Formats
//!
//! - **OBJ**: Wavefront OBJ text geometry (positions, normals, UVs, faces)
//!
//! # Example
//!
//! ```ignore
//! use atlasmesh::export::{Exporter, ObjExporter};
//!
//! let exporter = ObjExporter::new();
//! exporter.export(&mesh, Path::new("meshes/hero.obj"))?;
//! ```

pub mod obj;

pub use obj::*;

use crate::geometry::Mesh;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Common error type for export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error during file writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Trait for export format implementations.
pub trait Exporter {
    /// Render a mesh in this format.
    fn export_to_string(&self, mesh: &Mesh) -> String;

    /// Get the format name for this exporter.
    fn format_name(&self) -> &'static str;

    /// Get the default file extension for this format.
    fn extension(&self) -> &'static str;

    /// Export a mesh to the specified path, creating parent directories.
    fn export(&self, mesh: &Mesh, output_path: &Path) -> Result<()> {
        let content = self.export_to_string(mesh);

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(output_path)?;
        file.write_all(content.as_bytes())?;

        Ok(())
    }
}
