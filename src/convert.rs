//! Atlas export to mesh file conversion
//!
//! Ties the scanner, geometry builder and exporter together. One export is
//! converted sequentially; several exports can be converted in parallel,
//! each owning its own scan state.

use crate::error::AtlasError;
use crate::export::{Exporter, ObjExporter};
use crate::geometry::{build_mesh, GeometryOptions, MeshStats};
use crate::models::AtlasSize;
use crate::scanner::{scan_atlas, ScanOptions};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for converting an export file.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The export could not be read
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The export content is malformed
    #[error("{}: {source}", path.display())]
    Atlas {
        path: PathBuf,
        #[source]
        source: AtlasError,
    },
    /// The worker pool could not be created
    #[error("failed to start conversion workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// One mesh rendered in the output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedMesh {
    pub name: String,
    #[serde(skip)]
    pub text: String,
    #[serde(flatten)]
    pub stats: MeshStats,
}

impl ConvertedMesh {
    /// File name for this mesh with the given extension.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.name, extension)
    }
}

/// Every mesh produced from one export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtlasConversion {
    pub source: PathBuf,
    pub size: AtlasSize,
    pub meshes: Vec<ConvertedMesh>,
}

/// Converts atlas exports to serialized meshes.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    geometry: GeometryOptions,
    scan: ScanOptions,
    exporter: ObjExporter,
}

impl Converter {
    /// Create a converter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the geometry options.
    pub fn with_geometry(mut self, geometry: GeometryOptions) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the label scanning options.
    pub fn with_scan_options(mut self, scan: ScanOptions) -> Self {
        self.scan = scan;
        self
    }

    pub fn geometry(&self) -> &GeometryOptions {
        &self.geometry
    }

    /// Default file extension of the output format.
    pub fn extension(&self) -> &'static str {
        self.exporter.extension()
    }

    /// Convert export lines to meshes, in file order.
    ///
    /// Every shape must build; a single failure discards the whole file.
    pub fn convert_lines<S: AsRef<str>>(
        &self,
        lines: &[S],
    ) -> Result<(AtlasSize, Vec<ConvertedMesh>), AtlasError> {
        let atlas = scan_atlas(lines, &self.scan)?;

        let meshes = atlas
            .shapes
            .iter()
            .map(|shape| {
                let mesh = build_mesh(&shape.frame, &shape.arrays, atlas.size, &self.geometry)?;
                Ok(ConvertedMesh {
                    name: mesh.name.clone(),
                    text: self.exporter.export_to_string(&mesh),
                    stats: mesh.stats(),
                })
            })
            .collect::<Result<Vec<_>, AtlasError>>()?;

        Ok((atlas.size, meshes))
    }

    /// Convert export text to meshes.
    pub fn convert_str(&self, text: &str) -> Result<(AtlasSize, Vec<ConvertedMesh>), AtlasError> {
        let lines: Vec<&str> = text.lines().collect();
        self.convert_lines(&lines)
    }

    /// Read and convert one export file.
    pub fn convert_file(&self, path: &Path) -> Result<AtlasConversion, ConvertError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConvertError::Io { path: path.to_path_buf(), source })?;

        let (size, meshes) = self
            .convert_str(&text)
            .map_err(|source| ConvertError::Atlas { path: path.to_path_buf(), source })?;

        log::info!(
            "{}: {} meshes from {}x{} atlas",
            path.display(),
            meshes.len(),
            size.w,
            size.h
        );

        Ok(AtlasConversion { source: path.to_path_buf(), size, meshes })
    }

    /// Convert several export files on a pool of `jobs` workers.
    ///
    /// Results are returned in input order; one failing file does not stop
    /// the others.
    pub fn convert_files(
        &self,
        paths: &[PathBuf],
        jobs: usize,
    ) -> Result<Vec<Result<AtlasConversion, ConvertError>>, ConvertError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs.max(1)).build()?;
        Ok(pool.install(|| paths.par_iter().map(|path| self.convert_file(path)).collect()))
    }
}

/// Default number of parallel jobs (uses available parallelism).
pub fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const EXPORT: &str = r#"{"frames": {

"tri.png":
{
	"frame": {"x":0,"y":0,"w":100,"h":100},
	"rotated": false,
	"trimmed": false,
	"spriteSourceSize": {"x":0,"y":0,"w":100,"h":100},
	"sourceSize": {"w":100,"h":100},
	"pivot": {"x":0.5,"y":0.5},
	"vertices": [[0,0],[100,0],[0,100]],
	"verticesUV": [[0,0],[100,100],[0,0]],
	"triangles": [[0,1,2]]
}},
"meta": {
	"size": {"w":100,"h":100},
	"scale": "1"
}
}
"#;

    #[test]
    fn test_convert_str() {
        let (size, meshes) = Converter::new().convert_str(EXPORT).unwrap();
        assert_eq!(size, AtlasSize { w: 100, h: 100 });
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].name, "tri");
        assert_eq!(meshes[0].stats, MeshStats { vertices: 3, triangles: 1 });
        assert!(meshes[0].text.starts_with("g tri\n"));
        assert!(meshes[0].text.ends_with("f 2/2/2 1/1/1 3/3/3\n"));
    }

    #[test]
    fn test_convert_uses_configured_scale() {
        let converter = Converter::new().with_geometry(GeometryOptions { pixels_per_unit: 100.0 });
        let (_, meshes) = converter.convert_str(EXPORT).unwrap();
        assert!(meshes[0].text.contains("\nv 0.5 0.5 0\n"));
    }

    #[test]
    fn test_convert_out_of_range_index_fails_file() {
        let text = EXPORT.replace("[[0,1,2]]", "[[0,1,5]]");
        let err = Converter::new().convert_str(&text).unwrap_err();
        assert!(matches!(err, AtlasError::IndexOutOfRange { index: 5, .. }));
    }

    #[test]
    fn test_converted_mesh_file_name() {
        let mesh = ConvertedMesh {
            name: "hero".to_string(),
            text: String::new(),
            stats: MeshStats { vertices: 0, triangles: 0 },
        };
        assert_eq!(mesh.file_name("obj"), "hero.obj");
    }

    #[test]
    fn test_convert_file_missing() {
        let temp = tempdir().unwrap();
        let err = Converter::new().convert_file(&temp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }

    #[test]
    fn test_convert_files_keeps_input_order() {
        let temp = tempdir().unwrap();
        let good = temp.path().join("good.json");
        let bad = temp.path().join("bad.json");
        fs::File::create(&good).unwrap().write_all(EXPORT.as_bytes()).unwrap();
        fs::File::create(&bad).unwrap().write_all(b"{\"frames\": {\n}}\n").unwrap();

        let results = Converter::new().convert_files(&[bad.clone(), good.clone()], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert!(matches!(
            &results[0],
            Err(ConvertError::Atlas { path, source: AtlasError::MissingMetadata }) if path == &bad
        ));
        assert_eq!(results[1].as_ref().unwrap().source, good);
    }
}
