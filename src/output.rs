//! Mesh file output and stale file pruning

use crate::convert::ConvertedMesh;
use glob::glob;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The output directory could not be listed
    #[error("invalid output pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> OutputError + '_ {
    move |source| OutputError::Io { path: path.to_path_buf(), source }
}

/// Path of a mesh file inside the output directory.
pub fn mesh_path(out_dir: &Path, mesh: &ConvertedMesh, extension: &str) -> PathBuf {
    out_dir.join(mesh.file_name(extension))
}

/// Write every mesh to `out_dir` as `<name>.<extension>`.
///
/// Creates the output directory (and any directories named by shape labels
/// such as `props/tree`) as needed. Returns the written paths in order.
pub fn write_meshes(
    out_dir: &Path,
    meshes: &[ConvertedMesh],
    extension: &str,
) -> Result<Vec<PathBuf>, OutputError> {
    let mut written = Vec::with_capacity(meshes.len());

    for mesh in meshes {
        let path = mesh_path(out_dir, mesh, extension);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(&path, &mesh.text).map_err(io_error(&path))?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// Find `*.<extension>` files under `out_dir` that are not in `keep`.
///
/// Paths are compared after canonicalization, so `keep` may spell the
/// output directory differently than `out_dir`.
pub fn find_stale(
    out_dir: &Path,
    keep: &HashSet<PathBuf>,
    extension: &str,
) -> Result<Vec<PathBuf>, OutputError> {
    let pattern = format!("{}/**/*.{}", out_dir.display(), extension);
    let keep: HashSet<PathBuf> =
        keep.iter().filter_map(|path| fs::canonicalize(path).ok()).collect();
    let is_kept =
        |path: &Path| fs::canonicalize(path).is_ok_and(|canonical| keep.contains(&canonical));

    let mut stale: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("error reading path: {}", e);
                None
            }
        })
        .filter(|path| path.is_file() && !is_kept(path))
        .collect();

    stale.sort();
    Ok(stale)
}

/// Delete mesh files under `out_dir` that no current shape produced.
///
/// Returns the deleted paths.
pub fn prune_stale(
    out_dir: &Path,
    keep: &HashSet<PathBuf>,
    extension: &str,
) -> Result<Vec<PathBuf>, OutputError> {
    let stale = find_stale(out_dir, keep, extension)?;
    for path in &stale {
        fs::remove_file(path).map_err(io_error(path))?;
        log::warn!("removed stale mesh {}", path.display());
    }
    Ok(stale)
}
