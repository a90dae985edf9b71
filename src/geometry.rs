//! Mesh construction from packed shape data
//!
//! Positions are re-origined at the shape's pivot, converted from pixels to
//! world units and flipped so y grows upward. UVs are normalized against the
//! atlas size with the origin moved to the bottom-left corner.

use crate::error::AtlasError;
use crate::models::{AtlasSize, FrameRecord, RawVertexArrays};
use glam::{Vec2, Vec3, Vec4};
use serde::Serialize;

/// Pixels per world unit used when nothing else is configured (2048 px = 21 units).
pub const DEFAULT_PIXELS_PER_UNIT: f32 = 2048.0 / 21.0;

/// Normal shared by every vertex; the sprite faces away from +z.
pub const BACK_NORMAL: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Color shared by every vertex.
pub const OPAQUE_WHITE: Vec4 = Vec4::ONE;

/// Options for mesh construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryOptions {
    /// Pixels per world unit
    pub pixels_per_unit: f32,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self { pixels_per_unit: DEFAULT_PIXELS_PER_UNIT }
    }
}

/// A triangulated, UV-mapped polygon mesh for one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uv: Vec<Vec2>,
    /// Flat vertex index list, three per triangle
    pub triangles: Vec<u32>,
    /// Per-vertex colors; not written by the OBJ exporter
    pub colors: Vec<Vec4>,
}

/// Vertex and triangle counts of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeshStats {
    pub vertices: usize,
    pub triangles: usize,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn stats(&self) -> MeshStats {
        MeshStats { vertices: self.vertices.len(), triangles: self.triangle_count() }
    }
}

/// Build the mesh for one shape.
///
/// # Errors
///
/// Fails if a tuple has the wrong number of components, if the vertex and
/// UV arrays differ in length, or if a triangle index does not reference an
/// existing vertex.
pub fn build_mesh(
    frame: &FrameRecord,
    arrays: &RawVertexArrays,
    atlas: AtlasSize,
    options: &GeometryOptions,
) -> Result<Mesh, AtlasError> {
    let name = frame.name.as_str();

    let raw_vertices = pairs(name, "vertices", &arrays.vertices)?;
    let raw_uv = pairs(name, "verticesUV", &arrays.uv)?;
    if raw_vertices.len() != raw_uv.len() {
        return Err(AtlasError::MismatchedArrays {
            shape: name.to_string(),
            vertices: raw_vertices.len(),
            uvs: raw_uv.len(),
        });
    }

    let origin = Vec2::new(
        frame.pivot.x * frame.source_size.w as f32,
        frame.pivot.y * frame.source_size.h as f32,
    );
    let vertices: Vec<Vec3> = raw_vertices
        .iter()
        .map(|&pixel| {
            let local = (pixel - origin) / options.pixels_per_unit;
            Vec3::new(local.x, -local.y, 0.0)
        })
        .collect();

    let atlas_extent = Vec2::new(atlas.w as f32, atlas.h as f32);
    let uv = raw_uv
        .iter()
        .map(|&pixel| {
            let normalized = pixel / atlas_extent;
            Vec2::new(normalized.x, 1.0 - normalized.y)
        })
        .collect();

    let triangles = flatten_triangles(name, &arrays.triangles, vertices.len())?;

    Ok(Mesh {
        name: name.to_string(),
        normals: vec![BACK_NORMAL; vertices.len()],
        colors: vec![OPAQUE_WHITE; vertices.len()],
        vertices,
        uv,
        triangles,
    })
}

fn check_arity(
    shape: &str,
    field: &'static str,
    position: usize,
    tuple: &[i64],
    expected: usize,
) -> Result<(), AtlasError> {
    if tuple.len() == expected {
        Ok(())
    } else {
        Err(AtlasError::TupleArity {
            shape: shape.to_string(),
            field,
            position,
            expected,
            found: tuple.len(),
        })
    }
}

fn pairs(shape: &str, field: &'static str, tuples: &[Vec<i64>]) -> Result<Vec<Vec2>, AtlasError> {
    tuples
        .iter()
        .enumerate()
        .map(|(position, tuple)| {
            check_arity(shape, field, position, tuple, 2)?;
            Ok(Vec2::new(tuple[0] as f32, tuple[1] as f32))
        })
        .collect()
}

fn flatten_triangles(
    shape: &str,
    tuples: &[Vec<i64>],
    vertex_count: usize,
) -> Result<Vec<u32>, AtlasError> {
    let mut indices = Vec::with_capacity(tuples.len() * 3);
    for (position, tuple) in tuples.iter().enumerate() {
        check_arity(shape, "triangles", position, tuple, 3)?;
        for &index in tuple {
            let converted = usize::try_from(index)
                .ok()
                .filter(|&i| i < vertex_count)
                .and_then(|i| u32::try_from(i).ok());
            let Some(converted) = converted else {
                return Err(AtlasError::IndexOutOfRange {
                    shape: shape.to_string(),
                    index,
                    vertex_count,
                });
            };
            indices.push(converted);
        }
    }
    Ok(indices)
}
