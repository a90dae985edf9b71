//! Data model for packed atlas shapes
//!
//! These types mirror the per-shape objects written by the sprite packer's
//! polygon export. Only the structural fields are deserialized; the three
//! polygon arrays are carried separately in [`RawVertexArrays`].

use serde::{Deserialize, Serialize};

/// Packed atlas image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasSize {
    pub w: u32,
    pub h: u32,
}

/// A placement rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

/// Untrimmed source image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSize {
    pub w: u32,
    pub h: u32,
}

/// Normalized origin of a shape relative to its untrimmed source bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub x: f32,
    pub y: f32,
}

impl Default for Pivot {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

/// Frame metadata for one packed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    /// Shape name, taken from the label line rather than the JSON body
    #[serde(skip)]
    pub name: String,
    /// Placement in the atlas
    pub frame: Rect,
    #[serde(default)]
    pub rotated: bool,
    #[serde(default)]
    pub trimmed: bool,
    /// Trimmed region within the source image
    pub sprite_source_size: Rect,
    pub source_size: SourceSize,
    #[serde(default)]
    pub pivot: Pivot,
}

/// Raw polygon arrays of one shape, exactly as parsed from the export.
///
/// Tuples are not arity-checked here; the geometry builder does that.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawVertexArrays {
    /// Polygon vertices, pixel (x, y) relative to the source image
    pub vertices: Vec<Vec<i64>>,
    /// UV vertices, pixel (x, y) in atlas space
    pub uv: Vec<Vec<i64>>,
    /// Triangle index triples into `vertices`
    pub triangles: Vec<Vec<i64>>,
}

/// One shape extracted from an export: its frame record and raw arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedShape {
    pub frame: FrameRecord,
    pub arrays: RawVertexArrays,
}
