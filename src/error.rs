//! Errors that abort conversion of an atlas export
//!
//! Every variant is fatal for the whole file: no meshes are produced for an
//! export that fails anywhere.

use crate::array_literal::ArrayLiteralError;
use crate::record::RecordError;
use thiserror::Error;

/// Error type for scanning an export and building its meshes.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// No `size` field after the last metadata block opening
    #[error("atlas metadata has no size field")]
    MissingMetadata,
    /// The metadata `size` value is not a `{"w":..,"h":..}` object
    #[error("line {line}: invalid atlas size: {source}")]
    InvalidMetadata {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// The metadata size decoded but has a zero dimension
    #[error("atlas size {w}x{h} must have positive dimensions")]
    InvalidAtlasSize { w: u32, h: u32 },
    /// A diverted array line could not be parsed
    #[error("line {line}: malformed {field} array in shape '{shape}': {source}")]
    MalformedArray {
        shape: String,
        field: &'static str,
        line: usize,
        #[source]
        source: ArrayLiteralError,
    },
    /// A shape closed without one of its array fields
    #[error("shape '{shape}' has no {field} array")]
    MissingArray { shape: String, field: &'static str },
    /// A tuple has the wrong number of components
    #[error(
        "shape '{shape}': {field} tuple {position} has {found} components, expected {expected}"
    )]
    TupleArity {
        shape: String,
        field: &'static str,
        position: usize,
        expected: usize,
        found: usize,
    },
    /// The reassembled shape block is not valid
    #[error("line {line}: cannot decode shape '{shape}': {source}")]
    StructuralDecode {
        shape: String,
        line: usize,
        #[source]
        source: RecordError,
    },
    /// Vertex and UV arrays differ in length
    #[error("shape '{shape}' has {vertices} vertices but {uvs} uv coordinates")]
    MismatchedArrays { shape: String, vertices: usize, uvs: usize },
    /// A triangle references a vertex that does not exist
    #[error("shape '{shape}': triangle index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { shape: String, index: i64, vertex_count: usize },
    /// A label line cleaned to an empty name
    #[error("line {line}: shape label '{label}' has an empty name")]
    EmptyShapeName { line: usize, label: String },
    /// A shape name would place its mesh outside the output directory
    #[error("line {line}: shape name '{shape}' must be a relative path without '..'")]
    UnsafeShapeName { shape: String, line: usize },
    /// Two shapes share a name
    #[error("line {line}: duplicate shape '{shape}'")]
    DuplicateShape { shape: String, line: usize },
    /// Input ended before a shape's closing line
    #[error("shape '{shape}' opened on line {line} is never closed")]
    UnterminatedShape { shape: String, line: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AtlasError::MissingMetadata.to_string(), "atlas metadata has no size field");

        let err =
            AtlasError::IndexOutOfRange { shape: "hero".to_string(), index: 7, vertex_count: 3 };
        assert!(err.to_string().contains("hero"));
        assert!(err.to_string().contains("index 7"));

        let err = AtlasError::UnterminatedShape { shape: "tree".to_string(), line: 12 };
        assert!(err.to_string().contains("line 12"));
    }
}
