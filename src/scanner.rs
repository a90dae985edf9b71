//! Line scanner for the packer's polygon atlas export
//!
//! The export is JSON everywhere except the three polygon array fields of
//! each shape. The scanner walks the document line by line:
//!
//! ```text
//! {"frames": {
//!
//! "hero.png":
//! {
//!     "frame": {"x":2,"y":2,"w":50,"h":60},
//!     ...
//!     "pivot": {"x":0.5,"y":0.5},
//!     "vertices": [[10,0],[52,0],[52,60],[0,60]],
//!     "verticesUV": [[12,2],[54,2],[54,62],[2,62]],
//!     "triangles": [[0,1,2],[0,2,3]]
//! }},
//! "meta": {
//!     ...
//!     "size": {"w":256,"h":256},
//! ```
//!
//! A label line ending in `:` opens a shape. Array lines are diverted to the
//! array parser, every other line is buffered and decoded as JSON when the
//! shape's closing line (`},` or `}},`) is reached.

use crate::array_literal;
use crate::error::AtlasError;
use crate::models::{AtlasSize, ParsedShape, RawVertexArrays};
use crate::record;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Component, Path};
use std::sync::OnceLock;

/// Closing line of a shape followed by another shape.
const SHAPE_CLOSE: &str = "},";
/// Closing line of the last shape in the frames group.
const GROUP_CLOSE: &str = "}},";

/// Image extensions stripped from shape labels by default.
const DEFAULT_IMAGE_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "tga", "bmp", "gif", "psd", "webp"];

/// Options controlling how shape labels are cleaned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Extensions (without the dot, lowercase) removed from the end of labels
    pub image_extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { image_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect() }
    }
}

/// Atlas size plus every shape of one export, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedAtlas {
    pub size: AtlasSize,
    pub shapes: Vec<ParsedShape>,
}

/// The three array fields diverted away from JSON decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayField {
    Vertices,
    Uv,
    Triangles,
}

impl ArrayField {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "vertices" => Some(ArrayField::Vertices),
            "verticesUV" => Some(ArrayField::Uv),
            "triangles" => Some(ArrayField::Triangles),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ArrayField::Vertices => "vertices",
            ArrayField::Uv => "verticesUV",
            ArrayField::Triangles => "triangles",
        }
    }
}

fn array_field_regex() -> &'static Regex {
    static FIELD: OnceLock<Regex> = OnceLock::new();
    FIELD.get_or_init(|| {
        Regex::new(r#"^\s*"(vertices|verticesUV|triangles)"\s*:\s*"#)
            .expect("array field pattern is valid")
    })
}

fn key_regex(key: &'static str) -> Regex {
    Regex::new(&format!(r#""{}"\s*:"#, key)).expect("key pattern is valid")
}

fn frames_regex() -> &'static Regex {
    static FRAMES: OnceLock<Regex> = OnceLock::new();
    FRAMES.get_or_init(|| key_regex("frames"))
}

fn meta_regex() -> &'static Regex {
    static META: OnceLock<Regex> = OnceLock::new();
    META.get_or_init(|| key_regex("meta"))
}

fn size_regex() -> &'static Regex {
    static SIZE: OnceLock<Regex> = OnceLock::new();
    SIZE.get_or_init(|| key_regex("size"))
}

/// One array line held until its shape closes.
#[derive(Debug, Clone, Copy)]
struct DivertedLine<'a> {
    text: &'a str,
    /// 1-based line number
    line: usize,
    prefix_len: usize,
}

/// Scan state owned by a single open shape.
#[derive(Debug)]
struct ShapeContext<'a> {
    name: String,
    /// 1-based line number of the label
    line: usize,
    structural: Vec<&'a str>,
    vertices: Option<DivertedLine<'a>>,
    uv: Option<DivertedLine<'a>>,
    triangles: Option<DivertedLine<'a>>,
}

impl<'a> ShapeContext<'a> {
    fn open(name: String, line: usize) -> Self {
        Self { name, line, structural: Vec::new(), vertices: None, uv: None, triangles: None }
    }

    fn divert(&mut self, field: ArrayField, diverted: DivertedLine<'a>) {
        let slot = match field {
            ArrayField::Vertices => &mut self.vertices,
            ArrayField::Uv => &mut self.uv,
            ArrayField::Triangles => &mut self.triangles,
        };
        *slot = Some(diverted);
    }

    /// Join the buffered lines into one JSON object.
    ///
    /// The last buffered line loses its trailing `,` and gains the object's
    /// closing brace.
    fn structural_document(&self) -> String {
        let mut document = String::new();
        if let Some((last, rest)) = self.structural.split_last() {
            for line in rest {
                document.push_str(line);
                document.push('\n');
            }
            let last = last.trim_end();
            document.push_str(last.strip_suffix(',').unwrap_or(last));
            document.push('}');
        }
        document
    }

    fn parse_array(
        &self,
        field: ArrayField,
        diverted: Option<DivertedLine<'a>>,
    ) -> Result<Vec<Vec<i64>>, AtlasError> {
        let diverted = diverted.ok_or_else(|| AtlasError::MissingArray {
            shape: self.name.clone(),
            field: field.label(),
        })?;

        let trimmed = diverted.text.trim_end();
        let suffix_len = usize::from(trimmed.ends_with(','));
        array_literal::parse(trimmed, diverted.prefix_len, suffix_len).map_err(|source| {
            AtlasError::MalformedArray {
                shape: self.name.clone(),
                field: field.label(),
                line: diverted.line,
                source,
            }
        })
    }

    fn finish(self, close_line: usize) -> Result<ParsedShape, AtlasError> {
        let document = self.structural_document();
        let mut frame = record::decode(&document).map_err(|source| AtlasError::StructuralDecode {
            shape: self.name.clone(),
            line: close_line,
            source,
        })?;

        let arrays = RawVertexArrays {
            vertices: self.parse_array(ArrayField::Vertices, self.vertices)?,
            uv: self.parse_array(ArrayField::Uv, self.uv)?,
            triangles: self.parse_array(ArrayField::Triangles, self.triangles)?,
        };

        log::debug!(
            "shape '{}': {} vertices, {} uv, {} triangles",
            self.name,
            arrays.vertices.len(),
            arrays.uv.len(),
            arrays.triangles.len()
        );

        frame.name = self.name;
        Ok(ParsedShape { frame, arrays })
    }
}

/// Index of the last line opening the metadata block.
fn locate_metadata<S: AsRef<str>>(lines: &[S]) -> Option<usize> {
    lines.iter().rposition(|line| meta_regex().is_match(line.as_ref()))
}

/// Find the atlas size declared in the metadata block.
///
/// Searches backward for the last `"meta"` line and then forward from it for
/// the `"size"` field.
pub fn find_atlas_size<S: AsRef<str>>(lines: &[S]) -> Result<AtlasSize, AtlasError> {
    let meta = locate_metadata(lines).ok_or(AtlasError::MissingMetadata)?;

    let (index, value) = lines[meta..]
        .iter()
        .enumerate()
        .find_map(|(offset, line)| {
            let line = line.as_ref();
            size_regex().find(line).map(|m| (meta + offset, &line[m.end()..]))
        })
        .ok_or(AtlasError::MissingMetadata)?;

    let value = value.trim();
    let value = value.strip_suffix(',').unwrap_or(value);
    let size: AtlasSize = serde_json::from_str(value)
        .map_err(|source| AtlasError::InvalidMetadata { line: index + 1, source })?;

    if size.w == 0 || size.h == 0 {
        return Err(AtlasError::InvalidAtlasSize { w: size.w, h: size.h });
    }
    Ok(size)
}

/// Reduce a label line such as `"hero.png":` to the shape name `hero`.
pub fn clean_label(line: &str, options: &ScanOptions) -> String {
    let label = line.trim();
    let label = label.strip_suffix(':').unwrap_or(label).trim();
    let label = label.trim_matches('"');

    match label.rsplit_once('.') {
        Some((stem, ext))
            if options.image_extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)) =>
        {
            stem.to_string()
        }
        _ => label.to_string(),
    }
}

/// Whether a shape name stays inside the output directory when joined to it.
///
/// Sub-folder names such as `props/tree` are allowed.
fn is_relative_name(name: &str) -> bool {
    Path::new(name).components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Extract every shape from an export, in file order.
///
/// Scanning starts after the line opening the `"frames"` block and stops at
/// the metadata block. Any failure aborts the whole file.
pub fn parse_shapes<S: AsRef<str>>(
    lines: &[S],
    options: &ScanOptions,
) -> Result<Vec<ParsedShape>, AtlasError> {
    let start = lines
        .iter()
        .position(|line| frames_regex().is_match(line.as_ref()))
        .map_or(0, |index| index + 1);
    let end = match locate_metadata(lines) {
        Some(meta) if meta >= start => meta,
        _ => lines.len(),
    };

    let mut shapes = Vec::new();
    let mut seen = HashSet::new();
    let mut current: Option<ShapeContext> = None;

    for (index, line) in lines[start..end].iter().enumerate() {
        let line = line.as_ref();
        let line_number = start + index + 1;
        let trimmed = line.trim();

        let Some(shape) = current.as_mut() else {
            if trimmed.ends_with(':') {
                let name = clean_label(trimmed, options);
                if name.is_empty() {
                    return Err(AtlasError::EmptyShapeName {
                        line: line_number,
                        label: trimmed.to_string(),
                    });
                }
                if !is_relative_name(&name) {
                    return Err(AtlasError::UnsafeShapeName { shape: name, line: line_number });
                }
                if !seen.insert(name.clone()) {
                    return Err(AtlasError::DuplicateShape { shape: name, line: line_number });
                }
                current = Some(ShapeContext::open(name, line_number));
            }
            continue;
        };

        if trimmed == SHAPE_CLOSE || trimmed == GROUP_CLOSE {
            if let Some(finished) = current.take() {
                shapes.push(finished.finish(line_number)?);
            }
            continue;
        }

        let field = array_field_regex().captures(line).and_then(|caps| {
            let whole = caps.get(0)?;
            let field = ArrayField::from_label(caps.get(1)?.as_str())?;
            Some((field, whole.end()))
        });

        match field {
            Some((field, prefix_len)) => {
                shape.divert(field, DivertedLine { text: line, line: line_number, prefix_len })
            }
            None => shape.structural.push(line),
        }
    }

    if let Some(open) = current {
        return Err(AtlasError::UnterminatedShape { shape: open.name, line: open.line });
    }

    Ok(shapes)
}

/// Read the atlas size and every shape of one export.
///
/// The size is resolved first so a file without metadata fails before any
/// shape is decoded.
pub fn scan_atlas<S: AsRef<str>>(
    lines: &[S],
    options: &ScanOptions,
) -> Result<ScannedAtlas, AtlasError> {
    let size = find_atlas_size(lines)?;
    let shapes = parse_shapes(lines, options)?;
    Ok(ScannedAtlas { size, shapes })
}
