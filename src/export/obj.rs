//! Wavefront OBJ export format.
//!
//! # Output Format
//!
//! ```text
//! g hero
//! v 0.5127 0.5127 0
//! v -0.5127 0.5127 0
//! v 0.5127 -0.5127 0
//!
//! vn 0 0 -1
//! vn 0 0 -1
//! vn 0 0 -1
//!
//! vt 0 1
//! vt 1 0
//! vt 0 1
//!
//! f 2/2/2 1/1/1 3/3/3
//! ```
//!
//! The x axis is mirrored on output (`v` and `vn` x components are negated)
//! and each face's first two indices are swapped. Position, UV and normal
//! share one 1-based index space.

use crate::export::Exporter;
use crate::geometry::Mesh;

/// OBJ format exporter.
#[derive(Debug, Clone, Default)]
pub struct ObjExporter;

impl ObjExporter {
    /// Create a new OBJ exporter.
    pub fn new() -> Self {
        Self
    }

    /// Generate the OBJ content for one mesh.
    fn generate_obj_content(&self, mesh: &Mesh) -> String {
        let mut content = String::new();

        content.push_str(&format!("g {}\n", mesh.name));

        for vertex in &mesh.vertices {
            content.push_str(&format!("v {} {} {}\n", f(-vertex.x), f(vertex.y), f(vertex.z)));
        }
        content.push('\n');

        for normal in &mesh.normals {
            content.push_str(&format!("vn {} {} {}\n", f(-normal.x), f(normal.y), f(normal.z)));
        }
        content.push('\n');

        for uv in &mesh.uv {
            content.push_str(&format!("vt {} {}\n", f(uv.x), f(uv.y)));
        }
        content.push('\n');

        for face in mesh.triangles.chunks_exact(3) {
            // (a, b, c) is written as (b, a, c)
            let (a, b, c) = (face[0] + 1, face[1] + 1, face[2] + 1);
            content.push_str(&format!("f {b}/{b}/{b} {a}/{a}/{a} {c}/{c}/{c}\n"));
        }

        content
    }
}

/// Format a float, writing negative zero as `0`.
fn f(n: f32) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{}", n)
}

impl Exporter for ObjExporter {
    fn export_to_string(&self, mesh: &Mesh) -> String {
        self.generate_obj_content(mesh)
    }

    fn format_name(&self) -> &'static str {
        "Wavefront OBJ"
    }

    fn extension(&self) -> &'static str {
        "obj"
    }
}
