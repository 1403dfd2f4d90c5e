//! Extents of `<mesh>` geometry.
//!
//! Only the vertex bounds of a mesh are needed, so STL files are scanned
//! for vertices without building a triangle list. Both encodings are read:
//!
//! ```text
//! binary: UINT8[80] header, UINT32 triangle count, then per triangle
//!         REAL32[3] normal, REAL32[3] x 3 vertices, UINT16 attributes
//! ascii:  solid name / facet normal .. / outer loop / vertex x y z ...
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use nalgebra::Point3;
use tracing::debug;

use rigcheck_spatial::{Aabb, Shape};

use crate::error::MeshError;
use crate::types::Geometry;

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

// ---------------------------------------------------------------------------
// MeshLoader
// ---------------------------------------------------------------------------

/// Turns URDF geometry into shapes, reading mesh files relative to the
/// directory of the URDF that references them.
///
/// Mesh extents are cached by resolved path; a file referenced by both a
/// visual and a collision element is read once.
#[derive(Debug, Default)]
pub struct MeshLoader {
    base_dir: Option<PathBuf>,
    extents: HashMap<PathBuf, Aabb>,
}

impl MeshLoader {
    /// Loader resolving relative mesh paths against `base_dir` (the working
    /// directory when `None`).
    pub fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
            extents: HashMap::new(),
        }
    }

    /// Shape of `geometry` in its element frame. Primitives convert
    /// directly; a mesh becomes [`Shape::Bounds`] of its scaled vertices.
    pub fn shape_of(&mut self, geometry: &Geometry) -> Result<Shape, MeshError> {
        geometry.to_shape_with(|filename| self.extent(filename))
    }

    /// Unscaled vertex bounds of the mesh named by a URDF `filename`.
    pub fn extent(&mut self, filename: &str) -> Result<Aabb, MeshError> {
        let path = resolve_mesh_path(filename, self.base_dir.as_deref());
        if let Some(extent) = self.extents.get(&path) {
            return Ok(*extent);
        }
        let extent = read_stl_extent(&path)?;
        debug!(path = %path.display(), ?extent, "read mesh extent");
        self.extents.insert(path, extent);
        Ok(extent)
    }
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// File path for a URDF mesh `filename`.
///
/// `file://` URIs are taken literally. `package://<pkg>/<rest>` is looked up
/// as `<rest>` under `base_dir` and then under its parent (the usual
/// `pkg/urdf/` next to `pkg/meshes/` layout). Plain relative paths are
/// relative to `base_dir`.
pub fn resolve_mesh_path(filename: &str, base_dir: Option<&Path>) -> PathBuf {
    if let Some(path) = filename.strip_prefix("file://") {
        return PathBuf::from(path);
    }
    let base = base_dir.unwrap_or_else(|| Path::new(""));
    if let Some(uri) = filename.strip_prefix("package://") {
        let rest = uri.split_once('/').map_or(uri, |(_, rest)| rest);
        let beside = base.join(rest);
        if beside.exists() {
            return beside;
        }
        return match base.parent() {
            Some(parent) if parent.join(rest).exists() => parent.join(rest),
            _ => beside,
        };
    }
    base.join(filename)
}

// ---------------------------------------------------------------------------
// STL
// ---------------------------------------------------------------------------

/// Vertex bounds of an STL file, ASCII or binary.
pub fn read_stl_extent(path: &Path) -> Result<Aabb, MeshError> {
    let is_stl = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("stl"));
    if !is_stl {
        return Err(MeshError::UnsupportedFormat(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let malformed = |message: String| MeshError::Malformed {
        path: path.to_path_buf(),
        message,
    };

    let mut bounds = VertexBounds::default();
    if is_binary_stl(&bytes) {
        scan_binary(&bytes, &mut bounds);
    } else if bytes.trim_ascii_start().starts_with(b"solid") {
        let text = std::str::from_utf8(&bytes).map_err(|e| malformed(e.to_string()))?;
        scan_ascii(text, &mut bounds).map_err(malformed)?;
    } else {
        return Err(malformed(format!(
            "{} bytes is neither ASCII nor a whole binary STL",
            bytes.len()
        )));
    }
    bounds
        .finish()
        .ok_or_else(|| MeshError::Empty(path.to_path_buf()))
}

/// Binary when the declared triangle count accounts for the file length.
/// Some binary headers begin with "solid" too, so the length decides.
fn is_binary_stl(bytes: &[u8]) -> bool {
    let Some(count) = bytes.get(HEADER_SIZE..HEADER_SIZE + 4) else {
        return false;
    };
    let count = u32::from_le_bytes([count[0], count[1], count[2], count[3]]) as usize;
    count
        .checked_mul(TRIANGLE_SIZE)
        .and_then(|body| body.checked_add(HEADER_SIZE + 4))
        == Some(bytes.len())
}

fn scan_binary(bytes: &[u8], bounds: &mut VertexBounds) {
    for triangle in bytes[HEADER_SIZE + 4..].chunks_exact(TRIANGLE_SIZE) {
        // Skip the 12-byte normal; three vertices follow.
        for vertex in triangle[12..48].chunks_exact(12) {
            bounds.add(Point3::new(
                read_f32(&vertex[0..4]),
                read_f32(&vertex[4..8]),
                read_f32(&vertex[8..12]),
            ));
        }
    }
}

fn read_f32(buf: &[u8]) -> f32 {
    f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}

fn scan_ascii(text: &str, bounds: &mut VertexBounds) -> Result<(), String> {
    for (number, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some(word) if word.eq_ignore_ascii_case("vertex") => {
                let mut coord = || -> Result<f32, String> {
                    parts
                        .next()
                        .ok_or_else(|| format!("line {}: vertex needs three coordinates", number + 1))?
                        .parse::<f32>()
                        .map_err(|e| format!("line {}: {e}", number + 1))
                };
                let point = Point3::new(coord()?, coord()?, coord()?);
                bounds.add(point);
            }
            Some(word) if word.eq_ignore_ascii_case("endsolid") => break,
            _ => {}
        }
    }
    Ok(())
}

/// Running min/max over finite vertices.
#[derive(Debug, Default)]
struct VertexBounds {
    bounds: Option<Aabb>,
}

impl VertexBounds {
    fn add(&mut self, point: Point3<f32>) {
        if !point.coords.iter().all(|c| c.is_finite()) {
            return;
        }
        let single = Aabb::new(point, point);
        self.bounds = Some(self.bounds.map_or(single, |b| b.union(&single)));
    }

    const fn finish(self) -> Option<Aabb> {
        self.bounds
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
