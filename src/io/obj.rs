//! Wavefront OBJ format support.
//!
//! Only positions (`v`) and faces (`f`) are read. Texture coordinates,
//! normals, groups and materials are skipped. Polygons with more than three
//! corners are fan triangulated.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_face_vertex, DynamicMesh};

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use seamweld::io::obj;
///
/// let mesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<DynamicMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let (vertices, faces) = parse(BufReader::new(file)).map_err(|message| MeshError::LoadError {
        path: path.to_path_buf(),
        message,
    })?;
    build_from_triangles(&vertices, &faces)
}

/// Save a mesh to an OBJ file.
///
/// Vertex ids are compacted, so a mesh with deleted vertices is written
/// without gaps.
pub fn save<P: AsRef<Path>>(mesh: &DynamicMesh, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as OBJ text.
pub fn write<W: Write>(mesh: &DynamicMesh, writer: &mut W) -> Result<()> {
    let (vertices, faces) = to_face_vertex(mesh);
    for p in &vertices {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for f in &faces {
        writeln!(writer, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }
    Ok(())
}

type Parsed = (Vec<Point3<f64>>, Vec<[usize; 3]>);

/// Parse OBJ text into positions and zero-based triangles.
pub(crate) fn parse<R: BufRead>(reader: R) -> std::result::Result<Parsed, String> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| e.to_string())?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let coords: Vec<f64> = parts
                    .take(3)
                    .map(|s| s.parse::<f64>())
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| format!("line {}: {}", line_no + 1, e))?;
                if coords.len() != 3 {
                    return Err(format!("line {}: vertex needs three coordinates", line_no + 1));
                }
                vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let corners = parts
                    .map(|token| parse_corner(token, vertices.len()))
                    .collect::<Option<Vec<usize>>>()
                    .ok_or_else(|| format!("line {}: bad face index", line_no + 1))?;
                if corners.len() < 3 {
                    return Err(format!("line {}: face needs three corners", line_no + 1));
                }
                for i in 1..corners.len() - 1 {
                    faces.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    Ok((vertices, faces))
}

/// Resolve the position index of a face corner such as `3`, `3/1`, `3//2`
/// or `-1`. Negative indices count back from the latest vertex.
fn parse_corner(token: &str, vertex_count: usize) -> Option<usize> {
    let index: i64 = token.split('/').next()?.parse().ok()?;
    if index > 0 {
        Some(index as usize - 1)
    } else if index < 0 {
        vertex_count.checked_sub(index.unsigned_abs() as usize)
    } else {
        None
    }
}
