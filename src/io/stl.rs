//! STL format support.
//!
//! STL stores three corners per triangle with no shared vertices, so loading
//! merges corners with bit-identical coordinates. Triangles that collapse
//! under that merge are dropped. Saving always writes binary STL.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use log::debug;
use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_face_vertex, DynamicMesh};

/// Load a mesh from an STL file, binary or ASCII.
///
/// # Example
///
/// ```no_run
/// use seamweld::io::stl;
///
/// let mesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<DynamicMesh> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    read(&mut file).map_err(|err| match err {
        MeshError::InvalidState(message) => MeshError::LoadError {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Read an STL stream into a mesh.
pub fn read<R: Read + Seek>(reader: &mut R) -> Result<DynamicMesh> {
    let stl = stl_io::read_stl(reader).map_err(|e| MeshError::InvalidState(e.to_string()))?;

    let mut lookup: HashMap<[u32; 3], usize> = HashMap::new();
    let mut remap = Vec::with_capacity(stl.vertices.len());
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    for v in &stl.vertices {
        let key = [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()];
        let idx = *lookup.entry(key).or_insert_with(|| {
            vertices.push(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
            vertices.len() - 1
        });
        remap.push(idx);
    }

    let faces: Vec<[usize; 3]> = stl
        .faces
        .iter()
        .map(|f| f.vertices.map(|i| remap[i]))
        .filter(|[a, b, c]| a != b && b != c && a != c)
        .collect();
    if faces.len() < stl.faces.len() {
        debug!("dropped {} degenerate STL triangles", stl.faces.len() - faces.len());
    }
    if faces.is_empty() {
        return Err(MeshError::InvalidState(
            "STL file contains no valid triangles".to_string(),
        ));
    }

    build_from_triangles(&vertices, &faces)
}

/// Save a mesh to a binary STL file.
pub fn save<P: AsRef<Path>>(mesh: &DynamicMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as binary STL.
pub fn write<W: Write>(mesh: &DynamicMesh, writer: &mut W) -> std::io::Result<()> {
    let (vertices, faces) = to_face_vertex(mesh);
    let to_vertex = |p: &Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);

    let triangles: Vec<stl_io::Triangle> = faces
        .iter()
        .map(|f| {
            let [p0, p1, p2] = f.map(|i| vertices[i]);
            let n = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);
            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [to_vertex(&p0), to_vertex(&p1), to_vertex(&p2)],
            }
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn square() -> DynamicMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn test_shared_corners_are_merged() {
        let mut buffer = Cursor::new(Vec::new());
        write(&square(), &mut buffer).unwrap();
        buffer.set_position(0);

        let mesh = read(&mut buffer).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.boundary_edge_count(), 4);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.stl");
        save(&square(), &path).unwrap();

        let mesh = load(&path).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_garbage_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.stl");
        std::fs::write(&path, b"solid nothing\nendsolid nothing\n").unwrap();

        assert!(matches!(load(&path), Err(MeshError::LoadError { .. })));
    }
}
