//! Mesh construction utilities.
//!
//! Conversion between face-vertex lists, as found in mesh file formats, and
//! [`DynamicMesh`].

use std::collections::HashMap;

use nalgebra::Point3;

use super::dynamic::DynamicMesh;
use super::index::VertexId;
use crate::error::{MeshError, Result};

/// Build a dynamic mesh from vertices and triangle faces.
///
/// Vertex `i` of the input becomes `VertexId::new(i)`, and triangle `j`
/// becomes `TriangleId::new(j)`.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Example
/// ```
/// use seamweld::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.boundary_edge_count(), 3);
/// ```
pub fn build_from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<DynamicMesh> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex {
                    triangle: fi,
                    vertex: vi,
                });
            }
        }
    }

    let mut mesh = DynamicMesh::with_capacity(vertices.len(), faces.len());
    let ids: Vec<VertexId> = vertices.iter().map(|&p| mesh.append_vertex(p)).collect();
    for face in faces {
        mesh.append_triangle([ids[face[0]], ids[face[1]], ids[face[2]]])?;
    }

    Ok(mesh)
}

/// Extract vertices and triangle faces from a dynamic mesh.
///
/// Removed slots are skipped, so the output indices are compacted and may
/// differ from the mesh's vertex ids.
pub fn to_face_vertex(mesh: &DynamicMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut remap: HashMap<VertexId, usize> = HashMap::with_capacity(mesh.vertex_count());
    let mut vertices = Vec::with_capacity(mesh.vertex_count());
    for v in mesh.vertex_ids() {
        if let Some(p) = mesh.position(v) {
            remap.insert(v, vertices.len());
            vertices.push(p);
        }
    }

    let faces: Vec<[usize; 3]> = mesh
        .triangle_ids()
        .filter_map(|t| {
            let [v0, v1, v2] = mesh.triangle_vertices(t)?;
            Some([*remap.get(&v0)?, *remap.get(&v1)?, *remap.get(&v2)?])
        })
        .collect();

    (vertices, faces)
}
