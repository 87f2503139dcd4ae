//! Small meshes shared by the weld unit tests.

use std::f64::consts::TAU;

use nalgebra::Point3;

use crate::error::EditError;
use crate::mesh::{
    build_from_triangles, DynamicMesh, EdgeId, EdgeSplitInfo, MergeOptions, MergeVerticesInfo,
    TriangleId, VertexId, WeldMesh,
};

/// Append a strip of `n` quads between two rows spanning `x` in `[0, 2]`.
///
/// Returns the vertex indices of the lower and upper rows, low x first.
fn push_strip(
    vertices: &mut Vec<Point3<f64>>,
    faces: &mut Vec<[usize; 3]>,
    n: usize,
    y_low: f64,
    y_high: f64,
) -> (Vec<usize>, Vec<usize>) {
    let step = 2.0 / n as f64;
    let low: Vec<usize> = (0..=n)
        .map(|i| {
            vertices.push(Point3::new(i as f64 * step, y_low, 0.0));
            vertices.len() - 1
        })
        .collect();
    let high: Vec<usize> = (0..=n)
        .map(|i| {
            vertices.push(Point3::new(i as f64 * step, y_high, 0.0));
            vertices.len() - 1
        })
        .collect();
    for i in 0..n {
        faces.push([low[i], low[i + 1], high[i + 1]]);
        faces.push([low[i], high[i + 1], high[i]]);
    }
    (low, high)
}

/// Two disjoint strips facing each other across a gap.
///
/// The lower strip's top row (`keep`, `keep_edges` edges, at y = 0) and the
/// upper strip's bottom row (`discard`, `discard_edges` edges, at y = 1) both
/// run from x = 0 to x = 2 and are returned low x first. Their boundary
/// windings run in opposite directions.
pub(crate) fn two_strips(
    keep_edges: usize,
    discard_edges: usize,
) -> (DynamicMesh, Vec<VertexId>, Vec<VertexId>) {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    let (_, keep) = push_strip(&mut vertices, &mut faces, keep_edges, -1.0, 0.0);
    let (discard, _) = push_strip(&mut vertices, &mut faces, discard_edges, 1.0, 2.0);

    let mesh = build_from_triangles(&vertices, &faces).unwrap();
    let ids = |v: Vec<usize>| -> Vec<VertexId> { v.into_iter().map(VertexId::new).collect() };
    (mesh, ids(keep), ids(discard))
}

fn ring(vertices: &mut Vec<Point3<f64>>, radius: f64) -> Vec<usize> {
    (0..8)
        .map(|i| {
            let a = i as f64 * TAU / 8.0;
            vertices.push(Point3::new(radius * a.cos(), radius * a.sin(), 0.0));
            vertices.len() - 1
        })
        .collect()
}

/// A closed fan of eight triangles ringed by a band with one quad missing.
///
/// The slit runs between inner vertex 0 / outer vertex 0 and inner vertex 7 /
/// outer vertex 7, and the inner fan edge between inner vertices 7 and 0
/// bridges it. Returns the mesh with the slit sides as oriented vertex chains,
/// `[a0, b0]` and `[b7, a7]`.
pub(crate) fn slit_annulus() -> (DynamicMesh, Vec<VertexId>, Vec<VertexId>) {
    let mut vertices = vec![Point3::origin()];
    let a = ring(&mut vertices, 1.0);
    let b = ring(&mut vertices, 2.0);

    let mut faces: Vec<[usize; 3]> = (0..8).map(|i| [0, a[i], a[(i + 1) % 8]]).collect();
    for i in 0..7 {
        faces.push([a[i], b[i], b[i + 1]]);
        faces.push([a[i], b[i + 1], a[i + 1]]);
    }

    let mesh = build_from_triangles(&vertices, &faces).unwrap();
    (
        mesh,
        vec![VertexId::new(a[0]), VertexId::new(b[0])],
        vec![VertexId::new(b[7]), VertexId::new(a[7])],
    )
}

/// Seven fan triangles around a center vertex, leaving one wedge open.
///
/// Returns the mesh and the eight ring vertices in counter-clockwise order;
/// the center is vertex 0.
pub(crate) fn open_fan() -> (DynamicMesh, Vec<VertexId>) {
    let mut vertices = vec![Point3::origin()];
    let p = ring(&mut vertices, 1.0);
    let faces: Vec<[usize; 3]> = (0..7).map(|i| [0, p[i], p[i + 1]]).collect();

    let mesh = build_from_triangles(&vertices, &faces).unwrap();
    (mesh, p.into_iter().map(VertexId::new).collect())
}

/// Wraps a mesh, records every merge it is asked for and can refuse splits.
pub(crate) struct ScriptedMesh {
    pub mesh: DynamicMesh,
    pub refuse_splits: bool,
    /// `(keep, discard)` of each `merge_vertices_with` call, in call order.
    pub merges: Vec<(VertexId, VertexId)>,
}

impl ScriptedMesh {
    pub fn new(mesh: DynamicMesh) -> Self {
        Self {
            mesh,
            refuse_splits: false,
            merges: Vec::new(),
        }
    }

    pub fn refusing_splits(mesh: DynamicMesh) -> Self {
        Self {
            refuse_splits: true,
            ..Self::new(mesh)
        }
    }
}

impl WeldMesh for ScriptedMesh {
    fn is_vertex(&self, v: VertexId) -> bool {
        self.mesh.is_vertex(v)
    }
    fn is_edge(&self, e: EdgeId) -> bool {
        self.mesh.is_edge(e)
    }
    fn is_boundary_edge(&self, e: EdgeId) -> bool {
        self.mesh.is_boundary_edge(e)
    }
    fn vertex_position(&self, v: VertexId) -> Option<Point3<f64>> {
        self.mesh.position(v)
    }
    fn set_vertex_position(&mut self, v: VertexId, position: Point3<f64>) -> bool {
        self.mesh.set_position(v, position)
    }
    fn edge_vertices(&self, e: EdgeId) -> Option<[VertexId; 2]> {
        self.mesh.edge_vertices(e)
    }
    fn edge_triangles(&self, e: EdgeId) -> Option<[TriangleId; 2]> {
        self.mesh.edge_triangles(e)
    }
    fn oriented_boundary_edge_vertices(&self, e: EdgeId) -> Option<[VertexId; 2]> {
        self.mesh.oriented_boundary_edge_vertices(e)
    }
    fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.mesh.find_edge(a, b)
    }
    fn vertex_triangles(&self, v: VertexId) -> Vec<TriangleId> {
        self.mesh.vertex_triangles(v)
    }
    fn split_edge(&mut self, e: EdgeId) -> Result<EdgeSplitInfo, EditError> {
        if self.refuse_splits {
            return Err(EditError::Other);
        }
        self.mesh.split_edge(e)
    }
    fn merge_vertices_with(
        &mut self,
        keep: VertexId,
        discard: VertexId,
        t: f64,
        options: &MergeOptions,
    ) -> Result<MergeVerticesInfo, EditError> {
        self.merges.push((keep, discard));
        self.mesh.merge_vertices_with(keep, discard, t, options)
    }
    fn remove_triangle(&mut self, t: TriangleId) -> Result<(), EditError> {
        self.mesh.remove_triangle(t, true)
    }
    fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }
    fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }
}
