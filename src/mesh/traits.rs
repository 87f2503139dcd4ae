//! The mesh interface consumed by the weld operations.

use nalgebra::Point3;

use super::dynamic::{DynamicMesh, EdgeSplitInfo, MergeOptions, MergeVerticesInfo};
use super::index::{EdgeId, TriangleId, VertexId};
use crate::error::EditError;

/// Queries and local edits a mesh must provide to be welded.
///
/// The weld algorithms only ever talk to the mesh through this trait, so a
/// wrapper can intercept edits (for change tracking, or to inject failures in
/// tests) by delegating to an inner mesh.
pub trait WeldMesh {
    /// Whether `v` names a live vertex.
    fn is_vertex(&self, v: VertexId) -> bool;

    /// Whether `e` names a live edge.
    fn is_edge(&self, e: EdgeId) -> bool;

    /// Whether `e` has exactly one incident triangle.
    fn is_boundary_edge(&self, e: EdgeId) -> bool;

    /// Position of a vertex.
    fn vertex_position(&self, v: VertexId) -> Option<Point3<f64>>;

    /// Move a vertex. Returns false if the vertex does not exist.
    fn set_vertex_position(&mut self, v: VertexId, position: Point3<f64>) -> bool;

    /// The two vertices of an edge, in storage order.
    fn edge_vertices(&self, e: EdgeId) -> Option<[VertexId; 2]>;

    /// The triangles of an edge. The second is invalid for boundary edges.
    fn edge_triangles(&self, e: EdgeId) -> Option<[TriangleId; 2]>;

    /// A boundary edge's vertices in the winding order of its triangle.
    fn oriented_boundary_edge_vertices(&self, e: EdgeId) -> Option<[VertexId; 2]>;

    /// The edge connecting two vertices, if any.
    fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId>;

    /// Triangles incident to a vertex.
    fn vertex_triangles(&self, v: VertexId) -> Vec<TriangleId>;

    /// Squared length of an edge.
    fn edge_length_squared(&self, e: EdgeId) -> Option<f64> {
        let [a, b] = self.edge_vertices(e)?;
        Some((self.vertex_position(b)? - self.vertex_position(a)?).norm_squared())
    }

    /// Split an edge at its midpoint.
    fn split_edge(&mut self, e: EdgeId) -> Result<EdgeSplitInfo, EditError>;

    /// Merge `discard` into `keep`, placing `keep` at `lerp(keep, discard, t)`.
    fn merge_vertices_with(
        &mut self,
        keep: VertexId,
        discard: VertexId,
        t: f64,
        options: &MergeOptions,
    ) -> Result<MergeVerticesInfo, EditError>;

    /// [`merge_vertices_with`](Self::merge_vertices_with) using default options.
    fn merge_vertices(
        &mut self,
        keep: VertexId,
        discard: VertexId,
        t: f64,
    ) -> Result<MergeVerticesInfo, EditError> {
        self.merge_vertices_with(keep, discard, t, &MergeOptions::default())
    }

    /// Remove a triangle along with any vertices it leaves isolated.
    fn remove_triangle(&mut self, t: TriangleId) -> Result<(), EditError>;

    /// Number of live vertices.
    fn vertex_count(&self) -> usize;

    /// Number of live triangles.
    fn triangle_count(&self) -> usize;
}

impl WeldMesh for DynamicMesh {
    fn is_vertex(&self, v: VertexId) -> bool {
        DynamicMesh::is_vertex(self, v)
    }

    fn is_edge(&self, e: EdgeId) -> bool {
        DynamicMesh::is_edge(self, e)
    }

    fn is_boundary_edge(&self, e: EdgeId) -> bool {
        DynamicMesh::is_boundary_edge(self, e)
    }

    fn vertex_position(&self, v: VertexId) -> Option<Point3<f64>> {
        self.position(v)
    }

    fn set_vertex_position(&mut self, v: VertexId, position: Point3<f64>) -> bool {
        self.set_position(v, position)
    }

    fn edge_vertices(&self, e: EdgeId) -> Option<[VertexId; 2]> {
        DynamicMesh::edge_vertices(self, e)
    }

    fn edge_triangles(&self, e: EdgeId) -> Option<[TriangleId; 2]> {
        DynamicMesh::edge_triangles(self, e)
    }

    fn oriented_boundary_edge_vertices(&self, e: EdgeId) -> Option<[VertexId; 2]> {
        DynamicMesh::oriented_boundary_edge_vertices(self, e)
    }

    fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        DynamicMesh::find_edge(self, a, b)
    }

    fn vertex_triangles(&self, v: VertexId) -> Vec<TriangleId> {
        DynamicMesh::vertex_triangles(self, v)
    }

    fn split_edge(&mut self, e: EdgeId) -> Result<EdgeSplitInfo, EditError> {
        DynamicMesh::split_edge(self, e)
    }

    fn edge_length_squared(&self, e: EdgeId) -> Option<f64> {
        DynamicMesh::edge_length_squared(self, e)
    }

    fn merge_vertices_with(
        &mut self,
        keep: VertexId,
        discard: VertexId,
        t: f64,
        options: &MergeOptions,
    ) -> Result<MergeVerticesInfo, EditError> {
        DynamicMesh::merge_vertices_with(self, keep, discard, t, options)
    }

    fn remove_triangle(&mut self, t: TriangleId) -> Result<(), EditError> {
        DynamicMesh::remove_triangle(self, t, true)
    }

    fn vertex_count(&self) -> usize {
        DynamicMesh::vertex_count(self)
    }

    fn triangle_count(&self) -> usize {
        DynamicMesh::triangle_count(self)
    }
}
