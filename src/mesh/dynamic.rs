//! Dynamic indexed triangle mesh.
//!
//! [`DynamicMesh`] stores vertices, edges and triangles in slot vectors with
//! explicit edge records, so local edits (edge split, vertex merge, triangle
//! removal) run in time proportional to the one-ring they touch.
//!
//! # Structure
//!
//! - Each **vertex** stores its position and the list of edges incident to it
//! - Each **edge** stores its two vertices and up to two triangles; a boundary
//!   edge has an invalid second triangle
//! - Each **triangle** stores its three vertices in winding order and the
//!   three edges `(v0, v1)`, `(v1, v2)`, `(v2, v0)`
//!
//! Removed elements leave an empty slot behind. Slots are never reused, which
//! keeps ids held by callers (for example in an [`EdgeSpan`](crate::weld::EdgeSpan))
//! safe to test for staleness.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;

use super::index::{EdgeId, TriangleId, VertexId};
use crate::error::{EditError, MeshError, Result};

#[derive(Debug, Clone)]
struct VertexRecord {
    position: Point3<f64>,
    edges: Vec<EdgeId>,
}

#[derive(Debug, Clone, Copy)]
struct EdgeRecord {
    vertices: [VertexId; 2],
    /// Slot 0 is always valid for a live edge.
    triangles: [TriangleId; 2],
}

#[derive(Debug, Clone, Copy)]
struct TriangleRecord {
    vertices: [VertexId; 3],
    edges: [EdgeId; 3],
}

/// Result of a successful [`DynamicMesh::split_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSplitInfo {
    /// The edge's vertices before the split, `[a, b]`. After the split the
    /// original edge id connects `a` to the new vertex.
    pub original_vertices: [VertexId; 2],
    /// The vertex inserted at the edge midpoint.
    pub new_vertex: VertexId,
    /// The edge connecting the new vertex to `b`.
    pub new_edge: EdgeId,
}

/// Result of a successful [`DynamicMesh::merge_vertices`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeVerticesInfo {
    /// The surviving vertex.
    pub kept: VertexId,
    /// The vertex that was merged away.
    pub removed: VertexId,
    /// Edges that no longer exist after the merge.
    pub removed_edges: Vec<EdgeId>,
    /// Triangles that collapsed during the merge.
    pub removed_triangles: Vec<TriangleId>,
    /// Vertices left without any edge by the collapse and removed with it.
    pub removed_isolated: Vec<VertexId>,
}

/// Options for [`DynamicMesh::merge_vertices_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Allow merging two boundary vertices that share no neighbour, which
    /// joins their triangle fans at a single bowtie vertex. Default: true.
    pub allow_bowtie: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { allow_bowtie: true }
    }
}

impl MergeOptions {
    /// Set whether bowtie vertices may be created.
    pub fn with_bowtie(mut self, allow: bool) -> Self {
        self.allow_bowtie = allow;
        self
    }
}

/// An indexed triangle mesh supporting local topological edits.
#[derive(Debug, Clone, Default)]
pub struct DynamicMesh {
    vertices: Vec<Option<VertexRecord>>,
    edges: Vec<Option<EdgeRecord>>,
    triangles: Vec<Option<TriangleRecord>>,
    vertex_count: usize,
    edge_count: usize,
    triangle_count: usize,
}

impl DynamicMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_triangles: usize) -> Self {
        // Euler: E ~ 3F/2 for closed meshes, slightly more with boundary
        let num_edges = num_triangles * 3 / 2 + num_triangles / 4;
        Self {
            vertices: Vec::with_capacity(num_vertices),
            edges: Vec::with_capacity(num_edges),
            triangles: Vec::with_capacity(num_triangles),
            ..Self::default()
        }
    }

    // ==================== Accessors ====================

    /// Number of live vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of live edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of live triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    fn vertex_record(&self, v: VertexId) -> Option<&VertexRecord> {
        self.vertices.get(v.index())?.as_ref()
    }

    fn vertex_record_mut(&mut self, v: VertexId) -> Option<&mut VertexRecord> {
        self.vertices.get_mut(v.index())?.as_mut()
    }

    fn edge_record(&self, e: EdgeId) -> Option<&EdgeRecord> {
        self.edges.get(e.index())?.as_ref()
    }

    fn edge_record_mut(&mut self, e: EdgeId) -> Option<&mut EdgeRecord> {
        self.edges.get_mut(e.index())?.as_mut()
    }

    fn triangle_record(&self, t: TriangleId) -> Option<&TriangleRecord> {
        self.triangles.get(t.index())?.as_ref()
    }

    fn triangle_record_mut(&mut self, t: TriangleId) -> Option<&mut TriangleRecord> {
        self.triangles.get_mut(t.index())?.as_mut()
    }

    /// Check whether `v` names a live vertex.
    #[inline]
    pub fn is_vertex(&self, v: VertexId) -> bool {
        self.vertex_record(v).is_some()
    }

    /// Check whether `e` names a live edge.
    #[inline]
    pub fn is_edge(&self, e: EdgeId) -> bool {
        self.edge_record(e).is_some()
    }

    /// Check whether `t` names a live triangle.
    #[inline]
    pub fn is_triangle(&self, t: TriangleId) -> bool {
        self.triangle_record(t).is_some()
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> Option<Point3<f64>> {
        self.vertex_record(v).map(|r| r.position)
    }

    /// Set the position of a vertex. Returns false if the vertex does not exist.
    pub fn set_position(&mut self, v: VertexId, position: Point3<f64>) -> bool {
        match self.vertex_record_mut(v) {
            Some(record) => {
                record.position = position;
                true
            }
            None => false,
        }
    }

    /// The two vertices of an edge, in storage order.
    pub fn edge_vertices(&self, e: EdgeId) -> Option<[VertexId; 2]> {
        self.edge_record(e).map(|r| r.vertices)
    }

    /// The triangles of an edge. The second is invalid for boundary edges.
    pub fn edge_triangles(&self, e: EdgeId) -> Option<[TriangleId; 2]> {
        self.edge_record(e).map(|r| r.triangles)
    }

    /// The endpoint of `e` that is not `v`.
    pub fn edge_other_vertex(&self, e: EdgeId, v: VertexId) -> Option<VertexId> {
        let [a, b] = self.edge_vertices(e)?;
        if a == v {
            Some(b)
        } else if b == v {
            Some(a)
        } else {
            None
        }
    }

    /// The three vertices of a triangle in winding order.
    pub fn triangle_vertices(&self, t: TriangleId) -> Option<[VertexId; 3]> {
        self.triangle_record(t).map(|r| r.vertices)
    }

    /// The three edges of a triangle, `(v0, v1)`, `(v1, v2)`, `(v2, v0)`.
    pub fn triangle_edges(&self, t: TriangleId) -> Option<[EdgeId; 3]> {
        self.triangle_record(t).map(|r| r.edges)
    }

    /// Edges incident to a vertex. Empty for missing vertices.
    pub fn vertex_edges(&self, v: VertexId) -> &[EdgeId] {
        self.vertex_record(v).map_or(&[], |r| r.edges.as_slice())
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_edges(v)
            .iter()
            .filter_map(move |&e| self.edge_other_vertex(e, v))
    }

    /// Triangles incident to a vertex, sorted and without duplicates.
    pub fn vertex_triangles(&self, v: VertexId) -> Vec<TriangleId> {
        let mut tris: Vec<TriangleId> = self
            .vertex_edges(v)
            .iter()
            .filter_map(|&e| self.edge_triangles(e))
            .flatten()
            .filter(|t| t.is_valid())
            .collect();
        tris.sort_unstable();
        tris.dedup();
        tris
    }

    /// Find the edge connecting two vertices.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.vertex_edges(a)
            .iter()
            .copied()
            .find(|&e| self.edge_other_vertex(e, a) == Some(b))
    }

    /// Check if an edge has exactly one incident triangle.
    pub fn is_boundary_edge(&self, e: EdgeId) -> bool {
        self.edge_record(e)
            .map_or(false, |r| r.triangles[0].is_valid() && !r.triangles[1].is_valid())
    }

    /// Check if a vertex lies on the boundary. Isolated vertices count as boundary.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        let edges = self.vertex_edges(v);
        edges.is_empty() || edges.iter().any(|&e| self.is_boundary_edge(e))
    }

    /// The vertices of a boundary edge in the winding order of its triangle.
    pub fn oriented_boundary_edge_vertices(&self, e: EdgeId) -> Option<[VertexId; 2]> {
        if !self.is_boundary_edge(e) {
            return None;
        }
        let t = self.edge_record(e)?.triangles[0];
        let tri = self.triangle_record(t)?;
        let i = tri.edges.iter().position(|&x| x == e)?;
        Some([tri.vertices[i], tri.vertices[(i + 1) % 3]])
    }

    /// Whether triangle `t` traverses `a` then `b` in its winding order.
    fn has_directed_edge(&self, t: TriangleId, a: VertexId, b: VertexId) -> bool {
        self.triangle_record(t).map_or(false, |tri| {
            (0..3).any(|i| tri.vertices[i] == a && tri.vertices[(i + 1) % 3] == b)
        })
    }

    /// Iterate over live vertex ids.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_some())
            .map(|(i, _)| VertexId::new(i))
    }

    /// Iterate over live edge ids.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_some())
            .map(|(i, _)| EdgeId::new(i))
    }

    /// Iterate over live triangle ids.
    pub fn triangle_ids(&self) -> impl Iterator<Item = TriangleId> + '_ {
        self.triangles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_some())
            .map(|(i, _)| TriangleId::new(i))
    }

    // ==================== Geometry ====================

    /// Squared length of an edge.
    pub fn edge_length_squared(&self, e: EdgeId) -> Option<f64> {
        let [a, b] = self.edge_vertices(e)?;
        Some((self.position(b)? - self.position(a)?).norm_squared())
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut positions = self.vertices.iter().flatten().map(|v| v.position);
        let first = positions.next()?;
        Some(positions.fold((first, first), |(mut min, mut max), p| {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
            (min, max)
        }))
    }

    /// Number of boundary edges.
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_ids().filter(|&e| self.is_boundary_edge(e)).count()
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its ID.
    pub fn append_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Some(VertexRecord {
            position,
            edges: Vec::new(),
        }));
        self.vertex_count += 1;
        id
    }

    /// Add a triangle over three existing vertices.
    ///
    /// Fails if a vertex is missing, the triangle is degenerate, or one of its
    /// edges already has two triangles.
    pub fn append_triangle(&mut self, tri: [VertexId; 3]) -> Result<TriangleId> {
        let [a, b, c] = tri;
        for v in tri {
            if !self.is_vertex(v) {
                return Err(MeshError::InvalidVertex(v));
            }
        }
        if a == b || b == c || a == c {
            return Err(MeshError::DegenerateTriangle(a, b, c));
        }
        for i in 0..3 {
            let (v0, v1) = (tri[i], tri[(i + 1) % 3]);
            if let Some(e) = self.find_edge(v0, v1) {
                if self.edge_triangles(e).map_or(false, |t| t[1].is_valid()) {
                    return Err(MeshError::NonManifoldEdge { v0, v1 });
                }
            }
        }

        let id = TriangleId::new(self.triangles.len());
        let mut edges = [EdgeId::invalid(); 3];
        for (i, slot) in edges.iter_mut().enumerate() {
            let (v0, v1) = (tri[i], tri[(i + 1) % 3]);
            let e = match self.find_edge(v0, v1) {
                Some(e) => e,
                None => self.alloc_edge(v0, v1),
            };
            self.attach_triangle(e, id);
            *slot = e;
        }
        self.triangles.push(Some(TriangleRecord {
            vertices: tri,
            edges,
        }));
        self.triangle_count += 1;
        Ok(id)
    }

    fn alloc_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(Some(EdgeRecord {
            vertices: [a, b],
            triangles: [TriangleId::invalid(); 2],
        }));
        self.edge_count += 1;
        for v in [a, b] {
            if let Some(record) = self.vertex_record_mut(v) {
                record.edges.push(id);
            }
        }
        id
    }

    fn delete_edge(&mut self, e: EdgeId) {
        let Some(record) = self.edges.get_mut(e.index()).and_then(Option::take) else {
            return;
        };
        self.edge_count -= 1;
        for v in record.vertices {
            self.detach_edge_from_vertex(v, e);
        }
    }

    fn delete_vertex(&mut self, v: VertexId) {
        if self.vertices.get_mut(v.index()).and_then(Option::take).is_some() {
            self.vertex_count -= 1;
        }
    }

    fn detach_edge_from_vertex(&mut self, v: VertexId, e: EdgeId) {
        if let Some(record) = self.vertex_record_mut(v) {
            record.edges.retain(|&x| x != e);
        }
    }

    fn attach_triangle(&mut self, e: EdgeId, t: TriangleId) {
        if let Some(record) = self.edge_record_mut(e) {
            if !record.triangles[0].is_valid() {
                record.triangles[0] = t;
            } else {
                debug_assert!(!record.triangles[1].is_valid(), "edge {:?} is full", e);
                record.triangles[1] = t;
            }
        }
    }

    /// Remove `t` from the edge. Returns true when the edge has no triangles left.
    fn detach_triangle(&mut self, e: EdgeId, t: TriangleId) -> bool {
        let Some(record) = self.edge_record_mut(e) else {
            return false;
        };
        if record.triangles[0] == t {
            record.triangles[0] = record.triangles[1];
            record.triangles[1] = TriangleId::invalid();
        } else if record.triangles[1] == t {
            record.triangles[1] = TriangleId::invalid();
        }
        !record.triangles[0].is_valid()
    }

    fn replace_triangle(&mut self, e: EdgeId, old: TriangleId, new: TriangleId) {
        if let Some(record) = self.edge_record_mut(e) {
            for slot in record.triangles.iter_mut() {
                if *slot == old {
                    *slot = new;
                }
            }
        }
    }

    // ==================== Edits ====================

    /// Remove a triangle.
    ///
    /// Edges left without triangles are removed. When `remove_isolated_vertices`
    /// is set, the triangle's vertices that end up with no edges are removed too.
    pub fn remove_triangle(
        &mut self,
        t: TriangleId,
        remove_isolated_vertices: bool,
    ) -> std::result::Result<(), EditError> {
        self.remove_triangle_inner(t, remove_isolated_vertices)
            .map(|_| ())
    }

    /// Returns the edges removed along with the triangle.
    fn remove_triangle_inner(
        &mut self,
        t: TriangleId,
        remove_isolated_vertices: bool,
    ) -> std::result::Result<Vec<EdgeId>, EditError> {
        let record = self
            .triangles
            .get_mut(t.index())
            .and_then(Option::take)
            .ok_or(EditError::NotATriangle)?;
        self.triangle_count -= 1;

        let mut removed_edges = Vec::new();
        for e in record.edges {
            if self.detach_triangle(e, t) {
                self.delete_edge(e);
                removed_edges.push(e);
            }
        }
        if remove_isolated_vertices {
            for v in record.vertices {
                if self.vertex_edges(v).is_empty() {
                    self.delete_vertex(v);
                }
            }
        }
        Ok(removed_edges)
    }

    /// Split an edge at its midpoint.
    ///
    /// For edge `(a, b)` the original id is kept for `(a, mid)` and a new edge
    /// `(mid, b)` is created. Each incident triangle `(a, b, c)` is replaced by
    /// `(a, mid, c)` and `(mid, b, c)` with the same winding.
    pub fn split_edge(&mut self, e: EdgeId) -> std::result::Result<EdgeSplitInfo, EditError> {
        let edge = *self.edge_record(e).ok_or(EditError::NotAnEdge)?;
        let [a, b] = edge.vertices;
        let (pa, pb) = match (self.position(a), self.position(b)) {
            (Some(pa), Some(pb)) => (pa, pb),
            _ => return Err(EditError::Other),
        };
        let incident: Vec<(TriangleId, TriangleRecord)> = edge
            .triangles
            .iter()
            .filter(|t| t.is_valid())
            .map(|&t| self.triangle_record(t).map(|r| (t, *r)).ok_or(EditError::Other))
            .collect::<std::result::Result<_, _>>()?;

        let mid = self.append_vertex(nalgebra::center(&pa, &pb));

        // Original edge becomes (a, mid)
        self.detach_edge_from_vertex(b, e);
        if let Some(record) = self.edge_record_mut(e) {
            record.vertices = [a, mid];
            record.triangles = [TriangleId::invalid(); 2];
        }
        if let Some(record) = self.vertex_record_mut(mid) {
            record.edges.push(e);
        }
        let new_edge = self.alloc_edge(mid, b);

        for (t, tri) in incident {
            let Some(i) = tri.edges.iter().position(|&x| x == e) else {
                continue;
            };
            let (p, q, r) = (tri.vertices[i], tri.vertices[(i + 1) % 3], tri.vertices[(i + 2) % 3]);
            let (e_qr, e_rp) = (tri.edges[(i + 1) % 3], tri.edges[(i + 2) % 3]);
            let (e_pm, e_mq) = if p == a { (e, new_edge) } else { (new_edge, e) };
            let e_mr = self.alloc_edge(mid, r);

            let nt = TriangleId::new(self.triangles.len());
            self.triangles.push(Some(TriangleRecord {
                vertices: [mid, q, r],
                edges: [e_mq, e_qr, e_mr],
            }));
            self.triangle_count += 1;
            if let Some(record) = self.triangle_record_mut(t) {
                *record = TriangleRecord {
                    vertices: [p, mid, r],
                    edges: [e_pm, e_mr, e_rp],
                };
            }

            self.replace_triangle(e_qr, t, nt);
            self.attach_triangle(e_pm, t);
            self.attach_triangle(e_mq, nt);
            self.attach_triangle(e_mr, t);
            self.attach_triangle(e_mr, nt);
        }

        Ok(EdgeSplitInfo {
            original_vertices: [a, b],
            new_vertex: mid,
            new_edge,
        })
    }

    /// Merge `discard` into `keep`.
    ///
    /// `keep` moves to `lerp(keep, discard, t)`, every triangle of `discard` is
    /// re-pointed to `keep`, and edges that become coincident are unified with
    /// the keep-side edge id surviving. If the two vertices share an edge this
    /// is an edge collapse and the triangles on that edge are removed.
    ///
    /// Nothing is modified when an error is returned.
    pub fn merge_vertices(
        &mut self,
        keep: VertexId,
        discard: VertexId,
        t: f64,
    ) -> std::result::Result<MergeVerticesInfo, EditError> {
        self.merge_vertices_with(keep, discard, t, &MergeOptions::default())
    }

    /// [`merge_vertices`](Self::merge_vertices) with explicit options.
    ///
    /// With `allow_bowtie` unset, merging two boundary vertices that have no
    /// edge or neighbour in common fails with [`EditError::WouldCreateBowtie`].
    pub fn merge_vertices_with(
        &mut self,
        keep: VertexId,
        discard: VertexId,
        t: f64,
        options: &MergeOptions,
    ) -> std::result::Result<MergeVerticesInfo, EditError> {
        if !self.is_vertex(keep) || !self.is_vertex(discard) {
            return Err(EditError::NotAVertex);
        }
        if keep == discard {
            return Err(EditError::Other);
        }

        let removed_triangles = match self.find_edge(keep, discard) {
            Some(e) => self.check_collapse(e)?,
            None => {
                if !self.is_boundary_vertex(keep) || !self.is_boundary_vertex(discard) {
                    return Err(EditError::InvalidNeighbourhood);
                }
                if !options.allow_bowtie && self.would_create_bowtie(keep, discard) {
                    return Err(EditError::WouldCreateBowtie);
                }
                Vec::new()
            }
        };
        self.check_merged_edges(keep, discard, &removed_triangles)?;
        self.check_duplicate_triangles(keep, discard, &removed_triangles)?;

        let (pk, pd) = match (self.position(keep), self.position(discard)) {
            (Some(pk), Some(pd)) => (pk, pd),
            _ => return Err(EditError::Other),
        };
        let opposite: Vec<VertexId> = removed_triangles
            .iter()
            .filter_map(|&tid| self.triangle_vertices(tid))
            .flatten()
            .filter(|&v| v != keep && v != discard)
            .collect();

        let mut info = MergeVerticesInfo {
            kept: keep,
            removed: discard,
            removed_triangles: removed_triangles.clone(),
            ..MergeVerticesInfo::default()
        };
        for &tid in &removed_triangles {
            let edges = self.remove_triangle_inner(tid, false)?;
            info.removed_edges.extend(edges);
        }

        for e in self.vertex_edges(discard).to_vec() {
            let Some(other) = self.edge_other_vertex(e, discard) else {
                continue;
            };
            let tris: Vec<TriangleId> = self
                .edge_triangles(e)
                .into_iter()
                .flatten()
                .filter(|t| t.is_valid())
                .collect();

            match self.find_edge(keep, other) {
                Some(existing) => {
                    for &tid in &tris {
                        if let Some(tri) = self.triangle_record_mut(tid) {
                            for v in tri.vertices.iter_mut() {
                                if *v == discard {
                                    *v = keep;
                                }
                            }
                            for x in tri.edges.iter_mut() {
                                if *x == e {
                                    *x = existing;
                                }
                            }
                        }
                        self.attach_triangle(existing, tid);
                    }
                    self.delete_edge(e);
                    info.removed_edges.push(e);
                }
                None => {
                    self.detach_edge_from_vertex(discard, e);
                    if let Some(record) = self.edge_record_mut(e) {
                        for v in record.vertices.iter_mut() {
                            if *v == discard {
                                *v = keep;
                            }
                        }
                    }
                    if let Some(record) = self.vertex_record_mut(keep) {
                        record.edges.push(e);
                    }
                    for &tid in &tris {
                        if let Some(tri) = self.triangle_record_mut(tid) {
                            for v in tri.vertices.iter_mut() {
                                if *v == discard {
                                    *v = keep;
                                }
                            }
                        }
                    }
                }
            }
        }

        self.delete_vertex(discard);
        self.set_position(keep, pk + (pd - pk) * t);

        for v in opposite {
            if self.is_vertex(v) && self.vertex_edges(v).is_empty() {
                self.delete_vertex(v);
                info.removed_isolated.push(v);
            }
        }

        Ok(info)
    }

    /// True if two unconnected vertices have no neighbour in common, so that
    /// merging them would pinch their fans together at one vertex.
    fn would_create_bowtie(&self, a: VertexId, b: VertexId) -> bool {
        let around_b: HashSet<VertexId> = self.vertex_neighbors(b).collect();
        !self.vertex_neighbors(a).any(|n| around_b.contains(&n))
    }

    /// Triangles removed by collapsing `e`, or the reason the collapse is refused.
    fn check_collapse(&self, e: EdgeId) -> std::result::Result<Vec<TriangleId>, EditError> {
        let tris: Vec<TriangleId> = self
            .edge_triangles(e)
            .ok_or(EditError::NotAnEdge)?
            .into_iter()
            .filter(|t| t.is_valid())
            .collect();

        let outer_edges: Vec<EdgeId> = tris
            .iter()
            .filter_map(|&t| self.triangle_edges(t))
            .flatten()
            .filter(|&x| x != e)
            .collect();
        if outer_edges.iter().all(|&x| self.is_boundary_edge(x)) {
            return Err(if tris.len() == 1 {
                EditError::CollapseTriangle
            } else {
                EditError::CollapseQuad
            });
        }
        Ok(tris)
    }

    /// Edges that become coincident must stay manifold and consistently wound.
    fn check_merged_edges(
        &self,
        keep: VertexId,
        discard: VertexId,
        removed: &[TriangleId],
    ) -> std::result::Result<(), EditError> {
        let remaining = |v: VertexId| -> HashMap<VertexId, Vec<TriangleId>> {
            self.vertex_edges(v)
                .iter()
                .filter_map(|&e| {
                    let other = self.edge_other_vertex(e, v)?;
                    if other == keep || other == discard {
                        return None;
                    }
                    let tris: Vec<TriangleId> = self
                        .edge_triangles(e)?
                        .into_iter()
                        .filter(|t| t.is_valid() && !removed.contains(t))
                        .collect();
                    (!tris.is_empty()).then_some((other, tris))
                })
                .collect()
        };

        let keep_side = remaining(keep);
        let discard_side = remaining(discard);
        for (other, keep_tris) in &keep_side {
            let Some(discard_tris) = discard_side.get(other) else {
                continue;
            };
            if keep_tris.len() + discard_tris.len() > 2 {
                return Err(EditError::InvalidNeighbourhood);
            }
            let keep_dir = self.has_directed_edge(keep_tris[0], keep, *other);
            let discard_dir = self.has_directed_edge(discard_tris[0], discard, *other);
            if keep_dir == discard_dir {
                return Err(EditError::InvalidNeighbourhood);
            }
        }
        Ok(())
    }

    fn check_duplicate_triangles(
        &self,
        keep: VertexId,
        discard: VertexId,
        removed: &[TriangleId],
    ) -> std::result::Result<(), EditError> {
        let sorted = |mut vs: [VertexId; 3]| {
            vs.sort_unstable();
            vs
        };
        let keep_sets: HashSet<[VertexId; 3]> = self
            .vertex_triangles(keep)
            .into_iter()
            .filter(|t| !removed.contains(t))
            .filter_map(|t| self.triangle_vertices(t))
            .map(sorted)
            .collect();

        let duplicate = self
            .vertex_triangles(discard)
            .into_iter()
            .filter(|t| !removed.contains(t))
            .filter_map(|t| self.triangle_vertices(t))
            .map(|vs| sorted(vs.map(|v| if v == discard { keep } else { v })))
            .any(|vs| keep_sets.contains(&vs));
        if duplicate {
            return Err(EditError::FoundDuplicateTriangle);
        }
        Ok(())
    }

    // ==================== Validation ====================

    /// Check that all cross references between vertices, edges and triangles agree.
    pub fn check_validity(&self) -> Result<()> {
        let fail = |msg: String| Err(MeshError::InvalidState(msg));

        for t in self.triangle_ids() {
            let Some(tri) = self.triangle_record(t) else {
                continue;
            };
            for i in 0..3 {
                let (v0, v1, e) = (tri.vertices[i], tri.vertices[(i + 1) % 3], tri.edges[i]);
                if !self.is_vertex(v0) {
                    return fail(format!("{:?} references missing {:?}", t, v0));
                }
                let Some(edge) = self.edge_record(e) else {
                    return fail(format!("{:?} references missing {:?}", t, e));
                };
                let mut ends = edge.vertices;
                ends.sort_unstable();
                let mut expected = [v0, v1];
                expected.sort_unstable();
                if ends != expected {
                    return fail(format!("{:?} side {} does not match {:?}", t, i, e));
                }
                if !edge.triangles.contains(&t) {
                    return fail(format!("{:?} is not linked back from {:?}", t, e));
                }
            }
        }

        for e in self.edge_ids() {
            let Some(edge) = self.edge_record(e) else {
                continue;
            };
            if !edge.triangles[0].is_valid() {
                return fail(format!("{:?} has no triangles", e));
            }
            for v in edge.vertices {
                if !self.vertex_edges(v).contains(&e) {
                    return fail(format!("{:?} is not linked back from {:?}", e, v));
                }
            }
            for t in edge.triangles.iter().filter(|t| t.is_valid()) {
                if !self.triangle_edges(*t).map_or(false, |es| es.contains(&e)) {
                    return fail(format!("{:?} lists {:?} which does not use it", e, t));
                }
            }
        }

        for v in self.vertex_ids() {
            for &e in self.vertex_edges(v) {
                if self.edge_other_vertex(e, v).is_none() {
                    return fail(format!("{:?} lists foreign {:?}", v, e));
                }
            }
        }

        if self.vertex_ids().count() != self.vertex_count
            || self.edge_ids().count() != self.edge_count
            || self.triangle_ids().count() != self.triangle_count
        {
            return fail("element counts are out of sync".to_string());
        }
        Ok(())
    }
}
