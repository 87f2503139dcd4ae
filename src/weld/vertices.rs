//! Welding a single pair of vertices.

use log::{debug, warn};

use crate::error::{EditError, WeldError};
use crate::mesh::{EdgeId, MergeOptions, MergeVerticesInfo, VertexId, WeldMesh};

/// How a vertex pair ended up welded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexWeld {
    /// The vertices were merged.
    Merged(MergeVerticesInfo),
    /// The collapse was refused by the mesh, so the triangles on the edge
    /// between the vertices were deleted instead.
    RemovedTriangles,
    /// A merge would create non-manifold geometry. Both vertices were moved
    /// to the weld point but remain separate.
    Moved,
}

/// Options for [`weld_vertex_pair`].
#[derive(Debug, Clone, PartialEq)]
pub struct VertexWeldOptions {
    /// Position of the welded vertex as `lerp(keep, discard, t)`.
    pub interpolation_t: f64,

    /// Whether two vertices without a shared neighbour may be merged into a
    /// bowtie vertex. When unset, such pairs are moved together instead.
    pub allow_bowtie: bool,
}

impl Default for VertexWeldOptions {
    fn default() -> Self {
        Self {
            interpolation_t: 0.0,
            allow_bowtie: false,
        }
    }
}

impl VertexWeldOptions {
    /// Set the interpolation parameter, clamped to [0, 1].
    pub fn with_interpolation(mut self, t: f64) -> Self {
        self.interpolation_t = t.clamp(0.0, 1.0);
        self
    }

    /// Set whether bowtie vertices may be created.
    pub fn with_bowtie(mut self, allow: bool) -> Self {
        self.allow_bowtie = allow;
        self
    }
}

/// Weld `discard` onto `keep`, placing the result at `lerp(keep, discard, t)`.
///
/// # Errors
///
/// - [`WeldError::CannotDeleteTriangle`] if the fallback triangle deletion
///   would leave the mesh empty.
/// - [`WeldError::Other`] if collapsing the edge between the vertices would
///   create non-manifold geometry, or for any other merge failure.
pub fn weld_vertex_pair<M: WeldMesh + ?Sized>(
    mesh: &mut M,
    keep: VertexId,
    discard: VertexId,
    options: &VertexWeldOptions,
) -> Result<VertexWeld, WeldError> {
    let t = options.interpolation_t.clamp(0.0, 1.0);
    let merge_options = MergeOptions::default().with_bowtie(options.allow_bowtie);
    match mesh.merge_vertices_with(keep, discard, t, &merge_options) {
        Ok(info) => Ok(VertexWeld::Merged(info)),
        Err(EditError::CollapseTriangle)
        | Err(EditError::CollapseQuad)
        | Err(EditError::FoundDuplicateTriangle) => {
            let eid = mesh.find_edge(keep, discard).ok_or(WeldError::CannotDeleteTriangle)?;
            remove_edge_triangles_if_not_last(mesh, eid)?;
            Ok(VertexWeld::RemovedTriangles)
        }
        Err(EditError::WouldCreateBowtie) => {
            move_together(mesh, keep, discard, t)?;
            warn!("{:?} and {:?} would form a bowtie, moved together", keep, discard);
            Ok(VertexWeld::Moved)
        }
        Err(EditError::InvalidNeighbourhood) => {
            if mesh.find_edge(keep, discard).is_some() {
                debug!("refusing collapse of {:?} and {:?}: non-manifold result", keep, discard);
                return Err(WeldError::Other);
            }
            move_together(mesh, keep, discard, t)?;
            warn!("{:?} and {:?} moved together without welding", keep, discard);
            Ok(VertexWeld::Moved)
        }
        Err(err) => {
            debug!("merge of {:?} into {:?} failed: {}", discard, keep, err);
            Err(WeldError::Other)
        }
    }
}

fn move_together<M: WeldMesh + ?Sized>(
    mesh: &mut M,
    keep: VertexId,
    discard: VertexId,
    t: f64,
) -> Result<(), WeldError> {
    let (Some(pk), Some(pd)) = (mesh.vertex_position(keep), mesh.vertex_position(discard)) else {
        return Err(WeldError::Other);
    };
    let target = pk + (pd - pk) * t;
    mesh.set_vertex_position(keep, target);
    mesh.set_vertex_position(discard, target);
    Ok(())
}

/// Delete the triangles on an edge unless they are the last in the mesh.
///
/// Used where the mesh refuses to collapse an isolated triangle or quad.
/// Vertices left without triangles are removed too.
///
/// # Errors
///
/// [`WeldError::CannotDeleteTriangle`] if the edge does not exist, if its
/// triangles are all that remain of the mesh, or if the mesh refuses a removal.
pub fn remove_edge_triangles_if_not_last<M: WeldMesh + ?Sized>(
    mesh: &mut M,
    eid: EdgeId,
) -> Result<(), WeldError> {
    let [a, b] = mesh
        .edge_triangles(eid)
        .ok_or(WeldError::CannotDeleteTriangle)?;
    let count = mesh.triangle_count();
    if !(count > 2 || (count > 1 && !b.is_valid())) {
        return Err(WeldError::CannotDeleteTriangle);
    }

    for tid in [a, b].into_iter().filter(|t| t.is_valid()) {
        mesh.remove_triangle(tid).map_err(|err| {
            debug!("removal of {:?} refused: {}", tid, err);
            WeldError::CannotDeleteTriangle
        })?;
    }
    Ok(())
}
