//! Welding two boundary edge spans into a single seam.
//!
//! [`WeldEdgeSequence`] merges the vertices of one span (the discard span)
//! into the vertices of another (the keep span). A weld runs in three stages:
//!
//! 1. **Validation**: every edge of both spans must be a boundary edge, and
//!    both spans are oriented to follow their boundary's winding.
//! 2. **Equalization**: the shorter span is split until both have the same
//!    number of vertices (see [`equalize_span_lengths`]).
//! 3. **Welding**: vertex pairs are merged walking the keep span forward and
//!    the discard span backward, since two boundaries facing each other wind
//!    in opposite directions.
//!
//! # Adjacency hazards
//!
//! When a pair of vertices is already joined by an edge, a triangle bridges
//! the two spans at that point and merging the pair collapses it. Doing so can
//! disturb the next pair, so the next pair is merged first when it is not
//! bridged itself. Collapses the mesh refuses (isolated triangles and quads)
//! are carried out by deleting the bridging triangles directly, which requires
//! [`WeldOptions::allow_intermediate_triangle_deletion`].
//!
//! Merges the mesh rejects as non-manifold either abort the weld or, with
//! [`WeldOptions::allow_failed_merge`], move both vertices to the weld point
//! and record the adjacent edges in
//! [`unmerged_edge_pairs`](WeldEdgeSequence::unmerged_edge_pairs).
//!
//! # Example
//!
//! ```
//! use seamweld::mesh::{build_from_triangles, VertexId};
//! use seamweld::weld::{EdgeSpan, WeldEdgeSequence, WeldOptions};
//! use nalgebra::Point3;
//!
//! // Two triangles facing each other across a gap
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, -1.0, 0.0),
//!     Point3::new(0.0, 0.1, 0.0),
//!     Point3::new(1.0, 0.1, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = [[0, 2, 1], [3, 4, 5]];
//! let mut mesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! let keep = EdgeSpan::from_vertices(&mesh, &[VertexId::new(1), VertexId::new(0)]).unwrap();
//! let discard = EdgeSpan::from_vertices(&mesh, &[VertexId::new(3), VertexId::new(4)]).unwrap();
//!
//! let mut welder = WeldEdgeSequence::new(&mut mesh, discard, keep)
//!     .with_options(WeldOptions::default().with_interpolation(0.5));
//! welder.weld().unwrap();
//! assert!(welder.unmerged_edge_pairs().is_empty());
//! drop(welder);
//!
//! assert_eq!(mesh.vertex_count(), 4);
//! ```

use log::{debug, info, warn};

use super::equalize::equalize_span_lengths;
use super::span::EdgeSpan;
use super::vertices::remove_edge_triangles_if_not_last;
use crate::error::{EdgePair, EditError, WeldError};
use crate::mesh::{VertexId, WeldMesh};

/// Options controlling how a weld handles difficult topology.
#[derive(Debug, Clone, PartialEq)]
pub struct WeldOptions {
    /// Position of each welded vertex as `lerp(keep, discard, t)`.
    /// 0.0 keeps the keep span in place, 1.0 moves it onto the discard span.
    pub interpolation_t: f64,

    /// Whether triangles bridging the two spans may be deleted.
    pub allow_intermediate_triangle_deletion: bool,

    /// Whether a merge rejected as non-manifold may fall back to moving the
    /// two vertices together without merging them.
    pub allow_failed_merge: bool,
}

impl Default for WeldOptions {
    fn default() -> Self {
        Self {
            interpolation_t: 0.0,
            allow_intermediate_triangle_deletion: false,
            allow_failed_merge: false,
        }
    }
}

impl WeldOptions {
    /// Create options with the specified interpolation parameter, clamped to [0, 1].
    pub fn with_interpolation(mut self, t: f64) -> Self {
        self.interpolation_t = t.clamp(0.0, 1.0);
        self
    }

    /// Set whether bridging triangles may be deleted.
    pub fn with_triangle_deletion(mut self, allow: bool) -> Self {
        self.allow_intermediate_triangle_deletion = allow;
        self
    }

    /// Set whether rejected merges fall back to moving the vertices together.
    pub fn with_failed_merge(mut self, allow: bool) -> Self {
        self.allow_failed_merge = allow;
        self
    }

    /// Options that accept every fallback, as used for interactive edge welds.
    pub fn permissive() -> Self {
        Self::default()
            .with_triangle_deletion(true)
            .with_failed_merge(true)
    }
}

/// Progress of a [`WeldEdgeSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeldStage {
    /// `weld` has not been called yet.
    Init,
    /// Checking that both spans lie on the boundary.
    ValidatingInput,
    /// Splitting edges so both spans have the same length.
    EqualizingSpans,
    /// Merging vertex pairs.
    Welding,
    /// The weld completed.
    Done,
    /// The weld stopped with an error. Edits made before the failure remain.
    Failed(WeldError),
}

/// A request to weld one boundary span onto another.
///
/// The request borrows the mesh mutably for its whole lifetime. A request can
/// be run once; create a new one to retry.
pub struct WeldEdgeSequence<'a, M: WeldMesh + ?Sized> {
    mesh: &'a mut M,
    span_to_discard: EdgeSpan,
    span_to_keep: EdgeSpan,
    options: WeldOptions,
    unmerged_edge_pairs: Vec<EdgePair>,
    splits: usize,
    stage: WeldStage,
}

impl<'a, M: WeldMesh + ?Sized> WeldEdgeSequence<'a, M> {
    /// Create a weld request with default options.
    pub fn new(mesh: &'a mut M, span_to_discard: EdgeSpan, span_to_keep: EdgeSpan) -> Self {
        Self {
            mesh,
            span_to_discard,
            span_to_keep,
            options: WeldOptions::default(),
            unmerged_edge_pairs: Vec::new(),
            splits: 0,
            stage: WeldStage::Init,
        }
    }

    /// Replace the options of this request.
    pub fn with_options(mut self, options: WeldOptions) -> Self {
        self.options = options;
        self
    }

    /// The options of this request.
    pub fn options(&self) -> &WeldOptions {
        &self.options
    }

    /// Current stage of the weld.
    pub fn stage(&self) -> WeldStage {
        self.stage
    }

    /// The span whose vertices survive.
    ///
    /// After a successful weld this is trimmed to the longest run of its
    /// vertices and edges that still exist.
    pub fn span_to_keep(&self) -> &EdgeSpan {
        &self.span_to_keep
    }

    /// The span whose vertices are merged away. Stale after a weld.
    pub fn span_to_discard(&self) -> &EdgeSpan {
        &self.span_to_discard
    }

    /// Keep/discard edge pairs left topologically separate by fallback moves.
    pub fn unmerged_edge_pairs(&self) -> &[EdgePair] {
        &self.unmerged_edge_pairs
    }

    /// Number of edge splits made while equalizing the spans.
    pub fn splits(&self) -> usize {
        self.splits
    }

    /// Consume the request, returning `(span_to_discard, span_to_keep)`.
    pub fn into_spans(self) -> (EdgeSpan, EdgeSpan) {
        (self.span_to_discard, self.span_to_keep)
    }

    /// Run the weld.
    ///
    /// On error the mesh is not restored: splits and merges made before the
    /// failure remain. Callers needing atomicity should snapshot the mesh.
    ///
    /// # Errors
    ///
    /// - [`WeldError::EdgesNotBoundaryEdges`] if any span edge is not a
    ///   boundary edge. The mesh is not modified.
    /// - [`WeldError::CannotSplitEdge`] if equalization fails.
    /// - [`WeldError::TriangleDeletionDisabled`] if the spans are bridged by
    ///   triangles and deletion is not allowed.
    /// - [`WeldError::CannotDeleteTriangle`] if a bridging triangle could not
    ///   be deleted.
    /// - [`WeldError::Other`] for inconsistent spans, a rejected merge without
    ///   fallback, or a repeated call.
    pub fn weld(&mut self) -> Result<(), WeldError> {
        if self.stage != WeldStage::Init {
            return Err(WeldError::Other);
        }

        let result = self.run();
        match result {
            Ok(()) => {
                self.stage = WeldStage::Done;
                info!(
                    "welded {} vertex pairs ({} splits, {} unmerged edge pairs)",
                    self.span_to_keep.vertices.len(),
                    self.splits,
                    self.unmerged_edge_pairs.len()
                );
            }
            Err(err) => {
                debug!("weld failed during {:?}: {}", self.stage, err);
                self.stage = WeldStage::Failed(err);
            }
        }
        result
    }

    fn run(&mut self) -> Result<(), WeldError> {
        self.stage = WeldStage::ValidatingInput;
        self.check_input()?;

        self.stage = WeldStage::EqualizingSpans;
        self.splits = equalize_span_lengths(
            &mut *self.mesh,
            &mut self.span_to_discard,
            &mut self.span_to_keep,
        )?;

        self.stage = WeldStage::Welding;
        self.weld_spans()?;

        self.span_to_keep.retain_valid_run(&*self.mesh);
        Ok(())
    }

    fn check_input(&mut self) -> Result<(), WeldError> {
        let all_boundary = self.span_to_discard.is_boundary(&*self.mesh)
            && self.span_to_keep.is_boundary(&*self.mesh);
        if !all_boundary {
            return Err(WeldError::EdgesNotBoundaryEdges);
        }

        for span in [&self.span_to_discard, &self.span_to_keep] {
            if span.is_empty() || !span.is_consistent() {
                return Err(WeldError::Other);
            }
        }

        self.span_to_discard.set_correct_orientation(&*self.mesh);
        self.span_to_keep.set_correct_orientation(&*self.mesh);
        Ok(())
    }

    /// Vertex pair at a keep-span index; the discard span is walked backward.
    fn pair(&self, keep_index: usize) -> (VertexId, VertexId) {
        let n = self.span_to_discard.vertices.len();
        (
            self.span_to_keep.vertices[keep_index],
            self.span_to_discard.vertices[n - 1 - keep_index],
        )
    }

    fn is_bridged(&self, keep_vid: VertexId, discard_vid: VertexId) -> bool {
        self.mesh.find_edge(keep_vid, discard_vid).is_some()
    }

    fn weld_spans(&mut self) -> Result<(), WeldError> {
        if self.span_to_discard.len() != self.span_to_keep.len()
            || !self.span_to_discard.is_consistent()
            || !self.span_to_keep.is_consistent()
        {
            return Err(WeldError::Other);
        }

        let n = self.span_to_keep.vertices.len();

        // Refuse before touching anything if a bridge would need deleting
        if !self.options.allow_intermediate_triangle_deletion {
            for k in 0..n {
                let (keep_vid, discard_vid) = self.pair(k);
                if keep_vid != discard_vid && self.is_bridged(keep_vid, discard_vid) {
                    return Err(WeldError::TriangleDeletionDisabled);
                }
            }
        }

        let mut k = 0;
        while k < n {
            let (keep_vid, discard_vid) = self.pair(k);
            if keep_vid == discard_vid
                || !self.mesh.is_vertex(keep_vid)
                || !self.mesh.is_vertex(discard_vid)
            {
                k += 1;
                continue;
            }

            let mut step = 1;
            if self.is_bridged(keep_vid, discard_vid) {
                if !self.options.allow_intermediate_triangle_deletion {
                    return Err(WeldError::TriangleDeletionDisabled);
                }
                if k + 1 < n {
                    let (next_keep, next_discard) = self.pair(k + 1);
                    if next_keep == next_discard {
                        step = 2;
                    } else if self.mesh.is_vertex(next_keep)
                        && self.mesh.is_vertex(next_discard)
                        && !self.is_bridged(next_keep, next_discard)
                    {
                        // Collapsing the bridge first could remove the next
                        // discard vertex before it is welded.
                        self.process_vid_pair(next_keep, next_discard, k + 1)?;
                        step = 2;
                    }
                }
            }

            self.process_vid_pair(keep_vid, discard_vid, k)?;
            k += step;
        }

        Ok(())
    }

    fn process_vid_pair(
        &mut self,
        keep_vid: VertexId,
        discard_vid: VertexId,
        keep_index: usize,
    ) -> Result<(), WeldError> {
        let t = self.options.interpolation_t;
        match self.mesh.merge_vertices(keep_vid, discard_vid, t) {
            Ok(info) => {
                debug!(
                    "merged {:?} into {:?}, {} triangles collapsed",
                    discard_vid,
                    keep_vid,
                    info.removed_triangles.len()
                );
                Ok(())
            }
            Err(EditError::CollapseTriangle)
            | Err(EditError::CollapseQuad)
            | Err(EditError::FoundDuplicateTriangle) => {
                if !self.options.allow_intermediate_triangle_deletion {
                    return Err(WeldError::TriangleDeletionDisabled);
                }
                let eid = self
                    .mesh
                    .find_edge(keep_vid, discard_vid)
                    .ok_or(WeldError::Other)?;
                debug!("deleting triangles of {:?} between {:?} and {:?}", eid, keep_vid, discard_vid);
                remove_edge_triangles_if_not_last(&mut *self.mesh, eid)
            }
            Err(EditError::InvalidNeighbourhood) if self.options.allow_failed_merge => {
                warn!(
                    "cannot merge {:?} into {:?} without non-manifold geometry, moving instead",
                    discard_vid, keep_vid
                );
                self.move_together(keep_vid, discard_vid)?;
                self.record_unmerged(keep_index);
                Ok(())
            }
            Err(err) => {
                debug!("merge of {:?} into {:?} failed: {}", discard_vid, keep_vid, err);
                Err(WeldError::Other)
            }
        }
    }

    fn move_together(&mut self, keep_vid: VertexId, discard_vid: VertexId) -> Result<(), WeldError> {
        let (Some(pk), Some(pd)) = (
            self.mesh.vertex_position(keep_vid),
            self.mesh.vertex_position(discard_vid),
        ) else {
            return Err(WeldError::Other);
        };
        let target = pk + (pd - pk) * self.options.interpolation_t;
        self.mesh.set_vertex_position(keep_vid, target);
        self.mesh.set_vertex_position(discard_vid, target);
        Ok(())
    }

    /// Record the edges on either side of the keep vertex at `keep_index`
    /// together with their mirrored discard edges.
    fn record_unmerged(&mut self, keep_index: usize) {
        let n = self.span_to_keep.edges.len();
        let mut candidates = Vec::with_capacity(2);
        if keep_index < n {
            candidates.push((
                self.span_to_keep.edges[keep_index],
                self.span_to_discard.edges[n - 1 - keep_index],
            ));
        }
        if keep_index > 0 {
            candidates.push((
                self.span_to_keep.edges[keep_index - 1],
                self.span_to_discard.edges[n - keep_index],
            ));
        }

        for pair in candidates {
            if self.mesh.is_edge(pair.0)
                && self.mesh.is_edge(pair.1)
                && !self.unmerged_edge_pairs.contains(&pair)
            {
                self.unmerged_edge_pairs.push(pair);
            }
        }
    }
}
