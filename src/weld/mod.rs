//! Welding boundary edges together.
//!
//! This module closes gaps in a mesh by merging boundary vertices:
//!
//! - [`EdgeSpan`]: an open chain of boundary vertices and edges
//! - [`equalize_span_lengths`]: split edges until two spans match in length
//! - [`WeldEdgeSequence`]: weld one span onto another
//! - [`weld_vertex_pair`]: weld a single pair of vertices
//! - [`link_boundary_spans`] and [`weld_linked_spans`]: weld seams that are
//!   made of several spans on each side
//!
//! All operations work on any mesh implementing [`WeldMesh`](crate::mesh::WeldMesh).

mod equalize;
mod link;
mod sequence;
mod span;
mod vertices;

#[cfg(test)]
pub(crate) mod fixtures;

pub use equalize::equalize_span_lengths;
pub use link::{link_boundary_spans, weld_linked_spans, LinkedWeldReport, SpanPartition};
pub use sequence::{WeldEdgeSequence, WeldOptions, WeldStage};
pub use span::EdgeSpan;
pub use vertices::{
    remove_edge_triangles_if_not_last, weld_vertex_pair, VertexWeld, VertexWeldOptions,
};
