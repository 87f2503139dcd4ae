//! Error types for seamweld.
//!
//! Three families of failures exist:
//!
//! - [`MeshError`]: mesh construction, validation and file I/O.
//! - [`EditError`]: a local edit primitive (split, merge, triangle removal)
//!   refused to run. The mesh is left untouched when one of these is returned.
//! - [`WeldError`]: the outcome of a whole weld operation. These are terminal
//!   for the current request, but any edits performed before the failure are
//!   not rolled back.

use std::path::PathBuf;
use thiserror::Error;

use crate::mesh::{EdgeId, VertexId};

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building, validating, loading or saving meshes.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no triangles.
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The triangle index in the input list.
        triangle: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A triangle references a vertex id that is not alive in the mesh.
    #[error("vertex {0:?} does not exist")]
    InvalidVertex(VertexId),

    /// A triangle repeats a vertex.
    #[error("triangle ({0:?}, {1:?}, {2:?}) is degenerate")]
    DegenerateTriangle(VertexId, VertexId, VertexId),

    /// Adding a triangle would give an edge more than two incident triangles.
    #[error("edge ({v0:?}, {v1:?}) already has two incident triangles")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: VertexId,
        /// Second vertex of the edge.
        v1: VertexId,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Mesh connectivity is inconsistent.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),
}

/// Reasons a local mesh edit was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    /// The vertex id does not name a live vertex.
    #[error("not a vertex")]
    NotAVertex,

    /// The edge id does not name a live edge.
    #[error("not an edge")]
    NotAnEdge,

    /// The triangle id does not name a live triangle.
    #[error("not a triangle")]
    NotATriangle,

    /// Collapsing would remove an isolated triangle.
    #[error("collapse would remove an isolated triangle")]
    CollapseTriangle,

    /// Collapsing would remove an isolated quad (two triangles).
    #[error("collapse would remove an isolated quad")]
    CollapseQuad,

    /// Merging would produce two triangles over the same three vertices.
    #[error("merge would create a duplicate triangle")]
    FoundDuplicateTriangle,

    /// Merging would create non-manifold or inconsistently wound geometry.
    #[error("merge would create non-manifold geometry")]
    InvalidNeighbourhood,

    /// Merging would join two triangle fans at a single vertex.
    #[error("merge would create a bowtie vertex")]
    WouldCreateBowtie,

    /// Any other refusal.
    #[error("edit failed")]
    Other,
}

/// Terminal outcomes of a failed weld.
///
/// A successful weld is `Ok(())`. Note that a successful weld may still be a
/// partial one when failed merges are allowed; see
/// [`WeldEdgeSequence::unmerged_edge_pairs`](crate::weld::WeldEdgeSequence::unmerged_edge_pairs).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeldError {
    /// At least one edge of either span is not a boundary edge.
    #[error("span edges must all be boundary edges")]
    EdgesNotBoundaryEdges,

    /// An edge split required to equalize span lengths failed.
    #[error("could not split edge while equalizing span lengths")]
    CannotSplitEdge,

    /// The spans are bridged by triangles and deleting them was not allowed.
    #[error("weld requires deleting intervening triangles, which is not allowed")]
    TriangleDeletionDisabled,

    /// The mesh refused to delete an intervening triangle.
    #[error("could not delete intervening triangle")]
    CannotDeleteTriangle,

    /// Inconsistent input or an unexpected merge failure.
    #[error("weld failed")]
    Other,
}

/// A keep/discard edge pair left topologically separate after a weld.
pub type EdgePair = (EdgeId, EdgeId);
