//! # Seamweld
//!
//! Welding of open boundaries in triangle meshes.
//!
//! Seamweld closes gaps between two boundary edge chains of a mesh by merging
//! their vertices pairwise. Chains of different lengths are first equalized
//! by splitting edges, and bridging triangles or non-manifold merges are
//! handled according to [`weld::WeldOptions`].
//!
//! ## Features
//!
//! - **Dynamic mesh**: indexed triangles with explicit edges and type-safe ids
//! - **Local edits**: edge split, vertex merge and triangle removal
//! - **Span welding**: [`weld::WeldEdgeSequence`] with staged validation
//! - **Multi-span seams**: chain several boundary spans per side and weld them
//!   as one seam
//! - **File formats**: OBJ and STL
//!
//! ## Quick Start
//!
//! ```no_run
//! use seamweld::prelude::*;
//!
//! let mut mesh = seamweld::io::load("open_box.obj").unwrap();
//! println!("Boundary edges: {}", mesh.boundary_edge_count());
//!
//! let keep = EdgeSpan::from_vertices(&mesh, &[VertexId::new(0), VertexId::new(1)]).unwrap();
//! let discard = EdgeSpan::from_vertices(&mesh, &[VertexId::new(7), VertexId::new(6)]).unwrap();
//! WeldEdgeSequence::new(&mut mesh, discard, keep).weld().unwrap();
//!
//! seamweld::io::save(&mesh, "closed_box.obj").unwrap();
//! ```
//!
//! ## Welding Two Strips
//!
//! ```
//! use seamweld::prelude::*;
//! use nalgebra::Point3;
//!
//! // Two unit squares with a small gap between y = 0 and y = 0.1
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, -1.0, 0.0),
//!     Point3::new(0.0, -1.0, 0.0),
//!     Point3::new(0.0, 0.1, 0.0),
//!     Point3::new(1.0, 0.1, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = [[3, 2, 1], [3, 1, 0], [4, 5, 6], [4, 6, 7]];
//! let mut mesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.boundary_edge_count(), 8);
//!
//! let keep = EdgeSpan::from_vertices(&mesh, &[VertexId::new(1), VertexId::new(0)]).unwrap();
//! let discard = EdgeSpan::from_vertices(&mesh, &[VertexId::new(4), VertexId::new(5)]).unwrap();
//!
//! let mut welder = WeldEdgeSequence::new(&mut mesh, discard, keep);
//! welder.weld().unwrap();
//! assert_eq!(welder.stage(), WeldStage::Done);
//! drop(welder);
//!
//! assert_eq!(mesh.vertex_count(), 6);
//! assert_eq!(mesh.boundary_edge_count(), 6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod io;
pub mod mesh;
pub mod weld;

/// Prelude module for convenient imports.
///
/// ```
/// use seamweld::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{EdgePair, EditError, MeshError, Result, WeldError};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, DynamicMesh, EdgeId, TriangleId, VertexId,
        WeldMesh,
    };
    pub use crate::weld::{
        equalize_span_lengths, weld_vertex_pair, EdgeSpan, VertexWeld, VertexWeldOptions,
        WeldEdgeSequence, WeldOptions, WeldStage,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron_is_closed() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];

        let faces = vec![
            [0, 2, 1], // bottom
            [0, 1, 3], // front
            [1, 2, 3], // right
            [2, 0, 3], // left
        ];

        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.edge_count(), 6);
        assert_eq!(mesh.boundary_edge_count(), 0);
        mesh.check_validity().unwrap();

        // A closed mesh has nothing to weld
        let span = EdgeSpan::from_vertices(&mesh, &[VertexId::new(0), VertexId::new(1)]).unwrap();
        let mut mesh = mesh;
        let result = WeldEdgeSequence::new(&mut mesh, span.clone(), span).weld();
        assert_eq!(result, Err(WeldError::EdgesNotBoundaryEdges));
    }
}
