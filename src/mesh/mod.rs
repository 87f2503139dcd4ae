//! Core mesh data structures.
//!
//! # Overview
//!
//! The primary type is [`DynamicMesh`], an indexed triangle mesh with explicit
//! edge records. It supports the local edits welding needs: splitting an
//! edge, merging two vertices and removing a triangle. The weld operations are
//! written against the [`WeldMesh`] trait, which [`DynamicMesh`] implements.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`EdgeId`] - Identifies an undirected edge
//! - [`TriangleId`] - Identifies a triangle
//!
//! # Construction
//!
//! ```
//! use seamweld::mesh::{build_from_triangles, DynamicMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh: DynamicMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! assert_eq!(mesh.triangle_count(), 1);
//! ```

mod builder;
mod dynamic;
mod index;
mod traits;

pub use builder::{build_from_triangles, to_face_vertex};
pub use dynamic::{DynamicMesh, EdgeSplitInfo, MergeOptions, MergeVerticesInfo};
pub use index::{EdgeId, TriangleId, VertexId};
pub use traits::WeldMesh;
