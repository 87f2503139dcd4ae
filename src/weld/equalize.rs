//! Equalizing the lengths of two edge spans by splitting edges.
//!
//! Before two spans can be welded vertex by vertex they must have the same
//! number of vertices. [`equalize_span_lengths`] repeatedly splits the longest
//! edge of the shorter span until the counts agree.
//!
//! The longest edge is found by a linear rescan after every split, so the
//! cost is `O(splits * edges)`. Ties go to the lowest index, which keeps the
//! placement of new vertices deterministic on regular meshes.

use log::debug;

use super::span::EdgeSpan;
use crate::error::WeldError;
use crate::mesh::WeldMesh;

/// Split edges of the shorter span until both spans have the same length.
///
/// Only the span with fewer vertices is modified. Each split places a new
/// vertex at the midpoint of the span's currently longest edge and inserts
/// the vertex and the new edge so the span keeps its walking order.
///
/// Returns the number of splits performed, which is zero when the spans
/// already match.
///
/// # Errors
///
/// [`WeldError::CannotSplitEdge`] if the shorter span has no edge to split or
/// the mesh refuses a split. Splits made before the failure are kept.
///
/// [`WeldError::Other`] if either span does not have exactly one more vertex
/// than edges. Nothing is split in that case.
///
/// # Example
///
/// ```
/// use seamweld::mesh::{build_from_triangles, VertexId};
/// use seamweld::weld::{equalize_span_lengths, EdgeSpan};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(2.0, 1.0, 0.0),
///     Point3::new(1.0, 2.0, 0.0),
/// ];
/// let faces = [[0, 1, 2], [2, 3, 5], [3, 4, 5]];
/// let mut mesh = build_from_triangles(&vertices, &faces).unwrap();
///
/// let ids = |vs: &[usize]| vs.iter().map(|&v| VertexId::new(v)).collect::<Vec<_>>();
/// let mut short = EdgeSpan::from_vertices(&mesh, &ids(&[0, 1])).unwrap();
/// let mut long = EdgeSpan::from_vertices(&mesh, &ids(&[2, 3, 4])).unwrap();
///
/// let splits = equalize_span_lengths(&mut mesh, &mut short, &mut long).unwrap();
/// assert_eq!(splits, 1);
/// assert_eq!(short.len(), long.len());
/// ```
pub fn equalize_span_lengths<M: WeldMesh + ?Sized>(
    mesh: &mut M,
    span_a: &mut EdgeSpan,
    span_b: &mut EdgeSpan,
) -> Result<usize, WeldError> {
    if !span_a.is_consistent() || !span_b.is_consistent() {
        return Err(WeldError::Other);
    }
    let total_splits = span_a.vertices.len().abs_diff(span_b.vertices.len());
    if total_splits == 0 {
        return Ok(0);
    }

    let short = if span_a.vertices.len() < span_b.vertices.len() {
        span_a
    } else {
        span_b
    };

    for _ in 0..total_splits {
        let idx = longest_edge(mesh, short).ok_or(WeldError::CannotSplitEdge)?;
        let eid = short.edges[idx];
        let info = mesh.split_edge(eid).map_err(|err| {
            debug!("split of {:?} refused: {}", eid, err);
            WeldError::CannotSplitEdge
        })?;

        // The original id keeps the first endpoint, so it stays in front
        // when the span walks from that endpoint.
        short.vertices.insert(idx + 1, info.new_vertex);
        if info.original_vertices[0] == short.vertices[idx] {
            short.edges.insert(idx + 1, info.new_edge);
        } else {
            short.edges.insert(idx, info.new_edge);
        }
        debug!("split {:?} at span index {}, new {:?}", eid, idx, info.new_vertex);
    }

    Ok(total_splits)
}

/// Index of the span edge with the greatest squared length, lowest index first.
fn longest_edge<M: WeldMesh + ?Sized>(mesh: &M, span: &EdgeSpan) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &e) in span.edges.iter().enumerate() {
        let Some(length_sq) = mesh.edge_length_squared(e) else {
            continue;
        };
        if best.map_or(true, |(_, max)| length_sq > max) {
            best = Some((i, length_sq));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weld::fixtures::{two_strips, ScriptedMesh};
    use nalgebra::Point3;

    #[test]
    fn test_equal_spans_are_untouched() {
        let (mut mesh, keep, discard) = two_strips(3, 3);
        let mut a = EdgeSpan::from_vertices(&mesh, &keep).unwrap();
        let mut b = EdgeSpan::from_vertices(&mesh, &discard).unwrap();
        let (a0, b0) = (a.clone(), b.clone());
        let vertex_count = mesh.vertex_count();

        assert_eq!(equalize_span_lengths(&mut mesh, &mut a, &mut b), Ok(0));
        assert_eq!(a, a0);
        assert_eq!(b, b0);
        assert_eq!(mesh.vertex_count(), vertex_count);
    }

    #[test]
    fn test_splits_longest_edge_first() {
        let (mut mesh, keep, discard) = two_strips(2, 4);
        let mut a = EdgeSpan::from_vertices(&mesh, &keep).unwrap();
        let mut b = EdgeSpan::from_vertices(&mesh, &discard).unwrap();
        let b0 = b.clone();

        assert_eq!(equalize_span_lengths(&mut mesh, &mut a, &mut b), Ok(2));
        assert_eq!(a.len(), 4);
        assert_eq!(b, b0);
        assert!(a.is_consistent());
        mesh.check_validity().unwrap();

        // Two equal edges: the first is split, then the untouched second
        let xs: Vec<f64> = a
            .vertices
            .iter()
            .map(|&v| mesh.position(v).unwrap().x)
            .collect();
        assert_eq!(xs, vec![0.0, 0.5, 1.0, 1.5, 2.0]);

        // Edges still walk the vertices in order
        for (i, &e) in a.edges.iter().enumerate() {
            let vs = mesh.edge_vertices(e).unwrap();
            assert!(vs.contains(&a.vertices[i]) && vs.contains(&a.vertices[i + 1]));
        }
    }

    #[test]
    fn test_reversed_span_keeps_walking_order() {
        let (mut mesh, keep, discard) = two_strips(1, 3);
        let mut a = EdgeSpan::from_vertices(&mesh, &keep).unwrap();
        a.reverse();
        let mut b = EdgeSpan::from_vertices(&mesh, &discard).unwrap();

        equalize_span_lengths(&mut mesh, &mut a, &mut b).unwrap();
        assert_eq!(a.len(), 3);
        for (i, &e) in a.edges.iter().enumerate() {
            let vs = mesh.edge_vertices(e).unwrap();
            assert!(vs.contains(&a.vertices[i]) && vs.contains(&a.vertices[i + 1]));
        }
        assert_eq!(mesh.position(a.vertices[0]), Some(Point3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_refused_split() {
        let (mesh, keep, discard) = two_strips(2, 3);
        let mut mesh = ScriptedMesh::refusing_splits(mesh);
        let mut a = EdgeSpan::from_vertices(&mesh, &keep).unwrap();
        let mut b = EdgeSpan::from_vertices(&mesh, &discard).unwrap();

        let result = equalize_span_lengths(&mut mesh, &mut a, &mut b);
        assert_eq!(result, Err(WeldError::CannotSplitEdge));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_inconsistent_span_is_rejected() {
        let (mut mesh, keep, discard) = two_strips(2, 3);
        let full = EdgeSpan::from_vertices(&mesh, &keep).unwrap();
        let mut a = EdgeSpan {
            vertices: vec![keep[0]],
            edges: full.edges.clone(),
        };
        let mut b = EdgeSpan::from_vertices(&mesh, &discard).unwrap();
        let vertex_count = mesh.vertex_count();

        assert_eq!(
            equalize_span_lengths(&mut mesh, &mut a, &mut b),
            Err(WeldError::Other)
        );
        assert_eq!(a.vertices, vec![keep[0]]);
        assert_eq!(mesh.vertex_count(), vertex_count);

        // Either argument position is checked
        assert_eq!(
            equalize_span_lengths(&mut mesh, &mut b, &mut a),
            Err(WeldError::Other)
        );
    }

    #[test]
    fn test_nothing_to_split() {
        let (mut mesh, keep, discard) = two_strips(2, 2);
        let mut a = EdgeSpan::from_vertices(&mesh, &keep[..1]).unwrap();
        let mut b = EdgeSpan::from_vertices(&mesh, &discard).unwrap();

        let result = equalize_span_lengths(&mut mesh, &mut a, &mut b);
        assert_eq!(result, Err(WeldError::CannotSplitEdge));
    }
}
