//! Property-based tests for span equalization and welding.
//!
//! Run with: cargo test --test weld_properties

use nalgebra::Point3;
use proptest::prelude::*;
use seamweld::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Column widths for one strip.
fn arb_widths(max_columns: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.1..2.0f64, 1..=max_columns)
}

/// Two strips facing each other across a gap.
///
/// Returns the mesh, the top row of the lower strip and the bottom row of the
/// upper strip, both ordered by increasing x.
fn split_strips(lower: &[f64], upper: &[f64]) -> (DynamicMesh, Vec<VertexId>, Vec<VertexId>) {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    let mut rows = Vec::new();

    for (widths, y0, shared_row) in [(lower, -1.0, 1), (upper, 0.1, 0)] {
        let base = vertices.len();
        let cols = widths.len();
        let mut xs = vec![0.0];
        for w in widths {
            xs.push(xs[xs.len() - 1] + w);
        }
        for j in 0..=1 {
            for &x in &xs {
                vertices.push(Point3::new(x, y0 + j as f64, 0.0));
            }
        }
        for i in 0..cols {
            let v00 = base + i;
            let v10 = v00 + 1;
            let v01 = v00 + cols + 1;
            let v11 = v01 + 1;
            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
        let row_start = base + shared_row * (cols + 1);
        rows.push((0..=cols).map(|i| VertexId::new(row_start + i)).collect::<Vec<_>>());
    }

    let mesh = build_from_triangles(&vertices, &faces).unwrap();
    let discard = rows.pop().unwrap();
    let keep = rows.pop().unwrap();
    (mesh, keep, discard)
}

fn spans(mesh: &DynamicMesh, keep: &[VertexId], discard: &[VertexId]) -> (EdgeSpan, EdgeSpan) {
    (
        EdgeSpan::from_vertices(mesh, keep).unwrap(),
        EdgeSpan::from_vertices(mesh, discard).unwrap(),
    )
}

fn walks_in_order(mesh: &DynamicMesh, span: &EdgeSpan) -> bool {
    span.edges.iter().enumerate().all(|(i, &e)| {
        mesh.edge_vertices(e).map_or(false, |vs| {
            vs.contains(&span.vertices[i]) && vs.contains(&span.vertices[i + 1])
        })
    })
}

// =============================================================================
// Property Tests: Equalization
// =============================================================================

proptest! {
    /// Both spans end with the same length, and only the shorter one grows.
    #[test]
    fn equalize_matches_lengths(lower in arb_widths(10), upper in arb_widths(10)) {
        let (mut mesh, keep, discard) = split_strips(&lower, &upper);
        let (mut a, mut b) = spans(&mesh, &keep, &discard);
        let (a0, b0) = (a.clone(), b.clone());

        let splits = equalize_span_lengths(&mut mesh, &mut a, &mut b).unwrap();

        prop_assert_eq!(a.len(), b.len());
        prop_assert_eq!(splits, a0.len().abs_diff(b0.len()));
        if a0.len() >= b0.len() {
            prop_assert_eq!(&a, &a0);
        }
        if b0.len() >= a0.len() {
            prop_assert_eq!(&b, &b0);
        }
        prop_assert!(a.is_consistent() && b.is_consistent());
        prop_assert!(walks_in_order(&mesh, &a));
        prop_assert!(walks_in_order(&mesh, &b));
        prop_assert!(mesh.check_validity().is_ok());
    }

    /// Equalizing spans that already match does nothing.
    #[test]
    fn equalize_is_idempotent(lower in arb_widths(10), upper in arb_widths(10)) {
        let (mut mesh, keep, discard) = split_strips(&lower, &upper);
        let (mut a, mut b) = spans(&mesh, &keep, &discard);
        equalize_span_lengths(&mut mesh, &mut a, &mut b).unwrap();

        let vertex_count = mesh.vertex_count();
        let (a1, b1) = (a.clone(), b.clone());
        prop_assert_eq!(equalize_span_lengths(&mut mesh, &mut a, &mut b), Ok(0));
        prop_assert_eq!(mesh.vertex_count(), vertex_count);
        prop_assert_eq!(a, a1);
        prop_assert_eq!(b, b1);
    }
}

// =============================================================================
// Property Tests: Welding
// =============================================================================

proptest! {
    /// A clean weld removes one vertex per discard vertex and leaves the
    /// kept span intact.
    #[test]
    fn weld_removes_discard_vertices(lower in arb_widths(8), upper in arb_widths(8)) {
        let (mut mesh, keep, discard) = split_strips(&lower, &upper);
        let (keep_span, discard_span) = spans(&mesh, &keep, &discard);
        let before = mesh.vertex_count();
        let keep_positions: Vec<_> = keep.iter().map(|&v| mesh.position(v).unwrap()).collect();

        let mut welder = WeldEdgeSequence::new(&mut mesh, discard_span, keep_span)
            .with_options(WeldOptions::default().with_interpolation(0.0));
        prop_assert_eq!(welder.weld(), Ok(()));
        prop_assert!(welder.unmerged_edge_pairs().is_empty());

        let splits = welder.splits();
        let (_, kept) = welder.into_spans();
        let pairs = kept.vertices.len();
        prop_assert_eq!(pairs, lower.len().max(upper.len()) + 1);
        prop_assert_eq!(mesh.vertex_count(), before + splits - pairs);
        prop_assert!(mesh.check_validity().is_ok());

        for v in &kept.vertices {
            prop_assert!(mesh.is_vertex(*v));
        }
        // t = 0 leaves the original kept vertices where they were
        for (v, p) in keep.iter().zip(&keep_positions) {
            prop_assert_eq!(mesh.position(*v), Some(*p));
        }
    }

    /// Spans built from the interior of a strip are always rejected untouched.
    #[test]
    fn weld_rejects_interior_edges(widths in arb_widths(8)) {
        let (mut mesh, _, discard) = split_strips(&widths, &widths);
        let interior = EdgeSpan::from_vertices(
            &mesh,
            &[VertexId::new(0), VertexId::new(widths.len() + 2)],
        )
        .unwrap();
        let discard = EdgeSpan::from_vertices(&mesh, &discard).unwrap();
        let before = mesh.clone();

        let result = WeldEdgeSequence::new(&mut mesh, discard, interior).weld();
        prop_assert_eq!(result, Err(WeldError::EdgesNotBoundaryEdges));
        prop_assert_eq!(mesh.vertex_count(), before.vertex_count());
        prop_assert_eq!(mesh.triangle_count(), before.triangle_count());
    }
}
