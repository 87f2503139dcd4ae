//! Benchmarks for weld operations.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::Point3;
use seamweld::prelude::*;

/// Two grid strips of width `n` facing each other across a small gap.
///
/// The lower strip has `lower` columns and the upper strip `upper`. Returns
/// the mesh with the lower strip's top row and the upper strip's bottom row.
fn create_split_strips(n: usize, lower: usize, upper: usize) -> (DynamicMesh, Vec<VertexId>, Vec<VertexId>) {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    let mut add_strip = |cols: usize, y0: f64| -> (usize, usize) {
        let base = vertices.len();
        for j in 0..=1 {
            for i in 0..=cols {
                let x = i as f64 * n as f64 / cols as f64;
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
        (base, cols)
    };

    let (lower_base, lower_cols) = add_strip(lower, -1.0);
    let (upper_base, upper_cols) = add_strip(upper, 0.1);

    let keep = (0..=lower_cols)
        .map(|i| VertexId::new(lower_base + lower_cols + 1 + i))
        .collect();
    let discard = (0..=upper_cols).map(|i| VertexId::new(upper_base + i)).collect();

    let mesh = build_from_triangles(&vertices, &faces).unwrap();
    (mesh, keep, discard)
}

fn bench_equalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("equalize_span_lengths");

    for size in [16, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let (mesh, keep, discard) = create_split_strips(size, size / 4, size);
                    let keep = EdgeSpan::from_vertices(&mesh, &keep).unwrap();
                    let discard = EdgeSpan::from_vertices(&mesh, &discard).unwrap();
                    (mesh, keep, discard)
                },
                |(mut mesh, mut keep, mut discard)| {
                    equalize_span_lengths(&mut mesh, &mut keep, &mut discard).unwrap()
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_weld(c: &mut Criterion) {
    let mut group = c.benchmark_group("weld_edge_sequence");

    for size in [16, 64, 256] {
        group.bench_with_input(BenchmarkId::new("matched", size), &size, |b, &size| {
            b.iter_batched(
                || create_split_strips(size, size, size),
                |(mut mesh, keep, discard)| {
                    let keep = EdgeSpan::from_vertices(&mesh, &keep).unwrap();
                    let discard = EdgeSpan::from_vertices(&mesh, &discard).unwrap();
                    WeldEdgeSequence::new(&mut mesh, discard, keep).weld().unwrap();
                    mesh
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("mismatched", size), &size, |b, &size| {
            b.iter_batched(
                || create_split_strips(size, size / 2, size),
                |(mut mesh, keep, discard)| {
                    let keep = EdgeSpan::from_vertices(&mesh, &keep).unwrap();
                    let discard = EdgeSpan::from_vertices(&mesh, &discard).unwrap();
                    WeldEdgeSequence::new(&mut mesh, discard, keep).weld().unwrap();
                    mesh
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_equalize, bench_weld);
criterion_main!(benches);
