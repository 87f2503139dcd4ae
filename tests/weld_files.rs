//! Load, weld and save meshes through the file formats.

use seamweld::io;
use seamweld::prelude::*;

const TWO_SQUARES: &str = "\
# two unit squares with a gap along y = 0
v 0 0 0
v 1 0 0
v 1 -1 0
v 0 -1 0
v 0 0.1 0
v 1 0.1 0
v 1 1 0
v 0 1 0
f 4 3 2 1
f 5 6 7 8
";

#[test]
fn test_weld_obj_and_save_stl() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("squares.obj");
    std::fs::write(&input, TWO_SQUARES).unwrap();

    let mut mesh = io::load(&input).unwrap();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 4);
    assert_eq!(mesh.boundary_edge_count(), 8);

    let keep = EdgeSpan::from_vertices(&mesh, &[VertexId::new(0), VertexId::new(1)]).unwrap();
    let discard = EdgeSpan::from_vertices(&mesh, &[VertexId::new(4), VertexId::new(5)]).unwrap();
    WeldEdgeSequence::new(&mut mesh, discard, keep).weld().unwrap();
    mesh.check_validity().unwrap();

    let output = dir.path().join("welded.stl");
    io::save(&mesh, &output).unwrap();

    let reloaded = io::load(&output).unwrap();
    assert_eq!(reloaded.vertex_count(), 6);
    assert_eq!(reloaded.triangle_count(), 4);
    assert_eq!(reloaded.boundary_edge_count(), 6);
}

#[test]
fn test_welded_mesh_round_trips_through_obj() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("squares.obj");
    std::fs::write(&input, TWO_SQUARES).unwrap();

    let mut mesh = io::load(&input).unwrap();
    // The squares share no vertex, so joining their corners forms a bowtie
    let options = VertexWeldOptions::default().with_interpolation(0.5);
    let (keep, discard) = (VertexId::new(1), VertexId::new(5));
    let result = weld_vertex_pair(&mut mesh, keep, discard, &options).unwrap();
    assert_eq!(result, VertexWeld::Moved);
    assert_eq!(mesh.position(keep), mesh.position(discard));

    let result = weld_vertex_pair(&mut mesh, keep, discard, &options.with_bowtie(true)).unwrap();
    assert!(matches!(result, VertexWeld::Merged(_)));

    // Removed vertex ids leave gaps that are compacted on save
    let output = dir.path().join("welded.obj");
    io::save(&mesh, &output).unwrap();
    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 7);

    let reloaded = io::load(&output).unwrap();
    assert_eq!(reloaded.vertex_count(), 7);
    assert_eq!(reloaded.triangle_count(), 4);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = io::load(dir.path().join("missing.obj"));
    assert!(matches!(result, Err(MeshError::Io(_))));
}
