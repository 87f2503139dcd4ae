//! Seamweld CLI - weld open boundaries of a mesh file.
//!
//! Usage: seamweld <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `seamweld --help` for available commands. Set `RUST_LOG=debug` to see
//! individual splits and merges.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use log::info;

use seamweld::io;
use seamweld::mesh::{DynamicMesh, VertexId};
use seamweld::weld::{
    weld_vertex_pair, EdgeSpan, VertexWeld, VertexWeldOptions, WeldEdgeSequence, WeldOptions,
};

#[derive(Parser)]
#[command(name = "seamweld")]
#[command(author, version, about = "Boundary welding CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Weld one boundary vertex chain onto another
    Weld {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Vertices of the chain to keep, as comma-separated 0-based indices
        #[arg(short, long, value_delimiter = ',', required = true)]
        keep: Vec<usize>,

        /// Vertices of the chain to merge away, as comma-separated 0-based indices
        #[arg(short, long, value_delimiter = ',', required = true)]
        discard: Vec<usize>,

        #[command(flatten)]
        weld: WeldArgs,
    },

    /// Weld a single pair of vertices
    WeldVertices {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Vertex to keep
        #[arg(short, long)]
        keep: usize,

        /// Vertex to merge away
        #[arg(short, long)]
        discard: usize,

        /// Interpolation from the kept vertex (0.0) to the discarded one (1.0)
        #[arg(short, long, default_value = "0.5")]
        t: f64,

        /// Merge even if the vertices would join at a bowtie
        #[arg(long)]
        allow_bowtie: bool,
    },
}

#[derive(Args)]
struct WeldArgs {
    /// Interpolation from the kept chain (0.0) to the discarded one (1.0)
    #[arg(short, long, default_value = "0.5")]
    t: f64,

    /// Allow deleting triangles that bridge the two chains
    #[arg(long)]
    allow_triangle_deletion: bool,

    /// Move vertices together instead of failing when a merge is non-manifold
    #[arg(long)]
    allow_failed_merge: bool,
}

impl WeldArgs {
    fn options(&self) -> WeldOptions {
        WeldOptions::default()
            .with_interpolation(self.t)
            .with_triangle_deletion(self.allow_triangle_deletion)
            .with_failed_merge(self.allow_failed_merge)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Weld {
            input,
            output,
            keep,
            discard,
            weld,
        } => {
            cmd_weld(&input, &output, &keep, &discard, weld.options())?;
        }

        Commands::WeldVertices {
            input,
            output,
            keep,
            discard,
            t,
            allow_bowtie,
        } => {
            let options = VertexWeldOptions::default()
                .with_interpolation(t)
                .with_bowtie(allow_bowtie);
            cmd_weld_vertices(&input, &output, keep, discard, &options)?;
        }
    }

    Ok(())
}

/// Count the connected chains formed by boundary edges.
fn boundary_loop_count(mesh: &DynamicMesh) -> usize {
    let mut adjacency: HashMap<VertexId, Vec<VertexId>> = HashMap::new();
    for e in mesh.edge_ids().filter(|&e| mesh.is_boundary_edge(e)) {
        if let Some([a, b]) = mesh.edge_vertices(e) {
            adjacency.entry(a).or_default().push(b);
            adjacency.entry(b).or_default().push(a);
        }
    }

    let mut seen = HashSet::new();
    let mut loops = 0;
    for &start in adjacency.keys() {
        if !seen.insert(start) {
            continue;
        }
        loops += 1;
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            for &n in adjacency.get(&v).into_iter().flatten() {
                if seen.insert(n) {
                    stack.push(n);
                }
            }
        }
    }
    loops
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.vertex_count());
    println!("Edges: {}", mesh.edge_count());
    println!("Triangles: {}", mesh.triangle_count());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    let boundary_edges = mesh.boundary_edge_count();
    if boundary_edges == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!(
            "Topology: Open ({} boundary edges in {} loops)",
            boundary_edges,
            boundary_loop_count(&mesh)
        );
    }

    Ok(())
}

fn span_from_indices(mesh: &DynamicMesh, indices: &[usize], name: &str) -> Result<EdgeSpan, String> {
    let vertices: Vec<VertexId> = indices.iter().map(|&i| VertexId::new(i)).collect();
    EdgeSpan::from_vertices(mesh, &vertices)
        .ok_or_else(|| format!("{} vertices do not form a chain of mesh edges", name))
}

fn cmd_weld(
    input: &PathBuf,
    output: &PathBuf,
    keep: &[usize],
    discard: &[usize],
    options: WeldOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = io::load(input)?;
    println!("Loaded: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());

    let keep = span_from_indices(&mesh, keep, "keep")?;
    let discard = span_from_indices(&mesh, discard, "discard")?;
    println!("Welding {} edges onto {} edges...", discard.len(), keep.len());

    let start = Instant::now();
    let mut welder = WeldEdgeSequence::new(&mut mesh, discard, keep).with_options(options);
    welder.weld()?;
    let elapsed = start.elapsed();
    let splits = welder.splits();
    let unmerged = welder.unmerged_edge_pairs().len();
    drop(welder);

    println!("Done in {:.2?}: {} splits, {} unmerged edge pairs", elapsed, splits, unmerged);
    println!("Result: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());

    io::save(&mesh, output)?;
    info!("saved {}", output.display());
    Ok(())
}

fn cmd_weld_vertices(
    input: &PathBuf,
    output: &PathBuf,
    keep: usize,
    discard: usize,
    options: &VertexWeldOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = io::load(input)?;

    let outcome = weld_vertex_pair(&mut mesh, VertexId::new(keep), VertexId::new(discard), options)?;
    match outcome {
        VertexWeld::Merged(merge) => println!(
            "Merged: {} edges and {} triangles removed",
            merge.removed_edges.len(),
            merge.removed_triangles.len()
        ),
        VertexWeld::RemovedTriangles => println!("Collapse refused, removed the connecting triangles"),
        VertexWeld::Moved => println!("Merge would be non-manifold or a bowtie, vertices moved together"),
    }

    io::save(&mesh, output)?;
    Ok(())
}
