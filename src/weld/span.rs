//! Open polylines along mesh boundary edges.

use crate::mesh::{EdgeId, VertexId, WeldMesh};

/// An ordered, open sequence of vertices and the edges between them.
///
/// `edges[i]` connects `vertices[i]` and `vertices[i + 1]`, so a non-empty
/// span always has exactly one more vertex than edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSpan {
    /// Vertices in walking order.
    pub vertices: Vec<VertexId>,
    /// Edges in walking order.
    pub edges: Vec<EdgeId>,
}

impl EdgeSpan {
    /// Create an empty span.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a span through consecutive vertices.
    ///
    /// Returns `None` if two consecutive vertices are not joined by an edge.
    pub fn from_vertices<M: WeldMesh + ?Sized>(mesh: &M, vertices: &[VertexId]) -> Option<Self> {
        let edges = vertices
            .windows(2)
            .map(|w| mesh.find_edge(w[0], w[1]))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            vertices: vertices.to_vec(),
            edges,
        })
    }

    /// Build a span from consecutive edges.
    ///
    /// The walking direction is taken from the edge order: the first vertex is
    /// the endpoint of `edges[0]` not shared with `edges[1]`. Returns `None` if
    /// an edge is missing or two consecutive edges do not share a vertex.
    pub fn from_edges<M: WeldMesh + ?Sized>(mesh: &M, edges: &[EdgeId]) -> Option<Self> {
        let Some(&first) = edges.first() else {
            return Some(Self::new());
        };
        let [a, b] = mesh.edge_vertices(first)?;

        let start = match edges.get(1) {
            None => a,
            Some(&second) => {
                let next = mesh.edge_vertices(second)?;
                if next.contains(&b) {
                    a
                } else if next.contains(&a) {
                    b
                } else {
                    return None;
                }
            }
        };

        let mut vertices = Vec::with_capacity(edges.len() + 1);
        vertices.push(start);
        let mut current = start;
        for &e in edges {
            let [x, y] = mesh.edge_vertices(e)?;
            current = if x == current {
                y
            } else if y == current {
                x
            } else {
                return None;
            };
            vertices.push(current);
        }

        Some(Self {
            vertices,
            edges: edges.to_vec(),
        })
    }

    /// Number of edges in the span.
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True if the span has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether the vertex and edge counts agree.
    pub fn is_consistent(&self) -> bool {
        if self.vertices.is_empty() {
            return self.edges.is_empty();
        }
        self.vertices.len() == self.edges.len() + 1
    }

    /// Whether every edge of the span is a boundary edge.
    pub fn is_boundary<M: WeldMesh + ?Sized>(&self, mesh: &M) -> bool {
        self.edges.iter().all(|&e| mesh.is_boundary_edge(e))
    }

    /// Reverse the walking direction.
    pub fn reverse(&mut self) {
        self.vertices.reverse();
        self.edges.reverse();
    }

    /// Orient the span to follow the winding of the boundary it lies on.
    ///
    /// Uses the first boundary edge of the span. Returns true if the span was
    /// reversed.
    pub fn set_correct_orientation<M: WeldMesh + ?Sized>(&mut self, mesh: &M) -> bool {
        let oriented = self.edges.iter().enumerate().find_map(|(i, &e)| {
            mesh.oriented_boundary_edge_vertices(e).map(|vs| (i, vs))
        });
        match oriented {
            Some((i, [from, _])) if self.vertices.get(i) != Some(&from) => {
                self.reverse();
                true
            }
            _ => false,
        }
    }

    /// Shrink the span to its longest run of segments that still exist.
    ///
    /// A segment survives if both of its vertices and its edge are alive and
    /// the edge still joins those vertices. The first run wins ties. If no
    /// segment survives, the span keeps a single live vertex, or becomes empty.
    pub fn retain_valid_run<M: WeldMesh + ?Sized>(&mut self, mesh: &M) {
        let segment_valid = |i: usize| {
            let (a, b, e) = (self.vertices[i], self.vertices[i + 1], self.edges[i]);
            mesh.is_vertex(a)
                && mesh.is_vertex(b)
                && mesh
                    .edge_vertices(e)
                    .map_or(false, |vs| vs.contains(&a) && vs.contains(&b))
        };

        let mut best: Option<(usize, usize)> = None;
        let mut run_start = None;
        for i in 0..=self.edges.len() {
            let valid = i < self.edges.len() && segment_valid(i);
            match (valid, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    if best.map_or(true, |(s, e)| i - start > e - s) {
                        best = Some((start, i));
                    }
                    run_start = None;
                }
                _ => {}
            }
        }

        match best {
            Some((start, end)) => {
                self.vertices = self.vertices[start..=end].to_vec();
                self.edges = self.edges[start..end].to_vec();
            }
            None => {
                let survivor = self.vertices.iter().copied().find(|&v| mesh.is_vertex(v));
                self.vertices = survivor.into_iter().collect();
                self.edges.clear();
            }
        }
    }
}
