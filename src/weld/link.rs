//! Welding seams made of several boundary spans.
//!
//! An editing tool usually hands over a set of boundary spans, for example the
//! edges between polygon-group corners, without saying which ones belong
//! together. [`link_boundary_spans`] chains the spans through their endpoints
//! into two open sequences, and [`weld_linked_spans`] welds one sequence onto
//! the other so that span corners on one side meet span corners on the other.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::equalize::equalize_span_lengths;
use super::sequence::{WeldEdgeSequence, WeldOptions};
use super::span::EdgeSpan;
use crate::error::{EdgePair, WeldError};
use crate::mesh::{EdgeId, VertexId, WeldMesh};

/// Spans split into at most two boundary chains.
///
/// Each chain lists indices into the span slice passed to
/// [`link_boundary_spans`], in boundary winding order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanPartition {
    /// The first chain. Welded away by [`weld_linked_spans`].
    pub first: Vec<usize>,
    /// The second chain, empty when the spans form one closed loop.
    pub second: Vec<usize>,
    /// Whether `first` (rather than `second`) should be reversed when pairing
    /// spans across the two chains.
    pub reverse_first: bool,
}

impl SpanPartition {
    /// True if the spans formed a single closed loop.
    pub fn is_loop(&self) -> bool {
        self.second.is_empty()
    }
}

/// Summary of a [`weld_linked_spans`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedWeldReport {
    /// Edge splits made while equalizing span pairs.
    pub splits: usize,
    /// Keep/discard edge pairs that were moved together but not merged.
    pub unmerged_edge_pairs: Vec<EdgePair>,
    /// Edges of the surviving chain.
    pub kept_edges: Vec<EdgeId>,
}

impl LinkedWeldReport {
    /// True if part of the seam remains topologically open.
    pub fn has_seam(&self) -> bool {
        !self.unmerged_edge_pairs.is_empty()
    }
}

fn is_closed(span: &EdgeSpan) -> bool {
    span.vertices.len() > 2 && span.vertices.first() == span.vertices.last()
}

/// Partition boundary spans into one closed loop or two open chains.
///
/// Spans are chained where one ends, in boundary winding order, at the vertex
/// where the next starts. The order of `spans` is taken as selection order:
/// when the chains have different lengths, `reverse_first` is set so that
/// pairing starts from the end of the longer chain that was selected first.
///
/// Returns `None` if a span is not on the boundary, a span is itself closed
/// (unless it is the only one), two spans start or end at the same vertex,
/// there are more than two chains, or either of two chains is closed.
pub fn link_boundary_spans<M: WeldMesh + ?Sized>(
    mesh: &M,
    spans: &[EdgeSpan],
) -> Option<SpanPartition> {
    if spans.is_empty() {
        return None;
    }

    if spans.len() == 1 {
        let span = &spans[0];
        return (is_closed(span) && span.is_boundary(mesh)).then(|| SpanPartition {
            first: vec![0],
            second: Vec::new(),
            reverse_first: false,
        });
    }

    if spans
        .iter()
        .any(|s| s.edges.is_empty() || !s.is_consistent() || is_closed(s) || !s.is_boundary(mesh))
    {
        return None;
    }

    if spans.len() == 2 {
        return Some(SpanPartition {
            first: vec![0],
            second: vec![1],
            reverse_first: false,
        });
    }

    // (vertex, is_start) -> span, and span -> (start, end) in winding order
    let mut endpoint_to_span: HashMap<(VertexId, bool), usize> = HashMap::new();
    let mut start_end: Vec<(VertexId, VertexId)> = Vec::with_capacity(spans.len());
    for (i, span) in spans.iter().enumerate() {
        let [from, _] = mesh.oriented_boundary_edge_vertices(span.edges[0])?;
        let (first, last) = (span.vertices[0], *span.vertices.last()?);
        let reversed = from != first;

        let key_first = (first, !reversed);
        let key_last = (last, reversed);
        if endpoint_to_span.contains_key(&key_first) || endpoint_to_span.contains_key(&key_last) {
            debug!("span {} shares an endpoint with another span", i);
            return None;
        }
        endpoint_to_span.insert(key_first, i);
        endpoint_to_span.insert(key_last, i);
        start_end.push(if reversed { (last, first) } else { (first, last) });
    }

    let mut partitioned: HashSet<usize> = HashSet::new();
    let mut chain_from = |start: usize| -> Vec<usize> {
        let mut chain = Vec::new();
        if !partitioned.insert(start) {
            return chain;
        }

        let mut endpoint = start_end[start].0;
        while let Some(&prev) = endpoint_to_span.get(&(endpoint, false)) {
            if !partitioned.insert(prev) {
                break;
            }
            chain.push(prev);
            endpoint = start_end[prev].0;
        }
        chain.reverse();

        chain.push(start);
        endpoint = start_end[start].1;
        while let Some(&next) = endpoint_to_span.get(&(endpoint, true)) {
            if !partitioned.insert(next) {
                break;
            }
            chain.push(next);
            endpoint = start_end[next].1;
        }
        chain
    };

    let mut first: Vec<usize> = Vec::new();
    let mut second: Vec<usize> = Vec::new();
    for i in 0..spans.len() {
        let chain = chain_from(i);
        if chain.is_empty() {
            continue;
        }
        if first.is_empty() {
            first = chain;
        } else if second.is_empty() {
            second = chain;
        } else {
            debug!("spans form more than two chains");
            return None;
        }
    }

    let chain_closed =
        |chain: &[usize]| start_end[chain[0]].0 == start_end[chain[chain.len() - 1]].1;

    if second.is_empty() {
        return chain_closed(&first).then_some(SpanPartition {
            first,
            second,
            reverse_first: false,
        });
    }

    let reverse_first = match first.len().cmp(&second.len()) {
        std::cmp::Ordering::Greater => first[first.len() - 1] < first[0],
        std::cmp::Ordering::Less => second[0] < second[second.len() - 1],
        std::cmp::Ordering::Equal => false,
    };

    if chain_closed(&first) || chain_closed(&second) {
        return None;
    }
    Some(SpanPartition {
        first,
        second,
        reverse_first,
    })
}

/// Weld the first chain of a partition onto the second.
///
/// Spans are paired across the chains in order. When one chain has more
/// spans, its extra spans are joined with the last pair. Each pair is
/// equalized on its own so that span corners meet, then the whole chains are
/// welded in one [`WeldEdgeSequence`].
///
/// # Errors
///
/// [`WeldError::Other`] if the partition is a single loop or the spans do not
/// join up; otherwise any error of [`equalize_span_lengths`] or
/// [`WeldEdgeSequence::weld`]. Edits made before an error remain.
pub fn weld_linked_spans<M: WeldMesh + ?Sized>(
    mesh: &mut M,
    spans: &[EdgeSpan],
    partition: &SpanPartition,
    options: &WeldOptions,
) -> Result<LinkedWeldReport, WeldError> {
    if partition.is_loop() || partition.first.is_empty() {
        return Err(WeldError::Other);
    }
    let lookup = |i: usize| spans.get(i).cloned().ok_or(WeldError::Other);

    // The chains wind in opposite directions; reverse one so pairs line up
    let mut first = partition.first.clone();
    let mut second = partition.second.clone();
    if partition.reverse_first {
        first.reverse();
    } else {
        second.reverse();
    }

    let mut splits = 0;
    let mut discard_edges: Vec<EdgeId> = Vec::new();
    let mut keep_edges: Vec<EdgeId> = Vec::new();
    let mut prepare_pair = |mesh: &mut M, mut a: EdgeSpan, mut b: EdgeSpan| -> Result<(), WeldError> {
        a.set_correct_orientation(&*mesh);
        b.set_correct_orientation(&*mesh);
        splits += equalize_span_lengths(&mut *mesh, &mut a, &mut b)?;
        if partition.reverse_first {
            discard_edges.splice(0..0, a.edges);
            keep_edges.extend(b.edges);
        } else {
            discard_edges.extend(a.edges);
            keep_edges.splice(0..0, b.edges);
        }
        Ok(())
    };

    let matched = if first.len() == second.len() {
        first.len()
    } else {
        first.len().min(second.len()) - 1
    };
    for i in 0..matched {
        prepare_pair(&mut *mesh, lookup(first[i])?, lookup(second[i])?)?;
    }

    if matched < first.len() {
        let joined = |chain: &[usize], from_end: bool| -> Result<EdgeSpan, WeldError> {
            let mut eids = Vec::new();
            for i in 0..chain.len() - matched {
                let index = if from_end { chain.len() - 1 - i } else { matched + i };
                let mut span = lookup(chain[index])?;
                span.set_correct_orientation(&*mesh);
                eids.extend(span.edges);
            }
            EdgeSpan::from_edges(&*mesh, &eids).ok_or(WeldError::Other)
        };
        let a = joined(&first, partition.reverse_first)?;
        let b = joined(&second, !partition.reverse_first)?;
        prepare_pair(&mut *mesh, a, b)?;
    }

    let discard = EdgeSpan::from_edges(&*mesh, &discard_edges).ok_or(WeldError::Other)?;
    let keep = EdgeSpan::from_edges(&*mesh, &keep_edges).ok_or(WeldError::Other)?;

    let mut welder = WeldEdgeSequence::new(mesh, discard, keep).with_options(options.clone());
    welder.weld()?;

    Ok(LinkedWeldReport {
        splits: splits + welder.splits(),
        unmerged_edge_pairs: welder.unmerged_edge_pairs().to_vec(),
        kept_edges: welder.span_to_keep().edges.clone(),
    })
}
