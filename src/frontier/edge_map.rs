use super::VertexSubset;
use crate::graph::Graph;
use crate::types::{ExpansionMode, VertexId};
use rayon::prelude::*;

/// Per-edge rule applied by [`EdgeMap`].
///
/// `cond(d)` gates whether `d` can still change. `update` runs when the
/// caller has exclusive access to `d`; `update_atomic` may race with other
/// sources targeting the same `d`. Both return whether `d` joins the output
/// frontier, and across one traversal at most one call may return `true`
/// for a given `d`.
pub trait EdgeUpdate: Sync {
    fn update(&self, src: VertexId, dst: VertexId) -> bool;
    fn update_atomic(&self, src: VertexId, dst: VertexId) -> bool;
    fn cond(&self, dst: VertexId) -> bool;
}

/// Frontier-to-frontier edge traversal with a push/pull switch.
#[derive(Debug, Clone, Copy)]
pub struct EdgeMap {
    mode: ExpansionMode,
    threshold_divisor: usize,
}

impl EdgeMap {
    pub fn new(mode: ExpansionMode, threshold_divisor: usize) -> Self {
        Self {
            mode,
            threshold_divisor: threshold_divisor.max(1),
        }
    }

    pub fn choose(&self, work: usize, total_edges: usize) -> ExpansionMode {
        match self.mode {
            ExpansionMode::Auto if work > total_edges / self.threshold_divisor => {
                ExpansionMode::Dense
            }
            ExpansionMode::Auto => ExpansionMode::Sparse,
            forced => forced,
        }
    }

    pub fn apply<G, F>(&self, graph: &G, frontier: &VertexSubset, f: &F) -> (VertexSubset, ExpansionMode)
    where
        G: Graph,
        F: EdgeUpdate,
    {
        let n = graph.num_vertices();
        if frontier.is_empty() {
            return (VertexSubset::empty(n), ExpansionMode::Sparse);
        }

        match frontier {
            VertexSubset::Sparse { ids, .. } => {
                let degrees: usize = ids.par_iter().map(|&v| graph.out_degree(v)).sum();
                match self.choose(ids.len() + degrees, graph.num_edges()) {
                    ExpansionMode::Dense => {
                        let flags = frontier.to_flags();
                        (pull(graph, &flags, f), ExpansionMode::Dense)
                    }
                    _ => (push(graph, ids, f), ExpansionMode::Sparse),
                }
            }
            VertexSubset::Dense { flags, count, .. } => {
                let degrees: usize = flags
                    .par_iter()
                    .enumerate()
                    .filter(|(_, member)| **member)
                    .map(|(v, _)| graph.out_degree(v as VertexId))
                    .sum();
                match self.choose(count + degrees, graph.num_edges()) {
                    ExpansionMode::Sparse => (push(graph, &frontier.to_ids(), f), ExpansionMode::Sparse),
                    _ => (pull(graph, flags, f), ExpansionMode::Dense),
                }
            }
        }
    }
}

/// Sparse push: each frontier vertex offers its edges concurrently.
fn push<G, F>(graph: &G, ids: &[VertexId], f: &F) -> VertexSubset
where
    G: Graph,
    F: EdgeUpdate,
{
    let next: Vec<VertexId> = ids
        .par_iter()
        .flat_map_iter(|&src| {
            graph
                .out_neighbors(src)
                .iter()
                .filter(move |&&dst| f.cond(dst) && f.update_atomic(src, dst))
                .copied()
        })
        .collect();
    VertexSubset::from_ids(graph.num_vertices(), next)
}

/// Dense pull: each eligible vertex scans its neighbors for frontier members.
/// Adjacency is symmetric, so out-neighbors are the in-neighbors here.
fn pull<G, F>(graph: &G, in_frontier: &[bool], f: &F) -> VertexSubset
where
    G: Graph,
    F: EdgeUpdate,
{
    let next: Vec<bool> = (0..graph.num_vertices())
        .into_par_iter()
        .map(|dst| {
            let dst = dst as VertexId;
            if !f.cond(dst) {
                return false;
            }
            let mut activated = false;
            for &src in graph.out_neighbors(dst) {
                if in_frontier[src as usize] && f.update(src, dst) {
                    activated = true;
                }
                if !f.cond(dst) {
                    break;
                }
            }
            activated
        })
        .collect();
    VertexSubset::from_flags(next)
}
