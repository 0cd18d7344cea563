use super::{ConcurrentIdSet, VertexSubset};
use crate::graph::Graph;
use crate::types::{ExpansionMode, VertexId};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Computes the deduplicated out-neighbors of a frontier that satisfy a
/// predicate, choosing between a hash-set and a flag-array strategy.
#[derive(Debug, Clone, Copy)]
pub struct NeighborExpansion {
    mode: ExpansionMode,
    threshold_divisor: usize,
}

impl NeighborExpansion {
    pub fn new(mode: ExpansionMode, threshold_divisor: usize) -> Self {
        Self {
            mode,
            threshold_divisor: threshold_divisor.max(1),
        }
    }

    /// Strategy `Auto` resolves to for a frontier of `work` outgoing edges.
    pub fn choose(&self, work: usize, total_edges: usize) -> ExpansionMode {
        match self.mode {
            ExpansionMode::Auto if work > total_edges / self.threshold_divisor => {
                ExpansionMode::Dense
            }
            ExpansionMode::Auto => ExpansionMode::Sparse,
            forced => forced,
        }
    }

    /// Returns the neighbor set and the strategy used to build it.
    ///
    /// Both strategies yield the same set; only the representation and the
    /// amount of work differ.
    pub fn expand<G, P>(
        &self,
        graph: &G,
        frontier: &VertexSubset,
        pred: P,
    ) -> (VertexSubset, ExpansionMode)
    where
        G: Graph,
        P: Fn(VertexId) -> bool + Sync,
    {
        let n = graph.num_vertices();
        let ids = frontier.to_ids();
        let work: usize = ids.par_iter().map(|&v| graph.out_degree(v)).sum();

        match self.choose(work, graph.num_edges()) {
            ExpansionMode::Dense => (expand_dense(graph, &ids, &pred), ExpansionMode::Dense),
            _ => (
                VertexSubset::from_ids(n, expand_sparse(graph, &ids, &pred, work)),
                ExpansionMode::Sparse,
            ),
        }
    }
}

fn expand_dense<G, P>(graph: &G, ids: &[VertexId], pred: &P) -> VertexSubset
where
    G: Graph,
    P: Fn(VertexId) -> bool + Sync,
{
    let marks: Vec<AtomicBool> = (0..graph.num_vertices())
        .into_par_iter()
        .map(|_| AtomicBool::new(false))
        .collect();

    // Every writer stores `true`, so racing stores are harmless.
    ids.par_iter().for_each(|&v| {
        graph.map_out_ngh(v, |_, ngh| {
            let mark = &marks[ngh as usize];
            if pred(ngh) && !mark.load(Ordering::Relaxed) {
                mark.store(true, Ordering::Relaxed);
            }
        });
    });

    VertexSubset::from_flags(marks.into_par_iter().map(AtomicBool::into_inner).collect())
}

fn expand_sparse<G, P>(graph: &G, ids: &[VertexId], pred: &P, work: usize) -> Vec<VertexId>
where
    G: Graph,
    P: Fn(VertexId) -> bool + Sync,
{
    if work == 0 {
        return Vec::new();
    }
    let table = ConcurrentIdSet::with_capacity(work);
    ids.par_iter().for_each(|&v| {
        graph.map_out_ngh(v, |_, ngh| {
            if pred(ngh) {
                table.insert(ngh);
            }
        });
    });
    table.into_entries()
}
