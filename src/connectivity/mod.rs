use crate::frontier::{EdgeMap, EdgeUpdate, VertexSubset};
use crate::graph::Graph;
use crate::types::{VertexId, NO_VERTEX};
use ahash::AHashMap;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

/// Labels each unlabeled vertex it reaches with the BFS source.
struct ComponentLabel<'a> {
    labels: &'a [AtomicU32],
    src: VertexId,
}

impl EdgeUpdate for ComponentLabel<'_> {
    fn update(&self, _: VertexId, dst: VertexId) -> bool {
        let label = &self.labels[dst as usize];
        if label.load(Ordering::Relaxed) != self.src {
            label.store(self.src, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    fn update_atomic(&self, _: VertexId, dst: VertexId) -> bool {
        self.labels[dst as usize]
            .compare_exchange(NO_VERTEX, self.src, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn cond(&self, dst: VertexId) -> bool {
        self.labels[dst as usize].load(Ordering::Acquire) == NO_VERTEX
    }
}

/// Component label per vertex: the smallest id in its component.
///
/// Sources are tried in id order; each unlabeled one starts a BFS whose
/// levels are expanded with `edge_map`.
pub fn bfs_components<G: Graph>(graph: &G, edge_map: &EdgeMap) -> Vec<VertexId> {
    let n = graph.num_vertices();
    let labels: Vec<AtomicU32> = (0..n).into_par_iter().map(|_| AtomicU32::new(NO_VERTEX)).collect();

    for src in 0..n as VertexId {
        if labels[src as usize].load(Ordering::Relaxed) != NO_VERTEX {
            continue;
        }
        labels[src as usize].store(src, Ordering::Relaxed);
        let visit = ComponentLabel {
            labels: &labels,
            src,
        };

        let mut frontier = VertexSubset::single(n, src);
        let mut reached = 0;
        let mut rounds = 0;
        while !frontier.is_empty() {
            reached += frontier.len();
            let (next, _) = edge_map.apply(graph, &frontier, &visit);
            frontier = next;
            rounds += 1;
        }
        if reached > 1 {
            debug!("component {}: {} vertices, {} levels", src, reached, rounds);
        }
    }

    labels.into_par_iter().map(AtomicU32::into_inner).collect()
}

pub fn num_components(labels: &[VertexId]) -> usize {
    labels
        .par_iter()
        .enumerate()
        .filter(|(v, label)| *v as VertexId == **label)
        .count()
}

pub fn largest_component(labels: &[VertexId]) -> usize {
    let mut sizes: AHashMap<VertexId, usize> = AHashMap::new();
    for &label in labels {
        *sizes.entry(label).or_default() += 1;
    }
    sizes.values().copied().max().unwrap_or(0)
}
