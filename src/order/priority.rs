use super::VertexOrder;
use crate::graph::Graph;
use crate::types::VertexId;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};

/// In-degree of every vertex in the priority DAG: the number of neighbors
/// ranked before it that are still unresolved.
///
/// A degree reaches zero once, either because the vertex was resolved
/// directly or because its last preceding neighbor was.
pub struct PriorityDag {
    degrees: Vec<AtomicU32>,
}

impl PriorityDag {
    pub fn build<G, O>(graph: &G, order: &O) -> Self
    where
        G: Graph,
        O: VertexOrder + ?Sized,
    {
        let degrees = (0..graph.num_vertices())
            .into_par_iter()
            .map(|v| {
                let v = v as VertexId;
                let preceding = graph.count_out_ngh(v, |_, ngh| order.precedes(ngh, v));
                AtomicU32::new(preceding as u32)
            })
            .collect();
        Self { degrees }
    }

    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    pub fn degree(&self, v: VertexId) -> u32 {
        self.degrees[v as usize].load(Ordering::Acquire)
    }

    /// Still waiting on at least one preceding neighbor.
    pub fn is_live(&self, v: VertexId) -> bool {
        self.degree(v) > 0
    }

    /// Marks `v` resolved without it having become a root.
    pub fn resolve(&self, v: VertexId) {
        self.degrees[v as usize].store(0, Ordering::Release);
    }

    /// Decrement for callers that own `v` exclusively. Returns `true` when
    /// the degree drops to zero.
    pub fn decrement(&self, v: VertexId) -> bool {
        let slot = &self.degrees[v as usize];
        let remaining = slot.load(Ordering::Acquire) - 1;
        slot.store(remaining, Ordering::Release);
        remaining == 0
    }

    /// Concurrent decrement. Exactly one caller observes the drop to zero.
    pub fn decrement_atomic(&self, v: VertexId) -> bool {
        self.degrees[v as usize].fetch_sub(1, Ordering::AcqRel) == 1
    }

    /// Vertices with no preceding neighbor.
    pub fn roots(&self) -> Vec<VertexId> {
        self.degrees
            .par_iter()
            .enumerate()
            .filter(|(_, d)| d.load(Ordering::Acquire) == 0)
            .map(|(v, _)| v as VertexId)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CsrGraph;
    use crate::order::{IdOrder, PermutationOrder};

    #[test]
    fn test_id_order_degrees_on_path() {
        // 0 - 1 - 2 - 3
        let g = CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        let dag = PriorityDag::build(&g, &IdOrder);
        assert_eq!((0..4).map(|v| dag.degree(v)).collect::<Vec<_>>(), vec![0, 1, 1, 1]);
        assert_eq!(dag.roots(), vec![0]);
    }

    #[test]
    fn test_permutation_degrees_sum_to_edges() {
        let g = CsrGraph::from_edges(5, &[(0, 1), (0, 2), (1, 2), (3, 4), (2, 4)]).unwrap();
        let dag = PriorityDag::build(&g, &PermutationOrder::random(5, 9));
        let total: u32 = (0..5).map(|v| dag.degree(v)).sum();
        assert_eq!(total as usize, g.num_edges() / 2);
        assert!(!dag.roots().is_empty());
    }

    #[test]
    fn test_decrement_hits_zero_once() {
        let g = CsrGraph::from_edges(3, &[(0, 2), (1, 2)]).unwrap();
        let dag = PriorityDag::build(&g, &IdOrder);
        assert_eq!(dag.degree(2), 2);
        assert!(!dag.decrement_atomic(2));
        assert!(dag.decrement(2));
        assert!(!dag.is_live(2));

        dag.resolve(0);
        assert_eq!(dag.degree(0), 0);
    }

    #[test]
    fn test_concurrent_decrements_single_winner() {
        let n = 1001;
        let edges: Vec<_> = (1..n as u32).map(|leaf| (leaf, 0)).collect();
        let g = CsrGraph::from_edges(n, &edges).unwrap();
        // Under reversed id order vertex 0 comes last, after all leaves.
        let ranks: Vec<u32> = (0..n as u32).map(|v| n as u32 - 1 - v).collect();
        let dag = PriorityDag::build(&g, &PermutationOrder::from_ranks(ranks).unwrap());
        assert_eq!(dag.degree(0), 1000);

        let winners = (1..n as u32)
            .into_par_iter()
            .filter(|_| dag.decrement_atomic(0))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(dag.degree(0), 0);
    }
}
