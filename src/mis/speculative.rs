use crate::config::MisConfig;
use crate::graph::Graph;
use crate::order::{self, VertexOrder};
use crate::spec_for::{SpeculativeFor, SpeculativeStep};
use crate::types::{Algorithm, MisError, MisFlag, MisResult, RunStats, VertexId};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;
use tracing::info;

/// MIS by speculative reserve/commit rounds.
///
/// A vertex joins once every neighbor ranked before it is decided and none
/// of them joined; it is excluded as soon as one of them joined.
pub struct SpeculativeMis<'a, G: Graph, O: VertexOrder + ?Sized> {
    graph: &'a G,
    order: &'a O,
    engine: SpeculativeFor,
}

/// Step over positions in the tie-break order.
///
/// `flags` holds published decisions and is only written by `commit`;
/// `next` holds tentative ones and is only written by `reserve`.
struct MisStep<'a, G: Graph, O: VertexOrder + ?Sized> {
    graph: &'a G,
    order: &'a O,
    schedule: &'a [VertexId],
    flags: &'a [AtomicU8],
    next: &'a [AtomicU8],
}

impl<G: Graph, O: VertexOrder + ?Sized> MisStep<'_, G, O> {
    fn flag(&self, v: VertexId) -> MisFlag {
        MisFlag::from_u8(self.flags[v as usize].load(Ordering::Relaxed))
    }
}

impl<G: Graph, O: VertexOrder + ?Sized> SpeculativeStep for MisStep<'_, G, O> {
    fn reserve(&self, i: usize) -> bool {
        let v = self.schedule[i];
        let (chosen, undecided) = self.graph.reduce_out_ngh(
            v,
            (0usize, 0usize),
            |src, ngh| {
                if !self.order.precedes(ngh, src) {
                    return (0, 0);
                }
                match self.flag(ngh) {
                    MisFlag::Chosen => (1, 0),
                    MisFlag::Undecided => (0, 1),
                    MisFlag::Excluded => (0, 0),
                }
            },
            |l, r| (l.0 + r.0, l.1 + r.1),
        );

        let tentative = if chosen > 0 {
            MisFlag::Excluded
        } else if undecided > 0 {
            MisFlag::Undecided
        } else {
            MisFlag::Chosen
        };
        self.next[v as usize].store(tentative.as_u8(), Ordering::Relaxed);
        true
    }

    fn commit(&self, i: usize) -> bool {
        let v = self.schedule[i] as usize;
        let decided = self.next[v].load(Ordering::Relaxed);
        self.flags[v].store(decided, Ordering::Relaxed);
        MisFlag::from_u8(decided).is_decided()
    }
}

impl<'a, G: Graph, O: VertexOrder + ?Sized> SpeculativeMis<'a, G, O> {
    pub fn new(graph: &'a G, order: &'a O, config: &MisConfig) -> Self {
        Self {
            graph,
            order,
            engine: SpeculativeFor::new(config.batch_size),
        }
    }

    pub fn run(&self) -> Result<MisResult, MisError> {
        let start = Instant::now();
        let n = self.graph.num_vertices();
        let mut stats = RunStats::new(Algorithm::Speculative, self.order.name());

        let schedule = order::schedule(n, self.order);
        let flags: Vec<AtomicU8> = (0..n).into_par_iter().map(|_| AtomicU8::new(0)).collect();
        let next: Vec<AtomicU8> = (0..n).into_par_iter().map(|_| AtomicU8::new(0)).collect();
        let step = MisStep {
            graph: self.graph,
            order: self.order,
            schedule: &schedule,
            flags: &flags,
            next: &next,
        };

        for record in self.engine.run(&step, 0, n)? {
            stats.record(record);
        }

        let flags: Vec<MisFlag> = flags
            .into_par_iter()
            .map(|f| MisFlag::from_u8(f.into_inner()))
            .collect();
        stats.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let result = MisResult { flags, stats };
        info!(
            "Speculative MIS: {} of {} vertices in {} rounds ({:.2} ms)",
            result.size(),
            n,
            result.stats.rounds,
            result.stats.elapsed_ms
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GraphGenerator, GraphKind};
    use crate::graph::CsrGraph;
    use crate::order::{HashOrder, IdOrder, PermutationOrder};
    use crate::verify::verify_flags;

    fn run_with<O: VertexOrder>(g: &CsrGraph, order: &O, config: &MisConfig) -> MisResult {
        let result = SpeculativeMis::new(g, order, config).run().unwrap();
        assert!(verify_flags(g, &result.flags).unwrap().valid);
        result
    }

    /// Sequential greedy MIS in `order`, which the speculative run must match.
    fn greedy(g: &CsrGraph, schedule: &[VertexId]) -> Vec<bool> {
        let mut in_mis = vec![false; g.num_vertices()];
        let mut blocked = vec![false; g.num_vertices()];
        for &v in schedule {
            if !blocked[v as usize] {
                in_mis[v as usize] = true;
                for &ngh in g.out_neighbors(v) {
                    blocked[ngh as usize] = true;
                }
            }
        }
        in_mis
    }

    #[test]
    fn test_four_cycle_with_id_order() {
        let g = CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
        let result = run_with(&g, &IdOrder, &MisConfig::default());
        assert_eq!(result.members(), vec![0, 2]);
    }

    #[test]
    fn test_isolated_vertices_resolve_in_one_pass() {
        let g = CsrGraph::empty(64);
        let result = run_with(&g, &IdOrder, &MisConfig::default());
        assert_eq!(result.size(), 64);
        assert_eq!(result.stats.rounds, 1);
    }

    #[test]
    fn test_empty_graph() {
        let result = run_with(&CsrGraph::empty(0), &IdOrder, &MisConfig::default());
        assert_eq!(result.stats.rounds, 0);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_star_is_center_or_all_leaves() {
        let g = GraphGenerator::new(GraphKind::Star, 25, 0, 0).generate().unwrap();
        let by_id = run_with(&g, &IdOrder, &MisConfig::default());
        assert_eq!(by_id.members(), vec![0]);

        for seed in 0..10 {
            let result = run_with(&g, &PermutationOrder::random(25, seed), &MisConfig::default());
            let members = result.members();
            assert!(members == vec![0] || members == (1..25).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_matches_sequential_greedy() {
        let g = GraphGenerator::new(GraphKind::Random, 1500, 6, 21).generate().unwrap();
        let order = HashOrder::new(5);
        let expected = greedy(&g, &crate::order::schedule(1500, &order));
        let result = run_with(&g, &order, &MisConfig::default());
        assert_eq!(result.in_mis(), expected);
    }

    #[test]
    fn test_batch_size_does_not_change_result() {
        let g = GraphGenerator::new(GraphKind::Random, 1000, 5, 2).generate().unwrap();
        let order = PermutationOrder::random(1000, 6);
        let whole = run_with(&g, &order, &MisConfig::default());
        for batch_size in [1, 7, 128] {
            let config = MisConfig {
                batch_size: Some(batch_size),
                ..MisConfig::default()
            };
            let batched = run_with(&g, &order, &config);
            assert_eq!(batched.flags, whole.flags);
            assert!(batched.stats.round_log.iter().all(|r| r.frontier <= batch_size));
        }
    }
}
