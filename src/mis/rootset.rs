use crate::config::MisConfig;
use crate::frontier::{EdgeMap, EdgeUpdate, NeighborExpansion, VertexSubset};
use crate::graph::Graph;
use crate::order::{PriorityDag, VertexOrder};
use crate::types::{Algorithm, MisError, MisFlag, MisResult, RoundRecord, RunStats, VertexId};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// MIS by peeling the priority DAG.
///
/// # Algorithm
/// ```text
/// roots = vertices with no preceding neighbor
/// while vertices remain:
///   1. roots join the MIS
///   2. removed = live neighbors of roots
///   3. removed vertices are resolved (degree forced to 0)
///   4. each removed vertex decrements the neighbors it precedes;
///      a neighbor whose degree hits 0 is a root next round
/// ```
///
/// # Example
/// ```text
/// path 0 - 1 - 2 - 3, id order
///
/// round 0: roots={0}  removed={1}  2 loses its last predecessor -> root
/// round 1: roots={2}  removed={3}
/// MIS = {0, 2}
/// ```
pub struct RootsetMis<'a, G: Graph, O: VertexOrder + ?Sized> {
    graph: &'a G,
    order: &'a O,
    expansion: NeighborExpansion,
    edge_map: EdgeMap,
}

/// Decrements successors of removed vertices; zero-degree targets become roots.
struct ResolveSuccessors<'a, O: VertexOrder + ?Sized> {
    dag: &'a PriorityDag,
    order: &'a O,
}

impl<O: VertexOrder + ?Sized> EdgeUpdate for ResolveSuccessors<'_, O> {
    fn update(&self, src: VertexId, dst: VertexId) -> bool {
        self.order.precedes(src, dst) && self.dag.decrement(dst)
    }

    fn update_atomic(&self, src: VertexId, dst: VertexId) -> bool {
        self.order.precedes(src, dst) && self.dag.decrement_atomic(dst)
    }

    fn cond(&self, dst: VertexId) -> bool {
        self.dag.is_live(dst)
    }
}

impl<'a, G: Graph, O: VertexOrder + ?Sized> RootsetMis<'a, G, O> {
    pub fn new(graph: &'a G, order: &'a O, config: &MisConfig) -> Self {
        Self {
            graph,
            order,
            expansion: NeighborExpansion::new(config.expansion, config.dense_threshold_divisor),
            edge_map: EdgeMap::new(config.expansion, config.edge_map_threshold_divisor),
        }
    }

    pub fn run(&self) -> Result<MisResult, MisError> {
        let start = Instant::now();
        let n = self.graph.num_vertices();
        let mut stats = RunStats::new(Algorithm::Rootset, self.order.name());

        let dag = PriorityDag::build(self.graph, self.order);
        let mut roots = VertexSubset::from_ids(n, dag.roots());
        let in_mis: Vec<AtomicBool> = (0..n).into_par_iter().map(|_| AtomicBool::new(false)).collect();
        let successors = ResolveSuccessors {
            dag: &dag,
            order: self.order,
        };

        let mut finished = 0;
        while finished != n {
            let round = stats.rounds;
            if roots.is_empty() {
                return Err(MisError::EmptyFrontier {
                    round,
                    remaining: n - finished,
                });
            }
            debug!(
                "round = {} size = {} remaining = {}",
                round,
                roots.len(),
                n - finished
            );

            roots.for_each(|v| in_mis[v as usize].store(true, Ordering::Relaxed));

            let (removed, mode) = self
                .expansion
                .expand(self.graph, &roots, |ngh| dag.is_live(ngh));
            removed.for_each(|v| dag.resolve(v));

            let (new_roots, traversal) = self.edge_map.apply(self.graph, &removed, &successors);

            let resolved = roots.len() + removed.len();
            finished += resolved;
            stats.record(RoundRecord {
                round,
                frontier: roots.len(),
                resolved,
                remaining: n - finished,
                mode: Some(mode),
                traversal: Some(traversal),
            });
            roots = new_roots;
        }

        let flags: Vec<MisFlag> = in_mis
            .into_par_iter()
            .map(|member| {
                if member.into_inner() {
                    MisFlag::Chosen
                } else {
                    MisFlag::Excluded
                }
            })
            .collect();
        stats.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let result = MisResult { flags, stats };
        info!(
            "Rootset MIS: {} of {} vertices in {} rounds ({:.2} ms)",
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
    use crate::types::ExpansionMode;
    use crate::verify::verify_flags;

    fn run_with<O: VertexOrder>(g: &CsrGraph, order: &O, config: &MisConfig) -> MisResult {
        let result = RootsetMis::new(g, order, config).run().unwrap();
        assert!(verify_flags(g, &result.flags).unwrap().valid);
        result
    }

    #[test]
    fn test_path_with_id_order() {
        let g = CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        let result = run_with(&g, &IdOrder, &MisConfig::default());
        assert_eq!(result.members(), vec![0, 2]);
        assert_eq!(result.stats.rounds, 2);
    }

    #[test]
    fn test_four_cycle_picks_opposite_pair() {
        let g = CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
        for seed in 0..20 {
            let result = run_with(&g, &PermutationOrder::random(4, seed), &MisConfig::default());
            let members = result.members();
            assert!(members == vec![0, 2] || members == vec![1, 3], "{:?}", members);
        }
    }

    #[test]
    fn test_empty_graph_has_no_rounds() {
        let g = CsrGraph::empty(0);
        let result = run_with(&g, &IdOrder, &MisConfig::default());
        assert_eq!(result.stats.rounds, 0);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_isolated_vertices_finish_in_one_round() {
        let g = CsrGraph::empty(100);
        let result = run_with(&g, &PermutationOrder::random(100, 1), &MisConfig::default());
        assert_eq!(result.size(), 100);
        assert_eq!(result.stats.rounds, 1);
    }

    #[test]
    fn test_star_is_center_or_all_leaves() {
        let g = GraphGenerator::new(GraphKind::Star, 30, 0, 0).generate().unwrap();
        for seed in 0..20 {
            let result = run_with(&g, &PermutationOrder::random(30, seed), &MisConfig::default());
            let members = result.members();
            assert!(members == vec![0] || members == (1..30).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_forced_strategies_and_orders_stay_valid() {
        let g = GraphGenerator::new(GraphKind::Random, 2000, 8, 5).generate().unwrap();
        for config in [MisConfig::sparse_only(), MisConfig::dense_only(), MisConfig::default()] {
            run_with(&g, &PermutationOrder::random(2000, 3), &config);
            run_with(&g, &HashOrder::new(3), &config);
            run_with(&g, &IdOrder, &config);
        }
    }

    #[test]
    fn test_round_log_records_traversal_strategy() {
        // Every round of the id-ordered path removes a vertex, so the
        // successor traversal always runs with the forced strategy.
        let g = CsrGraph::from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]).unwrap();
        let pull = run_with(&g, &IdOrder, &MisConfig::dense_only());
        assert!(pull
            .stats
            .round_log
            .iter()
            .all(|r| r.mode == Some(ExpansionMode::Dense) && r.traversal == Some(ExpansionMode::Dense)));

        let push = run_with(&g, &IdOrder, &MisConfig::sparse_only());
        assert!(push
            .stats
            .round_log
            .iter()
            .all(|r| r.mode == Some(ExpansionMode::Sparse) && r.traversal == Some(ExpansionMode::Sparse)));
    }

    #[test]
    fn test_same_order_same_result_across_strategies() {
        let g = GraphGenerator::new(GraphKind::Random, 500, 6, 8).generate().unwrap();
        let order = PermutationOrder::random(500, 4);
        let sparse = run_with(&g, &order, &MisConfig::sparse_only());
        let dense = run_with(&g, &order, &MisConfig::dense_only());
        assert_eq!(sparse.flags, dense.flags);
        assert_eq!(sparse.stats.rounds, dense.stats.rounds);
    }

    #[test]
    fn test_chain_rounds_are_logarithmic() {
        let n = 20_000;
        let g = GraphGenerator::new(GraphKind::Chain, n, 0, 0).generate().unwrap();
        let result = run_with(&g, &PermutationOrder::random(n, 17), &MisConfig::default());
        // log2(20000) is about 14.3.
        assert!(result.stats.rounds <= 60, "rounds = {}", result.stats.rounds);
    }

    #[test]
    fn test_round_log_accounts_for_every_vertex() {
        let g = GraphGenerator::new(GraphKind::Grid, 400, 0, 0).generate().unwrap();
        let result = run_with(&g, &HashOrder::new(2), &MisConfig::default());
        let resolved: usize = result.stats.round_log.iter().map(|r| r.resolved).sum();
        assert_eq!(resolved, 400);
        assert_eq!(result.stats.round_log.last().unwrap().remaining, 0);
    }
}
