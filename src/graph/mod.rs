use crate::types::{MisError, VertexId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read-only adjacency capabilities the MIS engine consumes.
///
/// Adjacency is symmetric: `u` lists `v` iff `v` lists `u`, so out-neighbors
/// double as in-neighbors for pull-style traversal.
pub trait Graph: Sync {
    fn num_vertices(&self) -> usize;

    /// Directed adjacency entries, i.e. twice the undirected edge count.
    fn num_edges(&self) -> usize;

    fn out_neighbors(&self, v: VertexId) -> &[VertexId];

    fn out_degree(&self, v: VertexId) -> usize {
        self.out_neighbors(v).len()
    }

    /// Calls `f(v, ngh)` for every out-neighbor.
    fn map_out_ngh<F>(&self, v: VertexId, mut f: F)
    where
        F: FnMut(VertexId, VertexId),
    {
        for &ngh in self.out_neighbors(v) {
            f(v, ngh);
        }
    }

    fn reduce_out_ngh<T, M, R>(&self, v: VertexId, identity: T, map: M, reduce: R) -> T
    where
        M: Fn(VertexId, VertexId) -> T,
        R: Fn(T, T) -> T,
    {
        self.out_neighbors(v)
            .iter()
            .fold(identity, |acc, &ngh| reduce(acc, map(v, ngh)))
    }

    fn count_out_ngh<P>(&self, v: VertexId, pred: P) -> usize
    where
        P: Fn(VertexId, VertexId) -> bool,
    {
        self.out_neighbors(v)
            .iter()
            .filter(|&&ngh| pred(v, ngh))
            .count()
    }
}

/// Compressed sparse row graph with sorted, duplicate-free adjacency lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrGraph {
    offsets: Vec<usize>,
    edges: Vec<VertexId>,
}

impl CsrGraph {
    pub fn empty(n: usize) -> Self {
        Self {
            offsets: vec![0; n + 1],
            edges: Vec::new(),
        }
    }

    /// Builds an undirected graph from an edge list.
    ///
    /// Both directions are stored, self loops are dropped and parallel edges
    /// collapse to one.
    pub fn from_edges(n: usize, edges: &[(VertexId, VertexId)]) -> Result<Self, MisError> {
        if n >= NO_VERTEX_BOUND {
            return Err(MisError::InvalidGraph(format!(
                "{} vertices exceed the id space",
                n
            )));
        }
        if let Some(&(u, v)) = edges
            .iter()
            .find(|(u, v)| *u as usize >= n || *v as usize >= n)
        {
            return Err(MisError::InvalidGraph(format!(
                "edge ({}, {}) out of range for {} vertices",
                u, v, n
            )));
        }

        let mut adjacency: Vec<Vec<VertexId>> = vec![Vec::new(); n];
        for &(u, v) in edges {
            if u == v {
                continue;
            }
            adjacency[u as usize].push(v);
            adjacency[v as usize].push(u);
        }
        adjacency.par_iter_mut().for_each(|list| {
            list.sort_unstable();
            list.dedup();
        });

        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0);
        for list in &adjacency {
            offsets.push(offsets[offsets.len() - 1] + list.len());
        }
        let edges = adjacency.into_iter().flatten().collect();

        Ok(Self { offsets, edges })
    }

    /// Rejects adjacency that would break priority counting: bad offsets,
    /// out-of-range ids, self loops, duplicates, or missing reverse edges.
    pub fn validate(&self) -> Result<(), MisError> {
        if self.offsets.is_empty() {
            return Err(MisError::InvalidGraph("missing offsets".into()));
        }
        if self.offsets[0] != 0 || self.offsets[self.offsets.len() - 1] != self.edges.len() {
            return Err(MisError::InvalidGraph(
                "offsets do not span the edge array".into(),
            ));
        }
        if self.offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(MisError::InvalidGraph("offsets not monotone".into()));
        }

        let n = self.num_vertices();
        let bad = (0..n).into_par_iter().find_any(|&v| {
            let v = v as VertexId;
            let nghs = self.out_neighbors(v);
            nghs.iter().any(|&u| u as usize >= n || u == v)
                || nghs.windows(2).any(|w| w[0] >= w[1])
                || nghs
                    .iter()
                    .any(|&u| self.out_neighbors(u).binary_search(&v).is_err())
        });
        match bad {
            Some(v) => Err(MisError::InvalidGraph(format!(
                "adjacency of vertex {} is malformed or asymmetric",
                v
            ))),
            None => Ok(()),
        }
    }

    pub fn max_degree(&self) -> usize {
        (0..self.num_vertices())
            .into_par_iter()
            .map(|v| self.out_degree(v as VertexId))
            .max()
            .unwrap_or(0)
    }

    /// Undirected edges as `(u, v)` with `u < v`.
    pub fn edge_list(&self) -> Vec<(VertexId, VertexId)> {
        (0..self.num_vertices() as VertexId)
            .flat_map(|u| {
                self.out_neighbors(u)
                    .iter()
                    .filter(move |&&v| u < v)
                    .map(move |&v| (u, v))
            })
            .collect()
    }

    /// blake3 fingerprint of the adjacency, used to tag reports.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.num_vertices() as u64).to_le_bytes());
        for &offset in &self.offsets {
            hasher.update(&(offset as u64).to_le_bytes());
        }
        for &v in &self.edges {
            hasher.update(&v.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        let graph: CsrGraph = serde_json::from_str(&json)?;
        graph.validate()?;
        Ok(graph)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

const NO_VERTEX_BOUND: usize = crate::types::NO_VERTEX as usize;

impl Graph for CsrGraph {
    fn num_vertices(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    fn num_edges(&self) -> usize {
        self.edges.len()
    }

    fn out_neighbors(&self, v: VertexId) -> &[VertexId] {
        let v = v as usize;
        &self.edges[self.offsets[v]..self.offsets[v + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_cycle() -> CsrGraph {
        CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap()
    }

    #[test]
    fn test_from_edges_symmetrizes() {
        let g = four_cycle();
        assert_eq!(g.num_vertices(), 4);
        assert_eq!(g.num_edges(), 8);
        assert_eq!(g.out_neighbors(0), &[1, 3]);
        assert_eq!(g.out_neighbors(2), &[1, 3]);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn test_duplicates_and_self_loops_dropped() {
        let g = CsrGraph::from_edges(3, &[(0, 1), (1, 0), (0, 1), (2, 2)]).unwrap();
        assert_eq!(g.out_neighbors(0), &[1]);
        assert_eq!(g.out_degree(2), 0);
        assert_eq!(g.num_edges(), 2);
    }

    #[test]
    fn test_out_of_range_edge_rejected() {
        assert!(CsrGraph::from_edges(2, &[(0, 2)]).is_err());
    }

    #[test]
    fn test_validate_rejects_asymmetric() {
        let g = CsrGraph {
            offsets: vec![0, 1, 1],
            edges: vec![1],
        };
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_entries() {
        let g = CsrGraph {
            offsets: vec![0, 2, 4],
            edges: vec![1, 1, 0, 0],
        };
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_neighbor_capabilities() {
        let g = four_cycle();
        let sum = g.reduce_out_ngh(0, 0u32, |_, ngh| ngh, |a, b| a + b);
        assert_eq!(sum, 4);
        assert_eq!(g.count_out_ngh(1, |_, ngh| ngh > 1), 1);

        let mut seen = Vec::new();
        g.map_out_ngh(3, |src, ngh| seen.push((src, ngh)));
        assert_eq!(seen, vec![(3, 0), (3, 2)]);
        assert_eq!(g.max_degree(), 2);
    }

    #[test]
    fn test_edge_list_and_digest() {
        let g = four_cycle();
        assert_eq!(g.edge_list(), vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
        assert_eq!(g.digest(), four_cycle().digest());
        assert_ne!(g.digest(), CsrGraph::empty(4).digest());
    }

    #[test]
    fn test_save_and_load() {
        let g = four_cycle();
        let path = std::env::temp_dir().join("par_mis_graph_test.json");
        g.save(&path).unwrap();
        let loaded = CsrGraph::load(&path).unwrap();
        assert_eq!(loaded, g);
        std::fs::remove_file(&path).ok();
    }
}
