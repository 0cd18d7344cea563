pub mod edge_map;
pub mod expansion;
pub mod hash_set;

pub use edge_map::{EdgeMap, EdgeUpdate};
pub use expansion::NeighborExpansion;
pub use hash_set::ConcurrentIdSet;

use crate::types::VertexId;
use rayon::prelude::*;

/// Active vertex set for one round, either as an id list or a flag per vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexSubset {
    Sparse { n: usize, ids: Vec<VertexId> },
    Dense { n: usize, flags: Vec<bool>, count: usize },
}

impl VertexSubset {
    pub fn empty(n: usize) -> Self {
        VertexSubset::Sparse { n, ids: Vec::new() }
    }

    pub fn single(n: usize, v: VertexId) -> Self {
        VertexSubset::Sparse { n, ids: vec![v] }
    }

    /// `ids` must be distinct.
    pub fn from_ids(n: usize, ids: Vec<VertexId>) -> Self {
        VertexSubset::Sparse { n, ids }
    }

    pub fn from_flags(flags: Vec<bool>) -> Self {
        let count = flags.par_iter().filter(|&&f| f).count();
        VertexSubset::Dense {
            n: flags.len(),
            flags,
            count,
        }
    }

    /// Number of vertices in the underlying graph.
    pub fn universe(&self) -> usize {
        match self {
            VertexSubset::Sparse { n, .. } | VertexSubset::Dense { n, .. } => *n,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VertexSubset::Sparse { ids, .. } => ids.len(),
            VertexSubset::Dense { count, .. } => *count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dense(&self) -> bool {
        matches!(self, VertexSubset::Dense { .. })
    }

    /// Linear in the subset size for the sparse form.
    pub fn contains(&self, v: VertexId) -> bool {
        match self {
            VertexSubset::Sparse { ids, .. } => ids.contains(&v),
            VertexSubset::Dense { flags, .. } => flags.get(v as usize).copied().unwrap_or(false),
        }
    }

    pub fn to_ids(&self) -> Vec<VertexId> {
        match self {
            VertexSubset::Sparse { ids, .. } => ids.clone(),
            VertexSubset::Dense { flags, .. } => flags
                .par_iter()
                .enumerate()
                .filter(|(_, f)| **f)
                .map(|(v, _)| v as VertexId)
                .collect(),
        }
    }

    pub fn to_flags(&self) -> Vec<bool> {
        match self {
            VertexSubset::Sparse { n, ids } => {
                let mut flags = vec![false; *n];
                for &v in ids {
                    flags[v as usize] = true;
                }
                flags
            }
            VertexSubset::Dense { flags, .. } => flags.clone(),
        }
    }

    pub fn to_sparse(&mut self) {
        if let VertexSubset::Dense { n, .. } = self {
            let n = *n;
            let ids = self.to_ids();
            *self = VertexSubset::Sparse { n, ids };
        }
    }

    pub fn to_dense(&mut self) {
        if let VertexSubset::Sparse { n, ids } = self {
            let count = ids.len();
            let n = *n;
            let flags = self.to_flags();
            *self = VertexSubset::Dense { n, flags, count };
        }
    }

    /// Runs `f` on every member in parallel.
    pub fn for_each<F>(&self, f: F)
    where
        F: Fn(VertexId) + Sync + Send,
    {
        match self {
            VertexSubset::Sparse { ids, .. } => ids.par_iter().for_each(|&v| f(v)),
            VertexSubset::Dense { flags, .. } => {
                flags.par_iter().enumerate().for_each(|(v, &member)| {
                    if member {
                        f(v as VertexId)
                    }
                })
            }
        }
    }
}
