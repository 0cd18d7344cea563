pub mod priority;

pub use priority::PriorityDag;

use crate::types::{MisError, VertexId};
use ahash::RandomState;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A strict total order over vertex ids, fixed for one run.
pub trait VertexOrder: Sync {
    /// `true` iff `a` is ranked strictly before `b`.
    fn precedes(&self, a: VertexId, b: VertexId) -> bool;

    fn compare(&self, a: VertexId, b: VertexId) -> Ordering {
        if a == b {
            Ordering::Equal
        } else if self.precedes(a, b) {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }

    /// Whether the order is plain id order.
    fn is_identity(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;
}

/// Vertices ranked by raw id.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdOrder;

impl VertexOrder for IdOrder {
    fn precedes(&self, a: VertexId, b: VertexId) -> bool {
        a < b
    }

    fn is_identity(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "id"
    }
}

/// Vertices ranked by an explicit permutation: `rank[v]` is v's position.
#[derive(Debug, Clone)]
pub struct PermutationOrder {
    rank: Vec<VertexId>,
}

impl PermutationOrder {
    pub fn random(n: usize, seed: u64) -> Self {
        let mut rank: Vec<VertexId> = (0..n as VertexId).collect();
        rank.shuffle(&mut StdRng::seed_from_u64(seed));
        Self { rank }
    }

    /// Rejects rank vectors that are not a bijection onto `0..n`.
    pub fn from_ranks(rank: Vec<VertexId>) -> Result<Self, MisError> {
        let n = rank.len();
        let mut seen = vec![false; n];
        for (v, &r) in rank.iter().enumerate() {
            match seen.get_mut(r as usize) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(MisError::InvalidOrder(format!(
                        "rank {} assigned twice (vertex {})",
                        r, v
                    )))
                }
                None => {
                    return Err(MisError::InvalidOrder(format!(
                        "rank {} of vertex {} out of range for {} vertices",
                        r, v, n
                    )))
                }
            }
        }
        Ok(Self { rank })
    }

    pub fn rank(&self, v: VertexId) -> VertexId {
        self.rank[v as usize]
    }
}

impl VertexOrder for PermutationOrder {
    fn precedes(&self, a: VertexId, b: VertexId) -> bool {
        self.rank[a as usize] < self.rank[b as usize]
    }

    fn name(&self) -> &'static str {
        "permutation"
    }
}

/// Vertices ranked by a 32-bit hash of their id, ties broken by id.
/// Avoids materializing a permutation.
#[derive(Clone)]
pub struct HashOrder {
    hasher: RandomState,
}

impl HashOrder {
    pub fn new(seed: u64) -> Self {
        Self {
            hasher: RandomState::with_seeds(
                seed,
                seed.rotate_left(17) ^ 0x9e37_79b9_7f4a_7c15,
                seed.rotate_left(31) ^ 0xbf58_476d_1ce4_e5b9,
                seed.rotate_left(47) ^ 0x94d0_49bb_1331_11eb,
            ),
        }
    }

    pub fn hash32(&self, v: VertexId) -> u32 {
        self.hasher.hash_one(v) as u32
    }
}

impl VertexOrder for HashOrder {
    fn precedes(&self, a: VertexId, b: VertexId) -> bool {
        (self.hash32(a), a) < (self.hash32(b), b)
    }

    fn name(&self) -> &'static str {
        "hash"
    }
}

impl fmt::Debug for HashOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashOrder").finish_non_exhaustive()
    }
}

/// Selects one of the order strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Id,
    #[default]
    Permutation,
    Hash,
}

impl OrderKind {
    pub fn build(self, n: usize, seed: u64) -> Box<dyn VertexOrder> {
        match self {
            OrderKind::Id => Box::new(IdOrder),
            OrderKind::Permutation => Box::new(PermutationOrder::random(n, seed)),
            OrderKind::Hash => Box::new(HashOrder::new(seed)),
        }
    }
}

impl FromStr for OrderKind {
    type Err = MisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(OrderKind::Id),
            "permutation" => Ok(OrderKind::Permutation),
            "hash" => Ok(OrderKind::Hash),
            _ => Err(MisError::Config(format!("Unknown order: {}", s))),
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Id => write!(f, "id"),
            OrderKind::Permutation => write!(f, "permutation"),
            OrderKind::Hash => write!(f, "hash"),
        }
    }
}

/// All vertices sorted by `order`, earliest first.
pub fn schedule<O: VertexOrder + ?Sized>(n: usize, order: &O) -> Vec<VertexId> {
    let mut vertices: Vec<VertexId> = (0..n as VertexId).collect();
    if !order.is_identity() {
        vertices.par_sort_unstable_by(|&a, &b| order.compare(a, b));
    }
    vertices
}
