use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vertex identifier. Vertices of a graph with `n` vertices are `0..n`.
pub type VertexId = u32;

/// Sentinel that never names a real vertex.
pub const NO_VERTEX: VertexId = VertexId::MAX;

/// Per-vertex decision state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MisFlag {
    Undecided = 0,
    Chosen = 1,
    Excluded = 2,
}

impl MisFlag {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => MisFlag::Chosen,
            2 => MisFlag::Excluded,
            _ => MisFlag::Undecided,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_decided(self) -> bool {
        self != MisFlag::Undecided
    }
}

/// Strategy for frontier expansion and edge traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionMode {
    #[default]
    Auto,
    Sparse,
    Dense,
}

impl FromStr for ExpansionMode {
    type Err = MisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ExpansionMode::Auto),
            "sparse" => Ok(ExpansionMode::Sparse),
            "dense" => Ok(ExpansionMode::Dense),
            _ => Err(MisError::Config(format!("Unknown expansion mode: {}", s))),
        }
    }
}

impl fmt::Display for ExpansionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpansionMode::Auto => write!(f, "auto"),
            ExpansionMode::Sparse => write!(f, "sparse"),
            ExpansionMode::Dense => write!(f, "dense"),
        }
    }
}

/// Which MIS algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Rootset,
    Speculative,
}

impl FromStr for Algorithm {
    type Err = MisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rootset" => Ok(Algorithm::Rootset),
            "speculative" => Ok(Algorithm::Speculative),
            _ => Err(MisError::Config(format!("Unknown algorithm: {}", s))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Rootset => write!(f, "rootset"),
            Algorithm::Speculative => write!(f, "speculative"),
        }
    }
}

/// One round of either algorithm.
///
/// For the rootset algorithm `frontier` is the root count and `resolved`
/// counts roots plus removed neighbors. For the speculative engine
/// `frontier` is the batch size and `resolved` the committed indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: usize,
    pub frontier: usize,
    pub resolved: usize,
    pub remaining: usize,
    /// Strategy the neighbor expansion actually used, when there was one.
    pub mode: Option<ExpansionMode>,
    /// Push (`Sparse`) or pull (`Dense`) for the successor traversal.
    #[serde(default)]
    pub traversal: Option<ExpansionMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub algorithm: Algorithm,
    pub order: String,
    pub rounds: usize,
    pub round_log: Vec<RoundRecord>,
    pub elapsed_ms: f64,
}

impl RunStats {
    pub fn new(algorithm: Algorithm, order: &str) -> Self {
        Self {
            algorithm,
            order: order.to_string(),
            rounds: 0,
            round_log: Vec::new(),
            elapsed_ms: 0.0,
        }
    }

    pub fn record(&mut self, record: RoundRecord) {
        self.round_log.push(record);
        self.rounds = self.round_log.len();
    }
}

/// Output of an MIS run: one flag per vertex.
#[derive(Debug, Clone)]
pub struct MisResult {
    pub flags: Vec<MisFlag>,
    pub stats: RunStats,
}

impl MisResult {
    pub fn in_mis(&self) -> Vec<bool> {
        self.flags.iter().map(|f| *f == MisFlag::Chosen).collect()
    }

    pub fn members(&self) -> Vec<VertexId> {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, f)| **f == MisFlag::Chosen)
            .map(|(v, _)| v as VertexId)
            .collect()
    }

    pub fn size(&self) -> usize {
        self.flags.iter().filter(|f| **f == MisFlag::Chosen).count()
    }
}

/// Membership file written by `run` and read by `verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub algorithm: Algorithm,
    pub vertices: usize,
    pub members: Vec<VertexId>,
}

impl Membership {
    pub fn from_result(result: &MisResult) -> Self {
        Self {
            algorithm: result.stats.algorithm,
            vertices: result.flags.len(),
            members: result.members(),
        }
    }

    pub fn to_mask(&self) -> Result<Vec<bool>, MisError> {
        let mut mask = vec![false; self.vertices];
        for &v in &self.members {
            let slot = mask.get_mut(v as usize).ok_or_else(|| {
                MisError::InvalidGraph(format!(
                    "member {} out of range for {} vertices",
                    v, self.vertices
                ))
            })?;
            *slot = true;
        }
        Ok(mask)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    pub algorithm: Algorithm,
    pub order: String,
    pub graph_digest: String,
    pub vertices: usize,
    pub edges: usize,
    pub mis_size: usize,
    pub rounds: usize,
    pub avg_frontier: f64,
    pub max_frontier: usize,
    pub sparse_rounds: usize,
    pub dense_rounds: usize,
    pub push_rounds: usize,
    pub pull_rounds: usize,
    pub elapsed_ms: f64,
    pub valid: bool,
    pub timestamp: String,
}

/// Benchmark timings for one algorithm across repetitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub name: String,
    pub reps: usize,
    pub median_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MisError {
    /// No root remained while undecided vertices did; the priority DAG
    /// was not acyclic.
    #[error("empty root frontier at round {round} with {remaining} vertices remaining")]
    EmptyFrontier { round: usize, remaining: usize },
    /// A speculative round committed nothing.
    #[error("speculative round {round} resolved none of {pending} pending indices")]
    NoProgress { round: usize, pending: usize },
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
    #[error("invalid order: {0}")]
    InvalidOrder(String),
    #[error("config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_round_trip_through_u8() {
        for flag in [MisFlag::Undecided, MisFlag::Chosen, MisFlag::Excluded] {
            assert_eq!(MisFlag::from_u8(flag.as_u8()), flag);
        }
        assert!(!MisFlag::Undecided.is_decided());
        assert!(MisFlag::Excluded.is_decided());
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("dense".parse::<ExpansionMode>(), Ok(ExpansionMode::Dense));
        assert!("bogus".parse::<ExpansionMode>().is_err());
        assert_eq!("rootset".parse::<Algorithm>(), Ok(Algorithm::Rootset));
    }

    #[test]
    fn test_membership_mask() {
        let membership = Membership {
            algorithm: Algorithm::Rootset,
            vertices: 4,
            members: vec![0, 2],
        };
        assert_eq!(membership.to_mask().unwrap(), vec![true, false, true, false]);

        let bad = Membership {
            algorithm: Algorithm::Rootset,
            vertices: 2,
            members: vec![5],
        };
        assert!(bad.to_mask().is_err());
    }
}
