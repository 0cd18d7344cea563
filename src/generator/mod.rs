use crate::graph::CsrGraph;
use crate::types::{MisError, VertexId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    /// No edges at all.
    Isolated,
    /// Path 0 - 1 - ... - (n-1).
    Chain,
    /// Path closed into a ring.
    Cycle,
    /// Center 0 joined to every other vertex.
    Star,
    /// Square-ish grid, row-major.
    Grid,
    /// Uniform random edges, `n * degree / 2` of them.
    Random,
}

impl FromStr for GraphKind {
    type Err = MisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "isolated" => Ok(GraphKind::Isolated),
            "chain" => Ok(GraphKind::Chain),
            "cycle" => Ok(GraphKind::Cycle),
            "star" => Ok(GraphKind::Star),
            "grid" => Ok(GraphKind::Grid),
            "random" => Ok(GraphKind::Random),
            _ => Err(MisError::Config(format!("Unknown graph kind: {}", s))),
        }
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphKind::Isolated => "isolated",
            GraphKind::Chain => "chain",
            GraphKind::Cycle => "cycle",
            GraphKind::Star => "star",
            GraphKind::Grid => "grid",
            GraphKind::Random => "random",
        };
        write!(f, "{}", name)
    }
}

/// Synthetic graph generator
pub struct GraphGenerator {
    pub kind: GraphKind,
    pub n: usize,
    /// Average degree for `Random`; ignored by the structured kinds.
    pub degree: usize,
    pub seed: u64,
}

impl GraphGenerator {
    pub fn new(kind: GraphKind, n: usize, degree: usize, seed: u64) -> Self {
        Self {
            kind,
            n,
            degree,
            seed,
        }
    }

    /// Generate the graph
    ///
    /// # Example
    /// ```text
    /// Grid, n=6 -> side = 3 (columns), rows filled row-major
    ///
    /// 0 - 1 - 2
    /// |   |   |
    /// 3 - 4 - 5
    /// ```
    pub fn generate(&self) -> Result<CsrGraph, MisError> {
        let n = self.n;
        tracing::info!(
            "Generating {} graph: {} vertices, degree {}, seed={}",
            self.kind,
            n,
            self.degree,
            self.seed
        );

        let edges: Vec<(VertexId, VertexId)> = match self.kind {
            GraphKind::Isolated => Vec::new(),
            GraphKind::Chain => (1..n).map(|v| ((v - 1) as VertexId, v as VertexId)).collect(),
            GraphKind::Cycle => {
                let mut edges: Vec<_> = (1..n).map(|v| ((v - 1) as VertexId, v as VertexId)).collect();
                if n > 2 {
                    edges.push(((n - 1) as VertexId, 0));
                }
                edges
            }
            GraphKind::Star => (1..n).map(|leaf| (0, leaf as VertexId)).collect(),
            GraphKind::Grid => {
                let side = (n as f64).sqrt().ceil().max(1.0) as usize;
                let mut edges = Vec::with_capacity(2 * n);
                for v in 0..n {
                    if (v + 1) % side != 0 && v + 1 < n {
                        edges.push((v as VertexId, (v + 1) as VertexId));
                    }
                    if v + side < n {
                        edges.push((v as VertexId, (v + side) as VertexId));
                    }
                }
                edges
            }
            GraphKind::Random => {
                let mut rng = StdRng::seed_from_u64(self.seed);
                let count = n * self.degree / 2;
                if n < 2 {
                    Vec::new()
                } else {
                    (0..count)
                        .map(|_| {
                            let u = rng.gen_range(0..n) as VertexId;
                            let v = rng.gen_range(0..n) as VertexId;
                            (u, v)
                        })
                        .collect()
                }
            }
        };

        let graph = CsrGraph::from_edges(n, &edges)?;
        tracing::info!(
            "Generated graph with {} vertices and {} adjacency entries",
            n,
            crate::graph::Graph::num_edges(&graph)
        );
        Ok(graph)
    }

    /// Preset: Small random graph
    pub fn small() -> Self {
        Self::new(GraphKind::Random, 1_000, 8, 42)
    }

    /// Preset: Medium random graph
    pub fn medium() -> Self {
        Self::new(GraphKind::Random, 100_000, 10, 42)
    }

    /// Preset: Large random graph
    pub fn large() -> Self {
        Self::new(GraphKind::Random, 1_000_000, 10, 42)
    }

    pub fn preset(name: &str) -> Result<Self, MisError> {
        match name {
            "small" => Ok(Self::small()),
            "medium" => Ok(Self::medium()),
            "large" => Ok(Self::large()),
            _ => Err(MisError::Config(format!("Unknown preset: {}", name))),
        }
    }
}

impl Default for GraphGenerator {
    fn default() -> Self {
        Self::medium()
    }
}
