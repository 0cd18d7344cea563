pub mod types;
pub mod config;
pub mod graph;
pub mod frontier;
pub mod order;
pub mod spec_for;
pub mod mis;
pub mod verify;
pub mod connectivity;
pub mod generator;
pub mod metrics;
pub mod cli;

// Re-export commonly used types
pub use types::{
    Algorithm, BenchmarkSummary, ExpansionMode, Membership, Metrics, MisError, MisFlag,
    MisResult, RoundRecord, RunStats, VertexId,
};

pub use config::MisConfig;
pub use graph::{CsrGraph, Graph};
pub use frontier::{EdgeMap, EdgeUpdate, NeighborExpansion, VertexSubset};
pub use order::{HashOrder, IdOrder, OrderKind, PermutationOrder, PriorityDag, VertexOrder};
pub use spec_for::{SpeculativeFor, SpeculativeStep};
pub use mis::{run_mis, RootsetMis, SpeculativeMis};
pub use verify::{verify_flags, verify_mis, VerifyReport};
pub use connectivity::bfs_components;
pub use generator::{GraphGenerator, GraphKind};
pub use metrics::MetricsCollector;
