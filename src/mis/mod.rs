pub mod rootset;
pub mod speculative;

pub use rootset::RootsetMis;
pub use speculative::SpeculativeMis;

use crate::config::MisConfig;
use crate::graph::Graph;
use crate::types::{Algorithm, MisError, MisResult};

/// Runs `algorithm` with the order and tuning named in `config`.
pub fn run_mis<G: Graph>(graph: &G, algorithm: Algorithm, config: &MisConfig) -> Result<MisResult, MisError> {
    config.validate()?;
    let n = graph.num_vertices();
    match algorithm {
        Algorithm::Rootset => {
            let order = config.order.build(n, config.seed);
            RootsetMis::new(graph, order.as_ref(), config).run()
        }
        Algorithm::Speculative => {
            let order = config.speculative_order.build(n, config.seed);
            SpeculativeMis::new(graph, order.as_ref(), config).run()
        }
    }
}
