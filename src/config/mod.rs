use crate::order::OrderKind;
use crate::types::{ExpansionMode, MisError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs for both MIS algorithms. None of them affect validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MisConfig {
    /// Priority order for the rootset algorithm.
    pub order: OrderKind,
    /// Tie-break order for the speculative algorithm.
    pub speculative_order: OrderKind,
    pub seed: u64,
    /// Forces or auto-selects the neighbor expansion and edge traversal strategy.
    pub expansion: ExpansionMode,
    /// Neighbor expansion goes dense above `edges / dense_threshold_divisor` work.
    pub dense_threshold_divisor: usize,
    /// Edge traversal goes dense above `edges / edge_map_threshold_divisor` work.
    pub edge_map_threshold_divisor: usize,
    /// Upper bound on indices per speculative round; `None` takes every pending index.
    pub batch_size: Option<usize>,
}

impl Default for MisConfig {
    fn default() -> Self {
        Self {
            order: OrderKind::Permutation,
            speculative_order: OrderKind::Id,
            seed: 42,
            expansion: ExpansionMode::Auto,
            dense_threshold_divisor: 100,
            edge_map_threshold_divisor: 20,
            batch_size: None,
        }
    }
}

impl MisConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        let config: MisConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MisError> {
        if self.dense_threshold_divisor == 0 {
            return Err(MisError::Config("dense_threshold_divisor must be positive".into()));
        }
        if self.edge_map_threshold_divisor == 0 {
            return Err(MisError::Config(
                "edge_map_threshold_divisor must be positive".into(),
            ));
        }
        if self.batch_size == Some(0) {
            return Err(MisError::Config("batch_size must be positive".into()));
        }
        Ok(())
    }

    /// Preset: always take the hash-set / push path.
    pub fn sparse_only() -> Self {
        Self {
            expansion: ExpansionMode::Sparse,
            ..Self::default()
        }
    }

    /// Preset: always take the flag-array / pull path.
    pub fn dense_only() -> Self {
        Self {
            expansion: ExpansionMode::Dense,
            ..Self::default()
        }
    }
}
