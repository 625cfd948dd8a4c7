/// Runtime configuration.
///
/// Everything a `TapeRuntime` needs at creation time, loadable from JSON:
///
/// ```json
/// {
///   "cells": 4,
///   "instance_id": 7,
///   "backend": "statevector",
///   "seed": 42,
///   "fitness": { "recency_weight": 0.7, "prune_threshold": 0.7 }
/// }
/// ```
///
/// Missing fields take their defaults; `fitness` fields are validated by the
/// same rules as runtime tuning.
use crate::core::BackendKind;
use crate::error::{Result, TapeError};
use crate::tape::FitnessParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub cells: usize,
    pub instance_id: u32,
    pub backend: BackendKind,
    /// Fixes the statevector measurement RNG. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub fitness: FitnessParams,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cells: 8,
            instance_id: 0,
            backend: BackendKind::Classical,
            seed: None,
            fitness: FitnessParams::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn new(cells: usize) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_instance_id(mut self, instance_id: u32) -> Self {
        self.instance_id = instance_id;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_fitness(mut self, fitness: FitnessParams) -> Self {
        self.fitness = fitness;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TapeError::Config(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TapeError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RuntimeConfig::from_json_str(
            r#"{ "cells": 4, "backend": "statevector", "fitness": { "prune_threshold": 0.7 } }"#,
        )
        .unwrap();
        assert_eq!(config.cells, 4);
        assert_eq!(config.backend, BackendKind::Statevector);
        assert_eq!(config.seed, None);
        assert_eq!(config.fitness.prune_threshold, 0.7);
        assert_eq!(config.fitness.prune_interval, 256);
        assert_eq!(config.fitness.recency_weight, 0.5);
    }

    #[test]
    fn test_unknown_backend_is_a_config_error() {
        let err = RuntimeConfig::from_json_str(r#"{ "backend": "hardware" }"#).unwrap_err();
        assert!(matches!(err, TapeError::Config(msg) if msg.contains("hardware")));
    }

    #[test]
    fn test_builder_survives_json() {
        let config = RuntimeConfig::new(3)
            .with_backend(BackendKind::Statevector)
            .with_seed(99)
            .with_instance_id(4);
        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"statevector\""));
        assert_eq!(RuntimeConfig::from_json_str(&json).unwrap(), config);
    }
}
