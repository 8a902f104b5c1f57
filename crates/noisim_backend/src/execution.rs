//! Backend execution types and traits
//!
//! Gantree: L5_Backend → BackendTrait
//!
//! [`SimulationBackend`] is what the simulator manager sees of a backend;
//! [`BackendFactory`] builds one from an error model and a coupling map.

use crate::job::JobHandle;
use noisim_core::{Circuit, CouplingMap, Counts, InsResult};
use noisim_noise::ErrorModel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Result of circuit execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement counts (bitstring -> count), highest clbit first
    pub counts: Counts,

    /// Number of shots executed
    pub shots: u64,

    /// Execution metadata
    pub metadata: ExecutionMetadata,
}

/// Execution metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Backend name
    pub backend: String,

    /// Job ID
    pub job_id: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: Option<u64>,

    /// Seed used (if any)
    pub seed: Option<u64>,

    /// Additional info
    pub extra: HashMap<String, String>,
}

impl ExecutionResult {
    /// Create new execution result
    pub fn new(counts: Counts, shots: u64, backend: &str) -> Self {
        Self {
            counts,
            shots,
            metadata: ExecutionMetadata {
                backend: backend.to_string(),
                ..Default::default()
            },
        }
    }

    /// Get total count (equals shots)
    pub fn total_counts(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Get probability of a specific bitstring
    pub fn probability(&self, bitstring: &str) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        let count = self.counts.get(bitstring).copied().unwrap_or(0);
        count as f64 / self.shots as f64
    }

    /// Get most frequent bitstring; ties resolve to the smallest bitstring
    pub fn most_frequent(&self) -> Option<(&String, u64)> {
        self.counts
            .iter()
            .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
            .map(|(bs, &count)| (bs, count))
    }

    /// Counts sorted by bitstring
    pub fn sorted_counts(&self) -> Vec<(&str, u64)> {
        let mut counts: Vec<(&str, u64)> =
            self.counts.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        counts.sort_unstable();
        counts
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExecutionResult(backend={}, shots={}, unique={})",
            self.metadata.backend,
            self.shots,
            self.counts.len()
        )
    }
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Noisy simulation backend
/// Gantree: SimulationBackend // 백엔드 인터페이스
pub trait SimulationBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn num_qubits(&self) -> usize;

    /// Instructions accepted by [`run`](Self::run)
    fn basis_gates(&self) -> Vec<String>;

    fn coupling_map(&self) -> &CouplingMap;

    fn noise_model(&self) -> Arc<dyn ErrorModel>;

    /// Submit a circuit already expressed on this backend's qubits
    /// Gantree: run(circuit, shots) -> Result<JobHandle>
    fn run(&self, circuit: &Circuit, shots: u64) -> InsResult<JobHandle>;
}

/// Builds a backend around an error model
/// Gantree: BackendFactory // trait
pub trait BackendFactory: Send + Sync {
    fn create(
        &self,
        model: Arc<dyn ErrorModel>,
        coupling: CouplingMap,
    ) -> InsResult<Arc<dyn SimulationBackend>>;
}

// ============================================================================
// Tests
// ============================================================================
