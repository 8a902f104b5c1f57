//! # NoiSim Backend
//!
//! Simulation backends for noise models: the backend collaborator seam,
//! a transpiler onto a backend's coupling map and basis, asynchronous job
//! handles and the bundled local state-vector simulator.
//!
//! ## Gantree Architecture
//!
//! ```text
//! noisim_backend // L5: Backend
//!     L5_Backend // 백엔드 실행
//!         BackendTrait // SimulationBackend / BackendFactory, ExecutionResult
//!         Job // JobHandle, JobStatus (작업 스레드)
//!         Transpiler // 라우팅, 기저 변환, 최적화
//!         LocalSimulator // 상태 벡터 + 파울리 샘플링
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use noisim_backend::prelude::*;
//! use noisim_core::{CircuitBuilder, CouplingMap};
//! use noisim_noise::NoiseModel;
//! use std::sync::Arc;
//!
//! let basis = ["measure", "rz", "sx", "x", "ecr"].map(String::from).to_vec();
//! let model = Arc::new(NoiseModel::ideal(3, basis));
//! let backend = LocalSimulatorFactory::default()
//!     .create(model, CouplingMap::linear(3))
//!     .unwrap();
//!
//! let circuit = CircuitBuilder::new(3).ghz().measure_all().build().unwrap();
//! let physical = Transpiler::for_backend(backend.as_ref(), 1)
//!     .unwrap()
//!     .transpile(&circuit)
//!     .unwrap();
//!
//! let result = backend.run(&physical, 256).unwrap().wait().unwrap();
//! assert_eq!(result.total_counts(), 256);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Execution types and backend traits (Gantree: L5_Backend → BackendTrait)
pub mod execution;

/// Job handles (Gantree: L5_Backend → Job)
pub mod job;

/// Transpiler (Gantree: L5_Backend → Transpiler)
pub mod transpiler;

/// Local simulator (Gantree: L5_Backend → LocalSimulator)
pub mod simulator;

// ============================================================================
// Re-exports
// ============================================================================

pub use execution::{BackendFactory, ExecutionMetadata, ExecutionResult, SimulationBackend};
pub use job::{JobHandle, JobStatus};
pub use simulator::{LocalSimulator, LocalSimulatorFactory, SimulatorOptions};
pub use transpiler::Transpiler;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use noisim_backend::prelude::*;
    //! ```

    pub use crate::execution::{
        BackendFactory, ExecutionMetadata, ExecutionResult, SimulationBackend,
    };
    pub use crate::job::{JobHandle, JobStatus};
    pub use crate::simulator::{LocalSimulator, LocalSimulatorFactory, SimulatorOptions};
    pub use crate::transpiler::Transpiler;
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================
