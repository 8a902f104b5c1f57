//! # NoiSim Engine
//!
//! Reference-key managers for noisy simulation: calibration data is
//! imported as noise data instances, noise models are built from them and
//! simulators from the models. A key stays blocked while anything built
//! from it exists.
//!
//! ## Gantree Architecture
//!
//! ```text
//! noisim_engine // L6: Engine
//!     L6_Engine // 인스턴스 관리
//!         Instances // 인스턴스 레코드, 목록
//!         Operation // 작업 알림 흐름
//!         NoiseDataManager // CSV 가져오기, 큐비트 조회
//!         NoiseModelManager // 노이즈 모델 생성/삭제
//!         SimulatorManager // 시뮬레이터 생성/실행/삭제
//!         NoisySimulation // 연결된 관리자 묶음
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use noisim_engine::prelude::*;
//! use noisim_core::CircuitBuilder;
//!
//! let session = NoisySimulation::with_defaults().unwrap();
//! session.noise_data().import_csv_data("device", "calibrations.csv").unwrap();
//! session.noise_models().create_noise_model("model", "device").unwrap();
//! session.simulators().create_simulator("sim", "model").unwrap();
//!
//! let bell = CircuitBuilder::new(2).h(0).cx(0, 1).measure_all().build().unwrap();
//! let job = session.simulators().run_simulator("sim", &bell, 1, 1024).unwrap();
//! println!("{}", job.wait().unwrap());
//! ```

#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Instance records (Gantree: L6_Engine → Instances)
pub mod instances;

/// Operation notifications (Gantree: L6_Engine → Operation)
mod operation;

/// Noise data manager (Gantree: L6_Engine → NoiseDataManager)
pub mod noise_data_manager;

/// Noise model manager (Gantree: L6_Engine → NoiseModelManager)
pub mod noise_model_manager;

/// Simulator manager (Gantree: L6_Engine → SimulatorManager)
pub mod simulator_manager;

/// Linked managers (Gantree: L6_Engine → NoisySimulation)
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use instances::{InstanceListing, NoiseDataInstance, NoiseModelInstance, SimulatorInstance};
pub use noise_data_manager::{NoiseDataManager, QubitData, SharedKeyBlocker, SharedNoiseData};
pub use noise_model_manager::{NoiseModelManager, SharedNoiseModels};
pub use session::NoisySimulation;
pub use simulator_manager::{SharedSimulators, SimulatorManager};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use noisim_engine::prelude::*;
    //! ```

    pub use crate::instances::{
        InstanceListing, NoiseDataInstance, NoiseModelInstance, SimulatorInstance,
    };
    pub use crate::noise_data_manager::{NoiseDataManager, QubitData};
    pub use crate::noise_model_manager::NoiseModelManager;
    pub use crate::session::NoisySimulation;
    pub use crate::simulator_manager::SimulatorManager;
    pub use noisim_backend::{ExecutionResult, JobHandle, JobStatus};
    pub use noisim_calibration::CalibrationConfig;
    pub use noisim_core::{InsError, InsResult, MessageKey, Notifier, RecordingNotifier};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Test Fixtures
// ============================================================================


// ============================================================================
// Integration Tests
// ============================================================================
