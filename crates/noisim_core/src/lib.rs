//! # NoiSim Core
//!
//! Foundation types and reference-key bookkeeping for noisy simulation
//! from hardware calibration data.
//!
//! ## Gantree Architecture
//!
//! ```text
//! noisim_core // L0+L1+L2: Foundation + Circuit + Bookkeeping
//!     L0_Foundation // 기반 타입/상수/에러
//!         CoreTypes // 핵심 타입, 인스턴스 종류, 키 정규화
//!         Constants // 물리/보정/실행 상수
//!         Errors // 에러 타입
//!     L1_Circuit // 회로 구조
//!         Gate // 게이트 enum
//!         Circuit // 회로 구조체
//!         CircuitBuilder // 빌더 패턴
//!         CouplingMap // 큐비트 연결 맵
//!     L2_Bookkeeping // 키 관리
//!         KeyRegistry // 종류별 키 레지스트리
//!         KeyBlocker // 종속 인스턴스 차단
//!         Notify // 알림 전달
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use noisim_core::prelude::*;
//!
//! let mut registry: KeyRegistry<u32> = KeyRegistry::new(InstanceCategory::NoiseData);
//! let mut blocker = KeyBlocker::new();
//!
//! registry.register("d1", 42).unwrap();
//! blocker.block_key("d1", InstanceCategory::NoiseData, "m1").unwrap();
//!
//! // A blocked key can be neither removed nor reused
//! assert!(blocker.check_blocked_key("d1", InstanceCategory::NoiseData).is_err());
//! ```

#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Quantum gates (Gantree: L1_Circuit → Gate)
pub mod gate;

/// Circuit structure (Gantree: L1_Circuit → Circuit)
pub mod circuit;

/// Circuit builder (Gantree: L1_Circuit → CircuitBuilder)
pub mod builder;

/// Coupling map (Gantree: L1_Circuit → CouplingMap)
pub mod coupling;

/// Key registry (Gantree: L2_Bookkeeping → KeyRegistry)
pub mod key_registry;

/// Key blocker (Gantree: L2_Bookkeeping → KeyBlocker)
pub mod key_blocker;

/// Notifications (Gantree: L2_Bookkeeping → Notify)
pub mod notify;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::CircuitBuilder;
pub use circuit::Circuit;
pub use constants::{calibration, execution, physics};
pub use coupling::CouplingMap;
pub use error::{InsError, InsResult};
pub use gate::Gate;
pub use key_blocker::KeyBlocker;
pub use key_registry::KeyRegistry;
pub use notify::{
    LogNotifier, MessageKey, Notification, Notifier, NullNotifier, RecordingNotifier, Severity,
    SharedNotifier,
};
pub use types::{normalize_reference_key, Angle, ClbitId, Counts, InstanceCategory, QubitId};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use noisim_core::prelude::*;
    //! ```

    pub use crate::builder::CircuitBuilder;
    pub use crate::circuit::Circuit;
    pub use crate::constants::{calibration, execution, physics};
    pub use crate::coupling::CouplingMap;
    pub use crate::error::{InsError, InsResult};
    pub use crate::gate::Gate;
    pub use crate::key_blocker::KeyBlocker;
    pub use crate::key_registry::KeyRegistry;
    pub use crate::notify::{
        LogNotifier, MessageKey, Notification, Notifier, NullNotifier, RecordingNotifier,
        Severity, SharedNotifier,
    };
    pub use crate::types::{
        normalize_reference_key, Angle, ClbitId, Counts, InstanceCategory, QubitId,
    };
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

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_registry_and_blocker_lifecycle() {
        let mut data: KeyRegistry<&str> = KeyRegistry::new(InstanceCategory::NoiseData);
        let mut models: KeyRegistry<&str> = KeyRegistry::new(InstanceCategory::NoiseModel);
        let mut blocker = KeyBlocker::new();

        data.register("d1", "table").unwrap();
        models.register("m1", "model").unwrap();
        blocker
            .block_key("d1", InstanceCategory::NoiseData, "m1")
            .unwrap();

        // Removing the data first is refused
        let err = blocker
            .check_blocked_key("d1", InstanceCategory::NoiseData)
            .unwrap_err();
        assert!(err.is_key_error());
        assert!(data.contains("d1"));

        // Dependent first, then the source
        models.remove("m1").unwrap();
        blocker
            .unblock_key("d1", InstanceCategory::NoiseData, "m1")
            .unwrap();
        blocker
            .check_blocked_key("d1", InstanceCategory::NoiseData)
            .unwrap();
        data.remove("d1").unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_normalized_key_registration() {
        let (key, modified) = normalize_reference_key("my data");
        assert!(modified);

        let mut data: KeyRegistry<u8> = KeyRegistry::new(InstanceCategory::NoiseData);
        data.register(key, 1).unwrap();
        assert!(data.contains("my_data"));
    }

    #[test]
    fn test_ghz_circuit_on_linear_coupling() {
        let map = CouplingMap::linear(5);
        let circuit = CircuitBuilder::new(5).ghz().measure_all().build().unwrap();
        assert!(map.validate_circuit(&circuit).is_ok());
        assert_eq!(circuit.count_2q(), 4);
    }

    #[test]
    fn test_constants() {
        assert_eq!(execution::MAX_OPTIMIZATION_LEVEL, 3);
        assert!(!execution::is_valid_optimization_level(4));
        assert_eq!(calibration::DEFAULT_RESET_TIME_NS, 1300.0);
    }
}
