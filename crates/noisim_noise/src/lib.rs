//! # NoiSim Noise
//!
//! Derivation of noise parameters from calibration tables and the error
//! models built from them.
//!
//! ## Gantree Architecture
//!
//! ```text
//! noisim_noise // L4: Noise
//!     L4_Noise // 노이즈 모델
//!         QuantumError // 탈분극, 열 이완, 텐서 에러
//!         NoiseParameters // 보정 표에서 파라미터 도출 (T2 제한, 결측 건너뜀)
//!         NoiseModel // ErrorModel / ErrorModelBuilder 기본 구현
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use noisim_calibration::prelude::*;
//! use noisim_noise::prelude::*;
//!
//! let csv = "T1 (us),T2 (us),√x (sx) error,Single-qubit gate length (ns)\n100,250,0.001,50\n";
//! let config = CalibrationConfig::default();
//! let (table, _) = transform(parse_csv(csv).unwrap(), &config).unwrap();
//!
//! let params = derive_noise_parameters(&table, &config).unwrap();
//! let model = NoiseModelBuilder::new().build(&params).unwrap();
//! assert!(!model.is_ideal());
//! ```

#![warn(clippy::all)]

pub mod noise_model;
pub mod parameters;
pub mod quantum_error;

pub use noise_model::{ErrorModel, ErrorModelBuilder, NoiseModel, NoiseModelBuilder};
pub use parameters::{
    derive_noise_parameters, GateErrorSpec, NoiseParameters, ReadoutError, SkippedError,
};
pub use quantum_error::{DepolarizingError, QuantumError, ThermalRelaxation};

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::noise_model::{ErrorModel, ErrorModelBuilder, NoiseModel, NoiseModelBuilder};
    pub use crate::parameters::{
        derive_noise_parameters, GateErrorSpec, NoiseParameters, ReadoutError, SkippedError,
    };
    pub use crate::quantum_error::{DepolarizingError, QuantumError, ThermalRelaxation};
}

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
    use approx::assert_relative_eq;
    use noisim_calibration::prelude::*;
    use noisim_core::InsError;

    const CSV: &str = "\
Qubit,T1 (us),T2 (us),Prob meas0 prep1,Prob meas1 prep0,Readout length (ns),ID error,√x (sx) error,Pauli-X error,Z-axis rotation (rz) error,Single-qubit gate length (ns),CZ error,Gate time (ns)
0,100,250,0.02,0.01,800,0.0003,0.0003,0.0003,0,36,1:0.004,1:68
1,140,120,0.03,0.02,800,0.0004,0.0004,0.0004,0,36,0:0.004;2:0.005,0:68;2:68
2,95,60,0.01,0.01,800,0.0002,0.0002,0.0002,0,36,1:0.005,1:68
3,110,90,0.02,0.02,800,,,,0,36,,
";

    fn table() -> (CalibrationTable, CalibrationConfig) {
        let config = CalibrationConfig::default();
        let (table, _) = transform(parse_csv(CSV).unwrap(), &config).unwrap();
        (table, config)
    }

    #[test]
    fn test_full_pipeline() {
        let (table, config) = table();
        let params = derive_noise_parameters(&table, &config).unwrap();
        let model = NoiseModelBuilder::new().build_model(&params).unwrap();

        assert_eq!(model.num_qubits(), 4);
        assert_eq!(
            model.basis_gates(),
            vec!["delay", "measure", "reset", "id", "sx", "x", "rz", "cz"]
        );
        assert_eq!(
            model.noise_instructions(),
            vec!["cz", "id", "measure", "reset", "rz", "sx", "x"]
        );
        // Qubit 3 keeps its thermal errors even without gate error data
        assert!(model.error_probability("sx", &[3]) > 0.0);
        assert!(model.error_probability("cz", &[0, 1]) > model.error_probability("sx", &[0]));
        // Isolated qubit 3 contributes no coupling
        assert!(params.coupling_edges.iter().all(|&(a, b)| a != 3 && b != 3));
    }

    #[test]
    fn test_t2_clamp_reaches_the_model() {
        let (table, config) = table();
        let params = derive_noise_parameters(&table, &config).unwrap();
        let model = NoiseModelBuilder::new().build_model(&params).unwrap();

        let thermal = model
            .errors("measure", &[0])
            .iter()
            .find_map(|e| match e {
                QuantumError::ThermalRelaxation(t) => Some(*t),
                _ => None,
            })
            .unwrap();
        assert_relative_eq!(thermal.t2_s, 200e-6, epsilon = 1e-15);
    }

    #[test]
    fn test_invalid_calibration_value_aborts_build() {
        let csv = "T1 (us),T2 (us),√x (sx) error,Single-qubit gate length (ns)\n-5,10,0.001,50\n";
        let config = CalibrationConfig::default();
        let (table, _) = transform(parse_csv(csv).unwrap(), &config).unwrap();
        let params = derive_noise_parameters(&table, &config).unwrap();
        assert!(matches!(
            NoiseModelBuilder::new().build(&params),
            Err(InsError::InvalidErrorParameter(_))
        ));
    }

    #[test]
    fn test_table_without_errors_is_ideal() {
        let csv = "Qubit,Operational\n0,true\n1,true\n";
        let config = CalibrationConfig::default();
        let (table, _) = transform(parse_csv(csv).unwrap(), &config).unwrap();
        let params = derive_noise_parameters(&table, &config).unwrap();
        let model = NoiseModelBuilder::new().build(&params).unwrap();
        assert!(model.is_ideal());
        assert_eq!(model.basis_gates(), vec!["delay", "measure", "reset"]);
    }
}
