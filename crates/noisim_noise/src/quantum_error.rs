//! Quantum error records
//!
//! Gantree: L4_Noise → QuantumError
//!
//! Parameter records for the error channels attached to instructions.
//! Validation bounds follow the usual channel definitions; the
//! probabilities reported here are the Pauli-twirled error rates the
//! bundled sampler uses.

use noisim_core::physics::T2_T1_RATIO_MAX;
use noisim_core::{InsError, InsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Depolarizing
// ============================================================================

/// Depolarizing channel on `num_qubits` qubits
/// Gantree: DepolarizingError // 탈분극 에러
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepolarizingError {
    /// Depolarizing parameter λ
    pub param: f64,
    pub num_qubits: usize,
}

impl DepolarizingError {
    pub fn new(param: f64, num_qubits: usize) -> Self {
        Self { param, num_qubits }
    }

    /// Largest λ that is still a valid channel: 4^n / (4^n - 1)
    pub fn max_param(num_qubits: usize) -> f64 {
        let dim = 4f64.powi(num_qubits as i32);
        dim / (dim - 1.0)
    }

    /// Gantree: validate() -> Result // 검증
    pub fn validate(&self) -> InsResult<()> {
        if self.num_qubits == 0 {
            return Err(InsError::InvalidErrorParameter(
                "depolarizing error needs at least one qubit".into(),
            ));
        }
        let max = Self::max_param(self.num_qubits);
        if !(self.param.is_finite() && (0.0..=max).contains(&self.param)) {
            return Err(InsError::InvalidErrorParameter(format!(
                "depolarizing parameter {} outside [0, {:.4}] for {} qubit(s)",
                self.param, max, self.num_qubits
            )));
        }
        Ok(())
    }

    /// Probability of a non-identity Pauli: λ (4^n - 1) / 4^n
    pub fn error_probability(&self) -> f64 {
        self.param / Self::max_param(self.num_qubits)
    }
}

// ============================================================================
// Thermal Relaxation
// ============================================================================

/// Single-qubit thermal relaxation over an operation of length `time_s`
/// Gantree: ThermalRelaxation // 열 이완 에러
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalRelaxation {
    pub t1_s: f64,
    pub t2_s: f64,
    pub time_s: f64,
}

impl ThermalRelaxation {
    pub fn new(t1_s: f64, t2_s: f64, time_s: f64) -> Self {
        Self { t1_s, t2_s, time_s }
    }

    /// Gantree: validate() -> Result // 검증
    pub fn validate(&self) -> InsResult<()> {
        if self.t1_s.is_nan() || self.t1_s <= 0.0 {
            return Err(InsError::InvalidErrorParameter(format!(
                "T1 must be positive, got {} s",
                self.t1_s
            )));
        }
        if self.t2_s.is_nan() || self.t2_s <= 0.0 {
            return Err(InsError::InvalidErrorParameter(format!(
                "T2 must be positive, got {} s",
                self.t2_s
            )));
        }
        if self.t2_s > T2_T1_RATIO_MAX * self.t1_s * (1.0 + 1e-12) {
            return Err(InsError::InvalidErrorParameter(format!(
                "T2 ({} s) exceeds 2·T1 ({} s)",
                self.t2_s,
                2.0 * self.t1_s
            )));
        }
        if !self.time_s.is_finite() || self.time_s < 0.0 {
            return Err(InsError::InvalidErrorParameter(format!(
                "operation time must be non-negative, got {} s",
                self.time_s
            )));
        }
        Ok(())
    }

    /// Pauli-twirled (p_x, p_y, p_z)
    /// Gantree: pauli_probabilities() -> [f64;3] // 파울리 확률
    pub fn pauli_probabilities(&self) -> [f64; 3] {
        let decay_1 = 1.0 - (-self.time_s / self.t1_s).exp();
        let decay_2 = 1.0 - (-self.time_s / self.t2_s).exp();
        let p_xy = decay_1 / 4.0;
        let p_z = (decay_2 / 2.0 - decay_1 / 4.0).max(0.0);
        [p_xy, p_xy, p_z]
    }

    pub fn error_probability(&self) -> f64 {
        self.pauli_probabilities().iter().sum()
    }
}

// ============================================================================
// Quantum Error
// ============================================================================

/// Error channel attached to one instruction on specific qubits
/// Gantree: QuantumError // 양자 에러
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuantumError {
    Depolarizing(DepolarizingError),
    ThermalRelaxation(ThermalRelaxation),
    /// Independent relaxation on each qubit of a multi-qubit operation
    Tensor(Vec<ThermalRelaxation>),
}

impl QuantumError {
    pub fn depolarizing(param: f64, num_qubits: usize) -> Self {
        QuantumError::Depolarizing(DepolarizingError::new(param, num_qubits))
    }

    pub fn thermal(t1_s: f64, t2_s: f64, time_s: f64) -> Self {
        QuantumError::ThermalRelaxation(ThermalRelaxation::new(t1_s, t2_s, time_s))
    }

    pub fn num_qubits(&self) -> usize {
        match self {
            QuantumError::Depolarizing(d) => d.num_qubits,
            QuantumError::ThermalRelaxation(_) => 1,
            QuantumError::Tensor(parts) => parts.len(),
        }
    }

    /// Gantree: validate() -> Result // 검증
    pub fn validate(&self) -> InsResult<()> {
        match self {
            QuantumError::Depolarizing(d) => d.validate(),
            QuantumError::ThermalRelaxation(t) => t.validate(),
            QuantumError::Tensor(parts) if parts.is_empty() => Err(
                InsError::InvalidErrorParameter("tensor error has no components".into()),
            ),
            QuantumError::Tensor(parts) => parts.iter().try_for_each(ThermalRelaxation::validate),
        }
    }

    /// Probability that the channel applies a non-identity Pauli
    /// Gantree: error_probability() -> f64 // 에러 확률
    pub fn error_probability(&self) -> f64 {
        match self {
            QuantumError::Depolarizing(d) => d.error_probability(),
            QuantumError::ThermalRelaxation(t) => t.error_probability(),
            QuantumError::Tensor(parts) => {
                1.0 - parts
                    .iter()
                    .map(|t| 1.0 - t.error_probability())
                    .product::<f64>()
            }
        }
    }

    pub fn is_ideal(&self) -> bool {
        self.error_probability() == 0.0
    }
}

impl fmt::Display for QuantumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantumError::Depolarizing(d) => {
                write!(f, "depolarizing({}q, λ={:.3e})", d.num_qubits, d.param)
            }
            QuantumError::ThermalRelaxation(t) => write!(
                f,
                "thermal(T1={:.3e}s, T2={:.3e}s, t={:.3e}s)",
                t.t1_s, t.t2_s, t.time_s
            ),
            QuantumError::Tensor(parts) => write!(f, "thermal⊗{}", parts.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_depolarizing_bounds() {
        assert!(QuantumError::depolarizing(0.01, 1).validate().is_ok());
        assert!(QuantumError::depolarizing(4.0 / 3.0, 1).validate().is_ok());
        assert!(QuantumError::depolarizing(1.34, 1).validate().is_err());
        assert!(QuantumError::depolarizing(-0.01, 2).validate().is_err());
        assert!(QuantumError::depolarizing(f64::NAN, 1).validate().is_err());
        assert_relative_eq!(DepolarizingError::max_param(2), 16.0 / 15.0);
    }

    #[test]
    fn test_depolarizing_probability() {
        let err = QuantumError::depolarizing(0.04, 1);
        assert_relative_eq!(err.error_probability(), 0.03, epsilon = 1e-12);
        assert!(QuantumError::depolarizing(0.0, 2).is_ideal());
    }

    #[test]
    fn test_thermal_validation() {
        assert!(QuantumError::thermal(100e-6, 200e-6, 50e-9).validate().is_ok());
        assert!(QuantumError::thermal(100e-6, 250e-6, 50e-9).validate().is_err());
        assert!(QuantumError::thermal(0.0, 50e-6, 50e-9).validate().is_err());
        assert!(QuantumError::thermal(100e-6, 50e-6, -1.0).validate().is_err());
    }

    #[test]
    fn test_thermal_probabilities() {
        let t = ThermalRelaxation::new(100e-6, 80e-6, 0.0);
        assert_relative_eq!(t.error_probability(), 0.0);

        let t = ThermalRelaxation::new(100e-6, 100e-6, 100e-6);
        let [px, py, pz] = t.pauli_probabilities();
        let d = 1.0 - (-1.0f64).exp();
        assert_relative_eq!(px, d / 4.0, epsilon = 1e-12);
        assert_relative_eq!(py, d / 4.0, epsilon = 1e-12);
        assert_relative_eq!(pz, d / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tensor() {
        let t = ThermalRelaxation::new(100e-6, 100e-6, 1e-6);
        let tensor = QuantumError::Tensor(vec![t, t]);
        let p = t.error_probability();
        assert_eq!(tensor.num_qubits(), 2);
        assert_relative_eq!(tensor.error_probability(), 1.0 - (1.0 - p).powi(2), epsilon = 1e-15);
        assert!(QuantumError::Tensor(vec![]).validate().is_err());
    }
}
