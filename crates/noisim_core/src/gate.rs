//! Quantum gate definitions for NoiSim
//!
//! Gantree: L1_Circuit → Gate
//!
//! Instruction set shared by circuits, the transpiler and simulators.
//! Instruction names follow the names used by calibration exports
//! (`id`, `sx`, `x`, `rz`, `ecr`, `cz`, `cx`).

use crate::types::{Angle, ClbitId, QubitId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantum gate enumeration
/// Gantree: Gate // 게이트 enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================
    /// Identity (timing only)
    Id(QubitId),
    /// Pauli-X
    X(QubitId),
    /// Pauli-Y
    Y(QubitId),
    /// Pauli-Z
    Z(QubitId),
    /// Hadamard
    H(QubitId),
    /// S gate (sqrt(Z))
    S(QubitId),
    /// S-dagger
    Sdg(QubitId),
    /// SX gate (sqrt(X))
    Sx(QubitId),
    /// Rotation around X-axis
    Rx(QubitId, Angle),
    /// Rotation around Y-axis
    Ry(QubitId, Angle),
    /// Rotation around Z-axis (virtual on superconducting hardware)
    Rz(QubitId, Angle),

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================
    /// Controlled-NOT (control, target)
    Cx(QubitId, QubitId),
    /// Controlled-Z
    Cz(QubitId, QubitId),
    /// Echoed cross-resonance (IBM native)
    Ecr(QubitId, QubitId),
    /// SWAP
    Swap(QubitId, QubitId),

    // ========================================================================
    // Non-Unitary Operations
    // ========================================================================
    /// Measure qubit into classical bit
    Measure(QubitId, ClbitId),
    /// Reset qubit to |0⟩
    Reset(QubitId),
    /// Barrier; an empty list spans every qubit
    Barrier(Vec<QubitId>),
}

impl Gate {
    /// Instruction name
    /// Gantree: name(&self) -> &str // 명령 이름
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Id(_) => "id",
            Gate::X(_) => "x",
            Gate::Y(_) => "y",
            Gate::Z(_) => "z",
            Gate::H(_) => "h",
            Gate::S(_) => "s",
            Gate::Sdg(_) => "sdg",
            Gate::Sx(_) => "sx",
            Gate::Rx(..) => "rx",
            Gate::Ry(..) => "ry",
            Gate::Rz(..) => "rz",
            Gate::Cx(..) => "cx",
            Gate::Cz(..) => "cz",
            Gate::Ecr(..) => "ecr",
            Gate::Swap(..) => "swap",
            Gate::Measure(..) => "measure",
            Gate::Reset(_) => "reset",
            Gate::Barrier(_) => "barrier",
        }
    }

    /// Qubits the gate acts on, in argument order
    /// Gantree: qubits(&self) -> Vec<QubitId> // 관련 큐비트
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::Id(q)
            | Gate::X(q)
            | Gate::Y(q)
            | Gate::Z(q)
            | Gate::H(q)
            | Gate::S(q)
            | Gate::Sdg(q)
            | Gate::Sx(q)
            | Gate::Rx(q, _)
            | Gate::Ry(q, _)
            | Gate::Rz(q, _)
            | Gate::Measure(q, _)
            | Gate::Reset(q) => vec![*q],
            Gate::Cx(a, b) | Gate::Cz(a, b) | Gate::Ecr(a, b) | Gate::Swap(a, b) => vec![*a, *b],
            Gate::Barrier(qs) => qs.clone(),
        }
    }

    /// Check if gate is a single-qubit unitary
    pub fn is_single_qubit(&self) -> bool {
        matches!(
            self,
            Gate::Id(_)
                | Gate::X(_)
                | Gate::Y(_)
                | Gate::Z(_)
                | Gate::H(_)
                | Gate::S(_)
                | Gate::Sdg(_)
                | Gate::Sx(_)
                | Gate::Rx(..)
                | Gate::Ry(..)
                | Gate::Rz(..)
        )
    }

    /// Check if gate is a two-qubit unitary
    pub fn is_two_qubit(&self) -> bool {
        matches!(self, Gate::Cx(..) | Gate::Cz(..) | Gate::Ecr(..) | Gate::Swap(..))
    }

    /// Check if gate is a measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self, Gate::Measure(..))
    }

    /// Check if gate is a compiler directive
    pub fn is_directive(&self) -> bool {
        matches!(self, Gate::Barrier(_))
    }

    /// Check if applying the gate twice is the identity
    pub fn is_self_inverse(&self) -> bool {
        matches!(
            self,
            Gate::Id(_)
                | Gate::X(_)
                | Gate::Y(_)
                | Gate::Z(_)
                | Gate::H(_)
                | Gate::Cx(..)
                | Gate::Cz(..)
                | Gate::Ecr(..)
                | Gate::Swap(..)
        )
    }

    /// Rewrite qubit arguments through a layout function
    /// Gantree: remap(&self,f) -> Gate // 큐비트 재배치
    pub fn remap<F>(&self, f: F) -> Gate
    where
        F: Fn(QubitId) -> QubitId,
    {
        match self {
            Gate::Id(q) => Gate::Id(f(*q)),
            Gate::X(q) => Gate::X(f(*q)),
            Gate::Y(q) => Gate::Y(f(*q)),
            Gate::Z(q) => Gate::Z(f(*q)),
            Gate::H(q) => Gate::H(f(*q)),
            Gate::S(q) => Gate::S(f(*q)),
            Gate::Sdg(q) => Gate::Sdg(f(*q)),
            Gate::Sx(q) => Gate::Sx(f(*q)),
            Gate::Rx(q, a) => Gate::Rx(f(*q), *a),
            Gate::Ry(q, a) => Gate::Ry(f(*q), *a),
            Gate::Rz(q, a) => Gate::Rz(f(*q), *a),
            Gate::Cx(a, b) => Gate::Cx(f(*a), f(*b)),
            Gate::Cz(a, b) => Gate::Cz(f(*a), f(*b)),
            Gate::Ecr(a, b) => Gate::Ecr(f(*a), f(*b)),
            Gate::Swap(a, b) => Gate::Swap(f(*a), f(*b)),
            Gate::Measure(q, c) => Gate::Measure(f(*q), *c),
            Gate::Reset(q) => Gate::Reset(f(*q)),
            Gate::Barrier(qs) => Gate::Barrier(qs.iter().map(|&q| f(q)).collect()),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Rx(q, a) | Gate::Ry(q, a) | Gate::Rz(q, a) => {
                write!(f, "{}({:.4}) q[{}]", self.name(), a, q)
            }
            Gate::Measure(q, c) => write!(f, "measure q[{}] -> c[{}]", q, c),
            Gate::Barrier(qs) if qs.is_empty() => write!(f, "barrier"),
            _ => {
                let args: Vec<String> = self.qubits().iter().map(|q| format!("q[{}]", q)).collect();
                write!(f, "{} {}", self.name(), args.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_names_match_calibration_codes() {
        assert_eq!(Gate::Sx(0).name(), "sx");
        assert_eq!(Gate::Ecr(0, 1).name(), "ecr");
        assert_eq!(Gate::Measure(0, 0).name(), "measure");
    }

    #[test]
    fn test_qubits_and_arity() {
        assert_eq!(Gate::Cx(2, 5).qubits(), vec![2, 5]);
        assert!(Gate::Cx(2, 5).is_two_qubit());
        assert!(Gate::Rz(1, 0.5).is_single_qubit());
        assert!(!Gate::Measure(0, 0).is_single_qubit());
        assert!(Gate::Barrier(vec![]).is_directive());
    }

    #[test]
    fn test_remap() {
        let gate = Gate::Ecr(0, 1).remap(|q| q + 10);
        assert_eq!(gate, Gate::Ecr(10, 11));
        let m = Gate::Measure(1, 1).remap(|q| q * 3);
        assert_eq!(m, Gate::Measure(3, 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(Gate::Cx(0, 1).to_string(), "cx q[0], q[1]");
        assert_eq!(Gate::Measure(2, 0).to_string(), "measure q[2] -> c[0]");
    }
}
