//! Circuit builder for NoiSim
//!
//! Gantree: L1_Circuit → CircuitBuilder
//!
//! Fluent builder for the circuits handed to `run_simulator`. The first
//! invalid gate is remembered and reported by [`CircuitBuilder::build`].

use crate::circuit::Circuit;
use crate::error::{InsError, InsResult};
use crate::gate::Gate;
use crate::types::{Angle, ClbitId, QubitId};

/// Fluent circuit builder (consuming self pattern)
/// Gantree: CircuitBuilder // 빌더 패턴
pub struct CircuitBuilder {
    /// Gantree: circuit: Circuit // 내부 회로
    circuit: Circuit,

    /// First rejected gate, if any
    error: Option<InsError>,
}

impl CircuitBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new circuit builder
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits),
            error: None,
        }
    }

    /// Create with an explicit classical register size
    pub fn with_clbits(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            circuit: Circuit::with_clbits(num_qubits, num_clbits),
            error: None,
        }
    }

    /// Set circuit name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.circuit.set_name(name);
        self
    }

    /// Gantree: gate(self, Gate) -> Self // 게이트 추가
    pub fn gate(mut self, gate: Gate) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.circuit.add_gate(gate) {
                self.error = Some(e);
            }
        }
        self
    }

    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================

    pub fn id(self, qubit: QubitId) -> Self {
        self.gate(Gate::Id(qubit))
    }

    /// Gantree: x(self, q) -> Self // X 추가
    pub fn x(self, qubit: QubitId) -> Self {
        self.gate(Gate::X(qubit))
    }

    pub fn y(self, qubit: QubitId) -> Self {
        self.gate(Gate::Y(qubit))
    }

    pub fn z(self, qubit: QubitId) -> Self {
        self.gate(Gate::Z(qubit))
    }

    /// Gantree: h(self, q) -> Self // H 추가
    pub fn h(self, qubit: QubitId) -> Self {
        self.gate(Gate::H(qubit))
    }

    pub fn s(self, qubit: QubitId) -> Self {
        self.gate(Gate::S(qubit))
    }

    pub fn sdg(self, qubit: QubitId) -> Self {
        self.gate(Gate::Sdg(qubit))
    }

    pub fn sx(self, qubit: QubitId) -> Self {
        self.gate(Gate::Sx(qubit))
    }

    pub fn rx(self, qubit: QubitId, angle: Angle) -> Self {
        self.gate(Gate::Rx(qubit, angle))
    }

    pub fn ry(self, qubit: QubitId, angle: Angle) -> Self {
        self.gate(Gate::Ry(qubit, angle))
    }

    pub fn rz(self, qubit: QubitId, angle: Angle) -> Self {
        self.gate(Gate::Rz(qubit, angle))
    }

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================

    /// Gantree: cx(self, c, t) -> Self // CX 추가
    pub fn cx(self, control: QubitId, target: QubitId) -> Self {
        self.gate(Gate::Cx(control, target))
    }

    pub fn cz(self, q1: QubitId, q2: QubitId) -> Self {
        self.gate(Gate::Cz(q1, q2))
    }

    pub fn ecr(self, q1: QubitId, q2: QubitId) -> Self {
        self.gate(Gate::Ecr(q1, q2))
    }

    pub fn swap(self, q1: QubitId, q2: QubitId) -> Self {
        self.gate(Gate::Swap(q1, q2))
    }

    // ========================================================================
    // Non-Unitary Operations
    // ========================================================================

    pub fn measure(self, qubit: QubitId, clbit: ClbitId) -> Self {
        self.gate(Gate::Measure(qubit, clbit))
    }

    /// Measure qubit i into clbit i for every qubit that has a clbit
    /// Gantree: measure_all(self) -> Self // 전체 측정
    pub fn measure_all(self) -> Self {
        let n = self.circuit.num_qubits().min(self.circuit.num_clbits());
        (0..n).fold(self.barrier(), |b, q| b.measure(q, q))
    }

    pub fn reset(self, qubit: QubitId) -> Self {
        self.gate(Gate::Reset(qubit))
    }

    /// Barrier across all qubits
    pub fn barrier(self) -> Self {
        self.gate(Gate::Barrier(Vec::new()))
    }

    // ========================================================================
    // Composite Patterns
    // ========================================================================

    /// GHZ preparation: H on qubit 0, then a CX chain
    /// Gantree: ghz(self) -> Self // GHZ 상태
    pub fn ghz(self) -> Self {
        let n = self.circuit.num_qubits();
        (0..n.saturating_sub(1)).fold(self.h(0), |b, q| b.cx(q, q + 1))
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Finish building, failing on the first rejected gate
    /// Gantree: build(self) -> Result<Circuit> // 회로 반환
    pub fn build(self) -> InsResult<Circuit> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.circuit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_circuit() {
        let circuit = CircuitBuilder::new(2).h(0).cx(0, 1).measure_all().build().unwrap();
        assert_eq!(circuit.count_1q(), 1);
        assert_eq!(circuit.count_2q(), 1);
        assert_eq!(circuit.count_measurements(), 2);
    }

    #[test]
    fn test_ghz_chain() {
        let circuit = CircuitBuilder::new(4).ghz().build().unwrap();
        assert_eq!(circuit.two_qubit_pairs(), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_first_error_is_reported() {
        let result = CircuitBuilder::new(2).x(5).h(0).build();
        assert!(matches!(result, Err(InsError::InvalidParameter(_))));
    }

    #[test]
    fn test_named() {
        let circuit = CircuitBuilder::new(1).name("probe").x(0).build().unwrap();
        assert_eq!(circuit.name(), Some("probe"));
    }
}
