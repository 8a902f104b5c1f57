//! Quantum circuit structure for NoiSim
//!
//! Gantree: L1_Circuit → Circuit
//!
//! Circuits submitted to simulator instances. Qubit indices are
//! virtual until the transpiler maps them onto a coupling map.

use crate::error::{InsError, InsResult};
use crate::gate::Gate;
use crate::types::{ClbitId, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Quantum circuit
/// Gantree: Circuit // 회로 구조체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Gantree: num_qubits: usize // 큐비트 수
    num_qubits: usize,

    /// Gantree: num_clbits: usize // 고전 비트 수
    num_clbits: usize,

    /// Gantree: gates: Vec<Gate> // 게이트 목록
    gates: Vec<Gate>,

    name: Option<String>,
}

impl Circuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new empty circuit with as many classical bits as qubits
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self::with_clbits(num_qubits, num_qubits)
    }

    /// Create a circuit with an explicit classical register size
    pub fn with_clbits(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            num_qubits,
            num_clbits,
            gates: Vec::new(),
            name: None,
        }
    }

    /// Create from a vector of gates
    pub fn from_gates(num_qubits: usize, num_clbits: usize, gates: Vec<Gate>) -> InsResult<Self> {
        let mut circuit = Self::with_clbits(num_qubits, num_clbits);
        circuit.add_gates(gates)?;
        Ok(circuit)
    }

    // ========================================================================
    // Basic Operations
    // ========================================================================

    /// Add a gate to the circuit
    /// Gantree: add_gate(&mut, Gate) -> Result // 게이트 추가
    pub fn add_gate(&mut self, gate: Gate) -> InsResult<()> {
        let qubits = gate.qubits();
        for &qubit in &qubits {
            if qubit >= self.num_qubits {
                return Err(InsError::InvalidParameter(format!(
                    "gate '{}' uses qubit {} but the circuit has {} qubits",
                    gate.name(),
                    qubit,
                    self.num_qubits
                )));
            }
        }
        if qubits.len() == 2 && qubits[0] == qubits[1] {
            return Err(InsError::InvalidParameter(format!(
                "gate '{}' repeats qubit {}",
                gate.name(),
                qubits[0]
            )));
        }
        if let Gate::Measure(_, clbit) = gate {
            if clbit >= self.num_clbits {
                return Err(InsError::InvalidParameter(format!(
                    "measurement into clbit {} but the circuit has {} clbits",
                    clbit, self.num_clbits
                )));
            }
        }
        self.gates.push(gate);
        Ok(())
    }

    /// Add multiple gates
    pub fn add_gates(&mut self, gates: impl IntoIterator<Item = Gate>) -> InsResult<()> {
        for gate in gates {
            self.add_gate(gate)?;
        }
        Ok(())
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    // ========================================================================
    // Circuit Analysis
    // ========================================================================

    /// Calculate circuit depth (longest path), barriers excluded
    /// Gantree: depth(&self) -> usize // 깊이 계산
    pub fn depth(&self) -> usize {
        let mut qubit_depths = vec![0usize; self.num_qubits];

        for gate in self.gates.iter().filter(|g| !g.is_directive()) {
            let qubits = gate.qubits();
            let level = qubits
                .iter()
                .filter_map(|&q| qubit_depths.get(q))
                .max()
                .copied()
                .unwrap_or(0)
                + 1;
            for q in qubits {
                if let Some(d) = qubit_depths.get_mut(q) {
                    *d = level;
                }
            }
        }

        qubit_depths.into_iter().max().unwrap_or(0)
    }

    /// Gantree: gate_count(&self) -> usize // 게이트 수
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Gantree: count_1q(&self) -> usize // 1Q 수
    pub fn count_1q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_single_qubit()).count()
    }

    /// Gantree: count_2q(&self) -> usize // 2Q 수
    pub fn count_2q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_two_qubit()).count()
    }

    pub fn count_measurements(&self) -> usize {
        self.gates.iter().filter(|g| g.is_measurement()).count()
    }

    /// Count gates per instruction name
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut ops = BTreeMap::new();
        for gate in &self.gates {
            *ops.entry(gate.name().to_string()).or_insert(0) += 1;
        }
        ops
    }

    /// Qubits touched by any non-directive instruction, ascending
    pub fn used_qubits(&self) -> BTreeSet<QubitId> {
        self.gates
            .iter()
            .filter(|g| !g.is_directive())
            .flat_map(|g| g.qubits())
            .collect()
    }

    /// Classical bits written by measurements, ascending
    pub fn measured_clbits(&self) -> BTreeSet<ClbitId> {
        self.gates
            .iter()
            .filter_map(|g| match g {
                Gate::Measure(_, c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Two-qubit gate pairs (for coupling validation)
    pub fn two_qubit_pairs(&self) -> Vec<(QubitId, QubitId)> {
        self.gates
            .iter()
            .filter(|g| g.is_two_qubit())
            .map(|g| {
                let qs = g.qubits();
                (qs[0], qs[1])
            })
            .collect()
    }

    // ========================================================================
    // QASM Conversion
    // ========================================================================

    /// Convert to OpenQASM 2.0 string
    /// Gantree: to_qasm(&self) -> String // QASM2 출력
    pub fn to_qasm(&self) -> String {
        let mut lines = vec![
            "OPENQASM 2.0;".to_string(),
            "include \"qelib1.inc\";".to_string(),
            format!("qreg q[{}];", self.num_qubits),
        ];
        if self.num_clbits > 0 {
            lines.push(format!("creg c[{}];", self.num_clbits));
        }

        for gate in &self.gates {
            let line = match gate {
                Gate::Rx(q, a) | Gate::Ry(q, a) | Gate::Rz(q, a) => {
                    format!("{}({}) q[{}];", gate.name(), a, q)
                }
                Gate::Measure(q, c) => format!("measure q[{}] -> c[{}];", q, c),
                Gate::Barrier(qs) if qs.is_empty() => "barrier q;".to_string(),
                _ => {
                    let args: Vec<String> =
                        gate.qubits().iter().map(|q| format!("q[{}]", q)).collect();
                    format!("{} {};", gate.name(), args.join(","))
                }
            };
            lines.push(line);
        }

        lines.join("\n")
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Circuit{} ({} qubits, {} clbits, {} gates, depth {})",
            self.name
                .as_deref()
                .map(|n| format!(" '{}'", n))
                .unwrap_or_default(),
            self.num_qubits,
            self.num_clbits,
            self.gates.len(),
            self.depth()
        )?;
        for gate in &self.gates {
            writeln!(f, "  {}", gate)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_gate_validates_qubits() {
        let mut circuit = Circuit::new(2);
        assert!(circuit.add_gate(Gate::H(0)).is_ok());
        assert!(circuit.add_gate(Gate::X(2)).is_err());
        assert!(circuit.add_gate(Gate::Cx(1, 1)).is_err());
        assert_eq!(circuit.gate_count(), 1);
    }

    #[test]
    fn test_measure_validates_clbits() {
        let mut circuit = Circuit::with_clbits(2, 1);
        assert!(circuit.add_gate(Gate::Measure(1, 0)).is_ok());
        assert!(circuit.add_gate(Gate::Measure(0, 1)).is_err());
    }

    #[test]
    fn test_depth_and_counts() {
        let circuit = Circuit::from_gates(
            3,
            3,
            vec![
                Gate::H(0),
                Gate::Cx(0, 1),
                Gate::Cx(1, 2),
                Gate::Barrier(vec![]),
                Gate::Measure(0, 0),
                Gate::Measure(2, 2),
            ],
        )
        .unwrap();

        assert_eq!(circuit.depth(), 4);
        assert_eq!(circuit.count_1q(), 1);
        assert_eq!(circuit.count_2q(), 2);
        assert_eq!(circuit.count_measurements(), 2);
        assert_eq!(circuit.count_ops().get("cx"), Some(&2));
        assert_eq!(circuit.measured_clbits().into_iter().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(circuit.two_qubit_pairs(), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_used_qubits_skips_barrier() {
        let circuit =
            Circuit::from_gates(4, 4, vec![Gate::Barrier(vec![0, 1, 2, 3]), Gate::X(2)]).unwrap();
        assert_eq!(circuit.used_qubits().into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_to_qasm() {
        let circuit =
            Circuit::from_gates(2, 2, vec![Gate::Cx(0, 1), Gate::Measure(1, 1)]).unwrap();
        let qasm = circuit.to_qasm();
        assert!(qasm.contains("qreg q[2];"));
        assert!(qasm.contains("cx q[0],q[1];"));
        assert!(qasm.contains("measure q[1] -> c[1];"));
    }
}
