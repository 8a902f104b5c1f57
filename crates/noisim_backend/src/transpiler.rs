//! Circuit transpilation onto a backend
//!
//! Gantree: L5_Backend → Transpiler
//!
//! Maps a logical circuit onto a backend in three passes:
//!
//! 1. **Routing**: trivial layout (logical qubit `i` starts on physical
//!    qubit `i`), SWAPs inserted along shortest coupling paths whenever a
//!    two-qubit gate acts on uncoupled qubits. Measurements follow the
//!    layout, so classical bits keep their logical meaning.
//! 2. **Basis translation**: every gate outside the basis is rewritten into
//!    `rz`, `sx`, `x` and the available two-qubit gate (`cx`, `ecr` or `cz`).
//! 3. **Peephole optimization** (level ≥ 1): adjacent self-inverse pairs
//!    cancel and adjacent `rz` merge. Level 2 also drops `id`; level 3
//!    repeats until the circuit stops shrinking.

use crate::execution::SimulationBackend;
use noisim_core::{execution, Angle, Circuit, CouplingMap, Gate, InsError, InsResult, QubitId};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Rotations closer to zero than this are dropped
const ANGLE_TOLERANCE: f64 = 1e-12;

/// Circuit transpiler for one backend
/// Gantree: Transpiler // 트랜스파일러
#[derive(Debug, Clone)]
pub struct Transpiler {
    coupling: CouplingMap,
    basis_gates: Vec<String>,
    optimization_level: u8,
}

impl Transpiler {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a transpiler; the level must lie in `[0, 3]`
    pub fn new(
        coupling: CouplingMap,
        basis_gates: Vec<String>,
        optimization_level: u8,
    ) -> InsResult<Self> {
        if !execution::is_valid_optimization_level(optimization_level) {
            return Err(InsError::InvalidOptimizationLevel(optimization_level));
        }
        Ok(Self {
            coupling,
            basis_gates,
            optimization_level,
        })
    }

    /// Transpiler targeting a backend's coupling map and basis
    pub fn for_backend(backend: &dyn SimulationBackend, optimization_level: u8) -> InsResult<Self> {
        Self::new(
            backend.coupling_map().clone(),
            backend.basis_gates(),
            optimization_level,
        )
    }

    pub fn optimization_level(&self) -> u8 {
        self.optimization_level
    }

    pub fn basis_gates(&self) -> &[String] {
        &self.basis_gates
    }

    pub fn coupling_map(&self) -> &CouplingMap {
        &self.coupling
    }

    fn supports(&self, instruction: &str) -> bool {
        self.basis_gates.iter().any(|g| g == instruction)
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Map `circuit` onto the backend's physical qubits
    /// Gantree: transpile(circuit) -> Result<Circuit> // 트랜스파일
    pub fn transpile(&self, circuit: &Circuit) -> InsResult<Circuit> {
        let routed = self.route(circuit)?;
        let translated = self.translate(routed)?;
        let optimized = self.optimize(translated);

        let mut physical =
            Circuit::from_gates(self.coupling.num_qubits(), circuit.num_clbits(), optimized)?;
        if let Some(name) = circuit.name() {
            physical.set_name(name);
        }
        self.coupling.validate_circuit(&physical)?;

        log::debug!(
            "transpiled {} gates into {} (depth {}, level {})",
            circuit.gate_count(),
            physical.gate_count(),
            physical.depth(),
            self.optimization_level
        );
        Ok(physical)
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// Gantree: route(circuit) -> Result<Vec<Gate>> // SWAP 라우팅
    fn route(&self, circuit: &Circuit) -> InsResult<Vec<Gate>> {
        let width = self.coupling.num_qubits();
        if circuit.num_qubits() > width {
            return Err(InsError::TopologyViolation(format!(
                "circuit needs {} qubits but the backend has {}",
                circuit.num_qubits(),
                width
            )));
        }

        let mut layout = Layout::trivial(width);
        let mut routed = Vec::with_capacity(circuit.gate_count());

        for gate in circuit.gates() {
            if gate.is_two_qubit() {
                let qubits = gate.qubits();
                let (a, b) = (layout.physical(qubits[0]), layout.physical(qubits[1]));
                if !self.coupling.is_connected(a, b) {
                    let path = self.coupling.shortest_path(a, b).ok_or_else(|| {
                        InsError::TopologyViolation(format!(
                            "no coupling path between qubits {} and {}",
                            a, b
                        ))
                    })?;
                    // Walk the first operand until it neighbours the second
                    for link in path.windows(2).take(path.len() - 2) {
                        routed.push(Gate::Swap(link[0], link[1]));
                        layout.swap_physical(link[0], link[1]);
                    }
                }
            }
            routed.push(gate.remap(|q| layout.physical(q)));
        }

        Ok(routed)
    }

    // ========================================================================
    // Basis Translation
    // ========================================================================

    fn translate(&self, gates: Vec<Gate>) -> InsResult<Vec<Gate>> {
        let mut translated = Vec::with_capacity(gates.len());
        for gate in &gates {
            self.translate_gate(gate, &mut translated)?;
        }
        Ok(translated)
    }

    fn translate_gate(&self, gate: &Gate, out: &mut Vec<Gate>) -> InsResult<()> {
        let passthrough = gate.is_measurement()
            || gate.is_directive()
            || matches!(gate, Gate::Reset(_))
            || self.supports(gate.name());
        if passthrough {
            out.push(gate.clone());
            return Ok(());
        }

        let pieces = self.decompose(gate).ok_or_else(|| {
            InsError::InvalidParameter(format!(
                "gate '{}' cannot be expressed in basis {:?}",
                gate.name(),
                self.basis_gates
            ))
        })?;
        for piece in &pieces {
            self.translate_gate(piece, out)?;
        }
        Ok(())
    }

    /// One rewriting step towards {rz, sx, x, cx/ecr/cz}, equal up to global phase
    /// Gantree: decompose(gate) -> Option<Vec<Gate>> // 게이트 분해
    fn decompose(&self, gate: &Gate) -> Option<Vec<Gate>> {
        let pieces = match *gate {
            Gate::Id(_) => Vec::new(),
            Gate::X(q) => vec![Gate::Sx(q), Gate::Sx(q)],
            Gate::Y(q) => vec![Gate::Rz(q, PI), Gate::X(q)],
            Gate::Z(q) => vec![Gate::Rz(q, PI)],
            Gate::S(q) => vec![Gate::Rz(q, FRAC_PI_2)],
            Gate::Sdg(q) => vec![Gate::Rz(q, -FRAC_PI_2)],
            Gate::H(q) => vec![Gate::Rz(q, FRAC_PI_2), Gate::Sx(q), Gate::Rz(q, FRAC_PI_2)],
            Gate::Rx(q, theta) => vec![
                Gate::Rz(q, FRAC_PI_2),
                Gate::Sx(q),
                Gate::Rz(q, theta + PI),
                Gate::Sx(q),
                Gate::Rz(q, FRAC_PI_2),
            ],
            Gate::Ry(q, theta) => vec![
                Gate::Sx(q),
                Gate::Rz(q, theta + PI),
                Gate::Sx(q),
                Gate::Rz(q, PI),
            ],
            Gate::Cz(a, b) => vec![Gate::H(b), Gate::Cx(a, b), Gate::H(b)],
            Gate::Swap(a, b) => vec![Gate::Cx(a, b), Gate::Cx(b, a), Gate::Cx(a, b)],
            Gate::Ecr(a, b) => vec![
                Gate::X(a),
                Gate::Rz(a, -FRAC_PI_2),
                Gate::Sx(b),
                Gate::Sx(b),
                Gate::Sx(b),
                Gate::Cx(a, b),
            ],
            Gate::Cx(a, b) if self.supports("ecr") => vec![
                Gate::Rz(a, FRAC_PI_2),
                Gate::X(a),
                Gate::Sx(b),
                Gate::Ecr(a, b),
            ],
            Gate::Cx(a, b) if self.supports("cz") => {
                vec![Gate::H(b), Gate::Cz(a, b), Gate::H(b)]
            }
            _ => return None,
        };
        Some(pieces)
    }

    // ========================================================================
    // Optimization
    // ========================================================================

    fn optimize(&self, gates: Vec<Gate>) -> Vec<Gate> {
        let width = self.coupling.num_qubits();
        match self.optimization_level {
            0 => gates,
            1 => peephole(gates, width, false),
            2 => peephole(gates, width, true),
            _ => {
                let mut current = peephole(gates, width, true);
                loop {
                    let before = current.len();
                    current = peephole(current, width, true);
                    if current.len() >= before {
                        return current;
                    }
                }
            }
        }
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Logical ↔ physical qubit assignment
#[derive(Debug, Clone)]
struct Layout {
    to_physical: Vec<QubitId>,
    to_logical: Vec<QubitId>,
}

impl Layout {
    fn trivial(width: usize) -> Self {
        Self {
            to_physical: (0..width).collect(),
            to_logical: (0..width).collect(),
        }
    }

    fn physical(&self, logical: QubitId) -> QubitId {
        self.to_physical[logical]
    }

    fn swap_physical(&mut self, p1: QubitId, p2: QubitId) {
        let (l1, l2) = (self.to_logical[p1], self.to_logical[p2]);
        self.to_logical.swap(p1, p2);
        self.to_physical[l1] = p2;
        self.to_physical[l2] = p1;
    }
}

// ============================================================================
// Peephole Pass
// ============================================================================

/// Wrap an angle into (-π, π]
fn normalize_angle(angle: Angle) -> Angle {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

fn is_negligible_rotation(gate: &Gate) -> bool {
    matches!(gate, Gate::Rz(_, angle) if normalize_angle(*angle).abs() < ANGLE_TOLERANCE)
}

/// Same operation, including symmetric two-qubit gates in either order
fn same_operation(a: &Gate, b: &Gate) -> bool {
    match (a, b) {
        (Gate::Cz(a0, a1), Gate::Cz(b0, b1)) | (Gate::Swap(a0, a1), Gate::Swap(b0, b1)) => {
            (a0, a1) == (b0, b1) || (a0, a1) == (b1, b0)
        }
        _ => a == b,
    }
}

/// One left-to-right sweep. `last[q]` indexes the most recent kept gate on
/// `q`; a gate can only combine with a predecessor that is the most recent
/// gate on every one of its qubits.
fn peephole(gates: Vec<Gate>, width: usize, drop_identity: bool) -> Vec<Gate> {
    let mut kept: Vec<Option<Gate>> = Vec::with_capacity(gates.len());
    let mut last: Vec<Option<usize>> = vec![None; width];

    for gate in gates {
        if is_negligible_rotation(&gate) || (drop_identity && matches!(gate, Gate::Id(_))) {
            continue;
        }
        if absorb(&mut kept, &mut last, &gate) {
            continue;
        }

        let index = kept.len();
        match &gate {
            Gate::Barrier(qubits) if qubits.is_empty() => last.iter_mut().for_each(|l| *l = Some(index)),
            other => other.qubits().into_iter().for_each(|q| last[q] = Some(index)),
        }
        kept.push(Some(gate));
    }

    kept.into_iter().flatten().collect()
}

/// Combine `gate` with its predecessor; true if `gate` needs no slot of its own
fn absorb(kept: &mut [Option<Gate>], last: &mut [Option<usize>], gate: &Gate) -> bool {
    let mergeable = matches!(gate, Gate::Rz(..)) || gate.is_self_inverse();
    if !mergeable {
        return false;
    }
    let qubits = gate.qubits();
    let index = match last[qubits[0]] {
        Some(index) if qubits.iter().all(|&q| last[q] == Some(index)) => index,
        _ => return false,
    };

    let merged_rz = match (&kept[index], gate) {
        (Some(Gate::Rz(q, previous)), Gate::Rz(_, angle)) => {
            Some((*q, normalize_angle(previous + angle)))
        }
        _ => None,
    };
    if let Some((q, merged)) = merged_rz {
        if merged.abs() < ANGLE_TOLERANCE {
            last[q] = None;
            kept[index] = None;
        } else {
            kept[index] = Some(Gate::Rz(q, merged));
        }
        return true;
    }

    let cancels = matches!(
        &kept[index],
        Some(previous) if gate.is_self_inverse() && same_operation(previous, gate)
    );
    if cancels {
        for q in qubits {
            last[q] = None;
        }
        kept[index] = None;
    }
    cancels
}

// ============================================================================
// Tests
// ============================================================================
