//! Local noisy simulator
//!
//! Gantree: L5_Backend → LocalSimulator
//!
//! State-vector simulation over the physical qubits a circuit touches.
//! Noise is sampled per shot: after every instruction that carries an
//! error, a uniformly random non-identity Pauli is applied with the
//! model's combined error probability. Measurement errors are applied
//! before the measurement; readout errors flip the recorded bit.
//!
//! Circuits whose gates carry no error and whose measurements are all
//! terminal are evolved once and sampled `shots` times.

use crate::execution::{BackendFactory, ExecutionMetadata, ExecutionResult, SimulationBackend};
use crate::job::JobHandle;
use noisim_core::{execution, Circuit, CouplingMap, Counts, Gate, InsError, InsResult, QubitId};
use noisim_noise::{ErrorModel, ReadoutError};
use num_complex::Complex64;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::FRAC_1_SQRT_2;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

// ============================================================================
// Options
// ============================================================================

/// Simulator configuration
/// Gantree: SimulatorOptions // 시뮬레이터 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorOptions {
    /// RNG seed; every job of a seeded simulator replays the same stream
    pub seed: Option<u64>,

    /// Largest number of active qubits accepted
    pub max_qubits: usize,

    /// Backend name reported in results and job ids
    pub backend_name: String,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            seed: None,
            max_qubits: execution::MAX_SIMULATED_QUBITS,
            backend_name: "local_simulator".to_string(),
        }
    }
}

impl SimulatorOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    pub fn with_backend_name(mut self, name: impl Into<String>) -> Self {
        self.backend_name = name.into();
        self
    }
}

// ============================================================================
// Local Simulator
// ============================================================================

/// Simulator backend bound to one error model
/// Gantree: LocalSimulator // 로컬 시뮬레이터
#[derive(Debug)]
pub struct LocalSimulator {
    options: SimulatorOptions,
    noise_model: Arc<dyn ErrorModel>,
    coupling: CouplingMap,
    submitted: AtomicU64,
}

impl LocalSimulator {
    /// Create a simulator; the coupling map must span the model's qubits
    pub fn new(noise_model: Arc<dyn ErrorModel>, coupling: CouplingMap) -> InsResult<Self> {
        if coupling.num_qubits() != noise_model.num_qubits() {
            return Err(InsError::InvalidParameter(format!(
                "coupling map spans {} qubits but the noise model has {}",
                coupling.num_qubits(),
                noise_model.num_qubits()
            )));
        }
        Ok(Self {
            options: SimulatorOptions::default(),
            noise_model,
            coupling,
            submitted: AtomicU64::new(0),
        })
    }

    pub fn with_options(mut self, options: SimulatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    pub fn options(&self) -> &SimulatorOptions {
        &self.options
    }

    fn next_job_id(&self) -> String {
        let n = self.submitted.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-job-{}", self.options.backend_name, n)
    }

    fn check_circuit(&self, circuit: &Circuit, shots: u64) -> InsResult<()> {
        if shots == 0 {
            return Err(InsError::InvalidShots(shots));
        }
        if circuit.num_qubits() > self.num_qubits() {
            return Err(InsError::TopologyViolation(format!(
                "circuit needs {} qubits but {} has {}",
                circuit.num_qubits(),
                self.options.backend_name,
                self.num_qubits()
            )));
        }
        if circuit.count_measurements() == 0 {
            return Err(InsError::InvalidParameter(
                "circuit has no measurements; there are no counts to return".to_string(),
            ));
        }
        let active = circuit.used_qubits().len();
        if active > self.options.max_qubits {
            return Err(InsError::BackendError(format!(
                "circuit acts on {} qubits; {} simulates at most {}",
                active, self.options.backend_name, self.options.max_qubits
            )));
        }
        Ok(())
    }
}

impl SimulationBackend for LocalSimulator {
    fn name(&self) -> &str {
        &self.options.backend_name
    }

    fn num_qubits(&self) -> usize {
        self.noise_model.num_qubits()
    }

    fn basis_gates(&self) -> Vec<String> {
        self.noise_model.basis_gates()
    }

    fn coupling_map(&self) -> &CouplingMap {
        &self.coupling
    }

    fn noise_model(&self) -> Arc<dyn ErrorModel> {
        Arc::clone(&self.noise_model)
    }

    fn run(&self, circuit: &Circuit, shots: u64) -> InsResult<JobHandle> {
        self.check_circuit(circuit, shots)?;

        let program = Program::compile(circuit, self.noise_model.as_ref());
        let job_id = self.next_job_id();
        let backend = self.options.backend_name.clone();
        let seed = self.options.seed;

        let worker_job_id = job_id.clone();
        let worker_backend = backend.clone();
        JobHandle::spawn(job_id, backend, move || {
            let started = Instant::now();
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let (counts, method) = program.run(shots, &mut rng);

            let mut extra = HashMap::new();
            extra.insert("method".to_string(), method.to_string());
            extra.insert("active_qubits".to_string(), program.num_qubits.to_string());
            Ok(ExecutionResult {
                counts,
                shots,
                metadata: ExecutionMetadata {
                    backend: worker_backend,
                    job_id: Some(worker_job_id),
                    execution_time_ms: Some(started.elapsed().as_millis() as u64),
                    seed,
                    extra,
                },
            })
        })
    }
}

/// Factory producing [`LocalSimulator`]s
/// Gantree: LocalSimulatorFactory // 팩토리
#[derive(Debug, Clone, Default)]
pub struct LocalSimulatorFactory {
    options: SimulatorOptions,
}

impl LocalSimulatorFactory {
    pub fn new(options: SimulatorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SimulatorOptions {
        &self.options
    }
}

impl BackendFactory for LocalSimulatorFactory {
    fn create(
        &self,
        model: Arc<dyn ErrorModel>,
        coupling: CouplingMap,
    ) -> InsResult<Arc<dyn SimulationBackend>> {
        let simulator = LocalSimulator::new(model, coupling)?.with_options(self.options.clone());
        Ok(Arc::new(simulator))
    }
}

// ============================================================================
// Compiled Program
// ============================================================================

/// Instruction on active (compacted) qubit indices
#[derive(Debug, Clone)]
enum Op {
    Unitary {
        gate: Gate,
        error: f64,
    },
    Measure {
        qubit: usize,
        clbit: usize,
        error: f64,
        readout: Option<ReadoutError>,
    },
    Reset {
        qubit: usize,
        error: f64,
    },
}

/// Circuit with the model's errors looked up once per instruction
#[derive(Debug, Clone)]
struct Program {
    num_qubits: usize,
    num_clbits: usize,
    ops: Vec<Op>,
}

impl Program {
    /// Gantree: compile(circuit, model) -> Program // 명령 변환
    fn compile(circuit: &Circuit, model: &dyn ErrorModel) -> Self {
        let active: Vec<QubitId> = circuit.used_qubits().into_iter().collect();
        let mut slot = vec![0usize; circuit.num_qubits()];
        for (index, &qubit) in active.iter().enumerate() {
            slot[qubit] = index;
        }

        let ops = circuit
            .gates()
            .iter()
            .filter(|gate| !gate.is_directive())
            .map(|gate| {
                let error = model.error_probability(gate.name(), &gate.qubits());
                match *gate {
                    Gate::Measure(q, c) => Op::Measure {
                        qubit: slot[q],
                        clbit: c,
                        error,
                        readout: model.readout_error(q).filter(|r| !r.is_ideal()),
                    },
                    Gate::Reset(q) => Op::Reset {
                        qubit: slot[q],
                        error,
                    },
                    _ => Op::Unitary {
                        gate: gate.remap(|q| slot[q]),
                        error,
                    },
                }
            })
            .collect();

        Self {
            num_qubits: active.len(),
            num_clbits: circuit.num_clbits(),
            ops,
        }
    }

    /// Index of the first measurement if nothing but error-free gates
    /// precede it and nothing but measurements follow it
    fn sampling_split(&self) -> Option<usize> {
        let first = self
            .ops
            .iter()
            .position(|op| matches!(op, Op::Measure { .. }))?;
        let clean_prefix = self.ops[..first]
            .iter()
            .all(|op| matches!(op, Op::Unitary { error, .. } if *error <= 0.0));
        let terminal = self.ops[first..]
            .iter()
            .all(|op| matches!(op, Op::Measure { .. }));
        (clean_prefix && terminal).then_some(first)
    }

    fn run(&self, shots: u64, rng: &mut StdRng) -> (Counts, &'static str) {
        match self.sampling_split() {
            Some(split) => (self.run_sampled(split, shots, rng), "sampled"),
            None => (self.run_trajectories(shots, rng), "trajectory"),
        }
    }

    /// Evolve once, then sample each shot from the final distribution
    fn run_sampled(&self, split: usize, shots: u64, rng: &mut StdRng) -> Counts {
        let mut state = StateVector::new(self.num_qubits);
        for op in &self.ops[..split] {
            if let Op::Unitary { gate, .. } = op {
                state.apply_gate(gate);
            }
        }
        let cumulative = state.cumulative_probabilities();

        let mut counts = Counts::new();
        for _ in 0..shots {
            let outcome = sample_index(&cumulative, rng);
            let mut clbits = vec![false; self.num_clbits];
            for op in &self.ops[split..] {
                if let Op::Measure {
                    qubit,
                    clbit,
                    error,
                    readout,
                } = op
                {
                    let mut bit = (outcome >> qubit) & 1 == 1;
                    // X and Y errors before a measurement flip its outcome
                    if *error > 0.0 && rng.gen::<f64>() < *error && rng.gen_range(0..3) < 2 {
                        bit = !bit;
                    }
                    clbits[*clbit] = apply_readout(bit, readout.as_ref(), rng);
                }
            }
            *counts.entry(bitstring(&clbits)).or_insert(0) += 1;
        }
        counts
    }

    /// Full state evolution per shot
    fn run_trajectories(&self, shots: u64, rng: &mut StdRng) -> Counts {
        let mut counts = Counts::new();
        for _ in 0..shots {
            let mut state = StateVector::new(self.num_qubits);
            let mut clbits = vec![false; self.num_clbits];

            for op in &self.ops {
                match op {
                    Op::Unitary { gate, error } => {
                        state.apply_gate(gate);
                        maybe_pauli(&mut state, &gate.qubits(), *error, rng);
                    }
                    Op::Measure {
                        qubit,
                        clbit,
                        error,
                        readout,
                    } => {
                        maybe_pauli(&mut state, &[*qubit], *error, rng);
                        let bit = state.measure(*qubit, rng);
                        clbits[*clbit] = apply_readout(bit, readout.as_ref(), rng);
                    }
                    Op::Reset { qubit, error } => {
                        if state.measure(*qubit, rng) {
                            state.apply_pauli(*qubit, 1);
                        }
                        maybe_pauli(&mut state, &[*qubit], *error, rng);
                    }
                }
            }
            *counts.entry(bitstring(&clbits)).or_insert(0) += 1;
        }
        counts
    }
}

/// Apply a random non-identity Pauli on `qubits` with probability `error`
fn maybe_pauli(state: &mut StateVector, qubits: &[usize], error: f64, rng: &mut StdRng) {
    if error <= 0.0 || qubits.is_empty() || rng.gen::<f64>() >= error {
        return;
    }
    // Pauli string encoded base 4 over the qubits; 0 is the identity
    let strings = 4usize.pow(qubits.len() as u32);
    let mut code = rng.gen_range(1..strings);
    for &qubit in qubits {
        state.apply_pauli(qubit, (code % 4) as u8);
        code /= 4;
    }
}

fn apply_readout(bit: bool, readout: Option<&ReadoutError>, rng: &mut StdRng) -> bool {
    match readout {
        Some(r) if rng.gen::<f64>() < r.flip_probability(bit) => !bit,
        _ => bit,
    }
}

fn sample_index(cumulative: &[f64], rng: &mut StdRng) -> usize {
    let total = cumulative.last().copied().unwrap_or(0.0);
    let r = rng.gen::<f64>() * total;
    cumulative
        .partition_point(|&c| c <= r)
        .min(cumulative.len().saturating_sub(1))
}

/// Highest classical bit first
fn bitstring(clbits: &[bool]) -> String {
    clbits
        .iter()
        .rev()
        .map(|&b| if b { '1' } else { '0' })
        .collect()
}

// ============================================================================
// State Vector
// ============================================================================

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Amplitudes indexed little-endian: bit `q` of the index is qubit `q`
#[derive(Debug, Clone)]
struct StateVector {
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![ZERO; 1 << num_qubits];
        amplitudes[0] = ONE;
        Self { amplitudes }
    }

    fn apply_gate(&mut self, gate: &Gate) {
        match *gate {
            Gate::Cx(c, t) => self.apply_cx(c, t),
            Gate::Cz(a, b) => self.apply_cz(a, b),
            Gate::Swap(a, b) => self.apply_swap(a, b),
            Gate::Ecr(a, b) => self.apply_two_qubit(a, b, &ecr_matrix()),
            _ => {
                if let Some(matrix) = single_qubit_matrix(gate) {
                    for q in gate.qubits() {
                        self.apply_single_qubit(q, &matrix);
                    }
                }
            }
        }
    }

    /// 0 = I, 1 = X, 2 = Y, 3 = Z
    fn apply_pauli(&mut self, q: usize, pauli: u8) {
        let matrix = match pauli {
            1 => [[ZERO, ONE], [ONE, ZERO]],
            2 => [[ZERO, -I], [I, ZERO]],
            3 => [[ONE, ZERO], [ZERO, -ONE]],
            _ => return,
        };
        self.apply_single_qubit(q, &matrix);
    }

    fn apply_single_qubit(&mut self, q: usize, m: &[[Complex64; 2]; 2]) {
        let mask = 1 << q;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let (a, b) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    /// `m` acts on the local index `bit(q0) + 2·bit(q1)`
    fn apply_two_qubit(&mut self, q0: usize, q1: usize, m: &[[Complex64; 4]; 4]) {
        let (m0, m1) = (1 << q0, 1 << q1);
        for i in 0..self.amplitudes.len() {
            if i & (m0 | m1) == 0 {
                let idx = [i, i | m0, i | m1, i | m0 | m1];
                let v = idx.map(|k| self.amplitudes[k]);
                for (row, &k) in idx.iter().enumerate() {
                    self.amplitudes[k] = (0..4).map(|col| m[row][col] * v[col]).sum();
                }
            }
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let (cm, tm) = (1 << control, 1 << target);
        for i in 0..self.amplitudes.len() {
            if i & cm != 0 && i & tm == 0 {
                self.amplitudes.swap(i, i | tm);
            }
        }
    }

    fn apply_cz(&mut self, a: usize, b: usize) {
        let mask = (1 << a) | (1 << b);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == mask {
                *amp = -*amp;
            }
        }
    }

    fn apply_swap(&mut self, a: usize, b: usize) {
        let (am, bm) = (1 << a, 1 << b);
        for i in 0..self.amplitudes.len() {
            if i & am != 0 && i & bm == 0 {
                self.amplitudes.swap(i, i ^ am ^ bm);
            }
        }
    }

    fn probability_one(&self, q: usize) -> f64 {
        let mask = 1 << q;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Projective measurement of one qubit
    fn measure(&mut self, q: usize, rng: &mut StdRng) -> bool {
        let p1 = self.probability_one(q);
        let outcome = rng.gen::<f64>() < p1;
        let kept = if outcome { p1 } else { 1.0 - p1 };
        let norm = kept.sqrt();
        let mask = 1 << q;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) != outcome {
                *amp = ZERO;
            } else if norm > 0.0 {
                *amp /= norm;
            }
        }
        outcome
    }

    fn cumulative_probabilities(&self) -> Vec<f64> {
        self.amplitudes
            .iter()
            .scan(0.0, |acc, a| {
                *acc += a.norm_sqr();
                Some(*acc)
            })
            .collect()
    }
}

fn single_qubit_matrix(gate: &Gate) -> Option<[[Complex64; 2]; 2]> {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    let matrix = match *gate {
        Gate::Id(_) => [[ONE, ZERO], [ZERO, ONE]],
        Gate::X(_) => [[ZERO, ONE], [ONE, ZERO]],
        Gate::Y(_) => [[ZERO, -I], [I, ZERO]],
        Gate::Z(_) => [[ONE, ZERO], [ZERO, -ONE]],
        Gate::H(_) => [[h, h], [h, -h]],
        Gate::S(_) => [[ONE, ZERO], [ZERO, I]],
        Gate::Sdg(_) => [[ONE, ZERO], [ZERO, -I]],
        Gate::Sx(_) => {
            let p = Complex64::new(0.5, 0.5);
            let m = Complex64::new(0.5, -0.5);
            [[p, m], [m, p]]
        }
        Gate::Rx(_, theta) => {
            let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
            let c = Complex64::new(c, 0.0);
            let s = Complex64::new(0.0, -s);
            [[c, s], [s, c]]
        }
        Gate::Ry(_, theta) => {
            let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
            [
                [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
                [Complex64::new(s, 0.0), Complex64::new(c, 0.0)],
            ]
        }
        Gate::Rz(_, theta) => [
            [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
            [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
        ],
        _ => return None,
    };
    Some(matrix)
}

fn ecr_matrix() -> [[Complex64; 4]; 4] {
    let r = Complex64::new(FRAC_1_SQRT_2, 0.0);
    let ir = Complex64::new(0.0, FRAC_1_SQRT_2);
    [
        [ZERO, r, ZERO, ir],
        [r, ZERO, -ir, ZERO],
        [ZERO, ir, ZERO, r],
        [-ir, ZERO, r, ZERO],
    ]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use noisim_core::CircuitBuilder;
    use noisim_noise::{NoiseModel, QuantumError};

    fn basis() -> Vec<String> {
        ["measure", "reset", "rz", "sx", "x", "cx", "ecr"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn simulator(model: NoiseModel) -> LocalSimulator {
        let n = model.num_qubits();
        LocalSimulator::new(Arc::new(model), CouplingMap::linear(n))
            .unwrap()
            .with_seed(42)
    }

    fn ideal(n: usize) -> LocalSimulator {
        simulator(NoiseModel::ideal(n, basis()))
    }

    fn run(sim: &LocalSimulator, circuit: &Circuit, shots: u64) -> ExecutionResult {
        sim.run(circuit, shots).unwrap().wait().unwrap()
    }

    #[test]
    fn test_bell_state_ideal() {
        let sim = ideal(2);
        let circuit = CircuitBuilder::new(2).h(0).cx(0, 1).measure_all().build().unwrap();
        let result = run(&sim, &circuit, 1000);

        assert_eq!(result.total_counts(), 1000);
        let p00 = result.probability("00");
        let p11 = result.probability("11");
        assert_relative_eq!(p00 + p11, 1.0);
        assert!((p00 - 0.5).abs() < 0.1, "p00 = {}", p00);
        assert_eq!(result.metadata.extra["method"], "sampled");
    }

    #[test]
    fn test_bitstring_order() {
        let sim = ideal(3);
        let circuit = CircuitBuilder::new(3).x(0).measure_all().build().unwrap();
        let result = run(&sim, &circuit, 10);
        assert_eq!(result.counts.get("001"), Some(&10));
    }

    #[test]
    fn test_unmeasured_clbits_read_zero() {
        let sim = ideal(2);
        let circuit = CircuitBuilder::new(2).x(1).measure(1, 1).build().unwrap();
        let result = run(&sim, &circuit, 5);
        assert_eq!(result.counts.get("10"), Some(&5));
    }

    #[test]
    fn test_ecr_matches_cx_decomposition() {
        use std::f64::consts::FRAC_PI_2;
        let sim = ideal(2);
        // rz(π/2)·x on the control, sx on the target, then ECR acts as CX
        let circuit = CircuitBuilder::new(2)
            .x(0)
            .rz(0, FRAC_PI_2)
            .x(0)
            .sx(1)
            .ecr(0, 1)
            .measure_all()
            .build()
            .unwrap();
        let result = run(&sim, &circuit, 50);
        assert_eq!(result.counts.get("11"), Some(&50));
    }

    #[test]
    fn test_mid_circuit_measurement_and_reset() {
        let sim = ideal(1);
        let circuit = CircuitBuilder::with_clbits(1, 3)
            .measure(0, 0)
            .x(0)
            .measure(0, 1)
            .reset(0)
            .measure(0, 2)
            .build()
            .unwrap();
        let result = run(&sim, &circuit, 20);
        assert_eq!(result.counts.get("010"), Some(&20));
        assert_eq!(result.metadata.extra["method"], "trajectory");
    }

    #[test]
    fn test_readout_error_flips() {
        let mut model = NoiseModel::ideal(1, basis());
        model
            .add_readout_error(ReadoutError {
                qubit: 0,
                prob_meas1_prep0: 1.0,
                prob_meas0_prep1: 0.0,
            })
            .unwrap();
        let sim = simulator(model);
        let circuit = CircuitBuilder::new(1).measure(0, 0).build().unwrap();
        assert_eq!(run(&sim, &circuit, 100).counts.get("1"), Some(&100));
    }

    #[test]
    fn test_depolarizing_gate_noise() {
        let mut model = NoiseModel::ideal(1, basis());
        // Maximal single-qubit parameter: an error after every x
        model
            .add_quantum_error(QuantumError::depolarizing(4.0 / 3.0, 1), "x", &[0])
            .unwrap();
        let sim = simulator(model);
        let circuit = CircuitBuilder::new(1).x(0).measure(0, 0).build().unwrap();
        let result = run(&sim, &circuit, 3000);

        // X and Y undo the flip, Z keeps it
        let p0 = result.probability("0");
        assert!((p0 - 2.0 / 3.0).abs() < 0.05, "p0 = {}", p0);
        assert_eq!(result.metadata.extra["method"], "trajectory");
    }

    #[test]
    fn test_seed_reproducibility() {
        let mut model = NoiseModel::ideal(2, basis());
        model
            .add_quantum_error(QuantumError::depolarizing(0.2, 2), "cx", &[0, 1])
            .unwrap();
        let sim = simulator(model);
        let circuit = CircuitBuilder::new(2).h(0).cx(0, 1).measure_all().build().unwrap();

        let first = run(&sim, &circuit, 500);
        let second = run(&sim, &circuit, 500);
        assert_eq!(first.counts, second.counts);
        assert_eq!(first.metadata.seed, Some(42));
    }

    #[test]
    fn test_job_ids_are_unique() {
        let sim = ideal(1);
        let circuit = CircuitBuilder::new(1).measure(0, 0).build().unwrap();
        let a = sim.run(&circuit, 1).unwrap();
        let b = sim.run(&circuit, 1).unwrap();
        assert_ne!(a.job_id(), b.job_id());
        assert_eq!(a.wait().unwrap().metadata.job_id.as_deref(), Some(a.job_id()));
    }

    #[test]
    fn test_rejected_submissions() {
        let sim = ideal(2);
        let measured = CircuitBuilder::new(2).measure_all().build().unwrap();
        assert_eq!(sim.run(&measured, 0).unwrap_err(), InsError::InvalidShots(0));

        let unmeasured = CircuitBuilder::new(2).h(0).build().unwrap();
        assert!(sim.run(&unmeasured, 10).unwrap_err().is_invalid_parameter());

        let wide = CircuitBuilder::new(3).measure_all().build().unwrap();
        assert!(matches!(
            sim.run(&wide, 10),
            Err(InsError::TopologyViolation(_))
        ));
    }

    #[test]
    fn test_active_qubit_limit() {
        let sim = ideal(4).with_options(SimulatorOptions::default().with_max_qubits(2));
        let circuit = CircuitBuilder::new(4).ghz().measure_all().build().unwrap();
        assert!(matches!(sim.run(&circuit, 1), Err(InsError::BackendError(_))));
    }

    #[test]
    fn test_only_touched_qubits_are_simulated() {
        let sim = ideal(30);
        let circuit = CircuitBuilder::with_clbits(30, 2)
            .x(29)
            .measure(29, 1)
            .measure(3, 0)
            .build()
            .unwrap();
        let result = run(&sim, &circuit, 4);
        assert_eq!(result.counts.get("10"), Some(&4));
        assert_eq!(result.metadata.extra["active_qubits"], "2");
    }

    #[test]
    fn test_factory_and_coupling_check() {
        let factory =
            LocalSimulatorFactory::new(SimulatorOptions::default().with_backend_name("fake_kyiv"));
        let model: Arc<dyn ErrorModel> = Arc::new(NoiseModel::ideal(3, basis()));

        let backend = factory
            .create(Arc::clone(&model), CouplingMap::linear(3))
            .unwrap();
        assert_eq!(backend.name(), "fake_kyiv");
        assert_eq!(backend.num_qubits(), 3);
        assert!(backend.basis_gates().contains(&"ecr".to_string()));

        assert!(factory.create(model, CouplingMap::linear(2)).is_err());
    }

    #[test]
    fn test_options_serde_defaults() {
        let options: SimulatorOptions = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.max_qubits, execution::MAX_SIMULATED_QUBITS);
    }
}
