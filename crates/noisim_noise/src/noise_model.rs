//! Error models built from noise parameters
//!
//! Gantree: L4_Noise → NoiseModel
//!
//! [`ErrorModel`] is what managers and backends see of a model;
//! [`ErrorModelBuilder`] turns [`NoiseParameters`] into one. The bundled
//! implementation is [`NoiseModel`] / [`NoiseModelBuilder`].

use crate::parameters::{NoiseParameters, ReadoutError};
use crate::quantum_error::QuantumError;
use noisim_core::{InsError, InsResult, QubitId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Error model as seen by managers and simulation backends
/// Gantree: ErrorModel // trait
pub trait ErrorModel: Send + Sync + fmt::Debug {
    fn num_qubits(&self) -> usize;

    /// Instructions a circuit may use on this model
    fn basis_gates(&self) -> Vec<String>;

    /// True when no instruction and no measurement carries an error
    fn is_ideal(&self) -> bool;

    /// Instructions that carry at least one error, sorted
    fn noise_instructions(&self) -> Vec<String>;

    /// Qubits that carry at least one error, ascending
    fn noise_qubits(&self) -> Vec<QubitId>;

    /// Combined probability of a Pauli error after `instruction` on `qubits`
    fn error_probability(&self, instruction: &str, qubits: &[QubitId]) -> f64;

    fn readout_error(&self, qubit: QubitId) -> Option<ReadoutError>;
}

/// Builds an error model from derived parameters
/// Gantree: ErrorModelBuilder // trait
pub trait ErrorModelBuilder: Send + Sync {
    fn build(&self, params: &NoiseParameters) -> InsResult<Arc<dyn ErrorModel>>;
}

// ============================================================================
// Noise Model
// ============================================================================

type ErrorKey = (String, Vec<QubitId>);

/// Bundled error model
/// Gantree: NoiseModel // 노이즈 모델
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoiseModel {
    num_qubits: usize,
    basis_gates: Vec<String>,
    /// Gantree: errors: BTreeMap<(instr, qubits), Vec<QuantumError>> // 에러 목록
    errors: BTreeMap<ErrorKey, Vec<QuantumError>>,
    /// Gantree: readout: BTreeMap<QubitId, ReadoutError> // 측정 에러
    readout: BTreeMap<QubitId, ReadoutError>,
}

impl NoiseModel {
    /// Model without any error
    /// Gantree: ideal(n, basis) -> Self // 이상적
    pub fn ideal(num_qubits: usize, basis_gates: Vec<String>) -> Self {
        Self {
            num_qubits,
            basis_gates,
            ..Self::default()
        }
    }

    /// Attach an error, composing with errors already on the same key
    /// Gantree: add_quantum_error(err, instr, qubits) -> Result // 에러 추가
    pub fn add_quantum_error(
        &mut self,
        error: QuantumError,
        instruction: &str,
        qubits: &[QubitId],
    ) -> InsResult<()> {
        error.validate()?;
        if error.num_qubits() != qubits.len() {
            return Err(InsError::InvalidErrorParameter(format!(
                "{}-qubit error cannot act on {} qubit(s) of '{}'",
                error.num_qubits(),
                qubits.len(),
                instruction
            )));
        }
        self.check_qubits(qubits)?;
        self.errors
            .entry((instruction.to_string(), qubits.to_vec()))
            .or_default()
            .push(error);
        Ok(())
    }

    /// Set the readout error of a qubit, replacing any earlier one
    pub fn add_readout_error(&mut self, readout: ReadoutError) -> InsResult<()> {
        readout.validate()?;
        self.check_qubits(&[readout.qubit])?;
        self.readout.insert(readout.qubit, readout);
        Ok(())
    }

    fn check_qubits(&self, qubits: &[QubitId]) -> InsResult<()> {
        match qubits.iter().find(|&&q| q >= self.num_qubits) {
            Some(q) => Err(InsError::InvalidErrorParameter(format!(
                "qubit {} outside a {}-qubit model",
                q, self.num_qubits
            ))),
            None => Ok(()),
        }
    }

    /// Errors attached to one instruction on one qubit tuple
    pub fn errors(&self, instruction: &str, qubits: &[QubitId]) -> &[QuantumError] {
        self.errors
            .get(&(instruction.to_string(), qubits.to_vec()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of (instruction, qubits) entries with errors
    pub fn num_entries(&self) -> usize {
        self.errors.len()
    }
}

impl ErrorModel for NoiseModel {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn basis_gates(&self) -> Vec<String> {
        self.basis_gates.clone()
    }

    fn is_ideal(&self) -> bool {
        self.errors.values().flatten().all(QuantumError::is_ideal)
            && self.readout.values().all(ReadoutError::is_ideal)
    }

    fn noise_instructions(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self
            .errors
            .iter()
            .filter(|(_, errs)| errs.iter().any(|e| !e.is_ideal()))
            .map(|((name, _), _)| name.clone())
            .collect();
        if self.readout.values().any(|r| !r.is_ideal()) {
            names.insert("measure".to_string());
        }
        names.into_iter().collect()
    }

    fn noise_qubits(&self) -> Vec<QubitId> {
        let mut qubits: BTreeSet<QubitId> = self
            .errors
            .iter()
            .filter(|(_, errs)| errs.iter().any(|e| !e.is_ideal()))
            .flat_map(|((_, qs), _)| qs.iter().copied())
            .collect();
        qubits.extend(self.readout.values().filter(|r| !r.is_ideal()).map(|r| r.qubit));
        qubits.into_iter().collect()
    }

    fn error_probability(&self, instruction: &str, qubits: &[QubitId]) -> f64 {
        1.0 - self
            .errors(instruction, qubits)
            .iter()
            .map(|e| 1.0 - e.error_probability())
            .product::<f64>()
    }

    fn readout_error(&self, qubit: QubitId) -> Option<ReadoutError> {
        self.readout.get(&qubit).copied()
    }
}

impl fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ideal() {
            return write!(f, "NoiseModel: Ideal");
        }
        writeln!(f, "NoiseModel:")?;
        writeln!(f, "  Basis gates: {:?}", self.basis_gates)?;
        writeln!(f, "  Instructions with noise: {:?}", self.noise_instructions())?;
        write!(f, "  Qubits with noise: {:?}", self.noise_qubits())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Validates every parameter and assembles a [`NoiseModel`]
/// Gantree: NoiseModelBuilder // 모델 빌더
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseModelBuilder;

impl NoiseModelBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Concrete variant of [`ErrorModelBuilder::build`]
    pub fn build_model(&self, params: &NoiseParameters) -> InsResult<NoiseModel> {
        let mut model = NoiseModel::ideal(params.num_qubits, params.basis_gates.clone());
        for spec in &params.gate_errors {
            model
                .add_quantum_error(spec.error.clone(), &spec.instruction, &spec.qubits)
                .map_err(|e| match e {
                    InsError::InvalidErrorParameter(msg) => InsError::InvalidErrorParameter(
                        format!("{} on {:?}: {}", spec.instruction, spec.qubits, msg),
                    ),
                    other => other,
                })?;
        }
        for readout in &params.readout_errors {
            model.add_readout_error(*readout)?;
        }
        log::debug!(
            "built noise model: {} qubits, {} error entries",
            model.num_qubits,
            model.num_entries()
        );
        Ok(model)
    }
}

impl ErrorModelBuilder for NoiseModelBuilder {
    fn build(&self, params: &NoiseParameters) -> InsResult<Arc<dyn ErrorModel>> {
        Ok(Arc::new(self.build_model(params)?))
    }
}
