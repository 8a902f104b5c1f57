//! Noise parameter derivation
//!
//! Gantree: L4_Noise → NoiseParameters
//!
//! Reads a [`CalibrationTable`] and lists every error an error model
//! should carry. Derivation is pure; validation of the values happens
//! when a model is built from them.

use crate::quantum_error::{QuantumError, ThermalRelaxation};
use noisim_calibration::{keys, CalibrationConfig, CalibrationTable};
use noisim_core::physics::{ns_to_s, us_to_s, T2_T1_RATIO_MAX};
use noisim_core::{InsError, InsResult, QubitId};
use serde::{Deserialize, Serialize};

// ============================================================================
// Records
// ============================================================================

/// Error attached to one instruction on specific qubits
/// Gantree: GateErrorSpec // 게이트 에러
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateErrorSpec {
    pub instruction: String,
    pub qubits: Vec<QubitId>,
    pub error: QuantumError,
}

/// Assignment probabilities of one qubit
/// Gantree: ReadoutError // 측정 에러
///
/// Row `i` of [`matrix`](Self::matrix) is the outcome distribution when
/// the qubit was prepared in `|i⟩`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadoutError {
    pub qubit: QubitId,
    /// P(measure 1 | prepared 0)
    pub prob_meas1_prep0: f64,
    /// P(measure 0 | prepared 1)
    pub prob_meas0_prep1: f64,
}

impl ReadoutError {
    pub fn matrix(&self) -> [[f64; 2]; 2] {
        [
            [1.0 - self.prob_meas1_prep0, self.prob_meas1_prep0],
            [self.prob_meas0_prep1, 1.0 - self.prob_meas0_prep1],
        ]
    }

    /// Probability that a prepared bit is read flipped
    pub fn flip_probability(&self, prepared: bool) -> f64 {
        if prepared {
            self.prob_meas0_prep1
        } else {
            self.prob_meas1_prep0
        }
    }

    pub fn validate(&self) -> InsResult<()> {
        for p in [self.prob_meas1_prep0, self.prob_meas0_prep1] {
            if !(0.0..=1.0).contains(&p) {
                return Err(InsError::InvalidErrorParameter(format!(
                    "readout probability {} of qubit {} outside [0, 1]",
                    p, self.qubit
                )));
            }
        }
        Ok(())
    }

    pub fn is_ideal(&self) -> bool {
        self.prob_meas1_prep0 == 0.0 && self.prob_meas0_prep1 == 0.0
    }
}

/// Error left out because a calibration value was missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedError {
    pub instruction: String,
    pub qubits: Vec<QubitId>,
    /// Column that had no value
    pub column: String,
}

/// Everything an error-model builder needs
/// Gantree: NoiseParameters // 노이즈 파라미터
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NoiseParameters {
    pub num_qubits: usize,
    pub basis_gates: Vec<String>,
    pub gate_errors: Vec<GateErrorSpec>,
    pub readout_errors: Vec<ReadoutError>,
    pub coupling_edges: Vec<(QubitId, QubitId)>,
    pub skipped: Vec<SkippedError>,
}

impl NoiseParameters {
    /// Errors registered for one instruction on one qubit tuple
    pub fn errors_for(&self, instruction: &str, qubits: &[QubitId]) -> Vec<&QuantumError> {
        self.gate_errors
            .iter()
            .filter(|g| g.instruction == instruction && g.qubits == qubits)
            .map(|g| &g.error)
            .collect()
    }

    /// Export for inspection or for an external model builder
    pub fn to_json(&self) -> InsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> InsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn push(&mut self, instruction: &str, qubits: Vec<QubitId>, error: QuantumError) {
        self.gate_errors.push(GateErrorSpec {
            instruction: instruction.to_string(),
            qubits,
            error,
        });
    }

    fn skip(&mut self, instruction: &str, qubits: Vec<QubitId>, column: &str) {
        self.skipped.push(SkippedError {
            instruction: instruction.to_string(),
            qubits,
            column: column.to_string(),
        });
    }
}

// ============================================================================
// Derivation
// ============================================================================

/// Derive every error from a calibration table
/// Gantree: derive_noise_parameters(table, config) -> Result // 파라미터 도출
pub fn derive_noise_parameters(
    table: &CalibrationTable,
    config: &CalibrationConfig,
) -> InsResult<NoiseParameters> {
    let num_qubits = table.num_qubits();
    let mut params = NoiseParameters {
        num_qubits,
        basis_gates: basis_gates(table, config),
        ..NoiseParameters::default()
    };

    for qubit in 0..num_qubits {
        check_neighbors(table, qubit)?;
        add_depolarizing_errors(&mut params, table, config, qubit)?;
        add_thermal_errors(&mut params, table, config, qubit)?;
        add_readout_error(&mut params, table, qubit);
        params
            .coupling_edges
            .extend(table.neighboring_qubits(qubit).iter().map(|&n| (qubit, n)));
    }

    if !params.skipped.is_empty() {
        log::warn!(
            "{} error(s) skipped because of missing calibration values",
            params.skipped.len()
        );
    }
    Ok(params)
}

/// Non-gate instructions, then the instruction of every gate column present
fn basis_gates(table: &CalibrationTable, config: &CalibrationConfig) -> Vec<String> {
    let mut gates = config.non_gate_instructions.clone();
    for key in config.single_qubit_gates.iter().chain(&config.two_qubit_gates) {
        if let (true, Some(code)) = (table.has_column(key), config.code_name(key)) {
            if !gates.iter().any(|g| g == code) {
                gates.push(code.to_string());
            }
        }
    }
    gates
}

fn check_neighbors(table: &CalibrationTable, qubit: QubitId) -> InsResult<()> {
    for &n in table.neighboring_qubits(qubit) {
        check_target(table, qubit, n)?;
    }
    Ok(())
}

fn check_target(table: &CalibrationTable, qubit: QubitId, target: QubitId) -> InsResult<()> {
    if target >= table.num_qubits() || target == qubit {
        return Err(InsError::InvalidCalibration(format!(
            "qubit {} lists neighbour {} but the table has qubits 0..{}",
            qubit,
            target,
            table.num_qubits()
        )));
    }
    Ok(())
}

fn code_name<'a>(config: &'a CalibrationConfig, key: &str) -> InsResult<&'a str> {
    config.code_name(key).ok_or_else(|| {
        InsError::InvalidParameter(format!("gate column '{}' has no code_name", key))
    })
}

fn add_depolarizing_errors(
    params: &mut NoiseParameters,
    table: &CalibrationTable,
    config: &CalibrationConfig,
    qubit: QubitId,
) -> InsResult<()> {
    for key in config.single_qubit_gates.iter().filter(|k| table.has_column(k)) {
        let code = code_name(config, key)?;
        match table.scalar(qubit, key) {
            Some(rate) => params.push(code, vec![qubit], QuantumError::depolarizing(rate, 1)),
            None => params.skip(code, vec![qubit], key),
        }
    }

    for key in config.two_qubit_gates.iter().filter(|k| table.has_column(k)) {
        let code = code_name(config, key)?;
        match table.pair_map(qubit, key) {
            Some(rates) => {
                for (&target, &rate) in rates {
                    check_target(table, qubit, target)?;
                    params.push(code, vec![qubit, target], QuantumError::depolarizing(rate, 2));
                }
            }
            None => params.skip(code, vec![qubit], key),
        }
    }
    Ok(())
}

/// Relaxation of one qubit over `time_s`, with T2 clamped to 2·T1
fn relaxation(table: &CalibrationTable, qubit: QubitId, time_s: f64) -> Option<ThermalRelaxation> {
    let t1 = us_to_s(table.scalar(qubit, keys::T1_TIME)?);
    let t2 = us_to_s(table.scalar(qubit, keys::T2_TIME)?).min(T2_T1_RATIO_MAX * t1);
    Some(ThermalRelaxation::new(t1, t2, time_s))
}

/// Column holding the value a thermal error of `qubit` lacks
fn missing_column(table: &CalibrationTable, qubit: QubitId, time_key: &str) -> String {
    [keys::T1_TIME, keys::T2_TIME]
        .into_iter()
        .find(|k| table.scalar(qubit, k).is_none())
        .unwrap_or(time_key)
        .to_string()
}

fn add_thermal_errors(
    params: &mut NoiseParameters,
    table: &CalibrationTable,
    config: &CalibrationConfig,
    qubit: QubitId,
) -> InsResult<()> {
    // Single-qubit gates share one gate length
    let gate_time = table.scalar(qubit, keys::SINGLE_QUBIT_GATE_TIME).map(ns_to_s);
    for key in config.single_qubit_gates.iter().filter(|k| table.has_column(k)) {
        let code = code_name(config, key)?;
        match gate_time.and_then(|t| relaxation(table, qubit, t)) {
            Some(t) => params.push(code, vec![qubit], QuantumError::ThermalRelaxation(t)),
            None => {
                let column = missing_column(table, qubit, keys::SINGLE_QUBIT_GATE_TIME);
                params.skip(code, vec![qubit], &column);
            }
        }
    }

    // Two-qubit gates, one tensor error per listed target
    let present_2q: Vec<&str> = config
        .two_qubit_gates
        .iter()
        .filter(|k| table.has_column(k))
        .map(|k| code_name(config, k))
        .collect::<InsResult<_>>()?;
    if let Some(times) = table.pair_map(qubit, keys::TWO_QUBIT_GATE_TIME) {
        for (&target, &time_ns) in times {
            check_target(table, qubit, target)?;
            let time_s = ns_to_s(time_ns);
            let pair = relaxation(table, qubit, time_s).zip(relaxation(table, target, time_s));
            for code in &present_2q {
                match pair {
                    Some((a, b)) => params.push(code, vec![qubit, target], QuantumError::Tensor(vec![a, b])),
                    None => {
                        let column = if relaxation(table, qubit, time_s).is_none() {
                            missing_column(table, qubit, keys::TWO_QUBIT_GATE_TIME)
                        } else {
                            missing_column(table, target, keys::TWO_QUBIT_GATE_TIME)
                        };
                        params.skip(code, vec![qubit, target], &column);
                    }
                }
            }
        }
    }

    // Measure and reset
    for (instruction, time_key) in [("measure", keys::READOUT_TIME), ("reset", keys::RESET_TIME)] {
        let thermal = table
            .scalar(qubit, time_key)
            .and_then(|ns| relaxation(table, qubit, ns_to_s(ns)));
        match thermal {
            Some(t) => params.push(instruction, vec![qubit], QuantumError::ThermalRelaxation(t)),
            None => {
                let column = missing_column(table, qubit, time_key);
                params.skip(instruction, vec![qubit], &column);
            }
        }
    }
    Ok(())
}

fn add_readout_error(params: &mut NoiseParameters, table: &CalibrationTable, qubit: QubitId) {
    let m1p0 = table.scalar(qubit, keys::M1P0);
    let m0p1 = table.scalar(qubit, keys::M0P1);
    match (m1p0, m0p1) {
        (Some(prob_meas1_prep0), Some(prob_meas0_prep1)) => params.readout_errors.push(ReadoutError {
            qubit,
            prob_meas1_prep0,
            prob_meas0_prep1,
        }),
        (None, _) if table.has_column(keys::M1P0) => params.skip("measure", vec![qubit], keys::M1P0),
        (_, None) if table.has_column(keys::M0P1) => params.skip("measure", vec![qubit], keys::M0P1),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use noisim_calibration::{parse_csv, transform};

    const CSV: &str = "\
T1 (us),T2 (us),Prob meas0 prep1,Prob meas1 prep0,Readout length (ns),ID error,Z-axis rotation (rz) error,√x (sx) error,Single-qubit gate length (ns),ECR error,Gate time (ns)
100,250,0.02,0.01,1000,0.001,0,0.001,50,1:0.008,1:600
120,80,0.03,0.015,1000,,0,0.002,50,0:0.009;2:0.01,0:600;2:640
90,70,0.01,0.01,1000,0.002,0,0.002,50,1:0.01,1:640
";

    fn table(csv: &str) -> (CalibrationTable, CalibrationConfig) {
        let config = CalibrationConfig::default();
        let (table, _) = transform(parse_csv(csv).unwrap(), &config).unwrap();
        (table, config)
    }

    fn thermal_of(params: &NoiseParameters, instruction: &str, qubits: &[QubitId]) -> ThermalRelaxation {
        params
            .errors_for(instruction, qubits)
            .into_iter()
            .find_map(|e| match e {
                QuantumError::ThermalRelaxation(t) => Some(*t),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_t2_is_clamped_to_twice_t1() {
        let (table, config) = table(CSV);
        let params = derive_noise_parameters(&table, &config).unwrap();
        let t = thermal_of(&params, "sx", &[0]);
        assert_relative_eq!(t.t1_s, 100e-6, epsilon = 1e-15);
        assert_relative_eq!(t.t2_s, 200e-6, epsilon = 1e-15);
        assert_relative_eq!(t.time_s, 50e-9, epsilon = 1e-18);

        // T2 below the bound is kept
        let t = thermal_of(&params, "sx", &[1]);
        assert_relative_eq!(t.t2_s, 80e-6, epsilon = 1e-15);
    }

    #[test]
    fn test_basis_gates() {
        let (table, config) = table(CSV);
        let params = derive_noise_parameters(&table, &config).unwrap();
        assert_eq!(
            params.basis_gates,
            vec!["delay", "measure", "reset", "id", "sx", "rz", "ecr"]
        );
    }

    #[test]
    fn test_missing_gate_error_is_skipped() {
        let (table, config) = table(CSV);
        let params = derive_noise_parameters(&table, &config).unwrap();

        // Qubit 1 has no ID error: no depolarizing, thermal still attached
        let id_errors = params.errors_for("id", &[1]);
        assert_eq!(id_errors.len(), 1);
        assert!(matches!(id_errors[0], QuantumError::ThermalRelaxation(_)));
        assert!(params
            .skipped
            .iter()
            .any(|s| s.instruction == "id" && s.qubits == vec![1] && s.column == keys::ID_GATE_ERROR));
    }

    #[test]
    fn test_rz_gets_thermal_error() {
        let (table, config) = table(CSV);
        let params = derive_noise_parameters(&table, &config).unwrap();
        let rz = params.errors_for("rz", &[0]);
        assert_eq!(rz.len(), 2);
        assert!(matches!(rz[0], QuantumError::Depolarizing(_)));

        let t = thermal_of(&params, "rz", &[0]);
        assert_relative_eq!(t.time_s, 50e-9, epsilon = 1e-18);
        assert_relative_eq!(t.t2_s, 200e-6, epsilon = 1e-15);
    }

    #[test]
    fn test_two_qubit_errors() {
        let (table, config) = table(CSV);
        let params = derive_noise_parameters(&table, &config).unwrap();

        let errors = params.errors_for("ecr", &[1, 2]);
        assert_eq!(errors.len(), 2);
        match errors[1] {
            QuantumError::Tensor(parts) => {
                assert_eq!(parts.len(), 2);
                assert_relative_eq!(parts[0].time_s, 640e-9, epsilon = 1e-18);
                assert_relative_eq!(parts[1].t1_s, 90e-6, epsilon = 1e-15);
            }
            other => panic!("expected tensor, got {:?}", other),
        }
        assert_eq!(params.coupling_edges, vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_measure_reset_and_readout() {
        let (table, config) = table(CSV);
        let params = derive_noise_parameters(&table, &config).unwrap();

        assert_relative_eq!(thermal_of(&params, "measure", &[2]).time_s, 1e-6, epsilon = 1e-18);
        assert_relative_eq!(thermal_of(&params, "reset", &[2]).time_s, 1300e-9, epsilon = 1e-18);

        let readout = params.readout_errors[0];
        assert_eq!(readout.qubit, 0);
        let m = readout.matrix();
        assert_relative_eq!(m[0][0], 0.99, epsilon = 1e-12);
        assert_relative_eq!(m[0][1], 0.01);
        assert_relative_eq!(m[1][0], 0.02);
        assert_relative_eq!(m[1][1], 0.98, epsilon = 1e-12);
        assert_relative_eq!(readout.flip_probability(true), 0.02);
    }

    #[test]
    fn test_neighbor_outside_table() {
        let (table, config) = table("T1 (us),ECR error\n100,4:0.01\n");
        assert!(matches!(
            derive_noise_parameters(&table, &config),
            Err(InsError::InvalidCalibration(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let (table, config) = table(CSV);
        assert_eq!(
            derive_noise_parameters(&table, &config).unwrap(),
            derive_noise_parameters(&table, &config).unwrap()
        );
    }

    #[test]
    fn test_json_export() {
        let (table, config) = table(CSV);
        let params = derive_noise_parameters(&table, &config).unwrap();
        let json = params.to_json().unwrap();
        assert!(json.contains("\"coupling_edges\""));
        let back = NoiseParameters::from_json(&json).unwrap();
        assert_eq!(back.basis_gates, params.basis_gates);
        assert_eq!(back.coupling_edges, params.coupling_edges);
        assert_eq!(back.gate_errors.len(), params.gate_errors.len());
    }
}
