//! Calibration import configuration
//!
//! Gantree: L3_Calibration → CalibrationConfig
//!
//! Maps the column headers of a provider's calibration export onto the
//! semantic keys used by the rest of the workspace. The default layout
//! is the IBM Quantum CSV export.

use noisim_core::calibration::DEFAULT_RESET_TIME_NS;
use noisim_core::{InsError, InsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Semantic column keys
pub mod keys {
    pub const T1_TIME: &str = "t1_time";
    pub const T2_TIME: &str = "t2_time";
    pub const READOUT_ASSIGNMENT_ERROR: &str = "readout_assignment_error";
    pub const M0P1: &str = "m0p1";
    pub const M1P0: &str = "m1p0";
    pub const READOUT_TIME: &str = "readout_time";
    pub const ID_GATE_ERROR: &str = "id_gate_error";
    pub const SX_GATE_ERROR: &str = "sx_gate_error";
    pub const X_GATE_ERROR: &str = "x_gate_error";
    pub const RZ_GATE_ERROR: &str = "rz_gate_error";
    pub const SINGLE_QUBIT_GATE_TIME: &str = "1q_gate_time";
    pub const ECR_GATE_ERROR: &str = "ecr_gate_error";
    pub const CZ_GATE_ERROR: &str = "cz_gate_error";
    pub const CX_GATE_ERROR: &str = "cx_gate_error";
    pub const TWO_QUBIT_GATE_TIME: &str = "2q_gate_time";
    pub const NEIGHBORING_QUBITS: &str = "neighboring_qubits";
    pub const RESET_TIME: &str = "reset_time";
}

// ============================================================================
// Column Specification
// ============================================================================

/// One known calibration column
/// Gantree: ColumnSpec // 열 정의
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Semantic key
    pub key: String,

    /// Header in the exported CSV
    pub csv_name: String,

    /// Display name
    pub name: String,

    pub description: String,

    /// Instruction name for gate columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,
}

impl ColumnSpec {
    /// Gantree: new(key, csv_name, name, description) -> Self // 생성자
    pub fn new(key: &str, csv_name: &str, name: &str, description: &str) -> Self {
        Self {
            key: key.to_string(),
            csv_name: csv_name.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            code_name: None,
        }
    }

    /// Mark the column as the error column of an instruction
    pub fn with_code_name(mut self, code_name: &str) -> Self {
        self.code_name = Some(code_name.to_string());
        self
    }
}

// ============================================================================
// Calibration Config
// ============================================================================

/// Import configuration
/// Gantree: CalibrationConfig // 가져오기 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Column catalogue, in display order
    /// Gantree: columns: Vec<ColumnSpec> // 열 목록
    pub columns: Vec<ColumnSpec>,

    /// CSV headers dropped before anything else
    pub not_required_columns: Vec<String>,

    /// Keys of columns holding `neighbor:value;...` cells
    pub multi_data_columns: Vec<String>,

    /// Keys of single-qubit gate error columns
    pub single_qubit_gates: Vec<String>,

    /// Keys of two-qubit gate error columns
    pub two_qubit_gates: Vec<String>,

    /// Instructions that are always in the basis
    pub non_gate_instructions: Vec<String>,

    /// Accepted file extensions, dot included
    pub expected_extensions: Vec<String>,

    /// Reset duration written into every row (ns)
    pub default_reset_time_ns: f64,
}

impl CalibrationConfig {
    // ========================================================================
    // Presets
    // ========================================================================

    /// IBM Quantum calibration CSV layout
    /// Gantree: ibm_quantum() -> Self // IBM 기본값
    pub fn ibm_quantum() -> Self {
        use keys::*;

        let columns = vec![
            ColumnSpec::new(T1_TIME, "T1 (us)", "T1 time (μs)", "Energy relaxation time"),
            ColumnSpec::new(T2_TIME, "T2 (us)", "T2 time (μs)", "Dephasing time"),
            ColumnSpec::new(
                READOUT_ASSIGNMENT_ERROR,
                "Readout assignment error",
                "Readout assignment error",
                "Average probability of reading the wrong state",
            ),
            ColumnSpec::new(
                M0P1,
                "Prob meas0 prep1",
                "P(0|1)",
                "Probability of measuring 0 after preparing 1",
            ),
            ColumnSpec::new(
                M1P0,
                "Prob meas1 prep0",
                "P(1|0)",
                "Probability of measuring 1 after preparing 0",
            ),
            ColumnSpec::new(
                READOUT_TIME,
                "Readout length (ns)",
                "Readout length (ns)",
                "Duration of a measurement",
            ),
            ColumnSpec::new(ID_GATE_ERROR, "ID error", "ID error", "Identity gate error rate")
                .with_code_name("id"),
            ColumnSpec::new(SX_GATE_ERROR, "√x (sx) error", "√X (sx) error", "√X gate error rate")
                .with_code_name("sx"),
            ColumnSpec::new(X_GATE_ERROR, "Pauli-X error", "Pauli-X error", "X gate error rate")
                .with_code_name("x"),
            ColumnSpec::new(
                RZ_GATE_ERROR,
                "Z-axis rotation (rz) error",
                "Z-axis rotation (rz) error",
                "Rz gate error rate",
            )
            .with_code_name("rz"),
            ColumnSpec::new(
                SINGLE_QUBIT_GATE_TIME,
                "Single-qubit gate length (ns)",
                "Single-qubit gate length (ns)",
                "Duration of a single-qubit gate",
            ),
            ColumnSpec::new(
                ECR_GATE_ERROR,
                "ECR error",
                "ECR error",
                "Echoed cross-resonance error rate per target qubit",
            )
            .with_code_name("ecr"),
            ColumnSpec::new(CZ_GATE_ERROR, "CZ error", "CZ error", "CZ error rate per target qubit")
                .with_code_name("cz"),
            ColumnSpec::new(
                CX_GATE_ERROR,
                "CNOT error",
                "CNOT error",
                "CNOT error rate per target qubit",
            )
            .with_code_name("cx"),
            ColumnSpec::new(
                TWO_QUBIT_GATE_TIME,
                "Gate time (ns)",
                "Two-qubit gate time (ns)",
                "Two-qubit gate duration per target qubit",
            ),
            ColumnSpec::new(
                NEIGHBORING_QUBITS,
                "Neighboring qubits",
                "Neighboring qubits",
                "Qubits coupled to this one (derived)",
            ),
            ColumnSpec::new(
                RESET_TIME,
                "Reset time (ns)",
                "Reset time (ns)",
                "Duration of a reset (default value)",
            ),
        ];

        let strings = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            columns,
            not_required_columns: strings(&[
                "Qubit",
                "Frequency (GHz)",
                "Anharmonicity (GHz)",
                "Operational",
            ]),
            multi_data_columns: strings(&[
                ECR_GATE_ERROR,
                CZ_GATE_ERROR,
                CX_GATE_ERROR,
                TWO_QUBIT_GATE_TIME,
            ]),
            single_qubit_gates: strings(&[ID_GATE_ERROR, SX_GATE_ERROR, X_GATE_ERROR, RZ_GATE_ERROR]),
            two_qubit_gates: strings(&[ECR_GATE_ERROR, CZ_GATE_ERROR, CX_GATE_ERROR]),
            non_gate_instructions: strings(&["delay", "measure", "reset"]),
            expected_extensions: noisim_core::calibration::CSV_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_reset_time_ns: DEFAULT_RESET_TIME_NS,
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    pub fn with_default_reset_time(mut self, ns: f64) -> Self {
        self.default_reset_time_ns = ns;
        self
    }

    pub fn with_expected_extensions(mut self, extensions: &[&str]) -> Self {
        self.expected_extensions = extensions.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add a column, replacing any column with the same key
    pub fn with_column(mut self, spec: ColumnSpec) -> Self {
        self.columns.retain(|c| c.key != spec.key);
        self.columns.push(spec);
        self
    }

    pub fn with_not_required_column(mut self, csv_name: &str) -> Self {
        self.not_required_columns.push(csv_name.to_string());
        self
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Gantree: column(key) -> Option<&ColumnSpec> // 열 조회
    pub fn column(&self, key: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn column_by_csv_name(&self, csv_name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.csv_name == csv_name)
    }

    /// Instruction name of a gate column
    pub fn code_name(&self, key: &str) -> Option<&str> {
        self.column(key).and_then(|c| c.code_name.as_deref())
    }

    /// Display name of a column, falling back to the key itself
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.column(key).map(|c| c.name.as_str()).unwrap_or(key)
    }

    pub fn is_multi_data(&self, key: &str) -> bool {
        self.multi_data_columns.iter().any(|k| k == key)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check internal consistency
    /// Gantree: validate() -> Result // 설정 검증
    pub fn validate(&self) -> InsResult<()> {
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.key == column.key) {
                return Err(InsError::InvalidParameter(format!(
                    "column key '{}' is defined twice",
                    column.key
                )));
            }
        }

        let referenced = self
            .multi_data_columns
            .iter()
            .chain(&self.single_qubit_gates)
            .chain(&self.two_qubit_gates);
        for key in referenced {
            if self.column(key).is_none() {
                return Err(InsError::InvalidParameter(format!(
                    "column key '{}' is referenced but not defined",
                    key
                )));
            }
        }

        for key in self.single_qubit_gates.iter().chain(&self.two_qubit_gates) {
            if self.code_name(key).is_none() {
                return Err(InsError::InvalidParameter(format!(
                    "gate column '{}' has no code_name",
                    key
                )));
            }
        }

        for required in [keys::NEIGHBORING_QUBITS, keys::RESET_TIME] {
            if self.column(required).is_none() {
                return Err(InsError::InvalidParameter(format!(
                    "derived column '{}' must be defined",
                    required
                )));
            }
        }

        if self.expected_extensions.is_empty() {
            return Err(InsError::InvalidParameter(
                "at least one file extension must be accepted".into(),
            ));
        }

        if !(self.default_reset_time_ns.is_finite() && self.default_reset_time_ns >= 0.0) {
            return Err(InsError::InvalidParameter(format!(
                "default reset time {} ns is invalid",
                self.default_reset_time_ns
            )));
        }

        Ok(())
    }

    // ========================================================================
    // JSON I/O
    // ========================================================================

    /// Gantree: from_json(s) -> Result<Self> // JSON 파싱
    pub fn from_json(json: &str) -> InsResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> InsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> InsResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            InsError::FileError(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json(&text)
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::ibm_quantum()
    }
}

impl fmt::Display for CalibrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CalibrationConfig")?;
        writeln!(f, "  Columns: {}", self.columns.len())?;
        writeln!(f, "  1Q gates: {}", self.single_qubit_gates.join(", "))?;
        writeln!(f, "  2Q gates: {}", self.two_qubit_gates.join(", "))?;
        writeln!(f, "  Extensions: {}", self.expected_extensions.join(", "))?;
        write!(f, "  Reset time: {} ns", self.default_reset_time_ns)
    }
}
