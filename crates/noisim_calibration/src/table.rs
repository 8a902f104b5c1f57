//! Normalized calibration table
//!
//! Gantree: L3_Calibration → CalibrationTable
//!
//! One row per qubit; the qubit index is the row position. Columns are
//! addressed by semantic key once the transform has renamed them.

use crate::config::{keys, CalibrationConfig};
use noisim_core::QubitId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Cell Values
// ============================================================================

/// Value of one table cell
/// Gantree: CellValue // 셀 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Empty or `nan`
    Missing,
    Number(f64),
    Text(String),
    /// `neighbor → value`, from a multi-valued column
    PairMap(BTreeMap<QubitId, f64>),
    /// Qubit list, used by `neighboring_qubits`
    Qubits(Vec<QubitId>),
}

impl CellValue {
    /// Interpret a raw scalar field
    /// Gantree: parse(raw) -> Self // 셀 해석
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            return CellValue::Missing;
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_nan() => CellValue::Missing,
            Ok(v) => CellValue::Number(v),
            Err(_) => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_pair_map(&self) -> Option<&BTreeMap<QubitId, f64>> {
        match self {
            CellValue::PairMap(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => write!(f, "nan"),
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::PairMap(m) => {
                let pairs: Vec<String> = m.iter().map(|(q, v)| format!("{}: {}", q, v)).collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            CellValue::Qubits(qs) => {
                let items: Vec<String> = qs.iter().map(|q| q.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

// ============================================================================
// Calibration Table
// ============================================================================

/// Row-per-qubit calibration table
/// Gantree: CalibrationTable // 보정 표
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTable {
    /// Gantree: columns: Vec<String> // 열 키
    columns: Vec<String>,

    /// Gantree: rows: Vec<Vec<CellValue>> // 큐비트별 행
    rows: Vec<Vec<CellValue>>,
}

impl CalibrationTable {
    /// Create a table of `num_qubits` rows without columns
    pub fn new(num_qubits: usize) -> Self {
        Self {
            columns: Vec::new(),
            rows: vec![Vec::new(); num_qubits],
        }
    }

    // ========================================================================
    // Column Editing (used by the transform)
    // ========================================================================

    /// Append a column filled with `fill`; an existing column is overwritten
    pub fn push_column(&mut self, key: &str, fill: CellValue) {
        match self.column_index(key) {
            Some(index) => {
                for row in &mut self.rows {
                    row[index] = fill.clone();
                }
            }
            None => {
                self.columns.push(key.to_string());
                for row in &mut self.rows {
                    row.push(fill.clone());
                }
            }
        }
    }

    /// Overwrite one cell; returns false if qubit or column is unknown
    pub fn set_cell(&mut self, qubit: QubitId, key: &str, value: CellValue) -> bool {
        let Some(index) = self.column_index(key) else {
            return false;
        };
        match self.rows.get_mut(qubit) {
            Some(row) => {
                row[index] = value;
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Gantree: num_qubits() -> usize // 큐비트 수
    pub fn num_qubits(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, key: &str) -> bool {
        self.column_index(key).is_some()
    }

    fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == key)
    }

    /// Gantree: cell(q, key) -> Option<&CellValue> // 셀 조회
    pub fn cell(&self, qubit: QubitId, key: &str) -> Option<&CellValue> {
        let index = self.column_index(key)?;
        self.rows.get(qubit).map(|row| &row[index])
    }

    /// Numeric value, `None` when absent, missing or non-numeric
    pub fn scalar(&self, qubit: QubitId, key: &str) -> Option<f64> {
        self.cell(qubit, key).and_then(CellValue::as_f64)
    }

    pub fn pair_map(&self, qubit: QubitId, key: &str) -> Option<&BTreeMap<QubitId, f64>> {
        self.cell(qubit, key).and_then(CellValue::as_pair_map)
    }

    /// Derived neighbours of a qubit, in order of appearance
    /// Gantree: neighboring_qubits(q) -> &[QubitId] // 인접 큐비트
    pub fn neighboring_qubits(&self, qubit: QubitId) -> &[QubitId] {
        match self.cell(qubit, keys::NEIGHBORING_QUBITS) {
            Some(CellValue::Qubits(qs)) => qs,
            _ => &[],
        }
    }

    /// Display name and value of every column for one row
    /// Gantree: qubit_data(q, config) -> Vec<(name, value)> // 큐비트 데이터
    ///
    /// Catalogue columns come first, in catalogue order, followed by any
    /// column the catalogue does not know.
    pub fn qubit_data(&self, qubit: QubitId, config: &CalibrationConfig) -> Vec<(String, CellValue)> {
        let Some(row) = self.rows.get(qubit) else {
            return Vec::new();
        };

        let known = config
            .columns
            .iter()
            .filter_map(|spec| self.column_index(&spec.key).map(|i| (spec.name.clone(), i)));
        let unknown = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, key)| config.column(key).is_none())
            .map(|(i, key)| (key.clone(), i));

        known
            .chain(unknown)
            .map(|(name, i)| (name, row[i].clone()))
            .collect()
    }
}
