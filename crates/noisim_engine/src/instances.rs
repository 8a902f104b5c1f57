//! Instance records and listings
//!
//! Gantree: L6_Engine → Instances
//!
//! One record per instance category. Records are immutable once
//! registered; managers hand out clones.

use chrono::{DateTime, Utc};
use noisim_backend::SimulationBackend;
use noisim_calibration::{CalibrationTable, TransformSummary};
use noisim_core::{CouplingMap, InsError, InsResult, QubitId};
use noisim_noise::ErrorModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Noise Data
// ============================================================================

/// Imported calibration data
/// Gantree: NoiseDataInstance // 보정 데이터 인스턴스
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseDataInstance {
    /// Gantree: file_name: String // 파일 이름
    pub file_name: String,

    /// Gantree: full_path: String // 전체 경로
    pub full_path: String,

    /// Gantree: table: CalibrationTable // 변환된 표
    pub table: CalibrationTable,

    pub summary: TransformSummary,

    pub created_at: DateTime<Utc>,
}

impl NoiseDataInstance {
    pub fn qubit_count(&self) -> usize {
        self.table.num_qubits()
    }

    /// Check a user-supplied qubit index against `[0, count - 1]`
    /// Gantree: validate_qubit(i64) -> Result<QubitId> // 큐비트 검사
    pub fn validate_qubit(&self, qubit: i64) -> InsResult<QubitId> {
        if qubit < 0 {
            return Err(InsError::NegativeQubit { qubit });
        }
        let count = self.qubit_count();
        match usize::try_from(qubit) {
            Ok(q) if q < count => Ok(q),
            _ => Err(InsError::QubitOutOfRange {
                qubit,
                qubit_count: count,
            }),
        }
    }
}

// ============================================================================
// Noise Model
// ============================================================================

/// Error model built from one noise data instance
/// Gantree: NoiseModelInstance // 노이즈 모델 인스턴스
#[derive(Debug, Clone)]
pub struct NoiseModelInstance {
    /// Key of the noise data instance the model was built from
    pub data_source: String,

    /// Gantree: noise_model: Arc<dyn ErrorModel> // 에러 모델
    pub noise_model: Arc<dyn ErrorModel>,

    /// Gantree: coupling_map: CouplingMap // 연결 구조
    pub coupling_map: CouplingMap,

    pub created_at: DateTime<Utc>,
}

impl NoiseModelInstance {
    /// Basis gates joined for display
    pub fn basis_gates_str(&self) -> String {
        self.noise_model.basis_gates().join("; ")
    }

    pub fn qubit_count(&self) -> usize {
        self.noise_model.num_qubits()
    }

    pub fn has_noise(&self) -> bool {
        !self.noise_model.is_ideal()
    }
}

// ============================================================================
// Simulator
// ============================================================================

/// Backend built from one noise model instance
/// Gantree: SimulatorInstance // 시뮬레이터 인스턴스
#[derive(Debug, Clone)]
pub struct SimulatorInstance {
    /// Key of the noise model instance the backend was built from
    pub noise_model_source: String,

    /// Gantree: backend: Arc<dyn SimulationBackend> // 백엔드
    pub backend: Arc<dyn SimulationBackend>,

    pub created_at: DateTime<Utc>,
}

impl SimulatorInstance {
    pub fn qubit_count(&self) -> usize {
        self.backend.num_qubits()
    }

    pub fn has_noise(&self) -> bool {
        !self.backend.noise_model().is_ideal()
    }
}

// ============================================================================
// Listings
// ============================================================================

/// Table of instances for presentation layers
/// Gantree: InstanceListing // 인스턴스 목록
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstanceListing {
    pub has_data: bool,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl InstanceListing {
    /// Gantree: new(columns) -> Self // 생성자
    pub fn new(columns: &[&str]) -> Self {
        Self {
            has_data: false,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
        self.has_data = true;
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Vec<&str> {
        match self.columns.iter().position(|c| c == name) {
            Some(i) => self
                .rows
                .iter()
                .filter_map(|row| row.get(i).map(String::as_str))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn to_json(&self) -> InsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for InstanceListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_data {
            return write!(f, "(no instances)");
        }
        writeln!(f, "{}", self.columns.join(" | "))?;
        for row in &self.rows {
            writeln!(f, "{}", row.join(" | "))?;
        }
        Ok(())
    }
}

/// "Available" while the source key is still registered
pub(crate) fn source_availability(available: bool) -> String {
    let label = if available { "Available" } else { "Removed" };
    label.to_string()
}

pub(crate) fn yes_no(flag: bool) -> String {
    let label = if flag { "Yes" } else { "No" };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use noisim_noise::NoiseModel;

    fn data_instance(num_qubits: usize) -> NoiseDataInstance {
        NoiseDataInstance {
            file_name: "device.csv".into(),
            full_path: "/tmp/device.csv".into(),
            table: CalibrationTable::new(num_qubits),
            summary: TransformSummary::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_qubit_bounds() {
        let data = data_instance(5);
        assert_eq!(data.validate_qubit(0).unwrap(), 0);
        assert_eq!(data.validate_qubit(4).unwrap(), 4);
        assert_eq!(
            data.validate_qubit(5).unwrap_err(),
            InsError::QubitOutOfRange {
                qubit: 5,
                qubit_count: 5
            }
        );
        assert_eq!(
            data.validate_qubit(-1).unwrap_err(),
            InsError::NegativeQubit { qubit: -1 }
        );
    }

    #[test]
    fn test_model_instance_display_fields() {
        let basis = vec!["measure".to_string(), "x".to_string()];
        let model = NoiseModelInstance {
            data_source: "d1".into(),
            noise_model: Arc::new(NoiseModel::ideal(2, basis)),
            coupling_map: CouplingMap::linear(2),
            created_at: Utc::now(),
        };
        assert_eq!(model.basis_gates_str(), "measure; x");
        assert_eq!(model.qubit_count(), 2);
        assert!(!model.has_noise());
    }

    #[test]
    fn test_listing() {
        let mut listing = InstanceListing::new(&["Reference key", "Source file"]);
        assert!(!listing.has_data);
        assert_eq!(listing.to_string(), "(no instances)");

        listing.push_row(vec!["d1".into(), "a.csv".into()]);
        listing.push_row(vec!["d2".into(), "b.csv".into()]);
        assert!(listing.has_data);
        assert_eq!(listing.column("Reference key"), vec!["d1", "d2"]);
        assert!(listing.column("nope").is_empty());

        let json = listing.to_json().unwrap();
        let back: InstanceListing = serde_json::from_str(&json).unwrap();
        assert_eq!(back, listing);
    }

    #[test]
    fn test_availability_labels() {
        assert_eq!(source_availability(true), "Available");
        assert_eq!(source_availability(false), "Removed");
        assert_eq!(yes_no(true), "Yes");
    }
}
