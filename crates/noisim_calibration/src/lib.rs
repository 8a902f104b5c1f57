//! # NoiSim Calibration
//!
//! Import of provider calibration exports into a normalized
//! row-per-qubit table.
//!
//! ## Gantree Architecture
//!
//! ```text
//! noisim_calibration // L3: Calibration
//!     L3_Calibration // 보정 데이터
//!         CalibrationConfig // 열 카탈로그, 가져오기 설정
//!         CsvReader // CSV 파싱, 확장자 검사
//!         CalibrationTable // 큐비트별 표
//!         Transform // 열 정리, 다중값 변환, 파생 열
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use noisim_calibration::prelude::*;
//!
//! let csv = "Qubit,T1 (us),CNOT error\n0,100,1:0.01\n1,90,0:0.01\n";
//! let raw = parse_csv(csv).unwrap();
//! let (table, _) = transform(raw, &CalibrationConfig::default()).unwrap();
//!
//! assert_eq!(table.num_qubits(), 2);
//! assert_eq!(table.neighboring_qubits(0), &[1]);
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod csv_reader;
pub mod table;
pub mod transform;

pub use config::{keys, CalibrationConfig, ColumnSpec};
pub use csv_reader::{check_file_type, parse_csv, read_csv_file, RawTable};
pub use table::{CalibrationTable, CellValue};
pub use transform::{transform, TransformSummary};

use noisim_core::InsResult;
use std::path::Path;

/// Check the extension, read the file and transform it
/// Gantree: load_calibration_csv(path, config) -> Result // 가져오기
pub fn load_calibration_csv(
    path: impl AsRef<Path>,
    config: &CalibrationConfig,
) -> InsResult<(CalibrationTable, TransformSummary)> {
    let path = path.as_ref();
    check_file_type(path, &config.expected_extensions)?;
    let raw = read_csv_file(path)?;
    transform(raw, config)
}

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::config::{keys, CalibrationConfig, ColumnSpec};
    pub use crate::csv_reader::{check_file_type, parse_csv, read_csv_file, RawTable};
    pub use crate::load_calibration_csv;
    pub use crate::table::{CalibrationTable, CellValue};
    pub use crate::transform::{transform, TransformSummary};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================
