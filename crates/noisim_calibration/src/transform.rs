//! Calibration table transform
//!
//! Gantree: L3_Calibration → Transform
//!
//! Turns a [`RawTable`] into a [`CalibrationTable`]. Steps run in order:
//! drop unused columns, rename headers to semantic keys and append the
//! derived columns, then expand multi-valued cells into maps.

use crate::config::{keys, CalibrationConfig};
use crate::csv_reader::RawTable;
use crate::table::{CellValue, CalibrationTable};
use noisim_core::calibration::{PAIR_SEPARATOR, VALUE_SEPARATOR};
use noisim_core::{InsError, InsResult, QubitId};
use std::collections::BTreeMap;

/// What the transform did besides producing the table
/// Gantree: TransformSummary // 변환 요약
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformSummary {
    /// CSV headers that were dropped
    pub dropped_columns: Vec<String>,
    /// Headers with no catalogue entry, kept under their own name
    pub unknown_columns: Vec<String>,
    /// Reset time filled in because the export had none (ns)
    pub default_reset_time: Option<f64>,
    /// Missing scalar cells
    pub missing_cells: usize,
}

/// Run every step
/// Gantree: transform(raw, config) -> Result<(Table, Summary)> // 전체 변환
pub fn transform(
    mut raw: RawTable,
    config: &CalibrationConfig,
) -> InsResult<(CalibrationTable, TransformSummary)> {
    let mut summary = TransformSummary {
        dropped_columns: remove_unnecessary_columns(&mut raw, config),
        ..TransformSummary::default()
    };

    let mut table = rename_columns(&raw, config, &mut summary)?;
    summary.default_reset_time = add_derived_columns(&mut table, config);
    expand_multi_data_columns(&mut table, config)?;

    summary.missing_cells = table
        .columns()
        .iter()
        .filter(|key| key.as_str() != keys::NEIGHBORING_QUBITS)
        .map(|key| {
            (0..table.num_qubits())
                .filter(|&q| table.cell(q, key).map_or(false, CellValue::is_missing))
                .count()
        })
        .sum();

    log::debug!(
        "calibration transform: {} qubits, {} columns, {} missing cells",
        table.num_qubits(),
        table.columns().len(),
        summary.missing_cells
    );
    Ok((table, summary))
}

// ============================================================================
// Step 1: Drop Columns
// ============================================================================

/// Drop every configured column that is present; returns the dropped headers
pub fn remove_unnecessary_columns(raw: &mut RawTable, config: &CalibrationConfig) -> Vec<String> {
    config
        .not_required_columns
        .iter()
        .filter(|header| raw.remove_column(header))
        .cloned()
        .collect()
}

// ============================================================================
// Step 2: Rename and Derive
// ============================================================================

fn rename_columns(
    raw: &RawTable,
    config: &CalibrationConfig,
    summary: &mut TransformSummary,
) -> InsResult<CalibrationTable> {
    let mut table = CalibrationTable::new(raw.rows.len());

    for (index, header) in raw.headers.iter().enumerate() {
        let key = match config.column_by_csv_name(header) {
            Some(spec) => spec.key.clone(),
            None => {
                summary.unknown_columns.push(header.clone());
                header.clone()
            }
        };
        if table.has_column(&key) {
            return Err(InsError::InvalidCalibration(format!(
                "column '{}' appears more than once",
                header
            )));
        }

        let multi = config.is_multi_data(&key);
        table.push_column(&key, CellValue::Missing);
        for (qubit, row) in raw.rows.iter().enumerate() {
            let value = if multi {
                raw_text(&row[index])
            } else {
                CellValue::parse(&row[index])
            };
            table.set_cell(qubit, &key, value);
        }
    }

    Ok(table)
}

/// Multi-valued cells stay text until step 3
fn raw_text(field: &str) -> CellValue {
    let field = field.trim();
    if field.is_empty() || field.eq_ignore_ascii_case("nan") {
        CellValue::Missing
    } else {
        CellValue::Text(field.to_string())
    }
}

/// Append `neighboring_qubits` and, unless exported, `reset_time`
fn add_derived_columns(table: &mut CalibrationTable, config: &CalibrationConfig) -> Option<f64> {
    table.push_column(keys::NEIGHBORING_QUBITS, CellValue::Missing);

    if table.has_column(keys::RESET_TIME) {
        return None;
    }
    table.push_column(
        keys::RESET_TIME,
        CellValue::Number(config.default_reset_time_ns),
    );
    Some(config.default_reset_time_ns)
}

// ============================================================================
// Step 3: Multi-Valued Columns
// ============================================================================

/// Expand `neighbor:value;...` cells; the first expanded column of a row
/// also fills that row's neighbours
/// Gantree: expand_multi_data_columns(table, config) -> Result // 다중값 열 변환
pub fn expand_multi_data_columns(
    table: &mut CalibrationTable,
    config: &CalibrationConfig,
) -> InsResult<()> {
    for qubit in 0..table.num_qubits() {
        let mut neighbors_found = false;

        for key in &config.multi_data_columns {
            let raw = match table.cell(qubit, key) {
                Some(CellValue::Text(raw)) => raw.clone(),
                _ => continue,
            };

            let (map, order) = parse_pairs(&raw, qubit, key)?;
            if map.is_empty() {
                table.set_cell(qubit, key, CellValue::Missing);
                continue;
            }
            table.set_cell(qubit, key, CellValue::PairMap(map));

            if !neighbors_found {
                table.set_cell(qubit, keys::NEIGHBORING_QUBITS, CellValue::Qubits(order));
                neighbors_found = true;
            }
        }
    }
    Ok(())
}

/// Parse one multi-valued cell into a map plus the neighbours in order
/// Gantree: parse_pairs(raw, q, column) -> Result<(map, order)> // 쌍 파싱
pub fn parse_pairs(
    raw: &str,
    qubit: QubitId,
    column: &str,
) -> InsResult<(BTreeMap<QubitId, f64>, Vec<QubitId>)> {
    let malformed = |fragment: &str| {
        InsError::InvalidCalibration(format!(
            "qubit {} column '{}': malformed entry '{}'",
            qubit, column, fragment
        ))
    };

    let mut map = BTreeMap::new();
    let mut order = Vec::new();

    for fragment in raw.split(PAIR_SEPARATOR).map(str::trim) {
        if fragment.is_empty() {
            continue;
        }
        let (target, value) = fragment
            .split_once(VALUE_SEPARATOR)
            .ok_or_else(|| malformed(fragment))?;
        let target: QubitId = target.trim().parse().map_err(|_| malformed(fragment))?;
        let value: f64 = value.trim().parse().map_err(|_| malformed(fragment))?;

        if map.insert(target, value).is_none() {
            order.push(target);
        }
    }

    Ok((map, order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_reader::parse_csv;
    use approx::assert_relative_eq;

    const CSV: &str = "\
Qubit,T1 (us),T2 (us),CNOT error,Gate time (ns),Operational
0,100,80,1:0.01,1:500,true
1,110,90,0:0.012;2:0.02,0:500;2:520,true
2,120,250,3:0.01;5:0.02,,true
";

    fn run(csv: &str) -> (CalibrationTable, TransformSummary) {
        transform(parse_csv(csv).unwrap(), &CalibrationConfig::default()).unwrap()
    }

    #[test]
    fn test_drop_and_rename() {
        let (table, summary) = run(CSV);
        assert_eq!(summary.dropped_columns, vec!["Qubit", "Operational"]);
        assert!(summary.unknown_columns.is_empty());
        assert_eq!(
            table.columns(),
            &[
                keys::T1_TIME,
                keys::T2_TIME,
                keys::CX_GATE_ERROR,
                keys::TWO_QUBIT_GATE_TIME,
                keys::NEIGHBORING_QUBITS,
                keys::RESET_TIME
            ]
        );
    }

    #[test]
    fn test_multi_valued_cell_expansion() {
        let (table, _) = run(CSV);
        let map = table.pair_map(2, keys::CX_GATE_ERROR).unwrap();
        assert_eq!(map.len(), 2);
        assert_relative_eq!(map[&3], 0.01);
        assert_relative_eq!(map[&5], 0.02);
        assert_eq!(table.neighboring_qubits(2), &[3, 5]);
        assert_eq!(table.neighboring_qubits(1), &[0, 2]);
    }

    #[test]
    fn test_missing_multi_cell_does_not_clear_neighbors() {
        let (table, summary) = run(CSV);
        assert_eq!(table.cell(2, keys::TWO_QUBIT_GATE_TIME), Some(&CellValue::Missing));
        assert_eq!(table.neighboring_qubits(2), &[3, 5]);
        assert_eq!(summary.missing_cells, 1);
    }

    #[test]
    fn test_first_column_defines_neighbors() {
        let csv = "CNOT error,Gate time (ns)\n,1:400;2:410\n2:0.1,2:300;1:100\n";
        let (table, _) = run(csv);
        // Row 0 has no CNOT entry, so the gate time column supplies neighbours
        assert_eq!(table.neighboring_qubits(0), &[1, 2]);
        assert_eq!(table.neighboring_qubits(1), &[2]);
    }

    #[test]
    fn test_default_reset_time() {
        let (table, summary) = run(CSV);
        assert_eq!(summary.default_reset_time, Some(1300.0));
        assert_eq!(table.scalar(0, keys::RESET_TIME), Some(1300.0));

        let (table, summary) = run("T1 (us),Reset time (ns)\n100,900\n");
        assert_eq!(summary.default_reset_time, None);
        assert_eq!(table.scalar(0, keys::RESET_TIME), Some(900.0));
    }

    #[test]
    fn test_unknown_columns_kept() {
        let (table, summary) = run("T1 (us),Vendor note\n100,hot\n");
        assert_eq!(summary.unknown_columns, vec!["Vendor note"]);
        assert_eq!(table.cell(0, "Vendor note"), Some(&CellValue::Text("hot".into())));
    }

    #[test]
    fn test_parse_pairs() {
        let (map, order) = parse_pairs("5:0.2; 3:0.1;", 0, "cx").unwrap();
        assert_eq!(order, vec![5, 3]);
        assert_eq!(map.len(), 2);

        assert!(matches!(
            parse_pairs("3-0.1", 2, "cx"),
            Err(InsError::InvalidCalibration(_))
        ));
        assert!(parse_pairs("-1:0.1", 2, "cx").is_err());
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let raw = parse_csv("T1 (us),T1 (us)\n1,2\n").unwrap();
        assert!(transform(raw, &CalibrationConfig::default()).is_err());
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(run(CSV), run(CSV));
    }
}
