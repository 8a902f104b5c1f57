//! Calibration CSV reader
//!
//! Gantree: L3_Calibration → CsvReader
//!
//! Reads comma-separated calibration exports into a [`RawTable`] of
//! strings. Quoted fields may contain commas, newlines and doubled quotes.

use noisim_core::{InsError, InsResult};
use std::path::Path;

/// Unparsed table: trimmed headers plus one string row per qubit
/// Gantree: RawTable // 원본 표
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Drop a column by header; returns whether it existed
    pub fn remove_column(&mut self, header: &str) -> bool {
        match self.column_index(header) {
            Some(index) => {
                self.headers.remove(index);
                for row in &mut self.rows {
                    row.remove(index);
                }
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// File Checks
// ============================================================================

/// Reject files whose extension is not in `expected` (dot included)
/// Gantree: check_file_type(path, expected) -> Result // 확장자 검사
pub fn check_file_type(path: impl AsRef<Path>, expected: &[String]) -> InsResult<()> {
    let current_ext = path
        .as_ref()
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    if expected.iter().any(|e| *e == current_ext) {
        Ok(())
    } else {
        Err(InsError::FileType {
            current_ext,
            expected: expected.join(", "),
        })
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Read and parse a CSV file
/// Gantree: read_csv_file(path) -> Result<RawTable> // 파일 읽기
pub fn read_csv_file(path: impl AsRef<Path>) -> InsResult<RawTable> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| InsError::FileError(format!("{}: {}", path.display(), e)))?;
    parse_csv(&text)
}

/// Parse CSV text; the first non-blank record is the header
/// Gantree: parse_csv(text) -> Result<RawTable> // CSV 파싱
pub fn parse_csv(text: &str) -> InsResult<RawTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text)?.into_iter();

    let headers: Vec<String> = loop {
        match records.next() {
            Some((_, fields)) if is_blank(&fields) => continue,
            Some((_, fields)) => break fields.into_iter().map(|h| h.trim().to_string()).collect(),
            None => {
                return Err(InsError::CsvFormat {
                    line: 1,
                    reason: "file contains no header row".into(),
                })
            }
        }
    };

    let mut rows = Vec::new();
    for (line, fields) in records {
        if is_blank(&fields) {
            continue;
        }
        if fields.len() != headers.len() {
            return Err(InsError::CsvFormat {
                line,
                reason: format!(
                    "expected {} fields but found {}",
                    headers.len(),
                    fields.len()
                ),
            });
        }
        rows.push(fields);
    }

    log::debug!("parsed CSV with {} columns and {} rows", headers.len(), rows.len());
    Ok(RawTable { headers, rows })
}

fn is_blank(fields: &[String]) -> bool {
    fields.iter().all(|f| f.trim().is_empty())
}

/// Split text into records, each tagged with its 1-based starting line
fn split_records(text: &str) -> InsResult<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                fields.push(std::mem::take(&mut field));
                records.push((record_line, std::mem::take(&mut fields)));
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(InsError::CsvFormat {
            line: record_line,
            reason: "unterminated quoted field".into(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push((record_line, fields));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let table = parse_csv("Qubit,T1 (us)\n0,100.5\n1,98\n").unwrap();
        assert_eq!(table.headers, vec!["Qubit", "T1 (us)"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["1", "98"]);
    }

    #[test]
    fn test_headers_trimmed_and_bom_stripped() {
        let table = parse_csv("\u{feff}Qubit , T2 (us) \r\n0,1\r\n").unwrap();
        assert_eq!(table.headers, vec!["Qubit", "T2 (us)"]);
    }

    #[test]
    fn test_quoted_fields() {
        let text = "a,b\n\"1:0.1;2:0.2\",\"say \"\"hi\"\", ok\"\n";
        let table = parse_csv(text).unwrap();
        assert_eq!(table.rows[0], vec!["1:0.1;2:0.2", "say \"hi\", ok"]);
    }

    #[test]
    fn test_blank_lines_ignored() {
        let table = parse_csv("\n\na,b\n1,2\n\n3,4").unwrap();
        assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_wrong_field_count() {
        let err = parse_csv("a,b\n1,2\n3\n").unwrap_err();
        assert_eq!(
            err,
            InsError::CsvFormat {
                line: 3,
                reason: "expected 2 fields but found 1".into()
            }
        );
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(matches!(
            parse_csv("a\n\"open"),
            Err(InsError::CsvFormat { line: 2, .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_csv("").is_err());
    }

    #[test]
    fn test_check_file_type() {
        let expected = vec![".csv".to_string(), ".CSV".to_string()];
        assert!(check_file_type("data/ibm_brisbane.csv", &expected).is_ok());
        assert!(check_file_type("DATA.CSV", &expected).is_ok());
        assert_eq!(
            check_file_type("data.xlsx", &expected),
            Err(InsError::FileType {
                current_ext: ".xlsx".into(),
                expected: ".csv, .CSV".into()
            })
        );
        assert!(check_file_type("noext", &expected).is_err());
    }

    #[test]
    fn test_remove_column() {
        let mut table = parse_csv("a,b,c\n1,2,3\n").unwrap();
        assert!(table.remove_column("b"));
        assert!(!table.remove_column("b"));
        assert_eq!(table.headers, vec!["a", "c"]);
        assert_eq!(table.rows[0], vec!["1", "3"]);
    }
}
