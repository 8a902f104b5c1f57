//! Core types for NoiSim
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Type aliases, instance categories and reference key normalization.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed, equal to the calibration table row)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

/// Classical bit identifier
pub type ClbitId = usize;

/// Rotation angle in radians
pub type Angle = f64;

/// Measurement counts: bitstring -> count
/// Gantree: Counts // pub type Counts = HashMap<String, u64>
pub type Counts = HashMap<String, u64>;

// ============================================================================
// Instance Category
// ============================================================================

/// Kind of instance a reference key points to
/// Gantree: InstanceCategory // 인스턴스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InstanceCategory {
    /// Imported calibration data
    NoiseData,
    /// Noise model built from calibration data
    NoiseModel,
    /// Simulator built from a noise model
    Simulator,
}

impl InstanceCategory {
    /// All categories in pipeline order
    pub const ALL: [InstanceCategory; 3] = [
        InstanceCategory::NoiseData,
        InstanceCategory::NoiseModel,
        InstanceCategory::Simulator,
    ];

    /// User-facing label
    pub fn label(&self) -> &'static str {
        match self {
            InstanceCategory::NoiseData => "noise data instance",
            InstanceCategory::NoiseModel => "noise model instance",
            InstanceCategory::Simulator => "simulator instance",
        }
    }

    /// Category whose instances pin keys of this category
    pub fn dependent(&self) -> Option<InstanceCategory> {
        match self {
            InstanceCategory::NoiseData => Some(InstanceCategory::NoiseModel),
            InstanceCategory::NoiseModel => Some(InstanceCategory::Simulator),
            InstanceCategory::Simulator => None,
        }
    }

    /// Category this one is built from
    pub fn source(&self) -> Option<InstanceCategory> {
        match self {
            InstanceCategory::NoiseData => None,
            InstanceCategory::NoiseModel => Some(InstanceCategory::NoiseData),
            InstanceCategory::Simulator => Some(InstanceCategory::NoiseModel),
        }
    }
}

impl fmt::Display for InstanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Reference Keys
// ============================================================================

/// Normalize a user-supplied reference key
/// Gantree: normalize_reference_key(raw) -> (String,bool) // 공백 치환
///
/// Every whitespace character becomes `_`. The flag reports whether the
/// key was rewritten.
pub fn normalize_reference_key(raw: &str) -> (String, bool) {
    if !raw.chars().any(char::is_whitespace) {
        return (raw.to_string(), false);
    }
    let key = raw
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    (key, true)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_key() {
        assert_eq!(normalize_reference_key("d1"), ("d1".to_string(), false));
    }

    #[test]
    fn test_normalize_spaces() {
        let (key, changed) = normalize_reference_key("my data 2");
        assert_eq!(key, "my_data_2");
        assert!(changed);
    }

    #[test]
    fn test_normalize_tabs_and_edges() {
        let (key, changed) = normalize_reference_key(" a\tb ");
        assert_eq!(key, "_a_b_");
        assert!(changed);
    }

    #[test]
    fn test_category_chain() {
        assert_eq!(
            InstanceCategory::NoiseData.dependent(),
            Some(InstanceCategory::NoiseModel)
        );
        assert_eq!(
            InstanceCategory::Simulator.source(),
            Some(InstanceCategory::NoiseModel)
        );
        assert_eq!(InstanceCategory::Simulator.dependent(), None);
        assert_eq!(InstanceCategory::NoiseModel.to_string(), "noise model instance");
    }
}
