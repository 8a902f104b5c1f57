//! Constants for NoiSim
//!
//! Gantree: L0_Foundation → Constants
//!
//! Physical unit conversions and operational defaults.

// ============================================================================
// Physics Constants
// Gantree: physics // 물리 상수
// ============================================================================

pub mod physics {
    //! Unit conversions used when turning calibration tables into errors

    /// Convert microseconds to seconds
    #[inline]
    pub const fn us_to_s(us: f64) -> f64 {
        us * 1e-6
    }

    /// Convert nanoseconds to seconds
    #[inline]
    pub const fn ns_to_s(ns: f64) -> f64 {
        ns * 1e-9
    }

    /// Upper bound of T2 relative to T1 (T2 ≤ 2·T1)
    pub const T2_T1_RATIO_MAX: f64 = 2.0;
}

// ============================================================================
// Calibration Defaults
// Gantree: calibration // 캘리브레이션 기본값
// ============================================================================

pub mod calibration {
    //! Defaults for imported calibration data

    /// Reset duration in nanoseconds. IBM CSV exports do not carry it; the
    /// value matches reset durations reported by ready-made backend models.
    pub const DEFAULT_RESET_TIME_NS: f64 = 1300.0;

    /// Accepted calibration file extensions
    pub const CSV_EXTENSIONS: &[&str] = &[".csv", ".CSV"];

    /// Multi-valued cell pair separator
    pub const PAIR_SEPARATOR: char = ';';

    /// Multi-valued cell key/value separator
    pub const VALUE_SEPARATOR: char = ':';
}

// ============================================================================
// Execution Defaults
// Gantree: execution // 실행 기본값
// ============================================================================

pub mod execution {
    //! Transpilation and simulation limits

    /// Lowest transpiler optimization level
    pub const MIN_OPTIMIZATION_LEVEL: u8 = 0;

    /// Highest transpiler optimization level
    pub const MAX_OPTIMIZATION_LEVEL: u8 = 3;

    /// Default number of shots
    pub const DEFAULT_SHOTS: u64 = 1024;

    /// Largest number of active qubits the local simulator accepts
    pub const MAX_SIMULATED_QUBITS: usize = 20;

    /// Check optimization level range
    #[inline]
    pub fn is_valid_optimization_level(level: u8) -> bool {
        (MIN_OPTIMIZATION_LEVEL..=MAX_OPTIMIZATION_LEVEL).contains(&level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_conversions() {
        assert_relative_eq!(physics::us_to_s(100.0), 1e-4);
        assert_relative_eq!(physics::ns_to_s(1300.0), 1.3e-6);
    }

    #[test]
    fn test_optimization_levels() {
        assert!(execution::is_valid_optimization_level(0));
        assert!(execution::is_valid_optimization_level(3));
        assert!(!execution::is_valid_optimization_level(4));
    }
}
