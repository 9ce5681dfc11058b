// crates/heap-sizing-core/src/core/tolerance.rs
// ============================================================================
// Module: Tolerance Bands
// Description: Comparison epsilons for noisy heap measurements.
// Purpose: Bound acceptable drift between expected and observed values.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`ToleranceBand`] is chosen per scenario and applied only at comparison
//! time. Relative bands scale against an explicit basis, which is not always
//! the expected value (survivor occupancy scales against committed size).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Tolerance Band
// ============================================================================

/// Allowed absolute difference between expected and observed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToleranceBand {
    /// Values must match exactly.
    #[default]
    Exact,
    /// Values may differ by up to `bytes`.
    Absolute {
        /// Allowed difference in bytes.
        bytes: u64,
    },
    /// Values may differ by up to `percent` of the basis.
    Relative {
        /// Allowed difference in percent of the basis.
        percent: u32,
    },
}

impl ToleranceBand {
    /// Returns the allowed difference for a basis value.
    #[must_use]
    pub fn allowance(self, basis: u64) -> u64 {
        match self {
            Self::Exact => 0,
            Self::Absolute {
                bytes,
            } => bytes,
            Self::Relative {
                percent,
            } => basis.saturating_mul(u64::from(percent)) / 100,
        }
    }

    /// Returns true when `observed` lies within the band around `expected`.
    #[must_use]
    pub fn allows(self, expected: u64, observed: u64, basis: u64) -> bool {
        expected.abs_diff(observed) <= self.allowance(basis)
    }
}

impl fmt::Display for ToleranceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::Absolute {
                bytes,
            } => write!(f, "±{bytes} bytes"),
            Self::Relative {
                percent,
            } => write!(f, "±{percent}%"),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_band_scales_with_basis() {
        let band = ToleranceBand::Relative {
            percent: 2,
        };
        assert_eq!(band.allowance(1000), 20);
        assert!(band.allows(500, 520, 1000));
        assert!(!band.allows(500, 521, 1000));
    }

    #[test]
    fn exact_band_rejects_any_drift() {
        assert!(ToleranceBand::Exact.allows(7, 7, 100));
        assert!(!ToleranceBand::Exact.allows(7, 8, 100));
    }
}
