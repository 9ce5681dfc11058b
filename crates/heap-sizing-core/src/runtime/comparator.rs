// crates/heap-sizing-core/src/runtime/comparator.rs
// ============================================================================
// Module: Layout Comparator
// Description: Tolerance-aware comparison of expected and observed sizes.
// Purpose: Produce self-describing comparison records for diagnostics.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! An [`Expectation`] names a quantity, a relation, an expected value, and a
//! tolerance band. Evaluating it against an observed value yields a
//! [`Comparison`] that carries everything needed to print a diagnostic later:
//! expected and observed values, the signed delta, the allowance, the sample
//! point, and the collector variant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::CollectorVariant;
use crate::core::ConformanceCheck;
use crate::core::ToleranceBand;

// ============================================================================
// SECTION: Sample Points
// ============================================================================

/// Point in a verification run at which a snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplePoint {
    /// Before any allocation.
    Baseline,
    /// After retaining about half of the maximum heap.
    HalfCommitted,
    /// After allocating until expansion stopped.
    Expanded,
    /// After sustained young collections with a steady allocation rate.
    SurvivorSteady,
    /// After releasing everything and forcing full collections.
    Contracted,
}

impl SamplePoint {
    /// Returns a stable label for the sample point.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::HalfCommitted => "half_committed",
            Self::Expanded => "expanded",
            Self::SurvivorSteady => "survivor_steady",
            Self::Contracted => "contracted",
        }
    }
}

impl fmt::Display for SamplePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Quantities and Relations
// ============================================================================

/// Observed quantity a comparison is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// Committed bytes across the whole heap.
    HeapCommitted,
    /// Committed bytes in the young generation.
    YoungCommitted,
    /// Committed bytes in the old generation.
    OldCommitted,
    /// Committed bytes in one survivor space.
    SurvivorCommitted,
    /// Maximum bytes of one survivor space.
    SurvivorMax,
    /// Committed survivor regions.
    SurvivorRegions,
    /// Live bytes in the survivor space.
    SurvivorOccupancy,
}

impl Quantity {
    /// Returns a stable label for the quantity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeapCommitted => "heap_committed",
            Self::YoungCommitted => "young_committed",
            Self::OldCommitted => "old_committed",
            Self::SurvivorCommitted => "survivor_committed",
            Self::SurvivorMax => "survivor_max",
            Self::SurvivorRegions => "survivor_regions",
            Self::SurvivorOccupancy => "survivor_occupancy",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relation the observed value must hold to the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Observed equals expected within the allowance.
    Equal,
    /// Observed does not exceed expected plus the allowance.
    AtMost,
    /// Observed is not below expected minus the allowance.
    AtLeast,
}

impl Relation {
    /// Returns the relation symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::AtMost => "<=",
            Self::AtLeast => ">=",
        }
    }

    /// Returns true when `observed` satisfies the relation to `expected`.
    #[must_use]
    pub const fn holds(self, expected: u64, observed: u64, allowance: u64) -> bool {
        match self {
            Self::Equal => expected.abs_diff(observed) <= allowance,
            Self::AtMost => observed <= expected.saturating_add(allowance),
            Self::AtLeast => observed.saturating_add(allowance) >= expected,
        }
    }
}

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// Expected value for one quantity, before observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    /// Quantity under comparison.
    pub quantity: Quantity,
    /// Required relation.
    pub relation: Relation,
    /// Expected value.
    pub expected: u64,
    /// Tolerance band.
    pub tolerance: ToleranceBand,
    /// Basis the tolerance band scales against.
    pub basis: u64,
}

impl Expectation {
    /// Exact expectation with the given relation.
    const fn exact(quantity: Quantity, relation: Relation, expected: u64) -> Self {
        Self {
            quantity,
            relation,
            expected,
            tolerance: ToleranceBand::Exact,
            basis: expected,
        }
    }

    /// Observed must equal `expected`.
    #[must_use]
    pub const fn equal(quantity: Quantity, expected: u64) -> Self {
        Self::exact(quantity, Relation::Equal, expected)
    }

    /// Observed must not exceed `expected`.
    #[must_use]
    pub const fn at_most(quantity: Quantity, expected: u64) -> Self {
        Self::exact(quantity, Relation::AtMost, expected)
    }

    /// Observed must not fall below `expected`.
    #[must_use]
    pub const fn at_least(quantity: Quantity, expected: u64) -> Self {
        Self::exact(quantity, Relation::AtLeast, expected)
    }

    /// Widens the expectation by a tolerance band scaled against `basis`.
    #[must_use]
    pub const fn within(self, tolerance: ToleranceBand, basis: u64) -> Self {
        Self {
            tolerance,
            basis,
            ..self
        }
    }

    /// Evaluates the expectation against an observed value.
    #[must_use]
    pub fn evaluate(
        self,
        observed: u64,
        check: ConformanceCheck,
        point: SamplePoint,
        collector: CollectorVariant,
    ) -> Comparison {
        let allowance = self.tolerance.allowance(self.basis);
        let delta = i128::from(observed) - i128::from(self.expected);
        Comparison {
            check,
            quantity: self.quantity,
            point,
            relation: self.relation,
            expected: self.expected,
            observed,
            tolerance: self.tolerance,
            allowance,
            delta: i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX }),
            passed: self.relation.holds(self.expected, observed, allowance),
            collector,
        }
    }
}

// ============================================================================
// SECTION: Comparisons
// ============================================================================

/// Outcome of one expected-versus-observed comparison.
///
/// A record with `passed == false` is a tolerance-exceeded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// Check the comparison belongs to.
    pub check: ConformanceCheck,
    /// Quantity compared.
    pub quantity: Quantity,
    /// Snapshot the observed value came from.
    pub point: SamplePoint,
    /// Required relation.
    pub relation: Relation,
    /// Expected value.
    pub expected: u64,
    /// Observed value.
    pub observed: u64,
    /// Tolerance band applied.
    pub tolerance: ToleranceBand,
    /// Resolved allowance in the quantity's unit.
    pub allowance: u64,
    /// `observed - expected`, saturated to `i64`.
    pub delta: i64,
    /// Whether the relation held.
    pub passed: bool,
    /// Collector variant observed.
    pub collector: CollectorVariant,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} at {}: observed {} {} expected {} (tolerance {}, allowance {}, delta {:+}): {}",
            self.check,
            self.collector,
            self.quantity,
            self.point,
            self.observed,
            self.relation.symbol(),
            self.expected,
            self.tolerance,
            self.allowance,
            self.delta,
            if self.passed { "ok" } else { "FAILED" },
        )
    }
}
