// crates/heap-sizing-core/src/core/check.rs
// ============================================================================
// Module: Conformance Checks
// Description: Features a verification run can exercise.
// Purpose: Name the feature under test and decide collector applicability.
// Dependencies: crate::core::{collector, layout}, serde
// ============================================================================

//! ## Overview
//! Each [`ConformanceCheck`] exercises one sizing feature. Some features do
//! not exist for every collector; [`ConformanceCheck::inapplicable_reason`]
//! reports why, and the verifier turns that into an inconclusive outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::collector::CollectorVariant;
use crate::core::layout::ExpectedLayout;

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Sizing feature exercised by a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConformanceCheck {
    /// Committed heap stays within the min/initial/max bounds.
    HeapBounds,
    /// Young and old generations follow the old/young ratio.
    NewRatio,
    /// Young generation starts at `NewSize` and stays within its maximum.
    NewSize,
    /// Survivor spaces follow the eden/survivor ratio.
    SurvivorRatio,
    /// Parallel scavenger survivors follow the initial and minimum ratios.
    MinAndInitialSurvivorRatio,
    /// Survivor occupancy converges to the target percentage.
    TargetSurvivorRatio,
    /// Committed heap contracts after full collections.
    HeapShrink,
}

impl ConformanceCheck {
    /// All checks in declaration order.
    pub const ALL: [Self; 7] = [
        Self::HeapBounds,
        Self::NewRatio,
        Self::NewSize,
        Self::SurvivorRatio,
        Self::MinAndInitialSurvivorRatio,
        Self::TargetSurvivorRatio,
        Self::HeapShrink,
    ];

    /// Returns a stable label for the check.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeapBounds => "heap_bounds",
            Self::NewRatio => "new_ratio",
            Self::NewSize => "new_size",
            Self::SurvivorRatio => "survivor_ratio",
            Self::MinAndInitialSurvivorRatio => "min_and_initial_survivor_ratio",
            Self::TargetSurvivorRatio => "target_survivor_ratio",
            Self::HeapShrink => "heap_shrink",
        }
    }

    /// Returns why the check does not apply to the layout's collector, or
    /// `None` when it applies.
    #[must_use]
    pub const fn inapplicable_reason(self, layout: &ExpectedLayout) -> Option<&'static str> {
        match (self, layout.collector) {
            (
                Self::MinAndInitialSurvivorRatio,
                CollectorVariant::SingleThreaded | CollectorVariant::RegionBased,
            ) => Some("initial and minimum survivor ratios only apply to the parallel scavenger"),
            (Self::HeapShrink, CollectorVariant::ParallelScavenge) if layout.adaptive_sizing => {
                Some("adaptive sizing replaces free-ratio driven shrinking")
            }
            _ => None,
        }
    }
}

impl fmt::Display for ConformanceCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
