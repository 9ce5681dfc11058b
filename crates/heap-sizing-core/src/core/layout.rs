// crates/heap-sizing-core/src/core/layout.rs
// ============================================================================
// Module: Expected Layout
// Description: Alignment facts and the computed expected heap layout.
// Purpose: Carry calculator output to the verifier and reporting surfaces.
// Dependencies: crate::core::{collector, error, units}, serde
// ============================================================================

//! ## Overview
//! [`Alignment`] values are read from the target and never configured.
//! [`ExpectedLayout`] is the calculator's output: heap bounds, generation
//! sizes, and the survivor expectation for the active collector variant. The
//! layout keeps the effective ratios it was computed from so survivor rules
//! can be re-applied to an observed young generation size.
//!
//! ## Invariants
//! - `min_heap <= initial_heap <= max_heap`.
//! - `new_size <= max_young_size <= max_new_size <= max_heap`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::collector::CollectorVariant;
use crate::core::error::SizingError;
use crate::core::units::align_down;

// ============================================================================
// SECTION: Alignment
// ============================================================================

/// Alignment facts discovered from the target process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    /// Granularity of generation spaces.
    pub space_alignment: u64,
    /// Granularity of whole-heap bounds.
    pub heap_alignment: u64,
}

impl Alignment {
    /// Creates an alignment pair.
    #[must_use]
    pub const fn new(space_alignment: u64, heap_alignment: u64) -> Self {
        Self {
            space_alignment,
            heap_alignment,
        }
    }

    /// Checks that both values are non-zero powers of two and that the heap
    /// alignment is a multiple of the space alignment.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidAlignment`] for unusable values.
    pub const fn validate(&self) -> Result<(), SizingError> {
        if !self.space_alignment.is_power_of_two() {
            return Err(SizingError::InvalidAlignment {
                name: "space",
                value: self.space_alignment,
            });
        }
        if !self.heap_alignment.is_power_of_two() || self.heap_alignment < self.space_alignment {
            return Err(SizingError::InvalidAlignment {
                name: "heap",
                value: self.heap_alignment,
            });
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Survivor Expectations
// ============================================================================

/// Expected survivor capacity, in the unit the collector sizes it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum SurvivorSize {
    /// Size of one survivor space in bytes.
    Bytes {
        /// Byte size.
        size: u64,
    },
    /// Upper bound on committed survivor regions.
    Regions {
        /// Region count.
        count: u64,
    },
}

/// Effective tenuring thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenuringThresholds {
    /// Threshold used at startup.
    pub initial: u64,
    /// Largest threshold the collector may adopt.
    pub max: u64,
}

// ============================================================================
// SECTION: Expected Layout
// ============================================================================

/// Calculator output for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedLayout {
    /// Collector variant the layout was computed for.
    pub collector: CollectorVariant,
    /// Alignment the layout was computed against.
    pub alignment: Alignment,
    /// Minimum heap size.
    pub min_heap: u64,
    /// Initial heap size.
    pub initial_heap: u64,
    /// Maximum heap size.
    pub max_heap: u64,
    /// Initial young generation size.
    pub new_size: u64,
    /// Young generation limit (explicit `MaxNewSize` capped at the heap maximum).
    pub max_new_size: u64,
    /// Young generation capacity at the maximum heap size.
    pub max_young_size: u64,
    /// Initial old generation size.
    pub old_size: u64,
    /// Survivor expectation at the initial young size.
    pub survivor: SurvivorSize,
    /// Survivor cap at the maximum young size (parallel scavenger).
    pub max_survivor_size: Option<u64>,
    /// Region size (region-based collector).
    pub region_size: Option<u64>,
    /// Effective old/young ratio.
    pub new_ratio: u64,
    /// Effective eden/survivor ratio.
    pub survivor_ratio: u64,
    /// Effective startup young/survivor ratio.
    pub initial_survivor_ratio: u64,
    /// Effective minimum young/survivor ratio.
    pub min_survivor_ratio: u64,
    /// Whether adaptive sizing is active.
    pub adaptive_sizing: bool,
    /// Desired survivor occupancy after a young collection, in percent.
    pub target_survivor_percent: u64,
    /// Effective minimum free heap percentage.
    pub min_heap_free_ratio: u64,
    /// Effective maximum free heap percentage.
    pub max_heap_free_ratio: u64,
    /// Effective tenuring thresholds.
    pub tenuring: TenuringThresholds,
    /// Full collections needed before the heap reaches its contracted size.
    pub shrink_cycles: u32,
}

impl ExpectedLayout {
    /// Applies the variant's survivor rule to a young generation size.
    ///
    /// The single-threaded variant splits `young` into eden and two equal
    /// survivors; the parallel scavenger uses the startup ratio; the
    /// region-based variant bounds survivor regions by the survivor ratio.
    #[must_use]
    pub fn survivor_size_for_young(&self, young: u64) -> SurvivorSize {
        let space = self.alignment.space_alignment;
        match self.collector {
            CollectorVariant::SingleThreaded => SurvivorSize::Bytes {
                size: align_down(young / self.survivor_ratio.saturating_add(2), space),
            },
            CollectorVariant::ParallelScavenge => SurvivorSize::Bytes {
                size: align_down(young / self.initial_survivor_ratio, space),
            },
            CollectorVariant::RegionBased => {
                let region = self.region_size.unwrap_or(space);
                let young_regions = young / region;
                SurvivorSize::Regions {
                    count: young_regions.div_ceil(self.survivor_ratio),
                }
            }
        }
    }

    /// Returns the parallel scavenger's survivor cap for a young generation
    /// size: the minimum ratio bounds it under adaptive sizing, the startup
    /// ratio otherwise. Other variants have no byte cap.
    #[must_use]
    pub fn max_survivor_for_young(&self, young: u64) -> Option<u64> {
        if self.collector != CollectorVariant::ParallelScavenge {
            return None;
        }
        let ratio = if self.adaptive_sizing {
            self.min_survivor_ratio
        } else {
            self.initial_survivor_ratio
        };
        Some(align_down(young / ratio, self.alignment.space_alignment))
    }

    /// Returns the survivor occupancy the collector aims for after a young
    /// collection, given the committed survivor size.
    #[must_use]
    pub const fn target_survivor_occupancy(&self, committed: u64) -> u64 {
        committed.saturating_mul(self.target_survivor_percent) / 100
    }

    /// Returns the allocation granularity used for survivor drift checks.
    #[must_use]
    pub fn sizing_unit(&self) -> u64 {
        self.region_size.unwrap_or(self.alignment.space_alignment)
    }
}
