// crates/heap-sizing-core/src/core/usage.rs
// ============================================================================
// Module: Observed Usage
// Description: Memory pool usage quadruples and per-region snapshots.
// Purpose: Represent one point-in-time reading of the target's heap.
// Dependencies: crate::core::collector, serde
// ============================================================================

//! ## Overview
//! A snapshot is independent of every other snapshot and is only comparable
//! to the sizing policy after the collector has run. Young generation totals
//! count the survivor pool twice for copying collectors, which report one of
//! their two equal survivor spaces.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::collector::CollectorVariant;
use crate::core::collector::MemoryRegion;

// ============================================================================
// SECTION: Pool Usage
// ============================================================================

/// Usage of one memory pool, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolUsage {
    /// Size requested at startup.
    pub init: u64,
    /// Bytes currently occupied.
    pub used: u64,
    /// Bytes currently backed by memory.
    pub committed: u64,
    /// Largest size the pool may grow to.
    pub max: u64,
}

impl PoolUsage {
    /// Creates a usage quadruple.
    #[must_use]
    pub const fn new(init: u64, used: u64, committed: u64, max: u64) -> Self {
        Self {
            init,
            used,
            committed,
            max,
        }
    }

    /// Adds two quadruples field by field, saturating.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self {
            init: self.init.saturating_add(other.init),
            used: self.used.saturating_add(other.used),
            committed: self.committed.saturating_add(other.committed),
            max: self.max.saturating_add(other.max),
        }
    }
}

// ============================================================================
// SECTION: Snapshots
// ============================================================================

/// One reading of the eden, survivor, and old pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedUsage {
    /// Collector variant the pools belong to.
    pub collector: CollectorVariant,
    /// Eden pool.
    pub eden: PoolUsage,
    /// Survivor pool (one space for copying collectors).
    pub survivor: PoolUsage,
    /// Old generation pool.
    pub old: PoolUsage,
}

impl ObservedUsage {
    /// Returns the usage of one region.
    #[must_use]
    pub const fn region(&self, region: MemoryRegion) -> PoolUsage {
        match region {
            MemoryRegion::Eden => self.eden,
            MemoryRegion::Survivor => self.survivor,
            MemoryRegion::Old => self.old,
        }
    }

    /// Returns the combined young generation usage.
    ///
    /// For copying collectors `init`, `committed`, and `max` include the
    /// survivor pool twice; `used` counts it once since only one survivor
    /// space holds live objects between collections.
    #[must_use]
    pub const fn young_generation(&self) -> PoolUsage {
        let young = self.eden.saturating_add(self.survivor);
        if self.collector.has_paired_survivors() {
            PoolUsage {
                init: young.init.saturating_add(self.survivor.init),
                used: young.used,
                committed: young.committed.saturating_add(self.survivor.committed),
                max: young.max.saturating_add(self.survivor.max),
            }
        } else {
            young
        }
    }

    /// Returns the combined whole-heap usage.
    #[must_use]
    pub const fn heap(&self) -> PoolUsage {
        self.young_generation().saturating_add(self.old)
    }
}
