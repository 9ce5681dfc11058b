// crates/heap-sizing-core/src/core/collector.rs
// ============================================================================
// Module: Collector Variants
// Description: Closed collector variant enum and its telemetry name tables.
// Purpose: Resolve the active collector once and thread it explicitly.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The runtime-under-test exposes collectors and memory pools by display
//! name. Every name the crate relies on lives in the tables below, keyed by
//! [`CollectorVariant`]; call sites never match on free text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Collector Variant
// ============================================================================

/// Collector variants with distinct sizing rules.
///
/// # Invariants
/// - Variants are stable for serialization and flag rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectorVariant {
    /// Single-threaded copying young generation with a mark-compact old generation.
    SingleThreaded,
    /// Parallel scavenging young generation with adaptive survivor sizing.
    ParallelScavenge,
    /// Region-based heap where generations are sets of fixed-size regions.
    #[default]
    RegionBased,
}

impl CollectorVariant {
    /// All variants in declaration order.
    pub const ALL: [Self; 3] = [Self::SingleThreaded, Self::ParallelScavenge, Self::RegionBased];

    /// Returns a stable label for the variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleThreaded => "single_threaded",
            Self::ParallelScavenge => "parallel_scavenge",
            Self::RegionBased => "region_based",
        }
    }

    /// Returns the runtime flag that selects this collector.
    #[must_use]
    pub const fn selection_flag(self) -> &'static str {
        match self {
            Self::SingleThreaded => "UseSerialGC",
            Self::ParallelScavenge => "UseParallelGC",
            Self::RegionBased => "UseG1GC",
        }
    }

    /// Returns the collector names reported by the runtime's telemetry.
    #[must_use]
    pub const fn collector_names(self) -> &'static [&'static str] {
        match self {
            Self::SingleThreaded => &["Copy", "MarkSweepCompact"],
            Self::ParallelScavenge => &["PS Scavenge", "PS MarkSweep"],
            Self::RegionBased => &["G1 Young Generation", "G1 Old Generation", "G1 Concurrent GC"],
        }
    }

    /// Returns the memory pool name for a heap region under this collector.
    #[must_use]
    pub const fn pool_name(self, region: MemoryRegion) -> &'static str {
        match (self, region) {
            (Self::SingleThreaded, MemoryRegion::Eden) => "Eden Space",
            (Self::SingleThreaded, MemoryRegion::Survivor) => "Survivor Space",
            (Self::SingleThreaded, MemoryRegion::Old) => "Tenured Gen",
            (Self::ParallelScavenge, MemoryRegion::Eden) => "PS Eden Space",
            (Self::ParallelScavenge, MemoryRegion::Survivor) => "PS Survivor Space",
            (Self::ParallelScavenge, MemoryRegion::Old) => "PS Old Gen",
            (Self::RegionBased, MemoryRegion::Eden) => "G1 Eden Space",
            (Self::RegionBased, MemoryRegion::Survivor) => "G1 Survivor Space",
            (Self::RegionBased, MemoryRegion::Old) => "G1 Old Gen",
        }
    }

    /// Resolves the variant from a set of live collector names.
    ///
    /// A variant matches when any live name appears in its table. Returns
    /// `None` when no table entry matches or when names from more than one
    /// variant are present.
    #[must_use]
    pub fn from_collector_names<S: AsRef<str>>(names: &[S]) -> Option<Self> {
        let mut resolved = None;
        for variant in Self::ALL {
            let table = variant.collector_names();
            if names.iter().any(|name| table.contains(&name.as_ref())) {
                if resolved.is_some() {
                    return None;
                }
                resolved = Some(variant);
            }
        }
        resolved
    }

    /// Returns true when the young generation carries two survivor spaces of
    /// equal size (copying collectors), so young totals count survivor twice.
    #[must_use]
    pub const fn has_paired_survivors(self) -> bool {
        !matches!(self, Self::RegionBased)
    }
}

impl fmt::Display for CollectorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Memory Regions
// ============================================================================

/// Heap regions sampled by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryRegion {
    /// Young-generation allocation space.
    Eden,
    /// Young-generation survivor space (one of the pair for copying collectors).
    Survivor,
    /// Old (tenured) generation.
    Old,
}

impl MemoryRegion {
    /// All regions in sampling order.
    pub const ALL: [Self; 3] = [Self::Eden, Self::Survivor, Self::Old];

    /// Returns a stable label for the region.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eden => "eden",
            Self::Survivor => "survivor",
            Self::Old => "old",
        }
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Collection Requests
// ============================================================================

/// Collection cycles the verifier may force on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Young-only (minor) collection.
    Young,
    /// Whole-heap (full) collection.
    Full,
}
