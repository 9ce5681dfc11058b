// crates/heap-sizing-core/src/core/config.rs
// ============================================================================
// Module: Sizing Configuration
// Description: Immutable scenario description consumed by the sizing policy.
// Purpose: Hold explicit sizes, ratios, and collector choice for one scenario.
// Dependencies: crate::core::{collector, units}, serde
// ============================================================================

//! ## Overview
//! A [`SizingConfig`] is built once per scenario (directly, or by folding
//! flag tokens) and never mutated afterwards. Unset values are `None`; an
//! explicit zero for a heap or young size is treated as unset, matching the
//! runtime's "auto-detect" convention. Ratio defaults and the parallel
//! scavenger's survivor-ratio coupling are resolved by the `effective_*`
//! accessors so every consumer sees the same rules.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::collector::CollectorVariant;
use crate::core::units::G;
use crate::core::units::M;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default old/young ratio.
pub const DEFAULT_NEW_RATIO: u64 = 2;
/// Default eden/survivor ratio.
pub const DEFAULT_SURVIVOR_RATIO: u64 = 8;
/// Default young/survivor ratio at startup for the parallel scavenger.
pub const DEFAULT_INITIAL_SURVIVOR_RATIO: u64 = 8;
/// Default minimum young/survivor ratio for the parallel scavenger.
pub const DEFAULT_MIN_SURVIVOR_RATIO: u64 = 3;
/// Default desired survivor occupancy after a young collection, in percent.
pub const DEFAULT_TARGET_SURVIVOR_RATIO: u64 = 50;
/// Default minimum free percentage after a full collection.
pub const DEFAULT_MIN_HEAP_FREE_RATIO: u64 = 40;
/// Default maximum free percentage after a full collection.
pub const DEFAULT_MAX_HEAP_FREE_RATIO: u64 = 70;
/// Default initial tenuring threshold.
pub const DEFAULT_INITIAL_TENURING_THRESHOLD: u64 = 7;
/// Largest age an object header can record.
pub const MAX_TENURING_THRESHOLD_LIMIT: u64 = 15;
/// Threshold value that disables promotion by age.
pub const NEVER_TENURE_THRESHOLD: u64 = MAX_TENURING_THRESHOLD_LIMIT + 1;

// ============================================================================
// SECTION: Ergonomic Baseline
// ============================================================================

/// Runtime-wide heap defaults used when no heap bound is configured.
///
/// The runtime derives these from the host; the crate treats them as opaque
/// facts supplied alongside the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapBaseline {
    /// Initial (and minimum) heap size when neither is configured.
    pub initial_heap: u64,
    /// Maximum heap size when none is configured.
    pub max_heap: u64,
}

impl Default for HeapBaseline {
    fn default() -> Self {
        Self {
            initial_heap: 64 * M,
            max_heap: G,
        }
    }
}

// ============================================================================
// SECTION: Sizing Configuration
// ============================================================================

/// Immutable description of one sizing scenario.
///
/// # Invariants
/// - Never mutated after construction; build a new value to change a field.
/// - `region_size` and the remembered-set bucket pair only apply to
///   [`CollectorVariant::RegionBased`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizingConfig {
    /// Collector variant the scenario targets.
    pub collector: CollectorVariant,
    /// Explicit minimum heap size.
    #[serde(default)]
    pub min_heap: Option<u64>,
    /// Explicit initial heap size.
    #[serde(default)]
    pub initial_heap: Option<u64>,
    /// Explicit maximum heap size.
    #[serde(default)]
    pub max_heap: Option<u64>,
    /// Explicit initial young generation size.
    #[serde(default)]
    pub new_size: Option<u64>,
    /// Explicit maximum young generation size.
    #[serde(default)]
    pub max_new_size: Option<u64>,
    /// Old/young ratio.
    #[serde(default)]
    pub new_ratio: Option<u64>,
    /// Eden/survivor ratio.
    #[serde(default)]
    pub survivor_ratio: Option<u64>,
    /// Young/survivor ratio at startup (parallel scavenger).
    #[serde(default)]
    pub initial_survivor_ratio: Option<u64>,
    /// Minimum young/survivor ratio (parallel scavenger).
    #[serde(default)]
    pub min_survivor_ratio: Option<u64>,
    /// Desired survivor occupancy after a young collection, in percent.
    #[serde(default)]
    pub target_survivor_ratio: Option<u64>,
    /// Minimum free heap percentage after a full collection.
    #[serde(default)]
    pub min_heap_free_ratio: Option<u64>,
    /// Maximum free heap percentage after a full collection.
    #[serde(default)]
    pub max_heap_free_ratio: Option<u64>,
    /// Region size (region-based collector only).
    #[serde(default)]
    pub region_size: Option<u64>,
    /// Remembered-set bucket count (region-based collector only).
    #[serde(default)]
    pub howl_num_buckets: Option<u64>,
    /// Remembered-set bucket maximum (region-based collector only).
    #[serde(default)]
    pub howl_max_num_buckets: Option<u64>,
    /// Initial tenuring threshold.
    #[serde(default)]
    pub initial_tenuring_threshold: Option<u64>,
    /// Maximum tenuring threshold (`0` always tenures).
    #[serde(default)]
    pub max_tenuring_threshold: Option<u64>,
    /// Disables promotion by age; overrides `max_tenuring_threshold` when set.
    #[serde(default)]
    pub never_tenure: bool,
    /// Adaptive generation sizing (parallel scavenger).
    #[serde(default)]
    pub use_adaptive_size_policy: Option<bool>,
    /// Whether the old generation shrinks gradually over several full collections.
    #[serde(default)]
    pub shrink_heap_in_steps: Option<bool>,
    /// Ergonomic heap defaults.
    #[serde(default)]
    pub baseline: HeapBaseline,
}

impl SizingConfig {
    /// Creates an empty configuration for the given collector.
    #[must_use]
    pub fn new(collector: CollectorVariant) -> Self {
        Self {
            collector,
            ..Self::default()
        }
    }

    /// Returns the explicit minimum heap size (zero means unset).
    #[must_use]
    pub fn explicit_min_heap(&self) -> Option<u64> {
        non_zero(self.min_heap)
    }

    /// Returns the explicit initial heap size (zero means unset).
    #[must_use]
    pub fn explicit_initial_heap(&self) -> Option<u64> {
        non_zero(self.initial_heap)
    }

    /// Returns the explicit maximum heap size (zero means unset).
    #[must_use]
    pub fn explicit_max_heap(&self) -> Option<u64> {
        non_zero(self.max_heap)
    }

    /// Returns the explicit initial young size (zero means unset).
    #[must_use]
    pub fn explicit_new_size(&self) -> Option<u64> {
        non_zero(self.new_size)
    }

    /// Returns the explicit maximum young size (zero means unset).
    #[must_use]
    pub fn explicit_max_new_size(&self) -> Option<u64> {
        non_zero(self.max_new_size)
    }

    /// Returns the effective old/young ratio.
    #[must_use]
    pub fn effective_new_ratio(&self) -> u64 {
        self.new_ratio.unwrap_or(DEFAULT_NEW_RATIO)
    }

    /// Returns the effective eden/survivor ratio.
    #[must_use]
    pub fn effective_survivor_ratio(&self) -> u64 {
        self.survivor_ratio.unwrap_or(DEFAULT_SURVIVOR_RATIO)
    }

    /// Returns the effective startup young/survivor ratio.
    ///
    /// An explicit survivor ratio implies `survivor_ratio + 2` when the
    /// initial ratio itself is unset.
    #[must_use]
    pub fn effective_initial_survivor_ratio(&self) -> u64 {
        match (self.initial_survivor_ratio, self.survivor_ratio) {
            (Some(ratio), _) => ratio,
            (None, Some(survivor)) => survivor.saturating_add(2),
            (None, None) => DEFAULT_INITIAL_SURVIVOR_RATIO,
        }
    }

    /// Returns the effective minimum young/survivor ratio.
    ///
    /// An explicit survivor ratio implies `survivor_ratio + 2` when the
    /// minimum ratio itself is unset.
    #[must_use]
    pub fn effective_min_survivor_ratio(&self) -> u64 {
        match (self.min_survivor_ratio, self.survivor_ratio) {
            (Some(ratio), _) => ratio,
            (None, Some(survivor)) => survivor.saturating_add(2),
            (None, None) => DEFAULT_MIN_SURVIVOR_RATIO,
        }
    }

    /// Returns the effective target survivor occupancy percentage.
    #[must_use]
    pub fn effective_target_survivor_ratio(&self) -> u64 {
        self.target_survivor_ratio.unwrap_or(DEFAULT_TARGET_SURVIVOR_RATIO)
    }

    /// Returns the effective minimum free heap percentage.
    #[must_use]
    pub fn effective_min_heap_free_ratio(&self) -> u64 {
        self.min_heap_free_ratio.unwrap_or(DEFAULT_MIN_HEAP_FREE_RATIO)
    }

    /// Returns the effective maximum free heap percentage.
    #[must_use]
    pub fn effective_max_heap_free_ratio(&self) -> u64 {
        self.max_heap_free_ratio.unwrap_or(DEFAULT_MAX_HEAP_FREE_RATIO)
    }

    /// Returns whether adaptive sizing is active for this scenario.
    #[must_use]
    pub fn adaptive_sizing(&self) -> bool {
        self.collector == CollectorVariant::ParallelScavenge
            && self.use_adaptive_size_policy.unwrap_or(true)
    }

    /// Returns whether the heap shrinks in steps after full collections.
    #[must_use]
    pub fn shrinks_in_steps(&self) -> bool {
        self.shrink_heap_in_steps.unwrap_or(true)
    }
}

/// Treats an explicit zero as unset.
fn non_zero(value: Option<u64>) -> Option<u64> {
    value.filter(|value| *value != 0)
}
