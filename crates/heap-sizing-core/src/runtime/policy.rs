// crates/heap-sizing-core/src/runtime/policy.rs
// ============================================================================
// Module: Sizing Policy Calculator
// Description: Closed-form heap, generation, and survivor sizing rules.
// Purpose: Compute the expected layout for a scenario without touching a target.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! [`compute_expected_layout`] is a pure function of a [`SizingConfig`] and
//! an [`Alignment`]. It validates the configuration the same way the
//! runtime does at startup, so an `Err` here corresponds to a runtime that
//! refuses to start, and an `Ok` layout is what a started runtime should
//! report once its collector has run.
//!
//! Resolution order: ratios and ranges, region size, heap bounds, young
//! generation, survivors, tenuring.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Alignment;
use crate::core::CollectorVariant;
use crate::core::ExpectedLayout;
use crate::core::HeapBound;
use crate::core::SizingConfig;
use crate::core::SizingError;
use crate::core::SurvivorSize;
use crate::core::TenuringThresholds;
use crate::core::config::DEFAULT_INITIAL_TENURING_THRESHOLD;
use crate::core::config::MAX_TENURING_THRESHOLD_LIMIT;
use crate::core::config::NEVER_TENURE_THRESHOLD;
use crate::core::flags;
use crate::core::units::M;
use crate::core::units::align_down;
use crate::core::units::align_up;
use crate::core::units::prev_power_of_two;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Smallest region size the region-based collector accepts.
pub const MIN_REGION_SIZE: u64 = M;
/// Largest region size the region-based collector accepts.
pub const MAX_REGION_SIZE: u64 = 512 * M;
/// Largest ergonomically chosen region size.
pub const MAX_ERGONOMIC_REGION_SIZE: u64 = 32 * M;
/// Region count the ergonomic region size aims for.
pub const TARGET_REGION_COUNT: u64 = 2048;
/// Default remembered-set bucket maximum.
pub const DEFAULT_HOWL_MAX_NUM_BUCKETS: u64 = 8;
/// Full collections needed to shrink a heap that shrinks in steps.
pub const STEPPED_SHRINK_CYCLES: u32 = 10;
/// Largest heap free percentage.
const MAX_PERCENT: u64 = 100;

// ============================================================================
// SECTION: Calculator
// ============================================================================

/// Computes the expected layout for a scenario.
///
/// # Errors
///
/// Returns [`SizingError`] when the configuration would make the runtime
/// refuse to start, or when the alignment facts are unusable.
pub fn compute_expected_layout(
    config: &SizingConfig,
    alignment: &Alignment,
) -> Result<ExpectedLayout, SizingError> {
    alignment.validate()?;
    validate_ratios(config)?;
    let (min_free, max_free) = resolve_free_ratios(config)?;
    let tenuring = resolve_tenuring(config)?;
    let raw = resolve_raw_bounds(config)?;
    let region_size = resolve_region_size(config, raw.max)?;
    validate_buckets(config)?;

    let heap_alignment = region_size.map_or(alignment.heap_alignment, |region| {
        region.max(alignment.heap_alignment)
    });
    let min_heap = align_up(raw.min, heap_alignment).max(heap_alignment);
    let initial_heap = align_up(raw.initial, heap_alignment).max(heap_alignment);
    let max_heap = align_up(raw.max, heap_alignment).max(heap_alignment);

    let young = YoungSizing {
        collector: config.collector,
        alignment: *alignment,
        region_size,
        new_ratio: config.effective_new_ratio(),
    };
    let explicit_new = config.explicit_new_size();
    let explicit_max_new = config.explicit_max_new_size();
    if let Some(new_size) = explicit_new {
        let limit = explicit_max_new.unwrap_or(max_heap);
        if new_size > limit {
            return Err(SizingError::YoungOrdering {
                new_size,
                max_new_size: limit,
            });
        }
    }

    let unit = young.unit();
    // The young limit never exceeds the heap.
    let max_new_size =
        explicit_max_new.map_or(max_heap, |size| young.align(size).min(max_heap));
    let young_ceiling =
        align_down(initial_heap.saturating_sub(heap_alignment), unit).max(unit);
    // An ergonomic young size is clamped to the limit; only an explicit one is refused.
    let new_size = explicit_new
        .map_or_else(
            || young.from_ratio(initial_heap).min(max_new_size),
            |size| young.align(size),
        )
        .min(young_ceiling)
        .max(unit);
    let max_young_size = explicit_max_new
        .map_or_else(
            || young.from_ratio(max_heap),
            |_| max_new_size.min(align_down(max_heap.saturating_sub(heap_alignment), unit)),
        )
        .max(new_size);

    let shrink_cycles = match config.collector {
        CollectorVariant::RegionBased => 1,
        CollectorVariant::SingleThreaded | CollectorVariant::ParallelScavenge => {
            if config.shrinks_in_steps() { STEPPED_SHRINK_CYCLES } else { 1 }
        }
    };

    let mut layout = ExpectedLayout {
        collector: config.collector,
        alignment: *alignment,
        min_heap,
        initial_heap,
        max_heap,
        new_size,
        max_new_size,
        max_young_size,
        old_size: initial_heap.saturating_sub(new_size),
        survivor: SurvivorSize::Bytes {
            size: 0,
        },
        max_survivor_size: None,
        region_size,
        new_ratio: young.new_ratio,
        survivor_ratio: config.effective_survivor_ratio(),
        initial_survivor_ratio: config.effective_initial_survivor_ratio(),
        min_survivor_ratio: config.effective_min_survivor_ratio(),
        adaptive_sizing: config.adaptive_sizing(),
        target_survivor_percent: config.effective_target_survivor_ratio(),
        min_heap_free_ratio: min_free,
        max_heap_free_ratio: max_free,
        tenuring,
        shrink_cycles,
    };
    layout.survivor = layout.survivor_size_for_young(new_size);
    layout.max_survivor_size = layout.max_survivor_for_young(max_young_size);
    Ok(layout)
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Rejects zero ratios and out-of-range survivor targets.
fn validate_ratios(config: &SizingConfig) -> Result<(), SizingError> {
    let ratios = [
        (flags::NEW_RATIO, config.new_ratio),
        (flags::SURVIVOR_RATIO, config.survivor_ratio),
        (flags::INITIAL_SURVIVOR_RATIO, config.initial_survivor_ratio),
        (flags::MIN_SURVIVOR_RATIO, config.min_survivor_ratio),
    ];
    for (flag, value) in ratios {
        if value == Some(0) {
            return Err(SizingError::NonPositiveRatio {
                flag,
            });
        }
    }
    let target = config.effective_target_survivor_ratio();
    if !(1 ..= MAX_PERCENT).contains(&target) {
        return Err(SizingError::OutOfRange {
            flag: flags::TARGET_SURVIVOR_RATIO,
            value: target,
            min: 1,
            max: MAX_PERCENT,
        });
    }
    if config.collector == CollectorVariant::ParallelScavenge {
        let min = config.effective_min_survivor_ratio();
        let initial = config.effective_initial_survivor_ratio();
        if min > initial {
            return Err(SizingError::PairOrdering {
                lower_flag: flags::MIN_SURVIVOR_RATIO,
                lower: min,
                upper_flag: flags::INITIAL_SURVIVOR_RATIO,
                upper: initial,
            });
        }
    }
    Ok(())
}

/// Resolves and checks the heap free percentages.
fn resolve_free_ratios(config: &SizingConfig) -> Result<(u64, u64), SizingError> {
    let min = config.effective_min_heap_free_ratio();
    let max = config.effective_max_heap_free_ratio();
    for (flag, value) in [(flags::MIN_HEAP_FREE_RATIO, min), (flags::MAX_HEAP_FREE_RATIO, max)] {
        if value > MAX_PERCENT {
            return Err(SizingError::OutOfRange {
                flag,
                value,
                min: 0,
                max: MAX_PERCENT,
            });
        }
    }
    if min > max {
        return Err(SizingError::PairOrdering {
            lower_flag: flags::MIN_HEAP_FREE_RATIO,
            lower: min,
            upper_flag: flags::MAX_HEAP_FREE_RATIO,
            upper: max,
        });
    }
    Ok((min, max))
}

/// Resolves the effective tenuring thresholds.
fn resolve_tenuring(config: &SizingConfig) -> Result<TenuringThresholds, SizingError> {
    let explicit = [
        (flags::INITIAL_TENURING_THRESHOLD, config.initial_tenuring_threshold),
        (flags::MAX_TENURING_THRESHOLD, config.max_tenuring_threshold),
    ];
    for (flag, value) in explicit {
        if let Some(value) = value.filter(|value| *value > MAX_TENURING_THRESHOLD_LIMIT) {
            return Err(SizingError::OutOfRange {
                flag,
                value,
                min: 0,
                max: MAX_TENURING_THRESHOLD_LIMIT,
            });
        }
    }
    let max = if config.never_tenure {
        NEVER_TENURE_THRESHOLD
    } else {
        config.max_tenuring_threshold.unwrap_or(MAX_TENURING_THRESHOLD_LIMIT)
    };
    let initial = match config.initial_tenuring_threshold {
        Some(initial) if initial > max => {
            return Err(SizingError::PairOrdering {
                lower_flag: flags::INITIAL_TENURING_THRESHOLD,
                lower: initial,
                upper_flag: flags::MAX_TENURING_THRESHOLD,
                upper: max,
            });
        }
        Some(initial) => initial,
        None => DEFAULT_INITIAL_TENURING_THRESHOLD.min(max),
    };
    Ok(TenuringThresholds {
        initial,
        max,
    })
}

/// Unaligned heap bounds after ergonomic defaulting.
struct RawBounds {
    /// Minimum heap size.
    min: u64,
    /// Initial heap size.
    initial: u64,
    /// Maximum heap size.
    max: u64,
}

/// Checks explicit heap bound ordering and fills in unset bounds.
///
/// Setting only one of minimum and initial forces the other to match. With
/// neither set, both follow an explicit maximum, or the ergonomic baseline
/// when no maximum is given either.
fn resolve_raw_bounds(config: &SizingConfig) -> Result<RawBounds, SizingError> {
    let min = config.explicit_min_heap();
    let initial = config.explicit_initial_heap();
    let max = config.explicit_max_heap();
    let pairs = [
        (HeapBound::Initial, initial, HeapBound::Max, max),
        (HeapBound::Min, min, HeapBound::Initial, initial),
        (HeapBound::Min, min, HeapBound::Max, max),
    ];
    for (lower, lower_value, upper, upper_value) in pairs {
        if let (Some(lower_value), Some(upper_value)) = (lower_value, upper_value)
            && lower_value > upper_value
        {
            return Err(SizingError::HeapOrdering {
                lower,
                lower_value,
                upper,
                upper_value,
            });
        }
    }
    let baseline = config.baseline;
    let max_heap = max.unwrap_or_else(|| {
        baseline.max_heap.max(initial.unwrap_or(0)).max(min.unwrap_or(0))
    });
    let (min_heap, initial_heap) = match (min, initial) {
        (Some(min), Some(initial)) => (min, initial),
        (Some(min), None) => (min, min),
        (None, Some(initial)) => (initial, initial),
        (None, None) if max.is_some() => (max_heap, max_heap),
        (None, None) => {
            let initial = baseline.initial_heap.min(max_heap);
            (initial, initial)
        }
    };
    Ok(RawBounds {
        min: min_heap,
        initial: initial_heap,
        max: max_heap,
    })
}

/// Resolves the region size for the region-based collector.
fn resolve_region_size(config: &SizingConfig, max_heap: u64) -> Result<Option<u64>, SizingError> {
    if config.collector != CollectorVariant::RegionBased {
        return Ok(None);
    }
    let Some(region) = config.region_size.filter(|size| *size != 0) else {
        let ergonomic = prev_power_of_two(max_heap / TARGET_REGION_COUNT)
            .clamp(MIN_REGION_SIZE, MAX_ERGONOMIC_REGION_SIZE);
        return Ok(Some(ergonomic));
    };
    if !region.is_power_of_two() {
        return Err(SizingError::NotPowerOfTwo {
            flag: flags::REGION_SIZE,
            value: region,
        });
    }
    if !(MIN_REGION_SIZE ..= MAX_REGION_SIZE).contains(&region) {
        return Err(SizingError::OutOfRange {
            flag: flags::REGION_SIZE,
            value: region,
            min: MIN_REGION_SIZE,
            max: MAX_REGION_SIZE,
        });
    }
    Ok(Some(region))
}

/// Checks the remembered-set bucket pair for the region-based collector.
fn validate_buckets(config: &SizingConfig) -> Result<(), SizingError> {
    if config.collector != CollectorVariant::RegionBased {
        return Ok(());
    }
    let max = config.howl_max_num_buckets.unwrap_or(DEFAULT_HOWL_MAX_NUM_BUCKETS);
    if !max.is_power_of_two() {
        return Err(SizingError::NotPowerOfTwo {
            flag: flags::HOWL_MAX_NUM_BUCKETS,
            value: max,
        });
    }
    let Some(buckets) = config.howl_num_buckets else {
        return Ok(());
    };
    if !buckets.is_power_of_two() {
        return Err(SizingError::NotPowerOfTwo {
            flag: flags::HOWL_NUM_BUCKETS,
            value: buckets,
        });
    }
    if buckets > max {
        return Err(SizingError::PairOrdering {
            lower_flag: flags::HOWL_NUM_BUCKETS,
            lower: buckets,
            upper_flag: flags::HOWL_MAX_NUM_BUCKETS,
            upper: max,
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Young Generation Sizing
// ============================================================================

/// Per-variant young generation rounding rules.
struct YoungSizing {
    /// Collector variant.
    collector: CollectorVariant,
    /// Target alignment facts.
    alignment: Alignment,
    /// Region size for the region-based collector.
    region_size: Option<u64>,
    /// Effective old/young ratio.
    new_ratio: u64,
}

impl YoungSizing {
    /// Smallest young generation increment.
    fn unit(&self) -> u64 {
        match self.collector {
            CollectorVariant::SingleThreaded => self.alignment.space_alignment,
            CollectorVariant::ParallelScavenge => self.alignment.heap_alignment,
            CollectorVariant::RegionBased => {
                self.region_size.unwrap_or(self.alignment.heap_alignment)
            }
        }
    }

    /// Young generation size implied by the ratio for a heap size.
    fn from_ratio(&self, heap: u64) -> u64 {
        self.align(heap / self.new_ratio.saturating_add(1))
    }

    /// Rounds a raw young size to the variant's granularity.
    fn align(&self, raw: u64) -> u64 {
        let space = self.alignment.space_alignment;
        match self.collector {
            CollectorVariant::SingleThreaded => align_down(raw, space).max(space),
            CollectorVariant::ParallelScavenge => {
                align_up(align_down(raw, space), self.alignment.heap_alignment)
                    .max(self.alignment.heap_alignment)
            }
            CollectorVariant::RegionBased => {
                let region = self.unit();
                (raw / region).max(1).saturating_mul(region)
            }
        }
    }
}
