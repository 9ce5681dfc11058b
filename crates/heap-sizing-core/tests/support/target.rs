// crates/heap-sizing-core/tests/support/target.rs
// ============================================================================
// Module: Simulated Target
// Description: In-memory heap model implementing the target seams.
// ============================================================================
//! ## Overview
//! [`SimulatedTarget`] models pool accounting for one collector variant: it
//! commits generations according to an expected layout, grows the heap under
//! allocation pressure, keeps survivor occupancy at the target percentage on
//! young collections, and shrinks towards the free-ratio bound on full
//! collections (halving the excess per cycle when shrinking in steps). It does
//! not collect anything; blocks report their own release through a shared
//! live-byte counter.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::cell::Cell;
use std::rc::Rc;

use heap_sizing_core::AllocationFailure;
use heap_sizing_core::AllocationTarget;
use heap_sizing_core::Alignment;
use heap_sizing_core::CollectionKind;
use heap_sizing_core::CollectorVariant;
use heap_sizing_core::ExpectedLayout;
use heap_sizing_core::MemoryRegion;
use heap_sizing_core::PoolUsage;
use heap_sizing_core::SizingConfig;
use heap_sizing_core::SurvivorSize;
use heap_sizing_core::TargetHandle;
use heap_sizing_core::compute_expected_layout;
use heap_sizing_core::units::align_down;
use heap_sizing_core::units::align_up;

// ========================================================================
// Blocks
// ========================================================================

/// Block handed out by the simulated target.
#[derive(Debug)]
pub struct SimBlock {
    /// Accounted size.
    bytes: u64,
    /// Shared live-byte counter.
    live: Rc<Cell<u64>>,
}

impl Drop for SimBlock {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(self.bytes));
    }
}

// ========================================================================
// Simulated Target
// ========================================================================

/// Heap model started with a given sizing configuration.
#[derive(Debug)]
pub struct SimulatedTarget {
    /// Layout the model commits against.
    layout: ExpectedLayout,
    /// Collector names reported by telemetry.
    names: Vec<String>,
    /// Pools hidden from telemetry.
    hidden: Vec<String>,
    /// Extra bytes reported as committed survivor space (taken from eden).
    survivor_skew: u64,
    /// Whether full collections give committed memory back.
    shrinks: bool,
    /// Live bytes held by outstanding blocks.
    live: Rc<Cell<u64>>,
    /// Committed heap bytes.
    heap_committed: u64,
    /// Bytes allocated into eden since the last collection.
    eden_used: u64,
    /// Bytes kept in survivor space by the last young collection.
    survivor_used: u64,
    /// Bytes promoted into the old generation.
    old_used: u64,
    /// Collections requested so far.
    collections: Vec<CollectionKind>,
}

impl SimulatedTarget {
    /// Starts a target with the configuration and alignment.
    pub fn start(config: &SizingConfig, alignment: Alignment) -> Self {
        let layout = compute_expected_layout(config, &alignment).unwrap();
        let names = layout.collector.collector_names().iter().map(ToString::to_string).collect();
        Self {
            heap_committed: layout.initial_heap,
            layout,
            names,
            hidden: Vec::new(),
            survivor_skew: 0,
            shrinks: true,
            live: Rc::default(),
            eden_used: 0,
            survivor_used: 0,
            old_used: 0,
            collections: Vec::new(),
        }
    }

    /// Reports a different collector's names.
    pub fn reporting_collector(mut self, collector: CollectorVariant) -> Self {
        self.names = collector.collector_names().iter().map(ToString::to_string).collect();
        self
    }

    /// Hides one region's pool from telemetry.
    pub fn hiding(mut self, region: MemoryRegion) -> Self {
        self.hidden.push(self.layout.collector.pool_name(region).to_string());
        self
    }

    /// Reports `bytes` more committed survivor space than the policy gives.
    pub fn with_survivor_skew(mut self, bytes: u64) -> Self {
        self.survivor_skew = bytes;
        self
    }

    /// Keeps committed memory after full collections.
    pub fn without_shrinking(mut self) -> Self {
        self.shrinks = false;
        self
    }

    /// Returns the layout the model commits against.
    pub fn layout(&self) -> &ExpectedLayout {
        &self.layout
    }

    /// Returns the collections requested so far.
    pub fn collections(&self) -> &[CollectionKind] {
        &self.collections
    }

    /// Returns the live bytes held by outstanding blocks.
    pub fn live_bytes(&self) -> u64 {
        self.live.get()
    }

    /// Whole-heap commit granularity.
    fn granularity(&self) -> u64 {
        let heap = self.layout.alignment.heap_alignment;
        self.layout.region_size.map_or(heap, |region| region.max(heap))
    }

    /// Young generation commit granularity.
    fn young_unit(&self) -> u64 {
        match self.layout.collector {
            CollectorVariant::SingleThreaded => self.layout.alignment.space_alignment,
            CollectorVariant::ParallelScavenge => self.layout.alignment.heap_alignment,
            CollectorVariant::RegionBased => self.layout.sizing_unit(),
        }
    }

    /// Committed young generation for the current heap size.
    fn young_committed(&self) -> u64 {
        let layout = &self.layout;
        let growth = align_down(
            self.heap_committed.saturating_sub(layout.initial_heap) / (layout.new_ratio + 1),
            self.young_unit(),
        );
        (layout.new_size + growth).clamp(layout.new_size, layout.max_young_size)
    }

    /// Survivor capacity in bytes for a young size.
    fn survivor_capacity(&self, young: u64) -> u64 {
        match self.layout.survivor_size_for_young(young) {
            SurvivorSize::Bytes {
                size,
            } => size,
            SurvivorSize::Regions {
                count,
            } => count * self.layout.sizing_unit(),
        }
    }

    /// Committed bytes of one survivor space.
    fn survivor_committed(&self, young: u64) -> u64 {
        if self.layout.collector.has_paired_survivors() {
            self.survivor_capacity(young)
        } else {
            align_up(self.survivor_used, self.layout.sizing_unit()).min(young)
        }
    }

    /// Committed eden bytes.
    fn eden_committed(&self, young: u64) -> u64 {
        let survivor = self.survivor_committed(young);
        if self.layout.collector.has_paired_survivors() {
            young.saturating_sub(2 * survivor)
        } else {
            young.saturating_sub(survivor)
        }
    }

    /// Moves live young bytes into survivor space up to the target
    /// occupancy and promotes the rest.
    fn collect_young(&mut self) {
        let live = self.live.get();
        let young_live = (self.survivor_used + self.eden_used).min(live);
        let capacity = self.survivor_capacity(self.young_committed());
        let keep = young_live.min(self.layout.target_survivor_occupancy(capacity));
        self.old_used = live - keep;
        self.survivor_used = keep;
        self.eden_used = 0;
    }

    /// Compacts everything into the old generation and shrinks the heap.
    fn collect_full(&mut self) {
        self.old_used = self.live.get();
        self.survivor_used = 0;
        self.eden_used = 0;
        let layout = &self.layout;
        let granularity = self.granularity();
        let live_percent = 100 - layout.max_heap_free_ratio;
        let desired = if live_percent == 0 {
            layout.max_heap
        } else {
            align_up(self.old_used * 100 / live_percent, granularity)
        }
        .clamp(layout.min_heap, layout.max_heap);
        if self.shrinks && self.heap_committed > desired {
            self.heap_committed = if layout.shrink_cycles > 1 {
                let step = align_up((self.heap_committed - desired).div_ceil(2), granularity);
                self.heap_committed.saturating_sub(step).max(desired)
            } else {
                desired
            };
        }
    }
}

impl TargetHandle for SimulatedTarget {
    fn collector_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn pool_usage(&self, pool: &str) -> Option<PoolUsage> {
        if self.hidden.iter().any(|hidden| hidden == pool) {
            return None;
        }
        let collector = self.layout.collector;
        let region = MemoryRegion::ALL.into_iter().find(|region| collector.pool_name(*region) == pool)?;
        let layout = &self.layout;
        let young = self.young_committed();
        let paired = collector.has_paired_survivors();
        let survivor_max = layout.max_survivor_size.unwrap_or_else(|| {
            if paired { self.survivor_capacity(layout.max_young_size) } else { layout.max_young_size }
        });
        let usage = match region {
            MemoryRegion::Eden => PoolUsage::new(
                self.eden_committed(layout.new_size),
                self.eden_used,
                self.eden_committed(young)
                    .saturating_sub(if paired { 2 * self.survivor_skew } else { self.survivor_skew }),
                layout.max_young_size.saturating_sub(if paired { 2 * survivor_max } else { 0 }),
            ),
            MemoryRegion::Survivor => PoolUsage::new(
                self.survivor_committed(layout.new_size),
                self.survivor_used,
                self.survivor_committed(young) + self.survivor_skew,
                survivor_max,
            ),
            MemoryRegion::Old => PoolUsage::new(
                layout.old_size,
                self.old_used,
                self.heap_committed.saturating_sub(young),
                layout.max_heap - layout.new_size,
            ),
        };
        Some(usage)
    }

    fn alignment(&self) -> Alignment {
        self.layout.alignment
    }

    fn request_collection(&mut self, kind: CollectionKind) {
        self.collections.push(kind);
        match kind {
            CollectionKind::Young => self.collect_young(),
            CollectionKind::Full => self.collect_full(),
        }
    }
}

impl AllocationTarget for SimulatedTarget {
    type Block = SimBlock;

    fn allocate(&mut self, bytes: u64) -> Result<SimBlock, AllocationFailure> {
        let live = self.live.get();
        if live + bytes > self.layout.max_heap {
            return Err(AllocationFailure {
                requested: bytes,
            });
        }
        let eden = self.eden_committed(self.young_committed());
        if self.eden_used > 0 && self.eden_used + bytes > eden {
            self.collect_young();
        }
        self.eden_used += bytes;
        self.live.set(live + bytes);
        let demand = align_up(live + bytes + self.layout.new_size, self.granularity());
        self.heap_committed = self.heap_committed.max(demand.min(self.layout.max_heap));
        Ok(SimBlock {
            bytes,
            live: Rc::clone(&self.live),
        })
    }
}
