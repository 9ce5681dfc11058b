// crates/heap-sizing-core/src/runtime/workload.rs
// ============================================================================
// Module: Allocation Workload Driver
// Description: Repeatable allocation pressure with a bounded retained set.
// Purpose: Produce garbage at a steady live size, optionally probing capacity.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! Each iteration allocates a fixed number of equally sized blocks into the
//! retained set, replacing the previous iteration's blocks slot by slot, so
//! the live size stays roughly constant while every replaced block becomes
//! garbage. The driver is single-threaded and never blocks on its own; any
//! suspension happens inside the target's allocator.
//!
//! [`AllocationWorkloadDriver::run_tolerant`] treats running out of memory as
//! a normal stop. [`SystemHeap`] is a process-allocator target with an
//! optional byte limit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use serde::Deserialize;
use serde::Serialize;

use crate::interfaces::AllocationFailure;
use crate::interfaces::AllocationTarget;

// ============================================================================
// SECTION: Configuration and Reports
// ============================================================================

/// Shape of one workload run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Number of iterations.
    pub iterations: u32,
    /// Blocks allocated (and retained) per iteration.
    pub objects_per_iteration: usize,
    /// Size of each block in bytes.
    pub bytes_per_object: u64,
}

impl WorkloadConfig {
    /// Returns the configuration that retains about `bytes` with blocks of
    /// `bytes_per_object` bytes.
    #[must_use]
    pub fn retaining(bytes: u64, bytes_per_object: u64, iterations: u32) -> Self {
        let per_object = bytes_per_object.max(1);
        let objects = usize::try_from(bytes / per_object).unwrap_or(usize::MAX);
        Self {
            iterations,
            objects_per_iteration: objects,
            bytes_per_object: per_object,
        }
    }
}

/// State passed to the per-iteration callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationReport {
    /// Zero-based iteration index.
    pub iteration: u32,
    /// Blocks currently retained.
    pub retained_objects: usize,
    /// Bytes currently retained.
    pub retained_bytes: u64,
    /// Bytes allocated since the run started.
    pub allocated_bytes: u64,
}

/// Result of one workload run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    /// Iterations that ran to completion.
    pub completed_iterations: u32,
    /// Bytes allocated during the run.
    pub allocated_bytes: u64,
    /// Bytes retained when the run ended.
    pub retained_bytes: u64,
    /// True when the run stopped on an allocation failure.
    pub stopped_early: bool,
}

// ============================================================================
// SECTION: Driver
// ============================================================================

/// Per-iteration callback invoked with the target and the iteration state.
pub type IterationHook<'a, T> = &'a mut dyn FnMut(&mut T, &IterationReport);

/// Allocation driver owning the retained set.
///
/// # Invariants
/// - The retained set is only reachable through [`Self::release`].
#[derive(Debug)]
pub struct AllocationWorkloadDriver<B> {
    /// Run shape.
    config: WorkloadConfig,
    /// Blocks kept alive between iterations.
    retained: Vec<B>,
}

impl<B> AllocationWorkloadDriver<B> {
    /// Creates a driver with an empty retained set.
    #[must_use]
    pub const fn new(config: WorkloadConfig) -> Self {
        Self {
            config,
            retained: Vec::new(),
        }
    }

    /// Returns the run shape.
    #[must_use]
    pub const fn config(&self) -> WorkloadConfig {
        self.config
    }

    /// Returns the number of bytes currently retained.
    #[must_use]
    pub fn retained_bytes(&self) -> u64 {
        u64::try_from(self.retained.len())
            .unwrap_or(u64::MAX)
            .saturating_mul(self.config.bytes_per_object)
    }

    /// Runs every iteration, failing on the first allocation failure.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationFailure`] when the target runs out of memory; the
    /// retained set keeps whatever was allocated before the failure.
    pub fn run<T>(
        &mut self,
        target: &mut T,
        on_iteration: Option<IterationHook<'_, T>>,
    ) -> Result<WorkloadSummary, AllocationFailure>
    where
        T: AllocationTarget<Block = B>,
    {
        let (summary, failure) = self.drive(target, on_iteration);
        failure.map_or(Ok(summary), Err)
    }

    /// Runs until every iteration completes or the target runs out of memory.
    pub fn run_tolerant<T>(
        &mut self,
        target: &mut T,
        on_iteration: Option<IterationHook<'_, T>>,
    ) -> WorkloadSummary
    where
        T: AllocationTarget<Block = B>,
    {
        self.drive(target, on_iteration).0
    }

    /// Drops every retained block so the next collection can reclaim them.
    pub fn release(&mut self) {
        self.retained.clear();
    }

    /// Shared iteration loop.
    fn drive<T>(
        &mut self,
        target: &mut T,
        mut on_iteration: Option<IterationHook<'_, T>>,
    ) -> (WorkloadSummary, Option<AllocationFailure>)
    where
        T: AllocationTarget<Block = B>,
    {
        let mut allocated_bytes: u64 = 0;
        let mut completed_iterations = 0;
        for iteration in 0 .. self.config.iterations {
            for slot in 0 .. self.config.objects_per_iteration {
                let block = match target.allocate(self.config.bytes_per_object) {
                    Ok(block) => block,
                    Err(failure) => {
                        let summary = WorkloadSummary {
                            completed_iterations,
                            allocated_bytes,
                            retained_bytes: self.retained_bytes(),
                            stopped_early: true,
                        };
                        return (summary, Some(failure));
                    }
                };
                allocated_bytes = allocated_bytes.saturating_add(self.config.bytes_per_object);
                if let Some(existing) = self.retained.get_mut(slot) {
                    *existing = block;
                } else {
                    self.retained.push(block);
                }
            }
            completed_iterations += 1;
            if let Some(hook) = on_iteration.as_mut() {
                let report = IterationReport {
                    iteration,
                    retained_objects: self.retained.len(),
                    retained_bytes: self.retained_bytes(),
                    allocated_bytes,
                };
                hook(target, &report);
            }
        }
        let summary = WorkloadSummary {
            completed_iterations,
            allocated_bytes,
            retained_bytes: self.retained_bytes(),
            stopped_early: false,
        };
        (summary, None)
    }
}

/// Runs one OOM-tolerant workload and releases its retained set.
pub fn drive_allocation<T: AllocationTarget>(
    target: &mut T,
    config: WorkloadConfig,
    on_iteration: Option<IterationHook<'_, T>>,
) -> WorkloadSummary {
    let mut driver = AllocationWorkloadDriver::new(config);
    let summary = driver.run_tolerant(target, on_iteration);
    driver.release();
    summary
}

// ============================================================================
// SECTION: System Heap
// ============================================================================

/// Allocation target backed by the process allocator.
///
/// Reservation is fallible, so exhaustion surfaces as [`AllocationFailure`]
/// instead of aborting the process. An optional limit caps live bytes.
#[derive(Debug, Default)]
pub struct SystemHeap {
    /// Largest number of live bytes, when capped.
    limit: Option<u64>,
    /// Live bytes across every outstanding block.
    live: Rc<Cell<u64>>,
}

impl SystemHeap {
    /// Creates an uncapped heap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a heap that refuses allocations past `limit` live bytes.
    #[must_use]
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            live: Rc::default(),
        }
    }

    /// Returns the bytes held by outstanding blocks.
    #[must_use]
    pub fn live_bytes(&self) -> u64 {
        self.live.get()
    }
}

impl AllocationTarget for SystemHeap {
    type Block = SystemBlock;

    fn allocate(&mut self, bytes: u64) -> Result<SystemBlock, AllocationFailure> {
        let failure = AllocationFailure {
            requested: bytes,
        };
        let live = self.live.get();
        if let Some(limit) = self.limit
            && live.saturating_add(bytes) > limit
        {
            return Err(failure);
        }
        let len = usize::try_from(bytes).map_err(|_| failure)?;
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(len).map_err(|_| failure)?;
        buffer.resize(len, 0);
        self.live.set(live.saturating_add(bytes));
        Ok(SystemBlock {
            buffer,
            bytes,
            live: Rc::clone(&self.live),
        })
    }
}

/// Block allocated from a [`SystemHeap`]; releases its accounting on drop.
#[derive(Debug)]
pub struct SystemBlock {
    /// Backing storage.
    buffer: Vec<u8>,
    /// Accounted size.
    bytes: u64,
    /// Shared live-byte counter.
    live: Rc<Cell<u64>>,
}

impl SystemBlock {
    /// Returns the block contents.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }
}

impl Drop for SystemBlock {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(self.bytes));
    }
}
