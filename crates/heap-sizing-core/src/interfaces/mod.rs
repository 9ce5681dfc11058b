// crates/heap-sizing-core/src/interfaces/mod.rs
// ============================================================================
// Module: Heap Sizing Interfaces
// Description: Seams to the runtime-under-test and its process harness.
// Purpose: Define the contract surfaces the sizing runtime depends on.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The sizing runtime never talks to a managed runtime or spawns a process
//! itself. It reads telemetry through [`TargetHandle`], applies allocation
//! pressure through [`AllocationTarget`], and launches processes through
//! [`ProcessHarness`]. Implementations must report what they observe and
//! must not synthesize values they cannot read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Alignment;
use crate::core::CollectionKind;
use crate::core::PoolUsage;

// ============================================================================
// SECTION: Target Telemetry
// ============================================================================

/// Live handle onto the runtime-under-test.
pub trait TargetHandle {
    /// Returns the names of the collectors currently active in the target.
    fn collector_names(&self) -> Vec<String>;

    /// Returns usage for a named memory pool, or `None` when the pool does
    /// not exist in the target.
    fn pool_usage(&self, pool: &str) -> Option<PoolUsage>;

    /// Returns the alignment facts of the target's heap.
    fn alignment(&self) -> Alignment;

    /// Asks the target to run a collection cycle and waits for it to finish.
    fn request_collection(&mut self, kind: CollectionKind);
}

// ============================================================================
// SECTION: Allocation
// ============================================================================

/// Allocation request the target could not satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("out of memory allocating {requested} bytes")]
pub struct AllocationFailure {
    /// Requested block size in bytes.
    pub requested: u64,
}

/// Memory the workload driver can allocate from.
///
/// Dropping a block releases it; the target reclaims it on a later
/// collection.
pub trait AllocationTarget {
    /// Handle to one retained block.
    type Block;

    /// Allocates one block of `bytes` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationFailure`] when the target is out of memory.
    fn allocate(&mut self, bytes: u64) -> Result<Self::Block, AllocationFailure>;
}

// ============================================================================
// SECTION: Process Harness
// ============================================================================

/// Exit status and captured output of a finished target process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOutput {
    /// Process exit code.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
}

/// Process harness failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// Process could not be started.
    #[error("failed to launch target: {0}")]
    Spawn(String),
    /// Process exceeded the caller-imposed deadline and was killed.
    #[error("target did not exit within {timeout_ms} ms")]
    Timeout {
        /// Deadline in milliseconds.
        timeout_ms: u64,
    },
    /// Process terminated without an exit code.
    #[error("target terminated abnormally: {0}")]
    Terminated(String),
}

/// Launches the runtime-under-test with a flag list.
pub trait ProcessHarness {
    /// Renders one configuration flag as a token the target understands.
    fn flag_token(&self, name: &str, value: &str) -> String;

    /// Launches the target and blocks until it exits.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the process cannot be run to completion.
    fn launch(&self, tokens: &[String]) -> Result<LaunchOutput, HarnessError>;
}
