// crates/heap-sizing-core/src/lib.rs
// ============================================================================
// Module: Heap Sizing Core Library
// Description: Public API surface for the heap sizing policy and verifier.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Heap sizing core models a generational collector's sizing policy as a
//! pure calculator and checks live runtimes against it. The runtime under
//! test and its process launcher are reached only through the traits in
//! [`interfaces`]; nothing here spawns processes or implements a collector.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AllocationFailure;
pub use interfaces::AllocationTarget;
pub use interfaces::HarnessError;
pub use interfaces::LaunchOutput;
pub use interfaces::ProcessHarness;
pub use interfaces::TargetHandle;
pub use runtime::AllocationWorkloadDriver;
pub use runtime::Comparison;
pub use runtime::ConformanceVerifier;
pub use runtime::MemoryUsageProbe;
pub use runtime::ProbeError;
pub use runtime::SamplePoint;
pub use runtime::StartupVerdict;
pub use runtime::VerificationLog;
pub use runtime::VerificationOutcome;
pub use runtime::VerificationRequest;
pub use runtime::VerifyError;
pub use runtime::WorkloadConfig;
pub use runtime::check_startup;
pub use runtime::compute_expected_layout;
pub use runtime::probe_usage;
pub use runtime::verify;
