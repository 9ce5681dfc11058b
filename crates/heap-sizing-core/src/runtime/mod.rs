// crates/heap-sizing-core/src/runtime/mod.rs
// ============================================================================
// Module: Heap Sizing Runtime
// Description: Sizing calculator, probe, workload driver, and verifier.
// Purpose: Compute expected layouts and check live targets against them.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the sizing policy calculator and the
//! verification protocol around it. Every surface (library callers, the
//! CLI, startup checks) computes layouts through the same calculator.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod comparator;
pub mod log;
pub mod policy;
pub mod probe;
pub mod startup;
pub mod verifier;
pub mod workload;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use comparator::Comparison;
pub use comparator::Expectation;
pub use comparator::Quantity;
pub use comparator::Relation;
pub use comparator::SamplePoint;
pub use log::FileVerificationLog;
pub use log::MemoryVerificationLog;
pub use log::NoopVerificationLog;
pub use log::StderrVerificationLog;
pub use log::VerificationEvent;
pub use log::VerificationEventKind;
pub use log::VerificationLog;
pub use policy::compute_expected_layout;
pub use probe::MemoryUsageProbe;
pub use probe::ProbeError;
pub use probe::probe_usage;
pub use startup::StartupError;
pub use startup::StartupVerdict;
pub use startup::check_startup;
pub use startup::startup_tokens;
pub use verifier::ConformanceVerifier;
pub use verifier::VerificationOutcome;
pub use verifier::VerificationRequest;
pub use verifier::VerifierPhase;
pub use verifier::VerifierWorkload;
pub use verifier::VerifyError;
pub use verifier::verify;
pub use workload::AllocationWorkloadDriver;
pub use workload::IterationHook;
pub use workload::IterationReport;
pub use workload::SystemBlock;
pub use workload::SystemHeap;
pub use workload::WorkloadConfig;
pub use workload::WorkloadSummary;
pub use workload::drive_allocation;
