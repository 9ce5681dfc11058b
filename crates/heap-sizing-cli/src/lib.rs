// crates/heap-sizing-cli/src/lib.rs
// ============================================================================
// Module: Heap Sizing CLI Library
// Description: Shared helpers for the heap sizing command-line interface.
// Purpose: Provide the message catalog and process harness to the binary.
// Dependencies: heap-sizing-core, tokio
// ============================================================================

//! ## Overview
//! Houses the message catalog used for every user-facing string and the
//! subprocess harness that launches the runtime-under-test. The binary entry
//! point (`src/main.rs`) imports both.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Subprocess harness for startup checks.
pub mod harness;
/// Message catalog and translation helpers.
pub mod i18n;
