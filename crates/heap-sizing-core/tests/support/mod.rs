// crates/heap-sizing-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Result alias and assertion helper for heap sizing tests.
// ============================================================================
//! ## Overview
//! Every integration suite returns [`TestResult`] so calculator, probe, and
//! verifier errors propagate with `?`, and uses [`ensure`] for conditions.

use std::error::Error;

/// Result type returned by heap sizing integration tests.
pub type TestResult = Result<(), Box<dyn Error>>;

/// Fails the test with `message` when `condition` is false.
///
/// # Errors
/// Returns the message as a boxed error when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into().into()) }
}
