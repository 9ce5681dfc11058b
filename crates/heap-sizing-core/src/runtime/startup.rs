// crates/heap-sizing-core/src/runtime/startup.rs
// ============================================================================
// Module: Startup Conformance
// Description: Launch the runtime with a scenario's flags and check acceptance.
// Purpose: Confirm the runtime starts exactly when the calculator accepts.
// Dependencies: crate::{core, interfaces, runtime}, serde, thiserror
// ============================================================================

//! ## Overview
//! The calculator decides whether a configuration is valid without a
//! process. [`check_startup`] asks the harness to launch the runtime with the
//! same configuration and compares the exit code with that decision. When the
//! configuration is invalid, the verdict also records whether the runtime
//! printed the matching refusal message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Alignment;
use crate::core::SizingConfig;
use crate::core::SizingError;
use crate::interfaces::HarnessError;
use crate::interfaces::ProcessHarness;
use crate::runtime::log::VerificationEventKind;
use crate::runtime::policy::compute_expected_layout;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of one startup conformance launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupVerdict {
    /// Whether the calculator accepted the configuration.
    pub expected_start: bool,
    /// Exit code reported by the harness.
    pub exit_code: i32,
    /// Whether the exit code agreed with the calculator.
    pub matched: bool,
    /// Calculator diagnostic when the configuration is invalid.
    pub diagnostic: Option<String>,
    /// Refusal fragment the runtime is expected to print.
    pub refusal_fragment: Option<String>,
    /// Whether the fragment appeared in stdout.
    pub refusal_reported: Option<bool>,
}

impl StartupVerdict {
    /// Returns the event payload describing this verdict.
    #[must_use]
    pub const fn event(&self) -> VerificationEventKind {
        VerificationEventKind::StartupCheck {
            expected_start: self.expected_start,
            exit_code: self.exit_code,
            matched: self.matched,
            refusal_reported: self.refusal_reported,
        }
    }
}

/// Startup conformance errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    /// The harness could not run the target.
    #[error(transparent)]
    Harness(#[from] HarnessError),
    /// The supplied alignment facts are unusable.
    #[error("cannot evaluate configuration: {0}")]
    Alignment(SizingError),
}

// ============================================================================
// SECTION: Startup Check
// ============================================================================

/// Renders the scenario's flags through the harness, followed by the
/// caller's extra tokens.
pub fn startup_tokens<H: ProcessHarness + ?Sized>(
    harness: &H,
    config: &SizingConfig,
    extra_tokens: &[String],
) -> Vec<String> {
    config
        .flag_pairs()
        .iter()
        .map(|(name, value)| harness.flag_token(name, value))
        .chain(extra_tokens.iter().cloned())
        .collect()
}

/// Launches the runtime with the scenario's flags and compares the exit code
/// with the calculator's verdict.
///
/// # Errors
///
/// Returns [`StartupError`] when the harness fails or the alignment facts
/// are unusable.
pub fn check_startup<H: ProcessHarness + ?Sized>(
    harness: &H,
    config: &SizingConfig,
    alignment: &Alignment,
    extra_tokens: &[String],
) -> Result<StartupVerdict, StartupError> {
    let rejection = match compute_expected_layout(config, alignment) {
        Ok(_) => None,
        Err(error @ SizingError::InvalidAlignment {
            ..
        }) => return Err(StartupError::Alignment(error)),
        Err(error) => Some(error),
    };
    let output = harness.launch(&startup_tokens(harness, config, extra_tokens))?;
    let expected_start = rejection.is_none();
    let started = output.exit_code == 0;
    let refusal_fragment =
        rejection.as_ref().and_then(SizingError::runtime_refusal_fragment).map(str::to_string);
    let refusal_reported =
        refusal_fragment.as_ref().map(|fragment| output.stdout.contains(fragment.as_str()));
    Ok(StartupVerdict {
        expected_start,
        exit_code: output.exit_code,
        matched: expected_start == started,
        diagnostic: rejection.map(|error| error.to_string()),
        refusal_fragment,
        refusal_reported,
    })
}
