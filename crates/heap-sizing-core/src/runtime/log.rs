// crates/heap-sizing-core/src/runtime/log.rs
// ============================================================================
// Module: Verification Event Log
// Description: Structured verification events and JSON-lines sinks.
// Purpose: Record phase transitions, samples, and verdicts for later review.
// Dependencies: crate::{core, runtime}, serde, serde_json
// ============================================================================

//! ## Overview
//! Verification runs emit [`VerificationEvent`] payloads through a
//! [`VerificationLog`] sink. Sinks serialize each event as one JSON object
//! per line. Sink failures are swallowed; logging never changes a verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::ObservedUsage;
use crate::runtime::comparator::Comparison;
use crate::runtime::comparator::SamplePoint;
use crate::runtime::verifier::VerifierPhase;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Verification event payload.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationEvent {
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Scenario the event belongs to.
    pub scenario: String,
    /// Event body.
    #[serde(flatten)]
    pub kind: VerificationEventKind,
}

/// Event bodies, tagged by the `event` field.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VerificationEventKind {
    /// The verifier entered a new phase.
    PhaseEntered {
        /// Phase entered.
        phase: VerifierPhase,
    },
    /// A usage snapshot was taken.
    UsageSampled {
        /// Sample point.
        point: SamplePoint,
        /// Snapshot contents.
        usage: ObservedUsage,
    },
    /// One expected-versus-observed comparison was evaluated.
    Comparison {
        /// Comparison record.
        comparison: Comparison,
    },
    /// The run reached a terminal outcome.
    Outcome {
        /// Outcome label.
        outcome: &'static str,
        /// Failure count or inconclusive reason.
        detail: Option<String>,
    },
    /// A startup conformance launch finished.
    StartupCheck {
        /// Whether the calculator expected the runtime to start.
        expected_start: bool,
        /// Exit code reported by the harness.
        exit_code: i32,
        /// Whether the exit code agreed with the expectation.
        matched: bool,
        /// Whether the refusal message appeared in stdout, when one applies.
        refusal_reported: Option<bool>,
    },
}

impl VerificationEvent {
    /// Creates a new event with a consistent timestamp.
    #[must_use]
    pub fn new(scenario: &str, kind: VerificationEventKind) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            timestamp_ms,
            scenario: scenario.to_string(),
            kind,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for verification events.
pub trait VerificationLog: Send + Sync {
    /// Record a verification event.
    fn record(&self, event: &VerificationEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct StderrVerificationLog;

impl VerificationLog for StderrVerificationLog {
    fn record(&self, event: &VerificationEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that logs JSON lines to a file.
pub struct FileVerificationLog {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileVerificationLog {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl VerificationLog for FileVerificationLog {
    fn record(&self, event: &VerificationEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op sink.
pub struct NoopVerificationLog;

impl VerificationLog for NoopVerificationLog {
    fn record(&self, _event: &VerificationEvent) {}
}

/// Sink that keeps events in memory for callers that report history.
#[derive(Default)]
pub struct MemoryVerificationLog {
    /// Recorded events in arrival order.
    events: Mutex<Vec<VerificationEvent>>,
}

impl MemoryVerificationLog {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<VerificationEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl VerificationLog for MemoryVerificationLog {
    fn record(&self, event: &VerificationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
