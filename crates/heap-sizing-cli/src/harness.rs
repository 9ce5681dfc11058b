// crates/heap-sizing-cli/src/harness.rs
// ============================================================================
// Module: Subprocess Harness
// Description: Launches the runtime-under-test as a child process.
// Purpose: Implement the startup-check harness with a hard deadline.
// Dependencies: heap-sizing-core, tokio
// ============================================================================

//! ## Overview
//! [`CommandHarness`] spawns the configured program with the rendered flag
//! tokens, captures its output, and kills it if it outlives the deadline.
//! The harness owns a current-thread tokio runtime so the blocking
//! [`ProcessHarness`] contract can be served from synchronous callers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use heap_sizing_core::HarnessError;
use heap_sizing_core::LaunchOutput;
use heap_sizing_core::ProcessHarness;
use tokio::process::Command;
use tokio::runtime::Builder;
use tokio::runtime::Runtime;

// ============================================================================
// SECTION: Flag Rendering
// ============================================================================

/// Renders one flag as a runtime token.
///
/// Booleans use the `+`/`-` switch form; every other value uses `Name=value`.
#[must_use]
pub fn render_flag_token(name: &str, value: &str) -> String {
    match value {
        "true" => format!("-XX:+{name}"),
        "false" => format!("-XX:-{name}"),
        _ => format!("-XX:{name}={value}"),
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Process harness backed by `tokio::process`.
pub struct CommandHarness {
    /// Program launched for every check.
    program: PathBuf,
    /// Deadline for one launch.
    timeout: Duration,
    /// Runtime driving the child process.
    runtime: Runtime,
}

impl CommandHarness {
    /// Creates a harness for `program` with a per-launch deadline.
    ///
    /// # Errors
    ///
    /// Returns an error when the tokio runtime cannot be built.
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> std::io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            program: program.into(),
            timeout,
            runtime,
        })
    }

    /// Returns the launched program.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the per-launch deadline in milliseconds.
    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl ProcessHarness for CommandHarness {
    fn flag_token(&self, name: &str, value: &str) -> String {
        render_flag_token(name, value)
    }

    fn launch(&self, tokens: &[String]) -> Result<LaunchOutput, HarnessError> {
        let mut command = Command::new(&self.program);
        command.args(tokens).stdin(Stdio::null()).kill_on_drop(true);
        let output = self
            .runtime
            .block_on(async { tokio::time::timeout(self.timeout, command.output()).await })
            .map_err(|_| HarnessError::Timeout {
                timeout_ms: self.timeout_ms(),
            })?
            .map_err(|err| HarnessError::Spawn(err.to_string()))?;
        let exit_code = output
            .status
            .code()
            .ok_or_else(|| HarnessError::Terminated(output.status.to_string()))?;
        // Refusal messages may land on either stream.
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(LaunchOutput {
            exit_code,
            stdout: text,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
