// crates/heap-sizing-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for scenario file tests.
// Purpose: Reduce duplication across integration tests for heap-sizing-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use heap_sizing_config::ConfigError;
use heap_sizing_config::HeapSizingConfig;

/// Parses a TOML string without validating it.
pub fn config_from_toml(toml_str: &str) -> Result<HeapSizingConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Renders one `[[scenarios]]` table with the given body lines.
pub fn scenario_table(name: &str, body: &str) -> String {
    format!("[[scenarios]]\nname = \"{name}\"\n{body}\n")
}

/// Asserts that a result is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
