// crates/heap-sizing-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and placeholder substitution for the CLI.
// Purpose: Centralize user-facing strings.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Every string the CLI prints goes through the [`t!`](crate::t) macro, which
//! looks the key up in a static English catalog and substitutes named
//! placeholders.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name used in message templates.
    pub key: &'static str,
    /// Value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`].
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "heap-sizing {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid: {count} scenarios."),
    ("config.scenario_missing", "Scenario {name} is not defined in the config."),
    ("config.scenario_invalid", "Scenario {name} is invalid: {error}"),
    ("layout.alignment_invalid", "Invalid {name} alignment: {error}"),
    ("layout.flags_invalid", "Invalid flag tokens: {error}"),
    ("layout.rejected", "Configuration rejected: {error}"),
    ("layout.serialize_failed", "Failed to serialize layout: {error}"),
    ("plan.serialize_failed", "Failed to serialize verification plan: {error}"),
    ("startup.harness_failed", "Failed to prepare the process harness: {error}"),
    ("startup.log_open_failed", "Failed to open verification log {path}: {error}"),
    ("startup.check_failed", "Startup check for {name} failed: {error}"),
    ("startup.serialize_failed", "Failed to serialize startup verdict: {error}"),
    ("startup.no_scenarios", "No scenarios to check."),
    ("startup.summary", "{matched} of {total} scenarios matched the calculator."),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the English catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    let mut result = template.to_string();
    for arg in args {
        result = result.replace(&format!("{{{}}}", arg.key), &arg.value);
    }
    result
}

/// Returns the static English catalog.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================
