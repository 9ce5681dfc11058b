// crates/heap-sizing-config/src/config.rs
// ============================================================================
// Module: Heap Sizing Configuration
// Description: Scenario file loading and validation.
// Purpose: Provide strict, fail-closed parsing of heap-sizing.toml.
// Dependencies: heap-sizing-core, serde, toml
// ============================================================================

//! ## Overview
//! A scenario file describes the runtime-under-test (alignment facts,
//! ergonomic baseline, startup arguments) and a list of named scenarios.
//! Each scenario folds its flag tokens and explicit sizes into a
//! [`SizingConfig`]. Loading enforces size, encoding, and path limits before
//! parsing; every value is validated before the file is handed to a caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use heap_sizing_core::Alignment;
use heap_sizing_core::CollectorVariant;
use heap_sizing_core::ConformanceCheck;
use heap_sizing_core::HeapBaseline;
use heap_sizing_core::SizingConfig;
use heap_sizing_core::ToleranceBand;
use heap_sizing_core::VerificationRequest;
use heap_sizing_core::compute_expected_layout;
use heap_sizing_core::parse_size;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "heap-sizing.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "HEAP_SIZING_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of scenarios in one file.
pub(crate) const MAX_SCENARIOS: usize = 256;
/// Maximum scenario name length.
pub(crate) const MAX_SCENARIO_NAME_LENGTH: usize = 64;
/// Maximum number of flag tokens per scenario.
pub(crate) const MAX_FLAG_TOKENS: usize = 64;
/// Maximum number of trailing startup arguments.
pub(crate) const MAX_STARTUP_ARGS: usize = 64;
/// Default startup timeout in milliseconds.
pub(crate) const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 30_000;
/// Minimum startup timeout in milliseconds.
pub(crate) const MIN_STARTUP_TIMEOUT_MS: u64 = 100;
/// Maximum startup timeout in milliseconds.
pub(crate) const MAX_STARTUP_TIMEOUT_MS: u64 = 600_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Heap sizing scenario file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeapSizingConfig {
    /// Runtime-under-test facts.
    #[serde(default)]
    pub target: TargetConfig,
    /// Defaults shared by every scenario.
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Verification event sink.
    #[serde(default)]
    pub log: LogConfig,
    /// Named scenarios in file order.
    #[serde(default)]
    pub scenarios: Vec<ScenarioConfig>,
}

impl HeapSizingConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target.validate()?;
        self.defaults.validate()?;
        self.log.validate()?;
        if self.scenarios.len() > MAX_SCENARIOS {
            return Err(ConfigError::Invalid(format!(
                "too many scenarios (max {MAX_SCENARIOS})"
            )));
        }
        let alignment = self.target.alignment()?;
        let baseline = self.target.baseline()?;
        let mut names = BTreeSet::new();
        for scenario in &self.scenarios {
            scenario.validate(&alignment, baseline)?;
            if !names.insert(scenario.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate scenario name: {}",
                    scenario.name
                )));
            }
        }
        Ok(())
    }

    /// Returns the scenario with the given name.
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&ScenarioConfig> {
        self.scenarios.iter().find(|scenario| scenario.name == name)
    }

    /// Returns the tolerance a scenario runs with.
    #[must_use]
    pub fn tolerance_for(&self, scenario: &ScenarioConfig) -> ToleranceBand {
        scenario.tolerance.unwrap_or(self.defaults.tolerance)
    }

    /// Builds one verification request per check listed by a scenario.
    ///
    /// Requests carry the file's alignment facts and the scenario's effective
    /// tolerance, and are named `<scenario>/<check>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the target facts or the scenario's flag
    /// tokens are invalid.
    pub fn verification_requests(
        &self,
        scenario: &ScenarioConfig,
    ) -> Result<Vec<VerificationRequest>, ConfigError> {
        let alignment = self.target.alignment()?;
        let config = scenario.sizing_config(self.target.baseline()?)?;
        let tolerance = self.tolerance_for(scenario);
        Ok(scenario
            .checks
            .iter()
            .map(|check| {
                VerificationRequest::new(
                    format!("{}/{}", scenario.name, check.as_str()),
                    config.clone(),
                    *check,
                )
                .with_alignment(alignment)
                .with_tolerance(tolerance)
            })
            .collect())
    }
}

/// Runtime-under-test facts.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Space alignment as a size literal.
    #[serde(default = "default_space_alignment")]
    pub space_alignment: String,
    /// Heap alignment as a size literal.
    #[serde(default = "default_heap_alignment")]
    pub heap_alignment: String,
    /// Initial heap used when a scenario sets no bound.
    #[serde(default = "default_baseline_initial_heap")]
    pub baseline_initial_heap: String,
    /// Maximum heap used when a scenario sets no bound.
    #[serde(default = "default_baseline_max_heap")]
    pub baseline_max_heap: String,
    /// Tokens appended after the scenario flags when launching the target.
    #[serde(default = "default_startup_args")]
    pub startup_args: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            space_alignment: default_space_alignment(),
            heap_alignment: default_heap_alignment(),
            baseline_initial_heap: default_baseline_initial_heap(),
            baseline_max_heap: default_baseline_max_heap(),
            startup_args: default_startup_args(),
        }
    }
}

impl TargetConfig {
    /// Returns the parsed alignment facts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a literal is malformed or not a non-zero
    /// power of two.
    pub fn alignment(&self) -> Result<Alignment, ConfigError> {
        let space = power_of_two_size("target.space_alignment", &self.space_alignment)?;
        let heap = power_of_two_size("target.heap_alignment", &self.heap_alignment)?;
        let alignment = Alignment::new(space, heap);
        alignment.validate().map_err(|err| ConfigError::Invalid(format!("target alignment: {err}")))?;
        Ok(alignment)
    }

    /// Returns the parsed ergonomic baseline.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a literal is malformed, zero, or the
    /// initial size exceeds the maximum.
    pub fn baseline(&self) -> Result<HeapBaseline, ConfigError> {
        let initial_heap = size_field("target.baseline_initial_heap", &self.baseline_initial_heap)?;
        let max_heap = size_field("target.baseline_max_heap", &self.baseline_max_heap)?;
        if initial_heap == 0 || max_heap == 0 {
            return Err(ConfigError::Invalid("target baseline sizes must be non-zero".to_string()));
        }
        if initial_heap > max_heap {
            return Err(ConfigError::Invalid(
                "target.baseline_initial_heap must not exceed target.baseline_max_heap"
                    .to_string(),
            ));
        }
        Ok(HeapBaseline {
            initial_heap,
            max_heap,
        })
    }

    /// Validates target facts.
    fn validate(&self) -> Result<(), ConfigError> {
        self.alignment()?;
        self.baseline()?;
        if self.startup_args.len() > MAX_STARTUP_ARGS {
            return Err(ConfigError::Invalid(format!(
                "target.startup_args exceeds max entries ({MAX_STARTUP_ARGS})"
            )));
        }
        if self.startup_args.iter().any(|arg| arg.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "target.startup_args entries must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Defaults shared by every scenario.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Tolerance applied when a scenario sets none.
    #[serde(default)]
    pub tolerance: ToleranceBand,
    /// Deadline for one target launch in milliseconds.
    #[serde(default = "default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            tolerance: ToleranceBand::default(),
            startup_timeout_ms: DEFAULT_STARTUP_TIMEOUT_MS,
        }
    }
}

impl DefaultsConfig {
    /// Validates shared defaults.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_tolerance("defaults.tolerance", self.tolerance)?;
        if !(MIN_STARTUP_TIMEOUT_MS ..= MAX_STARTUP_TIMEOUT_MS).contains(&self.startup_timeout_ms)
        {
            return Err(ConfigError::Invalid(format!(
                "defaults.startup_timeout_ms must be between {MIN_STARTUP_TIMEOUT_MS} and \
                 {MAX_STARTUP_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

/// Verification event sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSink {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Events are dropped.
    None,
}

/// Verification log configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: LogSink,
    /// Output path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl LogConfig {
    /// Validates sink selection.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (LogSink::File, Some(path)) => validate_path_string("log.path", path),
            (LogSink::File, None) => {
                Err(ConfigError::Invalid("log.path is required for the file sink".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("log.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

/// Heap bounds given directly as size literals.
///
/// Applied after the flag tokens, so they win over the same flag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExplicitSizes {
    /// Minimum heap size.
    #[serde(default)]
    pub min_heap: Option<String>,
    /// Initial heap size.
    #[serde(default)]
    pub initial_heap: Option<String>,
    /// Maximum heap size.
    #[serde(default)]
    pub max_heap: Option<String>,
    /// Initial young generation size.
    #[serde(default)]
    pub new_size: Option<String>,
    /// Maximum young generation size.
    #[serde(default)]
    pub max_new_size: Option<String>,
}

impl ExplicitSizes {
    /// Returns a copy of `config` with every set size applied.
    fn apply(&self, config: SizingConfig, scenario: &str) -> Result<SizingConfig, ConfigError> {
        let parse = |field: &str, value: Option<&String>| {
            value
                .map(|literal| size_field(&format!("scenarios.{scenario}.sizes.{field}"), literal))
                .transpose()
        };
        Ok(SizingConfig {
            min_heap: parse("min_heap", self.min_heap.as_ref())?.or(config.min_heap),
            initial_heap: parse("initial_heap", self.initial_heap.as_ref())?.or(config.initial_heap),
            max_heap: parse("max_heap", self.max_heap.as_ref())?.or(config.max_heap),
            new_size: parse("new_size", self.new_size.as_ref())?.or(config.new_size),
            max_new_size: parse("max_new_size", self.max_new_size.as_ref())?.or(config.max_new_size),
            ..config
        })
    }
}

/// One named sizing scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Scenario name, unique within the file.
    pub name: String,
    /// Collector selection; placed ahead of the flag tokens when set.
    #[serde(default)]
    pub collector: Option<CollectorVariant>,
    /// Runtime flag tokens in command-line order.
    #[serde(default)]
    pub flags: Vec<String>,
    /// Sizes overriding the flag tokens.
    #[serde(default)]
    pub sizes: ExplicitSizes,
    /// Checks to verify for this scenario.
    #[serde(default)]
    pub checks: Vec<ConformanceCheck>,
    /// Whether the runtime is expected to start with this configuration.
    #[serde(default)]
    pub expect_start: Option<bool>,
    /// Tolerance overriding the file default.
    #[serde(default)]
    pub tolerance: Option<ToleranceBand>,
}

impl ScenarioConfig {
    /// Folds the scenario into a sizing configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a flag token or size literal is invalid.
    pub fn sizing_config(&self, baseline: HeapBaseline) -> Result<SizingConfig, ConfigError> {
        let selection =
            self.collector.map(|collector| format!("-XX:+{}", collector.selection_flag()));
        let tokens: Vec<&str> = selection
            .iter()
            .map(String::as_str)
            .chain(self.flags.iter().map(String::as_str))
            .collect();
        let folded = SizingConfig::from_tokens(&tokens).map_err(|err| {
            ConfigError::Invalid(format!("scenarios.{}.flags: {err}", self.name))
        })?;
        let config = self.sizes.apply(folded, &self.name)?;
        Ok(SizingConfig {
            baseline,
            ..config
        })
    }

    /// Validates the scenario against the target facts.
    fn validate(&self, alignment: &Alignment, baseline: HeapBaseline) -> Result<(), ConfigError> {
        validate_scenario_name(&self.name)?;
        if self.flags.len() > MAX_FLAG_TOKENS {
            return Err(ConfigError::Invalid(format!(
                "scenarios.{}.flags exceeds max entries ({MAX_FLAG_TOKENS})",
                self.name
            )));
        }
        if let Some(tolerance) = self.tolerance {
            validate_tolerance(&format!("scenarios.{}.tolerance", self.name), tolerance)?;
        }
        let mut checks = BTreeSet::new();
        for check in &self.checks {
            if !checks.insert(check.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "scenarios.{} lists check {} twice",
                    self.name,
                    check.as_str()
                )));
            }
        }
        let config = self.sizing_config(baseline)?;
        if let Some(expected) = self.expect_start {
            let accepted = compute_expected_layout(&config, alignment).is_ok();
            if accepted != expected {
                return Err(ConfigError::Invalid(format!(
                    "scenarios.{} expects start = {expected} but the calculator {}",
                    self.name,
                    if accepted { "accepts it" } else { "rejects it" }
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading config.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Validation error.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default space alignment literal.
fn default_space_alignment() -> String {
    "512k".to_string()
}

/// Default heap alignment literal.
fn default_heap_alignment() -> String {
    "2m".to_string()
}

/// Default baseline initial heap literal.
fn default_baseline_initial_heap() -> String {
    "64m".to_string()
}

/// Default baseline maximum heap literal.
fn default_baseline_max_heap() -> String {
    "1g".to_string()
}

/// Default trailing startup arguments.
fn default_startup_args() -> Vec<String> {
    vec!["-version".to_string()]
}

/// Default startup timeout.
const fn default_startup_timeout_ms() -> u64 {
    DEFAULT_STARTUP_TIMEOUT_MS
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a scenario name.
fn validate_scenario_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.len() > MAX_SCENARIO_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "scenario name must be 1 to {MAX_SCENARIO_NAME_LENGTH} characters"
        )));
    }
    let allowed =
        |byte: u8| byte.is_ascii_lowercase() || byte.is_ascii_digit() || matches!(byte, b'-' | b'_');
    if !name.bytes().all(allowed) {
        return Err(ConfigError::Invalid(format!(
            "scenario name {name} must use only a-z, 0-9, '-' and '_'"
        )));
    }
    Ok(())
}

/// Rejects relative tolerances above one hundred percent.
fn validate_tolerance(field: &str, tolerance: ToleranceBand) -> Result<(), ConfigError> {
    match tolerance {
        ToleranceBand::Relative {
            percent,
        } if percent > 100 => {
            Err(ConfigError::Invalid(format!("{field} percent must be at most 100")))
        }
        _ => Ok(()),
    }
}

/// Parses a size literal for a named field.
fn size_field(field: &str, literal: &str) -> Result<u64, ConfigError> {
    parse_size(literal).map_err(|err| ConfigError::Invalid(format!("{field}: {err}")))
}

/// Parses a size literal that must be a non-zero power of two.
fn power_of_two_size(field: &str, literal: &str) -> Result<u64, ConfigError> {
    let value = size_field(field, literal)?;
    if !value.is_power_of_two() {
        return Err(ConfigError::Invalid(format!("{field} must be a non-zero power of two")));
    }
    Ok(value)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
