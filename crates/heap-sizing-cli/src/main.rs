// crates/heap-sizing-cli/src/main.rs
// ============================================================================
// Module: Heap Sizing CLI Entry Point
// Description: Command dispatcher for layout, config, plan, and startup workflows.
// Purpose: Expose the sizing calculator and startup checks from the shell.
// Dependencies: clap, heap-sizing-config, heap-sizing-core, serde, thiserror.
// ============================================================================

//! ## Overview
//! `heap-sizing` prints the expected layout for a scenario, validates scenario
//! files, and runs startup-conformance checks against a runtime program. All
//! user-facing strings are routed through the message catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use heap_sizing_cli::harness::CommandHarness;
use heap_sizing_cli::t;
use heap_sizing_config::HeapSizingConfig;
use heap_sizing_config::LogConfig;
use heap_sizing_config::LogSink;
use heap_sizing_config::ScenarioConfig;
use heap_sizing_config::config_toml_example;
use heap_sizing_core::Alignment;
use heap_sizing_core::CollectorVariant;
use heap_sizing_core::ConformanceCheck;
use heap_sizing_core::ExpectedLayout;
use heap_sizing_core::HeapBaseline;
use heap_sizing_core::SizingConfig;
use heap_sizing_core::StartupVerdict;
use heap_sizing_core::ToleranceBand;
use heap_sizing_core::VerificationLog;
use heap_sizing_core::check_startup;
use heap_sizing_core::compute_expected_layout;
use heap_sizing_core::parse_size;
use heap_sizing_core::runtime::FileVerificationLog;
use heap_sizing_core::runtime::NoopVerificationLog;
use heap_sizing_core::runtime::StderrVerificationLog;
use heap_sizing_core::runtime::VerificationEvent;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "heap-sizing", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the expected heap layout as JSON.
    Layout(LayoutCommand),
    /// Scenario file utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// List the verification requests each scenario's checks produce.
    Plan(PlanCommand),
    /// Check that the runtime starts exactly when the calculator accepts.
    Startup(StartupCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a scenario file.
    Validate(ConfigValidateCommand),
    /// Print the canonical example scenario file.
    Example,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to heap-sizing.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Collector selection for ad-hoc layouts.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum CollectorArg {
    /// Single-threaded copying collector.
    SingleThreaded,
    /// Parallel scavenging collector.
    ParallelScavenge,
    /// Region-based collector.
    RegionBased,
}

impl From<CollectorArg> for CollectorVariant {
    fn from(value: CollectorArg) -> Self {
        match value {
            CollectorArg::SingleThreaded => Self::SingleThreaded,
            CollectorArg::ParallelScavenge => Self::ParallelScavenge,
            CollectorArg::RegionBased => Self::RegionBased,
        }
    }
}

/// Arguments for layout computation.
///
/// With `--scenario` the scenario is read from the config file; otherwise the
/// layout is computed from `--collector` and `--flag` tokens.
#[derive(Args, Debug)]
struct LayoutCommand {
    /// Scenario name from the config file.
    #[arg(long, value_name = "NAME", conflicts_with_all = ["collector", "flags"])]
    scenario: Option<String>,
    /// Optional config file path (defaults to heap-sizing.toml or env override).
    #[arg(long, value_name = "PATH", requires = "scenario")]
    config: Option<PathBuf>,
    /// Collector for an ad-hoc layout.
    #[arg(long, value_enum)]
    collector: Option<CollectorArg>,
    /// Runtime flag token for an ad-hoc layout (repeatable, in order).
    #[arg(long = "flag", value_name = "TOKEN", allow_hyphen_values = true)]
    flags: Vec<String>,
    /// Space alignment for an ad-hoc layout.
    #[arg(long, value_name = "SIZE", default_value = "512k")]
    space_alignment: String,
    /// Heap alignment for an ad-hoc layout.
    #[arg(long, value_name = "SIZE", default_value = "2m")]
    heap_alignment: String,
}

/// Arguments for the verification plan.
#[derive(Args, Debug)]
struct PlanCommand {
    /// Optional config file path (defaults to heap-sizing.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Only list this scenario.
    #[arg(long, value_name = "NAME")]
    scenario: Option<String>,
}

/// Arguments for startup checks.
#[derive(Args, Debug)]
struct StartupCommand {
    /// Runtime program launched for each scenario.
    #[arg(long, value_name = "PROGRAM")]
    runtime: PathBuf,
    /// Optional config file path (defaults to heap-sizing.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Only check this scenario.
    #[arg(long, value_name = "NAME")]
    scenario: Option<String>,
    /// Per-launch deadline overriding `defaults.startup_timeout_ms`.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// One line of `plan` output.
#[derive(Debug, Serialize)]
struct PlanEntry {
    /// Request name (`<scenario>/<check>`).
    request: String,
    /// Feature under test.
    check: ConformanceCheck,
    /// Tolerance the request runs with.
    tolerance: ToleranceBand,
}

/// One line of `startup` output.
#[derive(Debug, Serialize)]
struct StartupReport<'a> {
    /// Scenario name.
    scenario: &'a str,
    /// Verdict fields.
    #[serde(flatten)]
    verdict: &'a StartupVerdict,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Layout(command) => command_layout(&command),
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Plan(command) => command_plan(&command),
        Commands::Startup(command) => command_startup(&command),
    }
}

/// Prints the top-level help text.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout_line(&help).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Layout Command
// ============================================================================

/// Computes and prints the expected layout.
fn command_layout(command: &LayoutCommand) -> CliResult<ExitCode> {
    let (config, alignment) = match &command.scenario {
        Some(name) => {
            let file = load_config(command.config.as_deref())?;
            let scenario = find_scenario(&file, name)?;
            let alignment = file
                .target
                .alignment()
                .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
            (scenario_sizing(scenario, baseline_of(&file)?)?, alignment)
        }
        None => (adhoc_config(command)?, adhoc_alignment(command)?),
    };
    let layout = expected_layout(&config, &alignment)?;
    let text = serde_json::to_string_pretty(&layout)
        .map_err(|err| CliError::new(t!("layout.serialize_failed", error = err)))?;
    write_stdout_line(&text).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Folds the ad-hoc collector and flag tokens into a configuration.
fn adhoc_config(command: &LayoutCommand) -> CliResult<SizingConfig> {
    let selection = command
        .collector
        .map(|collector| format!("-XX:+{}", CollectorVariant::from(collector).selection_flag()));
    let tokens: Vec<&str> = selection
        .iter()
        .map(String::as_str)
        .chain(command.flags.iter().map(String::as_str))
        .collect();
    SizingConfig::from_tokens(&tokens)
        .map_err(|err| CliError::new(t!("layout.flags_invalid", error = err)))
}

/// Parses the ad-hoc alignment facts.
fn adhoc_alignment(command: &LayoutCommand) -> CliResult<Alignment> {
    let parse = |name: &str, literal: &str| {
        parse_size(literal)
            .map_err(|err| CliError::new(t!("layout.alignment_invalid", name = name, error = err)))
    };
    Ok(Alignment::new(
        parse("space", &command.space_alignment)?,
        parse("heap", &command.heap_alignment)?,
    ))
}

/// Runs the calculator, mapping rejection to a CLI error.
fn expected_layout(config: &SizingConfig, alignment: &Alignment) -> CliResult<ExpectedLayout> {
    compute_expected_layout(config, alignment)
        .map_err(|err| CliError::new(t!("layout.rejected", error = err)))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
        ConfigCommand::Example => {
            write_stdout_line(config_toml_example().trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    write_stdout_line(&t!("config.validate.ok", count = config.scenarios.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Plan Command
// ============================================================================

/// Prints one JSON line per verification request.
fn command_plan(command: &PlanCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let scenarios = select_scenarios(&config, command.scenario.as_deref())?;
    for entry in plan_entries(&config, &scenarios)? {
        let line = serde_json::to_string(&entry)
            .map_err(|err| CliError::new(t!("plan.serialize_failed", error = err)))?;
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Expands scenarios into their verification requests.
fn plan_entries(
    config: &HeapSizingConfig,
    scenarios: &[&ScenarioConfig],
) -> CliResult<Vec<PlanEntry>> {
    let mut entries = Vec::new();
    for scenario in scenarios {
        let requests = config.verification_requests(scenario).map_err(|err| {
            CliError::new(t!("config.scenario_invalid", name = scenario.name, error = err))
        })?;
        entries.extend(requests.into_iter().map(|request| PlanEntry {
            request: request.name,
            check: request.check,
            tolerance: request.tolerance,
        }));
    }
    Ok(entries)
}

// ============================================================================
// SECTION: Startup Command
// ============================================================================

/// Runs startup checks and prints one JSON verdict per scenario.
fn command_startup(command: &StartupCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let scenarios = select_scenarios(&config, command.scenario.as_deref())?;
    if scenarios.is_empty() {
        write_stderr_line(&t!("startup.no_scenarios"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let alignment = config
        .target
        .alignment()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let baseline = baseline_of(&config)?;
    let timeout =
        Duration::from_millis(command.timeout_ms.unwrap_or(config.defaults.startup_timeout_ms));
    let harness = CommandHarness::new(&command.runtime, timeout)
        .map_err(|err| CliError::new(t!("startup.harness_failed", error = err)))?;
    let log = build_log(&config.log)?;

    let mut matched = 0_usize;
    for scenario in &scenarios {
        let sizing = scenario_sizing(scenario, baseline)?;
        let verdict = check_startup(&harness, &sizing, &alignment, &config.target.startup_args)
            .map_err(|err| {
                CliError::new(t!("startup.check_failed", name = scenario.name, error = err))
            })?;
        log.record(&VerificationEvent::new(&scenario.name, verdict.event()));
        if verdict.matched {
            matched += 1;
        }
        write_startup_report(&scenario.name, &verdict)?;
    }
    write_stderr_line(&t!("startup.summary", matched = matched, total = scenarios.len()))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(if matched == scenarios.len() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Returns every scenario, or only the named one.
fn select_scenarios<'a>(
    config: &'a HeapSizingConfig,
    name: Option<&str>,
) -> CliResult<Vec<&'a ScenarioConfig>> {
    match name {
        Some(name) => Ok(vec![find_scenario(config, name)?]),
        None => Ok(config.scenarios.iter().collect()),
    }
}

/// Opens the configured verification event sink.
fn build_log(config: &LogConfig) -> CliResult<Box<dyn VerificationLog>> {
    match (config.sink, config.path.as_deref()) {
        (LogSink::File, Some(path)) => {
            let log = FileVerificationLog::new(Path::new(path)).map_err(|err| {
                CliError::new(t!("startup.log_open_failed", path = path, error = err))
            })?;
            Ok(Box::new(log))
        }
        (LogSink::None, _) => Ok(Box::new(NoopVerificationLog)),
        _ => Ok(Box::new(StderrVerificationLog)),
    }
}

/// Writes one verdict as a JSON line.
fn write_startup_report(scenario: &str, verdict: &StartupVerdict) -> CliResult<()> {
    let report = StartupReport {
        scenario,
        verdict,
    };
    let line = serde_json::to_string(&report)
        .map_err(|err| CliError::new(t!("startup.serialize_failed", error = err)))?;
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Config Helpers
// ============================================================================

/// Loads and validates the scenario file.
fn load_config(path: Option<&Path>) -> CliResult<HeapSizingConfig> {
    HeapSizingConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Looks a scenario up by name.
fn find_scenario<'a>(config: &'a HeapSizingConfig, name: &str) -> CliResult<&'a ScenarioConfig> {
    config
        .scenario(name)
        .ok_or_else(|| CliError::new(t!("config.scenario_missing", name = name)))
}

/// Returns the file's ergonomic baseline.
fn baseline_of(config: &HeapSizingConfig) -> CliResult<HeapBaseline> {
    config.target.baseline().map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Folds a scenario into a sizing configuration.
fn scenario_sizing(scenario: &ScenarioConfig, baseline: HeapBaseline) -> CliResult<SizingConfig> {
    scenario.sizing_config(baseline).map_err(|err| {
        CliError::new(t!("config.scenario_invalid", name = scenario.name, error = err))
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
