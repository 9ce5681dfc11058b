// crates/heap-sizing-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and command helpers.
// Purpose: Ensure ad-hoc layouts, scenario selection, and sinks resolve.
// Dependencies: heap-sizing-cli main helpers
// ============================================================================

//! ## Overview
//! Drives the helpers behind `layout` and `startup` without spawning a
//! runtime.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::Parser;
use heap_sizing_config::HeapSizingConfig;
use heap_sizing_config::LogConfig;
use heap_sizing_config::LogSink;
use heap_sizing_config::config_toml_example;
use heap_sizing_core::Alignment;
use heap_sizing_core::CollectorVariant;
use heap_sizing_core::ConformanceCheck;
use heap_sizing_core::ToleranceBand;
use heap_sizing_core::units::K;
use heap_sizing_core::units::M;

use super::Cli;
use super::Commands;
use super::LayoutCommand;
use super::adhoc_alignment;
use super::adhoc_config;
use super::build_log;
use super::expected_layout;
use super::plan_entries;
use super::select_scenarios;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a `layout` invocation.
fn layout_command(args: &[&str]) -> LayoutCommand {
    let cli = Cli::try_parse_from(["heap-sizing", "layout"].iter().chain(args)).unwrap();
    match cli.command {
        Some(Commands::Layout(command)) => command,
        other => panic!("unexpected command {other:?}"),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn adhoc_layout_folds_collector_then_flags() {
    let command = layout_command(&[
        "--collector",
        "single-threaded",
        "--flag",
        "-Xms32m",
        "--flag",
        "-Xmx128m",
        "--space-alignment",
        "1m",
        "--heap-alignment",
        "1m",
    ]);
    let config = adhoc_config(&command).unwrap();
    assert_eq!(config.collector, CollectorVariant::SingleThreaded);
    let alignment = adhoc_alignment(&command).unwrap();
    assert_eq!(alignment, Alignment::new(M, M));
    let layout = expected_layout(&config, &alignment).unwrap();
    assert_eq!(layout.initial_heap, 32 * M);
    assert_eq!(layout.max_heap, 128 * M);
}

#[test]
fn adhoc_layout_defaults_alignment() {
    let command = layout_command(&["--flag", "-Xmx1g"]);
    assert_eq!(adhoc_alignment(&command).unwrap(), Alignment::new(512 * K, 2 * M));
    assert_eq!(adhoc_config(&command).unwrap().collector, CollectorVariant::RegionBased);
}

#[test]
fn adhoc_layout_reports_bad_input() {
    let command = layout_command(&["--flag", "-XX:MaxHeapSize=lots"]);
    assert!(adhoc_config(&command).unwrap_err().to_string().starts_with("Invalid flag tokens"));
    let command = layout_command(&["--space-alignment", "huge"]);
    assert!(adhoc_alignment(&command).unwrap_err().to_string().contains("space alignment"));
    let command = layout_command(&["--flag", "-Xms8m", "--flag", "-Xmx4m"]);
    let config = adhoc_config(&command).unwrap();
    let error = expected_layout(&config, &adhoc_alignment(&command).unwrap()).unwrap_err();
    assert!(error.to_string().starts_with("Configuration rejected"));
}

#[test]
fn scenario_and_adhoc_arguments_conflict() {
    let parsed = Cli::try_parse_from([
        "heap-sizing",
        "layout",
        "--scenario",
        "serial-bounds",
        "--collector",
        "region-based",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn startup_selects_named_or_all_scenarios() {
    let config = HeapSizingConfig::from_toml_str(&config_toml_example()).unwrap();
    assert_eq!(select_scenarios(&config, None).unwrap().len(), 5);
    let only = select_scenarios(&config, Some("region-new-size")).unwrap();
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].name, "region-new-size");
    let error = select_scenarios(&config, Some("absent")).unwrap_err();
    assert_eq!(error.to_string(), "Scenario absent is not defined in the config.");
}

#[test]
fn file_sink_opens_the_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let config = LogConfig {
        sink: LogSink::File,
        path: Some(path.to_string_lossy().into_owned()),
    };
    build_log(&config).unwrap();
    assert!(path.exists());

    let missing = LogConfig {
        sink: LogSink::File,
        path: Some(dir.path().join("missing/events.jsonl").to_string_lossy().into_owned()),
    };
    assert!(build_log(&missing).is_err());
    build_log(&LogConfig::default()).unwrap();
}

#[test]
fn plan_lists_each_scenario_check_with_its_tolerance() {
    let config = HeapSizingConfig::from_toml_str(&config_toml_example()).unwrap();
    let scenarios = select_scenarios(&config, None).unwrap();
    let entries = plan_entries(&config, &scenarios).unwrap();
    assert_eq!(entries.len(), 8);
    let region: Vec<_> =
        entries.iter().filter(|entry| entry.request.starts_with("region-new-size/")).collect();
    assert_eq!(region.len(), 2);
    assert_eq!(region[0].check, ConformanceCheck::NewSize);
    assert_eq!(region[1].tolerance, ToleranceBand::Relative {
        percent: 5
    });
    assert!(entries.iter().all(|entry| !entry.request.starts_with("refuse-")));
}
