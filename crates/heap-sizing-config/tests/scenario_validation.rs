//! Scenario and section validation tests for heap-sizing-config.
// crates/heap-sizing-config/tests/scenario_validation.rs
// =============================================================================
// Module: Scenario Validation Tests
// Description: Validate defaults, section limits, and scenario folding.
// Purpose: Ensure every documented limit is enforced with a clear message.
// =============================================================================

use heap_sizing_config::HeapSizingConfig;
use heap_sizing_config::LogSink;
use heap_sizing_core::Alignment;
use heap_sizing_core::CollectorVariant;
use heap_sizing_core::HeapBaseline;
use heap_sizing_core::ToleranceBand;
use heap_sizing_core::units::G;
use heap_sizing_core::units::K;
use heap_sizing_core::units::M;

mod common;

use common::assert_invalid;
use common::config_from_toml;
use common::scenario_table;

type TestResult = Result<(), String>;

/// Parses and validates TOML text.
fn load(toml_str: &str) -> Result<HeapSizingConfig, heap_sizing_config::ConfigError> {
    HeapSizingConfig::from_toml_str(toml_str)
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn empty_file_uses_defaults() -> TestResult {
    let config = config_from_toml("").map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    let alignment = config.target.alignment().map_err(|err| err.to_string())?;
    if alignment != Alignment::new(512 * K, 2 * M) {
        return Err(format!("unexpected alignment {alignment:?}"));
    }
    let baseline = config.target.baseline().map_err(|err| err.to_string())?;
    if baseline != HeapBaseline::default() {
        return Err(format!("unexpected baseline {baseline:?}"));
    }
    if config.target.startup_args != ["-version"] {
        return Err("startup args default to -version".to_string());
    }
    if config.defaults.tolerance != ToleranceBand::Exact
        || config.defaults.startup_timeout_ms != 30_000
    {
        return Err("unexpected defaults".to_string());
    }
    if config.log.sink != LogSink::Stderr {
        return Err("log sink defaults to stderr".to_string());
    }
    Ok(())
}

#[test]
fn scenario_tolerance_overrides_default() -> TestResult {
    let text = format!(
        "[defaults]\ntolerance = {{ kind = \"absolute\", bytes = 1024 }}\n{}{}",
        scenario_table("plain", ""),
        scenario_table("loose", "tolerance = { kind = \"relative\", percent = 10 }"),
    );
    let config = load(&text).map_err(|err| err.to_string())?;
    let plain = config.scenario("plain").ok_or("plain missing")?;
    let loose = config.scenario("loose").ok_or("loose missing")?;
    if config.tolerance_for(plain)
        != (ToleranceBand::Absolute {
            bytes: 1024,
        })
    {
        return Err("plain uses the default".to_string());
    }
    if config.tolerance_for(loose)
        != (ToleranceBand::Relative {
            percent: 10,
        })
    {
        return Err("loose uses its override".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Target Section
// ============================================================================

#[test]
fn alignments_must_be_powers_of_two() -> TestResult {
    assert_invalid(load("[target]\nspace_alignment = \"3m\"\n"), "must be a non-zero power of two")?;
    assert_invalid(load("[target]\nheap_alignment = \"0\"\n"), "must be a non-zero power of two")?;
    assert_invalid(load("[target]\nheap_alignment = \"lots\"\n"), "target.heap_alignment")?;
    assert_invalid(
        load("[target]\nspace_alignment = \"1m\"\nheap_alignment = \"512k\"\n"),
        "target alignment",
    )
}

#[test]
fn baseline_must_be_ordered() -> TestResult {
    assert_invalid(
        load("[target]\nbaseline_initial_heap = \"2g\"\nbaseline_max_heap = \"1g\"\n"),
        "must not exceed",
    )?;
    assert_invalid(load("[target]\nbaseline_max_heap = \"0\"\n"), "must be non-zero")
}

#[test]
fn startup_args_are_bounded() -> TestResult {
    assert_invalid(load("[target]\nstartup_args = [\" \"]\n"), "entries must be non-empty")?;
    let args = vec!["\"-version\""; 65].join(", ");
    assert_invalid(load(&format!("[target]\nstartup_args = [{args}]\n")), "exceeds max entries")
}

// ============================================================================
// SECTION: Defaults and Log Sections
// ============================================================================

#[test]
fn startup_timeout_is_bounded() -> TestResult {
    assert_invalid(load("[defaults]\nstartup_timeout_ms = 10\n"), "startup_timeout_ms")?;
    assert_invalid(load("[defaults]\nstartup_timeout_ms = 600001\n"), "startup_timeout_ms")?;
    load("[defaults]\nstartup_timeout_ms = 100\n").map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn file_sink_requires_path() -> TestResult {
    assert_invalid(load("[log]\nsink = \"file\"\n"), "log.path is required")?;
    assert_invalid(load("[log]\nsink = \"none\"\npath = \"events.jsonl\"\n"), "only valid")?;
    assert_invalid(load("[log]\nsink = \"file\"\npath = \" \"\n"), "must be non-empty")?;
    let config = load("[log]\nsink = \"file\"\npath = \"events.jsonl\"\n")
        .map_err(|err| err.to_string())?;
    if config.log.path.as_deref() != Some("events.jsonl") {
        return Err("path kept".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Scenario Limits
// ============================================================================

#[test]
fn scenario_count_is_bounded() -> TestResult {
    let ok: String = (0 .. 256).map(|index| scenario_table(&format!("s{index}"), "")).collect();
    load(&ok).map_err(|err| err.to_string())?;
    let too_many: String =
        (0 .. 257).map(|index| scenario_table(&format!("s{index}"), "")).collect();
    assert_invalid(load(&too_many), "too many scenarios")
}

#[test]
fn scenario_names_are_checked() -> TestResult {
    assert_invalid(load(&scenario_table("Serial", "")), "must use only")?;
    assert_invalid(load(&scenario_table("", "")), "1 to 64 characters")?;
    assert_invalid(load(&scenario_table(&"a".repeat(65), "")), "1 to 64 characters")?;
    let duplicate = format!("{}{}", scenario_table("same", ""), scenario_table("same", ""));
    assert_invalid(load(&duplicate), "duplicate scenario name: same")
}

#[test]
fn flag_tokens_are_bounded_and_parsed() -> TestResult {
    let tokens = vec!["\"-Xmx128m\""; 65].join(", ");
    assert_invalid(
        load(&scenario_table("many", &format!("flags = [{tokens}]"))),
        "scenarios.many.flags exceeds max entries",
    )?;
    assert_invalid(
        load(&scenario_table("bad", "flags = [\"-XX:MaxHeapSize=lots\"]")),
        "scenarios.bad.flags",
    )?;
    assert_invalid(
        load(&scenario_table("bad-size", "sizes = { max_heap = \"12q\" }")),
        "scenarios.bad-size.sizes.max_heap",
    )
}

#[test]
fn checks_are_listed_once() -> TestResult {
    assert_invalid(
        load(&scenario_table("twice", "checks = [\"heap_bounds\", \"heap_bounds\"]")),
        "lists check heap_bounds twice",
    )?;
    assert_invalid(load(&scenario_table("unknown", "checks = [\"page_size\"]")), "config parse error")
}

#[test]
fn expected_startup_outcome_must_match_calculator() -> TestResult {
    assert_invalid(
        load(&scenario_table(
            "wrong",
            "sizes = { min_heap = \"8m\", max_heap = \"4m\" }\nexpect_start = true",
        )),
        "scenarios.wrong expects start = true but the calculator rejects it",
    )?;
    assert_invalid(
        load(&scenario_table("also-wrong", "flags = [\"-Xmx128m\"]\nexpect_start = false")),
        "accepts it",
    )?;
    load(&scenario_table(
        "refused",
        "sizes = { min_heap = \"8m\", max_heap = \"4m\" }\nexpect_start = false",
    ))
    .map_err(|err| err.to_string())?;
    Ok(())
}

// ============================================================================
// SECTION: Scenario Folding
// ============================================================================

#[test]
fn scenario_folds_into_sizing_config() -> TestResult {
    let text = format!(
        "[target]\nbaseline_initial_heap = \"32m\"\nbaseline_max_heap = \"2g\"\n{}",
        scenario_table(
            "folded",
            "collector = \"parallel_scavenge\"\nflags = [\"-Xmx1g\", \"-XX:SurvivorRatio=6\"]\n\
             sizes = { new_size = \"64m\" }",
        ),
    );
    let config = load(&text).map_err(|err| err.to_string())?;
    let scenario = config.scenario("folded").ok_or("folded missing")?;
    let baseline = config.target.baseline().map_err(|err| err.to_string())?;
    let sizing = scenario.sizing_config(baseline).map_err(|err| err.to_string())?;
    if sizing.collector != CollectorVariant::ParallelScavenge {
        return Err(format!("collector {:?}", sizing.collector));
    }
    if sizing.max_heap != Some(G) || sizing.new_size != Some(64 * M) {
        return Err(format!("sizes {:?} {:?}", sizing.max_heap, sizing.new_size));
    }
    if sizing.survivor_ratio != Some(6) {
        return Err("survivor ratio folded".to_string());
    }
    if sizing.baseline.initial_heap != 32 * M || sizing.baseline.max_heap != 2 * G {
        return Err("baseline applied".to_string());
    }
    Ok(())
}

#[test]
fn scenario_without_collector_uses_flag_selection() -> TestResult {
    let config = load(&scenario_table("serial", "flags = [\"-XX:+UseSerialGC\"]"))
        .map_err(|err| err.to_string())?;
    let scenario = config.scenario("serial").ok_or("serial missing")?;
    let sizing =
        scenario.sizing_config(HeapBaseline::default()).map_err(|err| err.to_string())?;
    if sizing.collector != CollectorVariant::SingleThreaded {
        return Err(format!("collector {:?}", sizing.collector));
    }
    Ok(())
}

// ============================================================================
// SECTION: Verification Requests
// ============================================================================

#[test]
fn scenario_checks_become_verification_requests() -> TestResult {
    let config = load(&heap_sizing_config::config_toml_example()).map_err(|err| err.to_string())?;
    let scenario = config.scenario("parallel-survivors").ok_or("scenario missing")?;
    let requests = config.verification_requests(scenario).map_err(|err| err.to_string())?;
    let names: Vec<&str> = requests.iter().map(|request| request.name.as_str()).collect();
    let expected = [
        "parallel-survivors/survivor_ratio",
        "parallel-survivors/min_and_initial_survivor_ratio",
    ];
    if names != expected {
        return Err(format!("unexpected names {names:?}"));
    }
    for request in &requests {
        if request.tolerance
            != (ToleranceBand::Absolute {
                bytes: 524_288,
            })
        {
            return Err(format!("{}: tolerance {:?}", request.name, request.tolerance));
        }
        if request.alignment != Some(Alignment::new(512 * K, 2 * M)) {
            return Err(format!("{}: alignment {:?}", request.name, request.alignment));
        }
        if request.config.collector != CollectorVariant::ParallelScavenge
            || request.config.survivor_ratio != Some(6)
        {
            return Err(format!("{}: config not folded", request.name));
        }
        if request.config.baseline.max_heap != G {
            return Err(format!("{}: baseline not applied", request.name));
        }
    }

    let serial = config.scenario("serial-bounds").ok_or("serial missing")?;
    let serial_requests = config.verification_requests(serial).map_err(|err| err.to_string())?;
    if serial_requests.len() != 4
        || serial_requests.iter().any(|request| request.tolerance != ToleranceBand::Exact)
    {
        return Err("serial scenario uses the default tolerance for each check".to_string());
    }

    let refused = config.scenario("refuse-min-above-max").ok_or("refusal missing")?;
    if !config.verification_requests(refused).map_err(|err| err.to_string())?.is_empty() {
        return Err("a scenario without checks yields no requests".to_string());
    }
    Ok(())
}
