// crates/heap-sizing-core/tests/verifier.rs
// ============================================================================
// Module: Conformance Verifier Tests
// Description: End-to-end verification runs against a simulated heap.
// Purpose: Cover passing, failing, and inconclusive outcomes for every check.
// Dependencies: heap_sizing_core
// ============================================================================
//! ## Overview
//! Runs [`ConformanceVerifier`] against the simulated target in
//! `support/target.rs`. The simulator follows the sizing policy exactly, so
//! every applicable check passes unless a test skews its telemetry.

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

mod support;
#[path = "support/target.rs"]
mod target;

use heap_sizing_core::Alignment;
use heap_sizing_core::CollectionKind;
use heap_sizing_core::CollectorVariant;
use heap_sizing_core::ConformanceCheck;
use heap_sizing_core::ConformanceVerifier;
use heap_sizing_core::MemoryRegion;
use heap_sizing_core::SizingConfig;
use heap_sizing_core::SizingError;
use heap_sizing_core::ToleranceBand;
use heap_sizing_core::VerificationOutcome;
use heap_sizing_core::VerificationRequest;
use heap_sizing_core::VerifyError;
use heap_sizing_core::runtime::MemoryVerificationLog;
use heap_sizing_core::runtime::Quantity;
use heap_sizing_core::runtime::VerificationEventKind;
use heap_sizing_core::runtime::VerifierPhase;
use heap_sizing_core::units::M;
use heap_sizing_core::verify;
use support::TestResult;
use support::ensure;
use target::SimulatedTarget;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Alignment shared by the target and the requests.
const ALIGNMENT: Alignment = Alignment::new(M, M);

/// Scenario flags for a collector on a 32M..128M heap.
fn scenario(collector: CollectorVariant, extra: &[&str]) -> SizingConfig {
    let mut tokens = vec![format!("-XX:+{}", collector.selection_flag())];
    tokens.extend(["-Xms32m".to_string(), "-Xmx128m".to_string()]);
    tokens.extend(extra.iter().map(ToString::to_string));
    SizingConfig::from_tokens(&tokens).unwrap()
}

/// Runs one check with exact tolerance.
fn run(
    target: &mut SimulatedTarget,
    config: &SizingConfig,
    check: ConformanceCheck,
) -> Result<VerificationOutcome, VerifyError> {
    verify(config, &ALIGNMENT, target, ToleranceBand::Exact, check)
}

/// Fails with the outcome's failing comparisons when it did not pass.
fn ensure_passed(outcome: &VerificationOutcome, context: &str) -> TestResult {
    let failures: Vec<String> =
        outcome.failures().iter().map(ToString::to_string).collect();
    ensure(outcome.is_passed(), format!("{context}: {} {failures:?} {outcome:?}", outcome.label()))
}

// ============================================================================
// SECTION: Passing Runs
// ============================================================================

/// Verifies that every applicable check passes against a conforming target.
#[test]
fn conforming_targets_pass_every_applicable_check() -> TestResult {
    let scenarios = [
        (CollectorVariant::SingleThreaded, Vec::new()),
        (CollectorVariant::ParallelScavenge, vec!["-XX:-UseAdaptiveSizePolicy"]),
        (CollectorVariant::RegionBased, Vec::new()),
    ];
    for (collector, extra) in scenarios {
        let config = scenario(collector, &extra);
        for check in ConformanceCheck::ALL {
            let mut target = SimulatedTarget::start(&config, ALIGNMENT);
            if check.inapplicable_reason(target.layout()).is_some() {
                continue;
            }
            let outcome = run(&mut target, &config, check)?;
            ensure_passed(&outcome, &format!("{collector} {check}"))?;
        }
    }
    Ok(())
}

/// Verifies the initial and minimum survivor ratios under adaptive sizing.
#[test]
fn adaptive_parallel_survivor_ratios_pass() -> TestResult {
    let config = scenario(CollectorVariant::ParallelScavenge, &["-XX:MinSurvivorRatio=4"]);
    let mut target = SimulatedTarget::start(&config, ALIGNMENT);
    let outcome = run(&mut target, &config, ConformanceCheck::MinAndInitialSurvivorRatio)?;
    ensure_passed(&outcome, "adaptive parallel")?;
    let VerificationOutcome::Passed {
        comparisons,
    } = outcome
    else {
        return Ok(());
    };
    ensure(
        comparisons.iter().any(|comparison| {
            comparison.quantity == Quantity::SurvivorMax && comparison.expected == 10 * M
        }),
        "maximum survivor follows the minimum ratio",
    )?;
    Ok(())
}

/// Verifies that stepped shrinking forces the extra full collections.
#[test]
fn stepped_shrinking_forces_full_collections() -> TestResult {
    let stepped = scenario(CollectorVariant::SingleThreaded, &[]);
    let mut target = SimulatedTarget::start(&stepped, ALIGNMENT);
    ensure_passed(&run(&mut target, &stepped, ConformanceCheck::HeapShrink)?, "stepped")?;
    let full = target.collections().iter().filter(|kind| **kind == CollectionKind::Full).count();
    ensure(full == 11, format!("stepped run forced {full} full collections"))?;

    let single = scenario(CollectorVariant::SingleThreaded, &["-XX:-ShrinkHeapInSteps"]);
    let mut target = SimulatedTarget::start(&single, ALIGNMENT);
    ensure_passed(&run(&mut target, &single, ConformanceCheck::HeapShrink)?, "single step")?;
    ensure(target.collections().len() == 2, "one release cycle and one shrink cycle")?;
    Ok(())
}

/// Verifies that survivor checks drive young collections and free the
/// retained set.
#[test]
fn survivor_stage_requests_young_collections() -> TestResult {
    let config = scenario(CollectorVariant::SingleThreaded, &["-XX:TargetSurvivorRatio=80"]);
    let mut target = SimulatedTarget::start(&config, ALIGNMENT);
    ensure_passed(&run(&mut target, &config, ConformanceCheck::TargetSurvivorRatio)?, "target")?;
    let young = target.collections().iter().filter(|kind| **kind == CollectionKind::Young).count();
    ensure(young == 8, format!("{young} young collections"))?;
    ensure(target.live_bytes() == 0, "every block released")?;
    Ok(())
}

// ============================================================================
// SECTION: Failing Runs
// ============================================================================

/// Verifies the one-unit survivor drift allowance of the single-threaded
/// collector.
#[test]
fn single_threaded_survivor_drift_allows_one_unit() -> TestResult {
    let config = scenario(CollectorVariant::SingleThreaded, &[]);
    let mut within = SimulatedTarget::start(&config, ALIGNMENT).with_survivor_skew(M);
    ensure_passed(&run(&mut within, &config, ConformanceCheck::SurvivorRatio)?, "one unit")?;

    let mut beyond = SimulatedTarget::start(&config, ALIGNMENT).with_survivor_skew(2 * M);
    let outcome = run(&mut beyond, &config, ConformanceCheck::SurvivorRatio)?;
    let failures = outcome.failures();
    ensure(failures.len() == 1, format!("{outcome:?}"))?;
    ensure(failures[0].quantity == Quantity::SurvivorCommitted, "survivor comparison failed")?;
    ensure(failures[0].delta == 2 * 1024 * 1024, format!("delta {}", failures[0].delta))?;
    Ok(())
}

/// Verifies that the parallel scavenger allows no survivor drift.
#[test]
fn parallel_survivor_ratio_is_exact() -> TestResult {
    let config = scenario(CollectorVariant::ParallelScavenge, &[]);
    let mut target = SimulatedTarget::start(&config, ALIGNMENT).with_survivor_skew(M);
    let outcome = run(&mut target, &config, ConformanceCheck::SurvivorRatio)?;
    ensure(matches!(outcome, VerificationOutcome::Failed { .. }), format!("{outcome:?}"))?;
    Ok(())
}

/// Verifies that a heap that never gives memory back fails the shrink check.
#[test]
fn heap_that_never_shrinks_fails() -> TestResult {
    let config = scenario(CollectorVariant::SingleThreaded, &[]);
    let mut target = SimulatedTarget::start(&config, ALIGNMENT).without_shrinking();
    let outcome = run(&mut target, &config, ConformanceCheck::HeapShrink)?;
    let failures = outcome.failures();
    ensure(failures.len() == 1, format!("{outcome:?}"))?;
    ensure(failures[0].observed > 32 * M, "contracted heap stayed large")?;

    let mut target = SimulatedTarget::start(&config, ALIGNMENT).without_shrinking();
    let relaxed = verify(
        &config,
        &ALIGNMENT,
        &mut target,
        ToleranceBand::Relative {
            percent: 100,
        },
        ConformanceCheck::HeapShrink,
    )?;
    ensure(relaxed.failures().len() == 1, "a relative band does not hide a full heap")?;
    Ok(())
}

/// Verifies that a target started with different flags fails the bounds
/// check.
#[test]
fn mismatched_initial_heap_fails_bounds() -> TestResult {
    let started = scenario(CollectorVariant::SingleThreaded, &["-Xms48m"]);
    let claimed = scenario(CollectorVariant::SingleThreaded, &[]);
    let mut target = SimulatedTarget::start(&started, ALIGNMENT);
    let outcome = run(&mut target, &claimed, ConformanceCheck::HeapBounds)?;
    let failures = outcome.failures();
    ensure(failures.len() == 1, format!("{outcome:?}"))?;
    ensure(failures[0].expected == 32 * M && failures[0].observed == 48 * M, "baseline heap")?;
    Ok(())
}

// ============================================================================
// SECTION: Inconclusive Runs
// ============================================================================

/// Verifies that checks outside a collector's feature set are inconclusive.
#[test]
fn unsupported_checks_are_inconclusive() -> TestResult {
    let serial = scenario(CollectorVariant::SingleThreaded, &[]);
    let mut target = SimulatedTarget::start(&serial, ALIGNMENT);
    let outcome = run(&mut target, &serial, ConformanceCheck::MinAndInitialSurvivorRatio)?;
    ensure(matches!(outcome, VerificationOutcome::Inconclusive { .. }), format!("{outcome:?}"))?;
    ensure(target.collections().is_empty(), "target untouched")?;

    let adaptive = scenario(CollectorVariant::ParallelScavenge, &[]);
    let mut target = SimulatedTarget::start(&adaptive, ALIGNMENT);
    let outcome = run(&mut target, &adaptive, ConformanceCheck::HeapShrink)?;
    ensure(outcome.label() == "inconclusive", format!("{outcome:?}"))?;
    Ok(())
}

/// Verifies that a missing pool ends the run inconclusive.
#[test]
fn missing_pool_is_inconclusive() -> TestResult {
    let config = scenario(CollectorVariant::SingleThreaded, &[]);
    let mut target = SimulatedTarget::start(&config, ALIGNMENT).hiding(MemoryRegion::Old);
    let outcome = run(&mut target, &config, ConformanceCheck::HeapBounds)?;
    let VerificationOutcome::Inconclusive {
        reason,
    } = outcome
    else {
        return Err(format!("expected inconclusive, got {outcome:?}").into());
    };
    ensure(reason.contains("Tenured Gen"), format!("reason {reason}"))?;
    Ok(())
}

/// Verifies that a target running another collector is inconclusive.
#[test]
fn collector_mismatch_is_inconclusive() -> TestResult {
    let config = scenario(CollectorVariant::SingleThreaded, &[]);
    let mut target = SimulatedTarget::start(&config, ALIGNMENT)
        .reporting_collector(CollectorVariant::ParallelScavenge);
    let outcome = run(&mut target, &config, ConformanceCheck::NewRatio)?;
    ensure(matches!(outcome, VerificationOutcome::Inconclusive { .. }), format!("{outcome:?}"))?;
    ensure(target.live_bytes() == 0 && target.collections().is_empty(), "no pressure applied")?;
    Ok(())
}

// ============================================================================
// SECTION: Errors and Phases
// ============================================================================

/// Verifies that an invalid scenario fails before the target is touched.
#[test]
fn invalid_configuration_aborts_before_driving() -> TestResult {
    let valid = scenario(CollectorVariant::SingleThreaded, &[]);
    let invalid = scenario(CollectorVariant::SingleThreaded, &["-Xms256m"]);
    let mut target = SimulatedTarget::start(&valid, ALIGNMENT);
    let error = run(&mut target, &invalid, ConformanceCheck::HeapBounds).unwrap_err();
    ensure(
        matches!(error, VerifyError::InvalidConfig(SizingError::HeapOrdering { .. })),
        format!("{error:?}"),
    )?;
    ensure(target.collections().is_empty(), "no collections requested")?;
    Ok(())
}

/// Verifies the phase sequence and that a finished verifier cannot rerun.
#[test]
fn phases_advance_forward_only() -> TestResult {
    let config = scenario(CollectorVariant::SingleThreaded, &[]);
    let mut target = SimulatedTarget::start(&config, ALIGNMENT);
    let log = MemoryVerificationLog::new();
    let request = VerificationRequest::new("bounds", config, ConformanceCheck::HeapBounds);
    let mut verifier = ConformanceVerifier::new(request);
    ensure(verifier.phase() == VerifierPhase::Configuring, "starts configuring")?;
    let outcome = verifier.run(&mut target, &log)?;
    ensure_passed(&outcome, "bounds")?;
    ensure(verifier.phase() == VerifierPhase::Passed, "ends passed")?;

    let events = log.events();
    let phases: Vec<VerifierPhase> = events
        .iter()
        .filter_map(|event| match event.kind {
            VerificationEventKind::PhaseEntered {
                phase,
            } => Some(phase),
            _ => None,
        })
        .collect();
    ensure(
        phases
            == vec![
                VerifierPhase::Configuring,
                VerifierPhase::Driving,
                VerifierPhase::Sampling,
                VerifierPhase::Comparing,
                VerifierPhase::Passed,
            ],
        format!("{phases:?}"),
    )?;
    ensure(events.iter().all(|event| event.scenario == "bounds"), "events carry the scenario")?;
    let samples = events
        .iter()
        .filter(|event| matches!(event.kind, VerificationEventKind::UsageSampled { .. }))
        .count();
    ensure(samples == 4, format!("{samples} samples"))?;
    ensure(
        matches!(events.last().map(|event| &event.kind), Some(VerificationEventKind::Outcome {
            outcome: "passed",
            ..
        })),
        "outcome is the last event",
    )?;

    let rerun = verifier.run(&mut target, &log).unwrap_err();
    ensure(
        rerun
            == VerifyError::PhaseOrder {
                from: VerifierPhase::Passed,
                to: VerifierPhase::Configuring,
            },
        format!("{rerun:?}"),
    )?;
    Ok(())
}

/// Verifies that the verifier reads alignment from the target when the
/// request omits it.
#[test]
fn alignment_defaults_to_target_facts() -> TestResult {
    let alignment = Alignment::new(512 * 1024, 2 * M);
    let config = scenario(CollectorVariant::SingleThreaded, &[]);
    let mut target = SimulatedTarget::start(&config, alignment);
    let request = VerificationRequest::new("target-alignment", config, ConformanceCheck::NewRatio);
    let outcome = ConformanceVerifier::new(request)
        .run(&mut target, &MemoryVerificationLog::new())?;
    ensure_passed(&outcome, "target alignment")?;
    Ok(())
}
