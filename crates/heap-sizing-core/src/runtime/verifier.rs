// crates/heap-sizing-core/src/runtime/verifier.rs
// ============================================================================
// Module: Conformance Verifier
// Description: Forward-only state machine that checks a live heap against policy.
// Purpose: Drive allocation, sample usage, and diff against the expected layout.
// Dependencies: crate::{core, interfaces, runtime}, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`ConformanceVerifier`] runs one [`VerificationRequest`] through the
//! phases `Configuring -> Driving -> Sampling -> Comparing` and ends in
//! `Passed`, `Failed`, or `Inconclusive`. Transitions only move forward and
//! nothing is retried; a caller that wants another attempt builds a new
//! verifier.
//!
//! - Configuring computes the expected layout (an invalid configuration
//!   aborts before the target is touched), identifies the live collector,
//!   and takes the baseline snapshot.
//! - Driving retains about half of the maximum heap, then pushes towards
//!   the maximum, then (for survivor checks) sustains young collections,
//!   and finally releases everything and forces full collections.
//! - Sampling takes the contracted snapshot.
//! - Comparing evaluates the check's expectations against the snapshots.
//!
//! A collector that does not support the feature under test, a collector
//! other than the scenario's, or a missing pool ends `Inconclusive`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Alignment;
use crate::core::CollectionKind;
use crate::core::CollectorVariant;
use crate::core::ConformanceCheck;
use crate::core::ExpectedLayout;
use crate::core::ObservedUsage;
use crate::core::SizingConfig;
use crate::core::SizingError;
use crate::core::SurvivorSize;
use crate::core::ToleranceBand;
use crate::core::units::align_up;
use crate::interfaces::AllocationTarget;
use crate::interfaces::TargetHandle;
use crate::runtime::comparator::Comparison;
use crate::runtime::comparator::Expectation;
use crate::runtime::comparator::Quantity;
use crate::runtime::comparator::SamplePoint;
use crate::runtime::log::NoopVerificationLog;
use crate::runtime::log::VerificationEvent;
use crate::runtime::log::VerificationEventKind;
use crate::runtime::log::VerificationLog;
use crate::runtime::policy::compute_expected_layout;
use crate::runtime::probe::MemoryUsageProbe;
use crate::runtime::probe::ProbeError;
use crate::runtime::workload::AllocationWorkloadDriver;
use crate::runtime::workload::IterationReport;
use crate::runtime::workload::WorkloadConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default block size used to build allocation pressure.
pub const DEFAULT_BLOCK_BYTES: u64 = 64 * 1024;
/// Default number of young collections in the survivor stage.
pub const DEFAULT_SURVIVOR_ITERATIONS: u32 = 8;
/// Share of the maximum heap retained by the expansion stage, in percent.
const EXPANSION_PERCENT: u64 = 90;

// ============================================================================
// SECTION: Phases
// ============================================================================

/// Verifier states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifierPhase {
    /// Computing the layout and attaching to the target.
    Configuring,
    /// Applying allocation pressure and forcing collections.
    Driving,
    /// Taking the final snapshot.
    Sampling,
    /// Comparing snapshots against the layout.
    Comparing,
    /// Every comparison held.
    Passed,
    /// At least one comparison fell outside its tolerance.
    Failed,
    /// The check does not apply to the live target.
    Inconclusive,
}

impl VerifierPhase {
    /// Returns a stable label for the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuring => "configuring",
            Self::Driving => "driving",
            Self::Sampling => "sampling",
            Self::Comparing => "comparing",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Inconclusive => "inconclusive",
        }
    }

    /// Returns true for `Passed`, `Failed`, and `Inconclusive`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Inconclusive)
    }

    /// Position in the forward-only ordering; terminal phases share a rank.
    const fn rank(self) -> u8 {
        match self {
            Self::Configuring => 0,
            Self::Driving => 1,
            Self::Sampling => 2,
            Self::Comparing => 3,
            Self::Passed | Self::Failed | Self::Inconclusive => 4,
        }
    }
}

impl fmt::Display for VerifierPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Requests and Outcomes
// ============================================================================

/// Allocation shape used by the driving phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierWorkload {
    /// Block size in bytes.
    pub bytes_per_object: u64,
    /// Young collections forced during the survivor stage.
    pub survivor_iterations: u32,
}

impl Default for VerifierWorkload {
    fn default() -> Self {
        Self {
            bytes_per_object: DEFAULT_BLOCK_BYTES,
            survivor_iterations: DEFAULT_SURVIVOR_ITERATIONS,
        }
    }
}

/// One verification scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Scenario name used in events.
    pub name: String,
    /// Sizing configuration the target was started with.
    pub config: SizingConfig,
    /// Feature under test.
    pub check: ConformanceCheck,
    /// Alignment facts; read from the target when `None`.
    pub alignment: Option<Alignment>,
    /// Tolerance applied to noisy comparisons.
    pub tolerance: ToleranceBand,
    /// Allocation shape.
    pub workload: VerifierWorkload,
}

impl VerificationRequest {
    /// Creates a request with exact tolerance and the default workload.
    #[must_use]
    pub fn new(name: impl Into<String>, config: SizingConfig, check: ConformanceCheck) -> Self {
        Self {
            name: name.into(),
            config,
            check,
            alignment: None,
            tolerance: ToleranceBand::Exact,
            workload: VerifierWorkload::default(),
        }
    }

    /// Uses known alignment facts instead of reading them from the target.
    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Sets the tolerance band.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: ToleranceBand) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the allocation shape.
    #[must_use]
    pub fn with_workload(mut self, workload: VerifierWorkload) -> Self {
        self.workload = workload;
        self
    }
}

/// Terminal result of a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// Every comparison held.
    Passed {
        /// Comparisons evaluated.
        comparisons: Vec<Comparison>,
    },
    /// At least one comparison fell outside its tolerance.
    Failed {
        /// Comparisons evaluated, passing and failing.
        comparisons: Vec<Comparison>,
    },
    /// The check does not apply to the live target.
    Inconclusive {
        /// Why the check could not be evaluated.
        reason: String,
    },
}

impl VerificationOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed {
                ..
            } => "passed",
            Self::Failed {
                ..
            } => "failed",
            Self::Inconclusive {
                ..
            } => "inconclusive",
        }
    }

    /// Returns every comparison that did not hold.
    #[must_use]
    pub fn failures(&self) -> Vec<&Comparison> {
        match self {
            Self::Failed {
                comparisons,
            } => comparisons.iter().filter(|comparison| !comparison.passed).collect(),
            Self::Passed {
                ..
            }
            | Self::Inconclusive {
                ..
            } => Vec::new(),
        }
    }

    /// Returns true for [`Self::Passed`].
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    /// Returns the terminal phase matching this outcome.
    const fn phase(&self) -> VerifierPhase {
        match self {
            Self::Passed {
                ..
            } => VerifierPhase::Passed,
            Self::Failed {
                ..
            } => VerifierPhase::Failed,
            Self::Inconclusive {
                ..
            } => VerifierPhase::Inconclusive,
        }
    }
}

/// Verifier errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The scenario's configuration would make the runtime refuse to start.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] SizingError),
    /// A transition would move backwards or leave a terminal phase.
    #[error("verifier cannot move from {from} to {to}")]
    PhaseOrder {
        /// Current phase.
        from: VerifierPhase,
        /// Requested phase.
        to: VerifierPhase,
    },
}

// ============================================================================
// SECTION: Samples
// ============================================================================

/// Snapshots collected during one run.
struct Samples {
    /// Before any allocation.
    baseline: ObservedUsage,
    /// After retaining about half of the maximum heap.
    half_committed: ObservedUsage,
    /// After pushing towards the maximum heap.
    expanded: ObservedUsage,
    /// After sustained young collections, when the check needs it.
    survivor_steady: Option<ObservedUsage>,
    /// After releasing everything and forcing full collections.
    contracted: ObservedUsage,
}

impl Samples {
    /// Returns the survivor-steady snapshot, or the baseline when the run
    /// skipped the survivor stage.
    fn survivor_point(&self) -> (SamplePoint, ObservedUsage) {
        self.survivor_steady.map_or((SamplePoint::Baseline, self.baseline), |usage| {
            (SamplePoint::SurvivorSteady, usage)
        })
    }
}

/// Snapshots collected by the driving phase.
struct DrivenSamples {
    /// After retaining about half of the maximum heap.
    half_committed: ObservedUsage,
    /// After pushing towards the maximum heap.
    expanded: ObservedUsage,
    /// After sustained young collections, when the check needs it.
    survivor_steady: Option<ObservedUsage>,
}

/// Early exit from a phase.
enum Halt {
    /// The run ends inconclusive with a reason.
    Inconclusive(String),
    /// The run cannot continue.
    Error(VerifyError),
}

impl From<ProbeError> for Halt {
    fn from(error: ProbeError) -> Self {
        Self::Inconclusive(error.to_string())
    }
}

impl From<VerifyError> for Halt {
    fn from(error: VerifyError) -> Self {
        Self::Error(error)
    }
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Forward-only conformance verifier for one request.
#[derive(Debug)]
pub struct ConformanceVerifier {
    /// Scenario being verified.
    request: VerificationRequest,
    /// Current phase.
    phase: VerifierPhase,
}

impl ConformanceVerifier {
    /// Creates a verifier in the `Configuring` phase.
    #[must_use]
    pub const fn new(request: VerificationRequest) -> Self {
        Self {
            request,
            phase: VerifierPhase::Configuring,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> VerifierPhase {
        self.phase
    }

    /// Returns the request being verified.
    #[must_use]
    pub const fn request(&self) -> &VerificationRequest {
        &self.request
    }

    /// Runs the request against a live target.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::InvalidConfig`] before touching the target when
    /// the configuration is invalid, and [`VerifyError::PhaseOrder`] when the
    /// verifier has already run.
    pub fn run<T>(
        &mut self,
        target: &mut T,
        log: &dyn VerificationLog,
    ) -> Result<VerificationOutcome, VerifyError>
    where
        T: TargetHandle + AllocationTarget,
    {
        if self.phase != VerifierPhase::Configuring {
            return Err(VerifyError::PhaseOrder {
                from: self.phase,
                to: VerifierPhase::Configuring,
            });
        }
        self.emit(log, VerificationEventKind::PhaseEntered {
            phase: VerifierPhase::Configuring,
        });
        let alignment = self.request.alignment.unwrap_or_else(|| target.alignment());
        let layout = compute_expected_layout(&self.request.config, &alignment)?;
        let outcome = match self.evaluate(&layout, target, log) {
            Ok(comparisons) => {
                if comparisons.iter().all(|comparison| comparison.passed) {
                    VerificationOutcome::Passed {
                        comparisons,
                    }
                } else {
                    VerificationOutcome::Failed {
                        comparisons,
                    }
                }
            }
            Err(Halt::Inconclusive(reason)) => VerificationOutcome::Inconclusive {
                reason,
            },
            Err(Halt::Error(error)) => return Err(error),
        };
        self.advance(outcome.phase(), log)?;
        let detail = match &outcome {
            VerificationOutcome::Passed {
                comparisons,
            } => Some(format!("{} comparisons", comparisons.len())),
            VerificationOutcome::Failed {
                ..
            } => Some(format!("{} failed comparisons", outcome.failures().len())),
            VerificationOutcome::Inconclusive {
                reason,
            } => Some(reason.clone()),
        };
        self.emit(log, VerificationEventKind::Outcome {
            outcome: outcome.label(),
            detail,
        });
        Ok(outcome)
    }

    /// Runs every phase up to and including `Comparing`.
    fn evaluate<T>(
        &mut self,
        layout: &ExpectedLayout,
        target: &mut T,
        log: &dyn VerificationLog,
    ) -> Result<Vec<Comparison>, Halt>
    where
        T: TargetHandle + AllocationTarget,
    {
        if let Some(reason) = self.request.check.inapplicable_reason(layout) {
            return Err(Halt::Inconclusive(reason.to_string()));
        }
        let probe = MemoryUsageProbe::attach(target)?;
        if probe.collector() != layout.collector {
            return Err(Halt::Inconclusive(format!(
                "collector mismatch: scenario expects {}, target runs {}",
                layout.collector,
                probe.collector()
            )));
        }
        let baseline = self.sample(&probe, target, SamplePoint::Baseline, log)?;

        self.advance(VerifierPhase::Driving, log)?;
        let driven = self.drive(layout, &probe, target, log)?;

        self.advance(VerifierPhase::Sampling, log)?;
        let contracted = self.sample(&probe, target, SamplePoint::Contracted, log)?;

        self.advance(VerifierPhase::Comparing, log)?;
        let samples = Samples {
            baseline,
            half_committed: driven.half_committed,
            expanded: driven.expanded,
            survivor_steady: driven.survivor_steady,
            contracted,
        };
        let comparisons = self.compare(layout, &samples);
        for comparison in &comparisons {
            self.emit(log, VerificationEventKind::Comparison {
                comparison: *comparison,
            });
        }
        Ok(comparisons)
    }

    /// Applies allocation pressure and forces the contraction cycles.
    fn drive<T>(
        &self,
        layout: &ExpectedLayout,
        probe: &MemoryUsageProbe,
        target: &mut T,
        log: &dyn VerificationLog,
    ) -> Result<DrivenSamples, Halt>
    where
        T: TargetHandle + AllocationTarget,
    {
        let block = self.request.workload.bytes_per_object;
        let mut half = AllocationWorkloadDriver::<T::Block>::new(WorkloadConfig::retaining(
            layout.max_heap / 2,
            block,
            1,
        ));
        half.run_tolerant(target, None);
        let half_committed = self.sample(probe, target, SamplePoint::HalfCommitted, log)?;

        let expansion_goal = layout.max_heap / 100 * EXPANSION_PERCENT;
        let mut expansion = AllocationWorkloadDriver::<T::Block>::new(WorkloadConfig::retaining(
            expansion_goal.saturating_sub(half.retained_bytes()),
            block,
            1,
        ));
        expansion.run_tolerant(target, None);
        let expanded = self.sample(probe, target, SamplePoint::Expanded, log)?;
        expansion.release();
        half.release();
        target.request_collection(CollectionKind::Full);

        let survivor_steady = if needs_survivor_stage(self.request.check) {
            let mut survivors = AllocationWorkloadDriver::<T::Block>::new(WorkloadConfig::retaining(
                survivor_capacity(layout, layout.max_young_size),
                block,
                self.request.workload.survivor_iterations,
            ));
            let mut collect_young = |target: &mut T, _report: &IterationReport| {
                target.request_collection(CollectionKind::Young);
            };
            survivors.run_tolerant(target, Some(&mut collect_young));
            let sample = self.sample(probe, target, SamplePoint::SurvivorSteady, log)?;
            survivors.release();
            Some(sample)
        } else {
            None
        };

        for _ in 0 .. layout.shrink_cycles {
            target.request_collection(CollectionKind::Full);
        }
        Ok(DrivenSamples {
            half_committed,
            expanded,
            survivor_steady,
        })
    }

    /// Builds the check's comparisons.
    fn compare(&self, layout: &ExpectedLayout, samples: &Samples) -> Vec<Comparison> {
        let check = self.request.check;
        let tolerance = self.request.tolerance;
        let collector = layout.collector;
        let eval = |expectation: Expectation, observed: u64, point: SamplePoint| {
            expectation.evaluate(observed, check, point, collector)
        };
        let heap = |expectation: Expectation, point: SamplePoint, usage: &ObservedUsage| {
            eval(expectation, usage.heap().committed, point)
        };
        let young = |expectation: Expectation, point: SamplePoint, usage: &ObservedUsage| {
            eval(expectation, usage.young_generation().committed, point)
        };
        match check {
            ConformanceCheck::HeapBounds => vec![
                heap(
                    Expectation::equal(Quantity::HeapCommitted, layout.initial_heap)
                        .within(tolerance, layout.initial_heap),
                    SamplePoint::Baseline,
                    &samples.baseline,
                ),
                heap(
                    Expectation::at_most(Quantity::HeapCommitted, layout.max_heap),
                    SamplePoint::HalfCommitted,
                    &samples.half_committed,
                ),
                heap(
                    Expectation::at_most(Quantity::HeapCommitted, layout.max_heap),
                    SamplePoint::Expanded,
                    &samples.expanded,
                ),
                heap(
                    Expectation::at_least(Quantity::HeapCommitted, layout.min_heap),
                    SamplePoint::Contracted,
                    &samples.contracted,
                ),
            ],
            ConformanceCheck::NewRatio => {
                if layout.region_size.is_some() {
                    vec![young(
                        Expectation::at_most(Quantity::YoungCommitted, layout.max_young_size),
                        SamplePoint::Expanded,
                        &samples.expanded,
                    )]
                } else {
                    vec![
                        young(
                            Expectation::equal(Quantity::YoungCommitted, layout.new_size)
                                .within(tolerance, layout.new_size),
                            SamplePoint::Baseline,
                            &samples.baseline,
                        ),
                        eval(
                            Expectation::equal(Quantity::OldCommitted, layout.old_size)
                                .within(tolerance, layout.old_size),
                            samples.baseline.old.committed,
                            SamplePoint::Baseline,
                        ),
                    ]
                }
            }
            ConformanceCheck::NewSize => vec![
                young(
                    Expectation::equal(Quantity::YoungCommitted, layout.new_size)
                        .within(tolerance, layout.new_size),
                    SamplePoint::Baseline,
                    &samples.baseline,
                ),
                young(
                    Expectation::at_least(Quantity::YoungCommitted, layout.new_size),
                    SamplePoint::Expanded,
                    &samples.expanded,
                ),
                young(
                    Expectation::at_most(Quantity::YoungCommitted, layout.max_young_size),
                    SamplePoint::Expanded,
                    &samples.expanded,
                ),
            ],
            ConformanceCheck::SurvivorRatio => {
                let (point, usage) = samples.survivor_point();
                let young_committed = usage.young_generation().committed;
                match layout.survivor_size_for_young(young_committed) {
                    SurvivorSize::Bytes {
                        size,
                    } => {
                        let drift = if layout.collector == CollectorVariant::SingleThreaded {
                            ToleranceBand::Absolute {
                                bytes: layout.alignment.space_alignment,
                            }
                        } else {
                            ToleranceBand::Exact
                        };
                        vec![eval(
                            Expectation::equal(Quantity::SurvivorCommitted, size).within(drift, size),
                            usage.survivor.committed,
                            point,
                        )]
                    }
                    SurvivorSize::Regions {
                        count,
                    } => {
                        let region = layout.sizing_unit();
                        vec![eval(
                            Expectation::at_most(Quantity::SurvivorRegions, count),
                            usage.survivor.committed.div_ceil(region),
                            point,
                        )]
                    }
                }
            }
            ConformanceCheck::MinAndInitialSurvivorRatio => {
                let baseline = &samples.baseline;
                let initial = match layout
                    .survivor_size_for_young(baseline.young_generation().committed)
                {
                    SurvivorSize::Bytes {
                        size,
                    }
                    | SurvivorSize::Regions {
                        count: size,
                    } => size,
                };
                let mut comparisons = vec![eval(
                    Expectation::equal(Quantity::SurvivorCommitted, initial),
                    baseline.survivor.committed,
                    SamplePoint::Baseline,
                )];
                if let Some(max) = layout.max_survivor_size {
                    comparisons.push(eval(
                        Expectation::equal(Quantity::SurvivorMax, max),
                        baseline.survivor.max,
                        SamplePoint::Baseline,
                    ));
                }
                comparisons
            }
            ConformanceCheck::TargetSurvivorRatio => {
                let (point, usage) = samples.survivor_point();
                let capacity = if layout.collector.has_paired_survivors() {
                    usage.survivor.committed
                } else {
                    survivor_capacity(layout, usage.young_generation().committed)
                };
                let target_bytes = layout.target_survivor_occupancy(capacity);
                vec![eval(
                    Expectation::equal(Quantity::SurvivorOccupancy, target_bytes)
                        .within(tolerance, capacity),
                    usage.survivor.used,
                    point,
                )]
            }
            ConformanceCheck::HeapShrink => {
                let contracted = samples.contracted.heap();
                let granularity = layout
                    .region_size
                    .map_or(layout.alignment.heap_alignment, |region| {
                        region.max(layout.alignment.heap_alignment)
                    });
                let free_limited = match 100_u64.checked_sub(layout.max_heap_free_ratio) {
                    Some(live_percent) if live_percent > 0 => {
                        align_up(contracted.used.saturating_mul(100) / live_percent, granularity)
                    }
                    _ => layout.max_heap,
                };
                let ceiling = free_limited.clamp(layout.min_heap, layout.max_heap);
                vec![
                    heap(
                        Expectation::at_most(Quantity::HeapCommitted, ceiling)
                            .within(tolerance, ceiling),
                        SamplePoint::Contracted,
                        &samples.contracted,
                    ),
                    heap(
                        Expectation::at_least(Quantity::HeapCommitted, layout.min_heap),
                        SamplePoint::Contracted,
                        &samples.contracted,
                    ),
                ]
            }
        }
    }

    /// Takes and logs one snapshot.
    fn sample<T: TargetHandle>(
        &self,
        probe: &MemoryUsageProbe,
        target: &T,
        point: SamplePoint,
        log: &dyn VerificationLog,
    ) -> Result<ObservedUsage, ProbeError> {
        let usage = probe.snapshot(target)?;
        self.emit(log, VerificationEventKind::UsageSampled {
            point,
            usage,
        });
        Ok(usage)
    }

    /// Moves to a later phase and logs the transition.
    fn advance(&mut self, next: VerifierPhase, log: &dyn VerificationLog) -> Result<(), VerifyError> {
        if self.phase.is_terminal() || next.rank() <= self.phase.rank() {
            return Err(VerifyError::PhaseOrder {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        self.emit(log, VerificationEventKind::PhaseEntered {
            phase: next,
        });
        Ok(())
    }

    /// Records one event for this request.
    fn emit(&self, log: &dyn VerificationLog, kind: VerificationEventKind) {
        log.record(&VerificationEvent::new(&self.request.name, kind));
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when the check reads the survivor-steady snapshot.
const fn needs_survivor_stage(check: ConformanceCheck) -> bool {
    matches!(check, ConformanceCheck::SurvivorRatio | ConformanceCheck::TargetSurvivorRatio)
}

/// Survivor capacity in bytes for a young generation size.
fn survivor_capacity(layout: &ExpectedLayout, young: u64) -> u64 {
    match layout.survivor_size_for_young(young) {
        SurvivorSize::Bytes {
            size,
        } => size,
        SurvivorSize::Regions {
            count,
        } => count.saturating_mul(layout.sizing_unit()),
    }
}

/// Verifies one scenario against a target without recording events.
///
/// # Errors
///
/// Returns [`VerifyError::InvalidConfig`] when the configuration is invalid.
pub fn verify<T>(
    config: &SizingConfig,
    alignment: &Alignment,
    target: &mut T,
    tolerance: ToleranceBand,
    check: ConformanceCheck,
) -> Result<VerificationOutcome, VerifyError>
where
    T: TargetHandle + AllocationTarget,
{
    let request = VerificationRequest::new(check.as_str(), config.clone(), check)
        .with_alignment(*alignment)
        .with_tolerance(tolerance);
    ConformanceVerifier::new(request).run(target, &NoopVerificationLog)
}
