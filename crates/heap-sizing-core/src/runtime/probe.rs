// crates/heap-sizing-core/src/runtime/probe.rs
// ============================================================================
// Module: Memory Usage Probe
// Description: Collector identification and per-region usage snapshots.
// Purpose: Read the target's heap telemetry without mutating it.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! The probe resolves the active [`CollectorVariant`] once, from the live
//! collector names, and then reads pools by the variant's name table. A
//! missing pool is [`ProbeError::Unavailable`], which callers treat as "not
//! applicable to this collector" rather than as a failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CollectorVariant;
use crate::core::MemoryRegion;
use crate::core::ObservedUsage;
use crate::core::PoolUsage;
use crate::interfaces::TargetHandle;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Probe failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The variant's pool for a region is not exposed by the target.
    #[error("{collector} does not expose pool {pool:?} for the {region} region")]
    Unavailable {
        /// Active collector variant.
        collector: CollectorVariant,
        /// Region that was probed.
        region: MemoryRegion,
        /// Pool name looked up.
        pool: &'static str,
    },
    /// Live collector names match no variant, or match more than one.
    #[error("cannot identify collector from names {names:?}")]
    UnknownCollector {
        /// Names reported by the target.
        names: Vec<String>,
    },
}

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Read-only usage probe bound to one collector variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsageProbe {
    /// Variant whose pool names are used.
    collector: CollectorVariant,
}

impl MemoryUsageProbe {
    /// Identifies the target's collector and binds a probe to it.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::UnknownCollector`] when the live names do not
    /// resolve to exactly one variant.
    pub fn attach<T: TargetHandle + ?Sized>(target: &T) -> Result<Self, ProbeError> {
        let names = target.collector_names();
        CollectorVariant::from_collector_names(&names)
            .map(Self::for_collector)
            .ok_or(ProbeError::UnknownCollector {
                names,
            })
    }

    /// Binds a probe to a known collector variant.
    #[must_use]
    pub const fn for_collector(collector: CollectorVariant) -> Self {
        Self {
            collector,
        }
    }

    /// Returns the variant the probe reads pools for.
    #[must_use]
    pub const fn collector(&self) -> CollectorVariant {
        self.collector
    }

    /// Reads one region's pool.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Unavailable`] when the pool is missing.
    pub fn region_usage<T: TargetHandle + ?Sized>(
        &self,
        target: &T,
        region: MemoryRegion,
    ) -> Result<PoolUsage, ProbeError> {
        let pool = self.collector.pool_name(region);
        target.pool_usage(pool).ok_or(ProbeError::Unavailable {
            collector: self.collector,
            region,
            pool,
        })
    }

    /// Reads eden, survivor, and old pools into one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Unavailable`] when any pool is missing.
    pub fn snapshot<T: TargetHandle + ?Sized>(&self, target: &T) -> Result<ObservedUsage, ProbeError> {
        Ok(ObservedUsage {
            collector: self.collector,
            eden: self.region_usage(target, MemoryRegion::Eden)?,
            survivor: self.region_usage(target, MemoryRegion::Survivor)?,
            old: self.region_usage(target, MemoryRegion::Old)?,
        })
    }
}

/// Identifies the collector and takes one snapshot.
///
/// # Errors
///
/// Returns [`ProbeError`] when the collector is unknown or a pool is missing.
pub fn probe_usage<T: TargetHandle + ?Sized>(target: &T) -> Result<ObservedUsage, ProbeError> {
    MemoryUsageProbe::attach(target)?.snapshot(target)
}
