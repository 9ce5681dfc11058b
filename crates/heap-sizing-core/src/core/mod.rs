// crates/heap-sizing-core/src/core/mod.rs
// ============================================================================
// Module: Heap Sizing Core Types
// Description: Data model for sizing scenarios, layouts, and observations.
// Purpose: Provide stable, serializable types shared by every sizing surface.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types define sizing scenarios, alignment facts, the expected layout,
//! observed usage snapshots, and tolerance bands. They carry no I/O and no
//! hidden state; the runtime modules compute and compare them.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod check;
pub mod collector;
pub mod config;
pub mod error;
pub mod flags;
pub mod layout;
pub mod tolerance;
pub mod units;
pub mod usage;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use check::ConformanceCheck;
pub use collector::CollectionKind;
pub use collector::CollectorVariant;
pub use collector::MemoryRegion;
pub use config::HeapBaseline;
pub use config::SizingConfig;
pub use error::FlagError;
pub use error::HeapBound;
pub use error::SizingError;
pub use flags::parse_flag_token;
pub use layout::Alignment;
pub use layout::ExpectedLayout;
pub use layout::SurvivorSize;
pub use layout::TenuringThresholds;
pub use tolerance::ToleranceBand;
pub use units::SizeParseError;
pub use units::format_size;
pub use units::parse_size;
pub use usage::ObservedUsage;
pub use usage::PoolUsage;
