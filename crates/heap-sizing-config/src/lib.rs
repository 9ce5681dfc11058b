// crates/heap-sizing-config/src/lib.rs
// ============================================================================
// Module: Heap Sizing Config Library
// Description: Scenario file model, validation, and example generation.
// Purpose: Single source of truth for heap-sizing.toml semantics.
// Dependencies: heap-sizing-core, serde, toml
// ============================================================================

//! ## Overview
//! `heap-sizing-config` defines the scenario file consumed by the
//! `heap-sizing` CLI. Loading is strict and fail-closed: unknown keys,
//! oversized files, and scenarios whose declared startup outcome disagrees
//! with the calculator are all rejected.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
