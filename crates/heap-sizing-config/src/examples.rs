// crates/heap-sizing-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example scenario file.
// Purpose: Deterministic starting point for new scenario files.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The example covers each collector and one scenario per refusal class, and
//! is kept valid by the crate's tests.

/// Returns a canonical example `heap-sizing.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[target]
space_alignment = "512k"
heap_alignment = "2m"
baseline_initial_heap = "64m"
baseline_max_heap = "1g"
startup_args = ["-version"]

[defaults]
tolerance = { kind = "exact" }
startup_timeout_ms = 30000

[log]
sink = "stderr"

[[scenarios]]
name = "serial-bounds"
collector = "single_threaded"
flags = ["-Xms32m", "-Xmx128m"]
checks = ["heap_bounds", "new_ratio", "survivor_ratio", "heap_shrink"]
expect_start = true

[[scenarios]]
name = "parallel-survivors"
collector = "parallel_scavenge"
flags = ["-Xms32m", "-Xmx128m", "-XX:-UseAdaptiveSizePolicy", "-XX:SurvivorRatio=6"]
checks = ["survivor_ratio", "min_and_initial_survivor_ratio"]
tolerance = { kind = "absolute", bytes = 524288 }
expect_start = true

[[scenarios]]
name = "region-new-size"
collector = "region_based"
flags = ["-Xmx256m"]
sizes = { new_size = "32m" }
checks = ["new_size", "target_survivor_ratio"]
tolerance = { kind = "relative", percent = 5 }
expect_start = true

[[scenarios]]
name = "refuse-min-above-max"
collector = "single_threaded"
sizes = { min_heap = "8m", max_heap = "4m" }
expect_start = false

[[scenarios]]
name = "refuse-new-above-max-new"
flags = ["-XX:NewSize=128m", "-XX:MaxNewSize=50m"]
expect_start = false
"#,
    )
}
