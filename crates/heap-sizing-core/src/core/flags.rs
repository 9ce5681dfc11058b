// crates/heap-sizing-core/src/core/flags.rs
// ============================================================================
// Module: Flag Tokens
// Description: Flag token parsing and the last-flag-wins configuration fold.
// Purpose: Turn ordered runtime flags into an immutable sizing configuration.
// Dependencies: crate::core::{collector, config, error, units}
// ============================================================================

//! ## Overview
//! Runtime flags arrive as an ordered token list. Tokens are first split into
//! `(name, value)` pairs, then folded left-to-right into a fresh
//! [`SizingConfig`]; a later pair for the same logical field replaces the
//! earlier one. Flags with no sizing meaning are skipped so callers can pass
//! a full command line through unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::collector::CollectorVariant;
use crate::core::config::SizingConfig;
use crate::core::error::FlagError;
use crate::core::units::format_size;
use crate::core::units::parse_size;

// ============================================================================
// SECTION: Flag Names
// ============================================================================

/// Minimum heap size flag.
pub const MIN_HEAP_SIZE: &str = "MinHeapSize";
/// Initial heap size flag.
pub const INITIAL_HEAP_SIZE: &str = "InitialHeapSize";
/// Maximum heap size flag.
pub const MAX_HEAP_SIZE: &str = "MaxHeapSize";
/// Initial young generation size flag.
pub const NEW_SIZE: &str = "NewSize";
/// Maximum young generation size flag.
pub const MAX_NEW_SIZE: &str = "MaxNewSize";
/// Old/young ratio flag.
pub const NEW_RATIO: &str = "NewRatio";
/// Eden/survivor ratio flag.
pub const SURVIVOR_RATIO: &str = "SurvivorRatio";
/// Startup young/survivor ratio flag.
pub const INITIAL_SURVIVOR_RATIO: &str = "InitialSurvivorRatio";
/// Minimum young/survivor ratio flag.
pub const MIN_SURVIVOR_RATIO: &str = "MinSurvivorRatio";
/// Target survivor occupancy flag.
pub const TARGET_SURVIVOR_RATIO: &str = "TargetSurvivorRatio";
/// Minimum free heap percentage flag.
pub const MIN_HEAP_FREE_RATIO: &str = "MinHeapFreeRatio";
/// Maximum free heap percentage flag.
pub const MAX_HEAP_FREE_RATIO: &str = "MaxHeapFreeRatio";
/// Region size flag.
pub const REGION_SIZE: &str = "G1HeapRegionSize";
/// Remembered-set bucket count flag.
pub const HOWL_NUM_BUCKETS: &str = "G1RemSetHowlNumBuckets";
/// Remembered-set bucket maximum flag.
pub const HOWL_MAX_NUM_BUCKETS: &str = "G1RemSetHowlMaxNumBuckets";
/// Initial tenuring threshold flag.
pub const INITIAL_TENURING_THRESHOLD: &str = "InitialTenuringThreshold";
/// Maximum tenuring threshold flag.
pub const MAX_TENURING_THRESHOLD: &str = "MaxTenuringThreshold";
/// Promote every surviving object on its first collection.
pub const ALWAYS_TENURE: &str = "AlwaysTenure";
/// Never promote by age.
pub const NEVER_TENURE: &str = "NeverTenure";
/// Adaptive generation sizing flag.
pub const USE_ADAPTIVE_SIZE_POLICY: &str = "UseAdaptiveSizePolicy";
/// Stepped heap shrinking flag.
pub const SHRINK_HEAP_IN_STEPS: &str = "ShrinkHeapInSteps";

// ============================================================================
// SECTION: Token Parsing
// ============================================================================

/// Splits one runtime flag token into `(name, value)` pairs.
///
/// Accepts `-XX:Name=value`, `-XX:+Name`, `-XX:-Name`, and the `-Xmx`,
/// `-Xms`, `-Xmn` shorthands. `-Xms` sets both the minimum and initial heap
/// size; `-Xmn` sets both young sizes. Other `-X` options yield no pairs.
///
/// # Errors
///
/// Returns [`FlagError::MalformedToken`] when the token is not a flag.
pub fn parse_flag_token(token: &str) -> Result<Vec<(String, String)>, FlagError> {
    let malformed = || FlagError::MalformedToken(token.to_string());
    if let Some(body) = token.strip_prefix("-XX:") {
        if let Some(name) = body.strip_prefix('+') {
            return single_pair(name, "true").ok_or_else(malformed);
        }
        if let Some(name) = body.strip_prefix('-') {
            return single_pair(name, "false").ok_or_else(malformed);
        }
        let (name, value) = body.split_once('=').ok_or_else(malformed)?;
        return single_pair(name, value).ok_or_else(malformed);
    }
    if let Some(size) = token.strip_prefix("-Xmx") {
        return Ok(vec![(MAX_HEAP_SIZE.to_string(), size.to_string())]);
    }
    if let Some(size) = token.strip_prefix("-Xms") {
        return Ok(vec![
            (MIN_HEAP_SIZE.to_string(), size.to_string()),
            (INITIAL_HEAP_SIZE.to_string(), size.to_string()),
        ]);
    }
    if let Some(size) = token.strip_prefix("-Xmn") {
        return Ok(vec![
            (NEW_SIZE.to_string(), size.to_string()),
            (MAX_NEW_SIZE.to_string(), size.to_string()),
        ]);
    }
    if token.starts_with('-') && token.len() > 1 {
        return Ok(Vec::new());
    }
    Err(malformed())
}

/// Builds a one-element pair list when the flag name is well formed.
fn single_pair(name: &str, value: &str) -> Option<Vec<(String, String)>> {
    if name.is_empty() || !name.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_') {
        return None;
    }
    Some(vec![(name.to_string(), value.to_string())])
}

// ============================================================================
// SECTION: Configuration Fold
// ============================================================================

impl SizingConfig {
    /// Folds ordered `(flag, value)` pairs into a configuration.
    ///
    /// Starts from an empty configuration for the default collector. Later
    /// pairs override earlier ones for the same field; unknown flags are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError`] when a sizing flag carries an unparsable value.
    pub fn from_flags<I, N, V>(pairs: I) -> Result<Self, FlagError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        pairs
            .into_iter()
            .try_fold(Self::default(), |config, (name, value)| {
                config.with_flag(name.as_ref(), value.as_ref())
            })
    }

    /// Parses and folds a runtime flag token list.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError`] when a token is malformed or a value is invalid.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, FlagError> {
        let mut pairs = Vec::new();
        for token in tokens {
            pairs.extend(parse_flag_token(token.as_ref())?);
        }
        Self::from_flags(pairs)
    }

    /// Returns a copy of the configuration with one flag applied.
    fn with_flag(self, name: &str, value: &str) -> Result<Self, FlagError> {
        let config = match name {
            MIN_HEAP_SIZE => Self {
                min_heap: Some(size_value(name, value)?),
                ..self
            },
            INITIAL_HEAP_SIZE => Self {
                initial_heap: Some(size_value(name, value)?),
                ..self
            },
            MAX_HEAP_SIZE => Self {
                max_heap: Some(size_value(name, value)?),
                ..self
            },
            NEW_SIZE => Self {
                new_size: Some(size_value(name, value)?),
                ..self
            },
            MAX_NEW_SIZE => Self {
                max_new_size: Some(size_value(name, value)?),
                ..self
            },
            REGION_SIZE => Self {
                region_size: Some(size_value(name, value)?),
                ..self
            },
            NEW_RATIO => Self {
                new_ratio: Some(number_value(name, value)?),
                ..self
            },
            SURVIVOR_RATIO => Self {
                survivor_ratio: Some(number_value(name, value)?),
                ..self
            },
            INITIAL_SURVIVOR_RATIO => Self {
                initial_survivor_ratio: Some(number_value(name, value)?),
                ..self
            },
            MIN_SURVIVOR_RATIO => Self {
                min_survivor_ratio: Some(number_value(name, value)?),
                ..self
            },
            TARGET_SURVIVOR_RATIO => Self {
                target_survivor_ratio: Some(number_value(name, value)?),
                ..self
            },
            MIN_HEAP_FREE_RATIO => Self {
                min_heap_free_ratio: Some(number_value(name, value)?),
                ..self
            },
            MAX_HEAP_FREE_RATIO => Self {
                max_heap_free_ratio: Some(number_value(name, value)?),
                ..self
            },
            HOWL_NUM_BUCKETS => Self {
                howl_num_buckets: Some(number_value(name, value)?),
                ..self
            },
            HOWL_MAX_NUM_BUCKETS => Self {
                howl_max_num_buckets: Some(number_value(name, value)?),
                ..self
            },
            INITIAL_TENURING_THRESHOLD => Self {
                initial_tenuring_threshold: Some(number_value(name, value)?),
                ..self
            },
            MAX_TENURING_THRESHOLD => Self {
                max_tenuring_threshold: Some(number_value(name, value)?),
                never_tenure: false,
                ..self
            },
            ALWAYS_TENURE => {
                if bool_value(name, value)? {
                    Self {
                        max_tenuring_threshold: Some(0),
                        never_tenure: false,
                        ..self
                    }
                } else {
                    self
                }
            }
            NEVER_TENURE => {
                if bool_value(name, value)? {
                    Self {
                        never_tenure: true,
                        ..self
                    }
                } else {
                    self
                }
            }
            USE_ADAPTIVE_SIZE_POLICY => Self {
                use_adaptive_size_policy: Some(bool_value(name, value)?),
                ..self
            },
            SHRINK_HEAP_IN_STEPS => Self {
                shrink_heap_in_steps: Some(bool_value(name, value)?),
                ..self
            },
            _ => match CollectorVariant::ALL
                .into_iter()
                .find(|variant| variant.selection_flag() == name)
            {
                Some(collector) if bool_value(name, value)? => Self {
                    collector,
                    ..self
                },
                _ => self,
            },
        };
        Ok(config)
    }

    /// Renders the configuration as ordered `(flag, value)` pairs.
    ///
    /// The collector selection flag comes first. The ergonomic baseline is
    /// not a flag and is never rendered.
    #[must_use]
    pub fn flag_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(self.collector.selection_flag().to_string(), "true".to_string())];
        let sizes = [
            (MIN_HEAP_SIZE, self.min_heap),
            (INITIAL_HEAP_SIZE, self.initial_heap),
            (MAX_HEAP_SIZE, self.max_heap),
            (NEW_SIZE, self.new_size),
            (MAX_NEW_SIZE, self.max_new_size),
            (REGION_SIZE, self.region_size),
        ];
        for (name, value) in sizes {
            if let Some(value) = value {
                pairs.push((name.to_string(), format_size(value)));
            }
        }
        let numbers = [
            (NEW_RATIO, self.new_ratio),
            (SURVIVOR_RATIO, self.survivor_ratio),
            (INITIAL_SURVIVOR_RATIO, self.initial_survivor_ratio),
            (MIN_SURVIVOR_RATIO, self.min_survivor_ratio),
            (TARGET_SURVIVOR_RATIO, self.target_survivor_ratio),
            (MIN_HEAP_FREE_RATIO, self.min_heap_free_ratio),
            (MAX_HEAP_FREE_RATIO, self.max_heap_free_ratio),
            (HOWL_NUM_BUCKETS, self.howl_num_buckets),
            (HOWL_MAX_NUM_BUCKETS, self.howl_max_num_buckets),
            (INITIAL_TENURING_THRESHOLD, self.initial_tenuring_threshold),
            (MAX_TENURING_THRESHOLD, self.max_tenuring_threshold),
        ];
        for (name, value) in numbers {
            if let Some(value) = value {
                pairs.push((name.to_string(), value.to_string()));
            }
        }
        if self.never_tenure {
            pairs.push((NEVER_TENURE.to_string(), "true".to_string()));
        }
        let switches = [
            (USE_ADAPTIVE_SIZE_POLICY, self.use_adaptive_size_policy),
            (SHRINK_HEAP_IN_STEPS, self.shrink_heap_in_steps),
        ];
        for (name, value) in switches {
            if let Some(value) = value {
                pairs.push((name.to_string(), value.to_string()));
            }
        }
        pairs
    }
}

// ============================================================================
// SECTION: Value Parsing
// ============================================================================

/// Parses a size flag value.
fn size_value(name: &str, value: &str) -> Result<u64, FlagError> {
    parse_size(value).map_err(|source| FlagError::InvalidSize {
        flag: name.to_string(),
        source,
    })
}

/// Parses a plain decimal flag value.
fn number_value(name: &str, value: &str) -> Result<u64, FlagError> {
    value.trim().parse().map_err(|_| invalid_value(name, value))
}

/// Parses a boolean flag value.
fn bool_value(name: &str, value: &str) -> Result<bool, FlagError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid_value(name, value)),
    }
}

/// Builds an invalid-value error.
fn invalid_value(name: &str, value: &str) -> FlagError {
    FlagError::InvalidValue {
        flag: name.to_string(),
        value: value.to_string(),
    }
}
