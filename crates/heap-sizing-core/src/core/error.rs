// crates/heap-sizing-core/src/core/error.rs
// ============================================================================
// Module: Sizing Errors
// Description: Invalid-configuration taxonomy for the sizing policy.
// Purpose: Mirror "runtime refuses to start" outcomes as structured values.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`SizingError`] is returned before any process is launched or probe taken.
//! Each variant carries the offending flag names and values so a caller can
//! render a diagnostic without re-running the scenario, and exposes the
//! fragment the runtime prints when it refuses the same configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::units::SizeParseError;

// ============================================================================
// SECTION: Heap Bounds
// ============================================================================

/// Explicit heap bounds that participate in ordering checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapBound {
    /// Minimum heap size.
    Min,
    /// Initial heap size.
    Initial,
    /// Maximum heap size.
    Max,
}

impl HeapBound {
    /// Returns the flag name of the bound.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Min => "MinHeapSize",
            Self::Initial => "InitialHeapSize",
            Self::Max => "MaxHeapSize",
        }
    }
}

// ============================================================================
// SECTION: Sizing Errors
// ============================================================================

/// Invalid sizing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizingError {
    /// Two explicit heap bounds violate `min <= initial <= max`.
    #[error("{} ({lower_value}) must be less than or equal to {} ({upper_value})", lower.flag(), upper.flag())]
    HeapOrdering {
        /// Bound that should be the smaller one.
        lower: HeapBound,
        /// Its explicit value.
        lower_value: u64,
        /// Bound that should be the larger one.
        upper: HeapBound,
        /// Its explicit value.
        upper_value: u64,
    },
    /// A ratio flag is zero.
    #[error("{flag} must be greater than 0")]
    NonPositiveRatio {
        /// Flag name.
        flag: &'static str,
    },
    /// A bounded flag is outside its allowed range.
    #[error("{flag} ({value}) is outside the allowed range [ {min} ... {max} ]")]
    OutOfRange {
        /// Flag name.
        flag: &'static str,
        /// Offending value.
        value: u64,
        /// Inclusive lower bound.
        min: u64,
        /// Inclusive upper bound.
        max: u64,
    },
    /// Explicit young size exceeds the explicit young maximum.
    #[error(
        "initial young gen size set larger than the maximum young gen size (NewSize {new_size}, MaxNewSize {max_new_size})"
    )]
    YoungOrdering {
        /// Explicit `NewSize`.
        new_size: u64,
        /// Explicit `MaxNewSize`.
        max_new_size: u64,
    },
    /// Two paired flags violate `lower <= upper`.
    #[error("{lower_flag} ({lower}) must be less than or equal to {upper_flag} ({upper})")]
    PairOrdering {
        /// Flag that should be the smaller one.
        lower_flag: &'static str,
        /// Its value.
        lower: u64,
        /// Flag that should be the larger one.
        upper_flag: &'static str,
        /// Its value.
        upper: u64,
    },
    /// A flag that must be a power of two is not.
    #[error("{flag} ({value}) must be a power of 2")]
    NotPowerOfTwo {
        /// Flag name.
        flag: &'static str,
        /// Offending value.
        value: u64,
    },
    /// An alignment fact supplied by the target is unusable.
    #[error("{name} alignment ({value}) must be a non-zero power of 2")]
    InvalidAlignment {
        /// Alignment name.
        name: &'static str,
        /// Offending value.
        value: u64,
    },
}

impl SizingError {
    /// Returns the message fragment the runtime prints when it refuses to
    /// start with the same configuration, when one exists.
    #[must_use]
    pub const fn runtime_refusal_fragment(&self) -> Option<&'static str> {
        match self {
            Self::HeapOrdering {
                lower: HeapBound::Initial,
                upper: HeapBound::Max,
                ..
            } => Some("Initial heap size set to a larger value than the maximum heap size"),
            Self::HeapOrdering {
                lower: HeapBound::Min,
                upper: HeapBound::Initial,
                ..
            } => Some("Incompatible minimum and initial heap sizes specified"),
            Self::HeapOrdering {
                ..
            } => Some("Incompatible minimum and maximum heap sizes specified"),
            Self::NonPositiveRatio {
                ..
            }
            | Self::OutOfRange {
                ..
            } => Some("is outside the allowed range"),
            Self::YoungOrdering {
                ..
            } => Some("initial young gen size set larger than the maximum young gen size"),
            Self::PairOrdering {
                ..
            } => Some("must be less than or equal to"),
            Self::NotPowerOfTwo {
                ..
            } => Some("must be a power of 2"),
            Self::InvalidAlignment {
                ..
            } => None,
        }
    }
}

// ============================================================================
// SECTION: Flag Errors
// ============================================================================

/// Errors raised while folding flag tokens into a sizing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// Token does not follow a recognized flag syntax.
    #[error("malformed flag token: {0}")]
    MalformedToken(String),
    /// A sizing flag carried a value that does not parse.
    #[error("invalid value for {flag}: {value}")]
    InvalidValue {
        /// Flag name.
        flag: String,
        /// Raw value.
        value: String,
    },
    /// A size flag carried an unparsable size literal.
    #[error("invalid size for {flag}: {source}")]
    InvalidSize {
        /// Flag name.
        flag: String,
        /// Underlying parse error.
        source: SizeParseError,
    },
}
