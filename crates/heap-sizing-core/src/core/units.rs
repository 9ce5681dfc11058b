// crates/heap-sizing-core/src/core/units.rs
// ============================================================================
// Module: Byte Units and Alignment Arithmetic
// Description: Size constants, power-of-two alignment helpers, size literals.
// Purpose: Centralize the rounding rules shared by every sizing formula.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! All sizes are byte counts held in `u64`. Alignment helpers assume a
//! power-of-two boundary; callers validate boundaries before use. Size
//! literals follow the runtime's flag syntax (`64m`, `1G`, `512k`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// One kibibyte.
pub const K: u64 = 1024;
/// One mebibyte.
pub const M: u64 = K * 1024;
/// One gibibyte.
pub const G: u64 = M * 1024;
/// One tebibyte.
pub const T: u64 = G * 1024;

// ============================================================================
// SECTION: Alignment
// ============================================================================

/// Rounds `value` down to a multiple of `alignment`.
///
/// A zero alignment leaves the value unchanged.
#[must_use]
pub const fn align_down(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    value - value % alignment
}

/// Rounds `value` up to a multiple of `alignment`, saturating at the largest
/// aligned value representable in `u64`.
#[must_use]
pub const fn align_up(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    let remainder = value % alignment;
    if remainder == 0 {
        return value;
    }
    match value.checked_add(alignment - remainder) {
        Some(aligned) => aligned,
        None => align_down(u64::MAX, alignment),
    }
}

/// Returns the largest power of two that is `<= value` (zero for zero).
#[must_use]
pub const fn prev_power_of_two(value: u64) -> u64 {
    if value == 0 {
        return 0;
    }
    1 << (63 - value.leading_zeros())
}

// ============================================================================
// SECTION: Size Literals
// ============================================================================

/// Size literal parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeParseError {
    /// Literal was empty.
    #[error("empty size literal")]
    Empty,
    /// Literal contained a non-digit where digits were expected.
    #[error("invalid size literal: {0}")]
    Invalid(String),
    /// Literal overflowed 64 bits after applying the suffix.
    #[error("size literal overflows: {0}")]
    Overflow(String),
}

/// Parses a size literal such as `128m`, `2G`, `4096` or `512k`.
///
/// # Errors
///
/// Returns [`SizeParseError`] when the literal is empty, malformed, or too
/// large for `u64`.
pub fn parse_size(literal: &str) -> Result<u64, SizeParseError> {
    let literal = literal.trim();
    if literal.is_empty() {
        return Err(SizeParseError::Empty);
    }
    let (digits, scale) = match literal.as_bytes()[literal.len() - 1] {
        b'k' | b'K' => (&literal[.. literal.len() - 1], K),
        b'm' | b'M' => (&literal[.. literal.len() - 1], M),
        b'g' | b'G' => (&literal[.. literal.len() - 1], G),
        b't' | b'T' => (&literal[.. literal.len() - 1], T),
        _ => (literal, 1),
    };
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(SizeParseError::Invalid(literal.to_string()));
    }
    let value: u64 =
        digits.parse().map_err(|_| SizeParseError::Overflow(literal.to_string()))?;
    value.checked_mul(scale).ok_or_else(|| SizeParseError::Overflow(literal.to_string()))
}

/// Renders a byte count as the shortest exact size literal (`128m`, `1g`).
#[must_use]
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0".to_string();
    }
    for (scale, suffix) in [(T, "t"), (G, "g"), (M, "m"), (K, "k")] {
        if bytes % scale == 0 {
            return format!("{}{suffix}", bytes / scale);
        }
    }
    bytes.to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
