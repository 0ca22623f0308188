//! Per-sample tolerance
//!
//! A sample passes when it is within one level of the expected value. A short
//! allow-list records individual positions where a codec's edge filtering is
//! known to land on some other value.

use crate::error::{Channel, Mismatch};

/// Distance from the expected level that still passes
pub const TOLERANCE: u8 = 1;

/// A value accepted at one position in place of the expected level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exception {
    /// Logical row
    pub row: usize,
    /// Column
    pub col: usize,
    /// Level the position should have
    pub expected: u8,
    /// Value accepted instead
    pub accepted: u8,
}

/// Known edge-filtering artifacts
pub const EXCEPTIONS: &[Exception] = &[Exception {
    row: 0,
    col: 21,
    expected: 255,
    accepted: 217,
}];

/// Returns true if `actual` passes a check against `expected` at `(row, col)`
#[inline]
pub fn accepts(row: usize, col: usize, expected: u8, actual: u8) -> bool {
    actual.abs_diff(expected) <= TOLERANCE
        || EXCEPTIONS.iter().any(|e| {
            e.row == row && e.col == col && e.expected == expected && e.accepted == actual
        })
}

/// Check one sample, producing a [`Mismatch`] on failure
#[inline]
pub fn check(
    channel: Channel,
    row: usize,
    col: usize,
    expected: u8,
    actual: u8,
) -> Option<Mismatch> {
    (!accepts(row, col, expected, actual)).then_some(Mismatch {
        channel,
        row,
        col,
        expected,
        actual,
    })
}
