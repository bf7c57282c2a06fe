//! Volume arithmetic
//!
//! Percentages are scaled against the raw range a mixer control reports.
//! Relative changes clamp at the top of the range only: lowering past the
//! minimum yields a value below `min`, which the mixer itself then limits.

/// Raw range of a mixer control, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

impl Range {
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    #[allow(clippy::cast_precision_loss)]
    fn span(self) -> f64 {
        (self.max - self.min) as f64
    }
}

/// `percent / 100`, limited to `0.0..=1.0`
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn fraction(percent: i64) -> f64 {
    (percent as f64 / 100.0).clamp(0.0, 1.0)
}

/// Absolute level for `percent` of `range`, rounded to the nearest step
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn absolute(range: Range, percent: i64) -> i64 {
    range.min + (range.span() * fraction(percent)).round() as i64
}

/// Level after raising `current` by `percent` of `range`
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#[must_use]
pub fn raised(range: Range, current: i64, percent: i64) -> i64 {
    let level = (current as f64 + range.span() * fraction(percent)) as i64;
    level.min(range.max)
}

/// Level after lowering `current` by `percent` of `range`
///
/// Only the upper bound is enforced. The fractional result truncates toward
/// zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#[must_use]
pub fn lowered(range: Range, current: i64, percent: i64) -> i64 {
    let level = (current as f64 - range.span() * fraction(percent)) as i64;
    level.min(range.max)
}
