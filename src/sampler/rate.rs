//! Per-second rates from cumulative status counters.
//!
//! Rounding is half-up toward positive infinity on the f64 product
//! `value * 100.0`: the product is rounded up when its fractional part is at
//! least one half, then divided by 100. The product itself is rounded to the
//! nearest f64, so `2.675 * 100.0` lands exactly on `267.5` and rounds up to
//! `2.68`, while `1.005 * 100.0` lands just below `100.5` and rounds down to
//! `1.0`. `0.125` rounds to `0.13` and `-0.125` to `-0.12`.

use thiserror::Error;

/// A raw status value that is not a non-negative integer counter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("could not parse counter value {raw:?}")]
pub struct ParseFailure {
    pub raw: String,
}

/// Parse a raw status string as a counter.
///
/// # Errors
///
/// Returns `ParseFailure` if the value is not a non-negative integer.
pub fn parse_counter(raw: &str) -> Result<u64, ParseFailure> {
    raw.trim().parse::<u64>().map_err(|_| ParseFailure {
        raw: raw.to_string(),
    })
}

#[must_use]
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    let floor = scaled.floor();
    let rounded = if scaled - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded / 100.0
}

/// Rate of change per second between two counter observations.
///
/// Returns `None` on the bootstrap sample (no previous value or timestamp)
/// and when the elapsed time is zero or negative. A counter that went
/// backwards yields a negative rate.
#[must_use]
pub fn compute_rate(
    previous: Option<u64>,
    current: u64,
    previous_millis: Option<i64>,
    current_millis: i64,
) -> Option<f64> {
    compute_scaled_rate(previous, current, previous_millis, current_millis, 1)
}

/// Same as [`compute_rate`] but the counter delta is first integer-divided
/// by `divisor` (truncating toward zero), e.g. 1024 to report KiB/s.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_scaled_rate(
    previous: Option<u64>,
    current: u64,
    previous_millis: Option<i64>,
    current_millis: i64,
    divisor: u64,
) -> Option<f64> {
    let previous = previous?;
    let elapsed_millis = current_millis.checked_sub(previous_millis?)?;
    if elapsed_millis <= 0 {
        return None;
    }

    let delta = (i128::from(current) - i128::from(previous)) / i128::from(divisor.max(1));
    let seconds = elapsed_millis as f64 / 1000.0;
    let rate = round2(delta as f64 / seconds);

    rate.is_finite().then_some(rate)
}
