//! Checked decimal arithmetic.
//!
//! The workspace denies unchecked arithmetic, so every formula is built
//! from these helpers. Each returns [`ActionError::ArithmeticOverflow`]
//! instead of wrapping or panicking.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::error::ActionError;

/// `a + b`.
pub fn add(a: Decimal, b: Decimal) -> Result<Decimal, ActionError> {
    a.checked_add(b)
        .ok_or(ActionError::ArithmeticOverflow { context: "add" })
}

/// `a - b`.
pub fn sub(a: Decimal, b: Decimal) -> Result<Decimal, ActionError> {
    a.checked_sub(b)
        .ok_or(ActionError::ArithmeticOverflow { context: "sub" })
}

/// `a * b`.
pub fn mul(a: Decimal, b: Decimal) -> Result<Decimal, ActionError> {
    a.checked_mul(b)
        .ok_or(ActionError::ArithmeticOverflow { context: "mul" })
}

/// `a / b`. Division by zero is reported as overflow.
pub fn div(a: Decimal, b: Decimal) -> Result<Decimal, ActionError> {
    a.checked_div(b)
        .ok_or(ActionError::ArithmeticOverflow { context: "div" })
}

/// `base ^ exp` by repeated multiplication.
pub fn pow(base: Decimal, exp: u32) -> Result<Decimal, ActionError> {
    (0..exp).try_fold(Decimal::ONE, |acc, _| mul(acc, base))
}

/// `max(0, a - b)`.
pub fn sub_floor_zero(a: Decimal, b: Decimal) -> Result<Decimal, ActionError> {
    Ok(sub(a, b)?.max(Decimal::ZERO))
}

/// Round to two decimal places, half to even.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Round up to a whole `u32`. Negative values clamp to zero.
pub fn ceil_u32(value: Decimal) -> Result<u32, ActionError> {
    let ceiled = value.ceil().max(Decimal::ZERO);
    ceiled
        .to_u32()
        .ok_or(ActionError::ArithmeticOverflow { context: "ceil_u32" })
}

/// Round down to a whole `u32`. Negative values clamp to zero.
pub fn floor_u32(value: Decimal) -> Result<u32, ActionError> {
    let floored = value.floor().max(Decimal::ZERO);
    floored
        .to_u32()
        .ok_or(ActionError::ArithmeticOverflow { context: "floor_u32" })
}

/// Round half to even to a whole `i64`.
pub fn round_i64(value: Decimal) -> Result<i64, ActionError> {
    value
        .round()
        .to_i64()
        .ok_or(ActionError::ArithmeticOverflow { context: "round_i64" })
}

/// Convert to `f64` for trigonometry.
pub fn to_f64(value: Decimal) -> Result<f64, ActionError> {
    value
        .to_f64()
        .ok_or(ActionError::ArithmeticOverflow { context: "to_f64" })
}

/// Convert an `f64` result back into a decimal.
pub fn from_f64(value: f64) -> Result<Decimal, ActionError> {
    Decimal::from_f64(value).ok_or(ActionError::ArithmeticOverflow { context: "from_f64" })
}

/// Shift a timestamp by `delta`.
fn shift(at: DateTime<Utc>, delta: Option<TimeDelta>) -> Result<DateTime<Utc>, ActionError> {
    delta
        .and_then(|d| at.checked_add_signed(d))
        .ok_or(ActionError::ArithmeticOverflow { context: "timestamp" })
}

/// `-value`. Decimal negation cannot overflow.
pub fn negate(value: Decimal) -> Decimal {
    Decimal::ZERO.saturating_sub(value)
}

/// `at + seconds`.
pub fn after_seconds(at: DateTime<Utc>, seconds: i64) -> Result<DateTime<Utc>, ActionError> {
    shift(at, TimeDelta::try_seconds(seconds))
}

/// `at + minutes`.
pub fn after_minutes(at: DateTime<Utc>, minutes: i64) -> Result<DateTime<Utc>, ActionError> {
    shift(at, TimeDelta::try_minutes(minutes))
}

/// `at + hours`.
pub fn after_hours(at: DateTime<Utc>, hours: i64) -> Result<DateTime<Utc>, ActionError> {
    shift(at, TimeDelta::try_hours(hours))
}

/// `at + days`.
pub fn after_days(at: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, ActionError> {
    shift(at, TimeDelta::try_days(days))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn pow_matches_repeated_multiplication() {
        assert_eq!(pow(dec!(1.2), 0).ok(), Some(Decimal::ONE));
        assert_eq!(pow(dec!(1.2), 2).ok(), Some(dec!(1.44)));
        assert_eq!(pow(dec!(2.25), 3).ok(), Some(dec!(11.390625)));
    }

    #[test]
    fn pow_overflow_is_an_error() {
        let result = pow(dec!(1000), 20);
        assert!(matches!(result, Err(ActionError::ArithmeticOverflow { .. })));
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(ceil_u32(dec!(9.01)).ok(), Some(10));
        assert_eq!(ceil_u32(dec!(-3)).ok(), Some(0));
        assert_eq!(floor_u32(dec!(9.99)).ok(), Some(9));
        assert_eq!(round2(dec!(1.005)), dec!(1.00));
        assert_eq!(round2(dec!(1.015)), dec!(1.02));
        assert_eq!(round_i64(dec!(2.5)).ok(), Some(2));
    }

    #[test]
    fn division_by_zero_is_reported() {
        assert!(div(Decimal::ONE, Decimal::ZERO).is_err());
    }

    #[test]
    fn floor_zero_subtraction() {
        assert_eq!(sub_floor_zero(dec!(1), dec!(3)).ok(), Some(Decimal::ZERO));
        assert_eq!(sub_floor_zero(dec!(3), dec!(1)).ok(), Some(dec!(2)));
    }
}
