//! Currency Quantization
//!
//! Converts decimal money amounts into integer minor units (pence, cents) so the solver
//! can work with exact integer sums. Amounts are rounded to the nearest minor unit with
//! ties rounded away from zero.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};

/// Rounds `amount` (in major units) to the nearest minor unit of a currency with the
/// given `exponent`.
///
/// The mapping is total and preserves ordering: amounts that cannot be represented as an
/// `i64` number of minor units saturate at `i64::MIN` / `i64::MAX`.
pub fn quantize(amount: Decimal, exponent: u32) -> i64 {
    let saturated = if amount.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    };

    let Some(scale) = 10_i64.checked_pow(exponent).map(Decimal::from) else {
        return saturated;
    };

    amount
        .checked_mul(scale)
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .unwrap_or(saturated)
}

/// Quantize a floating point amount.
///
/// This is the only place a float enters the solver pipeline. Returns `None` when the
/// value is NaN or infinite.
pub fn quantize_f64(amount: f64, exponent: u32) -> Option<i64> {
    if !amount.is_finite() {
        return None;
    }

    Decimal::from_f64(amount).map(|value| quantize(value, exponent))
}

/// Quantize a money amount using its own currency exponent.
pub fn quantize_money(money: &Money<'_, Currency>) -> i64 {
    quantize(*money.amount(), money.currency().exponent)
}

/// Converts minor units back into a money amount in the given currency.
pub fn dequantize(minor_units: i64, currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(minor_units, currency)
}
