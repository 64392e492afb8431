//! Conversion between smallest-unit integers and human decimal amounts.
//!
//! `"100000"` at 6 decimals is `"0.1"` USDC. Arithmetic is done on
//! [`Decimal`] so no value passes through floating point. `Decimal` holds up
//! to 28 fractional digits and a 96-bit mantissa; larger inputs are rejected
//! with [`AmountError::OutOfRange`].

use rust_decimal::Decimal;

/// Largest number of decimals [`Decimal`] can represent.
pub const MAX_DECIMALS: u32 = 28;

/// Errors from amount conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The input is not a plain decimal number.
    #[error("invalid amount: {0:?}")]
    Invalid(String),
    /// The input is negative.
    #[error("amount must not be negative: {0}")]
    Negative(String),
    /// The input has more fractional digits than the token supports.
    #[error("amount {amount} has more than {decimals} fractional digits")]
    TooPrecise {
        /// Offending input.
        amount: String,
        /// Token decimals.
        decimals: u32,
    },
    /// The value or the decimals exceed what can be represented.
    #[error("amount {0} is out of range")]
    OutOfRange(String),
}

fn parse_plain(amount: &str, allow_fraction: bool) -> Result<Decimal, AmountError> {
    let trimmed = amount.trim();
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative(trimmed.to_owned()));
    }
    let mut dots = 0;
    let mut digits = 0;
    for c in trimmed.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' if allow_fraction => dots += 1,
            _ => return Err(AmountError::Invalid(trimmed.to_owned())),
        }
    }
    if digits == 0 || dots > 1 {
        return Err(AmountError::Invalid(trimmed.to_owned()));
    }
    trimmed
        .parse::<Decimal>()
        .map_err(|_| AmountError::OutOfRange(trimmed.to_owned()))
}

/// Formats a smallest-unit integer string as a decimal string.
///
/// Trailing zeros are dropped: `format_amount("1000000", 6)` is `"1"`.
///
/// # Errors
///
/// Returns [`AmountError`] if `amount` is not a non-negative integer, or if the
/// value or `decimals` exceed [`Decimal`]'s range.
pub fn format_amount(amount: &str, decimals: u32) -> Result<String, AmountError> {
    let mut value = parse_plain(amount, false)?;
    value
        .set_scale(decimals)
        .map_err(|_| AmountError::OutOfRange(amount.trim().to_owned()))?;
    Ok(value.normalize().to_string())
}

/// Parses a human decimal string into a smallest-unit integer string.
///
/// # Errors
///
/// Returns [`AmountError`] if `amount` is not a non-negative decimal, has more
/// than `decimals` fractional digits, or does not fit.
pub fn parse_amount(amount: &str, decimals: u32) -> Result<String, AmountError> {
    let value = parse_plain(amount, true)?.normalize();
    if value.scale() > decimals {
        return Err(AmountError::TooPrecise {
            amount: amount.trim().to_owned(),
            decimals,
        });
    }
    let out_of_range = || AmountError::OutOfRange(amount.trim().to_owned());
    if decimals > MAX_DECIMALS {
        return Err(out_of_range());
    }
    let factor = Decimal::from_i128_with_scale(10_i128.pow(decimals), 0);
    let scaled = value.checked_mul(factor).ok_or_else(out_of_range)?;
    Ok(scaled.normalize().trunc().to_string())
}
