//! Exact conversion of human-readable amounts into base units.

use crate::models::Amount;
use num_bigint::BigUint;
use thiserror::Error;

/// Largest precision accepted. A `uint256` has 78 decimal digits.
pub const MAX_DECIMALS: u32 = 77;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is required")]
    Missing,

    #[error("amount is empty")]
    Empty,

    #[error("Unsupported precision: {got} decimals, max {max}")]
    DecimalsTooLarge { got: u32, max: u32 },

    #[error("Too many decimal places: got {got}, max {max}")]
    TooManyDecimals { got: usize, max: u32 },

    #[error("Invalid amount: {0}")]
    InvalidDigits(String),
}

/// Converts a decimal amount into an integer count of base units.
///
/// `to_base_units(Some(&"0.1".into()), 18)` is `100000000000000000`. The
/// fractional part may not be longer than `decimals`; nothing is rounded.
pub fn to_base_units(amount: Option<&Amount>, decimals: u32) -> Result<BigUint, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::DecimalsTooLarge {
            got: decimals,
            max: MAX_DECIMALS,
        });
    }

    let raw = amount.ok_or(AmountError::Missing)?.as_str().trim();
    if raw.is_empty() {
        return Err(AmountError::Empty);
    }

    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw, ""));
    let int_part = if int_part.is_empty() { "0" } else { int_part };

    if !is_digits(int_part) || !(frac_part.is_empty() || is_digits(frac_part)) {
        return Err(AmountError::InvalidDigits(raw.to_string()));
    }

    if frac_part.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals {
            got: frac_part.len(),
            max: decimals,
        });
    }

    let mut digits = String::with_capacity(int_part.len() + decimals as usize);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    digits.extend(std::iter::repeat('0').take(decimals as usize - frac_part.len()));

    let trimmed = digits.trim_start_matches('0');
    let cleaned = if trimmed.is_empty() { "0" } else { trimmed };

    BigUint::parse_bytes(cleaned.as_bytes(), 10)
        .ok_or_else(|| AmountError::InvalidDigits(raw.to_string()))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
