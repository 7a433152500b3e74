//! Conversion between human-decimal token amounts and base-unit integers.
//!
//! Contract calls take amounts in the token's smallest unit, while callers pass
//! decimal strings like `"10.5"`. Conversion delegates to the alloy unit helpers;
//! this module only fixes the string form so the round trip is lossless:
//! converting a decimal string to base units and back yields the same string.

use alloy_primitives::U256;
use alloy_primitives::utils::{UnitsError, format_units, parse_units};

/// Converts a human-decimal amount (e.g. `"10.5"`) to base units at the given
/// precision. `"10.5"` at 18 decimals becomes `10500000000000000000`.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let parsed = parse_units(amount, decimals)?;
    Ok(parsed.get_absolute())
}

/// Converts a slice of decimal amounts to base units, preserving order.
///
/// Used for arguments that take amount arrays, such as discount slab thresholds.
pub fn to_base_units_many(amounts: &[&str], decimals: u8) -> Result<Vec<U256>, UnitsError> {
    amounts
        .iter()
        .map(|amount| to_base_units(amount, decimals))
        .collect()
}

/// Converts a base-unit integer back to its decimal string representation.
///
/// Trailing fractional zeros are trimmed so that `to_decimal(to_base_units(s))`
/// returns `s` for any canonical decimal string `s`.
pub fn to_decimal(value: U256, decimals: u8) -> Result<String, UnitsError> {
    let formatted = format_units(value, decimals)?;
    if !formatted.contains('.') {
        return Ok(formatted);
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    Ok(trimmed.to_string())
}
