//! Display/base unit conversion and fee arithmetic.
//!
//! Users type amounts in the display denomination (`1.5 HAL`); the
//! chain speaks integer base units (`1500000 uhal`). Conversion uses
//! the configured decimal exponent and rounds to the nearest base
//! unit. All validation happens here so the transfer flow never sees
//! a non-positive or unrepresentable amount.

use halcyon_types::{HalcyonError, Result};

// ---------------------------------------------------------------------------
// Display -> base
// ---------------------------------------------------------------------------

/// Parses a user-typed display amount into base units.
///
/// The input is trimmed and parsed as a decimal number, then scaled by
/// `10^decimals` and rounded to the nearest integer base unit.
///
/// # Errors
///
/// Returns [`HalcyonError::InvalidAmount`] if the input is not a
/// number, not finite, not positive, or rounds to zero base units.
pub fn parse_display_amount(raw: &str, decimals: u8) -> Result<u128> {
    let trimmed = raw.trim();
    let amount: f64 = trimmed.parse().map_err(|_| HalcyonError::InvalidAmount {
        reason: format!("'{trimmed}' is not a number"),
    })?;
    display_to_base(amount, decimals)
}

/// Converts a display amount to integer base units.
///
/// # Errors
///
/// Returns [`HalcyonError::InvalidAmount`] under the same conditions
/// as [`parse_display_amount`].
pub fn display_to_base(amount: f64, decimals: u8) -> Result<u128> {
    if !amount.is_finite() {
        return Err(HalcyonError::InvalidAmount {
            reason: "amount must be a finite number".into(),
        });
    }
    if amount <= 0.0 {
        return Err(HalcyonError::InvalidAmount {
            reason: "amount must be greater than zero".into(),
        });
    }

    let scaled = (amount * 10f64.powi(i32::from(decimals))).round();
    if scaled < 1.0 {
        return Err(HalcyonError::InvalidAmount {
            reason: "amount rounds to zero base units".into(),
        });
    }
    if scaled >= u128::MAX as f64 {
        return Err(HalcyonError::InvalidAmount {
            reason: "amount exceeds the representable range".into(),
        });
    }
    Ok(scaled as u128)
}

// ---------------------------------------------------------------------------
// Base -> display
// ---------------------------------------------------------------------------

/// Renders base units in the display denomination.
///
/// Produces a plain decimal string with trailing zeros trimmed, e.g.
/// `1002500` base units at 6 decimals render as `"1.0025"`. Callers
/// pass a validated configuration's `decimals` (at most 18).
pub fn base_to_display(amount: u128, decimals: u8) -> String {
    let scale = match 10u128.checked_pow(u32::from(decimals)) {
        Some(scale) => scale,
        None => return amount.to_string(),
    };

    let whole = amount / scale;
    let frac = amount % scale;
    if frac == 0 {
        return whole.to_string();
    }

    let frac_str = format!("{frac:0width$}", width = usize::from(decimals));
    format!("{whole}.{}", frac_str.trim_end_matches('0'))
}

// ---------------------------------------------------------------------------
// Fee
// ---------------------------------------------------------------------------

/// Computes the flat transfer fee in base units.
///
/// The fee is `gas_limit * gas_price` rounded to the nearest integer
/// base unit; a zero gas price yields a zero fee.
///
/// # Errors
///
/// Returns [`HalcyonError::ConfigError`] if the gas price is negative
/// or not finite.
pub fn fee_base_units(gas_limit: u64, gas_price: f64) -> Result<u128> {
    if !gas_price.is_finite() || gas_price < 0.0 {
        return Err(HalcyonError::ConfigError {
            reason: "gas_price must be a finite non-negative number".into(),
        });
    }

    let fee = (gas_limit as f64 * gas_price).round();
    if fee >= u128::MAX as f64 {
        return Err(HalcyonError::ConfigError {
            reason: "computed fee exceeds the representable range".into(),
        });
    }
    Ok(fee as u128)
}
