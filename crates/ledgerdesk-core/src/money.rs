//! Conversion between user-entered major units and upstream minor units

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{CoreError, CoreResult};
use crate::models::PRECISION;

/// Parse a form amount like `"10.50"` into minor units (`1050`).
///
/// Zero, negative and non-numeric inputs are rejected.
pub fn parse_amount_to_minor(input: &str) -> CoreResult<i64> {
    let trimmed = input.trim();
    let invalid = || CoreError::InvalidAmount {
        input: input.to_string(),
    };

    let value = Decimal::from_str(trimmed).map_err(|_| invalid())?;
    if value <= Decimal::ZERO {
        return Err(invalid());
    }

    value
        .checked_mul(Decimal::from(PRECISION))
        .ok_or_else(invalid)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(invalid)
}

/// Render minor units as a major-unit string with thousands separators
pub fn format_minor(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let precision = PRECISION as u64;
    format!(
        "{}{}.{:02}",
        sign,
        ledgerdesk_utils::format_number(abs / precision),
        abs % precision
    )
}

/// `format_minor` with the currency code appended
pub fn format_money(minor: i64, currency: &str) -> String {
    if currency.is_empty() {
        format_minor(minor)
    } else {
        format!("{} {}", format_minor(minor), currency)
    }
}
