//! Display formatting for currency amounts and percentages.
//!
//! Only used for `*_display` output fields. Canonical numeric fields are
//! rendered with [`format_decimal`] so consumers get the full value.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::DisplayConfig;

/// Canonical string form: full precision, trailing zeros stripped.
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

fn group_int_digits(int_part: &str) -> String {
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

fn pad_fraction_to_dp(s: &str, dp: u32) -> String {
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    if dp == 0 {
        return int_part.to_string();
    }

    let frac: String = frac_part
        .chars()
        .chain(std::iter::repeat('0'))
        .take(dp as usize)
        .collect();
    format!("{int_part}.{frac}")
}

fn round(value: Decimal, dp: Option<u32>) -> Decimal {
    match dp {
        Some(dp) => value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        None => value,
    }
}

/// Format a currency amount for display, e.g. `-$1,234.50`.
pub fn format_currency(value: Decimal, display: &DisplayConfig) -> String {
    let rounded = round(value, display.currency_decimals);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let mut s = rounded.abs().normalize().to_string();
    if display.currency_fixed_decimals {
        if let Some(dp) = display.currency_decimals {
            s = pad_fraction_to_dp(&s, dp);
        }
    }
    if display.currency_grouping {
        s = match s.split_once('.') {
            Some((int_part, frac)) => format!("{}.{frac}", group_int_digits(int_part)),
            None => group_int_digits(&s),
        };
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if let Some(sym) = &display.currency_symbol {
        out.push_str(sym);
    }
    out.push_str(&s);
    out
}

/// Format a percentage with a fixed number of decimals, e.g. `13.33%`.
pub fn format_percentage(value: Decimal, decimals: u32) -> String {
    let rounded = round(value, Some(decimals));
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format!(
        "{}%",
        pad_fraction_to_dp(&rounded.normalize().to_string(), decimals)
    )
}
