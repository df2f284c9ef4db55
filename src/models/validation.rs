use rust_decimal::Decimal;

/// Rejected user input at the data-entry boundary.
///
/// Records that reach storage or the valuation functions have already passed
/// these checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: Decimal },

    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: Decimal },

    #[error("{field} must not exceed {max} (got {value})")]
    TooLarge {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },
}

/// Largest accepted quantity or per-unit price (one trillion).
///
/// Keeps price × quantity, and sums over many holdings, inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

pub(crate) fn require_non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

pub(crate) fn require_positive(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(())
}

pub(crate) fn require_within_limit(
    field: &'static str,
    value: Decimal,
) -> Result<(), ValidationError> {
    if value > MAX_AMOUNT {
        return Err(ValidationError::TooLarge {
            field,
            value,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}
