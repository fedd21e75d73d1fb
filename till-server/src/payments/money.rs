//! Money calculation utilities using rust_decimal for precision
//!
//! Every derived monetary value is rounded to 3 decimal places (the currency
//! carries 3 fractional digits) immediately after computation, so float error
//! cannot compound across the proportional divisions of the allocator.

use rust_decimal::prelude::*;
use shared::billing::{PaymentRequest, TenderMode};

use super::error::PaymentError;

/// Rounding scale for monetary values (3 decimal places, half-up)
const DECIMAL_PLACES: u32 = 3;

/// Tolerance for monetary comparisons and archiving (0.001)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Maximum allowed amount tendered per mode
const MAX_ENTERED_AMOUNT: f64 = 1_000_000.0;
/// Maximum allowed quantity per item selection
const MAX_QUANTITY: i32 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 3 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round an f64 to the monetary scale
#[inline]
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Integer thousandths of a monetary value, for use as an exact map key
#[inline]
pub fn to_mils(value: f64) -> i64 {
    (to_decimal(value) * Decimal::ONE_THOUSAND)
        .round()
        .to_i64()
        .unwrap_or_default()
}

/// Whether a remaining total counts as settled
pub fn is_settled(remaining: f64) -> bool {
    to_decimal(remaining) <= MONEY_TOLERANCE
}

#[inline]
fn require_finite(value: f64, field: &str) -> Result<(), PaymentError> {
    if !value.is_finite() {
        return Err(PaymentError::Validation(format!(
            "{} must be a finite number, got {}",
            field, value
        )));
    }
    Ok(())
}

fn validate_entered(amount: f64, field: &str) -> Result<(), PaymentError> {
    require_finite(amount, field)?;
    if amount <= 0.0 {
        return Err(PaymentError::Validation(format!(
            "{} must be positive, got {}",
            field, amount
        )));
    }
    if amount > MAX_ENTERED_AMOUNT {
        return Err(PaymentError::Validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field, MAX_ENTERED_AMOUNT, amount
        )));
    }
    Ok(())
}

/// Validate a payment request before any mutation
///
/// Rejects structurally invalid input (no items, no tender, non-finite or
/// non-positive amounts, credit mode without a client). Reported before any
/// side effect, per the error taxonomy.
pub fn validate_payment_request(req: &PaymentRequest) -> Result<(), PaymentError> {
    if req.items.is_empty() {
        return Err(PaymentError::Validation("no items selected".into()));
    }
    for sel in &req.items {
        if sel.quantity <= 0 {
            return Err(PaymentError::Validation(format!(
                "quantity must be positive, got {} for item {}",
                sel.quantity, sel.item_id
            )));
        }
        if sel.quantity > MAX_QUANTITY {
            return Err(PaymentError::Validation(format!(
                "quantity exceeds maximum allowed ({}), got {}",
                MAX_QUANTITY, sel.quantity
            )));
        }
    }

    match (&req.mode, &req.split_payments) {
        (Some(_), Some(_)) => {
            return Err(PaymentError::Validation(
                "mode and split_payments are mutually exclusive".into(),
            ));
        }
        (None, None) => {
            return Err(PaymentError::Validation("no tender mode provided".into()));
        }
        (Some(mode), None) => {
            let entered = req.entered_amount.ok_or_else(|| {
                PaymentError::Validation("entered_amount is required for single-mode acts".into())
            })?;
            validate_entered(entered, "entered_amount")?;
            if mode.is_credit() && req.credit_client_id.is_none() {
                return Err(PaymentError::Validation(
                    "credit payments require credit_client_id".into(),
                ));
            }
        }
        (None, Some(splits)) => {
            if splits.is_empty() {
                return Err(PaymentError::Validation("split_payments is empty".into()));
            }
            for split in splits {
                validate_entered(split.entered_amount, "entered_amount")?;
                if split.mode == TenderMode::Credit && split.credit_client_id.is_none() {
                    return Err(PaymentError::Validation(
                        "credit payments require credit_client_id".into(),
                    ));
                }
            }
        }
    }

    require_finite(req.discount, "discount")?;
    if req.discount < 0.0 {
        return Err(PaymentError::Validation(format!(
            "discount must be non-negative, got {}",
            req.discount
        )));
    }
    if req.is_percent_discount && req.discount > 100.0 {
        return Err(PaymentError::Validation(format!(
            "percent discount must be at most 100, got {}",
            req.discount
        )));
    }
    if let Some(fa) = req.final_amount {
        require_finite(fa, "final_amount")?;
        if fa < 0.0 {
            return Err(PaymentError::Validation(
                "final_amount must be non-negative".into(),
            ));
        }
    }

    Ok(())
}
