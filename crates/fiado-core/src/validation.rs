//! # Validation Module
//!
//! Boundary validation for the settlement flow.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Split editor (this crate)                                    │
//! │  ├── parse_amount: typed parser, at most 2 decimals                    │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Settlement engine (fiado-ledger)                             │
//! │  └── validate_settlement against the balance read inside the           │
//! │      storage transaction                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / CHECK / foreign key constraints                        │
//! │                                                                         │
//! │  Defense in depth: each layer catches different mistakes               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{splits_total, PaymentSplit};
use crate::SETTLEMENT_EPSILON;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Amount Parsing
// =============================================================================

/// Parses an operator-typed currency string into [`Money`].
///
/// Thin named wrapper over [`Money::parse`]; exists so callers validating a
/// form can reach for one module. Rejects anything that is not a
/// non-negative number with at most 2 decimal places.
///
/// ## Example
/// ```rust
/// use fiado_core::validation::parse_amount;
///
/// assert_eq!(parse_amount("12.50").unwrap().cents(), 1250);
/// assert!(parse_amount("12.505").is_err());
/// assert!(parse_amount("-3").is_err());
/// ```
pub fn parse_amount(input: &str) -> ValidationResult<Money> {
    Money::parse(input)
}

// =============================================================================
// Name Validation
// =============================================================================

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty after trimming
///
/// ## Returns
/// The trimmed name.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Settlement Validation
// =============================================================================

/// Validates a set of splits against the sale's remaining balance.
///
/// ## Rules
/// - No split amount may be negative
/// - The total must be strictly positive
/// - The total may exceed the remaining balance by at most the 1-cent
///   epsilon (so a full payment is never rejected over rounding)
///
/// ## Returns
/// The total amount about to be paid.
///
/// Runs before any persistence; a settlement failing here writes nothing.
pub fn validate_settlement(splits: &[PaymentSplit], remaining: Money) -> CoreResult<Money> {
    for split in splits {
        if split.amount_cents < 0 {
            return Err(CoreError::Validation(ValidationError::MustBePositive {
                field: format!("{} amount", split.method),
            }));
        }
    }

    let total = splits_total(splits);

    if !total.is_positive() {
        return Err(CoreError::NothingToPay);
    }

    if total > remaining + SETTLEMENT_EPSILON {
        return Err(CoreError::Overpayment {
            remaining_cents: remaining.cents(),
            offered_cents: total.cents(),
        });
    }

    Ok(total)
}

// =============================================================================
// Unit Tests
// =============================================================================
