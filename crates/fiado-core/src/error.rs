//! # Error Types
//!
//! Domain-specific error types for fiado-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fiado-core errors (this file)                                          │
//! │  ├── CoreError        - Ledger rule violations                          │
//! │  └── ValidationError  - Operator input failures                         │
//! │                                                                         │
//! │  fiado-ledger errors (separate crate)                                   │
//! │  └── LedgerError      - Storage operation failures                      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → user-facing message  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amounts, ids)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger business rule violations.
///
/// These errors represent bookkeeping rules the settlement engine refuses to
/// break. They are raised before any persistence happens.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Credit sale cannot be found at settlement time.
    #[error("Credit sale not found: {0}")]
    SaleNotFound(String),

    /// The sale has already been fully settled.
    #[error("Credit sale {0} is already paid")]
    SaleAlreadyPaid(String),

    /// The splits sum to zero; there is nothing to settle.
    #[error("Payment total must be greater than zero")]
    NothingToPay,

    /// The splits sum to more than the sale still owes.
    ///
    /// A 1-cent epsilon is already applied before this is raised, so a
    /// legitimate full payment is never rejected for rounding reasons.
    #[error("Payment of {offered_cents} cents exceeds remaining balance of {remaining_cents} cents")]
    Overpayment {
        remaining_cents: i64,
        offered_cents: i64,
    },

    /// A settlement cannot carry more than the split limit.
    #[error("Cannot use more than {max} payment methods in one settlement")]
    SplitLimitReached { max: usize },

    /// Every payment method is already present in the split set.
    #[error("No unused payment method left to add")]
    NoUnusedMethod,

    /// The requested method is already used by another split.
    #[error("Payment method {0} is already part of this settlement")]
    DuplicateMethod(String),

    /// Split index out of range for the current editor state.
    #[error("No payment split at position {0}")]
    InvalidSplitIndex(usize),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Operator input validation errors.
///
/// These occur when typed-in values do not meet requirements. Used for early
/// validation at the boundary, before ledger logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A currency string could not be parsed as a non-negative amount with
    /// at most 2 decimal places.
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::Overpayment {
            remaining_cents: 50000,
            offered_cents: 60000,
        };
        assert_eq!(
            err.to_string(),
            "Payment of 60000 cents exceeds remaining balance of 50000 cents"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::InvalidAmount {
            input: "10.999".to_string(),
            reason: "at most 2 decimal places allowed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid amount '10.999': at most 2 decimal places allowed"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "customer".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
