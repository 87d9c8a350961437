//! # fiado-core: Pure Business Logic of the Credit Ledger
//!
//! This crate is the **heart** of the credit account ledger. It contains all
//! bookkeeping logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Fiado Architecture                                 │
//! │                                                                         │
//! │  Operator input (settlement dialog)                                    │
//! │       │                                                                 │
//! │  ┌────▼────────────────────────────────────────────────────────────┐   │
//! │  │               ★ fiado-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  balance  │  │   split   │  │   │
//! │  │   │CreditSale │  │   Money   │  │  derive   │  │SplitEditor│  │   │
//! │  │   │  Payment  │  │  parser   │  │  balances │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └────┬────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │  ┌────▼────────────────────────────────────────────────────────────┐   │
//! │  │              fiado-ledger (Storage + Settlement)                │   │
//! │  │        SQLite repositories, settlement unit of work             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CreditSale, Payment, DailyCash, ...)
//! - [`money`] - Money type with integer cents arithmetic (no floating point!)
//! - [`balance`] - Balance calculator (pure derivation, cheque policies)
//! - [`split`] - Payment split editor for composing a settlement
//! - [`cash`] - Daily register movement construction and profit attribution
//! - [`validation`] - Boundary validation (typed amount parser, split rules)
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Same input = same output; balances are derived,
//!    never stored
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are cents (i64); the typed
//!    parser is the only way operator input becomes money
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balance;
pub mod cash;
pub mod error;
pub mod money;
pub mod split;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use fiado_core::Money` instead of
// `use fiado_core::money::Money`

pub use balance::ChequePolicy;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use split::SplitEditor;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum payment splits in a single settlement.
///
/// ## Business Reason
/// A customer realistically pays one debt with at most three instruments at
/// once; more is almost certainly an input mistake.
pub const MAX_SPLITS: usize = 3;

/// Tolerance applied when comparing a payment total against a remaining
/// balance, and when deciding whether a sale is fully settled.
///
/// ## Business Reason
/// Guards against a legitimate full payment being rejected over a rounding
/// cent. One cent, nothing more.
pub const SETTLEMENT_EPSILON: Money = Money::from_cents(1);
