//! # Domain Types
//!
//! Core domain types of the credit account ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   CreditSale    │   │    Payment      │   │  PaymentSplit   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  (transient)    │       │
//! │  │  id (UUID)      │◄──│  sale_id (FK)   │   │  ─────────────  │       │
//! │  │  customer_name  │   │  method         │   │  method         │       │
//! │  │  total_cents    │   │  cheque_status  │   │  amount_cents   │       │
//! │  │  paid           │   │  amount_cents   │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐                         │
//! │  │   DailyCash     │   │  DailyCashMovement  │                         │
//! │  │  ─────────────  │◄──│  ──────────────────  │                        │
//! │  │  date (unique)  │   │  amount, profit      │                        │
//! │  │  running totals │   │  items snapshot      │                        │
//! │  └─────────────────┘   └─────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `CreditSale.total_cents` is immutable once created; only `paid` flips,
//!   and only the settlement engine flips it.
//! - Payments are created only by the settlement engine and never mutated.
//! - A `DailyCash` aggregate is only ever incremented, never recomputed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a (part of a) settlement was paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Bank transfer.
    Transfer,
    /// Card payment on external terminal.
    Card,
    /// Cheque; carries a clearing sub-state (see [`ChequeStatus`]).
    Cheque,
}

impl PaymentMethod {
    /// The fixed method enumeration, in the order the split editor walks it
    /// when picking "the next unused method".
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Transfer,
        PaymentMethod::Card,
        PaymentMethod::Cheque,
    ];

    /// Stable lowercase label, matching the database representation.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Card => "card",
            PaymentMethod::Cheque => "cheque",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Cheque Status
// =============================================================================

/// Clearing sub-state of a cheque payment.
///
/// A pending cheque has been handed over but not cashed; under the
/// strict balance policy it does not yet reduce the customer's debt.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChequeStatus {
    /// Instrument received but not yet cashed.
    Pending,
    /// Instrument cashed; the money is real.
    Cleared,
}

// =============================================================================
// Movement Kind
// =============================================================================

/// Direction of a daily register movement.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Income,
    Expense,
}

// =============================================================================
// Credit Sale
// =============================================================================

/// A sale taken on credit ("fiado"): goods now, money later.
///
/// `total_cents` is fixed at sale time (line items + manual surcharge) and
/// never changes afterwards. The outstanding balance is always derived from
/// payments, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditSale {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Customer the debt belongs to. Display is case-sensitive; every
    /// lookup goes through [`crate::balance::normalize_customer_name`].
    pub customer_name: String,

    /// Manual surcharge added on top of the line items, in cents.
    pub manual_amount_cents: i64,

    /// Total owed for this sale, in cents. Immutable once created.
    pub total_cents: i64,

    /// Whether the sale has been fully settled.
    pub paid: bool,

    /// When the sale happened.
    pub sale_date: DateTime<Utc>,

    /// Payment-method breakdown recorded at sale time, for the portion the
    /// customer paid immediately (if any). Informational; the matching
    /// amounts also exist as [`Payment`] rows.
    pub payment_methods: Vec<MethodAmount>,

    pub created_at: DateTime<Utc>,
}

impl CreditSale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One (method, amount) pair in a sale's recorded breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodAmount {
    pub method: PaymentMethod,
    pub amount_cents: i64,
}

// =============================================================================
// Sale Line Item
// =============================================================================

/// A line item of a credit sale.
/// Uses the snapshot pattern: product data is frozen at sale time, so the
/// debt history survives later catalog edits.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineItem {
    pub id: String,
    pub sale_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Optional category tag, used by the balance calculator's filter.
    pub category: Option<String>,
    /// Unit of measure ("ud", "kg", ...).
    pub unit: String,
    /// Quantity sold; fractional for weighed goods.
    pub quantity: f64,
    /// Unit sale price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Unit cost price in cents, used for profit attribution.
    pub unit_cost_cents: i64,
    /// Line total in cents, frozen at sale time.
    pub line_total_cents: i64,
}

impl SaleLineItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Profit this line contributes: (unit price − unit cost) × quantity,
    /// rounded to the nearest cent.
    pub fn profit(&self) -> Money {
        let margin_cents = (self.unit_price_cents - self.unit_cost_cents) as f64;
        Money::from_cents((margin_cents * self.quantity).round() as i64)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A single monetary movement against exactly one credit sale.
///
/// Created only by the settlement engine; immutable thereafter; deleted
/// only when the sale it references is bulk-erased.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub sale_id: String,
    pub method: PaymentMethod,
    /// `Some` iff `method` is [`PaymentMethod::Cheque`]. New cheques start
    /// [`ChequeStatus::Pending`].
    pub cheque_status: Option<ChequeStatus>,
    /// Amount paid in cents. Always > 0.
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Payment Split (transient)
// =============================================================================

/// One (method, amount) pair being composed for a settlement.
///
/// Not persisted: splits live only inside the
/// [`SplitEditor`](crate::split::SplitEditor) until the settlement commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub method: PaymentMethod,
    pub amount_cents: i64,
}

impl PaymentSplit {
    pub fn new(method: PaymentMethod, amount: Money) -> Self {
        PaymentSplit {
            method,
            amount_cents: amount.cents(),
        }
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Sums the amounts of a slice of splits.
pub fn splits_total(splits: &[PaymentSplit]) -> Money {
    splits.iter().map(PaymentSplit::amount).sum()
}

// =============================================================================
// Settlement Snapshot
// =============================================================================

/// What a fully-settled sale contributes to the daily register.
///
/// `total_cents` is the amount paid in the *final* settlement, not the
/// sale's original total: a sale paid in tranches contributes only its last
/// tranche to the day it was cleared on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementSnapshot {
    pub sale_id: String,
    pub customer_name: String,
    /// Amount settled right now, in cents.
    pub total_cents: i64,
    /// Full line-item list of the original sale, carried for traceability.
    pub items: Vec<SaleLineItem>,
    /// The non-zero splits of the settlement.
    pub splits: Vec<PaymentSplit>,
    pub settled_at: DateTime<Utc>,
}

impl SettlementSnapshot {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Daily Cash Register
// =============================================================================

/// The per-calendar-day aggregate of the business's register.
///
/// Keyed by **local** date (`YYYY-MM-DD`), not UTC, so settlements done at
/// 23:30 do not land on tomorrow's page. Created on the first movement of
/// the day and thereafter only additively updated.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCash {
    pub id: String,
    /// Local calendar date, `YYYY-MM-DD`. Unique per aggregate.
    pub date: String,
    pub total_income_cents: i64,
    pub total_expense_cents: i64,
    pub total_profit_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyCash {
    #[inline]
    pub fn total_income(&self) -> Money {
        Money::from_cents(self.total_income_cents)
    }

    #[inline]
    pub fn total_profit(&self) -> Money {
        Money::from_cents(self.total_profit_cents)
    }
}

/// One entry in a day's register. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCashMovement {
    pub id: String,
    pub daily_cash_id: String,
    /// Amount of this movement in cents (one split's share).
    pub amount_cents: i64,
    pub description: String,
    pub kind: MovementKind,
    pub method: PaymentMethod,
    /// Full line-item snapshot of the originating sale, for traceability.
    /// Every movement of a settlement carries the whole list.
    pub items: Vec<SaleLineItem>,
    /// This movement's share of the settlement profit, in cents.
    pub profit_cents: i64,
    /// True when the movement came from a credit settlement rather than a
    /// direct sale.
    pub is_credit_payment: bool,
    /// The settled sale, when `is_credit_payment` is true.
    pub original_sale_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DailyCashMovement {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
