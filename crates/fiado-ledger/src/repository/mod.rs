//! # Repository Module
//!
//! Record-store access for the credit ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │  ledger.credit().list_sales(Some("Ana"), None)                  │
//! │       ▼                                                                 │
//! │  CreditRepository                                                       │
//! │  ├── pool-scoped reads (list_sales, list_payments, ...)                 │
//! │  └── executor-generic writes (insert_payment, set_paid, ...) that the   │
//! │      settlement engine calls inside ONE transaction, so a failed        │
//! │      settlement leaves no partial rows behind                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`credit::CreditRepository`] - credit sales, line items, payments
//! - [`cash::CashRepository`] - daily cash aggregates and movements

pub mod cash;
pub mod credit;
