//! # Fiado Ledger
//!
//! SQLite-backed record store and settlement engine for the credit ledger.
//! Pure bookkeeping rules live in `fiado-core`; this crate gives them a
//! durable home and runs settlements as atomic units of work.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Fiado Ledger Crate                              │
//! │                                                                         │
//! │  Ledger (pool.rs)                                                       │
//! │  ├── SqlitePool: WAL mode, foreign keys on, embedded migrations         │
//! │  ├── credit()      → CreditRepository   sales, items, payments          │
//! │  ├── cash()        → CashRepository     daily register + movements      │
//! │  └── settlements() → SettlementEngine   atomic settlement transactions  │
//! │                                                                         │
//! │  fiado-core supplies the rules: balances, split editing, validation,    │
//! │  movement construction. This crate only decides WHEN they run and       │
//! │  guarantees the results land together or not at all.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//! ```rust,no_run
//! use fiado_ledger::{Ledger, LedgerConfig};
//! use fiado_core::{PaymentMethod, PaymentSplit};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = Ledger::new(LedgerConfig::new("fiado.db")).await?;
//!
//!     let splits = [PaymentSplit {
//!         method: PaymentMethod::Cash,
//!         amount_cents: 50_000,
//!     }];
//!     let outcome = ledger.settlements().settle("sale-id", &splits).await?;
//!     println!("settled: {}", outcome.settled);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod settlement;

pub use error::{LedgerError, LedgerResult};
pub use pool::{Ledger, LedgerConfig};
pub use repository::cash::CashRepository;
pub use repository::credit::CreditRepository;
pub use settlement::{SettlementEngine, SettlementOutcome};
