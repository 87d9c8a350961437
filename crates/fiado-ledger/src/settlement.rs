//! # Settlement Transaction
//!
//! Durably records one or more payments against a credit sale, flips the
//! sale's paid flag when the balance reaches zero, and folds the final
//! tranche into the day's cash register.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   One Settlement, One Transaction                       │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │ 1. read sale + payments  → remaining balance                       │
//! │    │ 2. validate splits       → total > 0, ≤ remaining + 1 cent         │
//! │    │ 3. insert one Payment per non-zero split                           │
//! │    │ 4. fully settled?                                                  │
//! │    │      ├── set paid = true                                           │
//! │    │      └── fold snapshot into today's daily cash                     │
//! │  COMMIT ──────────────► outcome re-read from the store                  │
//! │    │                                                                    │
//! │    └── any failure → ROLLBACK, nothing visible, error surfaced          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The outcome carries freshly re-read state; callers must treat it as the
//! new source of truth instead of patching stale collections.
//!
//! ## Snapshot Semantics
//! A sale paid in tranches contributes only its **final** tranche to the
//! day it is cleared on: the snapshot's total is the amount just paid, not
//! the sale's original total. Partial settlements persist payments but do
//! not touch the register.

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::repository::cash::CashRepository;
use crate::repository::credit::CreditRepository;
use fiado_core::balance::normalize_customer_name;
use fiado_core::cash::{settlement_movements, total_profit};
use fiado_core::validation::validate_settlement;
use fiado_core::{
    ChequeStatus, CoreError, CreditSale, DailyCash, Money, Payment, PaymentMethod, PaymentSplit,
    SettlementSnapshot, SETTLEMENT_EPSILON,
};

// =============================================================================
// Settlement Outcome
// =============================================================================

/// The durable result of a settlement, re-read from the record store after
/// commit. This is the caller's new source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementOutcome {
    /// The sale as stored after the settlement.
    pub sale: CreditSale,
    /// Every payment now referencing the sale, oldest first.
    pub payments: Vec<Payment>,
    /// Cents paid by this settlement.
    pub paid_now_cents: i64,
    /// Cents still owed after this settlement.
    pub remaining_cents: i64,
    /// Whether this settlement cleared the sale.
    pub settled: bool,
    /// The day's register after synchronization; `None` for a partial
    /// settlement, which leaves the register untouched.
    pub daily_cash: Option<DailyCash>,
}

// =============================================================================
// Settlement Engine
// =============================================================================

/// Executes settlements and bulk debt erasure against the record store.
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    pool: SqlitePool,
}

impl SettlementEngine {
    /// Creates a new SettlementEngine.
    pub fn new(pool: SqlitePool) -> Self {
        SettlementEngine { pool }
    }

    /// Settles `splits` against the sale, dating any register fold to
    /// today's **local** calendar date.
    pub async fn settle(
        &self,
        sale_id: &str,
        splits: &[PaymentSplit],
    ) -> LedgerResult<SettlementOutcome> {
        self.settle_on(sale_id, splits, Local::now().date_naive())
            .await
    }

    /// Settles `splits` against the sale, folding a full settlement into
    /// the register page of the given date. Exposed for callers (and
    /// tests) that must pin the date explicitly.
    pub async fn settle_on(
        &self,
        sale_id: &str,
        splits: &[PaymentSplit],
        register_date: NaiveDate,
    ) -> LedgerResult<SettlementOutcome> {
        let now = Utc::now();
        let date = register_date.format("%Y-%m-%d").to_string();

        let mut tx = self.pool.begin().await?;

        // 1. Current truth, read inside the transaction
        let sale = CreditRepository::fetch_sale(&mut *tx, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        if sale.paid {
            return Err(CoreError::SaleAlreadyPaid(sale_id.to_string()).into());
        }

        let paid_before = Money::from_cents(CreditRepository::fetch_total_paid(&mut *tx, sale_id).await?);
        let remaining = sale.total() - paid_before;

        // 2. Nothing is written unless the whole request is acceptable
        let paid_now = validate_settlement(splits, remaining)?;

        // 3. One payment per non-zero split; cheques enter as pending
        let nonzero: Vec<PaymentSplit> = splits
            .iter()
            .copied()
            .filter(|s| s.amount_cents > 0)
            .collect();

        for split in &nonzero {
            let payment = Payment {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.to_string(),
                method: split.method,
                cheque_status: (split.method == PaymentMethod::Cheque)
                    .then_some(ChequeStatus::Pending),
                amount_cents: split.amount_cents,
                created_at: now,
            };
            CreditRepository::insert_payment(&mut *tx, &payment).await?;
        }

        // 4. Fully settled → flip the flag and fold the final tranche
        let new_remaining = remaining - paid_now;
        let settled = new_remaining <= SETTLEMENT_EPSILON;

        if settled {
            CreditRepository::set_paid(&mut *tx, sale_id, true).await?;

            let items = CreditRepository::fetch_items(&mut *tx, sale_id).await?;
            let snapshot = SettlementSnapshot {
                sale_id: sale_id.to_string(),
                customer_name: sale.customer_name.clone(),
                total_cents: paid_now.cents(),
                items,
                splits: nonzero.clone(),
                settled_at: now,
            };

            let movements = settlement_movements(&snapshot);
            let profit = total_profit(&snapshot.items);

            let day = CashRepository::get_or_create(&mut tx, &date, now).await?;
            CashRepository::append_movements(
                &mut tx,
                &day.id,
                &movements,
                paid_now.cents(),
                profit.cents(),
                now,
            )
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale_id,
            paid_now = paid_now.cents(),
            remaining = new_remaining.cents(),
            settled,
            "Settlement committed"
        );

        // 5. Read-after-write: the outcome is re-read durable state
        self.outcome(sale_id, paid_now, settled, &date).await
    }

    /// Erases every debt of a customer: all their credit sales and the
    /// payments referencing them. The daily cash register is untouched;
    /// history already folded into a day stays there.
    ///
    /// ## Returns
    /// The number of sales removed.
    pub async fn erase_customer_debts(&self, customer_name: &str) -> LedgerResult<u64> {
        let repo = CreditRepository::new(self.pool.clone());
        let sales = repo.list_sales(Some(customer_name), None).await?;
        let sale_ids: Vec<String> = sales.into_iter().map(|s| s.id).collect();

        let deleted = repo.delete_sales_and_payments(&sale_ids).await?;

        info!(
            customer = %normalize_customer_name(customer_name),
            sales = deleted,
            "Erased customer debts"
        );
        Ok(deleted)
    }

    async fn outcome(
        &self,
        sale_id: &str,
        paid_now: Money,
        settled: bool,
        date: &str,
    ) -> LedgerResult<SettlementOutcome> {
        let credit = CreditRepository::new(self.pool.clone());

        let sale = credit
            .get_sale(sale_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Credit sale", sale_id))?;
        let payments = credit.list_payments(Some(sale_id)).await?;

        let total_paid: i64 = payments.iter().map(|p| p.amount_cents).sum();
        let remaining_cents = sale.total_cents - total_paid;

        let daily_cash = if settled {
            CashRepository::new(self.pool.clone())
                .get_by_date(date)
                .await?
        } else {
            None
        };

        Ok(SettlementOutcome {
            sale,
            payments,
            paid_now_cents: paid_now.cents(),
            remaining_cents,
            settled,
            daily_cash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Ledger, LedgerConfig};
    use fiado_core::{ChequePolicy, SaleLineItem};

    async fn ledger() -> Ledger {
        Ledger::new(LedgerConfig::in_memory()).await.unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn split(method: PaymentMethod, cents: i64) -> PaymentSplit {
        PaymentSplit {
            method,
            amount_cents: cents,
        }
    }

    /// Opens a sale whose single line item carries the whole total, with a
    /// 60% cost so profit attribution has something to attribute.
    async fn open_sale(ledger: &Ledger, customer: &str, total_cents: i64) -> String {
        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let item = SaleLineItem {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.clone(),
            name: "Groceries".to_string(),
            category: Some("grocery".to_string()),
            unit: "ud".to_string(),
            quantity: 1.0,
            unit_price_cents: total_cents,
            unit_cost_cents: total_cents * 3 / 5,
            line_total_cents: total_cents,
        };
        let sale = CreditSale {
            id: sale_id.clone(),
            customer_name: customer.to_string(),
            manual_amount_cents: 0,
            total_cents,
            paid: false,
            sale_date: now,
            payment_methods: Vec::new(),
            created_at: now,
        };
        ledger.credit().insert_sale(&sale, &[item]).await.unwrap();
        sale_id
    }

    #[tokio::test]
    async fn full_cash_settlement_marks_paid_and_folds_register() {
        let ledger = ledger().await;
        let sale_id = open_sale(&ledger, "Ana Gomez", 100_000).await;

        let outcome = ledger
            .settlements()
            .settle_on(&sale_id, &[split(PaymentMethod::Cash, 100_000)], day(2026, 3, 14))
            .await
            .unwrap();

        assert!(outcome.settled);
        assert!(outcome.sale.paid);
        assert_eq!(outcome.paid_now_cents, 100_000);
        assert_eq!(outcome.remaining_cents, 0);
        assert_eq!(outcome.payments.len(), 1);

        let register = outcome.daily_cash.expect("full settlement opens the day");
        assert_eq!(register.date, "2026-03-14");
        assert_eq!(register.total_income_cents, 100_000);

        let movements = ledger.cash().list_movements(&register.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert!(movements[0].is_credit_payment);
        assert_eq!(movements[0].original_sale_id.as_deref(), Some(sale_id.as_str()));
        assert_eq!(movements[0].description, "Credit settlement - Ana Gomez");
    }

    #[tokio::test]
    async fn final_tranche_folds_only_the_amount_paid_now() {
        let ledger = ledger().await;
        let sale_id = open_sale(&ledger, "Carlos Diaz", 100_000).await;
        let engine = ledger.settlements();

        // First tranche leaves the register alone
        let partial = engine
            .settle_on(&sale_id, &[split(PaymentMethod::Cash, 40_000)], day(2026, 3, 14))
            .await
            .unwrap();
        assert!(!partial.settled);
        assert!(!partial.sale.paid);
        assert_eq!(partial.remaining_cents, 60_000);
        assert!(partial.daily_cash.is_none());
        assert!(ledger.cash().get_by_date("2026-03-14").await.unwrap().is_none());

        // The closing tranche carries 600, not the sale's original 1000
        let closing = engine
            .settle_on(
                &sale_id,
                &[
                    split(PaymentMethod::Cash, 30_000),
                    split(PaymentMethod::Transfer, 30_000),
                ],
                day(2026, 3, 15),
            )
            .await
            .unwrap();
        assert!(closing.settled);
        assert_eq!(closing.paid_now_cents, 60_000);
        assert_eq!(closing.payments.len(), 3);

        let register = closing.daily_cash.unwrap();
        assert_eq!(register.total_income_cents, 60_000);

        let movements = ledger.cash().list_movements(&register.id).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements.iter().map(|m| m.amount_cents).sum::<i64>(), 60_000);
    }

    #[tokio::test]
    async fn overpayment_is_rejected_and_nothing_is_written() {
        let ledger = ledger().await;
        let sale_id = open_sale(&ledger, "Marta Silva", 50_000).await;

        let err = ledger
            .settlements()
            .settle_on(&sale_id, &[split(PaymentMethod::Cash, 60_000)], day(2026, 3, 14))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::Overpayment { .. })
        ));

        // The failed attempt left no trace
        let sale = ledger.credit().get_sale(&sale_id).await.unwrap().unwrap();
        assert!(!sale.paid);
        assert!(ledger.credit().list_payments(Some(&sale_id)).await.unwrap().is_empty());
        assert!(ledger.cash().get_by_date("2026-03-14").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn one_cent_over_is_tolerated_and_one_cent_short_still_settles() {
        let ledger = ledger().await;
        let engine = ledger.settlements();

        let over = open_sale(&ledger, "Pedro Alves", 50_000).await;
        let outcome = engine
            .settle_on(&over, &[split(PaymentMethod::Cash, 50_001)], day(2026, 3, 14))
            .await
            .unwrap();
        assert!(outcome.settled);

        let short = open_sale(&ledger, "Pedro Alves", 50_000).await;
        let outcome = engine
            .settle_on(&short, &[split(PaymentMethod::Cash, 49_999)], day(2026, 3, 14))
            .await
            .unwrap();
        assert!(outcome.settled);
        assert!(outcome.sale.paid);
    }

    #[tokio::test]
    async fn settling_a_paid_sale_fails() {
        let ledger = ledger().await;
        let sale_id = open_sale(&ledger, "Ana Gomez", 10_000).await;
        let engine = ledger.settlements();

        engine
            .settle_on(&sale_id, &[split(PaymentMethod::Cash, 10_000)], day(2026, 3, 14))
            .await
            .unwrap();

        let err = engine
            .settle_on(&sale_id, &[split(PaymentMethod::Cash, 1_000)], day(2026, 3, 14))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::SaleAlreadyPaid(_))
        ));
    }

    #[tokio::test]
    async fn unknown_sale_fails() {
        let ledger = ledger().await;
        let err = ledger
            .settlements()
            .settle_on("no-such-sale", &[split(PaymentMethod::Cash, 1_000)], day(2026, 3, 14))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::SaleNotFound(_))));
    }

    #[tokio::test]
    async fn cheque_tranche_enters_pending_and_policy_decides_the_balance() {
        let ledger = ledger().await;
        let sale_id = open_sale(&ledger, "Marta Silva", 100_000).await;

        let outcome = ledger
            .settlements()
            .settle_on(&sale_id, &[split(PaymentMethod::Cheque, 50_000)], day(2026, 3, 14))
            .await
            .unwrap();
        assert!(!outcome.settled);
        assert_eq!(
            outcome.payments[0].cheque_status,
            Some(ChequeStatus::Pending)
        );

        let trusting = ledger
            .credit()
            .outstanding_balance("marta silva", ChequePolicy::CountPending)
            .await
            .unwrap();
        assert_eq!(trusting.cents(), 50_000);

        let strict = ledger
            .credit()
            .outstanding_balance("marta silva", ChequePolicy::RequireCleared)
            .await
            .unwrap();
        assert_eq!(strict.cents(), 100_000);

        // Once the cheque clears, both policies agree
        ledger
            .credit()
            .mark_cheque_cleared(&outcome.payments[0].id)
            .await
            .unwrap();
        let strict = ledger
            .credit()
            .outstanding_balance("marta silva", ChequePolicy::RequireCleared)
            .await
            .unwrap();
        assert_eq!(strict.cents(), 50_000);
    }

    #[tokio::test]
    async fn same_day_settlements_share_one_register_page() {
        let ledger = ledger().await;
        let engine = ledger.settlements();
        let first = open_sale(&ledger, "Ana Gomez", 30_000).await;
        let second = open_sale(&ledger, "Carlos Diaz", 20_000).await;

        engine
            .settle_on(&first, &[split(PaymentMethod::Cash, 30_000)], day(2026, 3, 14))
            .await
            .unwrap();
        let outcome = engine
            .settle_on(&second, &[split(PaymentMethod::Card, 20_000)], day(2026, 3, 14))
            .await
            .unwrap();

        let register = outcome.daily_cash.unwrap();
        assert_eq!(register.total_income_cents, 50_000);
        assert_eq!(ledger.cash().list_movements(&register.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn profit_of_the_whole_sale_lands_on_the_settlement_day() {
        let ledger = ledger().await;
        // 100_000 total at 60% cost: profit is 40_000
        let sale_id = open_sale(&ledger, "Pedro Alves", 100_000).await;
        let engine = ledger.settlements();

        engine
            .settle_on(&sale_id, &[split(PaymentMethod::Cash, 70_000)], day(2026, 3, 14))
            .await
            .unwrap();
        let outcome = engine
            .settle_on(&sale_id, &[split(PaymentMethod::Cash, 30_000)], day(2026, 3, 20))
            .await
            .unwrap();

        let register = outcome.daily_cash.unwrap();
        assert_eq!(register.date, "2026-03-20");
        assert_eq!(register.total_income_cents, 30_000);
        assert_eq!(register.total_profit_cents, 40_000);
    }

    #[tokio::test]
    async fn erase_customer_debts_removes_sales_but_leaves_the_register() {
        let ledger = ledger().await;
        let engine = ledger.settlements();
        let settled = open_sale(&ledger, "Ana Gomez", 30_000).await;
        let _open = open_sale(&ledger, "Ana Gomez", 20_000).await;
        let other = open_sale(&ledger, "Carlos Diaz", 10_000).await;

        engine
            .settle_on(&settled, &[split(PaymentMethod::Cash, 30_000)], day(2026, 3, 14))
            .await
            .unwrap();

        // Match is case-insensitive, like every other customer lookup
        let erased = engine.erase_customer_debts("  ANA gomez ").await.unwrap();
        assert_eq!(erased, 2);

        assert!(ledger
            .credit()
            .list_sales(Some("Ana Gomez"), None)
            .await
            .unwrap()
            .is_empty());
        assert!(ledger.credit().get_sale(&other).await.unwrap().is_some());

        // History already folded into a day stays there
        let register = ledger.cash().get_by_date("2026-03-14").await.unwrap().unwrap();
        assert_eq!(register.total_income_cents, 30_000);
    }
}
