//! # Credit Repository
//!
//! Database operations for credit sales, their line items, and payments.
//!
//! ## Debt Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Debt Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── insert_sale() → CreditSale { paid: false } + line items         │
//! │                                                                         │
//! │  2. SETTLE (possibly several times)                                     │
//! │     └── insert_payment() per split, inside the settlement transaction   │
//! │     └── set_paid(true) once the balance reaches zero                    │
//! │                                                                         │
//! │  3. (OPTIONAL) ERASE                                                    │
//! │     └── delete_sales_and_payments() → bulk removal, payments first      │
//! │                                                                         │
//! │  total_cents never changes after step 1; only `paid` flips.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods that participate in the settlement unit of work are generic over
//! the executor, so they run equally against the pool or inside a
//! transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use fiado_core::balance::{self, sale_has_category, ChequePolicy};
use fiado_core::{
    ChequeStatus, CreditSale, MethodAmount, Money, Payment, PaymentMethod, SaleLineItem,
};

// =============================================================================
// Row Types
// =============================================================================

/// Raw `credit_sales` row; `payment_methods` is a JSON column.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    customer_name: String,
    manual_amount_cents: i64,
    total_cents: i64,
    paid: bool,
    sale_date: DateTime<Utc>,
    payment_methods: String,
    created_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self) -> LedgerResult<CreditSale> {
        let payment_methods: Vec<MethodAmount> = serde_json::from_str(&self.payment_methods)?;
        Ok(CreditSale {
            id: self.id,
            customer_name: self.customer_name,
            manual_amount_cents: self.manual_amount_cents,
            total_cents: self.total_cents,
            paid: self.paid,
            sale_date: self.sale_date,
            payment_methods,
            created_at: self.created_at,
        })
    }
}

// =============================================================================
// Credit Repository
// =============================================================================

/// Repository for credit sale and payment operations.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    /// Creates a new CreditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Sales
    // -------------------------------------------------------------------------

    /// Inserts a credit sale together with its line items, in one
    /// transaction.
    pub async fn insert_sale(
        &self,
        sale: &CreditSale,
        items: &[SaleLineItem],
    ) -> LedgerResult<()> {
        debug!(id = %sale.id, customer = %sale.customer_name, total = sale.total_cents, "Inserting credit sale");

        let payment_methods = serde_json::to_string(&sale.payment_methods)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO credit_sales (
                id, customer_name, manual_amount_cents, total_cents,
                paid, sale_date, payment_methods, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.customer_name)
        .bind(sale.manual_amount_cents)
        .bind(sale.total_cents)
        .bind(sale.paid)
        .bind(sale.sale_date)
        .bind(&payment_methods)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO sale_line_items (
                    id, sale_id, name, category, unit,
                    quantity, unit_price_cents, unit_cost_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.name)
            .bind(&item.category)
            .bind(&item.unit)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.unit_cost_cents)
            .bind(item.line_total_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets a credit sale by ID.
    pub async fn get_sale(&self, id: &str) -> LedgerResult<Option<CreditSale>> {
        Self::fetch_sale(&self.pool, id).await
    }

    /// Fetches a sale through any executor (pool or open transaction).
    pub async fn fetch_sale<'e, E>(executor: E, id: &str) -> LedgerResult<Option<CreditSale>>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let row: Option<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, customer_name, manual_amount_cents, total_cents,
                   paid, sale_date, payment_methods, created_at
            FROM credit_sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        row.map(SaleRow::into_sale).transpose()
    }

    /// Lists credit sales, optionally filtered by customer and/or line-item
    /// category tag. Customer matching uses the uniform normalization from
    /// `fiado_core::balance`, so it is safe for accented names.
    pub async fn list_sales(
        &self,
        customer_filter: Option<&str>,
        category_filter: Option<&str>,
    ) -> LedgerResult<Vec<CreditSale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, customer_name, manual_amount_cents, total_cents,
                   paid, sale_date, payment_methods, created_at
            FROM credit_sales
            ORDER BY sale_date, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut sales = rows
            .into_iter()
            .map(SaleRow::into_sale)
            .collect::<LedgerResult<Vec<_>>>()?;

        if let Some(customer) = customer_filter {
            let wanted = balance::normalize_customer_name(customer);
            sales.retain(|s| balance::normalize_customer_name(&s.customer_name) == wanted);
        }

        if let Some(category) = category_filter {
            let tags: Vec<(String, Option<String>)> =
                sqlx::query_as("SELECT sale_id, category FROM sale_line_items")
                    .fetch_all(&self.pool)
                    .await?;

            let mut by_sale: HashMap<String, Vec<Option<String>>> = HashMap::new();
            for (sale_id, tag) in tags {
                by_sale.entry(sale_id).or_default().push(tag);
            }

            sales.retain(|s| {
                by_sale
                    .get(&s.id)
                    .is_some_and(|cats| sale_has_category(cats, category))
            });
        }

        Ok(sales)
    }

    /// Gets the line items of a sale.
    pub async fn get_items(&self, sale_id: &str) -> LedgerResult<Vec<SaleLineItem>> {
        Self::fetch_items(&self.pool, sale_id).await
    }

    /// Fetches line items through any executor.
    pub async fn fetch_items<'e, E>(executor: E, sale_id: &str) -> LedgerResult<Vec<SaleLineItem>>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let items: Vec<SaleLineItem> = sqlx::query_as(
            r#"
            SELECT id, sale_id, name, category, unit,
                   quantity, unit_price_cents, unit_cost_cents, line_total_cents
            FROM sale_line_items
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    /// Marks a sale paid/unpaid. Only the settlement engine flips this.
    pub async fn set_paid<'e, E>(executor: E, sale_id: &str, paid: bool) -> LedgerResult<()>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE credit_sales SET paid = ?2 WHERE id = ?1")
            .bind(sale_id)
            .bind(paid)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found("Credit sale", sale_id));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Payments
    // -------------------------------------------------------------------------

    /// Records a payment through any executor.
    pub async fn insert_payment<'e, E>(executor: E, payment: &Payment) -> LedgerResult<()>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        debug!(sale_id = %payment.sale_id, amount = payment.amount_cents, method = %payment.method, "Recording payment");

        sqlx::query(
            r#"
            INSERT INTO payments (id, sale_id, method, cheque_status, amount_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.sale_id)
        .bind(payment.method)
        .bind(payment.cheque_status)
        .bind(payment.amount_cents)
        .bind(payment.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Marks a cheque payment as cleared. The only mutation a payment ever
    /// sees; fails for payments of any other method.
    pub async fn mark_cheque_cleared(&self, payment_id: &str) -> LedgerResult<()> {
        let result = sqlx::query(
            "UPDATE payments SET cheque_status = ?2 WHERE id = ?1 AND method = ?3",
        )
        .bind(payment_id)
        .bind(ChequeStatus::Cleared)
        .bind(PaymentMethod::Cheque)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found("Cheque payment", payment_id));
        }

        debug!(payment_id = %payment_id, "Cheque cleared");
        Ok(())
    }

    /// Lists payments, optionally restricted to one sale.
    pub async fn list_payments(&self, sale_id_filter: Option<&str>) -> LedgerResult<Vec<Payment>> {
        let payments: Vec<Payment> = match sale_id_filter {
            Some(sale_id) => {
                sqlx::query_as(
                    r#"
                    SELECT id, sale_id, method, cheque_status, amount_cents, created_at
                    FROM payments
                    WHERE sale_id = ?1
                    ORDER BY created_at
                    "#,
                )
                .bind(sale_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, sale_id, method, cheque_status, amount_cents, created_at
                    FROM payments
                    ORDER BY created_at
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(payments)
    }

    /// Total cents paid against a sale, through any executor.
    pub async fn fetch_total_paid<'e, E>(executor: E, sale_id: &str) -> LedgerResult<i64>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT SUM(amount_cents) FROM payments WHERE sale_id = ?1")
                .bind(sale_id)
                .fetch_one(executor)
                .await?;

        Ok(total.unwrap_or(0))
    }

    /// Total cents paid against a sale.
    pub async fn total_paid_cents(&self, sale_id: &str) -> LedgerResult<i64> {
        Self::fetch_total_paid(&self.pool, sale_id).await
    }

    /// Derives a customer's outstanding balance from the stored sales and
    /// payments, under the given cheque policy. Nothing is cached; this is
    /// the pure calculator fed with fresh rows.
    pub async fn outstanding_balance(
        &self,
        customer_name: &str,
        policy: ChequePolicy,
    ) -> LedgerResult<Money> {
        let sales = self.list_sales(Some(customer_name), None).await?;
        let payments = self.list_payments(None).await?;
        Ok(balance::customer_balance(
            customer_name,
            &sales,
            &payments,
            policy,
        ))
    }

    // -------------------------------------------------------------------------
    // Bulk Erasure
    // -------------------------------------------------------------------------

    /// Deletes the given sales and every payment referencing them, in one
    /// transaction. Line items go with their sale (ON DELETE CASCADE).
    ///
    /// ## Returns
    /// The number of sales removed.
    pub async fn delete_sales_and_payments(&self, sale_ids: &[String]) -> LedgerResult<u64> {
        if sale_ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut deleted = 0u64;

        for sale_id in sale_ids {
            sqlx::query("DELETE FROM payments WHERE sale_id = ?1")
                .bind(sale_id)
                .execute(&mut *tx)
                .await?;

            let result = sqlx::query("DELETE FROM credit_sales WHERE id = ?1")
                .bind(sale_id)
                .execute(&mut *tx)
                .await?;
            deleted += result.rows_affected();
        }

        tx.commit().await?;

        debug!(sales = deleted, "Erased credit sales and their payments");
        Ok(deleted)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Ledger, LedgerConfig};
    use uuid::Uuid;

    async fn ledger() -> Ledger {
        Ledger::new(LedgerConfig::in_memory()).await.unwrap()
    }

    /// Inserts a one-item sale whose line carries the whole total under the
    /// given category tag.
    async fn insert_tagged_sale(
        ledger: &Ledger,
        customer: &str,
        category: Option<&str>,
        total_cents: i64,
    ) -> String {
        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let item = SaleLineItem {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.clone(),
            name: "Groceries".to_string(),
            category: category.map(str::to_string),
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
    async fn test_category_filter_restricts_sales() {
        let ledger = ledger().await;
        let dairy = insert_tagged_sale(&ledger, "Ana Gomez", Some("dairy"), 10_000).await;
        insert_tagged_sale(&ledger, "Ana Gomez", Some("butcher"), 20_000).await;
        insert_tagged_sale(&ledger, "Ana Gomez", None, 7_000).await;
        insert_tagged_sale(&ledger, "Carlos Diaz", Some("dairy"), 5_000).await;

        // Tag matching ignores case; customer matching uses the uniform
        // normalization
        let hits = ledger
            .credit()
            .list_sales(Some("  ANA gomez "), Some("Dairy"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, dairy);

        assert!(ledger
            .credit()
            .list_sales(Some("Ana Gomez"), Some("meat"))
            .await
            .unwrap()
            .is_empty());

        // Category alone spans customers
        let all_dairy = ledger.credit().list_sales(None, Some("dairy")).await.unwrap();
        assert_eq!(all_dairy.len(), 2);
    }

    #[tokio::test]
    async fn test_category_restricted_balance_composes() {
        let ledger = ledger().await;
        let dairy = insert_tagged_sale(&ledger, "Ana Gomez", Some("dairy"), 10_000).await;
        insert_tagged_sale(&ledger, "Ana Gomez", Some("butcher"), 20_000).await;

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            sale_id: dairy,
            method: PaymentMethod::Cash,
            cheque_status: None,
            amount_cents: 4_000,
            created_at: Utc::now(),
        };
        CreditRepository::insert_payment(ledger.pool(), &payment)
            .await
            .unwrap();

        // Narrow the sales slice by category, then derive the balance over it
        let sales = ledger
            .credit()
            .list_sales(Some("Ana Gomez"), Some("dairy"))
            .await
            .unwrap();
        let payments = ledger.credit().list_payments(None).await.unwrap();
        let dairy_only =
            balance::customer_balance("Ana Gomez", &sales, &payments, ChequePolicy::CountPending);
        assert_eq!(dairy_only.cents(), 6_000);

        // Without the category restriction the butcher debt counts too
        let all = ledger
            .credit()
            .outstanding_balance("Ana Gomez", ChequePolicy::CountPending)
            .await
            .unwrap();
        assert_eq!(all.cents(), 26_000);
    }
}
