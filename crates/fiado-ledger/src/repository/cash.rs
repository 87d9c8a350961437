//! # Daily Cash Repository
//!
//! Database operations for the per-day cash register: the `daily_cash`
//! aggregate (one row per local calendar date) and its movement entries.
//!
//! The aggregate is only ever incremented. `get_or_create` and
//! `append_movements` take `&mut SqliteConnection` because they run as part
//! of the settlement transaction; a failed settlement must not leave a
//! half-updated day behind.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use fiado_core::cash::NewMovement;
use fiado_core::{DailyCash, DailyCashMovement, MovementKind, PaymentMethod, SaleLineItem};

// =============================================================================
// Row Types
// =============================================================================

/// Raw `daily_cash_movements` row; `items` is a JSON column.
#[derive(Debug, sqlx::FromRow)]
struct MovementRow {
    id: String,
    daily_cash_id: String,
    amount_cents: i64,
    description: String,
    kind: MovementKind,
    method: PaymentMethod,
    items: String,
    profit_cents: i64,
    is_credit_payment: bool,
    original_sale_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl MovementRow {
    fn into_movement(self) -> LedgerResult<DailyCashMovement> {
        let items: Vec<SaleLineItem> = serde_json::from_str(&self.items)?;
        Ok(DailyCashMovement {
            id: self.id,
            daily_cash_id: self.daily_cash_id,
            amount_cents: self.amount_cents,
            description: self.description,
            kind: self.kind,
            method: self.method,
            items,
            profit_cents: self.profit_cents,
            is_credit_payment: self.is_credit_payment,
            original_sale_id: self.original_sale_id,
            created_at: self.created_at,
        })
    }
}

// =============================================================================
// Cash Repository
// =============================================================================

/// Repository for daily cash register operations.
#[derive(Debug, Clone)]
pub struct CashRepository {
    pool: SqlitePool,
}

impl CashRepository {
    /// Creates a new CashRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashRepository { pool }
    }

    /// Gets the aggregate for a local date (`YYYY-MM-DD`), if the day has
    /// any movements yet.
    pub async fn get_by_date(&self, date: &str) -> LedgerResult<Option<DailyCash>> {
        let day: Option<DailyCash> = sqlx::query_as(
            r#"
            SELECT id, date, total_income_cents, total_expense_cents,
                   total_profit_cents, created_at, updated_at
            FROM daily_cash
            WHERE date = ?1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(day)
    }

    /// Lists the movements of an aggregate, in insertion order.
    pub async fn list_movements(
        &self,
        daily_cash_id: &str,
    ) -> LedgerResult<Vec<DailyCashMovement>> {
        let rows: Vec<MovementRow> = sqlx::query_as(
            r#"
            SELECT id, daily_cash_id, amount_cents, description, kind, method,
                   items, profit_cents, is_credit_payment, original_sale_id, created_at
            FROM daily_cash_movements
            WHERE daily_cash_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(daily_cash_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MovementRow::into_movement).collect()
    }

    /// Gets or creates the aggregate for a local date, inside an open
    /// transaction. A fresh day starts with zero totals.
    pub async fn get_or_create(
        conn: &mut SqliteConnection,
        date: &str,
        now: DateTime<Utc>,
    ) -> LedgerResult<DailyCash> {
        let existing: Option<DailyCash> = sqlx::query_as(
            r#"
            SELECT id, date, total_income_cents, total_expense_cents,
                   total_profit_cents, created_at, updated_at
            FROM daily_cash
            WHERE date = ?1
            "#,
        )
        .bind(date)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(day) = existing {
            return Ok(day);
        }

        let day = DailyCash {
            id: Uuid::new_v4().to_string(),
            date: date.to_string(),
            total_income_cents: 0,
            total_expense_cents: 0,
            total_profit_cents: 0,
            created_at: now,
            updated_at: now,
        };

        debug!(date = %date, id = %day.id, "Opening daily cash register");

        sqlx::query(
            r#"
            INSERT INTO daily_cash (
                id, date, total_income_cents, total_expense_cents,
                total_profit_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&day.id)
        .bind(&day.date)
        .bind(day.total_income_cents)
        .bind(day.total_expense_cents)
        .bind(day.total_profit_cents)
        .bind(day.created_at)
        .bind(day.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(day)
    }

    /// Appends movements to an aggregate and bumps its running totals by
    /// the given deltas, inside an open transaction. The totals are never
    /// recomputed from the movement list, only incremented.
    pub async fn append_movements(
        conn: &mut SqliteConnection,
        daily_cash_id: &str,
        movements: &[NewMovement],
        income_delta_cents: i64,
        profit_delta_cents: i64,
        now: DateTime<Utc>,
    ) -> LedgerResult<()> {
        for movement in movements {
            let items = serde_json::to_string(&movement.items)?;

            sqlx::query(
                r#"
                INSERT INTO daily_cash_movements (
                    id, daily_cash_id, amount_cents, description, kind, method,
                    items, profit_cents, is_credit_payment, original_sale_id, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(daily_cash_id)
            .bind(movement.amount_cents)
            .bind(&movement.description)
            .bind(movement.kind)
            .bind(movement.method)
            .bind(&items)
            .bind(movement.profit_cents)
            .bind(movement.is_credit_payment)
            .bind(&movement.original_sale_id)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE daily_cash SET
                total_income_cents = total_income_cents + ?2,
                total_profit_cents = total_profit_cents + ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(daily_cash_id)
        .bind(income_delta_cents)
        .bind(profit_delta_cents)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found("Daily cash", daily_cash_id));
        }

        debug!(
            daily_cash_id = %daily_cash_id,
            movements = movements.len(),
            income_delta = income_delta_cents,
            profit_delta = profit_delta_cents,
            "Appended cash movements"
        );

        Ok(())
    }
}
