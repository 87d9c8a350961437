//! # Daily Cash Movement Construction
//!
//! The pure half of the Daily Cash Synchronizer: turning a settlement
//! snapshot into the register movements it contributes, one per payment
//! split, with the settlement profit attributed proportionally.
//!
//! ## Profit Attribution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Snapshot: settled 600 via {cash: 300, transfer: 300}                   │
//! │  Line items say the sale earned 90 profit                               │
//! │                                                                         │
//! │  cash movement:     amount 300, profit 90 × 300/600 = 45               │
//! │  transfer movement: amount 300, profit 90 − 45      = 45               │
//! │                                          └── last split takes the      │
//! │                                              remainder, so movement    │
//! │                                              profits sum EXACTLY to    │
//! │                                              the settlement profit     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persistence (get-or-create the day, append movements, bump totals) lives
//! in `fiado-ledger`; this module never does I/O.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{MovementKind, PaymentMethod, SaleLineItem, SettlementSnapshot};

// =============================================================================
// New Movement
// =============================================================================

/// A register movement that has not been persisted yet: everything except
/// the id, the owning `DailyCash` and the timestamp, which the storage
/// layer assigns when the settlement transaction commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovement {
    pub amount_cents: i64,
    pub description: String,
    pub kind: MovementKind,
    pub method: PaymentMethod,
    /// Full line-item snapshot for traceability; every movement of the
    /// settlement carries the whole list.
    pub items: Vec<SaleLineItem>,
    pub profit_cents: i64,
    pub is_credit_payment: bool,
    pub original_sale_id: Option<String>,
}

// =============================================================================
// Profit
// =============================================================================

/// Total profit of a settlement: Σ (unit price − unit cost) × quantity over
/// the snapshot's line items.
pub fn total_profit(items: &[SaleLineItem]) -> Money {
    items.iter().map(SaleLineItem::profit).sum()
}

// =============================================================================
// Movement Construction
// =============================================================================

/// Builds the income movements a settlement snapshot contributes to the
/// day's register: one movement per split, each with its share of amount
/// and profit.
///
/// The last split absorbs the rounding remainder, so the movements' profit
/// always sums exactly to [`total_profit`] of the snapshot's items.
pub fn settlement_movements(snapshot: &SettlementSnapshot) -> Vec<NewMovement> {
    let profit = total_profit(&snapshot.items);
    let total = snapshot.total();
    let description = format!("Credit settlement - {}", snapshot.customer_name);

    let mut movements = Vec::with_capacity(snapshot.splits.len());
    let mut attributed = Money::zero();

    for (i, split) in snapshot.splits.iter().enumerate() {
        let is_last = i + 1 == snapshot.splits.len();
        let share = if is_last {
            profit - attributed
        } else {
            profit.share_of(split.amount(), total)
        };
        attributed += share;

        movements.push(NewMovement {
            amount_cents: split.amount_cents,
            description: description.clone(),
            kind: MovementKind::Income,
            method: split.method,
            items: snapshot.items.clone(),
            profit_cents: share.cents(),
            is_credit_payment: true,
            original_sale_id: Some(snapshot.sale_id.clone()),
        });
    }

    movements
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentSplit;
    use chrono::Utc;

    fn item(price: i64, cost: i64, qty: f64) -> SaleLineItem {
        SaleLineItem {
            id: "i".to_string(),
            sale_id: "s1".to_string(),
            name: "Pan".to_string(),
            category: None,
            unit: "ud".to_string(),
            quantity: qty,
            unit_price_cents: price,
            unit_cost_cents: cost,
            line_total_cents: (price as f64 * qty).round() as i64,
        }
    }

    fn snapshot(total_cents: i64, splits: Vec<PaymentSplit>) -> SettlementSnapshot {
        SettlementSnapshot {
            sale_id: "s1".to_string(),
            customer_name: "Ana".to_string(),
            total_cents,
            items: vec![item(1000, 700, 2.0)], // profit 600
            splits,
            settled_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_profit() {
        let items = vec![item(1000, 700, 2.0), item(500, 500, 3.0)];
        assert_eq!(total_profit(&items).cents(), 600);
    }

    #[test]
    fn test_one_movement_per_split() {
        let snap = snapshot(
            60_000,
            vec![
                PaymentSplit::new(PaymentMethod::Cash, Money::from_cents(30_000)),
                PaymentSplit::new(PaymentMethod::Transfer, Money::from_cents(30_000)),
            ],
        );

        let movements = settlement_movements(&snap);
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].amount_cents, 30_000);
        assert_eq!(movements[0].method, PaymentMethod::Cash);
        assert_eq!(movements[1].method, PaymentMethod::Transfer);
        assert!(movements.iter().all(|m| m.is_credit_payment));
        assert!(movements
            .iter()
            .all(|m| m.original_sale_id.as_deref() == Some("s1")));
        assert!(movements.iter().all(|m| m.kind == MovementKind::Income));
        // each movement carries the full item snapshot
        assert!(movements.iter().all(|m| m.items.len() == 1));
    }

    #[test]
    fn test_profit_is_split_proportionally() {
        let snap = snapshot(
            60_000,
            vec![
                PaymentSplit::new(PaymentMethod::Cash, Money::from_cents(45_000)),
                PaymentSplit::new(PaymentMethod::Card, Money::from_cents(15_000)),
            ],
        );

        let movements = settlement_movements(&snap);
        assert_eq!(movements[0].profit_cents, 450); // 600 × 3/4
        assert_eq!(movements[1].profit_cents, 150); // 600 × 1/4
    }

    #[test]
    fn test_profit_conservation_with_awkward_ratios() {
        // three-way split of 1000 with profit 600: shares round, but the
        // last split takes the remainder so the sum is exact
        let snap = SettlementSnapshot {
            sale_id: "s1".to_string(),
            customer_name: "Ana".to_string(),
            total_cents: 1000,
            items: vec![item(1000, 400, 1.0)], // profit 600
            splits: vec![
                PaymentSplit::new(PaymentMethod::Cash, Money::from_cents(333)),
                PaymentSplit::new(PaymentMethod::Transfer, Money::from_cents(333)),
                PaymentSplit::new(PaymentMethod::Card, Money::from_cents(334)),
            ],
            settled_at: Utc::now(),
        };

        let movements = settlement_movements(&snap);
        let attributed: i64 = movements.iter().map(|m| m.profit_cents).sum();
        assert_eq!(attributed, 600);
    }

    #[test]
    fn test_single_split_takes_all_profit() {
        let snap = snapshot(
            60_000,
            vec![PaymentSplit::new(
                PaymentMethod::Cash,
                Money::from_cents(60_000),
            )],
        );

        let movements = settlement_movements(&snap);
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].profit_cents, 600);
    }
}
