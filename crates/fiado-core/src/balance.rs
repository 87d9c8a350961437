//! # Balance Calculator
//!
//! Pure functions deriving outstanding balances from sale and payment
//! records. No caching, no side effects: every call re-scans the provided
//! collections, so the answer is exactly as fresh as the caller's data.
//!
//! ## Contract
//! ```text
//! balance = Σ(sale.total for matching sales)
//!         − Σ(payment.amount for payments referencing those sales)
//! ```
//!
//! Correctness depends on the caller having refreshed the collections after
//! any mutation; the settlement engine returns refreshed state for exactly
//! this reason.

use std::collections::HashSet;

use crate::money::Money;
use crate::types::{CreditSale, Payment, PaymentMethod};

// =============================================================================
// Cheque Policy
// =============================================================================

/// How pending cheques count towards debt reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChequePolicy {
    /// Every payment reduces the balance, cleared or not.
    #[default]
    CountPending,
    /// A cheque reduces the balance only once it has cleared. A customer
    /// who handed over paper still owes the money.
    RequireCleared,
}

impl ChequePolicy {
    /// Whether the given payment reduces debt under this policy.
    fn counts(&self, payment: &Payment) -> bool {
        match self {
            ChequePolicy::CountPending => true,
            ChequePolicy::RequireCleared => {
                payment.method != PaymentMethod::Cheque
                    || payment.cheque_status == Some(crate::types::ChequeStatus::Cleared)
            }
        }
    }
}

// =============================================================================
// Name Normalization
// =============================================================================

/// Normalizes a customer name for lookup: trim plus Unicode lowercase.
///
/// Display stays case-sensitive; comparison never is. One rule, applied
/// everywhere a name is matched.
pub fn normalize_customer_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// =============================================================================
// Balance Functions
// =============================================================================

/// Outstanding balance of a single sale: total minus counted payments
/// referencing it.
pub fn sale_balance(sale: &CreditSale, payments: &[Payment], policy: ChequePolicy) -> Money {
    let paid: Money = payments
        .iter()
        .filter(|p| p.sale_id == sale.id && policy.counts(p))
        .map(Payment::amount)
        .sum();

    sale.total() - paid
}

/// Outstanding balance of a customer across all their credit sales.
///
/// A sale matches when its normalized customer name equals the normalized
/// query name. `category` additionally restricts to sales with at least one
/// line item carrying that tag; pass the sale's items through
/// `sale_has_category` when building the filtered set.
pub fn customer_balance(
    customer_name: &str,
    sales: &[CreditSale],
    payments: &[Payment],
    policy: ChequePolicy,
) -> Money {
    let wanted = normalize_customer_name(customer_name);

    let matching: Vec<&CreditSale> = sales
        .iter()
        .filter(|s| normalize_customer_name(&s.customer_name) == wanted)
        .collect();

    let sale_ids: HashSet<&str> = matching.iter().map(|s| s.id.as_str()).collect();

    let owed: Money = matching.iter().map(|s| s.total()).sum();
    let paid: Money = payments
        .iter()
        .filter(|p| sale_ids.contains(p.sale_id.as_str()) && policy.counts(p))
        .map(Payment::amount)
        .sum();

    owed - paid
}

/// Whether any of `categories` (line-item tags of a sale) matches `wanted`.
///
/// Callers resolve a sale's line items to their category tags and use this
/// to pre-filter the sales slice before calling [`customer_balance`].
pub fn sale_has_category(categories: &[Option<String>], wanted: &str) -> bool {
    categories
        .iter()
        .flatten()
        .any(|c| c.eq_ignore_ascii_case(wanted))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChequeStatus;
    use chrono::Utc;

    fn sale(id: &str, customer: &str, total_cents: i64) -> CreditSale {
        CreditSale {
            id: id.to_string(),
            customer_name: customer.to_string(),
            manual_amount_cents: 0,
            total_cents,
            paid: false,
            sale_date: Utc::now(),
            payment_methods: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn payment(id: &str, sale_id: &str, amount_cents: i64) -> Payment {
        Payment {
            id: id.to_string(),
            sale_id: sale_id.to_string(),
            method: PaymentMethod::Cash,
            cheque_status: None,
            amount_cents,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sale_balance() {
        let s = sale("s1", "Ana", 100_000);
        let pays = vec![payment("p1", "s1", 40_000), payment("p2", "other", 99_999)];

        let balance = sale_balance(&s, &pays, ChequePolicy::CountPending);
        assert_eq!(balance.cents(), 60_000);
    }

    #[test]
    fn test_customer_balance_spans_sales() {
        let sales = vec![sale("s1", "Ana", 100_000), sale("s2", "Ana", 50_000)];
        let pays = vec![payment("p1", "s1", 100_000), payment("p2", "s2", 20_000)];

        let balance = customer_balance("Ana", &sales, &pays, ChequePolicy::CountPending);
        assert_eq!(balance.cents(), 30_000);
    }

    #[test]
    fn test_customer_lookup_is_case_insensitive() {
        let sales = vec![sale("s1", "Ana María", 10_000)];

        let balance = customer_balance("  ana maría ", &sales, &[], ChequePolicy::CountPending);
        assert_eq!(balance.cents(), 10_000);

        let other = customer_balance("Pedro", &sales, &[], ChequePolicy::CountPending);
        assert!(other.is_zero());
    }

    #[test]
    fn test_pending_cheque_does_not_reduce_debt() {
        let s = sale("s1", "Ana", 50_000);
        let cheque = Payment {
            id: "p1".to_string(),
            sale_id: "s1".to_string(),
            method: PaymentMethod::Cheque,
            cheque_status: Some(ChequeStatus::Pending),
            amount_cents: 50_000,
            created_at: Utc::now(),
        };
        let pays = vec![cheque];

        let strict = sale_balance(&s, &pays, ChequePolicy::RequireCleared);
        assert_eq!(strict.cents(), 50_000);

        let lenient = sale_balance(&s, &pays, ChequePolicy::CountPending);
        assert!(lenient.is_zero());
    }

    #[test]
    fn test_cleared_cheque_reduces_debt_under_both_policies() {
        let s = sale("s1", "Ana", 50_000);
        let mut cheque = payment("p1", "s1", 50_000);
        cheque.method = PaymentMethod::Cheque;
        cheque.cheque_status = Some(ChequeStatus::Cleared);
        let pays = vec![cheque];

        assert!(sale_balance(&s, &pays, ChequePolicy::RequireCleared).is_zero());
        assert!(sale_balance(&s, &pays, ChequePolicy::CountPending).is_zero());
    }

    #[test]
    fn test_balance_is_pure() {
        // Same inputs twice yield the same answer: no hidden state
        let sales = vec![sale("s1", "Ana", 100_000)];
        let pays = vec![payment("p1", "s1", 25_000)];

        let first = customer_balance("Ana", &sales, &pays, ChequePolicy::CountPending);
        let second = customer_balance("Ana", &sales, &pays, ChequePolicy::CountPending);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sale_has_category() {
        let cats = vec![None, Some("dairy".to_string())];
        assert!(sale_has_category(&cats, "Dairy"));
        assert!(!sale_has_category(&cats, "meat"));
    }
}
