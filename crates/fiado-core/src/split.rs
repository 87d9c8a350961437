//! # Payment Split Editor
//!
//! In-memory working set of (method, amount) pairs being composed for one
//! settlement. The editor keeps the splits consistent with the sale's
//! remaining balance so the operator never does the arithmetic by hand.
//!
//! ## Redistribution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Remaining balance: 600                                                 │
//! │                                                                         │
//! │  new()            → [cash: 600]                                        │
//! │  add_method()     → [cash: 300, transfer: 300]     (≤2 → re-split)     │
//! │  add_method()     → [cash: 300, transfer: 300, card: 0]  (≥3 → 0)      │
//! │  remove(2)        → [cash: 300, transfer: 300]     (even re-split)     │
//! │  set_amount(0,400)→ [cash: 400, transfer: 200]     (pair auto-balance) │
//! │  remove(1)        → [cash: 600]                    (sole split = all)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The asymmetry (new third split starts at 0, while the first two
//! re-distribute evenly) models "I'll decide the amount for the third
//! method afterwards". Removing a split overwrites manual allocations of
//! the survivors; known UX rough edge, kept as-is.
//!
//! Nothing here touches storage: closing the settlement dialog just drops
//! the editor.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{splits_total, PaymentMethod, PaymentSplit};
use crate::MAX_SPLITS;

// =============================================================================
// Split Editor
// =============================================================================

/// Editor for the 1–3 payment splits of a settlement in progress.
#[derive(Debug, Clone)]
pub struct SplitEditor {
    remaining: Money,
    splits: Vec<PaymentSplit>,
}

impl SplitEditor {
    /// Creates an editor for a sale with the given remaining balance,
    /// starting with a single cash split covering the whole amount.
    pub fn new(remaining: Money) -> Self {
        SplitEditor {
            remaining,
            splits: vec![PaymentSplit::new(PaymentMethod::Cash, remaining)],
        }
    }

    /// The remaining balance the splits are being composed against.
    #[inline]
    pub fn remaining(&self) -> Money {
        self.remaining
    }

    /// Current splits, in insertion order.
    #[inline]
    pub fn splits(&self) -> &[PaymentSplit] {
        &self.splits
    }

    /// Sum of all split amounts.
    #[inline]
    pub fn total(&self) -> Money {
        splits_total(&self.splits)
    }

    /// Appends a split with the next unused method.
    ///
    /// With fewer than 2 splits before the add, the remaining balance is
    /// re-divided evenly across all resulting splits. With 2 or more, the
    /// new split starts at 0 and waits for manual entry.
    pub fn add_method(&mut self) -> CoreResult<()> {
        if self.splits.len() >= MAX_SPLITS {
            return Err(CoreError::SplitLimitReached { max: MAX_SPLITS });
        }

        let method = self.next_unused_method().ok_or(CoreError::NoUnusedMethod)?;
        let had_few = self.splits.len() < 2;

        self.splits.push(PaymentSplit::new(method, Money::zero()));

        if had_few {
            self.redistribute_evenly();
        }

        Ok(())
    }

    /// Removes the split at `index`.
    ///
    /// A sole survivor is forced to the full remaining balance; two or more
    /// survivors get an even re-split, discarding manual allocations.
    pub fn remove_method(&mut self, index: usize) -> CoreResult<()> {
        if index >= self.splits.len() {
            return Err(CoreError::InvalidSplitIndex(index));
        }

        self.splits.remove(index);

        match self.splits.len() {
            0 => {}
            1 => self.splits[0].amount_cents = self.remaining.cents(),
            _ => self.redistribute_evenly(),
        }

        Ok(())
    }

    /// Sets the amount of the split at `index`.
    ///
    /// With exactly 2 splits the counterpart auto-adjusts so the pair still
    /// sums to the remaining balance, clamped at 0 (never a negative
    /// counter-adjustment). With 1 or 3 splits the edit is taken literally.
    pub fn set_amount(&mut self, index: usize, amount: Money) -> CoreResult<()> {
        if index >= self.splits.len() {
            return Err(CoreError::InvalidSplitIndex(index));
        }

        self.splits[index].amount_cents = amount.cents();

        if self.splits.len() == 2 {
            let other = 1 - index;
            let counterpart = (self.remaining - amount).max(Money::zero());
            self.splits[other].amount_cents = counterpart.cents();
        }

        Ok(())
    }

    /// Parses an operator-typed amount string and applies it via
    /// [`set_amount`](Self::set_amount). Malformed input (more than 2
    /// decimals, negatives, garbage) is rejected before any state changes.
    pub fn set_amount_str(&mut self, index: usize, input: &str) -> CoreResult<()> {
        if index >= self.splits.len() {
            return Err(CoreError::InvalidSplitIndex(index));
        }
        let amount = Money::parse(input)?;
        self.set_amount(index, amount)
    }

    /// Relabels the split at `index` to another method. No amount side
    /// effects. Rejects a method already used by another split.
    pub fn set_method(&mut self, index: usize, method: PaymentMethod) -> CoreResult<()> {
        if index >= self.splits.len() {
            return Err(CoreError::InvalidSplitIndex(index));
        }

        let duplicate = self
            .splits
            .iter()
            .enumerate()
            .any(|(i, s)| i != index && s.method == method);
        if duplicate {
            return Err(CoreError::DuplicateMethod(method.label().to_string()));
        }

        self.splits[index].method = method;
        Ok(())
    }

    /// The splits with non-zero amounts, ready for the settlement engine.
    pub fn nonzero_splits(&self) -> Vec<PaymentSplit> {
        self.splits
            .iter()
            .copied()
            .filter(|s| s.amount_cents > 0)
            .collect()
    }

    fn next_unused_method(&self) -> Option<PaymentMethod> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| !self.splits.iter().any(|s| s.method == *m))
    }

    fn redistribute_evenly(&mut self) {
        let shares = self.remaining.split_even(self.splits.len());
        for (split, share) in self.splits.iter_mut().zip(shares) {
            split.amount_cents = share.cents();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
