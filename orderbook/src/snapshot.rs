//! Read-only reporting views over the book.

use serde::{Deserialize, Serialize};

/// Aggregated orders at one price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub px_ticks: i64,
    pub qty: i128,     // total resting at this price
    pub orders: usize, // individual orders queued
}

/// Market depth, best level first on both sides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depth {
    pub bids: Vec<LevelSummary>, // highest to lowest
    pub asks: Vec<LevelSummary>, // lowest to highest
}

/// Quantity accounting since creation or the last reset.
///
/// Each traded lot leaves one bid lot and one ask lot, so a consistent book
/// always satisfies `submitted == resting + 2 * traded + dropped + cancelled`.
/// Totals are `i128` so they cannot overflow on any sequence of `i64` orders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookStats {
    pub submitted_qty: i128,
    pub traded_qty: i128,
    /// Market order residual that expired unfilled.
    pub dropped_qty: i128,
    pub cancelled_qty: i128,
    pub resting_qty: i128,
}

impl BookStats {
    pub fn is_conserved(&self) -> bool {
        self.submitted_qty
            == self.resting_qty + 2 * self.traded_qty + self.dropped_qty + self.cancelled_qty
    }
}
