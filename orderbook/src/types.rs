use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Synthetic limit for market buys: no ask can be priced above it.
pub const MARKET_BUY_PX: i64 = i64::MAX;
/// Synthetic limit for market sells: no bid can be priced below it, zero
/// and negative tick prices included.
pub const MARKET_SELL_PX: i64 = i64::MIN;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }

    /// Most aggressive limit for this side, used to price market orders.
    pub fn market_px(self) -> i64 {
        match self {
            Side::Bid => MARKET_BUY_PX,
            Side::Ask => MARKET_SELL_PX,
        }
    }

    /// Whether an incoming order on this side at `taker_px` trades with a
    /// resting order at `maker_px`.
    pub fn crosses(self, taker_px: i64, maker_px: i64) -> bool {
        match self {
            Side::Bid => maker_px <= taker_px,
            Side::Ask => maker_px >= taker_px,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => f.write_str("bid"),
            Side::Ask => f.write_str("ask"),
        }
    }
}

/// Order identifier, assigned by the book starting at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl OrderId {
    /// Never issued by a book; hosts report rejected submissions with it.
    pub const REJECTED: OrderId = OrderId(0);
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub px_ticks: i64, // integer price ticks
    pub qty: i64,      // remaining lots
    pub ts_ns: u128,   // arrival time, audit only
}

/// Executed trade. `buyer` is always the bid-side order, whichever side
/// was the aggressor; the price is the resting order's.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub buyer: OrderId,
    pub seller: OrderId,
    pub px_ticks: i64,
    pub qty: i64,
    pub ts_ns: u128,
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Buyer #{} <- Seller #{} @ {} x {}",
            self.buyer, self.seller, self.px_ticks, self.qty
        )
    }
}

/// Top-of-book for one side: best price and the total resting there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub px_ticks: i64,
    pub qty: i128,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.px_ticks, self.qty)
    }
}

pub(crate) fn now_ns() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_condition_per_side() {
        // Incoming bid at 100 lifts asks at or below 100
        assert!(Side::Bid.crosses(100, 99));
        assert!(Side::Bid.crosses(100, 100));
        assert!(!Side::Bid.crosses(100, 101));

        // Incoming ask at 100 hits bids at or above 100
        assert!(Side::Ask.crosses(100, 101));
        assert!(Side::Ask.crosses(100, 100));
        assert!(!Side::Ask.crosses(100, 99));
    }

    #[test]
    fn market_px_crosses_everything() {
        assert!(Side::Bid.crosses(Side::Bid.market_px(), i64::MAX - 1));
        assert!(Side::Ask.crosses(Side::Ask.market_px(), 1));
        assert!(Side::Ask.crosses(Side::Ask.market_px(), 0));
        assert!(Side::Ask.crosses(Side::Ask.market_px(), i64::MIN));
        assert_eq!(Side::Bid.opposite(), Side::Ask);
    }

    #[test]
    fn trade_display() {
        let t = Trade {
            buyer: OrderId(3),
            seller: OrderId(1),
            px_ticks: 10050,
            qty: 30,
            ts_ns: 0,
        };
        assert_eq!(t.to_string(), "Buyer #3 <- Seller #1 @ 10050 x 30");
        assert_eq!(Quote { px_ticks: 9950, qty: 100 }.to_string(), "9950 x 100");
    }
}
