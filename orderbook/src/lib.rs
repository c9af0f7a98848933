//! Single-instrument limit order book with price-time priority matching.
//!
//! Core features:
//! - Price-time priority matching (best price first, then FIFO)
//! - Limit and market orders, partial fills and immediate execution
//! - O(1) cancellation through an order index into slab-backed levels
//! - Append-only trade log and top-of-book / depth snapshots

pub mod error;
pub mod price_levels;
pub mod snapshot;
pub mod trade_log;
pub mod types;

pub use error::BookError;
pub use price_levels::PriceLevels;
pub use snapshot::{BookStats, Depth, LevelSummary};
pub use trade_log::TradeLog;
pub use types::{Order, OrderId, Quote, Side, Trade, MARKET_BUY_PX, MARKET_SELL_PX};

use price_levels::Handle;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

#[cfg(test)]
mod proptests;

/// Where a resting order lives. Present in the index exactly while the
/// order sits in a ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Location {
    side: Side,
    px_ticks: i64,
    handle: Handle,
}

/// Central limit order book with separate bid/ask sides.
///
/// Uses price-time priority: better prices match first, then earliest orders.
/// Every operation runs to completion before returning and leaves the book
/// uncrossed. Not thread-safe; a host serialises writes through one owner.
pub struct OrderBook {
    /// Buy orders, highest price first
    bids: PriceLevels,
    /// Sell orders, lowest price first
    asks: PriceLevels,
    index: HashMap<OrderId, Location>,
    trades: TradeLog,
    /// Survives `reset` so ids are never reused.
    next_id: u64,
    submitted_qty: i128,
    traded_qty: i128,
    dropped_qty: i128,
    cancelled_qty: i128,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Creates empty order book.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty book with room for `orders` resting orders per side.
    pub fn with_capacity(orders: usize) -> Self {
        Self {
            bids: PriceLevels::with_capacity(Side::Bid, orders),
            asks: PriceLevels::with_capacity(Side::Ask, orders),
            index: HashMap::with_capacity(orders),
            trades: TradeLog::new(),
            next_id: 1,
            submitted_qty: 0,
            traded_qty: 0,
            dropped_qty: 0,
            cancelled_qty: 0,
        }
    }

    /// Submits limit order and returns its id.
    ///
    /// The order first matches against the opposite side; any residual rests
    /// at the tail of its price level. Trades execute at the maker's price.
    pub fn submit_limit(&mut self, px_ticks: i64, qty: i64, side: Side) -> Result<OrderId, BookError> {
        let mut taker = self.accept(px_ticks, qty, side)?;
        let id = taker.id;
        self.match_incoming(&mut taker);

        if taker.qty > 0 {
            debug!(order = %id, %side, px_ticks, qty = taker.qty, "resting");
            let handle = self.ladder_mut(side).push(taker);
            self.index.insert(id, Location { side, px_ticks, handle });
        }
        Ok(id)
    }

    /// Submits market order and returns its id.
    ///
    /// Matches at any price until filled or the opposite side runs dry.
    /// Unfilled residual expires; market orders never rest.
    pub fn submit_market(&mut self, qty: i64, side: Side) -> Result<OrderId, BookError> {
        let mut taker = self.accept(side.market_px(), qty, side)?;
        let id = taker.id;
        self.match_incoming(&mut taker);

        if taker.qty > 0 {
            debug!(order = %id, %side, residual = taker.qty, "market residual dropped");
            self.dropped_qty += i128::from(taker.qty);
        }
        Ok(id)
    }

    /// Cancels a resting order. Returns false if it is unknown, already
    /// filled or already cancelled.
    pub fn cancel(&mut self, id: OrderId) -> bool {
        let Some(loc) = self.index.remove(&id) else {
            debug!(order = %id, "cancel miss");
            return false;
        };

        match self.ladder_mut(loc.side).remove(loc.handle) {
            Some(order) => {
                debug_assert_eq!(order.id, id);
                debug_assert_eq!(order.px_ticks, loc.px_ticks);
                debug!(order = %id, side = %loc.side, px_ticks = loc.px_ticks, qty = order.qty, "cancelled");
                self.cancelled_qty += i128::from(order.qty);
                true
            }
            None => {
                debug_assert!(false, "index entry {id} without a resting order");
                false
            }
        }
    }

    /// Returns current best bid (highest buy price) with its total quantity.
    pub fn best_bid(&self) -> Option<Quote> {
        self.bids.best_quote()
    }

    /// Returns current best ask (lowest sell price) with its total quantity.
    pub fn best_ask(&self) -> Option<Quote> {
        self.asks.best_quote()
    }

    /// Exact number of resting orders.
    pub fn active_order_count(&self) -> usize {
        self.index.len()
    }

    /// Every trade since creation or the last reset, oldest first.
    pub fn trades(&self) -> &[Trade] {
        self.trades.as_slice()
    }

    pub fn trade_log(&self) -> &TradeLog {
        &self.trades
    }

    /// Trades recorded after `mark`, an earlier `trade_log().len()`.
    pub fn trades_since(&self, mark: usize) -> &[Trade] {
        self.trades.since(mark)
    }

    /// Resting state of an order, None once filled or cancelled.
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        let loc = self.index.get(&id)?;
        self.ladder(loc.side).get(loc.handle)
    }

    pub fn bids(&self) -> &PriceLevels {
        &self.bids
    }

    pub fn asks(&self) -> &PriceLevels {
        &self.asks
    }

    /// Up to `levels` price levels per side, best first.
    pub fn depth(&self, levels: usize) -> Depth {
        Depth {
            bids: self.bids.iter_levels_best_first().take(levels).collect(),
            asks: self.asks.iter_levels_best_first().take(levels).collect(),
        }
    }

    pub fn stats(&self) -> BookStats {
        BookStats {
            submitted_qty: self.submitted_qty,
            traded_qty: self.traded_qty,
            dropped_qty: self.dropped_qty,
            cancelled_qty: self.cancelled_qty,
            resting_qty: self.bids.total_qty() + self.asks.total_qty(),
        }
    }

    /// Clears both sides, the index, the trade log and the stats. Id
    /// assignment continues where it left off.
    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.index.clear();
        self.trades.clear();
        self.submitted_qty = 0;
        self.traded_qty = 0;
        self.dropped_qty = 0;
        self.cancelled_qty = 0;
        debug!(next_id = self.next_id, "book reset");
    }

    // Validates input and assigns the next id. Nothing changes on rejection.
    fn accept(&mut self, px_ticks: i64, qty: i64, side: Side) -> Result<Order, BookError> {
        if qty <= 0 {
            warn!(%side, px_ticks, qty, "rejected order with non-positive quantity");
            return Err(BookError::InvalidQuantity { qty });
        }
        let id = OrderId(self.next_id);
        self.next_id += 1;
        self.submitted_qty += i128::from(qty);
        debug!(order = %id, %side, px_ticks, qty, "accepted");
        Ok(Order {
            id,
            side,
            px_ticks,
            qty,
            ts_ns: types::now_ns(),
        })
    }

    // Walks the opposite side from its best price while the taker has
    // quantity left and the level still crosses.
    fn match_incoming(&mut self, taker: &mut Order) {
        let makers = match taker.side {
            Side::Bid => &mut self.asks,
            Side::Ask => &mut self.bids,
        };

        while taker.qty > 0 {
            let Some(best_px) = makers.best_price() else {
                break; // opposite side exhausted
            };
            if !taker.side.crosses(taker.px_ticks, best_px) {
                break; // spread reopened
            }
            let Some(fill) = makers.fill_best(taker.qty) else {
                break;
            };

            taker.qty -= fill.qty;
            self.traded_qty += i128::from(fill.qty);
            if fill.done {
                self.index.remove(&fill.maker);
            }

            let (buyer, seller) = match taker.side {
                Side::Bid => (taker.id, fill.maker),
                Side::Ask => (fill.maker, taker.id),
            };
            trace!(%buyer, %seller, px_ticks = fill.px_ticks, qty = fill.qty, "fill");
            self.trades.append(Trade {
                buyer,
                seller,
                px_ticks: fill.px_ticks, // trade at maker's price
                qty: fill.qty,
                ts_ns: taker.ts_ns,
            });
        }

        debug_assert!(taker.qty >= 0);
    }

    fn ladder(&self, side: Side) -> &PriceLevels {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn ladder_mut(&mut self, side: Side) -> &mut PriceLevels {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }
}
