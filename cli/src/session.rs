//! One book, driven serially by script commands.

use std::fmt;

use orderbook::{BookError, BookStats, LevelSummary, OrderBook, OrderId, Quote, Side, Trade};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::price::{PriceError, TickScale};
use crate::script::Command;

/// Trade with its price in decimal units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeView {
    pub buyer: OrderId,
    pub seller: OrderId,
    pub price: Decimal,
    pub qty: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuoteView {
    pub price: Decimal,
    pub qty: i128,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelView {
    pub price: Decimal,
    pub qty: i128,
    pub orders: usize,
}

/// Result of one command, printed as text or as one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Accepted {
        order_id: OrderId,
        side: Side,
        trades: Vec<TradeView>,
        resting_qty: i64,
    },
    Rejected {
        order_id: OrderId,
        reason: String,
    },
    Cancelled {
        order_id: OrderId,
        success: bool,
    },
    Top {
        best_bid: Option<QuoteView>,
        best_ask: Option<QuoteView>,
    },
    Depth {
        bids: Vec<LevelView>,
        asks: Vec<LevelView>,
    },
    Trades {
        trades: Vec<TradeView>,
    },
    Count {
        active_orders: usize,
    },
    Stats(BookStats),
    Reset,
}

pub struct Session {
    book: OrderBook,
    scale: TickScale,
}

impl Session {
    pub fn new(scale: TickScale) -> Self {
        Self {
            book: OrderBook::new(),
            scale,
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn execute(&mut self, cmd: Command) -> Event {
        match cmd {
            Command::Limit { side, price, qty } => match self.scale.to_ticks(price) {
                Ok(px_ticks) => {
                    let mark = self.book.trade_log().len();
                    let result = self.book.submit_limit(px_ticks, qty, side);
                    self.submitted(side, mark, result)
                }
                Err(e) => rejected_price(e),
            },
            Command::Market { side, qty } => {
                let mark = self.book.trade_log().len();
                let result = self.book.submit_market(qty, side);
                self.submitted(side, mark, result)
            }
            Command::Cancel { id } => Event::Cancelled {
                order_id: id,
                success: self.book.cancel(id),
            },
            Command::Top => Event::Top {
                best_bid: self.book.best_bid().map(|q| self.quote_view(q)),
                best_ask: self.book.best_ask().map(|q| self.quote_view(q)),
            },
            Command::Depth { levels } => {
                let depth = self.book.depth(levels);
                Event::Depth {
                    bids: depth.bids.iter().map(|l| self.level_view(l)).collect(),
                    asks: depth.asks.iter().map(|l| self.level_view(l)).collect(),
                }
            }
            Command::Trades => Event::Trades {
                trades: self.trade_views(self.book.trades()),
            },
            Command::Count => Event::Count {
                active_orders: self.book.active_order_count(),
            },
            Command::Stats => Event::Stats(self.book.stats()),
            Command::Reset => {
                self.book.reset();
                info!("book reset");
                Event::Reset
            }
        }
    }

    fn submitted(&self, side: Side, mark: usize, result: Result<OrderId, BookError>) -> Event {
        match result {
            Ok(order_id) => Event::Accepted {
                order_id,
                side,
                trades: self.trade_views(self.book.trades_since(mark)),
                resting_qty: self.book.order(order_id).map(|o| o.qty).unwrap_or(0),
            },
            Err(e) => Event::Rejected {
                order_id: OrderId::REJECTED,
                reason: e.to_string(),
            },
        }
    }

    fn trade_views(&self, trades: &[Trade]) -> Vec<TradeView> {
        trades
            .iter()
            .map(|t| TradeView {
                buyer: t.buyer,
                seller: t.seller,
                price: self.scale.to_price(t.px_ticks),
                qty: t.qty,
            })
            .collect()
    }

    fn quote_view(&self, q: Quote) -> QuoteView {
        QuoteView {
            price: self.scale.to_price(q.px_ticks),
            qty: q.qty,
        }
    }

    fn level_view(&self, l: &LevelSummary) -> LevelView {
        LevelView {
            price: self.scale.to_price(l.px_ticks),
            qty: l.qty,
            orders: l.orders,
        }
    }
}

fn rejected_price(e: PriceError) -> Event {
    Event::Rejected {
        order_id: OrderId::REJECTED,
        reason: e.to_string(),
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Accepted {
                order_id,
                side,
                trades,
                resting_qty,
            } => {
                write!(f, "Order #{order_id} ({side}) accepted")?;
                if *resting_qty > 0 {
                    write!(f, ", {resting_qty} resting")?;
                }
                for t in trades {
                    write!(f, "\n  Trade: Buyer #{} <- Seller #{} @ {} x {}", t.buyer, t.seller, t.price, t.qty)?;
                }
                Ok(())
            }
            Event::Rejected { order_id, reason } => write!(f, "Order #{order_id} rejected: {reason}"),
            Event::Cancelled { order_id, success } => {
                let outcome = if *success { "Success" } else { "Failed" };
                write!(f, "Cancel #{order_id}: {outcome}")
            }
            Event::Top { best_bid, best_ask } => {
                match best_bid {
                    Some(q) => writeln!(f, "Best Bid: {} x {}", q.price, q.qty)?,
                    None => writeln!(f, "Best Bid: none")?,
                }
                match best_ask {
                    Some(q) => write!(f, "Best Ask: {} x {}", q.price, q.qty),
                    None => write!(f, "Best Ask: none"),
                }
            }
            Event::Depth { bids, asks } => {
                write!(f, "Asks:")?;
                for (i, l) in asks.iter().enumerate() {
                    write!(f, "\n  {}: {} @ {} ({} orders)", i + 1, l.qty, l.price, l.orders)?;
                }
                write!(f, "\nBids:")?;
                for (i, l) in bids.iter().enumerate() {
                    write!(f, "\n  {}: {} @ {} ({} orders)", i + 1, l.qty, l.price, l.orders)?;
                }
                Ok(())
            }
            Event::Trades { trades } => {
                write!(f, "=== Trades ===")?;
                for t in trades {
                    write!(f, "\nTrade: Buyer #{} <- Seller #{} @ {} x {}", t.buyer, t.seller, t.price, t.qty)?;
                }
                write!(f, "\nTotal trades: {}", trades.len())
            }
            Event::Count { active_orders } => write!(f, "Total active orders: {active_orders}"),
            Event::Stats(s) => write!(
                f,
                "submitted={} traded={} dropped={} cancelled={} resting={}",
                s.submitted_qty, s.traded_qty, s.dropped_qty, s.cancelled_qty, s.resting_qty
            ),
            Event::Reset => write!(f, "Book reset"),
        }
    }
}
