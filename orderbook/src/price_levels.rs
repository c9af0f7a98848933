use crate::snapshot::LevelSummary;
use crate::types::{Order, OrderId, Quote, Side};
use slab::Slab;
use std::collections::BTreeMap;

/// Stable reference to a resting order inside one `PriceLevels`.
pub(crate) type Handle = usize;

// One resting order, linked into the FIFO of its price level
#[derive(Clone, Debug)]
struct Node {
    order: Order,
    prev: Option<Handle>,
    next: Option<Handle>,
}

// Intrusive FIFO over slab handles; head is the oldest order
#[derive(Clone, Debug, Default)]
struct Level {
    head: Option<Handle>,
    tail: Option<Handle>,
    // wide so any number of i64 orders can share a price
    total_qty: i128,
    count: usize,
}

/// Result of filling against the front order of the best level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Fill {
    pub maker: OrderId,
    pub px_ticks: i64,
    pub qty: i64,
    /// Maker reached zero and left the book.
    pub done: bool,
}

// Structured price levels, FIFO tracking with BTreeMap
// side determines which end of the map is the best
// - Asks: lowest price is best (front of map)
// - Bids: highest price is best (back of map)
// Orders live in a slab so any of them can be unlinked in O(1)
pub struct PriceLevels {
    /// Bid or ask?
    side: Side,
    /// price ticks mapped to the queue of orders waiting at that price
    levels: BTreeMap<i64, Level>,
    orders: Slab<Node>,
}

impl PriceLevels {
    /// Creates empty price levels for given side
    pub(crate) fn new(side: Side) -> Self {
        Self::with_capacity(side, 0)
    }

    pub(crate) fn with_capacity(side: Side, orders: usize) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            orders: Slab::with_capacity(orders),
        }
    }

    /// Appends an order to the tail of its price level, creating the level
    /// if needed. Returns the handle used to cancel it later.
    pub(crate) fn push(&mut self, order: Order) -> Handle {
        let px = order.px_ticks;
        let qty = order.qty;
        let level = self.levels.entry(px).or_default();
        let prev_tail = level.tail;
        let h = self.orders.insert(Node {
            order,
            prev: prev_tail,
            next: None,
        });

        match prev_tail {
            Some(t) => self.orders[t].next = Some(h),
            None => level.head = Some(h),
        }
        level.tail = Some(h);
        level.count += 1;
        level.total_qty += i128::from(qty);
        h
    }

    /// Returns the best price for the side without removing anything
    /// For asks: the lowest price (whatever is first in the BTree)
    /// For bids: the highest price (whatever is last in the BTree)
    /// Returns None if no price levels currently exist
    pub fn best_price(&self) -> Option<i64> {
        self.best_level().map(|(px, _)| px)
    }

    /// Best price with the aggregate quantity resting there.
    pub fn best_quote(&self) -> Option<Quote> {
        self.best_level().map(|(px_ticks, level)| Quote {
            px_ticks,
            qty: level.total_qty,
        })
    }

    /// Returns how many orders are waiting at best price
    /// Returns 0 if no price levels currently
    pub fn best_level_size(&self) -> usize {
        self.best_level().map(|(_, level)| level.count).unwrap_or(0)
    }

    /// Oldest order at the best price.
    pub fn peek_best(&self) -> Option<&Order> {
        let (_, level) = self.best_level()?;
        level.head.map(|h| &self.orders[h].order)
    }

    /// Trades up to `want` lots against the oldest order at the best price.
    ///
    /// A maker that reaches zero is unlinked, and the level is dropped the
    /// moment its queue empties. Returns None on an empty side.
    pub(crate) fn fill_best(&mut self, want: i64) -> Option<Fill> {
        debug_assert!(want > 0);
        let px = self.best_price()?;
        let level = self.levels.get_mut(&px)?;
        let h = level.head?;

        let node = &mut self.orders[h];
        let qty = want.min(node.order.qty);
        node.order.qty -= qty;
        level.total_qty -= i128::from(qty);
        let maker = node.order.id;
        let done = node.order.qty == 0;

        if done {
            let next = node.next;
            self.orders.remove(h);
            level.head = next;
            match next {
                Some(n) => self.orders[n].prev = None,
                None => level.tail = None,
            }
            level.count -= 1;
            if level.count == 0 {
                // remove the level if empty to keep best price lookups cheap
                self.levels.remove(&px);
            }
        }

        Some(Fill {
            maker,
            px_ticks: px,
            qty,
            done,
        })
    }

    /// Unlinks the order behind `h` wherever it sits in its queue. The
    /// relative order of the remaining orders is unchanged.
    pub(crate) fn remove(&mut self, h: Handle) -> Option<Order> {
        if !self.orders.contains(h) {
            return None;
        }
        let node = self.orders.remove(h);
        if let Some(p) = node.prev {
            self.orders[p].next = node.next;
        }
        if let Some(n) = node.next {
            self.orders[n].prev = node.prev;
        }

        let px = node.order.px_ticks;
        if let Some(level) = self.levels.get_mut(&px) {
            if node.prev.is_none() {
                level.head = node.next;
            }
            if node.next.is_none() {
                level.tail = node.prev;
            }
            level.count -= 1;
            level.total_qty -= i128::from(node.order.qty);
            if level.count == 0 {
                self.levels.remove(&px);
            }
        }
        Some(node.order)
    }

    pub(crate) fn get(&self, h: Handle) -> Option<&Order> {
        self.orders.get(h).map(|node| &node.order)
    }

    /// Number of resting orders on this side.
    pub fn total_len(&self) -> usize {
        self.orders.len()
    }

    /// Number of distinct prices on this side.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Aggregate quantity at `px`, 0 when no level exists.
    pub fn qty_at_price(&self, px: i64) -> i128 {
        self.levels.get(&px).map(|l| l.total_qty).unwrap_or(0)
    }

    /// Total quantity resting on this side.
    pub fn total_qty(&self) -> i128 {
        self.levels.values().map(|l| l.total_qty).sum()
    }

    /// Orders at `px` in arrival order.
    pub fn iter_level(&self, px: i64) -> LevelIter<'_> {
        LevelIter {
            orders: &self.orders,
            cur: self.levels.get(&px).and_then(|l| l.head),
        }
    }

    /// Level summaries from the best price outward.
    pub fn iter_levels_best_first(&self) -> Box<dyn Iterator<Item = LevelSummary> + '_> {
        let summary = |(px, level): (&i64, &Level)| LevelSummary {
            px_ticks: *px,
            qty: level.total_qty,
            orders: level.count,
        };
        match self.side {
            Side::Ask => Box::new(self.levels.iter().map(summary)),
            Side::Bid => Box::new(self.levels.iter().rev().map(summary)),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.levels.clear();
        self.orders.clear();
    }

    fn best_level(&self) -> Option<(i64, &Level)> {
        let entry = match self.side {
            Side::Ask => self.levels.first_key_value(),
            Side::Bid => self.levels.last_key_value(),
        };
        entry.map(|(px, level)| (*px, level))
    }
}

/// FIFO walk over one price level.
pub struct LevelIter<'a> {
    orders: &'a Slab<Node>,
    cur: Option<Handle>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let h = self.cur?;
        let node = &self.orders[h];
        self.cur = node.next;
        Some(&node.order)
    }
}
