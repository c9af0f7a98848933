//! Property tests over random order flow.

use super::*;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Limit { side: Side, px: i64, qty: i64 },
    Market { side: Side, qty: i64 },
    // Index into the ids issued so far
    Cancel { pick: usize },
}

fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Bid), Just(Side::Ask)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (side(), 95i64..=105, 1i64..=50).prop_map(|(side, px, qty)| Op::Limit { side, px, qty }),
        1 => (side(), 1i64..=120).prop_map(|(side, qty)| Op::Market { side, qty }),
        2 => any::<usize>().prop_map(|pick| Op::Cancel { pick }),
    ]
}

fn check_book(ob: &OrderBook) {
    // Never crossed once an operation returns
    if let (Some(b), Some(a)) = (ob.best_bid(), ob.best_ask()) {
        assert!(b.px_ticks < a.px_ticks, "crossed book: bid {b} ask {a}");
    }

    // Index and ladders describe the same set of orders
    assert_eq!(
        ob.index.len(),
        ob.bids.total_len() + ob.asks.total_len()
    );
    for (id, loc) in &ob.index {
        let order = ob.ladder(loc.side).get(loc.handle).expect("indexed order rests");
        assert_eq!(order.id, *id);
        assert_eq!(order.side, loc.side);
        assert_eq!(order.px_ticks, loc.px_ticks);
        assert!(order.qty > 0);
    }

    // Ids are issued in arrival order, so FIFO means ascending ids per level
    for ladder in [&ob.bids, &ob.asks] {
        for level in ladder.iter_levels_best_first() {
            let ids: Vec<OrderId> = ladder.iter_level(level.px_ticks).map(|o| o.id).collect();
            assert_eq!(ids.len(), level.orders);
            assert!(ids.windows(2).all(|w| w[0] < w[1]), "level {} out of order", level.px_ticks);
            let qty: i128 = ladder.iter_level(level.px_ticks).map(|o| i128::from(o.qty)).sum();
            assert_eq!(qty, level.qty);
        }
    }

    assert!(ob.stats().is_conserved(), "{:?}", ob.stats());
    assert_eq!(ob.stats().traded_qty, ob.trade_log().total_qty());
}

proptest! {
    #[test]
    fn random_flow_keeps_invariants(ops in prop::collection::vec(op(), 1..200)) {
        let mut ob = OrderBook::new();
        let mut issued: Vec<OrderId> = Vec::new();

        for op in ops {
            match op {
                Op::Limit { side, px, qty } => {
                    issued.push(ob.submit_limit(px, qty, side).expect("positive qty"));
                }
                Op::Market { side, qty } => {
                    let id = ob.submit_market(qty, side).expect("positive qty");
                    prop_assert!(ob.order(id).is_none(), "market order {} rests", id);
                    prop_assert!(!ob.index.contains_key(&id));
                    issued.push(id);
                }
                Op::Cancel { pick } => {
                    if issued.is_empty() {
                        continue;
                    }
                    let id = issued[pick % issued.len()];
                    let was_resting = ob.order(id).is_some();
                    prop_assert_eq!(ob.cancel(id), was_resting);
                    prop_assert!(!ob.cancel(id), "second cancel of {} succeeded", id);
                }
            }
            check_book(&ob);
        }
    }

    #[test]
    fn same_price_makers_fill_in_arrival_order(
        sizes in prop::collection::vec(1i64..=100, 1..20),
        take in 1i64..=2000,
    ) {
        let mut ob = OrderBook::new();
        let makers: Vec<OrderId> = sizes
            .iter()
            .map(|&qty| ob.submit_limit(10000, qty, Side::Ask).expect("positive qty"))
            .collect();

        ob.submit_limit(10000, take, Side::Bid).expect("positive qty");

        // Each maker is completed before the next one is touched
        let sellers: Vec<OrderId> = ob.trades().iter().map(|t| t.seller).collect();
        prop_assert_eq!(&sellers[..], &makers[..sellers.len()]);
        for (t, &size) in ob.trades().iter().zip(&sizes).take(sellers.len().saturating_sub(1)) {
            prop_assert_eq!(t.qty, size);
        }
        check_book(&ob);
    }

    #[test]
    fn rejected_input_changes_nothing(qty in i64::MIN..=0, px in 1i64..100_000) {
        let mut ob = OrderBook::new();
        ob.submit_limit(px, 10, Side::Bid).expect("positive qty");
        let before = ob.stats();

        prop_assert!(ob.submit_limit(px, qty, Side::Ask).is_err());
        prop_assert!(ob.submit_market(qty, Side::Ask).is_err());
        prop_assert_eq!(ob.stats(), before);
        prop_assert_eq!(ob.active_order_count(), 1);
        prop_assert!(ob.trades().is_empty());
    }
}
