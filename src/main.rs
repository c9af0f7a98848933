//! Order Book Performance Lab
//!
//! Runs performance tests followed by a walkthrough showing order
//! placement, matching, market orders and cancellation.

use clap::Parser;
use orderbook::{OrderBook, Side};
use std::time::Duration;
use tracing_subscriber::EnvFilter;


#[derive(Parser)]
#[command(name = "lob-lab")]
#[command(about = "Latency and throughput lab for the limit order book")]
struct Args {
    /// Length of the sustained throughput run
    #[arg(long, default_value_t = 10)]
    throughput_secs: u64,
    /// Only run the walkthrough
    #[arg(long)]
    skip_perf: bool,
}

/// Main entry point - runs performance tests and demo.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    println!("=== Order Book Performance Lab ===");

    if !args.skip_perf {
        latency_test::run_latency_tests();
        latency_test::run_throughput_test(Duration::from_secs(args.throughput_secs));
    }

    println!("\n=== Basic Demo ===");
    run_basic_demo();
}

fn print_top(ob: &OrderBook) {
    match ob.best_bid() {
        Some(q) => println!("Best Bid: {q}"),
        None => println!("Best Bid: none"),
    }
    match ob.best_ask() {
        Some(q) => println!("Best Ask: {q}"),
        None => println!("Best Ask: none"),
    }
}

fn print_trades(ob: &OrderBook, since: usize) {
    let trades = ob.trades_since(since);
    println!("Trades executed: {}", trades.len());
    for trade in trades {
        println!("  {trade}");
    }
}

/// Demonstrates order book functionality with trade execution. Prices in ticks.
fn run_basic_demo() {
    let mut ob = OrderBook::new();

    println!("--- Building Order Book ---");
    for (px, qty, side) in [
        (9950, 100, Side::Bid),
        (9900, 150, Side::Bid),
        (10050, 80, Side::Ask),
        (10100, 120, Side::Ask),
    ] {
        match ob.submit_limit(px, qty, side) {
            Ok(id) => println!("Added {side} #{id}: {px} x {qty}"),
            Err(e) => println!("Rejected {side} {px} x {qty}: {e}"),
        }
    }
    print_top(&ob);
    println!("Total active orders: {}", ob.active_order_count());

    // Aggressive bid that crosses; executes at the resting ask's price
    println!("\n--- Aggressive Buy Order ---");
    let mark = ob.trade_log().len();
    if let Ok(id) = ob.submit_limit(10070, 100, Side::Bid) {
        println!("Added bid #{id}: 10070 x 100 (crosses!)");
    }
    print_trades(&ob, mark);
    print_top(&ob);

    println!("\n--- Market Sell Order ---");
    let mark = ob.trade_log().len();
    if let Ok(id) = ob.submit_market(50, Side::Ask) {
        println!("Market sell #{id}: 50");
    }
    print_trades(&ob, mark);
    print_top(&ob);

    println!("\n--- Cancel Order ---");
    let deep_bid = ob.bids().iter_levels_best_first().last().map(|l| l.px_ticks);
    let target = deep_bid.and_then(|px| ob.bids().iter_level(px).next().map(|o| o.id));
    if let Some(id) = target {
        let outcome = if ob.cancel(id) { "Success" } else { "Failed" };
        println!("Cancelled order #{id}: {outcome}");
    }
    println!("Total active orders: {}", ob.active_order_count());

    let stats = ob.stats();
    println!(
        "Submitted {} / traded {} / dropped {} / cancelled {} / resting {}",
        stats.submitted_qty, stats.traded_qty, stats.dropped_qty, stats.cancelled_qty, stats.resting_qty
    );

    // Invalid input never touches the book
    if let Err(e) = ob.submit_limit(10000, 0, Side::Bid) {
        println!("Zero quantity order rejected: {e}");
    }
}
