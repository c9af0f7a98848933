//! Line-oriented order script.
//!
//! ```text
//! # comments and blank lines are skipped
//! limit buy 99.50 100
//! market sell 50
//! cancel 2
//! top | depth [levels] | trades | count | stats | reset
//! ```

use orderbook::{OrderId, Side};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_DEPTH: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Limit { side: Side, price: Decimal, qty: i64 },
    Market { side: Side, qty: i64 },
    Cancel { id: OrderId },
    Top,
    Depth { levels: usize },
    Trades,
    Count,
    Stats,
    Reset,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{command}' expects {expected}")]
    Arity { command: &'static str, expected: &'static str },

    #[error("invalid side '{0}', use buy/bid or sell/ask")]
    Side(String),

    #[error("invalid {what} '{value}'")]
    Number { what: &'static str, value: String },
}

pub fn parse_side(s: &str) -> Result<Side, ParseError> {
    match s.to_lowercase().as_str() {
        "bid" | "buy" => Ok(Side::Bid),
        "ask" | "sell" => Ok(Side::Ask),
        _ => Err(ParseError::Side(s.to_string())),
    }
}

fn number<T: FromStr>(what: &'static str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::Number {
        what,
        value: value.to_string(),
    })
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() {
        return Ok(None);
    }
    line.parse().map(Some)
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let Some((&head, args)) = words.split_first() else {
            return Err(ParseError::UnknownCommand(String::new()));
        };

        let cmd = match (head.to_lowercase().as_str(), args) {
            ("limit", [side, price, qty]) => Command::Limit {
                side: parse_side(side)?,
                price: number("price", price)?,
                qty: number("quantity", qty)?,
            },
            ("limit", _) => {
                return Err(ParseError::Arity { command: "limit", expected: "<side> <price> <qty>" })
            }
            ("market", [side, qty]) => Command::Market {
                side: parse_side(side)?,
                qty: number("quantity", qty)?,
            },
            ("market", _) => {
                return Err(ParseError::Arity { command: "market", expected: "<side> <qty>" })
            }
            ("cancel", [id]) => Command::Cancel {
                id: OrderId(number("order id", id)?),
            },
            ("cancel", _) => {
                return Err(ParseError::Arity { command: "cancel", expected: "<order id>" })
            }
            ("depth", []) => Command::Depth { levels: DEFAULT_DEPTH },
            ("depth", [levels]) => Command::Depth {
                levels: number("level count", levels)?,
            },
            ("depth", _) => {
                return Err(ParseError::Arity { command: "depth", expected: "[levels]" })
            }
            ("top", []) => Command::Top,
            ("trades", []) => Command::Trades,
            ("count", []) => Command::Count,
            ("stats", []) => Command::Stats,
            ("reset", []) => Command::Reset,
            ("top" | "trades" | "count" | "stats" | "reset", _) => {
                return Err(ParseError::Arity { command: "query", expected: "no arguments" })
            }
            _ => return Err(ParseError::UnknownCommand(head.to_string())),
        };
        Ok(cmd)
    }
}
