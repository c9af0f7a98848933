use crate::types::Trade;

/// Append-only record of executions, oldest first.
#[derive(Clone, Debug, Default)]
pub struct TradeLog {
    trades: Vec<Trade>,
}

impl TradeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn as_slice(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Trades appended after `mark`, where `mark` is an earlier `len()`.
    pub fn since(&self, mark: usize) -> &[Trade] {
        self.trades.get(mark..).unwrap_or(&[])
    }

    /// Sum of executed lots.
    pub fn total_qty(&self) -> i128 {
        self.trades.iter().map(|t| i128::from(t.qty)).sum()
    }

    pub(crate) fn clear(&mut self) {
        self.trades.clear();
    }
}
