//! Decimal prices at the edge, integer ticks inside the book.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Largest supported number of price decimals; 10^18 still fits in i64.
pub const MAX_DECIMALS: u32 = 18;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price {price} must be positive")]
    NotPositive { price: Decimal },

    #[error("price {price} is finer than the {decimals}-decimal tick grid")]
    OffGrid { price: Decimal, decimals: u32 },

    #[error("price {price} does not fit in the tick range")]
    OutOfRange { price: Decimal },

    #[error("price decimals {0} exceeds the maximum of 18")]
    TooManyDecimals(u32),
}

/// Fixed-point conversion: one tick is `10^-decimals` price units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickScale {
    decimals: u32,
}

impl TickScale {
    pub fn new(decimals: u32) -> Result<Self, PriceError> {
        if decimals > MAX_DECIMALS {
            return Err(PriceError::TooManyDecimals(decimals));
        }
        Ok(Self { decimals })
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Converts an exact decimal price to ticks. Never rounds.
    pub fn to_ticks(&self, price: Decimal) -> Result<i64, PriceError> {
        if price <= Decimal::ZERO {
            return Err(PriceError::NotPositive { price });
        }
        let unit = Decimal::from(10i64.pow(self.decimals));
        let scaled = price
            .checked_mul(unit)
            .ok_or(PriceError::OutOfRange { price })?;
        if !scaled.fract().is_zero() {
            return Err(PriceError::OffGrid {
                price,
                decimals: self.decimals,
            });
        }
        scaled.to_i64().ok_or(PriceError::OutOfRange { price })
    }

    pub fn to_price(&self, ticks: i64) -> Decimal {
        Decimal::new(ticks, self.decimals)
    }
}

impl Default for TickScale {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).expect("valid decimal")
    }

    #[test]
    fn converts_on_grid_prices() {
        let scale = TickScale::default();
        assert_eq!(scale.to_ticks(dec("100.5")), Ok(10050));
        assert_eq!(scale.to_ticks(dec("99")), Ok(9900));
        assert_eq!(scale.to_ticks(dec("0.01")), Ok(1));
        assert_eq!(scale.to_price(10050), dec("100.50"));
    }

    #[test]
    fn rejects_off_grid_and_non_positive() {
        let scale = TickScale::default();
        assert_eq!(
            scale.to_ticks(dec("100.505")),
            Err(PriceError::OffGrid { price: dec("100.505"), decimals: 2 })
        );
        assert!(matches!(scale.to_ticks(dec("0")), Err(PriceError::NotPositive { .. })));
        assert!(matches!(scale.to_ticks(dec("-1.5")), Err(PriceError::NotPositive { .. })));
    }

    #[test]
    fn rejects_out_of_range() {
        let scale = TickScale::new(18).expect("within limit");
        assert!(matches!(
            scale.to_ticks(dec("1000000000")),
            Err(PriceError::OutOfRange { .. })
        ));
        assert_eq!(TickScale::new(19), Err(PriceError::TooManyDecimals(19)));
    }

    #[test]
    fn zero_decimals_means_whole_ticks() {
        let scale = TickScale::new(0).expect("within limit");
        assert_eq!(scale.to_ticks(dec("42")), Ok(42));
        assert_eq!(scale.to_price(42), dec("42"));
    }
}
