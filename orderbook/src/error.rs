use thiserror::Error;

/// Input rejected at the book boundary. No state changes when returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    #[error("invalid quantity {qty}: must be positive")]
    InvalidQuantity { qty: i64 },
}
