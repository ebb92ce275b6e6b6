use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Quantity must be greater than zero, got {0}")]
    InvalidQuantity(i32),
    #[error("Product not found or already sold out")]
    ProductNotFound,
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(String),
    #[error("Product {0} is expired")]
    ProductExpired(String),
    #[error("Stock of product {0} changed while the order was being placed")]
    StockChanged(Uuid),
    #[error("Restoring stock of product {0} would overflow")]
    StockOverflow(Uuid),
    #[error("Order not found")]
    OrderNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage error: {0}")]
    Storage(String),
}
