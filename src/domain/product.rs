use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub picture: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub expiration_time: DateTime<Utc>,
    pub is_sold_out: bool,
    pub sold_out_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// A product stops being purchasable once `now` passes its expiration time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration_time
    }
}

/// Catalog entry as submitted by an administrator.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub picture: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub expiration_time: DateTime<Utc>,
    pub is_sold_out: bool,
    pub sold_out_at: Option<DateTime<Utc>>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("name must not be empty".to_string()));
        }
        if self.price < BigDecimal::from(0) {
            return Err(DomainError::InvalidInput("price must not be negative".to_string()));
        }
        // Prices are stored as NUMERIC(12, 2).
        if self.price.with_scale(2) != self.price {
            return Err(DomainError::InvalidInput(
                "price must not have more than two decimal places".to_string(),
            ));
        }
        if self.stock < 0 {
            return Err(DomainError::InvalidInput("stock must not be negative".to_string()));
        }
        Ok(())
    }
}

/// A stock write computed by the order workflow.
///
/// `expected_stock` is the value observed at validation time; stores apply the
/// write only while the stored stock still equals it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: Uuid,
    pub expected_stock: i32,
    pub new_stock: i32,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Duration;

    use super::*;

    fn payload() -> NewProduct {
        NewProduct {
            name: "Oolong tea".to_string(),
            description: String::new(),
            picture: String::new(),
            price: BigDecimal::from_str("4.20").unwrap(),
            stock: 3,
            expiration_time: Utc::now() + Duration::days(30),
            is_sold_out: false,
            sold_out_at: None,
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut p = payload();
        p.name = "   ".to_string();
        assert!(matches!(p.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut p = payload();
        p.price = BigDecimal::from_str("-0.01").unwrap();
        assert!(matches!(p.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn sub_cent_price_is_rejected() {
        let mut p = payload();
        p.price = BigDecimal::from_str("4.205").unwrap();
        assert!(matches!(p.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        let mut p = payload();
        p.price = BigDecimal::from_str("4.2000").unwrap();
        assert!(p.validate().is_ok());
    }

    #[test]
    fn negative_stock_is_rejected() {
        let mut p = payload();
        p.stock = -1;
        assert!(matches!(p.validate(), Err(DomainError::InvalidInput(_))));
    }
}
