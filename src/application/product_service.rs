use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{ProductStore, Storage};
use crate::domain::product::{NewProduct, Product};

pub struct ProductService<S> {
    storage: S,
}

impl<S: Storage> ProductService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn create_product(&self, product: NewProduct) -> Result<Product, DomainError> {
        product.validate()?;
        let product = self.storage.transaction(|tx| tx.insert_product(product))?;
        log::info!("Created product {} ({})", product.id, product.name);
        Ok(product)
    }

    pub fn get_product(&self, id: Uuid) -> Result<Product, DomainError> {
        self.storage
            .read(|conn| conn.find_product(id))?
            .ok_or(DomainError::ProductNotFound)
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.storage.read(|conn| conn.list_products())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::{Duration, Utc};

    use super::*;
    use crate::infrastructure::memory::InMemoryStorage;

    fn payload(name: &str, stock: i32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "single origin".to_string(),
            picture: String::new(),
            price: BigDecimal::from_str("7.00").unwrap(),
            stock,
            expiration_time: Utc::now() + Duration::days(1),
            is_sold_out: false,
            sold_out_at: None,
        }
    }

    #[test]
    fn created_product_can_be_fetched() {
        let service = ProductService::new(InMemoryStorage::new());

        let created = service.create_product(payload("drip bags", 12)).unwrap();
        let fetched = service.get_product(created.id).unwrap();

        assert_eq!(fetched, created);
        assert_eq!(service.list_products().unwrap().len(), 1);
    }

    #[test]
    fn invalid_payload_is_not_stored() {
        let service = ProductService::new(InMemoryStorage::new());

        let err = service.create_product(payload("drip bags", -1)).unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(service.list_products().unwrap().is_empty());
    }

    #[test]
    fn unknown_product_is_not_found() {
        let service = ProductService::new(InMemoryStorage::new());
        assert!(matches!(
            service.get_product(Uuid::new_v4()),
            Err(DomainError::ProductNotFound)
        ));
    }
}
