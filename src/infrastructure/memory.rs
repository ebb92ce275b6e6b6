use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderLine};
use crate::domain::ports::{OrderStore, ProductStore, Storage, UserStore};
use crate::domain::product::{NewProduct, Product, StockAdjustment};
use crate::domain::user::{User, UserProfile};

/// Process-local storage with the same transactional contract as Postgres.
///
/// A transaction runs against a copy of the state which replaces the shared
/// state only when the closure succeeds.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    products: Vec<Product>,
    orders: Vec<Order>,
    users: Vec<User>,
    fail_stock_updates: bool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `batch_update_stock` fail with a storage error.
    pub fn fail_stock_updates(&self, fail: bool) -> Result<(), DomainError> {
        self.read(|state| {
            state.fail_stock_updates = fail;
            Ok(())
        })
    }
}

impl Storage for InMemoryStorage {
    type Handle = MemoryState;

    fn read<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut MemoryState) -> Result<T, DomainError>,
    {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DomainError::Storage("storage lock poisoned".to_string()))?;
        f(&mut *state)
    }

    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut MemoryState) -> Result<T, DomainError>,
    {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DomainError::Storage("storage lock poisoned".to_string()))?;
        let mut working = state.clone();
        let value = f(&mut working)?;
        *state = working;
        Ok(value)
    }
}

impl ProductStore for MemoryState {
    fn find_products_by_ids(&mut self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .products
            .iter()
            .filter(|p| ids.contains(&p.id) && !p.is_sold_out && !p.is_deleted)
            .cloned()
            .collect())
    }

    fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self
            .products
            .iter()
            .find(|p| p.id == id && !p.is_deleted)
            .cloned())
    }

    fn find_product_including_deleted(
        &mut self,
        id: Uuid,
    ) -> Result<Option<Product>, DomainError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    // Transactions already hold the state mutex for their whole run.
    fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.find_product_including_deleted(id)
    }

    fn batch_update_stock(&mut self, adjustments: &[StockAdjustment]) -> Result<(), DomainError> {
        if self.fail_stock_updates {
            return Err(DomainError::Storage("stock update rejected".to_string()));
        }
        let now = Utc::now();
        for adj in adjustments {
            let product = self
                .products
                .iter_mut()
                .find(|p| p.id == adj.product_id && p.stock == adj.expected_stock)
                .ok_or(DomainError::StockChanged(adj.product_id))?;
            product.stock = adj.new_stock;
            product.updated_at = now;
        }
        Ok(())
    }

    fn update_product(&mut self, product: &Product) -> Result<(), DomainError> {
        let stored = self
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(DomainError::ProductNotFound)?;
        *stored = Product {
            updated_at: Utc::now(),
            ..product.clone()
        };
        Ok(())
    }

    fn insert_product(&mut self, product: NewProduct) -> Result<Product, DomainError> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            picture: product.picture,
            price: product.price,
            stock: product.stock,
            expiration_time: product.expiration_time,
            is_sold_out: product.is_sold_out,
            sold_out_at: product.sold_out_at,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.products.push(product.clone());
        Ok(product)
    }

    fn list_products(&mut self) -> Result<Vec<Product>, DomainError> {
        Ok(self.products.iter().filter(|p| !p.is_deleted).cloned().collect())
    }
}

impl OrderStore for MemoryState {
    fn insert_order(&mut self, order: NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let order = Order {
            id,
            user_id: order.user_id,
            total_price: order.total_price,
            note: order.note,
            status: order.status,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
            lines: order
                .lines
                .into_iter()
                .map(|l| OrderLine {
                    id: Uuid::new_v4(),
                    order_id: id,
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
        };
        self.orders.push(order.clone());
        Ok(order)
    }

    fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self
            .orders
            .iter()
            .find(|o| o.id == id && !o.is_deleted)
            .cloned())
    }

    fn find_order_including_deleted(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.iter().find(|o| o.id == id).cloned())
    }

    fn update_order(&mut self, order: &Order) -> Result<(), DomainError> {
        let stored = self
            .orders
            .iter_mut()
            .find(|o| o.id == order.id && !o.is_deleted)
            .ok_or(DomainError::OrderNotFound)?;
        stored.status = order.status.clone();
        stored.note = order.note.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    fn soft_delete_order(&mut self, order: &Order) -> Result<(), DomainError> {
        let stored = self
            .orders
            .iter_mut()
            .find(|o| o.id == order.id && !o.is_deleted)
            .ok_or(DomainError::OrderNotFound)?;
        stored.mark_deleted(order.deleted_at.unwrap_or_else(Utc::now));
        Ok(())
    }

    fn list_orders(&mut self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.iter().filter(|o| !o.is_deleted).cloned().collect())
    }

    fn list_orders_by_user(&mut self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .orders
            .iter()
            .filter(|o| o.user_id == user_id && !o.is_deleted)
            .cloned()
            .collect())
    }

    fn list_orders_by_user_and_product(
        &mut self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .orders
            .iter()
            .filter(|o| {
                o.user_id == user_id
                    && !o.is_deleted
                    && o.lines.iter().any(|l| l.product_id == product_id)
            })
            .cloned()
            .collect())
    }
}

impl UserStore for MemoryState {
    fn find_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.id == id && !u.is_deleted)
            .cloned())
    }

    fn find_user_by_external_id(
        &mut self,
        external_id: &str,
    ) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.external_id == external_id && !u.is_deleted)
            .cloned())
    }

    fn find_user_by_display_name(
        &mut self,
        display_name: &str,
    ) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.display_name == display_name && !u.is_deleted)
            .cloned())
    }

    fn insert_user(&mut self, profile: UserProfile) -> Result<User, DomainError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            external_id: profile.external_id,
            display_name: profile.display_name,
            email: profile.email,
            access_token: profile.access_token,
            phone: profile.phone,
            is_member: profile.is_member,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    fn update_user(&mut self, user: &User) -> Result<(), DomainError> {
        let stored = self
            .users
            .iter_mut()
            .find(|u| u.id == user.id && !u.is_deleted)
            .ok_or(DomainError::UserNotFound)?;
        *stored = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(())
    }

    fn list_users(&mut self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.iter().filter(|u| !u.is_deleted).cloned().collect())
    }

    fn soft_delete_user(&mut self, id: Uuid) -> Result<(), DomainError> {
        let stored = self
            .users
            .iter_mut()
            .find(|u| u.id == id && !u.is_deleted)
            .ok_or(DomainError::UserNotFound)?;
        stored.is_deleted = true;
        stored.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::Duration;

    use super::*;

    fn new_product(stock: i32) -> NewProduct {
        NewProduct {
            name: "espresso beans".to_string(),
            description: String::new(),
            picture: String::new(),
            price: BigDecimal::from_str("15.00").unwrap(),
            stock,
            expiration_time: Utc::now() + Duration::days(90),
            is_sold_out: false,
            sold_out_at: None,
        }
    }

    #[test]
    fn failed_transaction_leaves_state_untouched() {
        let storage = InMemoryStorage::new();
        let product = storage
            .transaction(|s| s.insert_product(new_product(5)))
            .unwrap();

        let result: Result<(), DomainError> = storage.transaction(|s| {
            s.batch_update_stock(&[StockAdjustment {
                product_id: product.id,
                expected_stock: 5,
                new_stock: 1,
            }])?;
            Err(DomainError::Storage("boom".to_string()))
        });

        assert!(result.is_err());
        let stored = storage.read(|s| s.find_product(product.id)).unwrap().unwrap();
        assert_eq!(stored.stock, 5);
    }

    #[test]
    fn stale_stock_adjustment_is_rejected() {
        let storage = InMemoryStorage::new();
        let product = storage
            .transaction(|s| s.insert_product(new_product(5)))
            .unwrap();

        let result = storage.transaction(|s| {
            s.batch_update_stock(&[StockAdjustment {
                product_id: product.id,
                expected_stock: 4,
                new_stock: 2,
            }])
        });

        assert!(matches!(result, Err(DomainError::StockChanged(id)) if id == product.id));
    }

    #[test]
    fn sold_out_products_are_hidden_from_batch_lookup() {
        let storage = InMemoryStorage::new();
        let mut payload = new_product(0);
        payload.is_sold_out = true;
        let product = storage.transaction(|s| s.insert_product(payload)).unwrap();

        let found = storage
            .read(|s| s.find_products_by_ids(&[product.id]))
            .unwrap();

        assert!(found.is_empty());
        assert!(storage.read(|s| s.find_product(product.id)).unwrap().is_some());
    }
}
