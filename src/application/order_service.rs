use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderRequest, OrderUpdate, ORDER_STATUS_PENDING};
use crate::domain::ports::{OrderStore, ProductStore, Storage, UserStore};
use crate::domain::product::Product;
use crate::domain::validation::validate_order;

pub struct OrderService<S> {
    storage: S,
}

impl<S: Storage> OrderService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Validates and prices `request`, then stores the order and takes its
    /// stock in one transaction.
    ///
    /// Validation reads the catalog outside the transaction. Each stock write
    /// is conditional on the stock still matching what validation saw, so a
    /// concurrent order on the same product fails this one with
    /// `StockChanged` instead of overwriting its decrement.
    pub fn create_order(&self, request: OrderRequest) -> Result<Order, DomainError> {
        let validated = self.storage.read(|conn| {
            validate_order(&request.lines, Utc::now(), |ids| {
                conn.find_products_by_ids(ids)
            })
        })?;

        let adjustments = validated.stock_adjustments();
        let (lines, total_price) = validated.into_lines();
        let user_id = request.user_id;
        let new_order = NewOrder {
            user_id,
            total_price,
            note: request.note,
            status: ORDER_STATUS_PENDING.to_string(),
            lines,
        };

        let order = self
            .storage
            .transaction(|tx| {
                let order = tx.insert_order(new_order)?;
                tx.batch_update_stock(&adjustments)?;
                Ok(order)
            })
            .inspect_err(|e| log::warn!("Order for user {} rolled back: {}", user_id, e))?;

        log::info!(
            "Created order {} for user {} with {} line(s), total {}",
            order.id,
            order.user_id,
            order.lines.len(),
            order.total_price
        );
        Ok(order)
    }

    /// Gives the stock of every line back and soft-deletes the order.
    pub fn cancel_order(&self, id: Uuid) -> Result<(), DomainError> {
        self.storage
            .transaction(|tx| {
                let mut order = tx.find_order(id)?.ok_or(DomainError::OrderNotFound)?;

                for line in &order.lines {
                    let current = tx
                        .lock_product(line.product_id)?
                        .ok_or(DomainError::ProductNotFound)?;
                    let stock = current
                        .stock
                        .checked_add(line.quantity)
                        .ok_or(DomainError::StockOverflow(current.id))?;
                    let restored = Product { stock, ..current };
                    tx.update_product(&restored)?;
                }

                order.mark_deleted(Utc::now());
                tx.soft_delete_order(&order)
            })
            .inspect_err(|e| log::warn!("Cancellation of order {} rolled back: {}", id, e))?;

        log::info!("Cancelled order {}", id);
        Ok(())
    }

    pub fn update_order(&self, id: Uuid, update: OrderUpdate) -> Result<Order, DomainError> {
        self.storage.transaction(|tx| {
            let mut order = tx.find_order(id)?.ok_or(DomainError::OrderNotFound)?;
            order.apply(&update);
            tx.update_order(&order)?;
            Ok(order)
        })
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.storage
            .read(|conn| conn.find_order(id))?
            .ok_or(DomainError::OrderNotFound)
    }

    pub fn get_order_including_deleted(&self, id: Uuid) -> Result<Order, DomainError> {
        self.storage
            .read(|conn| conn.find_order_including_deleted(id))?
            .ok_or(DomainError::OrderNotFound)
    }

    pub fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.storage.read(|conn| conn.list_orders())
    }

    pub fn list_orders_by_display_name(&self, display_name: &str) -> Result<Vec<Order>, DomainError> {
        self.storage.read(|conn| {
            let user = conn
                .find_user_by_display_name(display_name)?
                .ok_or(DomainError::UserNotFound)?;
            conn.list_orders_by_user(user.id)
        })
    }

    /// Orders of the named user that contain `product_id`.
    pub fn list_order_history(
        &self,
        display_name: &str,
        product_id: Uuid,
    ) -> Result<Vec<Order>, DomainError> {
        self.storage.read(|conn| {
            let user = conn
                .find_user_by_display_name(display_name)?
                .ok_or(DomainError::UserNotFound)?;
            conn.list_orders_by_user_and_product(user.id, product_id)
        })
    }
}
