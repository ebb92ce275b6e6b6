use uuid::Uuid;

use super::errors::DomainError;
use super::order::{NewOrder, Order};
use super::product::{NewProduct, Product, StockAdjustment};
use super::user::{User, UserProfile};

/// Product persistence. Lookups without `including_deleted` skip soft-deleted rows.
pub trait ProductStore {
    /// Batch lookup used by order validation; sold-out products are left out.
    fn find_products_by_ids(&mut self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
    fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn find_product_including_deleted(&mut self, id: Uuid)
        -> Result<Option<Product>, DomainError>;
    /// Like `find_product_including_deleted`, but inside a transaction the
    /// row stays locked against concurrent writers until commit or rollback.
    fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError>;
    /// Applies every adjustment or fails with `StockChanged` on the first one
    /// whose stored stock no longer equals `expected_stock`.
    fn batch_update_stock(&mut self, adjustments: &[StockAdjustment]) -> Result<(), DomainError>;
    fn update_product(&mut self, product: &Product) -> Result<(), DomainError>;
    fn insert_product(&mut self, product: NewProduct) -> Result<Product, DomainError>;
    fn list_products(&mut self) -> Result<Vec<Product>, DomainError>;
}

/// Order persistence. Every lookup except `find_order_including_deleted`
/// skips soft-deleted orders.
pub trait OrderStore {
    fn insert_order(&mut self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn find_order_including_deleted(&mut self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn update_order(&mut self, order: &Order) -> Result<(), DomainError>;
    /// Persists the deletion marker of `order`; fails with `OrderNotFound` if
    /// the stored row is already deleted.
    fn soft_delete_order(&mut self, order: &Order) -> Result<(), DomainError>;
    fn list_orders(&mut self) -> Result<Vec<Order>, DomainError>;
    fn list_orders_by_user(&mut self, user_id: Uuid) -> Result<Vec<Order>, DomainError>;
    fn list_orders_by_user_and_product(
        &mut self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<Order>, DomainError>;
}

pub trait UserStore {
    fn find_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError>;
    fn find_user_by_external_id(&mut self, external_id: &str)
        -> Result<Option<User>, DomainError>;
    fn find_user_by_display_name(&mut self, display_name: &str)
        -> Result<Option<User>, DomainError>;
    fn insert_user(&mut self, profile: UserProfile) -> Result<User, DomainError>;
    fn update_user(&mut self, user: &User) -> Result<(), DomainError>;
    fn list_users(&mut self) -> Result<Vec<User>, DomainError>;
    fn soft_delete_user(&mut self, id: Uuid) -> Result<(), DomainError>;
}

/// Hands out storage handles.
///
/// Everything done through the handle inside one `transaction` call commits
/// together, or not at all when the closure returns `Err`. There is no shared
/// transaction state outside the handle.
pub trait Storage: Clone + Send + Sync + 'static {
    type Handle: ProductStore + OrderStore + UserStore;

    fn read<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut Self::Handle) -> Result<T, DomainError>;

    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut Self::Handle) -> Result<T, DomainError>;
}
