use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const ORDER_STATUS_PENDING: &str = "pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// An order as proposed by a customer, before validation and pricing.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub user_id: Uuid,
    pub note: String,
    pub lines: Vec<OrderLineRequest>,
}

/// A requested line stamped with the product price at validation time.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl PricedLine {
    pub fn line_total(&self) -> BigDecimal {
        self.unit_price.clone() * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub total_price: BigDecimal,
    pub note: String,
    pub status: String,
    pub lines: Vec<PricedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_price: BigDecimal,
    pub note: String,
    pub status: String,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Overwrites status and note with the non-empty fields of `update`.
    pub fn apply(&mut self, update: &OrderUpdate) {
        if let Some(status) = update.status.as_deref().filter(|s| !s.is_empty()) {
            self.status = status.to_string();
        }
        if let Some(note) = update.note.as_deref().filter(|n| !n.is_empty()) {
            self.note = note.to_string();
        }
    }

    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
    }
}

/// Mutable order fields. `None` and `Some("")` both leave the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub status: Option<String>,
    pub note: Option<String>,
}
