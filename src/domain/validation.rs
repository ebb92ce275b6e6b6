use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{OrderLineRequest, PricedLine};
use super::product::{Product, StockAdjustment};

/// Result of a successful validation: priced lines, their total and the
/// product records they were priced against.
#[derive(Debug, Clone)]
pub struct ValidatedOrder {
    lines: Vec<PricedLine>,
    total_price: BigDecimal,
    products: HashMap<Uuid, Product>,
}

impl ValidatedOrder {
    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    pub fn total_price(&self) -> &BigDecimal {
        &self.total_price
    }

    pub fn product(&self, id: Uuid) -> Option<&Product> {
        self.products.get(&id)
    }

    /// One adjustment per distinct product, in first-seen order. Repeated
    /// lines for the same product are subtracted cumulatively.
    ///
    /// Validation bounds the summed quantity of each product by its stock, so
    /// `new_stock` never drops below zero.
    pub fn stock_adjustments(&self) -> Vec<StockAdjustment> {
        let mut adjustments: Vec<StockAdjustment> = Vec::new();
        for line in &self.lines {
            if let Some(adj) = adjustments
                .iter_mut()
                .find(|a| a.product_id == line.product_id)
            {
                adj.new_stock = adj.new_stock.saturating_sub(line.quantity);
            } else if let Some(product) = self.products.get(&line.product_id) {
                adjustments.push(StockAdjustment {
                    product_id: product.id,
                    expected_stock: product.stock,
                    new_stock: product.stock.saturating_sub(line.quantity),
                });
            }
        }
        adjustments
    }

    pub fn into_lines(self) -> (Vec<PricedLine>, BigDecimal) {
        (self.lines, self.total_price)
    }
}

/// Checks an order request and prices it against the catalog.
///
/// Quantities are checked for every line before `lookup` is called once with
/// the distinct product ids. Lines are then checked in request order against
/// the returned products: existence, stock, then expiration at `now`.
/// Client prices never enter the computation.
pub fn validate_order<F>(
    lines: &[OrderLineRequest],
    now: DateTime<Utc>,
    lookup: F,
) -> Result<ValidatedOrder, DomainError>
where
    F: FnOnce(&[Uuid]) -> Result<Vec<Product>, DomainError>,
{
    let mut ids: Vec<Uuid> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity <= 0 {
            return Err(DomainError::InvalidQuantity(line.quantity));
        }
        if !ids.contains(&line.product_id) {
            ids.push(line.product_id);
        }
    }

    let products: HashMap<Uuid, Product> = if ids.is_empty() {
        HashMap::new()
    } else {
        lookup(&ids)?.into_iter().map(|p| (p.id, p)).collect()
    };

    let mut requested: HashMap<Uuid, i32> = HashMap::new();
    let mut priced = Vec::with_capacity(lines.len());
    let mut total_price = BigDecimal::from(0);

    for line in lines {
        let product = products
            .get(&line.product_id)
            .ok_or(DomainError::ProductNotFound)?;

        let wanted = requested.entry(product.id).or_insert(0);
        *wanted = match wanted.checked_add(line.quantity) {
            Some(sum) if sum <= product.stock => sum,
            _ => return Err(DomainError::InsufficientStock(product.name.clone())),
        };

        if product.is_expired_at(now) {
            return Err(DomainError::ProductExpired(product.name.clone()));
        }

        let line = PricedLine {
            product_id: product.id,
            quantity: line.quantity,
            unit_price: product.price.clone(),
        };
        total_price = total_price + line.line_total();
        priced.push(line);
    }

    Ok(ValidatedOrder {
        lines: priced,
        total_price,
        products,
    })
}
