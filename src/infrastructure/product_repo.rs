use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductStore;
use crate::domain::product::{NewProduct, Product, StockAdjustment};
use crate::schema::products;

use super::models::{NewProductRow, ProductChangeset, ProductRow};

impl ProductStore for PgConnection {
    fn find_products_by_ids(&mut self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let rows = products::table
            .filter(products::id.eq_any(ids))
            .filter(products::is_sold_out.eq(false))
            .filter(products::is_deleted.eq(false))
            .select(ProductRow::as_select())
            .load(self)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let row = products::table
            .filter(products::id.eq(id))
            .filter(products::is_deleted.eq(false))
            .select(ProductRow::as_select())
            .first(self)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn find_product_including_deleted(
        &mut self,
        id: Uuid,
    ) -> Result<Option<Product>, DomainError> {
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .get_result(self)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        // SELECT ... FOR UPDATE: a concurrent cancellation or order on the
        // product waits for this transaction.
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .for_update()
            .get_result(self)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn batch_update_stock(&mut self, adjustments: &[StockAdjustment]) -> Result<(), DomainError> {
        let now = Utc::now();
        for adj in adjustments {
            let updated = diesel::update(
                products::table
                    .filter(products::id.eq(adj.product_id))
                    .filter(products::stock.eq(adj.expected_stock)),
            )
            .set((
                products::stock.eq(adj.new_stock),
                products::updated_at.eq(now),
            ))
            .execute(self)?;

            if updated == 0 {
                return Err(DomainError::StockChanged(adj.product_id));
            }
        }
        Ok(())
    }

    fn update_product(&mut self, product: &Product) -> Result<(), DomainError> {
        let updated = diesel::update(products::table.find(product.id))
            .set(&ProductChangeset {
                name: &product.name,
                description: &product.description,
                picture: &product.picture,
                price: &product.price,
                stock: product.stock,
                expiration_time: product.expiration_time,
                is_sold_out: product.is_sold_out,
                sold_out_at: product.sold_out_at,
                updated_at: Utc::now(),
            })
            .execute(self)?;

        if updated == 0 {
            return Err(DomainError::ProductNotFound);
        }
        Ok(())
    }

    fn insert_product(&mut self, product: NewProduct) -> Result<Product, DomainError> {
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: product.name,
                description: product.description,
                picture: product.picture,
                price: product.price,
                stock: product.stock,
                expiration_time: product.expiration_time,
                is_sold_out: product.is_sold_out,
                sold_out_at: product.sold_out_at,
            })
            .returning(ProductRow::as_returning())
            .get_result(self)?;
        Ok(row.into())
    }

    fn list_products(&mut self) -> Result<Vec<Product>, DomainError> {
        let rows = products::table
            .filter(products::is_deleted.eq(false))
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .load(self)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}
