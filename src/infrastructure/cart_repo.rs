use async_trait::async_trait;
use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{run_blocking, DbPool};
use crate::domain::errors::DomainError;
use crate::domain::order::CartLine;
use crate::domain::ports::CartStore;
use crate::schema::cart_items;

use super::models::CartItemRow;

/// Convert a price in lei (two decimals) to bani, rounding half up.
pub fn lei_to_bani(price: &BigDecimal) -> Result<i64, DomainError> {
    (price * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_i64()
        .ok_or_else(|| DomainError::Internal(format!("price out of range: {price}")))
}

pub struct DieselCartStore {
    pool: DbPool,
}

impl DieselCartStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for DieselCartStore {
    async fn lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        run_blocking(&self.pool, move |conn| {
            cart_items::table
                .filter(cart_items::cart_id.eq(cart_id))
                .order(cart_items::created_at.asc())
                .select(CartItemRow::as_select())
                .load(conn)?
                .into_iter()
                .map(|row| {
                    Ok(CartLine {
                        unit_price: lei_to_bani(&row.unit_price)?,
                        product_id: row.product_id,
                        product_name: row.product_name,
                        product_sku: row.product_sku,
                        product_image: row.product_image,
                        quantity: row.quantity,
                    })
                })
                .collect()
        })
        .await
    }

    async fn clear(&self, cart_id: Uuid) -> Result<(), DomainError> {
        run_blocking(&self.pool, move |conn| {
            diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart_id)))
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}
