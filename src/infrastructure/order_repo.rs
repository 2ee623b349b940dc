use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{run_blocking, DbPool};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    ListResult, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderWithItems,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders};

use super::models::{address_to_json, NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn load_with_items(
    conn: &mut PgConnection,
    order: OrderRow,
) -> Result<OrderWithItems, DomainError> {
    let items = OrderItemRow::belonging_to(&order)
        .select(OrderItemRow::as_select())
        .order(order_items::created_at.asc())
        .load(conn)?
        .into_iter()
        .map(OrderItem::from)
        .collect();
    Ok(OrderWithItems {
        order: Order::try_from(order)?,
        items,
    })
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Uuid, DomainError> {
        let row = NewOrderRow {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            customer_email: order.customer_email,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            billing_address: address_to_json(&order.billing_address)?,
            shipping_address: address_to_json(&order.shipping_address)?,
            subtotal: order.totals.subtotal,
            tax_amount: order.totals.tax_amount,
            shipping_cost: order.totals.shipping_cost,
            total_amount: order.totals.total_amount,
            status: OrderStatus::PendingPayment.as_str().to_string(),
            payment_method: order.payment_method.as_str().to_string(),
            notes: order.notes,
            idempotency_key: order.idempotency_key,
        };
        run_blocking(&self.pool, move |conn| {
            let id = diesel::insert_into(orders::table)
                .values(&row)
                .returning(orders::id)
                .get_result(conn)?;
            Ok(id)
        })
        .await
    }

    async fn add_item(&self, item: NewOrderItem) -> Result<OrderItem, DomainError> {
        let row = NewOrderItemRow {
            id: Uuid::new_v4(),
            order_id: item.order_id,
            product_id: item.line.product_id,
            total_price: item.line.line_total(),
            product_name: item.line.product_name,
            product_sku: item.line.product_sku,
            product_image: item.line.product_image,
            unit_price: item.line.unit_price,
            quantity: item.line.quantity,
            reservation_id: item.reservation.reservation_id(),
            reservation_error: item.reservation.failure_reason().map(str::to_string),
        };
        run_blocking(&self.pool, move |conn| {
            let stored = diesel::insert_into(order_items::table)
                .values(&row)
                .returning(OrderItemRow::as_returning())
                .get_result(conn)?;
            Ok(OrderItem::from(stored))
        })
        .await
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        run_blocking(&self.pool, move |conn| {
            let updated = diesel::update(orders::table.find(id))
                .set((
                    orders::status.eq(status.as_str()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            if updated == 0 {
                return Err(DomainError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderWithItems>, DomainError> {
        run_blocking(&self.pool, move |conn| {
            let order = orders::table
                .find(id)
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?;
            order.map(|o| load_with_items(conn, o)).transpose()
        })
        .await
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<OrderWithItems>, DomainError> {
        let key = key.to_string();
        run_blocking(&self.pool, move |conn| {
            let order = orders::table
                .filter(orders::idempotency_key.eq(key))
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?;
            order.map(|o| load_with_items(conn, o)).transpose()
        })
        .await
    }

    async fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let offset = (page - 1) * limit;
        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DomainError, _>(|conn| {
                let total: i64 = orders::table.count().get_result(conn)?;

                let rows = orders::table
                    .select(OrderRow::as_select())
                    .order(orders::created_at.desc())
                    .limit(limit)
                    .offset(offset)
                    .load(conn)?;

                Ok(ListResult {
                    items: rows
                        .into_iter()
                        .map(Order::try_from)
                        .collect::<Result<_, _>>()?,
                    total,
                })
            })
        })
        .await
    }
}
