use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::catalog::{Showroom, SiteSetting};
use crate::domain::checkout::{Address, PaymentMethod, Profile};
use crate::domain::errors::DomainError;
use crate::domain::events::{EventAction, EventEntity, RealtimeEvent};
use crate::domain::newsletter::{Subscription, SubscriptionStatus};
use crate::domain::order::{Order, OrderItem, OrderStatus, ReservationOutcome};
use crate::schema::{
    cart_items, newsletter_subscriptions, order_items, orders, profiles, realtime_events,
    showrooms, site_settings,
};

fn corrupt(what: &str, value: &str) -> DomainError {
    DomainError::Internal(format!("unexpected {what} '{value}' in database"))
}

fn address_from_json(value: Value) -> Result<Address, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Internal(format!("malformed address: {e}")))
}

pub fn address_to_json(address: &Address) -> Result<Value, DomainError> {
    serde_json::to_value(address).map_err(|e| DomainError::Internal(e.to_string()))
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub billing_address: Value,
    pub shipping_address: Value,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub shipping_cost: i64,
    pub total_amount: i64,
    pub status: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            status: OrderStatus::parse(&row.status)
                .ok_or_else(|| corrupt("order status", &row.status))?,
            payment_method: PaymentMethod::parse(&row.payment_method)
                .ok_or_else(|| corrupt("payment method", &row.payment_method))?,
            billing_address: address_from_json(row.billing_address)?,
            shipping_address: address_from_json(row.shipping_address)?,
            id: row.id,
            user_id: row.user_id,
            customer_email: row.customer_email,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            subtotal: row.subtotal,
            tax_amount: row.tax_amount,
            shipping_cost: row.shipping_cost,
            total_amount: row.total_amount,
            notes: row.notes,
            idempotency_key: row.idempotency_key,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub billing_address: Value,
    pub shipping_address: Value,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub shipping_cost: i64,
    pub total_amount: i64,
    pub status: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_image: Option<String>,
    pub unit_price: i64,
    pub quantity: i32,
    pub total_price: i64,
    pub reservation_id: Option<Uuid>,
    pub reservation_error: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            product_sku: row.product_sku,
            product_image: row.product_image,
            unit_price: row.unit_price,
            quantity: row.quantity,
            total_price: row.total_price,
            reservation: ReservationOutcome::from_columns(
                row.reservation_id,
                row.reservation_error,
            ),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_image: Option<String>,
    pub unit_price: i64,
    pub quantity: i32,
    pub total_price: i64,
    pub reservation_id: Option<Uuid>,
    pub reservation_error: Option<String>,
}

// ── Carts and profiles ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_image: Option<String>,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItemRow {
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_image: Option<String>,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            user_id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            street: row.street,
            city: row.city,
            county: row.county,
            postal_code: row.postal_code,
            country: row.country,
        }
    }
}

// ── Newsletter ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = newsletter_subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub email: String,
    pub status: String,
    pub source: String,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            status: SubscriptionStatus::parse(&row.status)
                .ok_or_else(|| corrupt("subscription status", &row.status))?,
            id: row.id,
            email: row.email,
            source: row.source,
            subscribed_at: row.subscribed_at,
            unsubscribed_at: row.unsubscribed_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = newsletter_subscriptions)]
pub struct NewSubscriptionRow {
    pub id: Uuid,
    pub email: String,
    pub status: String,
    pub source: String,
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = site_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SiteSettingRow {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<SiteSettingRow> for SiteSetting {
    fn from(row: SiteSettingRow) -> Self {
        SiteSetting {
            key: row.key,
            value: row.value,
            description: row.description,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = site_settings)]
#[diesel(treat_none_as_null = true)]
pub struct SiteSettingChange<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub description: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = showrooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShowroomRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub working_hours: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShowroomRow> for Showroom {
    fn from(row: ShowroomRow) -> Self {
        Showroom {
            id: row.id,
            name: row.name,
            address: row.address,
            city: row.city,
            phone: row.phone,
            email: row.email,
            working_hours: row.working_hours,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Column values written on both insert and update.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = showrooms)]
#[diesel(treat_none_as_null = true)]
pub struct ShowroomChange {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub working_hours: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

// ── Real-time events ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = realtime_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RealtimeEventRow {
    pub sequence: i64,
    pub entity: String,
    pub action: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RealtimeEventRow> for RealtimeEvent {
    type Error = DomainError;

    fn try_from(row: RealtimeEventRow) -> Result<Self, Self::Error> {
        Ok(RealtimeEvent {
            sequence: row.sequence,
            entity: EventEntity::parse(&row.entity)
                .ok_or_else(|| corrupt("event entity", &row.entity))?,
            action: EventAction::parse(&row.action)
                .ok_or_else(|| corrupt("event action", &row.action))?,
            data: row.data,
            timestamp: row.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = realtime_events)]
pub struct NewRealtimeEventRow {
    pub entity: String,
    pub action: String,
    pub data: Value,
}
