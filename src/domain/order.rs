use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::checkout::{Address, PaymentMethod};
use super::pricing::OrderTotals;

/// How long reserved stock is held while the customer pays.
pub const RESERVATION_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    Processing,
    Confirmed,
    Cancelled,
    Failed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Processing => "processing",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending_payment" => Some(OrderStatus::PendingPayment),
            "processing" => Some(OrderStatus::Processing),
            "confirmed" => Some(OrderStatus::Confirmed),
            "cancelled" => Some(OrderStatus::Cancelled),
            "failed" => Some(OrderStatus::Failed),
            _ => None,
        }
    }
}

/// One cart line, priced in bani.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_image: Option<String>,
    pub unit_price: i64,
    pub quantity: i32,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

/// Authenticated customer placing the order, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<Uuid>,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub billing_address: Address,
    pub shipping_address: Address,
    pub totals: OrderTotals,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub billing_address: Address,
    pub shipping_address: Address,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub shipping_cost: i64,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            shipping_cost: self.shipping_cost,
            total_amount: self.total_amount,
        }
    }
}

/// Result of trying to hold stock for one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReservationOutcome {
    Reserved { reservation_id: Uuid },
    Failed { reason: String },
}

impl ReservationOutcome {
    pub fn reservation_id(&self) -> Option<Uuid> {
        match self {
            ReservationOutcome::Reserved { reservation_id } => Some(*reservation_id),
            ReservationOutcome::Failed { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ReservationOutcome::Reserved { .. } => None,
            ReservationOutcome::Failed { reason } => Some(reason),
        }
    }

    /// Rebuild the outcome from its stored columns.
    pub fn from_columns(reservation_id: Option<Uuid>, reservation_error: Option<String>) -> Self {
        match reservation_id {
            Some(reservation_id) => ReservationOutcome::Reserved { reservation_id },
            None => ReservationOutcome::Failed {
                reason: reservation_error.unwrap_or_else(|| "unknown".to_string()),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: Uuid,
    pub line: CartLine,
    pub reservation: ReservationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub product_image: Option<String>,
    pub unit_price: i64,
    pub quantity: i32,
    pub total_price: i64,
    pub reservation: ReservationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<Order>,
    pub total: i64,
}
