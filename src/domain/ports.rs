use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::catalog::{Showroom, ShowroomDraft, SiteSetting};
use super::checkout::{Address, Profile};
use super::errors::{DomainError, GatewayError};
use super::events::RealtimeEvent;
use super::newsletter::{Subscription, SubscriptionStats, SubscriptionStatus};
use super::order::{
    CartLine, ListResult, NewOrder, NewOrderItem, OrderItem, OrderStatus, OrderWithItems,
};

#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    async fn create(&self, order: NewOrder) -> Result<Uuid, DomainError>;
    async fn add_item(&self, item: NewOrderItem) -> Result<OrderItem, DomainError>;
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderWithItems>, DomainError>;
    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<OrderWithItems>, DomainError>;
    async fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
}

#[async_trait]
pub trait CartStore: Send + Sync + 'static {
    async fn lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError>;
    async fn clear(&self, cart_id: Uuid) -> Result<(), DomainError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync + 'static {
    async fn find(&self, user_id: Uuid) -> Result<Option<Profile>, DomainError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationRequest {
    pub items: Vec<ReservationItem>,
    pub order_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub duration_minutes: u32,
}

#[async_trait]
pub trait StockReservations: Send + Sync + 'static {
    /// Returns the ids of the reservations created for the request.
    async fn reserve(&self, request: ReservationRequest) -> Result<Vec<Uuid>, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub order_id: Uuid,
    /// Order total in bani.
    pub amount: i64,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub billing_address: Address,
    pub description: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Starts a hosted payment and returns the URL the customer is sent to.
    async fn start_payment(&self, request: PaymentRequest) -> Result<String, GatewayError>;
}

#[async_trait]
pub trait NewsletterRepository: Send + Sync + 'static {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscription>, DomainError>;
    async fn insert(&self, email: &str, source: &str) -> Result<Subscription, DomainError>;
    async fn set_status(
        &self,
        email: &str,
        status: SubscriptionStatus,
        at: DateTime<Utc>,
    ) -> Result<Subscription, DomainError>;
    async fn list(
        &self,
        status: Option<SubscriptionStatus>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Subscription>, i64), DomainError>;
    async fn stats(&self) -> Result<SubscriptionStats, DomainError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<SiteSetting>, DomainError>;
    async fn get(&self, key: &str) -> Result<Option<SiteSetting>, DomainError>;
    async fn upsert(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<SiteSetting, DomainError>;
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait ShowroomRepository: Send + Sync + 'static {
    async fn list(&self, active_only: bool) -> Result<Vec<Showroom>, DomainError>;
    async fn get(&self, id: Uuid) -> Result<Option<Showroom>, DomainError>;
    async fn create(&self, draft: ShowroomDraft) -> Result<Showroom, DomainError>;
    async fn update(&self, id: Uuid, draft: ShowroomDraft) -> Result<Option<Showroom>, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait EventLog: Send + Sync + 'static {
    /// Sequence of the newest recorded event, or 0 when the log is empty.
    async fn latest_sequence(&self) -> Result<i64, DomainError>;
    /// Events with a sequence greater than `after`, oldest first.
    async fn read_after(&self, after: i64, limit: i64) -> Result<Vec<RealtimeEvent>, DomainError>;
}
