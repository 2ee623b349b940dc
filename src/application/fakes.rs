//! In-memory port implementations for service tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::application::cache::StorefrontCache;
use crate::application::catalog_service::CatalogService;
use crate::application::checkout_service::CheckoutService;
use crate::application::newsletter_service::NewsletterService;
use crate::domain::catalog::{Showroom, ShowroomDraft, SiteSetting};
use crate::domain::checkout::Profile;
use crate::domain::errors::{DomainError, GatewayError};
use crate::domain::events::{EventAction, EventEntity, RealtimeEvent};
use crate::domain::newsletter::{Subscription, SubscriptionStats, SubscriptionStatus};
use crate::domain::order::{
    CartLine, ListResult, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderWithItems,
};
use crate::domain::ports::{
    CartStore, EventLog, NewsletterRepository, OrderRepository, PaymentGateway, PaymentRequest,
    ProfileRepository, ReservationRequest, SettingsRepository, ShowroomRepository,
    StockReservations,
};
use crate::domain::pricing::PricingPolicy;
use crate::state::AppState;

pub fn line(unit_price: i64, quantity: i32) -> CartLine {
    CartLine {
        product_id: Uuid::new_v4(),
        product_name: "Gresie porțelanată 60x60".to_string(),
        product_sku: Some("GR-6060".to_string()),
        product_image: None,
        unit_price,
        quantity,
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryOrders {
    orders: Mutex<Vec<OrderWithItems>>,
    fail_create: Mutex<bool>,
    item_budget: Mutex<Option<usize>>,
}

impl InMemoryOrders {
    pub fn fail_create(&self) {
        *self.fail_create.lock().unwrap() = true;
    }

    /// Accept `n` more items, then fail every insert.
    pub fn fail_item_after(&self, n: usize) {
        *self.item_budget.lock().unwrap() = Some(n);
    }

    pub fn allow_items(&self) {
        *self.item_budget.lock().unwrap() = None;
    }

    pub fn count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> OrderWithItems {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.order.id == id)
            .cloned()
            .expect("order exists")
    }

    pub fn only(&self) -> OrderWithItems {
        let orders = self.orders.lock().unwrap();
        assert_eq!(orders.len(), 1, "expected exactly one order");
        orders[0].clone()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn create(&self, order: NewOrder) -> Result<Uuid, DomainError> {
        if *self.fail_create.lock().unwrap() {
            return Err(DomainError::Internal("insert into orders failed".to_string()));
        }
        let id = Uuid::new_v4();
        self.orders.lock().unwrap().push(OrderWithItems {
            order: Order {
                id,
                user_id: order.user_id,
                customer_email: order.customer_email,
                customer_name: order.customer_name,
                customer_phone: order.customer_phone,
                billing_address: order.billing_address,
                shipping_address: order.shipping_address,
                subtotal: order.totals.subtotal,
                tax_amount: order.totals.tax_amount,
                shipping_cost: order.totals.shipping_cost,
                total_amount: order.totals.total_amount,
                status: OrderStatus::PendingPayment,
                payment_method: order.payment_method,
                notes: order.notes,
                idempotency_key: order.idempotency_key,
                created_at: Utc::now(),
            },
            items: Vec::new(),
        });
        Ok(id)
    }

    async fn add_item(&self, item: NewOrderItem) -> Result<OrderItem, DomainError> {
        {
            let mut budget = self.item_budget.lock().unwrap();
            match budget.as_mut() {
                Some(0) => {
                    return Err(DomainError::Internal(
                        "insert into order_items failed".to_string(),
                    ))
                }
                Some(n) => *n -= 1,
                None => {}
            }
        }
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.order.id == item.order_id)
            .ok_or(DomainError::NotFound)?;
        let stored = OrderItem {
            id: Uuid::new_v4(),
            order_id: item.order_id,
            product_id: item.line.product_id,
            product_name: item.line.product_name.clone(),
            product_sku: item.line.product_sku.clone(),
            product_image: item.line.product_image.clone(),
            unit_price: item.line.unit_price,
            quantity: item.line.quantity,
            total_price: item.line.line_total(),
            reservation: item.reservation,
        };
        order.items.push(stored.clone());
        Ok(stored)
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.order.id == id)
            .ok_or(DomainError::NotFound)?;
        order.order.status = status;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderWithItems>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.order.id == id)
            .cloned())
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<OrderWithItems>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.order.idempotency_key.as_deref() == Some(key))
            .cloned())
    }

    async fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let orders = self.orders.lock().unwrap();
        let offset = ((page - 1) * limit) as usize;
        Ok(ListResult {
            items: orders
                .iter()
                .rev()
                .skip(offset)
                .take(limit as usize)
                .map(|o| o.order.clone())
                .collect(),
            total: orders.len() as i64,
        })
    }
}

// ── Carts and profiles ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryCarts {
    carts: Mutex<HashMap<Uuid, Vec<CartLine>>>,
    cleared: Mutex<HashSet<Uuid>>,
}

impl InMemoryCarts {
    pub fn put(&self, cart_id: Uuid, lines: Vec<CartLine>) {
        self.carts.lock().unwrap().insert(cart_id, lines);
    }

    pub fn was_cleared(&self, cart_id: Uuid) -> bool {
        self.cleared.lock().unwrap().contains(&cart_id)
    }

    pub fn lines_of(&self, cart_id: Uuid) -> Vec<CartLine> {
        self.carts
            .lock()
            .unwrap()
            .get(&cart_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl CartStore for InMemoryCarts {
    async fn lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        Ok(self.lines_of(cart_id))
    }

    async fn clear(&self, cart_id: Uuid) -> Result<(), DomainError> {
        self.carts.lock().unwrap().remove(&cart_id);
        self.cleared.lock().unwrap().insert(cart_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProfiles {
    profiles: Mutex<HashMap<Uuid, Profile>>,
}

impl InMemoryProfiles {
    pub fn put(&self, profile: Profile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id, profile);
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfiles {
    async fn find(&self, user_id: Uuid) -> Result<Option<Profile>, DomainError> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }
}

// ── Remote functions ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct ScriptedReservations {
    failing: Mutex<HashSet<Uuid>>,
    calls: Mutex<Vec<ReservationRequest>>,
}

impl ScriptedReservations {
    pub fn fail_for(&self, product_id: Uuid) {
        self.failing.lock().unwrap().insert(product_id);
    }

    pub fn calls(&self) -> Vec<ReservationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StockReservations for ScriptedReservations {
    async fn reserve(&self, request: ReservationRequest) -> Result<Vec<Uuid>, GatewayError> {
        self.calls.lock().unwrap().push(request.clone());
        let failing = self.failing.lock().unwrap();
        if request.items.iter().any(|i| failing.contains(&i.product_id)) {
            return Err(GatewayError::Rejected("stoc insuficient".to_string()));
        }
        Ok(request.items.iter().map(|_| Uuid::new_v4()).collect())
    }
}

pub struct ScriptedPayments {
    failure: Mutex<Option<String>>,
    calls: Mutex<Vec<PaymentRequest>>,
}

impl ScriptedPayments {
    pub fn succeeding() -> Self {
        Self {
            failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Mutex::new(Some(reason.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn fail(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn calls(&self) -> Vec<PaymentRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedPayments {
    async fn start_payment(&self, request: PaymentRequest) -> Result<String, GatewayError> {
        let order_id = request.order_id;
        self.calls.lock().unwrap().push(request);
        match self.failure.lock().unwrap().clone() {
            Some(reason) => Err(GatewayError::Rejected(reason)),
            None => Ok(format!("https://secure.netopia.test/pay/{order_id}")),
        }
    }
}

// ── Newsletter ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryNewsletter {
    rows: Mutex<BTreeMap<String, Subscription>>,
}

impl InMemoryNewsletter {
    pub fn get(&self, email: &str) -> Option<Subscription> {
        self.rows.lock().unwrap().get(email).cloned()
    }
}

#[async_trait]
impl NewsletterRepository for InMemoryNewsletter {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscription>, DomainError> {
        Ok(self.get(email))
    }

    async fn insert(&self, email: &str, source: &str) -> Result<Subscription, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(email) {
            return Err(DomainError::Conflict("duplicate key".to_string()));
        }
        let sub = Subscription {
            id: Uuid::new_v4(),
            email: email.to_string(),
            status: SubscriptionStatus::Active,
            source: source.to_string(),
            subscribed_at: Utc::now(),
            unsubscribed_at: None,
        };
        rows.insert(email.to_string(), sub.clone());
        Ok(sub)
    }

    async fn set_status(
        &self,
        email: &str,
        status: SubscriptionStatus,
        at: DateTime<Utc>,
    ) -> Result<Subscription, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let sub = rows.get_mut(email).ok_or(DomainError::NotFound)?;
        sub.status = status;
        match status {
            SubscriptionStatus::Active => {
                sub.subscribed_at = at;
                sub.unsubscribed_at = None;
            }
            SubscriptionStatus::Unsubscribed => sub.unsubscribed_at = Some(at),
            SubscriptionStatus::Bounced => {}
        }
        Ok(sub.clone())
    }

    async fn list(
        &self,
        status: Option<SubscriptionStatus>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Subscription>, i64), DomainError> {
        let rows = self.rows.lock().unwrap();
        let matching: Vec<Subscription> = rows
            .values()
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn stats(&self) -> Result<SubscriptionStats, DomainError> {
        let rows = self.rows.lock().unwrap();
        let count = |wanted| rows.values().filter(|s| s.status == wanted).count() as i64;
        Ok(SubscriptionStats {
            active: count(SubscriptionStatus::Active),
            unsubscribed: count(SubscriptionStatus::Unsubscribed),
            bounced: count(SubscriptionStatus::Bounced),
        })
    }
}

// ── Catalog and event log ────────────────────────────────────────────────────

/// Event log shared by the catalog fakes, so tests can observe the rows a
/// mutation would have appended.
#[derive(Default)]
pub struct InMemoryEventLog {
    events: Mutex<Vec<RealtimeEvent>>,
}

impl InMemoryEventLog {
    pub fn append(&self, entity: EventEntity, action: EventAction, data: serde_json::Value) {
        let mut events = self.events.lock().unwrap();
        let sequence = events.len() as i64 + 1;
        events.push(RealtimeEvent {
            sequence,
            entity,
            action,
            data,
            timestamp: Utc::now(),
        });
    }

    pub fn all(&self) -> Vec<RealtimeEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn latest_sequence(&self) -> Result<i64, DomainError> {
        Ok(self.events.lock().unwrap().len() as i64)
    }

    async fn read_after(&self, after: i64, limit: i64) -> Result<Vec<RealtimeEvent>, DomainError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.sequence > after)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

pub struct InMemorySettings {
    rows: Mutex<BTreeMap<String, SiteSetting>>,
    log: Arc<InMemoryEventLog>,
}

impl InMemorySettings {
    pub fn new(log: Arc<InMemoryEventLog>) -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            log,
        }
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettings {
    async fn list(&self) -> Result<Vec<SiteSetting>, DomainError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn get(&self, key: &str) -> Result<Option<SiteSetting>, DomainError> {
        Ok(self.rows.lock().unwrap().get(key).cloned())
    }

    async fn upsert(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<SiteSetting, DomainError> {
        let setting = SiteSetting {
            key: key.to_string(),
            value: value.to_string(),
            description: description.map(str::to_string),
            updated_at: Utc::now(),
        };
        let existed = self
            .rows
            .lock()
            .unwrap()
            .insert(key.to_string(), setting.clone())
            .is_some();
        let action = if existed {
            EventAction::Updated
        } else {
            EventAction::Created
        };
        self.log.append(
            EventEntity::SiteSettings,
            action,
            json!({"key": key, "value": value}),
        );
        Ok(setting)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let removed = self.rows.lock().unwrap().remove(key).is_some();
        if removed {
            self.log
                .append(EventEntity::SiteSettings, EventAction::Deleted, json!({"key": key}));
        }
        Ok(removed)
    }
}

pub struct InMemoryShowrooms {
    rows: Mutex<Vec<Showroom>>,
    log: Arc<InMemoryEventLog>,
}

impl InMemoryShowrooms {
    pub fn new(log: Arc<InMemoryEventLog>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            log,
        }
    }
}

fn apply_draft(showroom: &mut Showroom, draft: ShowroomDraft) {
    showroom.name = draft.name;
    showroom.address = draft.address;
    showroom.city = draft.city;
    showroom.phone = draft.phone;
    showroom.email = draft.email;
    showroom.working_hours = draft.working_hours;
    showroom.is_active = draft.is_active;
    showroom.updated_at = Utc::now();
}

#[async_trait]
impl ShowroomRepository for InMemoryShowrooms {
    async fn list(&self, active_only: bool) -> Result<Vec<Showroom>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| !active_only || s.is_active)
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Showroom>, DomainError> {
        Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, draft: ShowroomDraft) -> Result<Showroom, DomainError> {
        let now = Utc::now();
        let mut showroom = Showroom {
            id: Uuid::new_v4(),
            name: String::new(),
            address: String::new(),
            city: String::new(),
            phone: None,
            email: None,
            working_hours: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        apply_draft(&mut showroom, draft);
        self.rows.lock().unwrap().push(showroom.clone());
        self.log.append(
            EventEntity::Showrooms,
            EventAction::Created,
            json!({"id": showroom.id, "name": showroom.name}),
        );
        Ok(showroom)
    }

    async fn update(&self, id: Uuid, draft: ShowroomDraft) -> Result<Option<Showroom>, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(showroom) = rows.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        apply_draft(showroom, draft);
        self.log.append(
            EventEntity::Showrooms,
            EventAction::Updated,
            json!({"id": id, "name": showroom.name}),
        );
        Ok(Some(showroom.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != id);
        let removed = rows.len() < before;
        if removed {
            self.log
                .append(EventEntity::Showrooms, EventAction::Deleted, json!({"id": id}));
        }
        Ok(removed)
    }
}

// ── Application state ────────────────────────────────────────────────────────

/// Every port backed by an in-memory fake, wired into an [`AppState`] the
/// same way the server wires the diesel repositories.
pub struct FakeBackend {
    pub orders: Arc<InMemoryOrders>,
    pub carts: Arc<InMemoryCarts>,
    pub profiles: Arc<InMemoryProfiles>,
    pub reservations: Arc<ScriptedReservations>,
    pub payments: Arc<ScriptedPayments>,
    pub newsletter: Arc<InMemoryNewsletter>,
    pub events: Arc<InMemoryEventLog>,
    state: AppState,
}

impl FakeBackend {
    pub fn new() -> Self {
        let orders = Arc::new(InMemoryOrders::default());
        let carts = Arc::new(InMemoryCarts::default());
        let profiles = Arc::new(InMemoryProfiles::default());
        let reservations = Arc::new(ScriptedReservations::default());
        let payments = Arc::new(ScriptedPayments::succeeding());
        let newsletter = Arc::new(InMemoryNewsletter::default());
        let events = Arc::new(InMemoryEventLog::default());

        let newsletter_service = NewsletterService::new(newsletter.clone());
        let catalog = CatalogService::new(
            Arc::new(InMemorySettings::new(events.clone())),
            Arc::new(InMemoryShowrooms::new(events.clone())),
        );
        let state = AppState {
            checkout: CheckoutService::new(
                orders.clone(),
                carts.clone(),
                reservations.clone(),
                payments.clone(),
                newsletter_service.clone(),
                PricingPolicy::default(),
            ),
            orders: orders.clone(),
            profiles: profiles.clone(),
            newsletter: newsletter_service,
            cache: Arc::new(StorefrontCache::new(catalog.clone())),
            catalog,
        };

        Self {
            orders,
            carts,
            profiles,
            reservations,
            payments,
            newsletter,
            events,
            state,
        }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }
}
