//! Order placement: the last action of the checkout wizard.
//!
//! The routine writes the order, then reserves stock and writes one order
//! item per cart line, one line at a time, then either starts a card
//! payment or marks the order as processing. Rows written before a failure
//! are kept; a retry with the same idempotency key resumes the same order
//! instead of creating a new one.

use std::collections::HashSet;
use std::sync::Arc;

use log::{error, info, warn};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::newsletter_service::NewsletterService;
use crate::domain::checkout::{CheckoutData, CheckoutWizard, PaymentMethod, StepError};
use crate::domain::errors::{DomainError, GatewayError};
use crate::domain::order::{
    CartLine, Customer, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus,
    ReservationOutcome, RESERVATION_MINUTES,
};
use crate::domain::ports::{
    CartStore, OrderRepository, PaymentGateway, PaymentRequest, ReservationItem,
    ReservationRequest, StockReservations,
};
use crate::domain::pricing::{OrderTotals, PricingPolicy};

pub const NEWSLETTER_SOURCE: &str = "checkout";

#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub cart_id: Uuid,
    pub customer: Option<Customer>,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NextAction {
    /// Send the customer to the payment gateway.
    Redirect { payment_url: String },
    /// Show the confirmation step.
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlacementOutcome {
    pub order_id: Uuid,
    pub totals: OrderTotals,
    pub items: Vec<OrderItem>,
    pub next: NextAction,
    /// True when an earlier submission with the same idempotency key was
    /// picked up instead of creating a new order.
    pub resumed: bool,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("checkout is not ready: {0}")]
    Validation(#[from] StepError),
    #[error("cart {0} is empty")]
    EmptyCart(Uuid),
    #[error("cart no longer matches order {0}")]
    CartChanged(Uuid),
    #[error("order could not be created: {0}")]
    OrderCreation(DomainError),
    #[error("payment for order {order_id} could not be started: {source}")]
    Payment {
        order_id: Uuid,
        source: GatewayError,
    },
    #[error("order placement failed: {0}")]
    Unexpected(#[from] DomainError),
}

impl CheckoutError {
    /// Message shown to the customer.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Validation(StepError::Incomplete { step, .. }) => format!(
                "Completează toate câmpurile obligatorii de la pasul „{}”.",
                step.label()
            ),
            CheckoutError::Validation(_) => {
                "Comanda poate fi plasată doar din pasul de plată.".to_string()
            }
            CheckoutError::EmptyCart(_) => "Coșul de cumpărături este gol.".to_string(),
            CheckoutError::CartChanged(_) => {
                "Coșul s-a modificat de la plasarea comenzii. Te rugăm să reiei comanda."
                    .to_string()
            }
            CheckoutError::OrderCreation(_) => {
                "Nu am putut crea comanda. Te rugăm să încerci din nou.".to_string()
            }
            CheckoutError::Payment {
                source: GatewayError::Rejected(reason),
                ..
            } => format!("Eroare la inițializarea plății: {reason}"),
            CheckoutError::Payment { .. } => {
                "Eroare la inițializarea plății. Te rugăm să încerci din nou.".to_string()
            }
            CheckoutError::Unexpected(_) => {
                "A apărut o eroare la plasarea comenzii. Te rugăm să încerci din nou."
                    .to_string()
            }
        }
    }
}

#[derive(Clone)]
pub struct CheckoutService {
    orders: Arc<dyn OrderRepository>,
    carts: Arc<dyn CartStore>,
    reservations: Arc<dyn StockReservations>,
    payments: Arc<dyn PaymentGateway>,
    newsletter: NewsletterService,
    pricing: PricingPolicy,
}

impl CheckoutService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        carts: Arc<dyn CartStore>,
        reservations: Arc<dyn StockReservations>,
        payments: Arc<dyn PaymentGateway>,
        newsletter: NewsletterService,
        pricing: PricingPolicy,
    ) -> Self {
        Self {
            orders,
            carts,
            reservations,
            payments,
            newsletter,
            pricing,
        }
    }

    pub fn pricing(&self) -> PricingPolicy {
        self.pricing
    }

    pub async fn place_order(
        &self,
        wizard: &mut CheckoutWizard,
        request: PlaceOrder,
    ) -> Result<PlacementOutcome, CheckoutError> {
        wizard.ready_to_submit()?;
        let data = wizard.data().clone();

        let user_id = request.customer.as_ref().map(|c| c.id);
        let existing = match request.idempotency_key.as_deref() {
            Some(key) => self.orders.find_by_idempotency_key(key).await?,
            None => None,
        };
        let resumed = existing.is_some();

        // A resumed order may legitimately meet an already cleared cart.
        let lines = self.carts.lines(request.cart_id).await?;
        if !resumed && lines.is_empty() {
            return Err(CheckoutError::EmptyCart(request.cart_id));
        }

        let (order, mut items) = match existing {
            Some(found) => {
                // A cleared cart is fine; a different one would leave the
                // items out of step with the stored totals.
                if !lines.is_empty() && self.pricing.totals(&lines) != found.order.totals() {
                    warn!(
                        "Cart {} changed since order {} was created",
                        request.cart_id, found.order.id
                    );
                    return Err(CheckoutError::CartChanged(found.order.id));
                }
                info!(
                    "Resuming order {} for idempotency key {:?}",
                    found.order.id, request.idempotency_key
                );
                (found.order, found.items)
            }
            None => {
                let order = self.create_order(&data, &lines, &request, user_id).await?;
                (order, Vec::new())
            }
        };

        let placed: HashSet<Uuid> = items.iter().map(|i| i.product_id).collect();
        for line in lines.iter().filter(|l| !placed.contains(&l.product_id)) {
            let reservation = self.reserve_line(order.id, user_id, line).await;
            let item = self
                .orders
                .add_item(NewOrderItem {
                    order_id: order.id,
                    line: line.clone(),
                    reservation,
                })
                .await?;
            items.push(item);
        }

        let next = match order.status {
            OrderStatus::PendingPayment => {
                self.settle(wizard, &order, items.len(), request.cart_id)
                    .await?
            }
            status => {
                info!("Order {} already {}", order.id, status.as_str());
                self.carts.clear(request.cart_id).await?;
                wizard.confirm();
                NextAction::Confirmed
            }
        };

        if data.newsletter {
            self.subscribe_to_newsletter(&data.billing_address.email)
                .await;
        }

        Ok(PlacementOutcome {
            order_id: order.id,
            totals: order.totals(),
            items,
            next,
            resumed,
        })
    }

    async fn create_order(
        &self,
        data: &CheckoutData,
        lines: &[CartLine],
        request: &PlaceOrder,
        user_id: Option<Uuid>,
    ) -> Result<Order, CheckoutError> {
        let billing = &data.billing_address;
        let totals = self.pricing.totals(lines);
        let notes = Some(data.notes.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let order_id = self
            .orders
            .create(NewOrder {
                user_id,
                customer_email: billing.email.trim().to_string(),
                customer_name: billing.full_name(),
                customer_phone: billing.phone.trim().to_string(),
                billing_address: billing.clone(),
                shipping_address: data.effective_shipping_address(),
                totals,
                payment_method: data.payment_method,
                notes,
                idempotency_key: request.idempotency_key.clone(),
            })
            .await
            .map_err(|e| {
                error!("Failed to create order for cart {}: {}", request.cart_id, e);
                CheckoutError::OrderCreation(e)
            })?;

        info!(
            "Created order {} ({} lines, total {} bani, {})",
            order_id,
            lines.len(),
            totals.total_amount,
            data.payment_method.as_str()
        );

        self.orders
            .find_by_id(order_id)
            .await?
            .map(|found| found.order)
            .ok_or_else(|| {
                CheckoutError::Unexpected(DomainError::Internal(format!(
                    "order {order_id} missing right after creation"
                )))
            })
    }

    async fn reserve_line(
        &self,
        order_id: Uuid,
        user_id: Option<Uuid>,
        line: &CartLine,
    ) -> ReservationOutcome {
        let request = ReservationRequest {
            items: vec![ReservationItem {
                product_id: line.product_id,
                quantity: line.quantity,
            }],
            order_id,
            user_id,
            duration_minutes: RESERVATION_MINUTES,
        };
        match self.reservations.reserve(request).await {
            Ok(ids) => match ids.first() {
                Some(id) => ReservationOutcome::Reserved {
                    reservation_id: *id,
                },
                None => {
                    warn!(
                        "Stock reservation for product {} on order {} returned no id",
                        line.product_id, order_id
                    );
                    ReservationOutcome::Failed {
                        reason: "no reservation returned".to_string(),
                    }
                }
            },
            Err(e) => {
                warn!(
                    "Stock reservation for product {} on order {} failed: {}",
                    line.product_id, order_id, e
                );
                ReservationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn settle(
        &self,
        wizard: &mut CheckoutWizard,
        order: &Order,
        item_count: usize,
        cart_id: Uuid,
    ) -> Result<NextAction, CheckoutError> {
        match order.payment_method {
            PaymentMethod::Card => {
                let request = PaymentRequest {
                    order_id: order.id,
                    amount: order.total_amount,
                    customer_email: order.customer_email.clone(),
                    customer_name: order.customer_name.clone(),
                    customer_phone: order.customer_phone.clone(),
                    billing_address: order.billing_address.clone(),
                    description: payment_description(order.id, item_count),
                };
                let payment_url = self.payments.start_payment(request).await.map_err(|source| {
                    error!("Payment start failed for order {}: {}", order.id, source);
                    CheckoutError::Payment {
                        order_id: order.id,
                        source,
                    }
                })?;
                self.carts.clear(cart_id).await?;
                info!("Order {} redirected to payment", order.id);
                Ok(NextAction::Redirect { payment_url })
            }
            PaymentMethod::BankTransfer | PaymentMethod::CashOnDelivery => {
                self.orders
                    .update_status(order.id, OrderStatus::Processing)
                    .await?;
                self.carts.clear(cart_id).await?;
                wizard.confirm();
                info!("Order {} confirmed", order.id);
                Ok(NextAction::Confirmed)
            }
        }
    }

    async fn subscribe_to_newsletter(&self, email: &str) {
        match self.newsletter.subscribe(email, NEWSLETTER_SOURCE).await {
            Ok(result) if !result.success => {
                info!("Newsletter opt-in at checkout skipped: {}", result.message)
            }
            Ok(_) => {}
            Err(e) => warn!("Newsletter opt-in at checkout failed: {}", e),
        }
    }
}

fn payment_description(order_id: Uuid, line_count: usize) -> String {
    let short = order_id.simple().to_string();
    let short = short.get(..8).unwrap_or(short.as_str());
    format!("Comanda #{} ({} produse)", short.to_uppercase(), line_count)
}
