use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::checkout_service::{CheckoutError, PlaceOrder, PlacementOutcome};
use crate::domain::checkout::{CheckoutData, CheckoutStep, CheckoutWizard};
use crate::domain::order::Customer;
use crate::errors::AppError;
use crate::state::AppState;

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
pub struct DefaultsParams {
    /// Signed-in user whose saved profile pre-fills billing.
    pub user_id: Option<Uuid>,
    /// Account email, used when the profile has none.
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateStepRequest {
    pub step: CheckoutStep,
    pub data: CheckoutData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateStepResponse {
    pub valid: bool,
    pub missing_fields: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub cart_id: Uuid,
    pub data: CheckoutData,
    pub customer: Option<Customer>,
    /// Alternative to the `Idempotency-Key` header; the header wins.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    #[serde(flatten)]
    pub outcome: PlacementOutcome,
    /// Wizard step after submission: `payment` while the customer is sent
    /// to the gateway, `confirmation` otherwise.
    pub step: CheckoutStep,
}

fn idempotency_key(req: &HttpRequest, body: Option<String>) -> Option<String> {
    req.headers()
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or(body)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /checkout/defaults
///
/// Returns a fresh checkout form, with billing pre-filled from the user's
/// saved profile when one exists.
#[utoipa::path(
    get,
    path = "/checkout/defaults",
    params(DefaultsParams),
    responses(
        (status = 200, description = "Checkout defaults", body = CheckoutData),
        (status = 500, description = "Internal server error"),
    ),
    tag = "checkout"
)]
pub async fn defaults(
    state: web::Data<AppState>,
    query: web::Query<DefaultsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let profile = match params.user_id {
        Some(user_id) => state.profiles.find(user_id).await?,
        None => None,
    };
    let data = CheckoutData::prefilled(profile.as_ref(), params.email.as_deref());
    Ok(HttpResponse::Ok().json(data))
}

/// POST /checkout/validate
#[utoipa::path(
    post,
    path = "/checkout/validate",
    request_body = ValidateStepRequest,
    responses(
        (status = 200, description = "Validation result for the step", body = ValidateStepResponse),
    ),
    tag = "checkout"
)]
pub async fn validate(body: web::Json<ValidateStepRequest>) -> HttpResponse {
    let body = body.into_inner();
    let missing = body.data.missing_fields(body.step);
    HttpResponse::Ok().json(ValidateStepResponse {
        valid: missing.is_empty(),
        missing_fields: missing.into_iter().map(str::to_string).collect(),
    })
}

/// POST /checkout
///
/// Places the order for a cart. Card payments answer with the gateway URL
/// to redirect to; other methods answer with a confirmation. Re-sending the
/// same idempotency key resumes the earlier order.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = PlaceOrderRequest,
    params(
        ("Idempotency-Key" = Option<String>, Header, description = "Client key that makes retries safe"),
    ),
    responses(
        (status = 201, description = "Order placed", body = PlaceOrderResponse),
        (status = 200, description = "Earlier order with the same key resumed", body = PlaceOrderResponse),
        (status = 409, description = "Concurrent submission with the same key"),
        (status = 422, description = "Checkout incomplete or cart empty"),
        (status = 502, description = "Payment gateway failed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "checkout"
)]
pub async fn place_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let key = idempotency_key(&req, body.idempotency_key);

    let mut wizard = CheckoutWizard::at_payment(body.data).map_err(CheckoutError::from)?;
    let outcome = state
        .checkout
        .place_order(
            &mut wizard,
            PlaceOrder {
                cart_id: body.cart_id,
                customer: body.customer,
                idempotency_key: key,
            },
        )
        .await?;

    let response = PlaceOrderResponse {
        step: wizard.step(),
        outcome,
    };
    Ok(if response.outcome.resumed {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::Created().json(response)
    })
}
