use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::newsletter::{Subscription, SubscriptionResult, SubscriptionStats, SubscriptionStatus};
use crate::errors::AppError;
use crate::handlers::orders::{default_limit, default_page};
use crate::state::AppState;

const DEFAULT_SOURCE: &str = "website";

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub email: String,
    /// Where the form was submitted from, e.g. `footer` or `popup`.
    pub source: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListSubscriptionsParams {
    pub status: Option<SubscriptionStatus>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListSubscriptionsResponse {
    pub items: Vec<Subscription>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counts: SubscriptionStats,
    pub total: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /newsletter/subscribe
///
/// Always answers 200; `success` tells the visitor whether it worked.
#[utoipa::path(
    post,
    path = "/newsletter/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscription attempt result", body = SubscriptionResult),
        (status = 500, description = "Internal server error"),
    ),
    tag = "newsletter"
)]
pub async fn subscribe(
    state: web::Data<AppState>,
    body: web::Json<SubscribeRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let source = body
        .source
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SOURCE);
    let result = state.newsletter.subscribe(&body.email, source).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /newsletter/unsubscribe
#[utoipa::path(
    post,
    path = "/newsletter/unsubscribe",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Unsubscribe attempt result", body = SubscriptionResult),
        (status = 500, description = "Internal server error"),
    ),
    tag = "newsletter"
)]
pub async fn unsubscribe(
    state: web::Data<AppState>,
    body: web::Json<EmailRequest>,
) -> Result<HttpResponse, AppError> {
    let result = state.newsletter.unsubscribe(&body.email).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /newsletter/bounced
#[utoipa::path(
    post,
    path = "/newsletter/bounced",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Subscription flagged as bounced", body = Subscription),
        (status = 404, description = "Address is not subscribed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "newsletter"
)]
pub async fn mark_bounced(
    state: web::Data<AppState>,
    body: web::Json<EmailRequest>,
) -> Result<HttpResponse, AppError> {
    let subscription = state.newsletter.mark_bounced(&body.email).await?;
    Ok(HttpResponse::Ok().json(subscription))
}

/// GET /newsletter/subscriptions
#[utoipa::path(
    get,
    path = "/newsletter/subscriptions",
    params(
        ("status" = Option<SubscriptionStatus>, Query, description = "Only subscriptions in this state"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated subscriptions", body = ListSubscriptionsResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "newsletter"
)]
pub async fn list_subscriptions(
    state: web::Data<AppState>,
    query: web::Query<ListSubscriptionsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    let (items, total) = state.newsletter.list(params.status, page, limit).await?;

    Ok(HttpResponse::Ok().json(ListSubscriptionsResponse {
        items,
        total,
        page,
        limit,
    }))
}

/// GET /newsletter/stats
#[utoipa::path(
    get,
    path = "/newsletter/stats",
    responses(
        (status = 200, description = "Subscription counts per status", body = StatsResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "newsletter"
)]
pub async fn stats(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let counts = state.newsletter.stats().await?;
    Ok(HttpResponse::Ok().json(StatsResponse {
        total: counts.total(),
        counts,
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::application::fakes::FakeBackend;

    fn routes(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
        move |cfg| {
            cfg.app_data(web::Data::new(state))
                .route("/newsletter/subscribe", web::post().to(subscribe))
                .route("/newsletter/unsubscribe", web::post().to(unsubscribe))
                .route("/newsletter/bounced", web::post().to(mark_bounced))
                .route("/newsletter/subscriptions", web::get().to(list_subscriptions))
                .route("/newsletter/stats", web::get().to(stats));
        }
    }

    #[actix_web::test]
    async fn subscribe_defaults_the_source() {
        let backend = FakeBackend::new();
        let app = test::init_service(App::new().configure(routes(backend.state()))).await;

        let req = test::TestRequest::post()
            .uri("/newsletter/subscribe")
            .set_json(json!({"email": "Client@Magazin.ro"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        let stored = backend.newsletter.get("client@magazin.ro").expect("stored");
        assert_eq!(stored.source, DEFAULT_SOURCE);
    }

    #[actix_web::test]
    async fn invalid_email_is_a_200_with_failure() {
        let app = test::init_service(App::new().configure(routes(FakeBackend::new().state()))).await;

        let req = test::TestRequest::post()
            .uri("/newsletter/subscribe")
            .set_json(json!({"email": "nope", "source": "footer"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn bounced_unknown_address_is_404() {
        let app = test::init_service(App::new().configure(routes(FakeBackend::new().state()))).await;

        let req = test::TestRequest::post()
            .uri("/newsletter/bounced")
            .set_json(json!({"email": "ghost@example.ro"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn list_filters_by_status_and_stats_count_everything() {
        let backend = FakeBackend::new();
        let app = test::init_service(App::new().configure(routes(backend.state()))).await;

        for email in ["a@example.ro", "b@example.ro", "c@example.ro"] {
            let req = test::TestRequest::post()
                .uri("/newsletter/subscribe")
                .set_json(json!({"email": email}))
                .to_request();
            test::call_service(&app, req).await;
        }
        let req = test::TestRequest::post()
            .uri("/newsletter/unsubscribe")
            .set_json(json!({"email": "b@example.ro"}))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/newsletter/subscriptions?status=active")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["page"], 1);

        let req = test::TestRequest::get().uri("/newsletter/stats").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["active"], 2);
        assert_eq!(body["unsubscribed"], 1);
        assert_eq!(body["bounced"], 0);
        assert_eq!(body["total"], 3);
    }
}
