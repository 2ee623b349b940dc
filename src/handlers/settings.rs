use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::catalog::SiteSetting;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingRequest {
    pub value: String,
    pub description: Option<String>,
}

/// GET /settings
#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "All site settings", body = [SiteSetting]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "settings"
)]
pub async fn list_settings(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let settings = state.catalog.list_settings().await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// GET /settings/{key}
#[utoipa::path(
    get,
    path = "/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting found", body = SiteSetting),
        (status = 404, description = "Setting not found"),
    ),
    tag = "settings"
)]
pub async fn get_setting(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let setting = state.catalog.get_setting(&path).await?;
    Ok(HttpResponse::Ok().json(setting))
}

/// PUT /settings/{key}
///
/// Creates the setting or replaces its value.
#[utoipa::path(
    put,
    path = "/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpdateSettingRequest,
    responses(
        (status = 200, description = "Setting saved", body = SiteSetting),
        (status = 422, description = "Invalid key"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "settings"
)]
pub async fn update_setting(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateSettingRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let setting = state
        .catalog
        .update_setting(&path, &body.value, body.description.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(setting))
}

/// DELETE /settings/{key}
#[utoipa::path(
    delete,
    path = "/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 204, description = "Setting deleted"),
        (status = 404, description = "Setting not found"),
    ),
    tag = "settings"
)]
pub async fn delete_setting(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.catalog.delete_setting(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /public/settings
///
/// Served from the storefront cache, which follows changes as they happen.
#[utoipa::path(
    get,
    path = "/public/settings",
    responses(
        (status = 200, description = "Cached site settings", body = [SiteSetting]),
    ),
    tag = "public"
)]
pub async fn public_settings(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.cache.settings().await)
}
