use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::application::catalog_service::{ShowroomInput, ShowroomView};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListShowroomsParams {
    /// Hide showrooms that are switched off.
    #[serde(default)]
    pub active_only: bool,
}

/// GET /showrooms
#[utoipa::path(
    get,
    path = "/showrooms",
    params(ListShowroomsParams),
    responses(
        (status = 200, description = "Showrooms ordered by name", body = [ShowroomView]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "showrooms"
)]
pub async fn list_showrooms(
    state: web::Data<AppState>,
    query: web::Query<ListShowroomsParams>,
) -> Result<HttpResponse, AppError> {
    let showrooms = state.catalog.list_showrooms(query.active_only).await?;
    Ok(HttpResponse::Ok().json(showrooms))
}

/// GET /showrooms/{id}
#[utoipa::path(
    get,
    path = "/showrooms/{id}",
    params(("id" = Uuid, Path, description = "Showroom UUID")),
    responses(
        (status = 200, description = "Showroom found", body = ShowroomView),
        (status = 404, description = "Showroom not found"),
    ),
    tag = "showrooms"
)]
pub async fn get_showroom(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let showroom = state.catalog.get_showroom(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(showroom))
}

/// POST /showrooms
///
/// Hours may be sent as `working_hours` text or as a structured `schedule`;
/// with neither, the default week is stored.
#[utoipa::path(
    post,
    path = "/showrooms",
    request_body = ShowroomInput,
    responses(
        (status = 201, description = "Showroom created", body = ShowroomView),
        (status = 422, description = "Required field missing"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "showrooms"
)]
pub async fn create_showroom(
    state: web::Data<AppState>,
    body: web::Json<ShowroomInput>,
) -> Result<HttpResponse, AppError> {
    let showroom = state.catalog.create_showroom(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(showroom))
}

/// PUT /showrooms/{id}
#[utoipa::path(
    put,
    path = "/showrooms/{id}",
    params(("id" = Uuid, Path, description = "Showroom UUID")),
    request_body = ShowroomInput,
    responses(
        (status = 200, description = "Showroom updated", body = ShowroomView),
        (status = 404, description = "Showroom not found"),
        (status = 422, description = "Required field missing"),
    ),
    tag = "showrooms"
)]
pub async fn update_showroom(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ShowroomInput>,
) -> Result<HttpResponse, AppError> {
    let showroom = state
        .catalog
        .update_showroom(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(showroom))
}

/// DELETE /showrooms/{id}
#[utoipa::path(
    delete,
    path = "/showrooms/{id}",
    params(("id" = Uuid, Path, description = "Showroom UUID")),
    responses(
        (status = 204, description = "Showroom deleted"),
        (status = 404, description = "Showroom not found"),
    ),
    tag = "showrooms"
)]
pub async fn delete_showroom(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.catalog.delete_showroom(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /public/showrooms
///
/// Active showrooms, served from the storefront cache.
#[utoipa::path(
    get,
    path = "/public/showrooms",
    responses(
        (status = 200, description = "Cached active showrooms", body = [ShowroomView]),
    ),
    tag = "public"
)]
pub async fn public_showrooms(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.cache.showrooms().await)
}
