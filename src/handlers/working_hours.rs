use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::working_hours::{self, WeeklySchedule};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkingHoursText {
    pub working_hours: String,
}

/// POST /working-hours/encode
#[utoipa::path(
    post,
    path = "/working-hours/encode",
    request_body = WeeklySchedule,
    responses(
        (status = 200, description = "Compact text form", body = WorkingHoursText),
        (status = 400, description = "Malformed schedule"),
    ),
    tag = "working-hours"
)]
pub async fn encode(body: web::Json<WeeklySchedule>) -> HttpResponse {
    HttpResponse::Ok().json(WorkingHoursText {
        working_hours: working_hours::encode(&body),
    })
}

/// POST /working-hours/decode
///
/// Only the `Luni-Vineri: H:MM-H:MM` part is understood; anything else
/// comes back as the default week.
#[utoipa::path(
    post,
    path = "/working-hours/decode",
    request_body = WorkingHoursText,
    responses(
        (status = 200, description = "Decoded weekly schedule", body = WeeklySchedule),
    ),
    tag = "working-hours"
)]
pub async fn decode(body: web::Json<WorkingHoursText>) -> HttpResponse {
    HttpResponse::Ok().json(working_hours::decode(&body.working_hours))
}
