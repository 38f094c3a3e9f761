use crate::auth::auth::AuthUser;
use crate::logic::attendance::ShiftConfig;
use crate::model::shift::{ShiftRulesRow, ShiftSettingsRow};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

/// The single active shift configuration; defaults apply until an admin
/// saves one.
pub async fn load_shift_config(pool: &MySqlPool) -> Result<ShiftConfig, sqlx::Error> {
    let row: Option<ShiftSettingsRow> =
        sqlx::query_as("SELECT * FROM shift_settings WHERE id = 1")
            .fetch_optional(pool)
            .await?;

    Ok(row.map(ShiftConfig::from).unwrap_or_default())
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateShiftSettings {
    #[schema(example = "09:00:00", value_type = String, format = "time")]
    pub start_time: NaiveTime,
    #[schema(example = "18:00:00", value_type = String, format = "time")]
    pub end_time: NaiveTime,
    #[schema(example = 15)]
    pub late_threshold_minutes: u32,
    #[schema(example = 60)]
    pub early_checkout_threshold_minutes: u32,
    #[schema(example = 100.0)]
    pub amount_per_hour: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateShiftRules {
    #[schema(example = "Check in before 09:15. Three half-days count as one absence.")]
    pub content: String,
}

/// Current shift settings
#[utoipa::path(
    get,
    path = "/api/v1/shift/settings",
    responses(
        (status = 200, description = "Active shift configuration", body = ShiftConfig),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn get_settings(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let shift = load_shift_config(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to load shift settings");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(shift))
}

/// Overwrite the shift settings. There is exactly one active
/// configuration; it is never deleted, only replaced.
#[utoipa::path(
    put,
    path = "/api/v1/shift/settings",
    request_body = UpdateShiftSettings,
    responses(
        (status = 200, description = "Settings updated", body = Object, example = json!({
            "message": "Settings updated successfully"
        })),
        (status = 400, description = "Invalid shift window"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn update_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateShiftSettings>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    // overnight windows are out of scope; thresholds are already
    // non-negative by type
    if payload.end_time <= payload.start_time {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Shift end time must be after start time"
        })));
    }
    if !payload.amount_per_hour.is_finite() || payload.amount_per_hour < 0.0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Amount per hour must be a non-negative number"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO shift_settings
        (id, start_time, end_time, late_threshold_minutes, early_checkout_threshold_minutes, amount_per_hour)
        VALUES (1, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            start_time = VALUES(start_time),
            end_time = VALUES(end_time),
            late_threshold_minutes = VALUES(late_threshold_minutes),
            early_checkout_threshold_minutes = VALUES(early_checkout_threshold_minutes),
            amount_per_hour = VALUES(amount_per_hour)
        "#,
    )
    .bind(payload.start_time)
    .bind(payload.end_time)
    .bind(payload.late_threshold_minutes)
    .bind(payload.early_checkout_threshold_minutes)
    .bind(payload.amount_per_hour)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to update shift settings");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Settings updated successfully"
    })))
}

/// Company rules document
#[utoipa::path(
    get,
    path = "/api/v1/shift/rules",
    responses(
        (status = 200, description = "Rules text", body = Object, example = json!({
            "content": "Check in before 09:15."
        })),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn get_rules(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let row: Option<ShiftRulesRow> = sqlx::query_as("SELECT * FROM shift_rules WHERE id = 1")
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load shift rules");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let content = row.map(|r| r.content).unwrap_or_default();
    Ok(HttpResponse::Ok().json(json!({ "content": content })))
}

/// Overwrite the company rules document
#[utoipa::path(
    put,
    path = "/api/v1/shift/rules",
    request_body = UpdateShiftRules,
    responses(
        (status = 200, description = "Rules updated", body = Object, example = json!({
            "message": "Rules updated successfully"
        })),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn update_rules(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateShiftRules>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    sqlx::query(
        r#"
        INSERT INTO shift_rules (id, content)
        VALUES (1, ?)
        ON DUPLICATE KEY UPDATE content = VALUES(content)
        "#,
    )
    .bind(&payload.content)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to update shift rules");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Rules updated successfully"
    })))
}
