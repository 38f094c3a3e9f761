use std::str::FromStr;

use crate::api::shift::load_shift_config;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::logic::attendance::{self, AttendanceStatus, ClassifyError};
use crate::model::attendance::Attendance;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Admins may inspect any employee; others are pinned to their own.
    pub employee_id: Option<u64>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<Attendance>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalendarQuery {
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
    pub employee_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct CalendarDay {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_in: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_out: Option<NaiveDateTime>,
    pub worked_minutes: Option<i64>,
    pub loss_of_pay: f64,
}

#[derive(Serialize, ToSchema)]
pub struct CalendarSummary {
    pub present_days: u32,
    pub late_days: u32,
    pub half_days: u32,
    pub absent_days: u32,
    pub total_loss_of_pay: f64,
}

#[derive(Serialize, ToSchema)]
pub struct CalendarResponse {
    pub month: u32,
    pub year: i32,
    pub days: Vec<CalendarDay>,
    pub summary: CalendarSummary,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CorrectAttendance {
    #[schema(example = "2024-01-15T17:30:00", value_type = String, format = "date-time")]
    pub check_out: NaiveDateTime,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let now = config.facility_now();

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(now.date())
    .bind(now)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked in successfully"
        }))),

        Err(e) => {
            // Duplicate check-in for same day: unique key on (employee_id, date)
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Already checked in today"
                    })));
                }
            }

            error!(error = %e, employee_id, "Check-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Check-out endpoint; finalizes worked minutes and status.
#[utoipa::path(
    put,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "worked_minutes": 510,
            "status": "present"
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let now = config.facility_now();

    let open: Option<(u64, NaiveDateTime)> = sqlx::query_as(
        r#"
        SELECT id, check_in
        FROM attendance
        WHERE employee_id = ?
        AND date = ?
        AND check_out IS NULL
        "#,
    )
    .bind(employee_id)
    .bind(now.date())
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Check-out lookup failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some((record_id, check_in)) = open else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No active check-in found for today"
        })));
    };

    let shift = load_shift_config(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to load shift settings");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let classification = match attendance::classify(check_in, Some(now), &shift) {
        Ok(c) => c,
        Err(err @ ClassifyError::InvalidRange { .. }) => {
            // clock skew or a corrected check-in in the future
            error!(error = %err, employee_id, "Check-out rejected");
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Check-out must be after check-in"
            })));
        }
    };

    sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = ?, worked_minutes = ?, status = ?
        WHERE id = ? AND check_out IS NULL
        "#,
    )
    .bind(now)
    .bind(classification.worked_minutes)
    .bind(classification.status.to_string())
    .bind(record_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Check-out failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully",
        "worked_minutes": classification.worked_minutes,
        "status": classification.status
    })))
}

/// Paginated attendance history with optional month/year filtering.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("employee_id", Query, description = "Filter by employee (admin only)"),
        ("month", Query, description = "Filter by month (1-12)"),
        ("year", Query, description = "Filter by year")
    ),
    responses(
        (status = 200, description = "Paginated attendance history", body = AttendanceListResponse),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // Non-admins only ever see their own history.
    let employee_id = if auth.is_admin() {
        query.employee_id
    } else {
        Some(
            auth.employee_id
                .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?,
        )
    };

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<sqlx::types::JsonValue> = Vec::new();

    if let Some(employee_id) = employee_id {
        conditions.push("employee_id = ?");
        bindings.push(employee_id.into());
    }

    if let Some(month) = query.month {
        conditions.push("MONTH(date) = ?");
        bindings.push(month.into());
    }

    if let Some(year) = query.year {
        conditions.push("YEAR(date) = ?");
        bindings.push(year.into());
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM attendance {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting attendance records");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count attendance records");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM attendance {} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page, per_page, offset, "Fetching attendance records");

    let mut data_query = sqlx::query_as::<_, Attendance>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let records = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch attendance records");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page,
        per_page,
        total,
    }))
}

/// Per-day statuses for one month, with loss-of-pay figures. Working days
/// (Mon-Fri) in the past with no record come back as "absent" -- absence is
/// derived here from record non-existence, the classifier never produces
/// it.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/calendar",
    params(
        ("month", Query, description = "Month (1-12)"),
        ("year", Query, description = "Year"),
        ("employee_id", Query, description = "Employee to inspect (admin only)")
    ),
    responses(
        (status = 200, description = "Calendar view of the month", body = CalendarResponse),
        (status = 400, description = "Invalid month"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_calendar(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<CalendarQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = if auth.is_admin() {
        match query.employee_id {
            Some(id) => id,
            None => auth
                .employee_id
                .ok_or_else(|| actix_web::error::ErrorBadRequest("employee_id required"))?,
        }
    } else {
        auth.employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?
    };

    let Some(first_day) = NaiveDate::from_ymd_opt(query.year, query.month, 1) else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid month"
        })));
    };

    let shift = load_shift_config(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to load shift settings");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let records: Vec<Attendance> = sqlx::query_as(
        r#"
        SELECT * FROM attendance
        WHERE employee_id = ?
        AND MONTH(date) = ?
        AND YEAR(date) = ?
        ORDER BY date
        "#,
    )
    .bind(employee_id)
    .bind(query.month)
    .bind(query.year)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch attendance for calendar");
        ErrorInternalServerError("Database error")
    })?;

    let today = config.facility_now().date();

    let mut days = Vec::new();
    let mut summary = CalendarSummary {
        present_days: 0,
        late_days: 0,
        half_days: 0,
        absent_days: 0,
        total_loss_of_pay: 0.0,
    };

    let mut day = first_day;
    while day.month() == query.month {
        let entry = match records.iter().find(|r| r.date == day) {
            Some(record) => {
                let status = record
                    .status
                    .as_deref()
                    .and_then(|s| AttendanceStatus::from_str(s).ok())
                    .unwrap_or(AttendanceStatus::Active);
                let lop = attendance::loss_of_pay(status, record.worked_minutes, &shift);
                Some(CalendarDay {
                    date: day,
                    status,
                    check_in: Some(record.check_in),
                    check_out: record.check_out,
                    worked_minutes: record.worked_minutes,
                    loss_of_pay: lop,
                })
            }
            // past working day with no record at all
            None if day < today && is_working_day(day) => {
                let lop = attendance::loss_of_pay(AttendanceStatus::Absent, None, &shift);
                Some(CalendarDay {
                    date: day,
                    status: AttendanceStatus::Absent,
                    check_in: None,
                    check_out: None,
                    worked_minutes: None,
                    loss_of_pay: lop,
                })
            }
            None => None,
        };

        if let Some(entry) = entry {
            match entry.status {
                AttendanceStatus::Present => summary.present_days += 1,
                AttendanceStatus::Late => summary.late_days += 1,
                AttendanceStatus::HalfDay => summary.half_days += 1,
                AttendanceStatus::Absent => summary.absent_days += 1,
                AttendanceStatus::Active => {}
            }
            summary.total_loss_of_pay += entry.loss_of_pay;
            days.push(entry);
        }

        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Ok(HttpResponse::Ok().json(CalendarResponse {
        month: query.month,
        year: query.year,
        days,
        summary,
    }))
}

fn is_working_day(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Administrative correction: overwrite check-out and recompute worked
/// minutes and status. The only mutation a finalized record admits.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{attendance_id}",
    params(
        ("attendance_id", Path, description = "Attendance record ID")
    ),
    request_body = CorrectAttendance,
    responses(
        (status = 200, description = "Record corrected", body = Object, example = json!({
            "message": "Attendance corrected",
            "worked_minutes": 480,
            "status": "late"
        })),
        (status = 400, description = "Check-out not after check-in"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn correct_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CorrectAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let attendance_id = path.into_inner();

    let check_in: Option<NaiveDateTime> =
        sqlx::query_scalar("SELECT check_in FROM attendance WHERE id = ?")
            .bind(attendance_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, attendance_id, "Failed to fetch attendance record");
                ErrorInternalServerError("Internal Server Error")
            })?;

    let Some(check_in) = check_in else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Attendance record not found"
        })));
    };

    let shift = load_shift_config(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to load shift settings");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let classification = match attendance::classify(check_in, Some(payload.check_out), &shift) {
        Ok(c) => c,
        Err(err @ ClassifyError::InvalidRange { .. }) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": err.to_string()
            })));
        }
    };

    sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = ?, worked_minutes = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.check_out)
    .bind(classification.worked_minutes)
    .bind(classification.status.to_string())
    .bind(attendance_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, attendance_id, "Failed to correct attendance record");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance corrected",
        "worked_minutes": classification.worked_minutes,
        "status": classification.status
    })))
}
