use crate::auth::auth::AuthUser;
use crate::logic::network::{
    self, AdminIpSet, Authorization, NetworkError, NetworkRange, parse_ipv4,
};
use crate::model::network::AdminIpRow;
use crate::utils::request_ip;
use actix_web::{HttpRequest, HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct AdminIpEntry {
    #[schema(example = "192.168.1.100")]
    pub ip: String,
    #[schema(example = "192.168.1.x")]
    pub network_range: String,
    #[schema(value_type = String, format = "date-time")]
    pub added_at: NaiveDateTime,
}

#[derive(Serialize, ToSchema)]
pub struct AdminIpListResponse {
    pub data: Vec<AdminIpEntry>,
    #[schema(example = 2)]
    pub count: usize,
    /// "open" when the list is empty, "restricted" otherwise
    #[schema(example = "restricted")]
    pub policy: &'static str,
}

#[derive(Deserialize, ToSchema)]
pub struct IpPayload {
    #[schema(example = "192.168.1.100")]
    pub ip: String,
}

async fn load_admin_ips(pool: &MySqlPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT ip FROM admin_ips ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Admin IP allowlist, with the /24 range each entry grants
#[utoipa::path(
    get,
    path = "/api/v1/network/ips",
    responses(
        (status = 200, description = "Configured admin IPs", body = AdminIpListResponse),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Network"
)]
pub async fn list_ips(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let rows: Vec<AdminIpRow> = sqlx::query_as("SELECT * FROM admin_ips ORDER BY id")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list admin IPs");
            ErrorInternalServerError("Database error")
        })?;

    let data: Vec<AdminIpEntry> = rows
        .into_iter()
        .map(|row| {
            let network_range = parse_ipv4(&row.ip)
                .map(|ip| NetworkRange::of(ip).to_string())
                .unwrap_or_else(|_| "invalid".to_string());
            AdminIpEntry {
                ip: row.ip,
                network_range,
                added_at: row.added_at,
            }
        })
        .collect();

    let count = data.len();
    Ok(HttpResponse::Ok().json(AdminIpListResponse {
        data,
        count,
        policy: if count == 0 { "open" } else { "restricted" },
    }))
}

/// Add an admin IP. Exact string duplicates are rejected; two addresses on
/// the same /24 are both allowed.
#[utoipa::path(
    post,
    path = "/api/v1/network/ips",
    request_body = IpPayload,
    responses(
        (status = 201, description = "IP added", body = Object, example = json!({
            "message": "IP 192.168.1.100 added"
        })),
        (status = 400, description = "Malformed IPv4 address"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "IP already in the list"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Network"
)]
pub async fn add_ip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<IpPayload>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let existing = load_admin_ips(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to load admin IPs");
        ErrorInternalServerError("Database error")
    })?;

    let mut set = AdminIpSet::from_ips(existing);
    let canonical = match set.add(&payload.ip) {
        Ok(()) => set.ips().last().cloned().unwrap_or_default(),
        Err(err @ NetworkError::Validation(_)) => {
            return Ok(HttpResponse::BadRequest().json(json!({ "message": err.to_string() })));
        }
        Err(err @ NetworkError::Duplicate(_)) => {
            return Ok(HttpResponse::Conflict().json(json!({ "message": err.to_string() })));
        }
    };

    sqlx::query("INSERT INTO admin_ips (ip) VALUES (?)")
        .bind(&canonical)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, ip = %canonical, "Failed to insert admin IP");
            ErrorInternalServerError("Database error")
        })?;

    info!(ip = %canonical, added_by = auth.user_id, "Admin IP added");

    Ok(HttpResponse::Created().json(json!({
        "message": format!("IP {} added", canonical)
    })))
}

/// Remove one admin IP; removing an absent entry is a no-op, not an error.
#[utoipa::path(
    delete,
    path = "/api/v1/network/ips/{ip}",
    params(
        ("ip", Path, description = "Exact IP string to remove")
    ),
    responses(
        (status = 200, description = "IP removed (or was not present)", body = Object, example = json!({
            "message": "IP 192.168.1.100 removed"
        })),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Network"
)]
pub async fn remove_ip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let ip = path.into_inner();

    sqlx::query("DELETE FROM admin_ips WHERE ip = ?")
        .bind(ip.trim())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, ip = %ip, "Failed to remove admin IP");
            ErrorInternalServerError("Database error")
        })?;

    info!(ip = %ip, removed_by = auth.user_id, "Admin IP removed");

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("IP {} removed", ip.trim())
    })))
}

/// Clear the allowlist; the system falls back to open access.
#[utoipa::path(
    delete,
    path = "/api/v1/network/ips",
    responses(
        (status = 200, description = "All admin IPs cleared", body = Object, example = json!({
            "message": "All admin IPs cleared"
        })),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Network"
)]
pub async fn clear_ips(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    sqlx::query("DELETE FROM admin_ips")
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to clear admin IPs");
            ErrorInternalServerError("Database error")
        })?;

    info!(cleared_by = auth.user_id, "Admin IP list cleared");

    Ok(HttpResponse::Ok().json(json!({
        "message": "All admin IPs cleared"
    })))
}

/// Evaluate a candidate address against the allowlist. Advisory only:
/// addresses are client-reported, so this never gates anything by itself.
#[utoipa::path(
    post,
    path = "/network/check",
    request_body = IpPayload,
    responses(
        (status = 200, description = "Authorization decision", body = Authorization)
    ),
    tag = "Network"
)]
pub async fn check_access(
    pool: web::Data<MySqlPool>,
    payload: web::Json<IpPayload>,
) -> actix_web::Result<impl Responder> {
    let admin_ips = load_admin_ips(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to load admin IPs");
        ErrorInternalServerError("Database error")
    })?;

    let decision = network::authorize(&payload.ip, &admin_ips);
    Ok(HttpResponse::Ok().json(decision))
}

/// Echo the caller's address as the server sees it, for the "use this IP"
/// flow in configuration clients.
#[utoipa::path(
    get,
    path = "/network/client-ip",
    responses(
        (status = 200, description = "Caller address", body = Object, example = json!({
            "ip": "192.168.1.7"
        })),
        (status = 404, description = "Address could not be determined")
    ),
    tag = "Network"
)]
pub async fn client_ip(req: HttpRequest) -> impl Responder {
    match request_ip::client_ip(&req) {
        Some(ip) => HttpResponse::Ok().json(json!({ "ip": ip })),
        None => HttpResponse::NotFound().json(json!({
            "message": "Could not determine client IP"
        })),
    }
}
