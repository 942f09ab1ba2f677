use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use sha1::Digest;

use crate::{
    error::{AppError, AppResult},
    repository::table_service::{create_row, get_row, list_rows, update_row},
    schemas::{clamp_limit_in_range, MonthlyAnalyticsQuery},
    services::ledger,
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/public/tenant/request-access",
            axum::routing::post(request_access),
        )
        .route("/public/tenant/verify", axum::routing::post(verify_token))
        .route("/tenant/me", axum::routing::get(tenant_me))
        .route("/tenant/dues", axum::routing::get(tenant_dues))
        .route("/tenant/payments", axum::routing::get(tenant_payments))
        .route(
            "/tenant/analytics/monthly",
            axum::routing::get(tenant_monthly_analytics),
        )
}

#[derive(Debug, serde::Deserialize)]
struct RequestAccessInput {
    email: String,
}

#[derive(Debug, serde::Deserialize)]
struct VerifyTokenInput {
    token: String,
}

#[derive(Debug, serde::Deserialize)]
struct TenantPaymentsQuery {
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    200
}

/// Generate a magic-link token for a tenant and queue it for delivery.
async fn request_access(
    State(state): State<AppState>,
    Json(payload): Json<RequestAccessInput>,
) -> AppResult<impl IntoResponse> {
    let pool = db_pool(&state)?;
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::BadRequest("email is required.".to_string()));
    }

    let mut filters = Map::new();
    filters.insert("email".to_string(), Value::String(email.clone()));
    let tenants = list_rows(pool, "tenants", Some(&filters), 10, 0, "created_at", false).await?;
    let tenant = tenants
        .first()
        .ok_or_else(|| AppError::NotFound("No tenancy found for this email.".to_string()))?;

    let tenant_id = val_str(tenant, "id");

    let raw_token = uuid::Uuid::new_v4().to_string();
    let token_hash = hex_encode(sha1::Sha1::digest(raw_token.as_bytes()));

    let mut record = Map::new();
    record.insert("tenant_id".to_string(), Value::String(tenant_id));
    record.insert("email".to_string(), Value::String(email.clone()));
    record.insert("token_hash".to_string(), Value::String(token_hash));
    if let Some(phone) = tenant
        .as_object()
        .and_then(|obj| obj.get("phone_e164"))
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
    {
        record.insert("phone_e164".to_string(), Value::String(phone.to_string()));
    }
    create_row(pool, "tenant_access_tokens", &record).await?;

    let magic_link = format!(
        "{}/tenant/login?token={raw_token}",
        state.config.app_public_url
    );

    let org_id = val_str(tenant, "organization_id");
    let tenant_phone = val_str(tenant, "phone_e164");
    if !org_id.is_empty() && !tenant_phone.is_empty() {
        let mut msg = Map::new();
        msg.insert("organization_id".to_string(), Value::String(org_id));
        msg.insert("channel".to_string(), Value::String("sms".to_string()));
        msg.insert("recipient".to_string(), Value::String(tenant_phone));
        msg.insert("status".to_string(), Value::String("queued".to_string()));
        msg.insert(
            "scheduled_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        let mut payload_map = Map::new();
        payload_map.insert(
            "body".to_string(),
            Value::String(format!(
                "Your Nyumbani sign-in link: {magic_link}\nThis link expires in 24 hours."
            )),
        );
        msg.insert("payload".to_string(), Value::Object(payload_map));
        let _ = create_row(pool, "message_logs", &msg).await;
    }

    Ok((
        axum::http::StatusCode::OK,
        Json(json!({
            "message": "Access link sent to your registered contact.",
            "email": email,
        })),
    ))
}

/// Verify a magic-link token.
async fn verify_token(
    State(state): State<AppState>,
    Json(payload): Json<VerifyTokenInput>,
) -> AppResult<Json<Value>> {
    let pool = db_pool(&state)?;
    let raw_token = payload.token.trim();
    if raw_token.is_empty() {
        return Err(AppError::BadRequest("token is required.".to_string()));
    }

    let token_hash = hex_encode(sha1::Sha1::digest(raw_token.as_bytes()));

    let token_record = get_row(pool, "tenant_access_tokens", &token_hash, "token_hash")
        .await
        .map_err(|_| AppError::Unauthorized("Invalid or expired token.".to_string()))?;

    check_token_expiry(&token_record)?;

    let token_id = val_str(&token_record, "id");
    let mut patch = Map::new();
    patch.insert(
        "last_used_at".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
    let _ = update_row(pool, "tenant_access_tokens", &token_id, &patch, "id").await;

    Ok(Json(json!({
        "authenticated": true,
        "tenant_id": val_str(&token_record, "tenant_id"),
        "email": val_str(&token_record, "email"),
        "token_hash": token_hash,
    })))
}

/// Tenant dashboard: tenancy record, property/unit context, and a fresh
/// dues summary. This is a tenant-facing read, so it reconciles.
async fn tenant_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let (pool, tenant_id) = require_tenant(&state, &headers).await?;

    let tenant = get_row(pool, "tenants", &tenant_id, "id").await?;

    let property_id = val_str(&tenant, "property_id");
    let unit_id = val_str(&tenant, "unit_id");

    let property = if !property_id.is_empty() {
        get_row(pool, "properties", &property_id, "id").await.ok()
    } else {
        None
    };
    let unit = if !unit_id.is_empty() {
        get_row(pool, "units", &unit_id, "id").await.ok()
    } else {
        None
    };

    let as_of = Utc::now().date_naive();
    let dues = ledger::compute_dues_and_reconcile(pool, &tenant_id, as_of, true).await?;

    Ok(Json(json!({
        "tenant": tenant,
        "property": property,
        "unit": unit,
        "months_stayed": dues.months_stayed,
        "payment_status": dues.standing().as_str(),
        "dues": dues,
    })))
}

/// Current dues for the authenticated tenant. Always reconciles so the
/// cached snapshot tracks what the tenant was shown.
async fn tenant_dues(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let (pool, tenant_id) = require_tenant(&state, &headers).await?;

    let as_of = Utc::now().date_naive();
    let dues = ledger::compute_dues_and_reconcile(pool, &tenant_id, as_of, true).await?;

    Ok(Json(json!({
        "as_of": as_of.to_string(),
        "months_stayed": dues.months_stayed,
        "payment_status": dues.standing().as_str(),
        "dues": dues,
    })))
}

/// Payment history for the authenticated tenant, newest first.
async fn tenant_payments(
    State(state): State<AppState>,
    Query(query): Query<TenantPaymentsQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let (pool, tenant_id) = require_tenant(&state, &headers).await?;

    let mut filters = Map::new();
    filters.insert("tenant_id".to_string(), Value::String(tenant_id));

    let rows = list_rows(
        pool,
        "payments",
        Some(&filters),
        clamp_limit_in_range(query.limit, 1, 500),
        0,
        "created_at",
        false,
    )
    .await?;

    Ok(Json(json!({ "data": rows })))
}

/// Monthly payment buckets for the tenant's trend chart.
async fn tenant_monthly_analytics(
    State(state): State<AppState>,
    Query(query): Query<MonthlyAnalyticsQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let (pool, tenant_id) = require_tenant(&state, &headers).await?;

    let as_of = Utc::now().date_naive();
    let months = query.months.clamp(1, 36);
    let buckets = ledger::project_tenant_monthly(pool, &tenant_id, months, as_of).await?;

    Ok(Json(json!({ "data": buckets })))
}

/// Authenticate a tenant from the x-tenant-token header.
async fn require_tenant<'a>(
    state: &'a AppState,
    headers: &HeaderMap,
) -> AppResult<(&'a sqlx::PgPool, String)> {
    let pool = db_pool(state)?;

    let raw_token = headers
        .get("x-tenant-token")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing x-tenant-token header.".to_string()))?;

    let token_hash = hex_encode(sha1::Sha1::digest(raw_token.as_bytes()));

    let token_record = get_row(pool, "tenant_access_tokens", &token_hash, "token_hash")
        .await
        .map_err(|_| AppError::Unauthorized("Invalid or expired token.".to_string()))?;

    check_token_expiry(&token_record)?;

    let tenant_id = val_str(&token_record, "tenant_id");
    if tenant_id.is_empty() {
        return Err(AppError::Unauthorized("Invalid token.".to_string()));
    }

    Ok((pool, tenant_id))
}

fn check_token_expiry(token_record: &Value) -> AppResult<()> {
    if let Some(expires_at) = token_record
        .as_object()
        .and_then(|obj| obj.get("expires_at"))
        .and_then(Value::as_str)
    {
        if let Ok(expiry) = chrono::DateTime::parse_from_rfc3339(expires_at) {
            if Utc::now() > expiry {
                return Err(AppError::Unauthorized(
                    "Token has expired. Request a new access link.".to_string(),
                ));
            }
        }
    }
    Ok(())
}

fn db_pool(state: &AppState) -> AppResult<&sqlx::PgPool> {
    state.db_pool.as_ref().ok_or_else(|| {
        AppError::Dependency("Database is not configured. Set DATABASE_URL.".to_string())
    })
}

fn val_str(row: &Value, key: &str) -> String {
    row.as_object()
        .and_then(|obj| obj.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_default()
}

fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    bytes
        .as_ref()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
