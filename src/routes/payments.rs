use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::{
    auth::require_user_id,
    error::{AppError, AppResult},
    repository::table_service::{count_rows, create_row, get_row, list_rows, update_row},
    schemas::{
        clamp_limit_in_range, validate_input, GatewayCallbackInput, InitiatePaymentInput,
        PaymentPath, PaymentsQuery,
    },
    services::audit::write_audit_log,
    services::ledger::{self, PaymentCategory, PaymentState},
    state::AppState,
    tenancy::{assert_org_member, assert_org_role},
};

const PAYMENT_INITIATE_ROLES: &[&str] = &["owner_admin", "manager", "accountant"];

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/payments",
            axum::routing::get(list_payments).post(initiate_payment),
        )
        .route("/payments/{payment_id}", axum::routing::get(get_payment))
        .route("/webhooks/gateway", axum::routing::post(gateway_webhook))
}

async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentsQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let user_id = require_user_id(&state, &headers).await?;
    assert_org_member(&state, &user_id, &query.org_id).await?;
    let pool = db_pool(&state)?;

    let mut filters = Map::new();
    filters.insert(
        "organization_id".to_string(),
        Value::String(query.org_id.clone()),
    );
    if let Some(tenant_id) = non_empty_opt(query.tenant_id.as_deref()) {
        filters.insert("tenant_id".to_string(), Value::String(tenant_id));
    }
    if let Some(status) = non_empty_opt(query.status.as_deref()) {
        filters.insert("status".to_string(), Value::String(status));
    }
    if let Some(category) = non_empty_opt(query.category.as_deref()) {
        filters.insert("category".to_string(), Value::String(category));
    }

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
    let total = count_rows(pool, "payments", Some(&filters)).await?;

    Ok(Json(json!({ "data": rows, "total": total })))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(path): Path<PaymentPath>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let user_id = require_user_id(&state, &headers).await?;
    let pool = db_pool(&state)?;

    let record = get_row(pool, "payments", &path.payment_id, "id").await?;
    let org_id = val_str(&record, "organization_id");
    assert_org_member(&state, &user_id, &org_id).await?;

    Ok(Json(record))
}

/// Record a payment initiation. The row starts as `pending`; the STK-push
/// prompt itself is dispatched by the gateway worker, which later reports
/// the outcome through the webhook below.
async fn initiate_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<InitiatePaymentInput>,
) -> AppResult<impl IntoResponse> {
    let user_id = require_user_id(&state, &headers).await?;
    validate_input(&payload)?;
    let pool = db_pool(&state)?;

    let category = PaymentCategory::parse(&payload.category).ok_or_else(|| {
        AppError::BadRequest("category must be one of rent, utility, deposit.".to_string())
    })?;

    let tenant = get_row(pool, "tenants", &payload.tenant_id, "id").await?;
    let org_id = val_str(&tenant, "organization_id");
    assert_org_role(&state, &user_id, &org_id, PAYMENT_INITIATE_ROLES).await?;

    let phone = non_empty_opt(payload.phone_e164.as_deref())
        .or_else(|| non_empty_opt(Some(&val_str(&tenant, "phone_e164"))))
        .ok_or_else(|| {
            AppError::BadRequest("No phone number for the STK prompt.".to_string())
        })?;

    let mut record = Map::new();
    record.insert("organization_id".to_string(), Value::String(org_id.clone()));
    record.insert(
        "tenant_id".to_string(),
        Value::String(payload.tenant_id.clone()),
    );
    let property_id = val_str(&tenant, "property_id");
    if !property_id.is_empty() {
        record.insert("property_id".to_string(), Value::String(property_id));
    }
    record.insert(
        "category".to_string(),
        Value::String(category.as_str().to_string()),
    );
    record.insert("amount".to_string(), json!(payload.amount));
    record.insert(
        "status".to_string(),
        Value::String(PaymentState::Pending.as_str().to_string()),
    );
    record.insert("phone_e164".to_string(), Value::String(phone));
    record.insert(
        "currency".to_string(),
        Value::String(state.config.default_currency.clone()),
    );

    let created = create_row(pool, "payments", &record).await?;
    let entity_id = val_str(&created, "id");

    write_audit_log(
        state.db_pool.as_ref(),
        Some(&org_id),
        Some(&user_id),
        "create",
        "payments",
        Some(&entity_id),
        None,
        Some(created.clone()),
    )
    .await;

    Ok((axum::http::StatusCode::CREATED, Json(created)))
}

/// Gateway confirmation callback. Transitions a `pending` payment to
/// `completed` or `failed` exactly once; a replay for a payment that has
/// already left `pending` is acknowledged and ignored (completed payments
/// are immutable). A successful completion triggers a reconciliation for
/// the payer so the cached tenant snapshot catches up immediately.
async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<GatewayCallbackInput>,
) -> AppResult<impl IntoResponse> {
    require_gateway_secret(&state, &headers)?;
    let pool = db_pool(&state)?;

    let payment = get_row(pool, "payments", &payload.payment_id, "id").await?;
    let current_status = val_str(&payment, "status");
    if current_status != PaymentState::Pending.as_str() {
        tracing::info!(
            payment_id = %payload.payment_id,
            status = %current_status,
            "Ignoring gateway callback replay for a settled payment"
        );
        return Ok((axum::http::StatusCode::OK, Json(json!({ "ignored": true }))));
    }

    let succeeded = payload.result.trim().eq_ignore_ascii_case("success");
    let new_state = if succeeded {
        PaymentState::Completed
    } else {
        PaymentState::Failed
    };

    let mut patch = Map::new();
    patch.insert(
        "status".to_string(),
        Value::String(new_state.as_str().to_string()),
    );
    if let Some(gateway_ref) = non_empty_opt(payload.gateway_ref.as_deref()) {
        patch.insert("gateway_ref".to_string(), Value::String(gateway_ref));
    }
    if succeeded {
        patch.insert(
            "paid_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
    }
    let updated = update_row(pool, "payments", &payload.payment_id, &patch, "id").await?;

    let tenant_id = val_str(&updated, "tenant_id");
    if succeeded && !tenant_id.is_empty() {
        // The payer just settled something; refresh their snapshot now
        // rather than waiting for the next dashboard load.
        match ledger::compute_dues_and_reconcile(pool, &tenant_id, Utc::now().date_naive(), true)
            .await
        {
            Ok(dues) => {
                tracing::info!(
                    tenant_id = %tenant_id,
                    payment_id = %payload.payment_id,
                    total_remaining = dues.total_remaining,
                    payment_status = dues.standing().as_str(),
                    "Payment completed, tenant snapshot reconciled"
                );
            }
            Err(error) => {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    error = %error,
                    "Reconciliation after gateway confirmation failed"
                );
            }
        }
    }

    Ok((axum::http::StatusCode::OK, Json(json!({ "ignored": false }))))
}

fn require_gateway_secret(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    let Some(expected) = state.config.gateway_webhook_secret.as_deref() else {
        // No secret configured (local development); accept the callback.
        return Ok(());
    };
    let provided = headers
        .get("x-gateway-signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if provided == expected {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "Invalid gateway signature.".to_string(),
        ))
    }
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

fn non_empty_opt(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
}
