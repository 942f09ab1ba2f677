use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Map, Value};

use crate::{
    auth::require_user_id,
    error::{AppError, AppResult},
    repository::table_service::{create_row, delete_row, delete_rows, get_row, list_rows, update_row},
    schemas::{
        clamp_limit_in_range, remove_nulls, serialize_to_map, validate_input, CreateTenantInput,
        DuesQuery, MonthlyAnalyticsQuery, TenantPath, TenantsQuery, UpdateTenantInput,
    },
    services::audit::write_audit_log,
    services::ledger,
    state::AppState,
    tenancy::{assert_org_member, assert_org_role},
};

const TENANT_EDIT_ROLES: &[&str] = &["owner_admin", "manager"];

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/tenants",
            axum::routing::get(list_tenants).post(create_tenant),
        )
        .route(
            "/tenants/{tenant_id}",
            axum::routing::get(get_tenant)
                .patch(update_tenant)
                .delete(delete_tenant),
        )
        .route("/tenants/{tenant_id}/dues", axum::routing::get(tenant_dues))
        .route(
            "/tenants/{tenant_id}/analytics/monthly",
            axum::routing::get(tenant_monthly_analytics),
        )
}

async fn list_tenants(
    State(state): State<AppState>,
    Query(query): Query<TenantsQuery>,
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
    if let Some(property_id) = non_empty_opt(query.property_id.as_deref()) {
        filters.insert("property_id".to_string(), Value::String(property_id));
    }
    if let Some(status) = non_empty_opt(query.payment_status.as_deref()) {
        filters.insert("payment_status".to_string(), Value::String(status));
    }

    let rows = list_rows(
        pool,
        "tenants",
        Some(&filters),
        clamp_limit_in_range(query.limit, 1, 500),
        0,
        "created_at",
        false,
    )
    .await?;

    Ok(Json(json!({ "data": rows })))
}

async fn create_tenant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateTenantInput>,
) -> AppResult<impl IntoResponse> {
    let user_id = require_user_id(&state, &headers).await?;
    validate_input(&payload)?;
    assert_org_role(&state, &user_id, &payload.organization_id, TENANT_EDIT_ROLES).await?;
    let pool = db_pool(&state)?;

    if let Some(raw) = payload.lease_start_date.as_deref() {
        parse_date(raw)?;
    }
    if let Some(raw) = payload.lease_end_date.as_deref() {
        parse_date(raw)?;
    }

    // The property must belong to the same organization.
    let property = get_row(pool, "properties", &payload.property_id, "id").await?;
    if val_str(&property, "organization_id") != payload.organization_id {
        return Err(AppError::BadRequest(
            "Property does not belong to this organization.".to_string(),
        ));
    }

    let mut record = remove_nulls(serialize_to_map(&payload));
    // Ledger snapshot starts empty; the first reconciliation overwrites it.
    record.insert(
        "payment_status".to_string(),
        Value::String(ledger::STATUS_PENDING.to_string()),
    );
    record.insert("total_rent_paid".to_string(), json!(0.0));
    record.insert("total_utility_paid".to_string(), json!(0.0));
    record.insert("total_deposit_paid".to_string(), json!(0.0));

    let created = create_row(pool, "tenants", &record).await?;
    let entity_id = val_str(&created, "id");

    write_audit_log(
        state.db_pool.as_ref(),
        Some(&payload.organization_id),
        Some(&user_id),
        "create",
        "tenants",
        Some(&entity_id),
        None,
        Some(created.clone()),
    )
    .await;

    Ok((axum::http::StatusCode::CREATED, Json(created)))
}

async fn get_tenant(
    State(state): State<AppState>,
    Path(path): Path<TenantPath>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let user_id = require_user_id(&state, &headers).await?;
    let pool = db_pool(&state)?;

    let record = get_row(pool, "tenants", &path.tenant_id, "id").await?;
    let org_id = val_str(&record, "organization_id");
    assert_org_member(&state, &user_id, &org_id).await?;

    Ok(Json(record))
}

async fn update_tenant(
    State(state): State<AppState>,
    Path(path): Path<TenantPath>,
    headers: HeaderMap,
    Json(payload): Json<UpdateTenantInput>,
) -> AppResult<Json<Value>> {
    let user_id = require_user_id(&state, &headers).await?;
    let pool = db_pool(&state)?;

    let existing = get_row(pool, "tenants", &path.tenant_id, "id").await?;
    let org_id = val_str(&existing, "organization_id");
    assert_org_role(&state, &user_id, &org_id, TENANT_EDIT_ROLES).await?;

    if let Some(raw) = payload.lease_start_date.as_deref() {
        parse_date(raw)?;
    }
    if let Some(raw) = payload.lease_end_date.as_deref() {
        parse_date(raw)?;
    }

    let patch = remove_nulls(serialize_to_map(&payload));
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update.".to_string()));
    }

    let updated = update_row(pool, "tenants", &path.tenant_id, &patch, "id").await?;

    write_audit_log(
        state.db_pool.as_ref(),
        Some(&org_id),
        Some(&user_id),
        "update",
        "tenants",
        Some(&path.tenant_id),
        Some(existing),
        Some(updated.clone()),
    )
    .await;

    Ok(Json(updated))
}

/// Delete a tenant. Cascades to the tenant's payment log and access tokens.
async fn delete_tenant(
    State(state): State<AppState>,
    Path(path): Path<TenantPath>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let user_id = require_user_id(&state, &headers).await?;
    let pool = db_pool(&state)?;

    let existing = get_row(pool, "tenants", &path.tenant_id, "id").await?;
    let org_id = val_str(&existing, "organization_id");
    assert_org_role(&state, &user_id, &org_id, TENANT_EDIT_ROLES).await?;

    let mut by_tenant = Map::new();
    by_tenant.insert(
        "tenant_id".to_string(),
        Value::String(path.tenant_id.clone()),
    );
    let payments_removed = delete_rows(pool, "payments", &by_tenant).await?;
    let _ = delete_rows(pool, "tenant_access_tokens", &by_tenant).await;

    let deleted = delete_row(pool, "tenants", &path.tenant_id, "id").await?;

    write_audit_log(
        state.db_pool.as_ref(),
        Some(&org_id),
        Some(&user_id),
        "delete",
        "tenants",
        Some(&path.tenant_id),
        Some(deleted.clone()),
        None,
    )
    .await;

    Ok(Json(json!({
        "deleted": deleted,
        "payments_removed": payments_removed,
    })))
}

/// Owner/admin dues view. Does not write the snapshot back unless the
/// caller opts in with `?reconcile=true`; impersonation reads may therefore
/// show the snapshot as of the last tenant-triggered reconciliation.
async fn tenant_dues(
    State(state): State<AppState>,
    Path(path): Path<TenantPath>,
    Query(query): Query<DuesQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let user_id = require_user_id(&state, &headers).await?;
    let pool = db_pool(&state)?;

    let tenant = get_row(pool, "tenants", &path.tenant_id, "id").await?;
    let org_id = val_str(&tenant, "organization_id");
    assert_org_member(&state, &user_id, &org_id).await?;

    let as_of = match query.as_of.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };

    let dues =
        ledger::compute_dues_and_reconcile(pool, &path.tenant_id, as_of, query.reconcile).await?;

    Ok(Json(json!({
        "tenant_id": path.tenant_id,
        "as_of": as_of.to_string(),
        "months_stayed": dues.months_stayed,
        "payment_status": dues.standing().as_str(),
        "dues": dues,
    })))
}

async fn tenant_monthly_analytics(
    State(state): State<AppState>,
    Path(path): Path<TenantPath>,
    Query(query): Query<MonthlyAnalyticsQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let user_id = require_user_id(&state, &headers).await?;
    let pool = db_pool(&state)?;

    let tenant = get_row(pool, "tenants", &path.tenant_id, "id").await?;
    let org_id = val_str(&tenant, "organization_id");
    assert_org_member(&state, &user_id, &org_id).await?;

    let as_of = match query.as_of.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };
    let months = query.months.clamp(1, 36);

    let buckets = ledger::project_tenant_monthly(pool, &path.tenant_id, months, as_of).await?;

    Ok(Json(json!({ "data": buckets })))
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{raw}', expected YYYY-MM-DD.")))
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
