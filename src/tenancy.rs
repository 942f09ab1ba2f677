use serde_json::Value;
use sqlx::{PgPool, Row};

use crate::error::AppError;
use crate::state::AppState;

fn db_pool(state: &AppState) -> Result<&PgPool, AppError> {
    state.db_pool.as_ref().ok_or_else(|| {
        AppError::Dependency("Database is not configured. Set DATABASE_URL.".to_string())
    })
}

pub async fn get_org_membership(
    state: &AppState,
    user_id: &str,
    org_id: &str,
) -> Result<Option<Value>, AppError> {
    let cache_key = format!("{org_id}:{user_id}");
    if let Some(cached) = state.membership_cache.get(&cache_key).await {
        return Ok(if cached.is_null() { None } else { Some(cached) });
    }

    let pool = db_pool(state)?;
    let row = sqlx::query(
        "SELECT row_to_json(t) AS row
         FROM organization_members t
         WHERE organization_id = $1::uuid AND user_id = $2::uuid
         LIMIT 1",
    )
    .bind(org_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|error| AppError::Dependency(format!("Membership lookup failed: {error}")))?;

    let membership =
        row.and_then(|value| value.try_get::<Option<Value>, _>("row").ok().flatten());

    state
        .membership_cache
        .insert(cache_key, membership.clone().unwrap_or(Value::Null))
        .await;

    Ok(membership)
}

pub async fn assert_org_member(
    state: &AppState,
    user_id: &str,
    org_id: &str,
) -> Result<Value, AppError> {
    get_org_membership(state, user_id, org_id)
        .await?
        .ok_or_else(|| {
            AppError::Forbidden("Forbidden: not a member of this organization.".to_string())
        })
}

pub async fn assert_org_role(
    state: &AppState,
    user_id: &str,
    org_id: &str,
    allowed_roles: &[&str],
) -> Result<Value, AppError> {
    let membership = assert_org_member(state, user_id, org_id).await?;
    let role = membership
        .get("role")
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    if allowed_roles.contains(&role) {
        return Ok(membership);
    }

    Err(AppError::Forbidden(format!(
        "Forbidden: role '{role}' is not allowed for this action."
    )))
}
