use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::warn;

use crate::repository::table_service::create_row;

/// Best-effort audit trail write. Mutations should never fail because the
/// audit insert did.
#[allow(clippy::too_many_arguments)]
pub async fn write_audit_log(
    pool: Option<&PgPool>,
    org_id: Option<&str>,
    user_id: Option<&str>,
    action: &str,
    entity_type: &str,
    entity_id: Option<&str>,
    before: Option<Value>,
    after: Option<Value>,
) {
    let Some(pool) = pool else {
        return;
    };

    let mut record = Map::new();
    if let Some(org_id) = org_id.filter(|value| !value.is_empty()) {
        record.insert(
            "organization_id".to_string(),
            Value::String(org_id.to_string()),
        );
    }
    if let Some(user_id) = user_id.filter(|value| !value.is_empty()) {
        record.insert("user_id".to_string(), Value::String(user_id.to_string()));
    }
    record.insert("action".to_string(), Value::String(action.to_string()));
    record.insert(
        "entity_type".to_string(),
        Value::String(entity_type.to_string()),
    );
    if let Some(entity_id) = entity_id.filter(|value| !value.is_empty()) {
        record.insert(
            "entity_id".to_string(),
            Value::String(entity_id.to_string()),
        );
    }
    if let Some(before) = before {
        record.insert("before".to_string(), before);
    }
    if let Some(after) = after {
        record.insert("after".to_string(), after);
    }

    if let Err(error) = create_row(pool, "audit_logs", &record).await {
        warn!(action, entity_type, error = %error, "Audit log write failed");
    }
}
