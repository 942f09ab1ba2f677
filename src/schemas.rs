use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

pub fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|errors| AppError::UnprocessableEntity(format!("Validation failed: {errors}")))
}

pub fn clamp_limit_in_range(limit: i64, minimum: i64, maximum: i64) -> i64 {
    limit.clamp(minimum, maximum)
}

pub fn serialize_to_map<T>(value: &T) -> serde_json::Map<String, serde_json::Value>
where
    T: serde::Serialize,
{
    let json = serde_json::to_value(value)
        .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));
    json.as_object().cloned().unwrap_or_default()
}

pub fn remove_nulls(
    mut map: serde_json::Map<String, serde_json::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    map.retain(|_, value| !value.is_null());
    map
}

fn default_limit_100() -> i64 {
    100
}
fn default_limit_200() -> i64 {
    200
}
fn default_months_6() -> u32 {
    6
}
fn default_false() -> bool {
    false
}
fn default_city_nairobi() -> String {
    "Nairobi".to_string()
}
fn default_country_ke() -> String {
    "KE".to_string()
}
fn default_property_status() -> String {
    "active".to_string()
}
fn default_zero() -> f64 {
    0.0
}

// ---- properties & units ----

#[derive(Debug, Clone, Deserialize, serde::Serialize, Validate)]
pub struct CreatePropertyInput {
    pub organization_id: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub address: Option<String>,
    #[serde(default = "default_city_nairobi")]
    pub city: String,
    #[serde(default = "default_country_ke")]
    pub country: String,
    #[serde(default = "default_property_status")]
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct UpdatePropertyInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertiesQuery {
    pub org_id: String,
    pub status: Option<String>,
    #[serde(default = "default_limit_100")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyPath {
    pub property_id: String,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize, Validate)]
pub struct CreateUnitInput {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[serde(default = "default_zero")]
    pub monthly_rent: f64,
    pub notes: Option<String>,
}

// ---- tenants ----

#[derive(Debug, Clone, Deserialize, serde::Serialize, Validate)]
pub struct CreateTenantInput {
    pub organization_id: String,
    pub property_id: String,
    pub unit_id: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    pub phone_e164: Option<String>,
    /// YYYY-MM-DD; absent means the lease is not yet active.
    pub lease_start_date: Option<String>,
    pub lease_end_date: Option<String>,
    #[serde(default = "default_zero")]
    pub monthly_rent: f64,
    #[serde(default = "default_zero")]
    pub deposit_amount: f64,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct UpdateTenantInput {
    pub unit_id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_e164: Option<String>,
    pub lease_start_date: Option<String>,
    pub lease_end_date: Option<String>,
    pub monthly_rent: Option<f64>,
    pub deposit_amount: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantsQuery {
    pub org_id: String,
    pub property_id: Option<String>,
    pub payment_status: Option<String>,
    #[serde(default = "default_limit_100")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantPath {
    pub tenant_id: String,
}

/// Dues view parameters. `reconcile` defaults to false: owner and admin
/// reads must not write the snapshot back (see the ledger service docs).
#[derive(Debug, Clone, Deserialize)]
pub struct DuesQuery {
    /// YYYY-MM-DD; defaults to today.
    pub as_of: Option<String>,
    #[serde(default = "default_false")]
    pub reconcile: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyAnalyticsQuery {
    #[serde(default = "default_months_6")]
    pub months: u32,
    pub as_of: Option<String>,
}

// ---- payments ----

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsQuery {
    pub org_id: String,
    pub tenant_id: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    #[serde(default = "default_limit_200")]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize, Validate)]
pub struct InitiatePaymentInput {
    pub tenant_id: String,
    /// rent | utility | deposit
    pub category: String,
    #[validate(range(min = 0.01))]
    pub amount: f64,
    /// Mobile-money number to push the STK prompt to; defaults to the
    /// tenant's registered phone.
    pub phone_e164: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentPath {
    pub payment_id: String,
}

/// Gateway confirmation callback body.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayCallbackInput {
    pub payment_id: String,
    /// "success" or "failed" as reported by the gateway.
    pub result: String,
    /// Gateway transaction id (e.g. mobile-money receipt number).
    pub gateway_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{clamp_limit_in_range, remove_nulls, serialize_to_map, UpdateTenantInput};

    #[test]
    fn clamps_limits() {
        assert_eq!(clamp_limit_in_range(0, 1, 500), 1);
        assert_eq!(clamp_limit_in_range(9999, 1, 500), 500);
        assert_eq!(clamp_limit_in_range(100, 1, 500), 100);
    }

    #[test]
    fn patch_serialization_drops_absent_fields() {
        let input = UpdateTenantInput {
            unit_id: None,
            full_name: Some("Asha Wanjiru".to_string()),
            email: None,
            phone_e164: None,
            lease_start_date: None,
            lease_end_date: None,
            monthly_rent: Some(15000.0),
            deposit_amount: None,
        };
        let map = remove_nulls(serialize_to_map(&input));
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("full_name"));
        assert!(map.contains_key("monthly_rent"));
    }
}
