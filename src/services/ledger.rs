//! Tenant financial ledger: lease-month accrual, dues aggregation, snapshot
//! reconciliation, and monthly payment analytics.
//!
//! The cached totals on a tenant row (`total_rent_paid`, `total_utility_paid`,
//! `total_deposit_paid`, `payment_status`) are derived state. They can always
//! be recomputed from the payment log and are only guaranteed fresh right
//! after [`compute_dues_and_reconcile`] runs with `should_reconcile = true`.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::repository::table_service::{get_row, list_rows, update_row};

/// Initial status assigned at onboarding, before the first reconciliation.
pub const STATUS_PENDING: &str = "pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentCategory {
    Rent,
    Utility,
    Deposit,
}

impl PaymentCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rent" => Some(Self::Rent),
            "utility" => Some(Self::Utility),
            "deposit" => Some(Self::Deposit),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Utility => "utility",
            Self::Deposit => "deposit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Pending,
    Completed,
    Failed,
}

impl PaymentState {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Payment-status label cached on the tenant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStanding {
    UpToDate,
    Overdue,
}

impl PaymentStanding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpToDate => "up-to-date",
            Self::Overdue => "overdue",
        }
    }
}

/// One financial event from the payment log.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub tenant_id: String,
    pub category: PaymentCategory,
    pub state: PaymentState,
    pub amount: f64,
    pub paid_at: Option<NaiveDate>,
}

impl PaymentRecord {
    /// Parse a payment row. Rows with an unknown category or status are
    /// skipped rather than failing the whole aggregation.
    pub fn from_row(row: &Value) -> Option<Self> {
        let object = row.as_object()?;
        let tenant_id = object
            .get("tenant_id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())?
            .to_string();
        let category = PaymentCategory::parse(object.get("category").and_then(Value::as_str)?)?;
        let state = PaymentState::parse(object.get("status").and_then(Value::as_str)?)?;
        let amount = number_from_value(object.get("amount"));
        let paid_at = object
            .get("paid_at")
            .and_then(Value::as_str)
            .and_then(parse_date_from_any)
            .or_else(|| {
                object
                    .get("created_at")
                    .and_then(Value::as_str)
                    .and_then(parse_date_from_any)
            });

        Some(Self {
            tenant_id,
            category,
            state,
            amount,
            paid_at,
        })
    }
}

/// Lease terms read off a tenant row. Missing or unparseable fields coalesce
/// to "no lease yet" / zero; they are never an error.
#[derive(Debug, Clone, Default)]
pub struct LeaseTerms {
    pub lease_start_date: Option<NaiveDate>,
    pub monthly_rent: f64,
    pub deposit_amount: f64,
}

impl LeaseTerms {
    pub fn from_row(row: &Value) -> Self {
        let object = row.as_object();
        Self {
            lease_start_date: object
                .and_then(|obj| obj.get("lease_start_date"))
                .and_then(Value::as_str)
                .and_then(parse_date_from_any),
            monthly_rent: number_from_value(object.and_then(|obj| obj.get("monthly_rent"))),
            deposit_amount: number_from_value(object.and_then(|obj| obj.get("deposit_amount"))),
        }
    }
}

/// Computed dues summary. Returned to the caller and partially persisted
/// back onto the tenant row by the reconciler.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DuesSnapshot {
    pub months_stayed: i64,
    pub rent_paid: f64,
    pub utility_paid: f64,
    pub deposit_paid: f64,
    pub rent_due: f64,
    pub utility_due: f64,
    pub deposit_due: f64,
    pub total_remaining: f64,
}

impl DuesSnapshot {
    /// Status label derived from the aggregate remainder. Uses the same
    /// 0.01 settlement tolerance as the rest of the money handling.
    pub fn standing(&self) -> PaymentStanding {
        if self.total_remaining >= 0.01 {
            PaymentStanding::Overdue
        } else {
            PaymentStanding::UpToDate
        }
    }
}

/// One calendar-month bucket of the analytics projection.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MonthBucket {
    pub month: String,
    pub rent: f64,
    pub utility: f64,
    pub deposit: f64,
    pub total: f64,
    pub paid: bool,
}

/// Number of rent-liability months accrued between the lease start and
/// `as_of`, counting the month in progress (rent is due at the start of
/// occupancy). Absent or future lease start yields 0. Pure function of two
/// dates, so repeated calls within one calendar day are identical.
pub fn months_accrued(lease_start: Option<NaiveDate>, as_of: NaiveDate) -> i64 {
    let Some(start) = lease_start else {
        return 0;
    };
    if start > as_of {
        return 0;
    }

    let mut whole_months = i64::from(as_of.year() - start.year()) * 12
        + (i64::from(as_of.month()) - i64::from(start.month()));
    if as_of.day() < start.day() {
        whole_months -= 1;
    }
    whole_months.max(0) + 1
}

/// Aggregate a tenant's dues from the payment log.
///
/// Only this tenant's `completed` payments count. Utility liability is not
/// modeled (no utility bill source exists), so `utility_due` is always 0,
/// but utility payments still credit the aggregate remainder. Read-only:
/// persistence is the reconciler's job.
pub fn compute_dues(
    lease: &LeaseTerms,
    payments: &[PaymentRecord],
    tenant_id: &str,
    as_of: NaiveDate,
) -> DuesSnapshot {
    let mut rent_paid = 0.0;
    let mut utility_paid = 0.0;
    let mut deposit_paid = 0.0;

    for payment in payments {
        if payment.tenant_id != tenant_id || payment.state != PaymentState::Completed {
            continue;
        }
        match payment.category {
            PaymentCategory::Rent => rent_paid += payment.amount,
            PaymentCategory::Utility => utility_paid += payment.amount,
            PaymentCategory::Deposit => deposit_paid += payment.amount,
        }
    }

    let months_stayed = months_accrued(lease.lease_start_date, as_of);
    let rent_liability = lease.monthly_rent * months_stayed as f64;
    let deposit_liability = lease.deposit_amount;

    let total_paid = rent_paid + utility_paid + deposit_paid;
    let total_remaining = ((rent_liability + deposit_liability) - total_paid).max(0.0);

    DuesSnapshot {
        months_stayed,
        rent_paid: round2(rent_paid),
        utility_paid: round2(utility_paid),
        deposit_paid: round2(deposit_paid),
        rent_due: round2((rent_liability - rent_paid).max(0.0)),
        utility_due: 0.0,
        deposit_due: round2((deposit_liability - deposit_paid).max(0.0)),
        total_remaining: round2(total_remaining),
    }
}

/// Bucket a tenant's completed payments into the trailing `months_back`
/// calendar months, oldest to newest, zero-filled. Chart feed only: partial
/// and full months look alike, so this must never feed back into dues.
pub fn project_monthly(
    payments: &[PaymentRecord],
    tenant_id: &str,
    months_back: u32,
    as_of: NaiveDate,
) -> Vec<MonthBucket> {
    let months_back = months_back.max(1);
    let newest = month_ordinal(as_of.year(), as_of.month());
    let oldest = newest - i64::from(months_back) + 1;

    let mut buckets = (0..months_back)
        .map(|offset| MonthBucket {
            month: month_label(oldest + i64::from(offset)),
            rent: 0.0,
            utility: 0.0,
            deposit: 0.0,
            total: 0.0,
            paid: false,
        })
        .collect::<Vec<_>>();

    for payment in payments {
        if payment.tenant_id != tenant_id || payment.state != PaymentState::Completed {
            continue;
        }
        let Some(paid_on) = payment.paid_at else {
            continue;
        };
        let index = month_ordinal(paid_on.year(), paid_on.month()) - oldest;
        if index < 0 || index >= i64::from(months_back) {
            continue;
        }
        let bucket = &mut buckets[index as usize];
        match payment.category {
            PaymentCategory::Rent => bucket.rent += payment.amount,
            PaymentCategory::Utility => bucket.utility += payment.amount,
            PaymentCategory::Deposit => bucket.deposit += payment.amount,
        }
    }

    for bucket in &mut buckets {
        bucket.rent = round2(bucket.rent);
        bucket.utility = round2(bucket.utility);
        bucket.deposit = round2(bucket.deposit);
        bucket.total = round2(bucket.rent + bucket.utility + bucket.deposit);
        bucket.paid = bucket.total > 0.0;
    }

    buckets
}

/// Fetch a tenant's completed payments, oldest first.
pub async fn fetch_completed_payments(
    pool: &PgPool,
    tenant_id: &str,
) -> AppResult<Vec<PaymentRecord>> {
    let mut filters = Map::new();
    filters.insert("tenant_id".to_string(), Value::String(tenant_id.to_string()));
    filters.insert(
        "status".to_string(),
        Value::String(PaymentState::Completed.as_str().to_string()),
    );

    let rows = list_rows(pool, "payments", Some(&filters), 1000, 0, "created_at", true).await?;
    Ok(rows.iter().filter_map(PaymentRecord::from_row).collect())
}

/// The single externally-callable dues operation.
///
/// Looks up the tenant (not-found propagates), aggregates dues from the
/// payment log, and — when `should_reconcile` is set — writes the snapshot
/// back onto the tenant row. The write is an unconditional overwrite:
/// concurrent runs recompute from the same log and converge, so a lost race
/// costs a redundant write, not divergent state. Tenant-facing reads pass
/// `should_reconcile = true`; owner/admin views pass false to avoid write
/// amplification and accept a snapshot as of the last tenant-triggered run.
pub async fn compute_dues_and_reconcile(
    pool: &PgPool,
    tenant_id: &str,
    as_of: NaiveDate,
    should_reconcile: bool,
) -> AppResult<DuesSnapshot> {
    let tenant = get_row(pool, "tenants", tenant_id, "id").await?;
    let lease = LeaseTerms::from_row(&tenant);
    let payments = fetch_completed_payments(pool, tenant_id).await?;
    let dues = compute_dues(&lease, &payments, tenant_id, as_of);

    if should_reconcile {
        // Freshness wins over cache consistency: a failed write is logged
        // and the computed snapshot is still returned. The cache
        // self-corrects on the next successful run.
        if let Err(error) = write_snapshot(pool, tenant_id, &dues).await {
            tracing::warn!(
                tenant_id = %tenant_id,
                error = %error,
                "Snapshot write failed after dues computation"
            );
        }
    }

    Ok(dues)
}

/// Monthly analytics for a tenant, derived from the same payment log.
pub async fn project_tenant_monthly(
    pool: &PgPool,
    tenant_id: &str,
    months_back: u32,
    as_of: NaiveDate,
) -> AppResult<Vec<MonthBucket>> {
    let payments = fetch_completed_payments(pool, tenant_id).await?;
    Ok(project_monthly(&payments, tenant_id, months_back, as_of))
}

/// Persist the cached ledger snapshot onto the tenant row. This is the only
/// place that mutates the tenant's ledger fields.
async fn write_snapshot(pool: &PgPool, tenant_id: &str, dues: &DuesSnapshot) -> AppResult<()> {
    let mut patch = Map::new();
    patch.insert("total_rent_paid".to_string(), json_number(dues.rent_paid));
    patch.insert(
        "total_utility_paid".to_string(),
        json_number(dues.utility_paid),
    );
    patch.insert(
        "total_deposit_paid".to_string(),
        json_number(dues.deposit_paid),
    );
    patch.insert(
        "payment_status".to_string(),
        Value::String(dues.standing().as_str().to_string()),
    );
    patch.insert(
        "updated_at".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );

    update_row(pool, "tenants", tenant_id, &patch, "id").await?;
    Ok(())
}

fn month_ordinal(year: i32, month: u32) -> i64 {
    i64::from(year) * 12 + i64::from(month) - 1
}

fn month_label(ordinal: i64) -> String {
    format!("{:04}-{:02}", ordinal.div_euclid(12), ordinal.rem_euclid(12) + 1)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn json_number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::Number(serde_json::Number::from(0)))
}

fn number_from_value(value: Option<&Value>) -> f64 {
    value
        .and_then(|v| {
            v.as_f64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        })
        .unwrap_or(0.0)
}

/// Accepts both plain dates and RFC 3339 timestamps, truncating to date
/// granularity so the time of day never changes an accrual result.
fn parse_date_from_any(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|timestamp| timestamp.date_naive())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::{
        compute_dues, months_accrued, project_monthly, DuesSnapshot, LeaseTerms, PaymentCategory,
        PaymentRecord, PaymentStanding, PaymentState,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn payment(
        tenant_id: &str,
        category: PaymentCategory,
        state: PaymentState,
        amount: f64,
        paid_at: NaiveDate,
    ) -> PaymentRecord {
        PaymentRecord {
            tenant_id: tenant_id.to_string(),
            category,
            state,
            amount,
            paid_at: Some(paid_at),
        }
    }

    fn lease(start: Option<NaiveDate>, monthly_rent: f64, deposit: f64) -> LeaseTerms {
        LeaseTerms {
            lease_start_date: start,
            monthly_rent,
            deposit_amount: deposit,
        }
    }

    #[test]
    fn accrual_boundaries() {
        let start = Some(date(2024, 1, 15));
        assert_eq!(months_accrued(start, date(2024, 1, 20)), 1);
        assert_eq!(months_accrued(start, date(2024, 2, 20)), 2);
        assert_eq!(months_accrued(start, date(2024, 1, 10)), 0);
        // Month-in-progress before the anniversary day still counts once.
        assert_eq!(months_accrued(start, date(2024, 2, 10)), 1);
        assert_eq!(months_accrued(start, date(2024, 1, 15)), 1);
    }

    #[test]
    fn accrual_without_lease_start_is_zero() {
        assert_eq!(months_accrued(None, date(2024, 6, 1)), 0);
    }

    #[test]
    fn no_lease_start_means_no_debt() {
        let dues = compute_dues(&lease(None, 50000.0, 0.0), &[], "t1", date(2024, 6, 1));
        assert_eq!(dues.months_stayed, 0);
        assert_eq!(dues.rent_due, 0.0);
        assert_eq!(dues.total_remaining, 0.0);
        assert_eq!(dues.standing(), PaymentStanding::UpToDate);
    }

    #[test]
    fn two_unpaid_months_are_overdue_then_settled() {
        let terms = lease(Some(date(2024, 3, 1)), 10000.0, 0.0);
        let as_of = date(2024, 4, 15);

        let dues = compute_dues(&terms, &[], "t1", as_of);
        assert_eq!(dues.months_stayed, 2);
        assert_eq!(dues.total_remaining, 20000.0);
        assert_eq!(dues.standing(), PaymentStanding::Overdue);

        let paid = [payment(
            "t1",
            PaymentCategory::Rent,
            PaymentState::Completed,
            20000.0,
            date(2024, 4, 10),
        )];
        let dues = compute_dues(&terms, &paid, "t1", as_of);
        assert_eq!(dues.total_remaining, 0.0);
        assert_eq!(dues.rent_due, 0.0);
        assert_eq!(dues.standing(), PaymentStanding::UpToDate);
    }

    #[test]
    fn only_completed_payments_for_this_tenant_count() {
        let terms = lease(Some(date(2024, 3, 1)), 10000.0, 0.0);
        let as_of = date(2024, 3, 20);
        let payments = [
            payment("t1", PaymentCategory::Rent, PaymentState::Pending, 10000.0, date(2024, 3, 5)),
            payment("t1", PaymentCategory::Rent, PaymentState::Failed, 10000.0, date(2024, 3, 6)),
            payment("t2", PaymentCategory::Rent, PaymentState::Completed, 10000.0, date(2024, 3, 7)),
        ];

        let dues = compute_dues(&terms, &payments, "t1", as_of);
        assert_eq!(dues.rent_paid, 0.0);
        assert_eq!(dues.rent_due, 10000.0);
    }

    #[test]
    fn dues_are_never_negative() {
        let terms = lease(Some(date(2024, 3, 1)), 10000.0, 5000.0);
        // Overpaid on every category.
        let payments = [
            payment("t1", PaymentCategory::Rent, PaymentState::Completed, 90000.0, date(2024, 3, 2)),
            payment("t1", PaymentCategory::Deposit, PaymentState::Completed, 9000.0, date(2024, 3, 2)),
            payment("t1", PaymentCategory::Utility, PaymentState::Completed, 700.0, date(2024, 3, 2)),
        ];
        let dues = compute_dues(&terms, &payments, "t1", date(2024, 3, 20));
        assert!(dues.rent_due >= 0.0);
        assert!(dues.deposit_due >= 0.0);
        assert!(dues.total_remaining >= 0.0);
        assert_eq!(dues.standing(), PaymentStanding::UpToDate);
    }

    #[test]
    fn utility_payments_credit_the_aggregate_remainder() {
        // utility_due stays 0, but a utility payment still reduces
        // total_remaining.
        let terms = lease(Some(date(2024, 3, 1)), 10000.0, 0.0);
        let payments = [payment(
            "t1",
            PaymentCategory::Utility,
            PaymentState::Completed,
            3000.0,
            date(2024, 3, 5),
        )];
        let dues = compute_dues(&terms, &payments, "t1", date(2024, 3, 20));
        assert_eq!(dues.utility_due, 0.0);
        assert_eq!(dues.rent_due, 10000.0);
        assert_eq!(dues.total_remaining, 7000.0);
    }

    #[test]
    fn computation_is_idempotent() {
        let terms = lease(Some(date(2024, 1, 15)), 12500.0, 25000.0);
        let payments = [
            payment("t1", PaymentCategory::Rent, PaymentState::Completed, 12500.0, date(2024, 1, 16)),
            payment("t1", PaymentCategory::Deposit, PaymentState::Completed, 25000.0, date(2024, 1, 16)),
        ];
        let as_of = date(2024, 2, 20);
        let first = compute_dues(&terms, &payments, "t1", as_of);
        let second = compute_dues(&terms, &payments, "t1", as_of);
        assert_eq!(first, second);
    }

    #[test]
    fn rent_payment_never_increases_rent_due() {
        let terms = lease(Some(date(2024, 1, 1)), 10000.0, 0.0);
        let as_of = date(2024, 4, 10);
        let mut payments = Vec::new();
        let mut previous = compute_dues(&terms, &payments, "t1", as_of).rent_due;
        for step in 0..6 {
            payments.push(payment(
                "t1",
                PaymentCategory::Rent,
                PaymentState::Completed,
                9000.0,
                date(2024, 1, 2 + step),
            ));
            let current = compute_dues(&terms, &payments, "t1", as_of).rent_due;
            assert!(current <= previous, "rent_due went up after a payment");
            previous = current;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn monthly_projection_keeps_categories_separate() {
        let payments = [
            payment("t1", PaymentCategory::Rent, PaymentState::Completed, 10000.0, date(2024, 3, 4)),
            payment("t1", PaymentCategory::Utility, PaymentState::Completed, 500.0, date(2024, 3, 18)),
        ];
        let buckets = project_monthly(&payments, "t1", 3, date(2024, 4, 30));
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].month, "2024-02");
        assert_eq!(buckets[1].month, "2024-03");
        assert_eq!(buckets[2].month, "2024-04");

        let march = &buckets[1];
        assert_eq!(march.rent, 10000.0);
        assert_eq!(march.utility, 500.0);
        assert_eq!(march.deposit, 0.0);
        assert_eq!(march.total, 10500.0);
        assert!(march.paid);

        assert!(!buckets[0].paid);
        assert_eq!(buckets[0].total, 0.0);
    }

    #[test]
    fn monthly_projection_zero_fills_and_crosses_years() {
        let payments = [payment(
            "t1",
            PaymentCategory::Rent,
            PaymentState::Completed,
            8000.0,
            date(2023, 12, 28),
        )];
        let buckets = project_monthly(&payments, "t1", 4, date(2024, 2, 10));
        let months = buckets.iter().map(|b| b.month.as_str()).collect::<Vec<_>>();
        assert_eq!(months, ["2023-11", "2023-12", "2024-01", "2024-02"]);
        assert_eq!(buckets[1].rent, 8000.0);
        assert!(buckets[1].paid);
        assert!(buckets.iter().filter(|b| b.paid).count() == 1);
    }

    #[test]
    fn monthly_projection_ignores_pending_and_other_tenants() {
        let payments = [
            payment("t1", PaymentCategory::Rent, PaymentState::Pending, 10000.0, date(2024, 3, 4)),
            payment("t2", PaymentCategory::Rent, PaymentState::Completed, 10000.0, date(2024, 3, 4)),
        ];
        let buckets = project_monthly(&payments, "t1", 2, date(2024, 3, 31));
        assert!(buckets.iter().all(|b| !b.paid && b.total == 0.0));
    }

    #[test]
    fn parses_payment_and_lease_rows() {
        let row = json!({
            "tenant_id": "t1",
            "category": "rent",
            "status": "completed",
            "amount": "12500.50",
            "paid_at": "2024-03-04T09:30:00+03:00",
        });
        let record = PaymentRecord::from_row(&row).unwrap();
        assert_eq!(record.category, PaymentCategory::Rent);
        assert_eq!(record.state, PaymentState::Completed);
        assert_eq!(record.amount, 12500.50);
        assert_eq!(record.paid_at, Some(date(2024, 3, 4)));

        let malformed = json!({
            "tenant_id": "t1",
            "category": "airtime",
            "status": "completed",
            "amount": 10,
        });
        assert!(PaymentRecord::from_row(&malformed).is_none());

        let tenant = json!({
            "lease_start_date": "not-a-date",
            "monthly_rent": 10000,
        });
        let terms = LeaseTerms::from_row(&tenant);
        assert!(terms.lease_start_date.is_none());
        assert_eq!(terms.monthly_rent, 10000.0);
        assert_eq!(terms.deposit_amount, 0.0);
    }

    #[test]
    fn snapshot_standing_uses_settlement_tolerance() {
        let mut dues = DuesSnapshot {
            months_stayed: 1,
            rent_paid: 10000.0,
            utility_paid: 0.0,
            deposit_paid: 0.0,
            rent_due: 0.0,
            utility_due: 0.0,
            deposit_due: 0.0,
            total_remaining: 0.0,
        };
        assert_eq!(dues.standing(), PaymentStanding::UpToDate);
        dues.total_remaining = 0.005;
        assert_eq!(dues.standing(), PaymentStanding::UpToDate);
        dues.total_remaining = 0.01;
        assert_eq!(dues.standing(), PaymentStanding::Overdue);
    }
}
