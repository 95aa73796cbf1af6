use async_trait::async_trait;
use contracts::dashboards::d100_sales_funnel::MetricBucket;
use contracts::shared::period::{Month, MonthRange};
use contracts::system::users::User;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::time::Duration;

use super::error::DashboardError;

/// Whose activity the counts belong to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricScope {
    Team,
    User(String),
}

/// Store holding the funnel tables.
///
/// `get_counts` may return months in any order, omit empty months, or split a
/// month in several rows; [`fetch_buckets`] normalizes that.
#[async_trait]
pub trait MetricStore: Send + Sync {
    async fn get_counts(
        &self,
        range: &MonthRange,
        scope: &MetricScope,
    ) -> anyhow::Result<Vec<MetricBucket>>;

    /// Same counts as `get_counts`, split by user, in one round trip.
    async fn get_counts_by_user(
        &self,
        range: &MonthRange,
    ) -> anyhow::Result<HashMap<String, Vec<MetricBucket>>>;

    async fn list_active_users(&self) -> anyhow::Result<Vec<User>>;
}

/// `start <= end` and at most `max_window_months` months.
pub fn validate_range(range: &MonthRange, max_window_months: u32) -> Result<(), DashboardError> {
    if !range.is_ordered() {
        return Err(DashboardError::InvalidRange(format!(
            "start {} is after end {}",
            range.start, range.end
        )));
    }
    if range.len() > max_window_months as usize {
        return Err(DashboardError::InvalidRange(format!(
            "{} months requested, at most {} allowed",
            range.len(),
            max_window_months
        )));
    }
    Ok(())
}

/// One bucket per month of `range`, in order; missing months are zero-filled.
/// Rows outside the range are dropped, duplicate months are summed.
pub fn zero_fill(range: &MonthRange, raw: Vec<MetricBucket>) -> Vec<MetricBucket> {
    let mut by_month: BTreeMap<Month, MetricBucket> = range
        .months()
        .into_iter()
        .map(|m| (m, MetricBucket::empty(m)))
        .collect();

    for bucket in raw {
        match by_month.get_mut(&bucket.period) {
            Some(slot) => slot.absorb(&bucket),
            None => tracing::debug!("Dropping bucket {} outside {}..{}", bucket.period, range.start, range.end),
        }
    }

    by_month.into_values().collect()
}

async fn with_timeout<T, F>(what: &str, timeout: Duration, fut: F) -> Result<T, DashboardError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(DashboardError::DataUnavailable(format!("{what}: {e:#}"))),
        Err(_) => Err(DashboardError::DataUnavailable(format!(
            "{what}: timed out after {}s",
            timeout.as_secs_f64()
        ))),
    }
}

/// Fetch the full month sequence for `range` or fail; never a partial range.
pub async fn fetch_buckets(
    store: &dyn MetricStore,
    range: &MonthRange,
    scope: &MetricScope,
    timeout: Duration,
) -> Result<Vec<MetricBucket>, DashboardError> {
    let raw = with_timeout("metric counts", timeout, store.get_counts(range, scope)).await?;
    Ok(zero_fill(range, raw))
}

/// Per-user month sequences for `range`, zero-filled like [`fetch_buckets`].
pub async fn fetch_user_buckets(
    store: &dyn MetricStore,
    range: &MonthRange,
    timeout: Duration,
) -> Result<HashMap<String, Vec<MetricBucket>>, DashboardError> {
    let raw = with_timeout("per-user metric counts", timeout, store.get_counts_by_user(range)).await?;
    Ok(raw
        .into_iter()
        .map(|(user_id, buckets)| (user_id, zero_fill(range, buckets)))
        .collect())
}

/// Bound a whole sequence of store calls by one deadline.
pub async fn within_deadline<T, F>(timeout: Duration, fut: F) -> Result<T, DashboardError>
where
    F: Future<Output = Result<T, DashboardError>>,
{
    tokio::time::timeout(timeout, fut).await.unwrap_or_else(|_| {
        Err(DashboardError::DataUnavailable(format!(
            "metric store: timed out after {}s",
            timeout.as_secs_f64()
        )))
    })
}

pub async fn fetch_active_users(
    store: &dyn MetricStore,
    timeout: Duration,
) -> Result<Vec<User>, DashboardError> {
    with_timeout("active users", timeout, store.list_active_users()).await
}
