use contracts::dashboards::d100_sales_funnel::{MetricBucket, SalesFunnelRequest, SalesFunnelResponse};
use contracts::shared::indicators::BaselineStrategy;
use contracts::shared::period::{Month, MonthRange};
use std::time::Duration;

use super::error::DashboardError;
use super::source::{self, MetricScope, MetricStore};
use crate::shared::config::DashboardConfig;
use crate::shared::indicators::compute::funnel::{self, MetricSnapshot};
use crate::shared::indicators::{registry, trend};

/// Per-request limits, taken from `[dashboard]` in config.toml
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub max_window_months: u32,
    pub trend_epsilon: f64,
    pub fetch_timeout: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for DashboardSettings {
    fn from(cfg: &DashboardConfig) -> Self {
        Self {
            max_window_months: cfg.max_window_months,
            trend_epsilon: cfg.trend_epsilon,
            fetch_timeout: cfg.fetch_timeout(),
        }
    }
}

fn parse_range(start: &str, end: &str) -> Result<MonthRange, DashboardError> {
    let start = Month::parse(start).map_err(|e| DashboardError::InvalidRange(e.to_string()))?;
    let end = Month::parse(end).map_err(|e| DashboardError::InvalidRange(e.to_string()))?;
    Ok(MonthRange::new(start, end))
}

/// Current-month snapshots of every active user except `exclude`, from one
/// grouped round trip.
async fn peer_snapshots(
    store: &dyn MetricStore,
    month: Month,
    exclude: Option<&str>,
    timeout: Duration,
) -> Result<Vec<MetricSnapshot>, DashboardError> {
    let users = source::fetch_active_users(store, timeout).await?;
    let mut by_user = source::fetch_user_buckets(store, &MonthRange::single(month), timeout).await?;

    Ok(users
        .iter()
        .filter(|u| Some(u.id.as_str()) != exclude)
        .map(|u| {
            let bucket = by_user
                .remove(&u.id)
                .and_then(|buckets| buckets.into_iter().next())
                .unwrap_or_else(|| MetricBucket::empty(month));
            MetricSnapshot::from_bucket(bucket)
        })
        .collect())
}

/// Sales funnel for one user (or the whole team) over a month range.
///
/// fetch -> funnel -> role projection -> formatting; any store failure fails
/// the whole request. All store calls share one `fetch_timeout` deadline.
///
/// Team scope has no peer of its own kind, so team totals are compared with
/// the team's previous month instead of a per-user mean.
pub async fn get_sales_funnel(
    store: &dyn MetricStore,
    settings: &DashboardSettings,
    request: &SalesFunnelRequest,
) -> Result<SalesFunnelResponse, DashboardError> {
    let range = parse_range(&request.start, &request.end)?;
    source::validate_range(&range, settings.max_window_months)?;

    let user_id = request
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let scope = match user_id {
        Some(id) => MetricScope::User(id.to_string()),
        None => MetricScope::Team,
    };

    // one month earlier than requested, for the previous-period baseline
    let fetch_range = MonthRange::new(range.start.previous(), range.end);
    let timeout = settings.fetch_timeout;
    let (fetched, peers) = source::within_deadline(timeout, async {
        let buckets = source::fetch_buckets(store, &fetch_range, &scope, timeout).await?;
        let peers = peer_snapshots(store, range.end, user_id, timeout).await?;
        Ok::<_, DashboardError>((buckets, peers))
    })
    .await?;

    // zero-filled: the month before `end` is second to last
    let previous = fetched
        .iter()
        .rev()
        .nth(1)
        .cloned()
        .unwrap_or_else(|| MetricBucket::empty(range.end.previous()));
    let buckets: Vec<MetricBucket> = fetched.into_iter().skip(1).collect();
    let funnel = funnel::compute_funnel(&buckets);

    let latest = buckets
        .last()
        .cloned()
        .unwrap_or_else(|| MetricBucket::empty(range.end));
    let own = MetricSnapshot::from_bucket(latest);
    let previous = MetricSnapshot::from_bucket(previous);

    let strategy = match scope {
        MetricScope::Team => Some(BaselineStrategy::PreviousPeriod),
        MetricScope::User(_) => None,
    };
    let role_view = registry::project(&request.role, &peers, Some(&previous), strategy);
    let metrics = trend::format_visible(&role_view, &own, settings.trend_epsilon);

    Ok(SalesFunnelResponse {
        current: funnel.current,
        series: funnel.series,
        periods: buckets.iter().map(|b| b.period).collect(),
        role_view,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d100_sales_funnel::source::fake::{user, FakeStore};
    use contracts::dashboards::d100_sales_funnel::ConversionRates;
    use contracts::enums::user_role::ViewKind;
    use contracts::shared::indicators::{MetricKey, TrendDirection};

    fn m(month: u32) -> Month {
        Month::new(2025, month).unwrap()
    }

    fn bucket(month: u32, leads: u64, appts: u64, visits: u64, sales: u64) -> MetricBucket {
        MetricBucket {
            period: m(month),
            leads_created: leads,
            appointments_booked: appts,
            visits_completed: visits,
            sales_closed: sales,
            sales_volume: sales as f64 * 400_000.0,
        }
    }

    fn request(role: &str, user_id: Option<&str>, start: &str, end: &str) -> SalesFunnelRequest {
        SalesFunnelRequest {
            role: role.into(),
            user_id: user_id.map(Into::into),
            start: start.into(),
            end: end.into(),
        }
    }

    fn store() -> FakeStore {
        let mut store = FakeStore::default()
            .with_buckets(
                MetricScope::User("u1".into()),
                vec![bucket(1, 100, 40, 20, 5), bucket(3, 50, 21, 10, 3)],
            )
            .with_buckets(MetricScope::User("u2".into()), vec![bucket(3, 40, 20, 10, 2)])
            .with_buckets(MetricScope::User("u3".into()), vec![bucket(3, 60, 20, 10, 2)])
            .with_buckets(
                MetricScope::Team,
                vec![
                    bucket(1, 100, 40, 20, 5),
                    bucket(2, 80, 30, 15, 5),
                    bucket(3, 150, 61, 30, 7),
                ],
            );
        store.users = vec![
            user("u1", "broker-senior"),
            user("u2", "broker-junior"),
            user("u3", "broker-trainee"),
        ];
        store
    }

    #[tokio::test]
    async fn test_user_funnel_with_team_average() {
        let store = store();
        let response = get_sales_funnel(
            &store,
            &DashboardSettings::default(),
            &request("broker-senior", Some("u1"), "2025-01", "2025-03"),
        )
        .await
        .unwrap();

        assert_eq!(response.periods, vec![m(1), m(2), m(3)]);
        assert_eq!(response.series.len(), 3);
        // February had no activity and is reported as zeros
        assert_eq!(response.series[1], ConversionRates::default());
        assert_eq!(response.current, response.series[2]);

        let view = &response.role_view;
        assert_eq!(view.view, ViewKind::Broker);
        // u1 excluded: mean of u2 and u3
        assert_eq!(view.peer_count, 2);
        assert_eq!(view.team_average[&MetricKey::SalesClosed], 2.0);

        let sales = response
            .metrics
            .iter()
            .find(|f| f.key == MetricKey::SalesClosed)
            .unwrap();
        assert_eq!(sales.value, 3.0);
        assert_eq!(sales.trend, TrendDirection::Up);
        assert!((sales.percent_difference - 0.5).abs() < 1e-9);
        assert_eq!(response.metrics.len(), view.visible_metrics.len());
    }

    #[tokio::test]
    async fn test_team_scope_averages_over_all_active_users() {
        let store = store();
        let response = get_sales_funnel(
            &store,
            &DashboardSettings::default(),
            &request("manager", None, "2025-03", "2025-03"),
        )
        .await
        .unwrap();

        assert_eq!(response.series, vec![response.current]);
        let view = &response.role_view;
        assert_eq!(view.peer_count, 3);
        assert_eq!(view.view, ViewKind::Manager);
        assert_eq!(response.metrics.len(), MetricKey::all().len());

        // team totals against the team's own February, not a per-user mean
        assert_eq!(view.baseline_strategy, BaselineStrategy::PreviousPeriod);
        assert_eq!(view.baseline[&MetricKey::SalesClosed], 5.0);
        assert!((view.team_average[&MetricKey::SalesClosed] - 7.0 / 3.0).abs() < 1e-9);

        let sales = response
            .metrics
            .iter()
            .find(|f| f.key == MetricKey::SalesClosed)
            .unwrap();
        assert_eq!(sales.value, 7.0);
        assert_eq!(sales.trend, TrendDirection::Up);
        assert!((sales.percent_difference - 0.4).abs() < 1e-9);

        let leads = response
            .metrics
            .iter()
            .find(|f| f.key == MetricKey::LeadsCreated)
            .unwrap();
        assert_eq!(leads.value, 150.0);
        assert!((leads.percent_difference - 0.875).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_executive_compares_with_previous_month() {
        let store = store();
        let response = get_sales_funnel(
            &store,
            &DashboardSettings::default(),
            &request("executive", Some("u1"), "2025-01", "2025-03"),
        )
        .await
        .unwrap();

        let view = &response.role_view;
        assert_eq!(view.baseline_strategy, BaselineStrategy::PreviousPeriod);
        // u1 had no February activity
        assert!(view.baseline.values().all(|v| *v == 0.0));
        let sales = response
            .metrics
            .iter()
            .find(|f| f.key == MetricKey::SalesClosed)
            .unwrap();
        assert_eq!(sales.trend, TrendDirection::Up);
        assert_eq!(sales.percent_difference, 0.0);
    }

    #[tokio::test]
    async fn test_store_round_trips_do_not_grow_with_peers() {
        let mut store = store();
        for i in 4..20 {
            store.users.push(user(&format!("u{i}"), "consultant"));
        }
        let response = get_sales_funnel(
            &store,
            &DashboardSettings::default(),
            &request("consultant", Some("u2"), "2025-01", "2025-03"),
        )
        .await
        .unwrap();

        assert_eq!(response.role_view.peer_count, 18);
        // own counts, active users, per-user counts
        assert_eq!(store.call_count(), 3);
    }

    #[tokio::test]
    async fn test_one_deadline_for_the_whole_request() {
        let store = FakeStore {
            delay: Some(Duration::from_millis(60)),
            ..store()
        };
        let settings = DashboardSettings {
            fetch_timeout: Duration::from_millis(100),
            ..Default::default()
        };
        let result = get_sales_funnel(
            &store,
            &settings,
            &request("manager", Some("u1"), "2025-03", "2025-03"),
        )
        .await;
        // each call fits the timeout, the three together do not
        assert!(matches!(result, Err(DashboardError::DataUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unknown_role_gets_manager_view() {
        let store = store();
        let response = get_sales_funnel(
            &store,
            &DashboardSettings::default(),
            &request("estagiario", Some("u1"), "2025-03", "2025-03"),
        )
        .await
        .unwrap();
        assert_eq!(response.role_view.view, ViewKind::Manager);
        assert_eq!(response.role_view.resolved_role, None);
    }

    #[tokio::test]
    async fn test_invalid_ranges_are_rejected_before_fetch() {
        // a failing store proves nothing was fetched
        let store = FakeStore {
            fail: true,
            ..Default::default()
        };
        let settings = DashboardSettings {
            max_window_months: 6,
            ..Default::default()
        };

        let cases = [
            ("2025-05", "2025-01"),
            ("2024-01", "2025-01"),
            ("2025-1", "2025-02"),
            ("2025-03-garbage", "2025-04"),
        ];
        for (start, end) in cases {
            let result =
                get_sales_funnel(&store, &settings, &request("manager", None, start, end)).await;
            assert!(
                matches!(result, Err(DashboardError::InvalidRange(_))),
                "{start}..{end} should be invalid"
            );
        }
    }

    #[tokio::test]
    async fn test_store_failure_returns_no_data() {
        let store = FakeStore {
            fail: true,
            ..Default::default()
        };
        let result = get_sales_funnel(
            &store,
            &DashboardSettings::default(),
            &request("manager", None, "2025-01", "2025-02"),
        )
        .await;
        assert!(matches!(result, Err(DashboardError::DataUnavailable(_))));
    }

    #[tokio::test]
    async fn test_same_input_same_output() {
        let store = store();
        let req = request("consultant", Some("u2"), "2025-01", "2025-03");
        let settings = DashboardSettings::default();
        let first = get_sales_funnel(&store, &settings, &req).await.unwrap();
        let second = get_sales_funnel(&store, &settings, &req).await.unwrap();
        assert_eq!(first.series, second.series);
        assert_eq!(first.role_view, second.role_view);
        assert_eq!(first.metrics, second.metrics);
    }
}
