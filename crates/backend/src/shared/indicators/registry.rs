use contracts::dashboards::d100_sales_funnel::RoleView;
use contracts::enums::user_role::{UserRole, ViewKind};
use contracts::shared::indicators::{BaselineStrategy, MetricKey};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

use super::compute::funnel::MetricSnapshot;

use MetricKey::*;

const MANAGER_METRICS: &[MetricKey] = &[
    LeadsCreated,
    AppointmentsBooked,
    VisitsCompleted,
    SalesClosed,
    SalesVolume,
    AppointmentsToLeads,
    VisitsToAppointments,
    SalesToVisits,
];

const MARKETING_METRICS: &[MetricKey] = &[LeadsCreated, AppointmentsBooked, AppointmentsToLeads];

const CONSULTANT_METRICS: &[MetricKey] = &[
    LeadsCreated,
    AppointmentsBooked,
    VisitsCompleted,
    AppointmentsToLeads,
    VisitsToAppointments,
];

const BROKER_METRICS: &[MetricKey] = &[
    VisitsCompleted,
    SalesClosed,
    SalesVolume,
    VisitsToAppointments,
    SalesToVisits,
];

const EXECUTIVE_METRICS: &[MetricKey] = &[
    SalesClosed,
    SalesVolume,
    AppointmentsToLeads,
    VisitsToAppointments,
    SalesToVisits,
];

/// Role -> view table. Every role has exactly one entry.
static ROLE_VIEWS: Lazy<HashMap<UserRole, ViewKind>> = Lazy::new(|| {
    HashMap::from([
        (UserRole::Manager, ViewKind::Manager),
        (UserRole::Marketing, ViewKind::Marketing),
        (UserRole::Consultant, ViewKind::Consultant),
        (UserRole::BrokerSenior, ViewKind::Broker),
        (UserRole::BrokerJunior, ViewKind::Broker),
        (UserRole::BrokerTrainee, ViewKind::Broker),
        (UserRole::Executive, ViewKind::Executive),
    ])
});

/// View used for roles that are not in the table
pub const FALLBACK_VIEW: ViewKind = ViewKind::Manager;

/// Visible metrics and default baseline of a view
#[derive(Debug, Clone, Copy)]
pub struct ViewProfile {
    pub metrics: &'static [MetricKey],
    pub baseline: BaselineStrategy,
}

pub fn profile(view: ViewKind) -> ViewProfile {
    match view {
        ViewKind::Manager => ViewProfile {
            metrics: MANAGER_METRICS,
            baseline: BaselineStrategy::TeamAverage,
        },
        ViewKind::Marketing => ViewProfile {
            metrics: MARKETING_METRICS,
            baseline: BaselineStrategy::TeamAverage,
        },
        ViewKind::Consultant => ViewProfile {
            metrics: CONSULTANT_METRICS,
            baseline: BaselineStrategy::TeamAverage,
        },
        ViewKind::Broker => ViewProfile {
            metrics: BROKER_METRICS,
            baseline: BaselineStrategy::TeamAverage,
        },
        // executives follow company totals, not peers
        ViewKind::Executive => ViewProfile {
            metrics: EXECUTIVE_METRICS,
            baseline: BaselineStrategy::PreviousPeriod,
        },
    }
}

pub fn visible_metrics(view: ViewKind) -> &'static [MetricKey] {
    profile(view).metrics
}

pub fn resolve_role(role: &str) -> Option<UserRole> {
    UserRole::from_code(role)
}

/// Unknown or unmapped roles resolve to the manager view.
pub fn resolve_view(role: &str) -> ViewKind {
    resolve_role(role)
        .and_then(|r| ROLE_VIEWS.get(&r).copied())
        .unwrap_or(FALLBACK_VIEW)
}

/// Arithmetic mean of `key` over `peers`; `0` without peers.
pub fn team_average(key: MetricKey, peers: &[MetricSnapshot]) -> f64 {
    if peers.is_empty() {
        return 0.0;
    }
    let sum: f64 = peers.iter().map(|p| p.value(key)).sum();
    sum / peers.len() as f64
}

/// Restrict the metric set to what `role` may see and attach its baselines.
///
/// `peers` are the current-month snapshots of the other active users (the
/// requesting user must already be excluded), `previous` is the snapshot of
/// the month before the current one. `strategy` overrides the view's default
/// baseline.
pub fn project(
    role: &str,
    peers: &[MetricSnapshot],
    previous: Option<&MetricSnapshot>,
    strategy: Option<BaselineStrategy>,
) -> RoleView {
    let resolved_role = resolve_role(role);
    let view = resolve_view(role);
    let profile = profile(view);
    let baseline_strategy = strategy.unwrap_or(profile.baseline);

    let averages: BTreeMap<MetricKey, f64> = profile
        .metrics
        .iter()
        .map(|key| (*key, team_average(*key, peers)))
        .collect();

    let baseline = match baseline_strategy {
        BaselineStrategy::TeamAverage => averages.clone(),
        BaselineStrategy::PreviousPeriod => profile
            .metrics
            .iter()
            .map(|key| (*key, previous.map(|p| p.value(*key)).unwrap_or(0.0)))
            .collect(),
    };

    RoleView {
        requested_role: role.to_string(),
        resolved_role,
        view,
        visible_metrics: profile.metrics.to_vec(),
        baseline_strategy,
        baseline,
        team_average: averages,
        peer_count: peers.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::dashboards::d100_sales_funnel::MetricBucket;
    use contracts::shared::period::Month;

    fn snapshot(leads: u64, appts: u64, visits: u64, sales: u64, volume: f64) -> MetricSnapshot {
        MetricSnapshot::from_bucket(MetricBucket {
            period: Month::new(2025, 6).unwrap(),
            leads_created: leads,
            appointments_booked: appts,
            visits_completed: visits,
            sales_closed: sales,
            sales_volume: volume,
        })
    }

    #[test]
    fn test_every_role_has_a_view() {
        for role in UserRole::all() {
            assert!(ROLE_VIEWS.contains_key(&role), "{:?} is unmapped", role);
        }
    }

    #[test]
    fn test_unknown_roles_fall_back_to_manager() {
        for role in ["", "admin", "corretor", "broker"] {
            let view = project(role, &[], None, None);
            assert_eq!(view.view, ViewKind::Manager);
            assert_eq!(view.resolved_role, None);
            assert_eq!(view.visible_metrics, MANAGER_METRICS.to_vec());
        }
    }

    #[test]
    fn test_broker_tiers_share_the_broker_view() {
        let trainee = project("broker-trainee", &[], None, None);
        let senior = project("broker-senior", &[], None, None);
        assert_eq!(trainee.view, ViewKind::Broker);
        assert_eq!(senior.view, ViewKind::Broker);
        assert_eq!(trainee.visible_metrics, senior.visible_metrics);
        assert_eq!(resolve_view("broker-junior"), ViewKind::Broker);
    }

    #[test]
    fn test_team_average_is_mean_of_peers() {
        let peers = vec![
            snapshot(100, 40, 20, 5, 1_000_000.0),
            snapshot(50, 10, 10, 1, 200_000.0),
        ];
        let view = project("broker-senior", &peers, None, None);
        assert_eq!(view.peer_count, 2);
        assert_eq!(view.team_average[&SalesClosed], 3.0);
        assert_eq!(view.team_average[&SalesVolume], 600_000.0);
        // (0.25 + 0.1) / 2
        assert!((view.team_average[&SalesToVisits] - 0.175).abs() < 1e-9);
        // only visible metrics get a baseline
        assert!(!view.team_average.contains_key(&LeadsCreated));
        assert_eq!(view.baseline_strategy, BaselineStrategy::TeamAverage);
        assert_eq!(view.baseline, view.team_average);
    }

    #[test]
    fn test_team_average_without_peers_is_zero() {
        let view = project("manager", &[], None, None);
        assert!(view.team_average.values().all(|v| *v == 0.0));
        assert_eq!(view.team_average.len(), MANAGER_METRICS.len());
    }

    #[test]
    fn test_projection_is_deterministic() {
        let peers = vec![snapshot(10, 5, 2, 1, 300_000.0)];
        let previous = snapshot(8, 4, 2, 0, 0.0);
        assert_eq!(
            project("consultant", &peers, Some(&previous), None),
            project("consultant", &peers, Some(&previous), None)
        );
    }

    #[test]
    fn test_previous_period_baseline() {
        let peers = vec![snapshot(100, 40, 20, 5, 2_000_000.0)];
        let previous = snapshot(10, 4, 2, 1, 400_000.0);

        let view = project("broker-junior", &peers, Some(&previous), Some(BaselineStrategy::PreviousPeriod));
        assert_eq!(view.baseline_strategy, BaselineStrategy::PreviousPeriod);
        assert_eq!(view.baseline[&SalesClosed], 1.0);
        assert_eq!(view.baseline[&SalesVolume], 400_000.0);
        assert!((view.baseline[&SalesToVisits] - 0.5).abs() < 1e-9);
        // the team average is still reported
        assert_eq!(view.team_average[&SalesClosed], 5.0);
    }

    #[test]
    fn test_executive_defaults_to_previous_period() {
        let previous = snapshot(10, 4, 2, 1, 400_000.0);
        let view = project("executive", &[], Some(&previous), None);
        assert_eq!(view.view, ViewKind::Executive);
        assert_eq!(view.baseline_strategy, BaselineStrategy::PreviousPeriod);
        assert_eq!(view.baseline[&SalesClosed], 1.0);

        // no previous month known: zero baseline
        let view = project("executive", &[], None, None);
        assert!(view.baseline.values().all(|v| *v == 0.0));
    }
}
