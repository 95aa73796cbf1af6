use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::enums::user_role::{UserRole, ViewKind};
use crate::shared::indicators::{BaselineStrategy, FormattedMetric, MetricKey};
use crate::shared::period::Month;

/// Raw funnel counts for one calendar month.
///
/// Closed months never change; only the open month is updated by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBucket {
    pub period: Month,
    pub leads_created: u64,
    pub appointments_booked: u64,
    pub visits_completed: u64,
    pub sales_closed: u64,
    /// Sum of closed sale values (BRL).
    pub sales_volume: f64,
}

impl MetricBucket {
    /// Bucket for a month without activity
    pub fn empty(period: Month) -> Self {
        Self {
            period,
            leads_created: 0,
            appointments_booked: 0,
            visits_completed: 0,
            sales_closed: 0,
            sales_volume: 0.0,
        }
    }

    /// Add another bucket's counts into this one (period is kept).
    pub fn absorb(&mut self, other: &MetricBucket) {
        self.leads_created += other.leads_created;
        self.appointments_booked += other.appointments_booked;
        self.visits_completed += other.visits_completed;
        self.sales_closed += other.sales_closed;
        self.sales_volume += other.sales_volume;
    }
}

/// Stage-to-stage conversion ratios, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionRates {
    pub appointments_to_leads: f64,
    pub visits_to_appointments: f64,
    pub sales_to_visits: f64,
}

/// Metrics and comparison baseline exposed to a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleView {
    /// Role exactly as requested
    pub requested_role: String,
    /// `None` when the requested role is unknown and the manager view was used
    pub resolved_role: Option<UserRole>,
    pub view: ViewKind,
    pub visible_metrics: Vec<MetricKey>,
    /// What `baseline` holds
    pub baseline_strategy: BaselineStrategy,
    /// Comparison value of each visible metric, per `baseline_strategy`
    pub baseline: BTreeMap<MetricKey, f64>,
    /// Mean of each visible metric over the other active users
    pub team_average: BTreeMap<MetricKey, f64>,
    /// How many users the team average was computed over
    pub peer_count: usize,
}

/// Query for the sales funnel dashboard
/// `GET /api/d100/sales_funnel?role=broker-senior&user_id=...&start=2025-01&end=2025-06`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesFunnelRequest {
    pub role: String,
    /// Missing user means team-wide numbers
    #[serde(default)]
    pub user_id: Option<String>,
    /// First month, `"YYYY-MM"`
    pub start: String,
    /// Last month (inclusive), `"YYYY-MM"`
    pub end: String,
}

/// Response for the sales funnel dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesFunnelResponse {
    /// Rates of the last month in range
    pub current: ConversionRates,
    /// One entry per month in range, parallel to `periods`
    pub series: Vec<ConversionRates>,
    pub periods: Vec<Month>,
    pub role_view: RoleView,
    /// Visible metrics formatted against the team average
    pub metrics: Vec<FormattedMetric>,
}

/// Error body returned by dashboard endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardErrorResponse {
    /// `data_unavailable` | `invalid_range`
    pub error: String,
    pub message: String,
}
