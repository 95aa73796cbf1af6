use serde::{Deserialize, Serialize};

use crate::enums::user_role::ViewKind;

// ---------------------------------------------------------------------------
// Metric identity & display metadata
// ---------------------------------------------------------------------------

/// Every metric a dashboard can show: raw funnel counts, sales volume and
/// the three conversion rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    LeadsCreated,
    AppointmentsBooked,
    VisitsCompleted,
    SalesClosed,
    SalesVolume,
    AppointmentsToLeads,
    VisitsToAppointments,
    SalesToVisits,
}

impl MetricKey {
    pub fn code(&self) -> &'static str {
        match self {
            MetricKey::LeadsCreated => "leads_created",
            MetricKey::AppointmentsBooked => "appointments_booked",
            MetricKey::VisitsCompleted => "visits_completed",
            MetricKey::SalesClosed => "sales_closed",
            MetricKey::SalesVolume => "sales_volume",
            MetricKey::AppointmentsToLeads => "appointments_to_leads",
            MetricKey::VisitsToAppointments => "visits_to_appointments",
            MetricKey::SalesToVisits => "sales_to_visits",
        }
    }

    pub fn all() -> Vec<MetricKey> {
        vec![
            MetricKey::LeadsCreated,
            MetricKey::AppointmentsBooked,
            MetricKey::VisitsCompleted,
            MetricKey::SalesClosed,
            MetricKey::SalesVolume,
            MetricKey::AppointmentsToLeads,
            MetricKey::VisitsToAppointments,
            MetricKey::SalesToVisits,
        ]
    }

    /// Conversion rates live in `[0, 1]` and are shown as percentages.
    pub fn is_rate(&self) -> bool {
        matches!(
            self,
            MetricKey::AppointmentsToLeads
                | MetricKey::VisitsToAppointments
                | MetricKey::SalesToVisits
        )
    }

    pub fn format(&self) -> ValueFormat {
        match self {
            MetricKey::SalesVolume => ValueFormat::Money {
                currency: "R$".into(),
            },
            k if k.is_rate() => ValueFormat::Percent { decimals: 1 },
            _ => ValueFormat::Integer,
        }
    }

    /// Unit label attached to formatted values.
    pub fn unit(&self) -> &'static str {
        match self.format() {
            ValueFormat::Money { .. } => "R$",
            ValueFormat::Percent { .. } => "%",
            ValueFormat::Integer => "un",
        }
    }
}

/// How to format the numeric value on the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ValueFormat {
    Money { currency: String },
    Percent { decimals: u8 },
    Integer,
}

/// Direction of a metric against its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

/// What a metric is compared against to derive its trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStrategy {
    /// Mean of the same metric over the other active users
    TeamAverage,
    /// Same scope, the month before the current one
    PreviousPeriod,
}

impl BaselineStrategy {
    pub fn code(&self) -> &'static str {
        match self {
            BaselineStrategy::TeamAverage => "team_average",
            BaselineStrategy::PreviousPeriod => "previous_period",
        }
    }
}

/// Static metadata describing one metric (label, unit, format).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricMeta {
    pub key: MetricKey,
    pub label: String,
    pub unit: String,
    pub format: ValueFormat,
    pub description: Option<String>,
}

/// Which metrics a dashboard view exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewMeta {
    pub view: ViewKind,
    pub label: String,
    pub metrics: Vec<MetricKey>,
    /// Baseline used for individual users of this view
    pub baseline: BaselineStrategy,
}

// ---------------------------------------------------------------------------
// Formatted values
// ---------------------------------------------------------------------------

/// Display-ready metric compared with its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedMetric {
    pub key: MetricKey,
    /// Value in display units (rates multiplied by 100).
    pub value: f64,
    pub unit: String,
    /// Baseline in the same units as `value`.
    pub baseline: f64,
    pub trend: TrendDirection,
    /// `(value - baseline) / baseline`, `0` when the baseline is not positive.
    pub percent_difference: f64,
    /// pt-BR formatted value, e.g. `"40,0%"` or `"R$ 1.234,50"`.
    pub display: String,
}

/// Full catalogue returned by the metadata endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorCatalogResponse {
    pub metrics: Vec<MetricMeta>,
    pub views: Vec<ViewMeta>,
}
