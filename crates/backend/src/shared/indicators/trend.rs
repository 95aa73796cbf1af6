use contracts::dashboards::d100_sales_funnel::RoleView;
use contracts::shared::indicators::{FormattedMetric, MetricKey, TrendDirection, ValueFormat};

use super::compute::funnel::MetricSnapshot;
use crate::shared::format;

/// Default no-op band around the baseline (1%)
pub const DEFAULT_TREND_EPSILON: f64 = 0.01;

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// `Up` above `baseline * (1 + eps)`, `Down` below `baseline * (1 - eps)`.
pub fn trend_direction(value: f64, baseline: f64, epsilon: f64) -> TrendDirection {
    let value = finite_or_zero(value);
    let baseline = finite_or_zero(baseline);
    let epsilon = finite_or_zero(epsilon).abs();

    if value > baseline * (1.0 + epsilon) {
        TrendDirection::Up
    } else if value < baseline * (1.0 - epsilon) {
        TrendDirection::Down
    } else {
        TrendDirection::Neutral
    }
}

/// `(value - baseline) / baseline`, `0` when the baseline is not positive.
pub fn percent_difference(value: f64, baseline: f64) -> f64 {
    let value = finite_or_zero(value);
    let baseline = finite_or_zero(baseline);
    if baseline > 0.0 {
        (value - baseline) / baseline
    } else {
        0.0
    }
}

fn display(key: MetricKey, raw: f64) -> String {
    match key.format() {
        ValueFormat::Money { .. } => format::format_currency(raw),
        ValueFormat::Percent { decimals } => format::format_percent(raw, decimals as usize),
        ValueFormat::Integer => format::format_number(raw.max(0.0).round() as u64),
    }
}

/// Raw value/baseline -> display-ready metric. Rates are scaled to percent.
pub fn format_metric(key: MetricKey, value: f64, baseline: f64, epsilon: f64) -> FormattedMetric {
    let value = finite_or_zero(value);
    let baseline = finite_or_zero(baseline);
    let scale = if key.is_rate() { 100.0 } else { 1.0 };

    FormattedMetric {
        key,
        value: value * scale,
        unit: key.unit().to_string(),
        baseline: baseline * scale,
        trend: trend_direction(value, baseline, epsilon),
        percent_difference: percent_difference(value, baseline),
        display: display(key, value),
    }
}

/// Format every visible metric of `view` against its baseline.
pub fn format_visible(view: &RoleView, own: &MetricSnapshot, epsilon: f64) -> Vec<FormattedMetric> {
    view.visible_metrics
        .iter()
        .map(|key| {
            let baseline = view.baseline.get(key).copied().unwrap_or(0.0);
            format_metric(*key, own.value(*key), baseline, epsilon)
        })
        .collect()
}
