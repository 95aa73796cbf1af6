use contracts::dashboards::d100_sales_funnel::{ConversionRates, MetricBucket};
use contracts::shared::indicators::MetricKey;

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// `numerator / denominator` clamped to `[0, 1]`; `0` for an empty denominator.
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64).clamp(0.0, 1.0)
}

pub fn conversion_rates(bucket: &MetricBucket) -> ConversionRates {
    ConversionRates {
        appointments_to_leads: ratio(bucket.appointments_booked, bucket.leads_created),
        visits_to_appointments: ratio(bucket.visits_completed, bucket.appointments_booked),
        sales_to_visits: ratio(bucket.sales_closed, bucket.visits_completed),
    }
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// Monthly rates plus the snapshot of the latest month.
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelSeries {
    pub current: ConversionRates,
    /// Parallel to the input buckets; zero-denominator months are reported as `0`.
    pub series: Vec<ConversionRates>,
}

pub fn compute_funnel(buckets: &[MetricBucket]) -> FunnelSeries {
    let series: Vec<ConversionRates> = buckets.iter().map(conversion_rates).collect();
    let current = series.last().copied().unwrap_or_default();
    FunnelSeries { current, series }
}

// ---------------------------------------------------------------------------
// Snapshot lookup by metric key
// ---------------------------------------------------------------------------

/// One month of counts together with its derived rates.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    pub bucket: MetricBucket,
    pub rates: ConversionRates,
}

impl MetricSnapshot {
    pub fn from_bucket(bucket: MetricBucket) -> Self {
        let rates = conversion_rates(&bucket);
        Self { bucket, rates }
    }

    /// Raw value (rates in `[0, 1]`, counts as-is).
    pub fn value(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::LeadsCreated => self.bucket.leads_created as f64,
            MetricKey::AppointmentsBooked => self.bucket.appointments_booked as f64,
            MetricKey::VisitsCompleted => self.bucket.visits_completed as f64,
            MetricKey::SalesClosed => self.bucket.sales_closed as f64,
            MetricKey::SalesVolume => self.bucket.sales_volume,
            MetricKey::AppointmentsToLeads => self.rates.appointments_to_leads,
            MetricKey::VisitsToAppointments => self.rates.visits_to_appointments,
            MetricKey::SalesToVisits => self.rates.sales_to_visits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::period::Month;

    fn bucket(month: u32, leads: u64, appts: u64, visits: u64, sales: u64) -> MetricBucket {
        MetricBucket {
            period: Month::new(2025, month).unwrap(),
            leads_created: leads,
            appointments_booked: appts,
            visits_completed: visits,
            sales_closed: sales,
            sales_volume: 0.0,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_reference_funnel() {
        let rates = conversion_rates(&bucket(1, 100, 40, 20, 5));
        assert_close(rates.appointments_to_leads, 0.40);
        assert_close(rates.visits_to_appointments, 0.50);
        assert_close(rates.sales_to_visits, 0.25);
    }

    #[test]
    fn test_all_zero_bucket_gives_zero_rates() {
        let rates = conversion_rates(&bucket(1, 0, 0, 0, 0));
        assert_eq!(rates, ConversionRates::default());
        assert_eq!(rates.appointments_to_leads, 0.0);
        assert!(!rates.sales_to_visits.is_nan());
    }

    #[test]
    fn test_zero_denominator_is_zero_not_nan() {
        // visits without appointments happen when data is imported partially
        let rates = conversion_rates(&bucket(1, 0, 0, 7, 3));
        assert_eq!(rates.appointments_to_leads, 0.0);
        assert_eq!(rates.visits_to_appointments, 0.0);
        assert_close(rates.sales_to_visits, 3.0 / 7.0);
    }

    #[test]
    fn test_rates_are_clamped() {
        // more appointments than leads in the month (leads created earlier)
        let rates = conversion_rates(&bucket(1, 10, 25, 30, 2));
        assert_eq!(rates.appointments_to_leads, 1.0);
        assert_eq!(rates.visits_to_appointments, 1.0);
        for value in [
            rates.appointments_to_leads,
            rates.visits_to_appointments,
            rates.sales_to_visits,
        ] {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_single_bucket_series_equals_current() {
        let funnel = compute_funnel(&[bucket(3, 50, 10, 5, 1)]);
        assert_eq!(funnel.series.len(), 1);
        assert_eq!(funnel.series[0], funnel.current);
    }

    #[test]
    fn test_series_is_parallel_and_deterministic() {
        let buckets = vec![
            bucket(1, 100, 40, 20, 5),
            bucket(2, 0, 0, 0, 0),
            bucket(3, 80, 20, 10, 4),
        ];
        let first = compute_funnel(&buckets);
        let second = compute_funnel(&buckets);
        assert_eq!(first, second);
        assert_eq!(first.series.len(), 3);
        assert_eq!(first.series[1], ConversionRates::default());
        assert_eq!(first.current, conversion_rates(&buckets[2]));
    }

    #[test]
    fn test_empty_input() {
        let funnel = compute_funnel(&[]);
        assert!(funnel.series.is_empty());
        assert_eq!(funnel.current, ConversionRates::default());
    }

    #[test]
    fn test_snapshot_value_lookup() {
        let mut b = bucket(1, 100, 40, 20, 5);
        b.sales_volume = 1_250_000.0;
        let snapshot = MetricSnapshot::from_bucket(b);
        assert_eq!(snapshot.value(MetricKey::LeadsCreated), 100.0);
        assert_eq!(snapshot.value(MetricKey::SalesVolume), 1_250_000.0);
        assert_close(snapshot.value(MetricKey::SalesToVisits), 0.25);
    }
}
