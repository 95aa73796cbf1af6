use anyhow::Result;
use async_trait::async_trait;
use contracts::dashboards::d100_sales_funnel::MetricBucket;
use contracts::shared::period::{Month, MonthRange};
use contracts::system::users::User;
use sea_orm::{DatabaseBackend, DatabaseConnection, FromQueryResult, Statement, Value};
use std::collections::HashMap;

use super::source::{MetricScope, MetricStore};
use crate::system::users::repository as users_repository;

/// Raw aggregation row: one month of one funnel stage
#[derive(Debug, FromQueryResult)]
struct PeriodCount {
    /// Only set when grouped by user
    user_id: Option<String>,
    period: Option<String>,
    total: i64,
    volume: f64,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Leads,
    Appointments,
    Visits,
    Sales,
}

impl Stage {
    /// `(table, date column, extra condition, volume expression)`
    fn source(&self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            Stage::Leads => ("clientes", "created_at", "", "0"),
            Stage::Appointments => ("agendamentos", "created_at", " AND status <> 'cancelado'", "0"),
            Stage::Visits => ("agendamentos", "scheduled_at", " AND status = 'realizado'", "0"),
            Stage::Sales => ("vendas", "sold_at", "", "COALESCE(SUM(valor), 0)"),
        }
    }

    fn all() -> [Stage; 4] {
        [Stage::Leads, Stage::Appointments, Stage::Visits, Stage::Sales]
    }
}

/// Grouping of a stage query
#[derive(Debug, Clone, Copy)]
enum Grouping<'a> {
    Month(&'a MetricScope),
    UserAndMonth,
}

async fn fetch_stage(
    db: &DatabaseConnection,
    stage: Stage,
    range: &MonthRange,
    grouping: Grouping<'_>,
) -> Result<Vec<PeriodCount>> {
    let (table, date_column, condition, volume) = stage.source();
    let user_column = match grouping {
        Grouping::Month(_) => "NULL",
        Grouping::UserAndMonth => "user_id",
    };

    let mut sql = format!(
        r#"
        SELECT
            {user_column}                             AS user_id,
            strftime('%Y-%m', {date_column})          AS period,
            CAST(COUNT(*) AS INTEGER)                 AS total,
            CAST({volume} AS REAL)                    AS volume
        FROM {table}
        WHERE {date_column} >= ? AND {date_column} < ?{condition}
    "#
    );

    let mut params: Vec<Value> = vec![range.date_from().into(), range.date_to_exclusive().into()];

    match grouping {
        Grouping::Month(MetricScope::User(user_id)) => {
            sql.push_str(" AND user_id = ? GROUP BY period ORDER BY period");
            params.push(user_id.clone().into());
        }
        Grouping::Month(MetricScope::Team) => sql.push_str(" GROUP BY period ORDER BY period"),
        Grouping::UserAndMonth => {
            sql.push_str(" GROUP BY user_id, period ORDER BY user_id, period")
        }
    }

    let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, &sql, params);
    Ok(PeriodCount::find_by_statement(stmt).all(db).await?)
}

fn row_period(stage: Stage, row: &PeriodCount) -> Option<Month> {
    let period = row.period.as_deref().and_then(|p| Month::parse(p).ok());
    if period.is_none() {
        tracing::warn!("D100: skipping {:?} row with unparseable period {:?}", stage, row.period);
    }
    period
}

fn bucket_for(buckets: &mut Vec<MetricBucket>, period: Month) -> &mut MetricBucket {
    let idx = match buckets.iter().position(|b| b.period == period) {
        Some(idx) => idx,
        None => {
            buckets.push(MetricBucket::empty(period));
            buckets.len() - 1
        }
    };
    &mut buckets[idx]
}

fn apply_stage(bucket: &mut MetricBucket, stage: Stage, row: &PeriodCount) {
    let total = row.total.max(0) as u64;
    match stage {
        Stage::Leads => bucket.leads_created += total,
        Stage::Appointments => bucket.appointments_booked += total,
        Stage::Visits => bucket.visits_completed += total,
        Stage::Sales => {
            bucket.sales_closed += total;
            bucket.sales_volume += row.volume;
        }
    }
}

/// Funnel counts straight from the CRM tables.
///
/// Appointments count when booked (`created_at`, cancelled excluded); visits
/// count in the month they were scheduled for, once `realizado`.
#[derive(Clone)]
pub struct SqliteMetricStore {
    db: DatabaseConnection,
}

impl SqliteMetricStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn from_global() -> Self {
        Self::new(crate::shared::data::db::get_connection().clone())
    }
}

#[async_trait]
impl MetricStore for SqliteMetricStore {
    async fn get_counts(&self, range: &MonthRange, scope: &MetricScope) -> Result<Vec<MetricBucket>> {
        let mut buckets: Vec<MetricBucket> = Vec::new();

        for stage in Stage::all() {
            for row in fetch_stage(&self.db, stage, range, Grouping::Month(scope)).await? {
                let Some(period) = row_period(stage, &row) else {
                    continue;
                };
                apply_stage(bucket_for(&mut buckets, period), stage, &row);
            }
        }

        buckets.sort_by_key(|b| b.period);
        Ok(buckets)
    }

    async fn get_counts_by_user(
        &self,
        range: &MonthRange,
    ) -> Result<HashMap<String, Vec<MetricBucket>>> {
        let mut by_user: HashMap<String, Vec<MetricBucket>> = HashMap::new();

        for stage in Stage::all() {
            for row in fetch_stage(&self.db, stage, range, Grouping::UserAndMonth).await? {
                let (Some(user_id), Some(period)) = (row.user_id.clone(), row_period(stage, &row)) else {
                    continue;
                };
                let buckets = by_user.entry(user_id).or_default();
                apply_stage(bucket_for(buckets, period), stage, &row);
            }
        }

        for buckets in by_user.values_mut() {
            buckets.sort_by_key(|b| b.period);
        }
        Ok(by_user)
    }

    async fn list_active_users(&self) -> Result<Vec<User>> {
        users_repository::list_active(&self.db).await
    }
}
