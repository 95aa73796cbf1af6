use axum::{extract::Query, http::StatusCode, Json};
use contracts::dashboards::d100_sales_funnel::{
    DashboardErrorResponse, SalesFunnelRequest, SalesFunnelResponse,
};

use crate::dashboards::d100_sales_funnel::error::DashboardError;
use crate::dashboards::d100_sales_funnel::repository::SqliteMetricStore;
use crate::dashboards::d100_sales_funnel::service::{self, DashboardSettings};
use crate::shared::config;
use crate::shared::indicators::registry;

fn error_response(e: DashboardError) -> (StatusCode, Json<DashboardErrorResponse>) {
    let status = match e {
        DashboardError::InvalidRange(_) => StatusCode::BAD_REQUEST,
        DashboardError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        status,
        Json(DashboardErrorResponse {
            error: e.code().to_string(),
            message: e.to_string(),
        }),
    )
}

/// GET /api/d100/sales_funnel?user_id=...&role=broker-senior&start=2025-01&end=2025-06
pub async fn get_sales_funnel(
    Query(request): Query<SalesFunnelRequest>,
) -> Result<Json<SalesFunnelResponse>, (StatusCode, Json<DashboardErrorResponse>)> {
    tracing::info!(
        "D100 Dashboard: sales funnel for {} ({}) {}..{}",
        request.user_id.as_deref().unwrap_or("team"),
        request.role,
        request.start,
        request.end
    );

    if registry::resolve_role(&request.role).is_none() {
        tracing::warn!(
            "D100 Dashboard: unknown role '{}', falling back to the manager view",
            request.role
        );
    }

    let store = SqliteMetricStore::from_global();
    let settings = DashboardSettings::from(&config::current().dashboard);

    match service::get_sales_funnel(&store, &settings, &request).await {
        Ok(response) => {
            tracing::info!(
                "D100 Dashboard: returning {} periods, {} metrics ({:?} view)",
                response.periods.len(),
                response.metrics.len(),
                response.role_view.view
            );
            Ok(Json(response))
        }
        Err(e) => {
            match &e {
                DashboardError::InvalidRange(_) => {
                    tracing::warn!("D100 Dashboard: rejected request: {}", e)
                }
                DashboardError::DataUnavailable(_) => {
                    tracing::error!("D100 Dashboard: failed to build sales funnel: {}", e)
                }
            }
            Err(error_response(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_statuses() {
        let (status, body) = error_response(DashboardError::InvalidRange("start > end".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0.error, "invalid_range");

        let (status, body) = error_response(DashboardError::DataUnavailable("timeout".into()));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.0.error, "data_unavailable");
        assert!(body.0.message.contains("timeout"));
    }
}
