use axum::Json;
use contracts::shared::indicators::IndicatorCatalogResponse;

use crate::shared::indicators::metadata;

/// GET /api/indicators/meta
///
/// Returns the metric catalogue and the metric set of every dashboard view.
pub async fn get_indicator_catalog() -> Json<IndicatorCatalogResponse> {
    Json(metadata::build_catalog())
}
