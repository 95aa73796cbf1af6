use axum::{
    routing::{get, post},
    Router,
};

use crate::{api::handlers, system};

/// All HTTP routes of the backend
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM ROUTES
        // ========================================
        .route(
            "/api/system/users",
            get(system::api::handlers::users::list).post(system::api::handlers::users::create),
        )
        .route(
            "/api/system/users/:id",
            get(system::api::handlers::users::get_by_id).put(system::api::handlers::users::update),
        )
        // ========================================
        // DASHBOARDS
        // ========================================
        .route(
            "/api/d100/sales_funnel",
            get(handlers::d100_sales_funnel::get_sales_funnel),
        )
        .route(
            "/api/indicators/meta",
            get(handlers::indicators::get_indicator_catalog),
        )
        // ========================================
        // AGGREGATES
        // ========================================
        // A001 Lead automation
        .route(
            "/api/a001/lead_automation",
            get(handlers::a001_lead_automation::list_by_user)
                .post(handlers::a001_lead_automation::create),
        )
        .route(
            "/api/a001/lead_automation/:id",
            get(handlers::a001_lead_automation::get_by_id)
                .put(handlers::a001_lead_automation::update),
        )
        .route(
            "/api/a001/lead_automation/:id/transition",
            post(handlers::a001_lead_automation::transition),
        )
        // A002 WhatsApp instance
        .route(
            "/api/a002/whatsapp_instance",
            get(handlers::a002_whatsapp_instance::list_all)
                .post(handlers::a002_whatsapp_instance::create),
        )
        .route(
            "/api/a002/whatsapp_instance/:id",
            get(handlers::a002_whatsapp_instance::get_by_id),
        )
        .route(
            "/api/a002/whatsapp_instance/:id/event",
            post(handlers::a002_whatsapp_instance::apply_event),
        )
}
