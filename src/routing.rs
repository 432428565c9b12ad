//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{
    AppState,
    auth::{api_auth_guard, page_auth_guard},
    dashboard::{
        create_record_from_form, delete_record_from_dashboard, edit_record_field,
        get_dashboard_page,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    record::{
        create_record_endpoint, delete_record_endpoint, list_records_endpoint,
        update_record_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    // The record API is called by browser clients served from another origin.
    let api_routes = Router::new()
        .route(endpoints::RECORDS_BY_USER, get(list_records_endpoint))
        .route(endpoints::FINANCIAL_RECORDS, post(create_record_endpoint))
        .route(
            endpoints::FINANCIAL_RECORD,
            put(update_record_endpoint).delete(delete_record_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), api_auth_guard))
        .layer(CorsLayer::permissive());

    let dashboard_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::DASHBOARD_RECORDS, post(create_record_from_form))
        .route(
            endpoints::DASHBOARD_RECORD,
            put(edit_record_field).delete(delete_record_from_dashboard),
        )
        .layer(middleware::from_fn_with_state(state.clone(), page_auth_guard));

    api_routes
        .merge(dashboard_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
