//! Application router configuration wiring the HTML pages and the JSON API.

use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, api,
    charts::get_charts_page,
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_edit_expense_page,
        get_expenses_page, get_new_expense_page, get_summary_page, update_expense_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page))
        .route(endpoints::SUMMARY_VIEW, get(get_summary_page))
        .route(endpoints::CHARTS_VIEW, get(get_charts_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    // Form endpoints backing the HTMX pages. These respond with HTML
    // fragments or HX-Redirect headers rather than JSON.
    let form_routes = Router::new()
        .route(endpoints::POST_EXPENSE, post(create_expense_endpoint))
        .route(endpoints::PUT_EXPENSE, put(update_expense_endpoint))
        .route(endpoints::DELETE_EXPENSE, delete(delete_expense_endpoint));

    let api_routes = Router::new()
        .route(
            endpoints::EXPENSES_API,
            get(api::get_expenses).post(api::add_expense),
        )
        .route(
            endpoints::EXPENSE_API,
            put(api::edit_expense).delete(api::remove_expense),
        )
        .route(endpoints::SUMMARY_API, get(api::get_summary))
        .route(
            endpoints::SUMMARY_BY_CATEGORY_API,
            get(api::get_summary_by_category),
        );

    page_routes
        .merge(form_routes)
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the expenses page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::EXPENSES_VIEW)
}
