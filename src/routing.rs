//! Assembles the application's routes into a router.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;

use crate::{
    auth::{admin_guard, auth_guard, post_log_in},
    collection::{create_collection, delete_collection, get_collection_total, get_collections},
    endpoints,
    expense::{
        create_expense, delete_expense, get_expense_total, get_expenses, update_expense,
    },
    receipts::{ReceiptStore, form::MAX_RECEIPT_BYTES},
    state::AppState,
    summary::get_financial_summary,
};

// Leaves headroom over the receipt ceiling for the text fields and the
// multipart framing.
const MAX_BODY_BYTES: usize = MAX_RECEIPT_BYTES + 1024 * 1024;

async fn get_liveness() -> &'static str {
    "Tilak Mitra Mandal Expense Tracker API is running."
}

/// Create the router for the application.
///
/// Routes except the liveness route and login require a valid bearer token;
/// creating and deleting collections additionally requires the admin role.
pub fn build_router<R: ReceiptStore>(state: AppState<R>) -> Router {
    let admin_routes = Router::new()
        .route(endpoints::COLLECTIONS, post(create_collection))
        .route(endpoints::COLLECTION, delete(delete_collection))
        .route_layer(middleware::from_fn(admin_guard));

    let protected_routes = Router::new()
        .route(endpoints::COLLECTIONS, get(get_collections))
        .route(endpoints::COLLECTION_TOTAL, get(get_collection_total))
        .route(
            endpoints::EXPENSES,
            get(get_expenses).post(create_expense),
        )
        .route(endpoints::EXPENSE_TOTAL, get(get_expense_total))
        .route(
            endpoints::EXPENSE,
            put(update_expense).delete(delete_expense),
        )
        .route(endpoints::FINANCIAL_SUMMARY, get(get_financial_summary))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    Router::new()
        .route(endpoints::ROOT, get(get_liveness))
        .route(endpoints::LOG_IN, post(post_log_in))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
