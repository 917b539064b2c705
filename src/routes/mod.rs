pub mod accounts;
pub mod emails;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::ServerState;

pub struct AppRouter;

impl AppRouter {
    pub fn create(state: ServerState) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/api/emails/analyze", post(emails::analyze_emails))
            .route("/api/emails/insights", post(emails::email_insights))
            .route(
                "/api/accounts",
                get(accounts::list_accounts).post(accounts::connect_account),
            )
            .route("/api/accounts/:email", axum::routing::delete(accounts::disconnect_account))
            .fallback(handler_404)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            )
            .with_state(state)
    }
}

async fn health() -> &'static str {
    "OK"
}

pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Route does not exist")
}
