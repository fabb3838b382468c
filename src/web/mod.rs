//! Web layer - HTTP interface and route handlers
//!
//! This module provides the JSON API for the Eternal Elixirs storefront.
//! Handlers are thin adapters: they resolve the request identity from a
//! session token, call into `core`, and let [`Error`] translate itself
//! into a status code and JSON body.

/// Route handlers grouped by surface (auth, shop, cart, checkout, admin)
pub mod routes;
/// Session-token extraction and identity guards
pub mod session;

use crate::{
    config::settings::Settings,
    core::checkout::CommitGate,
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all storage operations
    pub db: DatabaseConnection,
    /// Parsed application settings
    pub settings: Arc<Settings>,
    /// Per-shopper serialization of order commits
    pub gate: Arc<CommitGate>,
}

impl AppState {
    /// Creates the shared state handed to every handler.
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: Arc<Settings>) -> Self {
        Self {
            db,
            settings,
            gate: Arc::new(CommitGate::new()),
        }
    }
}

/// Builds the storefront router with every route attached.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/catalog", get(routes::shop::browse))
        .route("/cart", get(routes::cart::view_cart))
        .route("/cart/add", post(routes::cart::add))
        .route("/cart/remove", post(routes::cart::remove))
        .route(
            "/checkout",
            get(routes::checkout::review).post(routes::checkout::enter_address),
        )
        .route("/payment", post(routes::checkout::submit_payment))
        .route("/confirmation/:bill_id", get(routes::checkout::confirmation))
        .route("/admin/dashboard", get(routes::admin::dashboard))
        .route("/admin/sales-report", get(routes::admin::sales_report))
        .route(
            "/admin/sales-report/export",
            get(routes::admin::export_sales_report),
        )
        .route(
            "/admin/inventory",
            get(routes::admin::list_inventory).post(routes::admin::add_item),
        )
        .route(
            "/admin/inventory/:item_id/delete",
            post(routes::admin::delete_item),
        )
        .route("/admin/users", get(routes::admin::list_users))
        .route(
            "/admin/users/:user_id/promote",
            post(routes::admin::promote_user),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the listener and serves the storefront until the process exits.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.settings.bind_addr.clone();
    let router = app(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "storefront listening");
    axum::serve(listener, router).await?;
    Ok(())
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } | Self::EmptyCart | Self::ShippingOptionNotFound { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::AuthRequired | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ItemNotFound { .. } | Self::BillNotFound { .. } | Self::UserNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::UsernameTaken { .. }
            | Self::ItemAlreadySold { .. }
            | Self::DuplicateCartEntry { .. }
            | Self::CartEmptiedConcurrently => StatusCode::CONFLICT,
            Self::Config { .. } | Self::Export { .. } | Self::Database(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Internal failures are logged in full but leave the process as a
        // generic message; everything else is written to be shown verbatim.
        if status.is_server_error() {
            error!(error = %self, "request failed");
            return (
                status,
                Json(json!({ "error": "Something went wrong on our end" })),
            )
                .into_response();
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
