//! Administrator handlers; every route requires the Admin role.

use crate::{
    core::{auth, catalog, report},
    entities::inventory_item,
    errors::Result,
    web::{AppState, session},
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewItemForm {
    pub name: String,
    pub category: String,
    pub description: String,
    pub cost: Decimal,
    pub photo: String,
}

/// `GET /admin/dashboard` - store-wide order totals.
pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<report::DashboardStats>> {
    session::require_admin(&state, &headers).await?;
    Ok(Json(report::dashboard(&state.db).await?))
}

/// `GET /admin/sales-report` - every bill, newest first.
pub async fn sales_report(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<report::SalesReportRow>>> {
    session::require_admin(&state, &headers).await?;
    Ok(Json(report::sales_report(&state.db).await?))
}

/// `GET /admin/sales-report/export` - the sales report as a CSV download.
pub async fn export_sales_report(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    session::require_admin(&state, &headers).await?;
    let csv_text = report::sales_report_csv(&state.db).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sales_report.csv\"",
            ),
        ],
        csv_text,
    )
        .into_response())
}

/// `GET /admin/inventory` - the full stock list, sold potions included.
pub async fn list_inventory(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<inventory_item::Model>>> {
    session::require_admin(&state, &headers).await?;
    Ok(Json(catalog::list_all_items(&state.db).await?))
}

/// `POST /admin/inventory` - stocks a new potion.
pub async fn add_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<NewItemForm>,
) -> Result<Response> {
    session::require_admin(&state, &headers).await?;
    let item = catalog::add_item(
        &state.db,
        form.name,
        form.category,
        form.description,
        form.cost,
        form.photo,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(item)).into_response())
}

/// `POST /admin/inventory/:item_id/delete` - removes an unsold potion.
pub async fn delete_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(item_id): Path<i64>,
) -> Result<Json<Value>> {
    session::require_admin(&state, &headers).await?;
    catalog::delete_item(&state.db, item_id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// `GET /admin/users` - every registered account.
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<auth::UserView>>> {
    session::require_admin(&state, &headers).await?;
    Ok(Json(auth::list_users(&state.db).await?))
}

/// `POST /admin/users/:user_id/promote` - grants the Admin role.
pub async fn promote_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> Result<Json<auth::UserView>> {
    session::require_admin(&state, &headers).await?;
    Ok(Json(auth::promote_user(&state.db, user_id).await?))
}
