//! Public storefront browsing.

use crate::{core::catalog, errors::Result, web::AppState};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    /// Substring to match against potion names and descriptions
    pub q: Option<String>,
    /// Exact category to filter by
    pub category: Option<String>,
}

/// `GET /catalog` - unsold potions plus the category filter list.
///
/// Browsing is open to everyone; no session required.
pub async fn browse(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Value>> {
    let items =
        catalog::list_available(&state.db, query.q.as_deref(), query.category.as_deref()).await?;
    let categories = catalog::distinct_categories(&state.db).await?;
    Ok(Json(json!({ "items": items, "categories": categories })))
}
