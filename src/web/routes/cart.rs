//! Cart handlers; every route requires a logged-in shopper.

use crate::{
    core::{cart, pricing},
    errors::Result,
    web::{AppState, session},
};
use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddForm {
    pub item_id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RemoveForm {
    pub cart_entry_id: i64,
}

/// `GET /cart` - the shopper's cart with a pre-shipping price preview.
///
/// Shipping enters the math at checkout; the preview here prices the cart
/// with no delivery cost.
pub async fn view_cart(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    let identity = session::require_user(&state, &headers).await?;
    let cart = cart::get_cart(&state.db, identity.user_id).await?;
    let totals = pricing::compute_totals(cart.subtotal, Decimal::ZERO, state.settings.tax_rate);
    Ok(Json(json!({
        "cart": cart,
        "tax": totals.tax,
        "estimated_total": totals.total,
    })))
}

/// `POST /cart/add` - puts a potion in the shopper's cart.
pub async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<AddForm>,
) -> Result<Json<Value>> {
    let identity = session::require_user(&state, &headers).await?;
    let entry = cart::add_to_cart(&state.db, identity.user_id, form.item_id).await?;
    Ok(Json(json!({ "cart_entry_id": entry.id })))
}

/// `POST /cart/remove` - drops one of the shopper's own cart rows.
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<RemoveForm>,
) -> Result<Json<Value>> {
    let identity = session::require_user(&state, &headers).await?;
    cart::remove_from_cart(&state.db, identity.user_id, form.cart_entry_id).await?;
    Ok(Json(json!({ "status": "removed" })))
}
