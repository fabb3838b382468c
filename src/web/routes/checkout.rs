//! Checkout pipeline handlers: review, address entry, payment, confirmation.

use crate::{
    core::{
        checkout::{self, AddressForm, CheckoutReview, PaymentForm, PaymentOutcome, PaymentPrompt},
        confirmation::{BillView, get_confirmation},
    },
    errors::Result,
    web::{AppState, session},
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// `GET /checkout` - the cart priced with the first shipping option.
pub async fn review(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CheckoutReview>> {
    let identity = session::require_user(&state, &headers).await?;
    let review = checkout::review(&state.db, identity.user_id, state.settings.tax_rate).await?;
    Ok(Json(review))
}

/// `POST /checkout` - validates the address and prices the order.
///
/// The returned prompt carries the idempotency token the payment step
/// must echo back.
pub async fn enter_address(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<AddressForm>,
) -> Result<Json<PaymentPrompt>> {
    let identity = session::require_user(&state, &headers).await?;
    let prompt =
        checkout::enter_address(&state.db, identity.user_id, &form, state.settings.tax_rate)
            .await?;
    Ok(Json(prompt))
}

/// `POST /payment` - commits the order, or re-issues the prompt when card
/// fields are missing.
pub async fn submit_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<PaymentForm>,
) -> Result<Response> {
    let identity = session::require_user(&state, &headers).await?;
    let outcome = checkout::submit_payment(
        &state.db,
        &state.gate,
        identity.user_id,
        &form,
        state.settings.tax_rate,
    )
    .await?;

    Ok(match outcome {
        PaymentOutcome::Committed { bill_id } => (
            StatusCode::OK,
            Json(json!({ "status": "committed", "bill_id": bill_id })),
        )
            .into_response(),
        PaymentOutcome::Incomplete { prompt } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "status": "incomplete", "prompt": prompt })),
        )
            .into_response(),
    })
}

/// `GET /confirmation/:bill_id` - renders one of the shopper's own bills.
pub async fn confirmation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(bill_id): Path<i64>,
) -> Result<Json<BillView>> {
    let identity = session::require_user(&state, &headers).await?;
    let view = get_confirmation(&state.db, identity.user_id, bill_id).await?;
    Ok(Json(view))
}
