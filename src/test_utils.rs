//! Shared test utilities for Eternal Elixirs.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test accounts, potions, and shipping options with sensible
//! defaults.

use crate::{
    config::database,
    core::{
        auth, catalog,
        checkout::{self, AddressForm, CommitGate, PaymentForm, PaymentOutcome},
    },
    entities,
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a registered shopper account.
///
/// # Arguments
/// * `db` - Database connection
/// * `username` - Login name, also used as the display name
///
/// # Defaults
/// * `password`: "password123"
/// * `email`: `"<username>@example.com"`
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    let view = auth::register(
        db,
        username,
        "password123",
        username,
        &format!("{username}@example.com"),
    )
    .await?;
    fetch_user(db, view.id).await
}

/// Creates a registered account and promotes it to administrator.
pub async fn create_test_admin(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    let view = auth::register(
        db,
        username,
        "password123",
        username,
        &format!("{username}@example.com"),
    )
    .await?;
    auth::promote_user(db, view.id).await?;
    fetch_user(db, view.id).await
}

/// Creates an unsold potion with sensible defaults.
///
/// # Arguments
/// * `db` - Database connection
/// * `name` - Potion name
/// * `cost_cents` - Price in cents
///
/// # Defaults
/// * `category`: "Healing"
/// * `description`: "Test potion"
/// * `photo`: "test.png"
pub async fn create_test_item(
    db: &DatabaseConnection,
    name: &str,
    cost_cents: i64,
) -> Result<entities::inventory_item::Model> {
    catalog::add_item(
        db,
        name.to_string(),
        "Healing".to_string(),
        "Test potion".to_string(),
        Decimal::new(cost_cents, 2),
        "test.png".to_string(),
    )
    .await
}

/// Creates an unsold potion in a specific category.
/// Use this when a test depends on category filtering.
pub async fn create_test_item_in_category(
    db: &DatabaseConnection,
    name: &str,
    cost_cents: i64,
    category: &str,
) -> Result<entities::inventory_item::Model> {
    catalog::add_item(
        db,
        name.to_string(),
        category.to_string(),
        "Test potion".to_string(),
        Decimal::new(cost_cents, 2),
        "test.png".to_string(),
    )
    .await
}

/// Creates a shipping option with the given name and cost in cents.
pub async fn create_test_shipping_option(
    db: &DatabaseConnection,
    ship_type: &str,
    cost_cents: i64,
) -> Result<entities::shipping_option::Model> {
    let option = entities::shipping_option::ActiveModel {
        ship_type: Set(ship_type.to_string()),
        cost: Set(Decimal::new(cost_cents, 2)),
        ..Default::default()
    };
    Ok(option.insert(db).await?)
}

/// Flips a potion to sold without going through checkout.
/// Use this to stage sold-out conflicts.
pub async fn mark_sold_directly(db: &DatabaseConnection, item_id: i64) -> Result<()> {
    let mut active: entities::inventory_item::ActiveModel = fetch_item(db, item_id).await?.into();
    active.is_sold = Set(true);
    active.update(db).await?;
    Ok(())
}

/// Reloads a potion row by id.
pub async fn fetch_item(
    db: &DatabaseConnection,
    item_id: i64,
) -> Result<entities::inventory_item::Model> {
    entities::InventoryItem::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or(Error::ItemNotFound { item_id })
}

async fn fetch_user(db: &DatabaseConnection, user_id: i64) -> Result<entities::user::Model> {
    entities::User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { user_id })
}

/// Walks a shopper's cart through address entry and payment, returning the
/// committed bill id. Uses a 6% tax rate and a fresh commit gate.
pub async fn commit_test_order(
    db: &DatabaseConnection,
    user_id: i64,
    shipping_id: i64,
) -> Result<i64> {
    let gate = CommitGate::new();
    let form = AddressForm {
        street: "12 Raven Lane".to_string(),
        city: "Gloomhaven".to_string(),
        state: "VT".to_string(),
        zip: "05401".to_string(),
        shipping_id: shipping_id.to_string(),
    };
    let prompt = checkout::enter_address(db, user_id, &form, Decimal::new(6, 2)).await?;
    let payment = PaymentForm {
        street: prompt.address.street.clone(),
        city: prompt.address.city.clone(),
        state: prompt.address.state.clone(),
        zip: prompt.address.zip.clone(),
        shipping_id: prompt.shipping_id.to_string(),
        idempotency_token: prompt.idempotency_token.clone(),
        card_number: "4111111111111111".to_string(),
        exp_date: "12/27".to_string(),
        cvv: "123".to_string(),
    };
    match checkout::submit_payment(db, &gate, user_id, &payment, Decimal::new(6, 2)).await? {
        PaymentOutcome::Committed { bill_id } => Ok(bill_id),
        PaymentOutcome::Incomplete { .. } => Err(Error::Validation {
            message: "Payment details were rejected during test setup".to_string(),
        }),
    }
}

/// Builds the full router over a fresh in-memory database.
/// Returns (app, db) so tests can stage fixtures directly on the connection.
pub async fn setup_test_app() -> Result<(axum::Router, DatabaseConnection)> {
    let db = setup_test_db().await?;
    let settings = std::sync::Arc::new(crate::config::settings::Settings {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        tax_rate: Decimal::new(6, 2),
        shipping: Vec::new(),
    });
    let state = crate::web::AppState::new(db.clone(), settings);
    Ok((crate::web::app(state), db))
}

/// Builds a GET request for router tests, optionally with a bearer token.
#[must_use]
pub fn get_request(uri: &str, token: Option<&str>) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}"),
        );
    }
    builder
        .body(axum::body::Body::empty())
        .unwrap_or_default()
}

/// Builds a JSON-body request for router tests.
#[must_use]
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}"),
        );
    }
    builder
        .body(axum::body::Body::from(body.to_string()))
        .unwrap_or_default()
}

/// Reads a response body as JSON, yielding `Null` when it is not JSON.
pub async fn response_json(
    response: axum::http::Response<axum::body::Body>,
) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

/// Reads a response body as text.
pub async fn response_text(response: axum::http::Response<axum::body::Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Sets up a complete test environment with one registered shopper.
/// Returns (db, user) for common test scenarios.
pub async fn setup_with_user() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "ryn").await?;
    Ok((db, user))
}

/// Sets up a complete test environment with a shopper and a shipping option.
/// Returns (db, user, shipping) for checkout-related tests.
pub async fn setup_storefront() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::shipping_option::Model,
)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "ryn").await?;
    let shipping = create_test_shipping_option(&db, "Standard", 499).await?;
    Ok((db, user, shipping))
}
