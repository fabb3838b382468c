//! Database bootstrap for the potion storefront.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the database schema always matches the
//! Rust struct definitions without manual SQL. One extra statement adds the
//! composite unique index over `cart_entries (user_id, item_id)`, which the
//! entity derive cannot express on its own.

use crate::config::settings::Settings;
use crate::entities::{
    Bill, BillLineItem, CartEntry, InventoryItem, Session, ShippingOption, User, cart_entry,
    shipping_option,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    Schema, Set,
};
use tracing::info;

/// Connects to the database and ensures the schema exists.
pub async fn init_db(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Creates all storefront tables using `SeaORM`'s schema generation from entity
/// definitions, plus the composite unique cart index.
///
/// Every statement carries `IF NOT EXISTS`, so running this against an already
/// initialized database is a no-op.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut tables = vec![
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(InventoryItem),
        schema.create_table_from_entity(ShippingOption),
        schema.create_table_from_entity(CartEntry),
        schema.create_table_from_entity(Session),
        schema.create_table_from_entity(Bill),
        schema.create_table_from_entity(BillLineItem),
    ];
    for table in &mut tables {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    // One row per (user, item): the same potion cannot be carted twice.
    let cart_unique = Index::create()
        .name("idx-cart-entries-user-item")
        .table(CartEntry)
        .col(cart_entry::Column::UserId)
        .col(cart_entry::Column::ItemId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&cart_unique)).await?;

    Ok(())
}

/// Seeds the shipping options from settings when the table is empty.
///
/// Checkout cannot complete without at least one shipping option, so a fresh
/// store gets the configured (or default) methods on first boot. A non-empty
/// table is left untouched.
pub async fn seed_shipping_options(db: &DatabaseConnection, settings: &Settings) -> Result<()> {
    let existing = ShippingOption::find().count(db).await?;
    if existing > 0 {
        return Ok(());
    }

    for seed in &settings.shipping {
        let option = shipping_option::ActiveModel {
            ship_type: Set(seed.ship_type.clone()),
            cost: Set(seed.cost),
            ..Default::default()
        };
        option.insert(db).await?;
    }

    info!(count = settings.shipping.len(), "seeded shipping options");
    Ok(())
}
