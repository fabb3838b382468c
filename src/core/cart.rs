//! Cart business logic - Per-shopper staging for the order pipeline.
//!
//! A cart is a list of references to unsold potions, not a copy of them:
//! names and prices are read live from the inventory at view time, so a cart
//! always reflects current data. One shopper can hold a potion at most once,
//! but two shoppers may cart the same potion; checkout decides who gets it.

use crate::{
    entities::{CartEntry, InventoryItem, cart_entry},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, SqlErr, prelude::*};
use serde::Serialize;

/// One carted potion with its live price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    /// Cart entry id, used to remove the line
    pub cart_entry_id: i64,
    /// Referenced inventory item
    pub item_id: i64,
    /// Item name at read time
    pub name: String,
    /// Item flavor text at read time
    pub description: String,
    /// Item category at read time
    pub category: String,
    /// Item photo at read time
    pub photo: String,
    /// Item price at read time
    pub price: Decimal,
}

/// A shopper's cart in insertion order, with its subtotal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    /// Carted potions, oldest first
    pub lines: Vec<CartLine>,
    /// Sum of the line prices
    pub subtotal: Decimal,
}

impl CartView {
    /// True when the cart holds no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Builds the shopper's cart view by joining entries against the inventory.
///
/// Works on a plain connection or inside an open transaction, which is how
/// the checkout commit re-reads the cart under its own snapshot.
pub async fn get_cart<C>(db: &C, user_id: i64) -> Result<CartView>
where
    C: ConnectionTrait,
{
    let rows = CartEntry::find()
        .filter(cart_entry::Column::UserId.eq(user_id))
        .find_also_related(InventoryItem)
        .order_by_asc(cart_entry::Column::Id)
        .all(db)
        .await?;

    let lines: Vec<CartLine> = rows
        .into_iter()
        .filter_map(|(entry, item)| {
            item.map(|item| CartLine {
                cart_entry_id: entry.id,
                item_id: item.id,
                name: item.name,
                description: item.description,
                category: item.category,
                photo: item.photo,
                price: item.cost,
            })
        })
        .collect();

    let subtotal: Decimal = lines.iter().map(|line| line.price).sum();
    Ok(CartView { lines, subtotal })
}

/// Puts a potion in the shopper's cart.
///
/// Fails if the potion does not exist, was already sold, or is already in
/// this shopper's cart. The unique `(user_id, item_id)` index backs the
/// duplicate check, so two racing adds cannot slip a second row in.
pub async fn add_to_cart(
    db: &DatabaseConnection,
    user_id: i64,
    item_id: i64,
) -> Result<cart_entry::Model> {
    let item = InventoryItem::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or(Error::ItemNotFound { item_id })?;

    if item.is_sold {
        return Err(Error::ItemAlreadySold { name: item.name });
    }

    let already_carted = CartEntry::find()
        .filter(cart_entry::Column::UserId.eq(user_id))
        .filter(cart_entry::Column::ItemId.eq(item_id))
        .one(db)
        .await?;
    if already_carted.is_some() {
        return Err(Error::DuplicateCartEntry { name: item.name });
    }

    let entry = cart_entry::ActiveModel {
        user_id: Set(user_id),
        item_id: Set(item_id),
        ..Default::default()
    };

    match entry.insert(db).await {
        Ok(model) => Ok(model),
        // An add that raced past the pre-check lands on the unique index
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(Error::DuplicateCartEntry { name: item.name })
        }
        Err(e) => Err(e.into()),
    }
}

/// Removes one line from the shopper's cart.
///
/// Silently does nothing when the entry does not exist or belongs to another
/// shopper; removal is an idempotent cleanup, not a lookup.
pub async fn remove_from_cart(db: &DatabaseConnection, user_id: i64, entry_id: i64) -> Result<()> {
    CartEntry::delete_many()
        .filter(cart_entry::Column::Id.eq(entry_id))
        .filter(cart_entry::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}
