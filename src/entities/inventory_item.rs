//! Inventory item entity - Represents a single potion in the store.
//!
//! Every item is one-of-a-kind: there is no quantity column. Selling an item
//! flips `is_sold`, which removes it from the storefront permanently.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the potion (e.g., "Elixir of Vigor")
    pub name: String,
    /// Storefront category used for filtering (e.g., "Healing")
    pub category: String,
    /// Longer flavor text shown on listings
    pub description: String,
    /// Sale price in dollars
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub cost: Decimal,
    /// Filename or URL of the item's photo
    pub photo: String,
    /// Whether the item has been sold and left the storefront
    pub is_sold: bool,
}

/// Defines relationships between InventoryItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One item may sit in many shoppers' carts before it sells
    #[sea_orm(has_many = "super::cart_entry::Entity")]
    CartEntries,
    /// One item appears on at most one bill line
    #[sea_orm(has_many = "super::bill_line_item::Entity")]
    BillLineItems,
}

impl Related<super::cart_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartEntries.def()
    }
}

impl Related<super::bill_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillLineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
