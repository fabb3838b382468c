//! Cart entry entity - One row per (shopper, potion) pair.
//!
//! Carts hold references only; prices are read live from the inventory at
//! view and checkout time. A unique index over `(user_id, item_id)` is
//! created at schema setup so the same potion cannot be carted twice by
//! one shopper.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_entries")]
pub struct Model {
    /// Unique identifier for the cart entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Shopper who carted the item
    pub user_id: i64,
    /// Carted inventory item
    pub item_id: i64,
}

/// Defines relationships between CartEntry and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cart entry belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each cart entry references one inventory item
    #[sea_orm(
        belongs_to = "super::inventory_item::Entity",
        from = "Column::ItemId",
        to = "super::inventory_item::Column::Id"
    )]
    InventoryItem,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
