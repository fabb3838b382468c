//! Bill line item entity - Links one sold potion to the bill that sold it.
//!
//! `item_id` is unique across the whole table. Because every potion is
//! one-of-a-kind, no item may ever appear on two bills; the constraint makes
//! the storage layer reject a double sale even if the application check is
//! somehow bypassed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bill line item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bill_line_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Bill this line belongs to
    pub bill_id: i64,
    /// Sold inventory item, unique across all bills
    #[sea_orm(unique)]
    pub item_id: i64,
}

/// Defines relationships between BillLineItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to one bill
    #[sea_orm(
        belongs_to = "super::bill::Entity",
        from = "Column::BillId",
        to = "super::bill::Column::Id"
    )]
    Bill,
    /// Each line item references one inventory item
    #[sea_orm(
        belongs_to = "super::inventory_item::Entity",
        from = "Column::ItemId",
        to = "super::inventory_item::Column::Id"
    )]
    InventoryItem,
}

impl Related<super::bill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bill.def()
    }
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
