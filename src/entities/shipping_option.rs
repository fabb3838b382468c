//! Shipping option entity - A named delivery method with a flat cost.
//!
//! Options are seeded from configuration at startup and referenced by bills.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shipping option database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipping_options")]
pub struct Model {
    /// Unique identifier for the shipping option
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the method (e.g., "Standard", "Overnight")
    pub ship_type: String,
    /// Flat delivery cost in dollars
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub cost: Decimal,
}

/// Defines relationships between ShippingOption and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One shipping option is referenced by many bills
    #[sea_orm(has_many = "super::bill::Entity")]
    Bills,
}

impl Related<super::bill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
